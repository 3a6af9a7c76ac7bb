use std::fmt;

use crate::ValueKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Boolean,
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Char,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == keyword)
    }

    pub fn is_numeric(self) -> bool {
        self != PrimitiveType::Boolean
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            PrimitiveType::Byte
                | PrimitiveType::Short
                | PrimitiveType::Char
                | PrimitiveType::Int
                | PrimitiveType::Long
        )
    }

    pub fn value_kind(self) -> ValueKind {
        match self {
            PrimitiveType::Boolean => ValueKind::Boolean,
            PrimitiveType::Byte => ValueKind::Byte,
            PrimitiveType::Short => ValueKind::Short,
            PrimitiveType::Char => ValueKind::Char,
            PrimitiveType::Int => ValueKind::Int,
            PrimitiveType::Long => ValueKind::Long,
            PrimitiveType::Float => ValueKind::Float,
            PrimitiveType::Double => ValueKind::Double,
        }
    }

    /// Position on the widening lattice. `short` and `char` share a rank but do not widen into
    /// each other.
    fn rank(self) -> u8 {
        match self {
            PrimitiveType::Boolean => 0,
            PrimitiveType::Byte => 1,
            PrimitiveType::Short | PrimitiveType::Char => 2,
            PrimitiveType::Int => 3,
            PrimitiveType::Long => 4,
            PrimitiveType::Float => 5,
            PrimitiveType::Double => 6,
        }
    }

    /// Identity or widening primitive conversion (JLS 5.1.1, 5.1.2).
    pub fn can_widen_to(self, target: PrimitiveType) -> bool {
        if self == target {
            return true;
        }
        if self == PrimitiveType::Boolean || target == PrimitiveType::Boolean {
            return false;
        }
        match (self, target) {
            (_, PrimitiveType::Char) => false,
            (PrimitiveType::Char, t) => t.rank() >= PrimitiveType::Int.rank(),
            (s, t) => s.rank() < t.rank(),
        }
    }

    /// Every kind `self` converts to, including itself.
    pub fn valid_conversions(self) -> impl Iterator<Item = PrimitiveType> {
        Self::ALL.into_iter().filter(move |t| self.can_widen_to(*t))
    }

    /// Unary numeric promotion (JLS 5.6): small integral kinds become `int`.
    pub fn unary_promotion(self) -> Option<PrimitiveType> {
        match self {
            PrimitiveType::Boolean => None,
            PrimitiveType::Byte | PrimitiveType::Short | PrimitiveType::Char => {
                Some(PrimitiveType::Int)
            }
            other => Some(other),
        }
    }

    /// Binary numeric promotion (JLS 5.6). `boolean` only combines with `boolean`.
    pub fn binary_promotion(self, other: PrimitiveType) -> Option<PrimitiveType> {
        match (self, other) {
            (PrimitiveType::Boolean, PrimitiveType::Boolean) => Some(PrimitiveType::Boolean),
            (PrimitiveType::Boolean, _) | (_, PrimitiveType::Boolean) => None,
            (PrimitiveType::Double, _) | (_, PrimitiveType::Double) => Some(PrimitiveType::Double),
            (PrimitiveType::Float, _) | (_, PrimitiveType::Float) => Some(PrimitiveType::Float),
            (PrimitiveType::Long, _) | (_, PrimitiveType::Long) => Some(PrimitiveType::Long),
            _ => Some(PrimitiveType::Int),
        }
    }

    pub fn box_class_name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "java.lang.Boolean",
            PrimitiveType::Byte => "java.lang.Byte",
            PrimitiveType::Short => "java.lang.Short",
            PrimitiveType::Char => "java.lang.Character",
            PrimitiveType::Int => "java.lang.Integer",
            PrimitiveType::Long => "java.lang.Long",
            PrimitiveType::Float => "java.lang.Float",
            PrimitiveType::Double => "java.lang.Double",
        }
    }

    pub fn from_box_class_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.box_class_name() == name)
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
