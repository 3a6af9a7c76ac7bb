use brew_host::HostValue;

use crate::{PrimitiveType, Type};

/// A host value together with the static type the evaluator assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub ty: Type,
    pub raw: HostValue,
}

impl Value {
    pub fn new(ty: Type, raw: HostValue) -> Self {
        Self { ty, raw }
    }

    pub fn null() -> Self {
        Self {
            ty: Type::Null,
            raw: HostValue::Null,
        }
    }

    pub fn int(v: i32) -> Self {
        Self {
            ty: Type::Primitive(PrimitiveType::Int),
            raw: HostValue::Int(v),
        }
    }

    pub fn boolean(v: bool) -> Self {
        Self {
            ty: Type::Primitive(PrimitiveType::Boolean),
            raw: HostValue::Boolean(v),
        }
    }
}

/// Primitive kind of a raw host value, if it is one.
pub fn primitive_kind(raw: &HostValue) -> Option<PrimitiveType> {
    Some(match raw {
        HostValue::Boolean(_) => PrimitiveType::Boolean,
        HostValue::Byte(_) => PrimitiveType::Byte,
        HostValue::Short(_) => PrimitiveType::Short,
        HostValue::Char(_) => PrimitiveType::Char,
        HostValue::Int(_) => PrimitiveType::Int,
        HostValue::Long(_) => PrimitiveType::Long,
        HostValue::Float(_) => PrimitiveType::Float,
        HostValue::Double(_) => PrimitiveType::Double,
        HostValue::Null | HostValue::Void | HostValue::Object(_) => return None,
    })
}

/// Apply identity or widening primitive conversion to a raw value. `None` when `raw` is not a
/// primitive that widens to `target`.
pub fn widen(raw: &HostValue, target: PrimitiveType) -> Option<HostValue> {
    let kind = primitive_kind(raw)?;
    if !kind.can_widen_to(target) {
        return None;
    }
    let as_i64 = match *raw {
        HostValue::Byte(v) => i64::from(v),
        HostValue::Short(v) => i64::from(v),
        HostValue::Char(v) => i64::from(v),
        HostValue::Int(v) => i64::from(v),
        HostValue::Long(v) => v,
        _ => 0,
    };
    Some(match (target, raw) {
        (_, _) if kind == target => raw.clone(),
        (PrimitiveType::Short, _) => HostValue::Short(as_i64 as i16),
        (PrimitiveType::Int, _) => HostValue::Int(as_i64 as i32),
        (PrimitiveType::Long, _) => HostValue::Long(as_i64),
        (PrimitiveType::Float, _) => HostValue::Float(as_i64 as f32),
        (PrimitiveType::Double, HostValue::Float(v)) => HostValue::Double(f64::from(*v)),
        (PrimitiveType::Double, _) => HostValue::Double(as_i64 as f64),
        _ => return None,
    })
}
