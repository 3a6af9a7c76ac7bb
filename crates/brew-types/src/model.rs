use crate::PrimitiveType;

/// Index of a class or interface declaration in a [`crate::TypeStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    pub(crate) fn from_index(idx: usize) -> Self {
        Self(u32::try_from(idx).unwrap_or(u32::MAX))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identity of a type variable.
///
/// Two same-named variables declared by different generic declarations get different ids, so
/// identity never depends on the spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeVarId(pub(crate) u32);

impl TypeVarId {
    pub(crate) fn from_index(idx: usize) -> Self {
        Self(u32::try_from(idx).unwrap_or(u32::MAX))
    }

    pub fn index(self) -> usize {
        (self.0 & !Self::CONTEXT_LOCAL_BIT) as usize
    }
}

/// Runtime representation a value of a type has on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
    Object,
    Void,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WildcardBound {
    Unbounded,
    Extends(Box<Type>),
    Super(Box<Type>),
}

impl WildcardBound {
    pub fn upper(&self) -> Option<&Type> {
        match self {
            WildcardBound::Extends(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn lower(&self) -> Option<&Type> {
        match self {
            WildcardBound::Super(ty) => Some(ty),
            _ => None,
        }
    }
}

/// A generic declaration applied to type arguments, e.g. `Map<String, ? extends Number>`.
///
/// `args` is empty only when the owner alone is parametrized (`Outer<String>.Inner` with a
/// non-generic `Inner`). Use [`crate::TypeStore::parametrize`] for arity-checked construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParametrizedType {
    pub owner: Option<Box<ParametrizedType>>,
    pub erasure: ClassId,
    pub args: Vec<Type>,
}

impl ParametrizedType {
    pub fn new(erasure: ClassId, args: Vec<Type>) -> Self {
        Self {
            owner: None,
            erasure,
            args,
        }
    }

    pub fn with_owner(mut self, owner: ParametrizedType) -> Self {
        self.owner = Some(Box::new(owner));
        self
    }

    /// Whether this type or any owner carries a wildcard argument.
    pub fn has_wildcards(&self) -> bool {
        self.args.iter().any(Type::is_wildcard)
            || self.owner.as_ref().is_some_and(|o| o.has_wildcards())
    }
}

/// Every static type shape of the object language.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Type {
    Void,
    /// The type of the `null` literal.
    Null,
    Primitive(PrimitiveType),
    /// A literal reference type: a non-generic class or the raw use of a generic one.
    Class(ClassId),
    Parametrized(ParametrizedType),
    Array(Box<Type>),
    TypeVar(TypeVarId),
    /// Only valid as a type argument.
    Wildcard(WildcardBound),
    Intersection(Vec<Type>),
}

impl Type {
    /// `Class(def)` when `args` is empty, otherwise an owner-less parametrization.
    pub fn class(def: ClassId, args: Vec<Type>) -> Type {
        if args.is_empty() {
            Type::Class(def)
        } else {
            Type::Parametrized(ParametrizedType::new(def, args))
        }
    }

    pub fn array(elem: Type) -> Type {
        Type::Array(Box::new(elem))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Type::Null)
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Type::Wildcard(_))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Primitive(p) if p.is_numeric())
    }

    pub fn is_reference(&self) -> bool {
        !matches!(self, Type::Void | Type::Primitive(_))
    }

    pub fn value_kind(&self) -> ValueKind {
        match self {
            Type::Void => ValueKind::Void,
            Type::Primitive(p) => p.value_kind(),
            _ => ValueKind::Object,
        }
    }

    /// `self` wrapped in `dims` array dimensions.
    pub fn as_array(&self, dims: usize) -> Type {
        (0..dims).fold(self.clone(), |acc, _| Type::array(acc))
    }

    pub fn component_type(&self) -> Option<&Type> {
        match self {
            Type::Array(elem) => Some(elem),
            _ => None,
        }
    }

    pub fn array_dimensions(&self) -> usize {
        let mut dims = 0;
        let mut cur = self;
        while let Type::Array(elem) = cur {
            dims += 1;
            cur = elem;
        }
        dims
    }

    /// The innermost non-array type.
    pub fn element_type(&self) -> &Type {
        let mut cur = self;
        while let Type::Array(elem) = cur {
            cur = elem;
        }
        cur
    }

    /// Declaration backing a class-shaped type.
    pub fn class_id(&self) -> Option<ClassId> {
        match self {
            Type::Class(id) => Some(*id),
            Type::Parametrized(p) => Some(p.erasure),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParamDef {
    pub name: String,
    /// Empty means the implicit bound `java.lang.Object`.
    pub upper_bounds: Vec<Type>,
    /// `None` is the bottom type.
    pub lower_bound: Option<Type>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub ty: Type,
    pub is_static: bool,
    pub is_final: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorDef {
    pub type_params: Vec<TypeVarId>,
    pub params: Vec<Type>,
    pub is_varargs: bool,
    pub is_accessible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDef {
    pub name: String,
    pub type_params: Vec<TypeVarId>,
    pub params: Vec<Type>,
    pub return_type: Type,
    pub is_static: bool,
    pub is_varargs: bool,
    pub is_abstract: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDef {
    /// Binary name, e.g. `java.util.Map$Entry`.
    pub name: String,
    pub kind: ClassKind,
    pub type_params: Vec<TypeVarId>,
    /// Enclosing class whose type parameters are in scope (inner classes only).
    pub outer: Option<ClassId>,
    pub super_class: Option<Type>,
    pub interfaces: Vec<Type>,
    pub fields: Vec<FieldDef>,
    pub constructors: Vec<ConstructorDef>,
    pub methods: Vec<MethodDef>,
}

impl ClassDef {
    /// An empty public class or interface named `name`.
    pub fn new(name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            type_params: Vec::new(),
            outer: None,
            super_class: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }

    pub fn simple_name(&self) -> &str {
        let tail = self.name.rsplit('.').next().unwrap_or(&self.name);
        tail.rsplit('$').next().unwrap_or(tail)
    }
}
