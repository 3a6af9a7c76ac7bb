//! Declaration descriptors supplied by the host runtime.
//!
//! Descriptors carry full generic signatures: type parameters with their bounds, wildcard type
//! arguments and owner (enclosing) type arguments. Names are always binary names
//! (`java.util.Map$Entry`), never internal names.

/// JVM-style access flags used on [`TypeDescriptor`], [`FieldDescriptor`] and
/// [`MethodDescriptor`].
pub mod access {
    pub const ACC_PUBLIC: u16 = 0x0001;
    pub const ACC_PRIVATE: u16 = 0x0002;
    pub const ACC_PROTECTED: u16 = 0x0004;
    pub const ACC_STATIC: u16 = 0x0008;
    pub const ACC_FINAL: u16 = 0x0010;
    pub const ACC_VARARGS: u16 = 0x0080;
    pub const ACC_INTERFACE: u16 = 0x0200;
    pub const ACC_ABSTRACT: u16 = 0x0400;
}

use access::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

/// A (possibly generic) type appearing in a declaration signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSig {
    Base(BaseType),
    Class(ClassSig),
    /// Reference to a type parameter in scope (method parameters shadow class parameters).
    TypeVariable(String),
    Array(Box<TypeSig>),
}

impl TypeSig {
    pub fn class(binary_name: impl Into<String>) -> Self {
        TypeSig::Class(ClassSig::new(binary_name))
    }

    pub fn generic(binary_name: impl Into<String>, args: Vec<TypeArgSig>) -> Self {
        TypeSig::Class(ClassSig::new(binary_name).with_args(args))
    }

    pub fn var(name: impl Into<String>) -> Self {
        TypeSig::TypeVariable(name.into())
    }

    pub fn array(elem: TypeSig) -> Self {
        TypeSig::Array(Box::new(elem))
    }
}

/// A class type signature. `owner` carries the enclosing type's arguments for inner classes
/// (`Outer<String>.Inner<Integer>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassSig {
    pub owner: Option<Box<ClassSig>>,
    pub binary_name: String,
    pub args: Vec<TypeArgSig>,
}

impl ClassSig {
    pub fn new(binary_name: impl Into<String>) -> Self {
        Self {
            owner: None,
            binary_name: binary_name.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<TypeArgSig>) -> Self {
        self.args = args;
        self
    }

    pub fn with_owner(mut self, owner: ClassSig) -> Self {
        self.owner = Some(Box::new(owner));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeArgSig {
    /// `?`
    Any,
    Exact(TypeSig),
    /// `? extends T`
    Extends(TypeSig),
    /// `? super T`
    Super(TypeSig),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReturnSig {
    Void,
    Type(TypeSig),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeParamSig {
    pub name: String,
    /// `None` means the class bound is implicitly `java.lang.Object`.
    pub class_bound: Option<TypeSig>,
    pub interface_bounds: Vec<TypeSig>,
}

impl TypeParamSig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class_bound: None,
            interface_bounds: Vec::new(),
        }
    }

    pub fn bounded(name: impl Into<String>, bound: TypeSig) -> Self {
        Self {
            name: name.into(),
            class_bound: Some(bound),
            interface_bounds: Vec::new(),
        }
    }

    pub fn with_interface_bound(mut self, bound: TypeSig) -> Self {
        self.interface_bounds.push(bound);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: TypeSig,
    pub access_flags: u16,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, ty: TypeSig, access_flags: u16) -> Self {
        Self {
            name: name.into(),
            ty,
            access_flags,
        }
    }

    pub fn is_static(&self) -> bool {
        self.access_flags & ACC_STATIC != 0
    }

    pub fn is_final(&self) -> bool {
        self.access_flags & ACC_FINAL != 0
    }
}

/// A method or constructor declaration. Constructors are listed separately on
/// [`TypeDescriptor::constructors`] and carry the name `<init>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    pub name: String,
    pub type_params: Vec<TypeParamSig>,
    pub params: Vec<TypeSig>,
    pub return_type: ReturnSig,
    pub access_flags: u16,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>, params: Vec<TypeSig>, return_type: ReturnSig) -> Self {
        Self {
            name: name.into(),
            type_params: Vec::new(),
            params,
            return_type,
            access_flags: ACC_PUBLIC,
        }
    }

    pub fn constructor(params: Vec<TypeSig>) -> Self {
        Self::new("<init>", params, ReturnSig::Void)
    }

    pub fn with_type_params(mut self, type_params: Vec<TypeParamSig>) -> Self {
        self.type_params = type_params;
        self
    }

    pub fn with_flags(mut self, access_flags: u16) -> Self {
        self.access_flags |= access_flags;
        self
    }

    pub fn is_static(&self) -> bool {
        self.access_flags & ACC_STATIC != 0
    }

    pub fn is_varargs(&self) -> bool {
        self.access_flags & ACC_VARARGS != 0
    }

    pub fn is_abstract(&self) -> bool {
        self.access_flags & ACC_ABSTRACT != 0
    }
}

/// Everything the evaluator needs to know about one host class or interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub binary_name: String,
    pub access_flags: u16,
    /// Binary name of the lexically enclosing class for inner (non-static nested) classes.
    pub enclosing: Option<String>,
    pub type_params: Vec<TypeParamSig>,
    /// `None` for interfaces and for `java.lang.Object`.
    pub super_class: Option<ClassSig>,
    pub interfaces: Vec<ClassSig>,
    pub fields: Vec<FieldDescriptor>,
    pub methods: Vec<MethodDescriptor>,
    pub constructors: Vec<MethodDescriptor>,
}

impl TypeDescriptor {
    /// A public class extending `java.lang.Object` with no members.
    pub fn class(binary_name: impl Into<String>) -> Self {
        Self {
            binary_name: binary_name.into(),
            access_flags: ACC_PUBLIC,
            enclosing: None,
            type_params: Vec::new(),
            super_class: Some(ClassSig::new("java.lang.Object")),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
        }
    }

    pub fn interface(binary_name: impl Into<String>) -> Self {
        Self {
            access_flags: ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT,
            super_class: None,
            ..Self::class(binary_name)
        }
    }

    pub fn with_type_params(mut self, type_params: Vec<TypeParamSig>) -> Self {
        self.type_params = type_params;
        self
    }

    pub fn with_super(mut self, super_class: ClassSig) -> Self {
        self.super_class = Some(super_class);
        self
    }

    pub fn with_interface(mut self, iface: ClassSig) -> Self {
        self.interfaces.push(iface);
        self
    }

    pub fn with_enclosing(mut self, enclosing: impl Into<String>) -> Self {
        self.enclosing = Some(enclosing.into());
        self
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_constructor(mut self, ctor: MethodDescriptor) -> Self {
        self.constructors.push(ctor);
        self
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags & ACC_INTERFACE != 0
    }
}

/// Identifies a field, method or constructor for live access. `params` holds the erased binary
/// names of the parameter types (`int`, `java.lang.String[]`) so overloads stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberRef {
    pub owner: String,
    pub name: String,
    pub params: Vec<String>,
}

impl MemberRef {
    pub fn field(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            params: Vec::new(),
        }
    }

    pub fn method(owner: impl Into<String>, name: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            params,
        }
    }
}

impl std::fmt::Display for MemberRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.owner, self.name)?;
        if self.name == "<init>" || !self.params.is_empty() {
            write!(f, "({})", self.params.join(", "))?;
        }
        Ok(())
    }
}
