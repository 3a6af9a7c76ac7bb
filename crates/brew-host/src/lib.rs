//! Host introspection contract for the brew evaluator.
//!
//! The evaluator never talks to a managed runtime directly. Everything it needs (class
//! declarations with full generic signatures, field reads/writes, constructor and method
//! invocation) flows through [`HostProvider`]. `brew-eval` wraps descriptors into static types;
//! `brew-types` performs the actual calls once overload resolution has picked a member.
//!
//! [`MockHost`] is a deterministic in-memory provider used by tests across the workspace.

mod descriptor;
mod mock;

use thiserror::Error;

pub use descriptor::{
    access, BaseType, ClassSig, FieldDescriptor, MemberRef, MethodDescriptor, ReturnSig,
    TypeArgSig, TypeDescriptor, TypeParamSig, TypeSig,
};
pub use mock::{MockHost, MockObject, RecordedCall};

pub type ObjectId = u64;

/// A live value as seen by the host runtime.
#[derive(Clone, Debug, PartialEq)]
pub enum HostValue {
    Null,
    Void,
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Char(u16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Object(ObjectRef),
}

impl HostValue {
    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            Self::Object(obj) => Some(obj.id),
            _ => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        !matches!(self, Self::Null | Self::Void | Self::Object(_))
    }

    /// Binary name of the runtime class for objects, the keyword for primitives.
    pub fn runtime_type(&self) -> &str {
        match self {
            Self::Null => "null",
            Self::Void => "void",
            Self::Boolean(_) => "boolean",
            Self::Byte(_) => "byte",
            Self::Short(_) => "short",
            Self::Char(_) => "char",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Object(obj) => &obj.runtime_type,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub id: ObjectId,
    pub runtime_type: String,
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("host operation not implemented")]
    NotImplemented,
    #[error("unknown host type `{0}`")]
    UnknownType(String),
    #[error("unknown member `{name}` on `{owner}`")]
    UnknownMember { owner: String, name: String },
    #[error("invalid object id {0}")]
    InvalidObject(ObjectId),
    #[error("host call threw {exception_type}: {message}")]
    Threw {
        exception_type: String,
        message: String,
    },
    #[error("{0}")]
    Other(String),
}

/// Interface to the managed runtime hosting the live objects.
///
/// Introspection (`describe_type`) is read-only; every other operation may have side effects on
/// the host and is reported synchronously. Implementations never retry.
pub trait HostProvider {
    /// Declarations for `binary_name`, or `None` if the host does not know the type.
    fn describe_type(&self, binary_name: &str) -> Option<TypeDescriptor>;

    fn get_field(
        &mut self,
        field: &MemberRef,
        receiver: Option<&HostValue>,
    ) -> Result<HostValue, HostError>;

    fn set_field(
        &mut self,
        field: &MemberRef,
        receiver: Option<&HostValue>,
        value: HostValue,
    ) -> Result<(), HostError>;

    /// Invoke a method. Void methods return [`HostValue::Void`].
    fn invoke_method(
        &mut self,
        method: &MemberRef,
        receiver: Option<&HostValue>,
        args: Vec<HostValue>,
    ) -> Result<HostValue, HostError>;

    fn new_instance(
        &mut self,
        constructor: &MemberRef,
        args: Vec<HostValue>,
    ) -> Result<HostValue, HostError>;

    fn array_length(&mut self, array: &HostValue) -> Result<i32, HostError>;

    /// Allocate an array of `component` (a binary name) holding `elements`.
    fn new_array(
        &mut self,
        _component: &str,
        _elements: Vec<HostValue>,
    ) -> Result<HostValue, HostError> {
        Err(HostError::NotImplemented)
    }

    fn clone_array(&mut self, _array: &HostValue) -> Result<HostValue, HostError> {
        Err(HostError::NotImplemented)
    }

    /// Box a primitive value into its wrapper object.
    fn box_value(&mut self, _value: &HostValue) -> Result<HostValue, HostError> {
        Err(HostError::NotImplemented)
    }

    /// Unbox a wrapper object into its primitive value.
    fn unbox_value(&mut self, _value: &HostValue) -> Result<HostValue, HostError> {
        Err(HostError::NotImplemented)
    }
}
