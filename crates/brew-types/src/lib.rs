//! Static type algebra for the brew evaluator.
//!
//! Declarations live in a [`TypeStore`] arena and are referred to by id ([`ClassId`],
//! [`TypeVarId`]), so recursive bounds such as `E extends Enum<E>` are plain data. Per-request
//! work happens in a [`TyContext`], which owns capture variables and memoized results.
//!
//! The main entry points are:
//! - [`is_convertible`]: may a value of one type be used where another is expected?
//! - [`TyContext::capture`]: capture conversion of wildcard-parametrized types.
//! - [`Substitutions`]: dependency-ordered type-variable substitution.
//! - [`resolve_method_call`] / [`resolve_constructor_call`]: overload resolution producing a
//!   [`Callable`] that can be invoked against a [`brew_host::HostProvider`].

mod error;
pub mod java;
pub mod member;
mod model;
mod primitive;
mod store;
pub mod value;

pub use error::{InvocationError, TypeError};
pub use java::env::{CaptureScope, TyContext};
pub use java::format::{erased_binary_name, format_type, format_type_list, TypeDisplay};
pub use java::helpers::{
    binary_numeric_promotion, check_bound_members, direct_supertypes, erasure,
    instantiate_as_supertype, is_raw, make_intersection, unary_numeric_promotion,
    unboxed_primitive,
};
pub use java::overload::{
    resolve_constructor_call, resolve_method_call, select_callable, CallKind, MethodCall,
    MethodResolution, ResolutionFailure, ResolvedCall,
};
pub use java::subst::{
    dependency_order, free_type_vars, substitute, substitutions_for, Substitutions,
};
pub use java::subtyping::{is_class_subclass, is_contained_by, is_convertible, is_subtype};
pub use member::{
    resolve_field, Accessible, AccessibleKind, Callable, CallableKind, FieldResolution,
};
pub use model::{
    ClassDef, ClassId, ClassKind, ConstructorDef, FieldDef, MethodDef, ParametrizedType, Type,
    TypeParamDef, TypeVarId, ValueKind, WildcardBound,
};
pub use primitive::PrimitiveType;
pub use store::{TypeEnv, TypeStore, WellKnownTypes, DEFAULT_CONVERSION_DEPTH};
pub use value::Value;
