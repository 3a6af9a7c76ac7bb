use brew_host::{HostError, MemberRef};
use thiserror::Error;

use crate::{ClassId, TypeVarId};

/// Structurally invalid type states. These are configuration errors: they surface as soon as
/// the offending type is built and are never used to signal an ordinary "not convertible".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("malformed bound: {message}")]
    Configuration { message: String },
    #[error("`{class}` expects {expected} type argument(s), found {found}")]
    ArityMismatch {
        class: String,
        expected: usize,
        found: usize,
    },
    #[error("cyclic type-variable bindings: {vars:?}")]
    CyclicSubstitution { vars: Vec<TypeVarId> },
    #[error("unknown class id {0:?}")]
    UnknownClass(ClassId),
}

/// A failed live access. Host failures keep their cause.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("call to `{member}` failed")]
    Host {
        member: MemberRef,
        #[source]
        source: HostError,
    },
    #[error("`{member}` is read-only")]
    ReadOnly { member: String },
    #[error("`{member}` requires a receiver")]
    MissingReceiver { member: String },
    #[error("`{member}` expects {expected} argument(s), found {found}")]
    ArgumentCount {
        member: String,
        expected: usize,
        found: usize,
    },
    #[error("side effects are disabled; refusing to run `{member}`")]
    SideEffectsDisallowed { member: String },
}

impl InvocationError {
    pub(crate) fn host(member: &MemberRef, source: HostError) -> Self {
        InvocationError::Host {
            member: member.clone(),
            source,
        }
    }
}
