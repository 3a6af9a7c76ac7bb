//! Evaluation session for the brew evaluator.
//!
//! [`EvalSession`] is what the evaluator core talks to: it owns the [`TypeCache`] that wraps host
//! type descriptors into static types, answers resolution and conversion queries, and performs
//! live host access for resolved members.

mod cache;
mod session;

use brew_types::{InvocationError, TypeError};
use thiserror::Error;

pub use cache::TypeCache;
pub use session::EvalSession;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("host has no type named `{0}`")]
    UnknownType(String),
    #[error("type variable `{name}` is not in scope in `{context}`")]
    UnknownTypeVariable { name: String, context: String },
    #[error("type parameter `{name}` of `{context}` has a malformed bound")]
    MalformedBound {
        name: String,
        context: String,
        #[source]
        source: TypeError,
    },
}

#[derive(Debug, Error)]
pub enum EvalError {
    #[error(transparent)]
    Type(#[from] TypeError),
    #[error(transparent)]
    Invocation(#[from] InvocationError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}
