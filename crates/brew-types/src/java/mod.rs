//! Java-flavoured type algebra: substitution, capture conversion, the conversion oracle and
//! overload resolution. Formatters here are "Java-like" and stable, intended for diagnostics.

pub mod capture;
pub mod env;
pub mod format;
pub mod helpers;
pub mod overload;
pub mod subst;
pub mod subtyping;
