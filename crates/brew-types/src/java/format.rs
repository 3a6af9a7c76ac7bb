//! Java-like rendering of types for diagnostics and log output.

use std::fmt::{self, Write as _};

use crate::java::helpers::erasure;
use crate::{ParametrizedType, Type, TypeEnv, WildcardBound};

/// `Map<String, ? extends Number>`, `int[][]`, `CAP#1`, `Number & Comparable<Integer>`.
pub fn format_type(env: &dyn TypeEnv, ty: &Type) -> String {
    let mut out = String::new();
    // Writing into a `String` cannot fail.
    let _ = write_type(env, ty, &mut out);
    out
}

/// Comma-separated list of rendered types.
pub fn format_type_list(env: &dyn TypeEnv, tys: &[Type]) -> String {
    tys.iter()
        .map(|t| format_type(env, t))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Binary name of the erasure of `ty`, as used in host member references: `int`,
/// `java.lang.String`, `java.util.Map$Entry[]`.
pub fn erased_binary_name(env: &dyn TypeEnv, ty: &Type) -> String {
    match erasure(env, ty) {
        Type::Void => "void".to_string(),
        Type::Null => "null".to_string(),
        Type::Primitive(p) => p.name().to_string(),
        Type::Class(id) => env
            .class(id)
            .map(|d| d.name.clone())
            .unwrap_or_else(|| format!("<class {}>", id.index())),
        Type::Array(elem) => format!("{}[]", erased_binary_name(env, &elem)),
        // Erasure never yields the remaining shapes.
        other => format_type(env, &other),
    }
}

/// Adapter implementing [`fmt::Display`] for a type in an environment.
pub struct TypeDisplay<'a> {
    env: &'a dyn TypeEnv,
    ty: &'a Type,
}

impl<'a> TypeDisplay<'a> {
    pub fn new(env: &'a dyn TypeEnv, ty: &'a Type) -> Self {
        Self { env, ty }
    }
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        write_type(self.env, self.ty, &mut out)?;
        f.write_str(&out)
    }
}

fn write_type(env: &dyn TypeEnv, ty: &Type, out: &mut String) -> fmt::Result {
    match ty {
        Type::Void => out.write_str("void"),
        Type::Null => out.write_str("null"),
        Type::Primitive(p) => out.write_str(p.name()),
        Type::Class(id) => match env.class(*id) {
            Some(def) => out.write_str(&source_name(env, def.outer, def.simple_name())),
            None => write!(out, "<class {}>", id.index()),
        },
        Type::Parametrized(p) => write_parametrized(env, p, out),
        Type::Array(elem) => {
            write_type(env, elem, out)?;
            out.write_str("[]")
        }
        Type::TypeVar(id) => match env.type_param(*id) {
            Some(def) => out.write_str(&def.name),
            None => write!(out, "<tvar {}>", id.index()),
        },
        Type::Wildcard(WildcardBound::Unbounded) => out.write_str("?"),
        Type::Wildcard(WildcardBound::Extends(upper)) => {
            out.write_str("? extends ")?;
            write_type(env, upper, out)
        }
        Type::Wildcard(WildcardBound::Super(lower)) => {
            out.write_str("? super ")?;
            write_type(env, lower, out)
        }
        Type::Intersection(parts) => {
            for (idx, part) in parts.iter().enumerate() {
                if idx > 0 {
                    out.write_str(" & ")?;
                }
                write_type(env, part, out)?;
            }
            Ok(())
        }
    }
}

fn write_parametrized(env: &dyn TypeEnv, p: &ParametrizedType, out: &mut String) -> fmt::Result {
    let def = env.class(p.erasure);
    match (&p.owner, def) {
        (Some(owner), Some(def)) => {
            write_parametrized(env, owner, out)?;
            out.write_char('.')?;
            out.write_str(def.simple_name())?;
        }
        (None, Some(def)) => out.write_str(&source_name(env, def.outer, def.simple_name()))?,
        (_, None) => write!(out, "<class {}>", p.erasure.index())?,
    }
    if p.args.is_empty() {
        return Ok(());
    }
    out.write_char('<')?;
    for (idx, arg) in p.args.iter().enumerate() {
        if idx > 0 {
            out.write_str(", ")?;
        }
        write_type(env, arg, out)?;
    }
    out.write_char('>')
}

/// `Outer.Inner` for nested declarations, the simple name otherwise.
fn source_name(env: &dyn TypeEnv, outer: Option<crate::ClassId>, simple: &str) -> String {
    match outer.and_then(|o| env.class(o)) {
        Some(outer_def) => format!(
            "{}.{}",
            source_name(env, outer_def.outer, outer_def.simple_name()),
            simple
        ),
        None => simple.to_string(),
    }
}
