//! Overload resolution (JLS 15.12.2, without inference).
//!
//! Phase one considers fixed-arity forms only; phase two, tried only when phase one finds
//! nothing, considers the vararg-enabled forms of varargs callables. Among the applicable
//! candidates, the one at least as specific as every other wins.

use std::fmt;

use crate::java::format::{format_type, format_type_list};
use crate::member::{collect_constructors, collect_methods, Callable};
use crate::{Type, TyContext, TypeEnv, TypeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    /// `Type.m(..)`: only static members qualify.
    Static,
    /// `expr.m(..)`.
    Instance,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall<'a> {
    pub receiver: Type,
    pub call_kind: CallKind,
    pub name: &'a str,
    pub args: Vec<Type>,
    pub explicit_type_args: Vec<Type>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCall {
    pub callable: Callable,
    /// Parameter types aligned with the arguments (varargs expanded).
    pub params: Vec<Type>,
    pub return_type: Type,
    pub used_varargs: bool,
}

/// Why no single candidate was chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionFailure {
    pub name: String,
    pub args: Vec<Type>,
    /// Every candidate for `NoMatch`, the maximally specific ones for `Ambiguous`.
    pub candidates: Vec<Callable>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MethodResolution {
    Found(ResolvedCall),
    NoMatch(ResolutionFailure),
    Ambiguous(ResolutionFailure),
}

impl MethodResolution {
    pub fn found(&self) -> Option<&ResolvedCall> {
        match self {
            MethodResolution::Found(call) => Some(call),
            _ => None,
        }
    }

    pub fn into_found(self) -> Option<ResolvedCall> {
        match self {
            MethodResolution::Found(call) => Some(call),
            _ => None,
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, MethodResolution::Ambiguous(_))
    }

    /// Human-readable rendering for diagnostics.
    pub fn display<'a>(&'a self, env: &'a dyn TypeEnv) -> ResolutionDisplay<'a> {
        ResolutionDisplay { env, resolution: self }
    }
}

pub struct ResolutionDisplay<'a> {
    env: &'a dyn TypeEnv,
    resolution: &'a MethodResolution,
}

impl fmt::Display for ResolutionDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (headline, failure) = match self.resolution {
            MethodResolution::Found(call) => {
                return write!(
                    f,
                    "{} returning {}",
                    call.callable.describe(self.env),
                    format_type(self.env, &call.return_type)
                );
            }
            MethodResolution::NoMatch(failure) => ("no applicable", failure),
            MethodResolution::Ambiguous(failure) => ("ambiguous", failure),
        };
        write!(
            f,
            "{headline} `{}` for arguments ({})",
            failure.name,
            format_type_list(self.env, &failure.args)
        )?;
        for candidate in &failure.candidates {
            write!(f, "\n  candidate: {}", candidate.describe(self.env))?;
        }
        Ok(())
    }
}

/// Choose among `candidates` for a call with argument types `args`.
pub fn select_callable(
    env: &dyn TypeEnv,
    name: &str,
    candidates: Vec<Callable>,
    args: &[Type],
) -> MethodResolution {
    let mut applicable: Vec<Callable> = candidates
        .iter()
        .filter(|c| c.is_applicable(env, args))
        .cloned()
        .collect();
    let mut used_varargs = false;
    if applicable.is_empty() {
        applicable = candidates
            .iter()
            .filter_map(Callable::with_varargs_enabled)
            .filter(|c| c.is_applicable(env, args))
            .collect();
        used_varargs = true;
    }

    tracing::debug!(
        target = "brew.resolve",
        method = name,
        candidates = candidates.len(),
        applicable = applicable.len(),
        used_varargs,
        "overload phase complete"
    );

    if applicable.is_empty() {
        return MethodResolution::NoMatch(ResolutionFailure {
            name: name.to_string(),
            args: args.to_vec(),
            candidates,
        });
    }

    match most_specific(env, applicable, args) {
        Ok(callable) => MethodResolution::Found(ResolvedCall {
            params: callable.expanded_params(args.len()),
            return_type: callable.effective_return_type(env),
            used_varargs,
            callable,
        }),
        Err(maximal) => MethodResolution::Ambiguous(ResolutionFailure {
            name: name.to_string(),
            args: args.to_vec(),
            candidates: maximal,
        }),
    }
}

/// The unique candidate at least as specific as every other, or the maximal set on failure.
///
/// Candidates with identical parameter types (an inherited abstract declaration next to its
/// implementation, seen through different supertypes) collapse to the first concrete one.
fn most_specific(
    env: &dyn TypeEnv,
    applicable: Vec<Callable>,
    args: &[Type],
) -> Result<Callable, Vec<Callable>> {
    if let [only] = applicable.as_slice() {
        return Ok(only.clone());
    }

    let beats = |a: &Callable, b: &Callable| a.is_more_applicable_than(env, b, args);

    let maximal: Vec<Callable> = applicable
        .iter()
        .filter(|c| {
            !applicable
                .iter()
                .any(|other| beats(other, c) && !beats(c, other))
        })
        .cloned()
        .collect();

    let winners: Vec<&Callable> = maximal
        .iter()
        .filter(|c| maximal.iter().all(|other| beats(c, other)))
        .collect();

    match winners.as_slice() {
        [only] => Ok((*only).clone()),
        [first, rest @ ..] if rest.iter().all(|c| c.params() == first.params()) => Ok(winners
            .iter()
            .find(|c| !c.is_abstract())
            .copied()
            .unwrap_or(*first)
            .clone()),
        _ => Err(maximal),
    }
}

/// Resolve `call` against the members of its (captured) receiver type.
pub fn resolve_method_call(
    ctx: &mut TyContext<'_>,
    call: &MethodCall<'_>,
) -> Result<MethodResolution, TypeError> {
    let receiver = ctx.capture_type(&call.receiver)?;
    let candidates: Vec<Callable> = collect_methods(ctx, &receiver, call.name, call.call_kind)
        .into_iter()
        .filter_map(|c| c.bind_type_args(&*ctx, &call.explicit_type_args))
        .collect();
    let resolution = select_callable(&*ctx, call.name, candidates, &call.args);
    tracing::debug!(
        target = "brew.resolve",
        receiver = %format_type(&*ctx, &receiver),
        outcome = %resolution.display(&*ctx),
        "method resolution"
    );
    Ok(resolution)
}

/// Resolve `new target(args)`. `type_args` are explicit constructor type arguments.
pub fn resolve_constructor_call(
    ctx: &mut TyContext<'_>,
    target: &Type,
    type_args: &[Type],
    args: &[Type],
) -> Result<MethodResolution, TypeError> {
    let candidates: Vec<Callable> = collect_constructors(ctx, target)
        .into_iter()
        .filter_map(|c| c.bind_type_args(&*ctx, type_args))
        .collect();
    let resolution = select_callable(&*ctx, "<init>", candidates, args);
    tracing::debug!(
        target = "brew.resolve",
        target_type = %format_type(&*ctx, target),
        outcome = %resolution.display(&*ctx),
        "constructor resolution"
    );
    Ok(resolution)
}
