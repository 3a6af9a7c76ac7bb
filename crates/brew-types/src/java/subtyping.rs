//! The conversion oracle: "may a value of type S be used where type T is expected?"
//!
//! Covers identity, primitive widening, boxing/unboxing, subtyping through the class graph with
//! type-argument containment, arrays, type variables (including captured ones with lower
//! bounds) and intersections. Raw types are unchecked-convertible to and from their
//! parametrizations.
//!
//! Recursive declarations make the naive recursion non-terminating (`E extends Enum<E>`), so
//! comparisons already in progress are assumed to hold and the nesting depth is capped by
//! [`TypeEnv::conversion_depth_limit`].

use std::collections::HashSet;

use crate::java::helpers::instantiate_as_supertype;
use crate::{ClassId, ParametrizedType, PrimitiveType, Type, TypeEnv, TypeVarId, WildcardBound};

/// Assignment-style convertibility, including primitive widening and boxing.
pub fn is_convertible(env: &dyn TypeEnv, from: &Type, to: &Type) -> bool {
    let mut oracle = Oracle::new(env);
    let result = oracle.convertible(from, to);
    tracing::trace!(target = "brew.types", ?from, ?to, result, "conversion check");
    result
}

/// Subtyping without boxing. Primitives are only subtypes of themselves.
pub fn is_subtype(env: &dyn TypeEnv, sub: &Type, sup: &Type) -> bool {
    Oracle::new(env).subtype(sub, sup)
}

/// Whether type argument `arg` is contained by `target` (JLS 4.5.1).
pub fn is_contained_by(env: &dyn TypeEnv, arg: &Type, target: &Type) -> bool {
    Oracle::new(env).contained_by(arg, target)
}

/// Nominal subclassing between declarations, ignoring type arguments. Every declaration is a
/// subclass of `Object`.
pub fn is_class_subclass(env: &dyn TypeEnv, sub: ClassId, sup: ClassId) -> bool {
    if sub == sup || sup == env.well_known().object {
        return true;
    }
    let mut stack = vec![sub];
    let mut seen = HashSet::new();
    while let Some(current) = stack.pop() {
        if !seen.insert(current) {
            continue;
        }
        let Some(def) = env.class(current) else {
            continue;
        };
        for parent in def.super_class.iter().chain(def.interfaces.iter()) {
            let Some(parent) = parent.class_id() else {
                continue;
            };
            if parent == sup {
                return true;
            }
            stack.push(parent);
        }
    }
    false
}

struct Oracle<'a> {
    env: &'a dyn TypeEnv,
    in_progress: Vec<(Type, Type)>,
    limit: usize,
}

impl<'a> Oracle<'a> {
    fn new(env: &'a dyn TypeEnv) -> Self {
        Self {
            env,
            in_progress: Vec::new(),
            limit: env.conversion_depth_limit(),
        }
    }

    fn object(&self) -> Type {
        self.env.well_known().object_type()
    }

    fn convertible(&mut self, from: &Type, to: &Type) -> bool {
        match (from, to) {
            (Type::Void, _) | (_, Type::Void) => false,
            (Type::Primitive(src), Type::Primitive(dst)) => src.can_widen_to(*dst),
            (_, Type::Primitive(dst)) => self
                .unboxed(from)
                .is_some_and(|src| src.can_widen_to(*dst)),
            (Type::Primitive(src), _) => {
                let boxed = Type::Class(self.env.well_known().box_class(*src));
                self.subtype(&boxed, to)
            }
            _ => self.subtype(from, to),
        }
    }

    /// The primitive a reference type unboxes to. Type variables unbox through their bounds.
    fn unboxed(&self, ty: &Type) -> Option<PrimitiveType> {
        match ty {
            Type::Class(id) => self.env.well_known().unboxed(*id),
            Type::TypeVar(id) => self
                .env
                .type_param(*id)?
                .upper_bounds
                .iter()
                .find_map(|b| match b {
                    Type::Class(id) => self.env.well_known().unboxed(*id),
                    _ => None,
                }),
            _ => None,
        }
    }

    fn subtype(&mut self, from: &Type, to: &Type) -> bool {
        if from == to {
            return !from.is_void();
        }
        let key = (from.clone(), to.clone());
        if self.in_progress.contains(&key) {
            return true;
        }
        if self.in_progress.len() >= self.limit {
            tracing::debug!(
                target = "brew.types",
                depth = self.in_progress.len(),
                "conversion depth limit reached"
            );
            return false;
        }
        self.in_progress.push(key);
        let result = self.subtype_uncached(from, to);
        self.in_progress.pop();
        result
    }

    fn subtype_uncached(&mut self, from: &Type, to: &Type) -> bool {
        match (from, to) {
            (Type::Void, _) | (_, Type::Void) => false,
            (Type::Primitive(a), Type::Primitive(b)) => a == b,
            (Type::Primitive(_), _) | (_, Type::Primitive(_)) => false,
            (Type::Null, _) => true,
            (_, Type::Null) => false,

            (_, Type::Wildcard(bound)) => self.contains(from, bound),
            (_, Type::Intersection(parts)) => parts.iter().all(|p| self.subtype(from, p)),
            (_, Type::TypeVar(target)) => self.subtype_of_var(from, *target),

            (Type::TypeVar(_), _) | (Type::Wildcard(_), _) => self
                .upper_bounds(from)
                .iter()
                .any(|b| self.subtype(b, to)),
            (Type::Intersection(parts), _) => parts.iter().any(|p| self.subtype(p, to)),

            (Type::Array(src), Type::Array(dst)) => match (src.as_ref(), dst.as_ref()) {
                (Type::Primitive(a), Type::Primitive(b)) => a == b,
                (Type::Primitive(_), _) | (_, Type::Primitive(_)) => false,
                (src, dst) => self.subtype(src, dst),
            },
            (Type::Array(_), Type::Class(target)) => {
                let wk = self.env.well_known();
                *target == wk.object || *target == wk.cloneable || *target == wk.serializable
            }
            (Type::Array(_), Type::Parametrized(_)) => false,
            (Type::Class(_) | Type::Parametrized(_), Type::Array(_)) => false,

            (Type::Class(_) | Type::Parametrized(_), Type::Class(target)) => from
                .class_id()
                .is_some_and(|src| is_class_subclass(self.env, src, *target)),
            (Type::Class(_) | Type::Parametrized(_), Type::Parametrized(target)) => {
                self.subtype_of_parametrized(from, target)
            }
        }
    }

    /// Upper bounds of a type variable or wildcard; `Object` when none are declared.
    fn upper_bounds(&self, ty: &Type) -> Vec<Type> {
        let declared = match ty {
            Type::TypeVar(id) => self
                .env
                .type_param(*id)
                .map(|d| d.upper_bounds.clone())
                .unwrap_or_default(),
            Type::Wildcard(bound) => bound.upper().cloned().into_iter().collect(),
            other => vec![other.clone()],
        };
        if declared.is_empty() {
            vec![self.object()]
        } else {
            declared
        }
    }

    fn lower_bound(&self, id: TypeVarId) -> Option<Type> {
        self.env.type_param(id).and_then(|d| d.lower_bound.clone())
    }

    fn subtype_of_var(&mut self, from: &Type, target: TypeVarId) -> bool {
        if let Type::TypeVar(src) = from {
            if *src == target {
                return true;
            }
        }

        // `CAP of ? super L` accepts anything convertible to `L`.
        if let Some(lower) = self.lower_bound(target) {
            if self.subtype(from, &lower) {
                return true;
            }
        }

        let target_upper = self.upper_bounds(&Type::TypeVar(target));
        match from {
            Type::TypeVar(src) => {
                let src_upper = self.upper_bounds(from);
                let upper_ok = target_upper
                    .iter()
                    .all(|t| src_upper.iter().any(|s| self.subtype(s, t)));
                let lower_ok = match (self.lower_bound(target), self.lower_bound(*src)) {
                    (None, _) => true,
                    (Some(t), Some(s)) => self.subtype(&t, &s),
                    (Some(_), None) => false,
                };
                upper_ok && lower_ok
            }
            _ => target_upper.iter().all(|t| self.subtype(from, t)),
        }
    }

    fn subtype_of_parametrized(&mut self, from: &Type, target: &ParametrizedType) -> bool {
        let Some(found) = instantiate_as_supertype(self.env, from, target.erasure) else {
            return false;
        };
        match found {
            // Raw source: unchecked conversion.
            Type::Class(_) => true,
            Type::Parametrized(found) => self.arguments_contained(&found, target),
            _ => false,
        }
    }

    fn arguments_contained(&mut self, found: &ParametrizedType, target: &ParametrizedType) -> bool {
        if let (Some(found_owner), Some(target_owner)) = (&found.owner, &target.owner) {
            if !self.arguments_contained(found_owner, target_owner) {
                return false;
            }
        }
        if target.args.is_empty() || found.args.is_empty() {
            return true;
        }
        if found.args.len() != target.args.len() {
            return false;
        }
        found
            .args
            .iter()
            .zip(target.args.iter())
            .all(|(arg, target_arg)| self.contained_by(arg, target_arg))
    }

    fn contained_by(&mut self, arg: &Type, target: &Type) -> bool {
        match target {
            Type::Wildcard(bound) => self.contains(arg, bound),
            _ => !arg.is_wildcard() && self.same_type(arg, target),
        }
    }

    fn contains(&mut self, arg: &Type, bound: &WildcardBound) -> bool {
        match bound {
            WildcardBound::Unbounded => true,
            WildcardBound::Extends(upper) => {
                let arg_upper = match arg {
                    Type::Wildcard(WildcardBound::Extends(u)) => (**u).clone(),
                    Type::Wildcard(_) => self.object(),
                    other => other.clone(),
                };
                self.subtype(&arg_upper, upper)
            }
            WildcardBound::Super(lower) => match arg {
                Type::Wildcard(WildcardBound::Super(arg_lower)) => self.subtype(lower, arg_lower),
                Type::Wildcard(_) => false,
                other => self.subtype(lower, other),
            },
        }
    }

    fn same_type(&mut self, a: &Type, b: &Type) -> bool {
        if a == b {
            return true;
        }
        match (a, b) {
            (Type::Intersection(xs), Type::Intersection(ys)) => {
                xs.len() == ys.len() && xs.iter().all(|x| ys.contains(x))
            }
            _ => false,
        }
    }
}
