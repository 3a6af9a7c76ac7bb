//! Capture conversion (JLS 5.1.10).

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::java::helpers::{check_bound_members, intersection_component_rank};
use crate::java::subst::{dependency_order, free_type_vars, substitute};
use crate::java::subtyping::is_subtype;
use crate::{ClassId, ParametrizedType, Type, TypeEnv, TypeError, TypeVarId};

use super::env::TyContext;

impl TyContext<'_> {
    /// Replace every wildcard argument of `ty` (and of its owner chain) with a fresh capture
    /// variable.
    ///
    /// A capture variable's upper bound combines the formal's declared bounds, with the other
    /// captured arguments substituted in, and the wildcard's own `extends` bound. Its lower bound
    /// is the wildcard's `super` bound. Formals whose bounds mention each other (or themselves,
    /// as in `E extends Enum<E>`) get their variables reserved before any bound is built.
    ///
    /// Results are memoized per context: capturing the same value twice yields the same
    /// variables, and capturing a captured type returns it unchanged.
    pub fn capture(&mut self, ty: &ParametrizedType) -> Result<ParametrizedType, TypeError> {
        if let Some(hit) = self.cached_capture(ty) {
            return Ok(hit.clone());
        }

        let owner = match &ty.owner {
            Some(owner) => Some(Box::new(self.capture(owner)?)),
            None => None,
        };

        let captured = if ty.args.iter().any(Type::is_wildcard) {
            self.capture_arguments(ty.erasure, owner, &ty.args)?
        } else {
            ParametrizedType {
                owner,
                erasure: ty.erasure,
                args: ty.args.clone(),
            }
        };

        tracing::debug!(
            target = "brew.types",
            class = ?ty.erasure,
            capture_vars = self.capture_var_count(),
            "captured parametrized type"
        );
        self.remember_capture(ty.clone(), captured.clone());
        Ok(captured)
    }

    /// [`TyContext::capture`] lifted to arbitrary types: parametrized types are captured, every
    /// other shape is returned as is.
    pub fn capture_type(&mut self, ty: &Type) -> Result<Type, TypeError> {
        match ty {
            Type::Parametrized(p) => Ok(Type::Parametrized(self.capture(p)?)),
            other => Ok(other.clone()),
        }
    }

    fn capture_arguments(
        &mut self,
        erasure: ClassId,
        owner: Option<Box<ParametrizedType>>,
        args: &[Type],
    ) -> Result<ParametrizedType, TypeError> {
        let def = self.class(erasure).ok_or(TypeError::UnknownClass(erasure))?;
        let formals = def.type_params.clone();
        if formals.len() != args.len() {
            return Err(TypeError::ArityMismatch {
                class: def.name.clone(),
                expected: formals.len(),
                found: args.len(),
            });
        }

        // Owner bindings are fixed; non-wildcard arguments bind their formal directly.
        let mut map: HashMap<TypeVarId, Type> = match &owner {
            Some(owner) => self.substitutions(owner).as_map().clone(),
            None => HashMap::new(),
        };
        let arg_of: HashMap<TypeVarId, &Type> = formals.iter().copied().zip(args.iter()).collect();
        for (formal, arg) in &arg_of {
            if !arg.is_wildcard() {
                map.insert(*formal, (*arg).clone());
            }
        }

        let formal_set: BTreeSet<TypeVarId> = formals.iter().copied().collect();
        let deps: BTreeMap<TypeVarId, BTreeSet<TypeVarId>> = formals
            .iter()
            .map(|formal| {
                let bounds = self
                    .type_param(*formal)
                    .map(|d| d.upper_bounds.clone())
                    .unwrap_or_default();
                let mentioned: BTreeSet<TypeVarId> = bounds
                    .iter()
                    .flat_map(free_type_vars)
                    .filter(|v| formal_set.contains(v))
                    .collect();
                (*formal, mentioned)
            })
            .collect();
        let (order, cyclic) = dependency_order(&formals, &deps);

        let mut reserved: HashMap<TypeVarId, TypeVarId> = HashMap::new();
        for formal in &cyclic {
            if arg_of.get(formal).is_some_and(|a| a.is_wildcard()) {
                let cap = self.add_capture_type_param(Vec::new(), None);
                map.insert(*formal, Type::TypeVar(cap));
                reserved.insert(*formal, cap);
            }
        }

        for formal in order.iter().chain(cyclic.iter()) {
            let Some(Type::Wildcard(bound)) = arg_of.get(formal).copied() else {
                continue;
            };
            let mut upper: Vec<Type> = self
                .type_param(*formal)
                .map(|d| d.upper_bounds.iter().map(|b| substitute(b, &map)).collect())
                .unwrap_or_default();
            if let Some(extends) = bound.upper() {
                upper.push(extends.clone());
            }
            let upper = self.normalize_capture_bounds(upper)?;
            let lower = bound.lower().cloned();

            let cap = match reserved.get(formal) {
                Some(cap) => {
                    self.define_capture_bounds(*cap, upper, lower);
                    *cap
                }
                None => self.add_capture_type_param(upper, lower),
            };
            map.insert(*formal, Type::TypeVar(cap));
        }

        let captured_args = formals
            .iter()
            .zip(args.iter())
            .map(|(formal, arg)| map.get(formal).cloned().unwrap_or_else(|| arg.clone()))
            .collect();

        Ok(ParametrizedType {
            owner,
            erasure,
            args: captured_args,
        })
    }

    /// Flatten, drop `Object` and members implied by a more specific member, then sort. More
    /// than one class (or array) member left over is a malformed bound.
    fn normalize_capture_bounds(&self, bounds: Vec<Type>) -> Result<Vec<Type>, TypeError> {
        let object = self.well_known().object_type();

        let mut flat: Vec<Type> = Vec::new();
        for bound in bounds {
            let parts = match bound {
                Type::Intersection(parts) => parts,
                other => vec![other],
            };
            for part in parts {
                if part != object && !flat.contains(&part) {
                    flat.push(part);
                }
            }
        }

        let mut kept: Vec<Type> = Vec::with_capacity(flat.len());
        for (idx, candidate) in flat.iter().enumerate() {
            let implied = flat.iter().enumerate().any(|(other_idx, other)| {
                if other_idx == idx || !is_subtype(self, other, candidate) {
                    return false;
                }
                // Mutually implied members keep the first occurrence.
                !is_subtype(self, candidate, other) || other_idx < idx
            });
            if !implied {
                kept.push(candidate.clone());
            }
        }

        check_bound_members(self, &kept)?;

        kept.sort_by(|a, b| {
            intersection_component_rank(self, a)
                .cmp(&intersection_component_rank(self, b))
                .then_with(|| a.cmp(b))
        });
        if kept.is_empty() {
            kept.push(object);
        }
        Ok(kept)
    }
}
