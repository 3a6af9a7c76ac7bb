use std::collections::{HashSet, VecDeque};

use crate::java::subst::substitutions_for;
use crate::java::subtyping::is_subtype;
use crate::{
    ClassId, ClassKind, PrimitiveType, Type, TypeEnv, TypeError, TypeVarId, WildcardBound,
};

/// Immediate supertypes of `ty` with the instantiation's type arguments substituted.
///
/// Raw uses of a generic class see raw supertypes. Interfaces list `Object` last.
pub fn direct_supertypes(env: &dyn TypeEnv, ty: &Type) -> Vec<Type> {
    let wk = env.well_known();
    match ty {
        Type::Class(id) => {
            let Some(def) = env.class(*id) else {
                return Vec::new();
            };
            let declared = def.super_class.iter().chain(def.interfaces.iter());
            let mut out: Vec<Type> = if def.is_generic() {
                declared.filter_map(|t| raw_class_type(t)).collect()
            } else {
                declared.cloned().collect()
            };
            if def.kind == ClassKind::Interface && *id != wk.object {
                out.push(wk.object_type());
            }
            out
        }
        Type::Parametrized(p) => {
            let Some(def) = env.class(p.erasure) else {
                return Vec::new();
            };
            let subst = substitutions_for(env, p);
            let mut out: Vec<Type> = def
                .super_class
                .iter()
                .chain(def.interfaces.iter())
                .map(|t| subst.apply(t))
                .collect();
            if def.kind == ClassKind::Interface {
                out.push(wk.object_type());
            }
            out
        }
        Type::Array(_) => vec![
            wk.object_type(),
            Type::Class(wk.cloneable),
            Type::Class(wk.serializable),
        ],
        Type::TypeVar(id) => match env.type_param(*id) {
            Some(def) if !def.upper_bounds.is_empty() => def.upper_bounds.clone(),
            _ => vec![wk.object_type()],
        },
        Type::Intersection(parts) => parts.clone(),
        Type::Wildcard(bound) => vec![bound
            .upper()
            .cloned()
            .unwrap_or_else(|| wk.object_type())],
        Type::Null | Type::Void | Type::Primitive(_) => Vec::new(),
    }
}

/// Return `ty` viewed as `target` by walking the supertype graph and applying type argument
/// substitution along the way.
///
/// Example: `ArrayList<String>` instantiated as `List` returns `List<String>`. Raw walks stay
/// raw, so raw `ArrayList` instantiated as `List` returns the literal class `List`.
pub fn instantiate_as_supertype(env: &dyn TypeEnv, ty: &Type, target: ClassId) -> Option<Type> {
    fn inner(
        env: &dyn TypeEnv,
        ty: &Type,
        target: ClassId,
        seen_type_vars: &mut HashSet<TypeVarId>,
    ) -> Option<Type> {
        match ty {
            Type::Intersection(parts) => {
                // If several parts can be viewed as `target`, keep the most specific one and give
                // up when two views are unrelated.
                let mut out: Option<Type> = None;
                for part in parts {
                    let Some(found) = inner(env, part, target, seen_type_vars) else {
                        continue;
                    };
                    out = match out {
                        None => Some(found),
                        Some(existing) => {
                            Some(merge_instantiated_supertypes(env, existing, found)?)
                        }
                    };
                }
                return out;
            }
            Type::TypeVar(id) => {
                if !seen_type_vars.insert(*id) {
                    return None;
                }
                let bounds = direct_supertypes(env, ty);
                let mut out: Option<Type> = None;
                for bound in &bounds {
                    let Some(found) = inner(env, bound, target, seen_type_vars) else {
                        continue;
                    };
                    out = match out {
                        None => Some(found),
                        Some(existing) => match merge_instantiated_supertypes(env, existing, found)
                        {
                            Some(merged) => Some(merged),
                            None => {
                                seen_type_vars.remove(id);
                                return None;
                            }
                        },
                    };
                }
                seen_type_vars.remove(id);
                return out;
            }
            Type::Wildcard(_) => {
                let upper = direct_supertypes(env, ty);
                return upper
                    .first()
                    .and_then(|u| inner(env, u, target, seen_type_vars));
            }
            Type::Array(_) => {
                return direct_supertypes(env, ty)
                    .into_iter()
                    .find(|t| t.class_id() == Some(target));
            }
            Type::Class(_) | Type::Parametrized(_) => {}
            Type::Null | Type::Void | Type::Primitive(_) => return None,
        }

        let mut queue: VecDeque<Type> = VecDeque::new();
        let mut seen: HashSet<Type> = HashSet::new();
        queue.push_back(ty.clone());

        while let Some(current) = queue.pop_front() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if current.class_id() == Some(target) {
                return Some(current);
            }
            queue.extend(
                direct_supertypes(env, &current)
                    .into_iter()
                    .filter(|t| t.class_id().is_some()),
            );
        }

        None
    }

    let mut seen_type_vars = HashSet::new();
    inner(env, ty, target, &mut seen_type_vars)
}

fn merge_instantiated_supertypes(env: &dyn TypeEnv, a: Type, b: Type) -> Option<Type> {
    if a == b {
        return Some(a);
    }

    let a_sub_b = is_subtype(env, &a, &b);
    let b_sub_a = is_subtype(env, &b, &a);

    match (a_sub_b, b_sub_a) {
        (true, false) => Some(a),
        (false, true) => Some(b),
        (true, true) => Some(a),
        (false, false) => None,
    }
}

fn raw_class_type(ty: &Type) -> Option<Type> {
    ty.class_id().map(Type::Class)
}

/// Type erasure (JLS 4.6).
pub fn erasure(env: &dyn TypeEnv, ty: &Type) -> Type {
    fn inner(env: &dyn TypeEnv, ty: &Type, seen: &mut HashSet<TypeVarId>) -> Type {
        let object = env.well_known().object_type();
        match ty {
            Type::Parametrized(p) => Type::Class(p.erasure),
            Type::Array(elem) => Type::array(inner(env, elem, seen)),
            Type::TypeVar(id) => {
                if !seen.insert(*id) {
                    return object;
                }
                let erased = env
                    .type_param(*id)
                    .and_then(|d| d.upper_bounds.first())
                    .map(|b| inner(env, b, seen))
                    .unwrap_or(object);
                seen.remove(id);
                erased
            }
            Type::Wildcard(WildcardBound::Extends(upper)) => inner(env, upper, seen),
            Type::Wildcard(_) => object,
            Type::Intersection(parts) => parts
                .first()
                .map(|p| inner(env, p, seen))
                .unwrap_or(object),
            Type::Void | Type::Null | Type::Primitive(_) | Type::Class(_) => ty.clone(),
        }
    }

    inner(env, ty, &mut HashSet::new())
}

/// Whether `ty` is the raw use of a generic class.
pub fn is_raw(env: &dyn TypeEnv, ty: &Type) -> bool {
    match ty {
        Type::Class(id) => env.class(*id).is_some_and(|d| d.is_generic()),
        _ => false,
    }
}

/// Build an intersection: nested intersections are flattened, duplicates and a redundant
/// `Object` are dropped, and classes sort ahead of interfaces. A single member is returned as
/// itself.
///
/// More than one class (or array) member is a [`TypeError::Configuration`].
pub fn make_intersection(env: &dyn TypeEnv, parts: Vec<Type>) -> Result<Type, TypeError> {
    let object = env.well_known().object_type();
    let mut flat: Vec<Type> = Vec::new();
    for part in parts {
        match part {
            Type::Intersection(inner) => {
                for p in inner {
                    if !flat.contains(&p) {
                        flat.push(p);
                    }
                }
            }
            other => {
                if !flat.contains(&other) {
                    flat.push(other);
                }
            }
        }
    }
    if flat.len() > 1 {
        flat.retain(|t| *t != object);
    }
    check_bound_members(env, &flat)?;
    flat.sort_by_key(|t| intersection_component_rank(env, t));
    Ok(match flat.len() {
        0 => object,
        1 => flat.remove(0),
        _ => Type::Intersection(flat),
    })
}

/// Reject a bound list (or intersection) with more than one class or array member.
pub fn check_bound_members(env: &dyn TypeEnv, bounds: &[Type]) -> Result<(), TypeError> {
    let mut class_like = Vec::new();
    for bound in bounds {
        let parts = match bound {
            Type::Intersection(parts) => parts.as_slice(),
            other => std::slice::from_ref(other),
        };
        class_like.extend(
            parts
                .iter()
                .filter(|t| intersection_component_rank(env, t) == 0),
        );
    }
    if class_like.len() <= 1 {
        return Ok(());
    }
    let names: Vec<String> = class_like
        .iter()
        .map(|t| crate::format_type(env, t))
        .collect();
    Err(TypeError::Configuration {
        message: format!("bound intersects unrelated classes: {}", names.join(" & ")),
    })
}

/// Classes and arrays before type variables before interfaces.
pub(crate) fn intersection_component_rank(env: &dyn TypeEnv, ty: &Type) -> u8 {
    match ty {
        Type::Array(_) => 0,
        Type::Class(_) | Type::Parametrized(_) => match ty.class_id().and_then(|id| env.class(id)) {
            Some(def) if def.is_interface() => 2,
            _ => 0,
        },
        Type::TypeVar(_) => 1,
        _ => 3,
    }
}

/// The primitive `ty` denotes directly or after unboxing.
pub fn unboxed_primitive(env: &dyn TypeEnv, ty: &Type) -> Option<PrimitiveType> {
    match ty {
        Type::Primitive(p) => Some(*p),
        Type::Class(id) => env.well_known().unboxed(*id),
        _ => None,
    }
}

/// Unary numeric promotion over (possibly boxed) operand types.
pub fn unary_numeric_promotion(env: &dyn TypeEnv, ty: &Type) -> Option<PrimitiveType> {
    unboxed_primitive(env, ty)?.unary_promotion()
}

/// Binary numeric promotion over (possibly boxed) operand types.
pub fn binary_numeric_promotion(env: &dyn TypeEnv, a: &Type, b: &Type) -> Option<PrimitiveType> {
    unboxed_primitive(env, a)?.binary_promotion(unboxed_primitive(env, b)?)
}
