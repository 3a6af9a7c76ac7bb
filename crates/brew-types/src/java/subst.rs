//! Type-variable substitution.
//!
//! [`Substitutions`] is an immutable `TypeVarId -> Type` map plus the order in which its
//! bindings were finalized. [`Substitutions::resolve`] reduces bindings that refer to other
//! bindings of the same set (Kahn-style); [`Substitutions::simultaneous`] is for bindings whose
//! values are already closed, such as the arguments of a parametrized type.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{ParametrizedType, Type, TypeEnv, TypeError, TypeVarId, WildcardBound};

/// Replace every type variable in `ty` that has an entry in `map`. Single pass: replacement
/// values are not substituted again.
pub fn substitute(ty: &Type, map: &HashMap<TypeVarId, Type>) -> Type {
    if map.is_empty() {
        return ty.clone();
    }
    match ty {
        Type::TypeVar(id) => map.get(id).cloned().unwrap_or_else(|| ty.clone()),
        Type::Array(elem) => Type::Array(Box::new(substitute(elem, map))),
        Type::Parametrized(p) => Type::Parametrized(substitute_parametrized(p, map)),
        Type::Wildcard(WildcardBound::Extends(upper)) => {
            Type::Wildcard(WildcardBound::Extends(Box::new(substitute(upper, map))))
        }
        Type::Wildcard(WildcardBound::Super(lower)) => {
            Type::Wildcard(WildcardBound::Super(Box::new(substitute(lower, map))))
        }
        Type::Intersection(parts) => {
            Type::Intersection(parts.iter().map(|p| substitute(p, map)).collect())
        }
        Type::Void
        | Type::Null
        | Type::Primitive(_)
        | Type::Class(_)
        | Type::Wildcard(WildcardBound::Unbounded) => ty.clone(),
    }
}

pub fn substitute_parametrized(
    ty: &ParametrizedType,
    map: &HashMap<TypeVarId, Type>,
) -> ParametrizedType {
    ParametrizedType {
        owner: ty
            .owner
            .as_ref()
            .map(|o| Box::new(substitute_parametrized(o, map))),
        erasure: ty.erasure,
        args: ty.args.iter().map(|a| substitute(a, map)).collect(),
    }
}

/// Type variables occurring in `ty`. Bounds of the variables themselves are not visited.
pub fn free_type_vars(ty: &Type) -> BTreeSet<TypeVarId> {
    fn walk(ty: &Type, out: &mut BTreeSet<TypeVarId>) {
        match ty {
            Type::TypeVar(id) => {
                out.insert(*id);
            }
            Type::Array(elem) => walk(elem, out),
            Type::Parametrized(p) => walk_parametrized(p, out),
            Type::Wildcard(WildcardBound::Extends(b)) | Type::Wildcard(WildcardBound::Super(b)) => {
                walk(b, out)
            }
            Type::Intersection(parts) => parts.iter().for_each(|p| walk(p, out)),
            _ => {}
        }
    }

    fn walk_parametrized(p: &ParametrizedType, out: &mut BTreeSet<TypeVarId>) {
        if let Some(owner) = &p.owner {
            walk_parametrized(owner, out);
        }
        p.args.iter().for_each(|a| walk(a, out));
    }

    let mut out = BTreeSet::new();
    walk(ty, &mut out);
    out
}

/// Kahn-style topological reduction over `nodes`.
///
/// `deps[n]` lists what `n` depends on; entries outside `nodes` are ignored. Nodes become ready
/// in ascending order so the result never depends on input iteration order. Returns the
/// finalization order and the (sorted) nodes left on a cycle, including self-loops.
pub fn dependency_order<K: Ord + Copy>(
    nodes: &[K],
    deps: &BTreeMap<K, BTreeSet<K>>,
) -> (Vec<K>, Vec<K>) {
    let node_set: BTreeSet<K> = nodes.iter().copied().collect();
    let mut pending: BTreeMap<K, BTreeSet<K>> = node_set
        .iter()
        .map(|n| {
            let d = deps
                .get(n)
                .map(|d| d.intersection(&node_set).copied().collect())
                .unwrap_or_default();
            (*n, d)
        })
        .collect();

    let mut order = Vec::with_capacity(node_set.len());
    let mut ready: BTreeSet<K> = pending
        .iter()
        .filter(|(_, d)| d.is_empty())
        .map(|(n, _)| *n)
        .collect();

    while let Some(next) = ready.pop_first() {
        pending.remove(&next);
        order.push(next);
        for (node, d) in pending.iter_mut() {
            if d.remove(&next) && d.is_empty() {
                ready.insert(*node);
            }
        }
    }

    let cyclic = pending.into_keys().collect();
    (order, cyclic)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitutions {
    map: HashMap<TypeVarId, Type>,
    order: Vec<TypeVarId>,
}

impl Substitutions {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Bindings whose values never refer to each other.
    pub fn simultaneous(bindings: impl IntoIterator<Item = (TypeVarId, Type)>) -> Self {
        let map: BTreeMap<TypeVarId, Type> = bindings.into_iter().collect();
        let order = map.keys().copied().collect();
        Self {
            map: map.into_iter().collect(),
            order,
        }
    }

    /// Finalize bindings in dependency order, substituting each already-finalized binding into
    /// the ones that mention it.
    ///
    /// A binding mentioning its own variable is not a dependency (`T -> List<T>` keeps its
    /// `T`). Mutual dependencies with no acyclic base are reported as
    /// [`TypeError::CyclicSubstitution`].
    pub fn resolve(
        bindings: impl IntoIterator<Item = (TypeVarId, Type)>,
    ) -> Result<Self, TypeError> {
        let raw: BTreeMap<TypeVarId, Type> = bindings.into_iter().collect();
        let nodes: Vec<TypeVarId> = raw.keys().copied().collect();
        let deps: BTreeMap<TypeVarId, BTreeSet<TypeVarId>> = raw
            .iter()
            .map(|(var, value)| {
                let mut d = free_type_vars(value);
                d.remove(var);
                d.retain(|other| raw.contains_key(other));
                (*var, d)
            })
            .collect();

        let (order, cyclic) = dependency_order(&nodes, &deps);
        if !cyclic.is_empty() {
            return Err(TypeError::CyclicSubstitution { vars: cyclic });
        }

        let mut map: HashMap<TypeVarId, Type> = HashMap::with_capacity(raw.len());
        for var in &order {
            let Some(value) = raw.get(var) else {
                continue;
            };
            let finalized = substitute(value, &map);
            map.insert(*var, finalized);
        }
        Ok(Self { map, order })
    }

    /// Bindings of `self` followed by those of `other`; `other` wins on conflicts.
    pub fn merged(&self, other: &Substitutions) -> Substitutions {
        let mut map = self.map.clone();
        let mut order = self.order.clone();
        for var in &other.order {
            if let Some(value) = other.map.get(var) {
                if map.insert(*var, value.clone()).is_none() {
                    order.push(*var);
                }
            }
        }
        Self { map, order }
    }

    pub fn get(&self, var: TypeVarId) -> Option<&Type> {
        self.map.get(&var)
    }

    /// Finalization order.
    pub fn order(&self) -> &[TypeVarId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeVarId, &Type)> {
        self.order
            .iter()
            .filter_map(|var| self.map.get(var).map(|ty| (*var, ty)))
    }

    pub fn as_map(&self) -> &HashMap<TypeVarId, Type> {
        &self.map
    }

    pub fn apply(&self, ty: &Type) -> Type {
        substitute(ty, &self.map)
    }

    pub fn apply_all(&self, tys: &[Type]) -> Vec<Type> {
        tys.iter().map(|t| self.apply(t)).collect()
    }
}

/// Bindings a parametrized type induces: the owner chain's formals first, then its own.
///
/// Raw uses (declaration is generic, no arguments) bind nothing for that level.
pub fn substitutions_for(env: &dyn TypeEnv, ty: &ParametrizedType) -> Substitutions {
    let mut bindings = Vec::new();
    collect_bindings(env, ty, &mut bindings);
    Substitutions::simultaneous(bindings)
}

fn collect_bindings(env: &dyn TypeEnv, ty: &ParametrizedType, out: &mut Vec<(TypeVarId, Type)>) {
    if let Some(owner) = &ty.owner {
        collect_bindings(env, owner, out);
    }
    let Some(def) = env.class(ty.erasure) else {
        return;
    };
    if def.type_params.len() != ty.args.len() {
        return;
    }
    out.extend(def.type_params.iter().copied().zip(ty.args.iter().cloned()));
}
