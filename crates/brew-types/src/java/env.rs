use std::collections::HashMap;
use std::fmt;

use crate::java::subst::{substitutions_for, Substitutions};
use crate::{
    ClassDef, ClassId, ParametrizedType, Type, TypeEnv, TypeParamDef, TypeVarId, WellKnownTypes,
};

/// Capture variables and memo tables of one evaluation request.
///
/// Owned separately from [`TyContext`] so a session can keep captured identities alive across
/// several resolution calls that belong to the same request.
#[derive(Debug, Clone, Default)]
pub struct CaptureScope {
    locals: Vec<TypeParamDef>,
    captures: HashMap<ParametrizedType, ParametrizedType>,
    substitutions: HashMap<ParametrizedType, Substitutions>,
}

impl CaptureScope {
    pub fn len(&self) -> usize {
        self.locals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locals.is_empty()
    }

    pub fn clear(&mut self) {
        self.locals.clear();
        self.captures.clear();
        self.substitutions.clear();
    }
}

/// Per-request typing context.
///
/// Capture conversion allocates its variables here rather than in the shared
/// [`crate::TypeStore`], so a context can be dropped (or [`TyContext::reset`]) without leaving
/// anything behind. Capture results and substitution maps are memoized per context, keyed by
/// the structural type value.
pub struct TyContext<'env> {
    base: &'env dyn TypeEnv,
    scope: CaptureScope,
}

impl fmt::Debug for TyContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TyContext")
            .field("locals", &self.scope.locals)
            .field("captures", &self.scope.captures.len())
            .finish_non_exhaustive()
    }
}

impl<'env> TyContext<'env> {
    pub fn new(base: &'env dyn TypeEnv) -> Self {
        Self::with_scope(base, CaptureScope::default())
    }

    /// Resume a request whose capture variables live in `scope`.
    pub fn with_scope(base: &'env dyn TypeEnv, scope: CaptureScope) -> Self {
        Self { base, scope }
    }

    pub fn into_scope(self) -> CaptureScope {
        self.scope
    }

    /// Drop every capture variable and memoized result.
    pub fn reset(&mut self) {
        self.scope.clear();
    }

    /// Number of capture variables allocated so far.
    pub fn capture_var_count(&self) -> usize {
        self.scope.len()
    }

    pub fn is_capture_var(&self, id: TypeVarId) -> bool {
        id.context_local_index()
            .is_some_and(|idx| idx < self.scope.len())
    }

    pub(crate) fn add_capture_type_param(
        &mut self,
        upper_bounds: Vec<Type>,
        lower_bound: Option<Type>,
    ) -> TypeVarId {
        let idx = u32::try_from(self.scope.len()).unwrap_or(!TypeVarId::CONTEXT_LOCAL_BIT);
        let id = TypeVarId::new_context_local(idx);
        self.scope.locals.push(TypeParamDef {
            name: format!("CAP#{}", idx + 1),
            upper_bounds,
            lower_bound,
        });
        id
    }

    /// Fill in the bounds of a capture variable reserved before its bounds were known.
    pub(crate) fn define_capture_bounds(
        &mut self,
        id: TypeVarId,
        upper_bounds: Vec<Type>,
        lower_bound: Option<Type>,
    ) {
        let Some(slot) = id
            .context_local_index()
            .and_then(|idx| self.scope.locals.get_mut(idx))
        else {
            return;
        };
        slot.upper_bounds = upper_bounds;
        slot.lower_bound = lower_bound;
    }

    pub(crate) fn cached_capture(&self, ty: &ParametrizedType) -> Option<&ParametrizedType> {
        self.scope.captures.get(ty)
    }

    pub(crate) fn remember_capture(&mut self, from: ParametrizedType, to: ParametrizedType) {
        self.scope.captures.insert(to.clone(), to.clone());
        self.scope.captures.insert(from, to);
    }

    /// Memoized [`substitutions_for`].
    pub fn substitutions(&mut self, ty: &ParametrizedType) -> Substitutions {
        if let Some(hit) = self.scope.substitutions.get(ty) {
            return hit.clone();
        }
        let computed = substitutions_for(&*self, ty);
        self.scope.substitutions.insert(ty.clone(), computed.clone());
        computed
    }
}

impl TypeEnv for TyContext<'_> {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.base.class(id)
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        if let Some(idx) = id.context_local_index() {
            return self.scope.locals.get(idx);
        }
        self.base.type_param(id)
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        self.base.lookup_class(name)
    }

    fn well_known(&self) -> &WellKnownTypes {
        self.base.well_known()
    }

    fn conversion_depth_limit(&self) -> usize {
        self.base.conversion_depth_limit()
    }
}

impl TypeVarId {
    pub(crate) const CONTEXT_LOCAL_BIT: u32 = 1 << 31;

    pub(crate) fn new_context_local(index: u32) -> Self {
        Self(Self::CONTEXT_LOCAL_BIT | index)
    }

    pub(crate) fn context_local_index(self) -> Option<usize> {
        if (self.0 & Self::CONTEXT_LOCAL_BIT) == 0 {
            return None;
        }
        Some((self.0 & !Self::CONTEXT_LOCAL_BIT) as usize)
    }
}
