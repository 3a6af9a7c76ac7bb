use brew_config::EvalConfig;
use brew_host::{HostProvider, MemberRef};
use brew_types::{
    format_type, is_convertible, resolve_constructor_call, resolve_field, resolve_method_call,
    Accessible, CallKind, Callable, CaptureScope, FieldResolution, InvocationError, MethodCall,
    MethodResolution, ParametrizedType, Type, TyContext, Value,
};

use crate::{EvalError, TypeCache};

/// Run `f` in a typing context that keeps the capture variables of the current request.
fn in_context<R>(
    cache: &TypeCache,
    scope: &mut CaptureScope,
    f: impl FnOnce(&mut TyContext<'_>) -> R,
) -> R {
    let mut ctx = TyContext::with_scope(cache.store(), std::mem::take(scope));
    let out = f(&mut ctx);
    *scope = ctx.into_scope();
    out
}

/// One evaluator session bound to a host.
///
/// Capture variables produced while answering queries stay valid until [`EvalSession::end_request`]
/// (or [`EvalSession::purge`]); the evaluator core calls it once the current evaluation request
/// is done. Requests on one session are expected to run one after another.
pub struct EvalSession<H> {
    host: H,
    cache: TypeCache,
    scope: CaptureScope,
    allow_side_effects: bool,
}

impl<H: HostProvider> EvalSession<H> {
    pub fn new(host: H, config: &EvalConfig) -> Self {
        Self {
            host,
            cache: TypeCache::new(config.resolution.max_conversion_depth),
            scope: CaptureScope::default(),
            allow_side_effects: config.invocation.allow_side_effects,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn cache(&self) -> &TypeCache {
        &self.cache
    }

    pub fn allows_side_effects(&self) -> bool {
        self.allow_side_effects
    }

    pub fn set_allow_side_effects(&mut self, allow: bool) {
        self.allow_side_effects = allow;
    }

    /// The raw (or non-generic) class type named `binary_name`, loading it from the host if
    /// needed.
    pub fn class_type(&mut self, binary_name: &str) -> Result<Type, EvalError> {
        let id = self.cache.ensure_class(&self.host, binary_name)?;
        Ok(Type::Class(id))
    }

    /// `binary_name<args>`, checking the argument count against the declaration.
    pub fn parametrize(&mut self, binary_name: &str, args: Vec<Type>) -> Result<Type, EvalError> {
        let id = self.cache.ensure_class(&self.host, binary_name)?;
        Ok(self.cache.store().parametrize(None, id, args)?)
    }

    pub fn resolve_constructor(
        &mut self,
        target: &Type,
        type_args: &[Type],
        arg_types: &[Type],
    ) -> Result<MethodResolution, EvalError> {
        in_context(&self.cache, &mut self.scope, |ctx| {
            resolve_constructor_call(ctx, target, type_args, arg_types)
        })
        .map_err(EvalError::from)
    }

    pub fn resolve_method(
        &mut self,
        target: &Type,
        name: &str,
        call_kind: CallKind,
        type_args: &[Type],
        arg_types: &[Type],
    ) -> Result<MethodResolution, EvalError> {
        let call = MethodCall {
            receiver: target.clone(),
            call_kind,
            name,
            args: arg_types.to_vec(),
            explicit_type_args: type_args.to_vec(),
        };
        in_context(&self.cache, &mut self.scope, |ctx| resolve_method_call(ctx, &call))
            .map_err(EvalError::from)
    }

    pub fn resolve_field(
        &mut self,
        target: &Type,
        name: &str,
        call_kind: CallKind,
    ) -> Result<FieldResolution, EvalError> {
        in_context(&self.cache, &mut self.scope, |ctx| {
            resolve_field(ctx, target, name, call_kind)
        })
        .map_err(EvalError::from)
    }

    pub fn convertible_to(&mut self, from: &Type, to: &Type) -> bool {
        in_context(&self.cache, &mut self.scope, |ctx| is_convertible(&*ctx, from, to))
    }

    pub fn capture(&mut self, ty: &ParametrizedType) -> Result<ParametrizedType, EvalError> {
        in_context(&self.cache, &mut self.scope, |ctx| ctx.capture(ty)).map_err(EvalError::from)
    }

    /// Java-like rendering of `ty`, including capture variables of the current request.
    pub fn format_type(&mut self, ty: &Type) -> String {
        in_context(&self.cache, &mut self.scope, |ctx| format_type(&*ctx, ty))
    }

    /// Diagnostic text for a resolution outcome.
    pub fn describe_resolution(&mut self, resolution: &MethodResolution) -> String {
        in_context(&self.cache, &mut self.scope, |ctx| {
            resolution.display(&*ctx).to_string()
        })
    }

    /// Invoke a resolved constructor or method. Refused while side effects are disabled.
    pub fn invoke(
        &mut self,
        callable: &Callable,
        receiver: Option<&Value>,
        args: Vec<Value>,
    ) -> Result<Option<Value>, EvalError> {
        self.check_side_effects(callable.member())?;
        let host = &mut self.host;
        in_context(&self.cache, &mut self.scope, |ctx| {
            callable.invoke(&*ctx, host, receiver, args)
        })
        .map_err(EvalError::from)
    }

    pub fn get(
        &mut self,
        field: &Accessible,
        receiver: Option<&Value>,
    ) -> Result<Value, EvalError> {
        Ok(field.get(&mut self.host, receiver)?)
    }

    /// Store into a field. Refused while side effects are disabled.
    pub fn set(
        &mut self,
        field: &Accessible,
        receiver: Option<&Value>,
        value: Value,
    ) -> Result<(), EvalError> {
        self.check_side_effects(field.member())?;
        let host = &mut self.host;
        in_context(&self.cache, &mut self.scope, |ctx| {
            field.set(&*ctx, host, receiver, value)
        })
        .map_err(EvalError::from)
    }

    /// Forget the capture variables of the finished request.
    pub fn end_request(&mut self) {
        self.scope.clear();
    }

    /// Drop every type loaded from the host, for hosts that reload classes. Types obtained
    /// before the purge must not be reused.
    pub fn purge(&mut self) {
        self.scope.clear();
        self.cache.clear();
    }

    fn check_side_effects(&self, member: &MemberRef) -> Result<(), InvocationError> {
        if self.allow_side_effects {
            return Ok(());
        }
        tracing::debug!(
            target = "brew.invoke",
            member = %member,
            "refusing host call: side effects disabled"
        );
        Err(InvocationError::SideEffectsDisallowed {
            member: member.to_string(),
        })
    }
}
