//! Resolved members: [`Callable`] (constructors, methods, array `clone()`) and [`Accessible`]
//! (fields, array `length`), plus the lookups that produce them from a receiver type.

use std::collections::{HashSet, VecDeque};

use brew_host::{HostProvider, HostValue, MemberRef};

use crate::java::format::{erased_binary_name, format_type, format_type_list};
use crate::java::helpers::{direct_supertypes, erasure, unboxed_primitive};
use crate::java::subst::Substitutions;
use crate::java::subtyping::{is_convertible, is_subtype};
use crate::value::widen;
use crate::{
    CallKind, ClassId, ConstructorDef, InvocationError, MethodDef, Type, TyContext, TypeEnv,
    TypeError, TypeVarId, Value,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallableKind {
    Constructor,
    Method,
    /// `clone()` on an array receiver.
    ArrayClone,
}

/// A constructor or method as seen from one receiver type: parameter and return types already
/// have the receiver's type arguments substituted.
///
/// A varargs method yields two forms. The declared form takes the trailing array as is; the
/// vararg-enabled form ([`Callable::with_varargs_enabled`]) takes the array's element type and
/// accepts any number of trailing arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Callable {
    kind: CallableKind,
    name: String,
    declaring_type: Type,
    type_params: Vec<TypeVarId>,
    type_args: Vec<Type>,
    receiver_bindings: Substitutions,
    params: Vec<Type>,
    return_type: Type,
    is_static: bool,
    is_abstract: bool,
    supports_varargs: bool,
    varargs_enabled: bool,
    member: MemberRef,
}

impl Callable {
    pub(crate) fn method(
        env: &dyn TypeEnv,
        declaring_type: Type,
        owner: &str,
        bindings: Substitutions,
        def: &MethodDef,
    ) -> Self {
        let erased = def
            .params
            .iter()
            .map(|p| erased_binary_name(env, p))
            .collect();
        Self {
            kind: CallableKind::Method,
            name: def.name.clone(),
            declaring_type,
            type_params: def.type_params.clone(),
            type_args: Vec::new(),
            params: bindings.apply_all(&def.params),
            return_type: bindings.apply(&def.return_type),
            receiver_bindings: bindings,
            is_static: def.is_static,
            is_abstract: def.is_abstract,
            supports_varargs: def.is_varargs && def.params.last().is_some_and(Type::is_array),
            varargs_enabled: false,
            member: MemberRef::method(owner, &def.name, erased),
        }
    }

    pub(crate) fn constructor(
        env: &dyn TypeEnv,
        declaring_type: Type,
        owner: &str,
        bindings: Substitutions,
        def: &ConstructorDef,
    ) -> Self {
        let erased = def
            .params
            .iter()
            .map(|p| erased_binary_name(env, p))
            .collect();
        Self {
            kind: CallableKind::Constructor,
            name: "<init>".to_string(),
            return_type: declaring_type.clone(),
            declaring_type,
            type_params: def.type_params.clone(),
            type_args: Vec::new(),
            params: bindings.apply_all(&def.params),
            receiver_bindings: bindings,
            is_static: false,
            is_abstract: false,
            supports_varargs: def.is_varargs && def.params.last().is_some_and(Type::is_array),
            varargs_enabled: false,
            member: MemberRef::method(owner, "<init>", erased),
        }
    }

    /// `clone()` on `array`, returning the array type itself.
    pub fn array_clone(env: &dyn TypeEnv, array: &Type) -> Self {
        Self {
            kind: CallableKind::ArrayClone,
            name: "clone".to_string(),
            declaring_type: array.clone(),
            type_params: Vec::new(),
            type_args: Vec::new(),
            receiver_bindings: Substitutions::empty(),
            params: Vec::new(),
            return_type: array.clone(),
            is_static: false,
            is_abstract: false,
            supports_varargs: false,
            varargs_enabled: false,
            member: MemberRef::method(erased_binary_name(env, array), "clone", Vec::new()),
        }
    }

    pub fn kind(&self) -> CallableKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declaring_type(&self) -> &Type {
        &self.declaring_type
    }

    pub fn params(&self) -> &[Type] {
        &self.params
    }

    pub fn return_type(&self) -> &Type {
        &self.return_type
    }

    pub fn type_params(&self) -> &[TypeVarId] {
        &self.type_params
    }

    /// Explicit type arguments bound with [`Callable::bind_type_args`].
    pub fn type_args(&self) -> &[Type] {
        &self.type_args
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn supports_varargs(&self) -> bool {
        self.supports_varargs
    }

    pub fn varargs_enabled(&self) -> bool {
        self.varargs_enabled
    }

    /// Host-side identity: owner binary name, member name and erased parameter types.
    pub fn member(&self) -> &MemberRef {
        &self.member
    }

    /// `Type.name(params)` for diagnostics.
    pub fn describe(&self, env: &dyn TypeEnv) -> String {
        let mut params = format_type_list(env, &self.params);
        if self.varargs_enabled {
            params.push_str("...");
        }
        format!(
            "{}.{}({})",
            format_type(env, &self.declaring_type),
            self.name,
            params
        )
    }

    /// The vararg-enabled form, if this is the declared form of a varargs callable.
    pub fn with_varargs_enabled(&self) -> Option<Callable> {
        if !self.supports_varargs || self.varargs_enabled {
            return None;
        }
        let (last, init) = self.params.split_last()?;
        let elem = last.component_type()?.clone();
        let mut params = init.to_vec();
        params.push(elem);
        Some(Callable {
            params,
            varargs_enabled: true,
            ..self.clone()
        })
    }

    /// Parameter type at argument position `idx`. Positions past the end reuse the last
    /// parameter.
    pub fn param_at(&self, idx: usize) -> Option<&Type> {
        self.params.get(idx).or_else(|| self.params.last())
    }

    /// Parameter types aligned with `arg_count` arguments.
    pub fn expanded_params(&self, arg_count: usize) -> Vec<Type> {
        if !self.varargs_enabled {
            return self.params.clone();
        }
        (0..arg_count)
            .filter_map(|idx| self.param_at(idx).cloned())
            .collect()
    }

    fn accepts_arity(&self, arg_count: usize) -> bool {
        if self.varargs_enabled {
            arg_count + 1 >= self.params.len()
        } else {
            arg_count == self.params.len()
        }
    }

    /// Arity matches and every argument converts to its parameter.
    ///
    /// An argument passed where the parameter is a method type variable must also fit that
    /// variable's bounds as seen through the receiver's type arguments.
    pub fn is_applicable(&self, env: &dyn TypeEnv, args: &[Type]) -> bool {
        self.accepts_arity(args.len())
            && args.iter().enumerate().all(|(idx, arg)| {
                self.param_at(idx).is_some_and(|param| {
                    is_convertible(env, arg, param)
                        && match param {
                            Type::TypeVar(var) if self.type_params.contains(var) => {
                                self.fits_method_var_bounds(env, *var, arg)
                            }
                            _ => true,
                        }
                })
            })
    }

    /// Check `arg` against the bounds of method type variable `var`, taking `var` to be the
    /// argument's (boxed) type. Other method type variables stand for their erased bounds.
    fn fits_method_var_bounds(&self, env: &dyn TypeEnv, var: TypeVarId, arg: &Type) -> bool {
        let witness = match arg {
            Type::Null => return true,
            Type::Primitive(prim) => Type::Class(env.well_known().box_class(*prim)),
            other => other.clone(),
        };
        let object = env.well_known().object_type();
        let siblings = self
            .type_params
            .iter()
            .filter(|tp| **tp != var)
            .map(|tp| {
                let bound = env
                    .type_param(*tp)
                    .and_then(|d| d.upper_bounds.first().cloned())
                    .map(|b| erasure(env, &self.receiver_bindings.apply(&b)))
                    .unwrap_or_else(|| object.clone());
                (*tp, bound)
            });
        let in_call =
            Substitutions::simultaneous(siblings.chain(std::iter::once((var, witness.clone()))));

        let bounds = env
            .type_param(var)
            .map(|d| d.upper_bounds.clone())
            .unwrap_or_default();
        bounds.iter().all(|bound| {
            let bound = in_call.apply(&self.receiver_bindings.apply(bound));
            let fits = is_convertible(env, &witness, &bound);
            if !fits {
                tracing::debug!(
                    target = "brew.resolve",
                    member = %self.member,
                    arg = %format_type(env, &witness),
                    bound = %format_type(env, &bound),
                    "argument violates a method type parameter bound"
                );
            }
            fits
        })
    }

    /// Whether `self` is at least as specific as `other` for a call with `args`.
    ///
    /// Positions are aligned with the shorter signature reusing its final parameter. Primitive
    /// parameters compare by widening and reference parameters by subtyping; a primitive
    /// parameter beats a reference one only for a primitive argument, and vice versa.
    pub fn is_more_applicable_than(
        &self,
        env: &dyn TypeEnv,
        other: &Callable,
        args: &[Type],
    ) -> bool {
        let positions = args.len().max(self.params.len()).max(other.params.len());
        (0..positions).all(|idx| {
            let (Some(mine), Some(theirs)) = (self.param_at(idx), other.param_at(idx)) else {
                return true;
            };
            let arg = args.get(idx);
            match (mine, theirs) {
                (Type::Primitive(a), Type::Primitive(b)) => a.can_widen_to(*b),
                (Type::Primitive(_), _) => arg.map_or(true, Type::is_primitive),
                (_, Type::Primitive(_)) => arg.map_or(true, |a| !a.is_primitive()),
                _ => is_subtype(env, mine, theirs),
            }
        })
    }

    /// Bind explicit method type arguments, checking each against its declared bounds.
    ///
    /// Non-generic callables ignore explicit arguments. `None` means the arguments do not fit:
    /// wrong count, a primitive or wildcard argument, or a bound violation.
    pub fn bind_type_args(&self, env: &dyn TypeEnv, type_args: &[Type]) -> Option<Callable> {
        if type_args.is_empty() || self.type_params.is_empty() {
            return Some(self.clone());
        }
        if type_args.len() != self.type_params.len()
            || type_args
                .iter()
                .any(|t| t.is_primitive() || t.is_wildcard() || t.is_void())
        {
            return None;
        }

        let method_bindings = Substitutions::simultaneous(
            self.type_params
                .iter()
                .copied()
                .zip(type_args.iter().cloned()),
        );
        let all = self.receiver_bindings.merged(&method_bindings);
        for (param, arg) in self.type_params.iter().zip(type_args) {
            let bounds = env
                .type_param(*param)
                .map(|d| d.upper_bounds.clone())
                .unwrap_or_default();
            if let Some(bound) = bounds
                .iter()
                .map(|b| all.apply(b))
                .find(|b| !is_convertible(env, arg, b))
            {
                tracing::debug!(
                    target = "brew.resolve",
                    member = %self.member,
                    arg = %format_type(env, arg),
                    bound = %format_type(env, &bound),
                    "explicit type argument violates its bound"
                );
                return None;
            }
        }

        Some(Callable {
            params: method_bindings.apply_all(&self.params),
            return_type: method_bindings.apply(&self.return_type),
            type_args: type_args.to_vec(),
            ..self.clone()
        })
    }

    /// Return type with unbound method type parameters replaced by their first bound.
    ///
    /// Bounds mentioning other type parameters of the same method are reduced in dependency
    /// order; a mutual dependency falls back to erasure.
    pub fn effective_return_type(&self, env: &dyn TypeEnv) -> Type {
        if self.type_params.is_empty() || !self.type_args.is_empty() {
            return self.return_type.clone();
        }
        let object = env.well_known().object_type();
        let bindings = self.type_params.iter().map(|tp| {
            let bound = env
                .type_param(*tp)
                .and_then(|d| d.upper_bounds.first().cloned())
                .unwrap_or_else(|| object.clone());
            (*tp, self.receiver_bindings.apply(&bound))
        });
        match Substitutions::resolve(bindings) {
            Ok(subst) => subst.apply(&self.return_type),
            Err(_) => erasure(env, &self.return_type),
        }
    }

    /// Run the callable on the host.
    ///
    /// Arguments are coerced to the parameter types first (primitive widening, boxing and
    /// unboxing); the vararg-enabled form packs its trailing arguments into a fresh array.
    /// Returns `None` for `void` methods.
    pub fn invoke(
        &self,
        env: &dyn TypeEnv,
        host: &mut dyn HostProvider,
        receiver: Option<&Value>,
        args: Vec<Value>,
    ) -> Result<Option<Value>, InvocationError> {
        let receiver_raw = match self.kind {
            CallableKind::Constructor => None,
            CallableKind::Method if self.is_static => None,
            CallableKind::Method | CallableKind::ArrayClone => Some(
                &receiver
                    .ok_or_else(|| InvocationError::MissingReceiver {
                        member: self.member.to_string(),
                    })?
                    .raw,
            ),
        };
        if !self.accepts_arity(args.len()) {
            return Err(InvocationError::ArgumentCount {
                member: self.member.to_string(),
                expected: self.params.len(),
                found: args.len(),
            });
        }

        tracing::debug!(
            target = "brew.invoke",
            member = %self.member,
            args = args.len(),
            varargs = self.varargs_enabled,
            "invoking"
        );
        let raw_args = self.coerce_args(env, host, args)?;
        let result = match self.kind {
            CallableKind::Constructor => host.new_instance(&self.member, raw_args),
            CallableKind::Method => host.invoke_method(&self.member, receiver_raw, raw_args),
            CallableKind::ArrayClone => match receiver_raw {
                Some(array) => host.clone_array(array),
                None => Err(brew_host::HostError::Other("missing array".to_string())),
            },
        }
        .map_err(|err| {
            tracing::warn!(
                target = "brew.invoke",
                member = %self.member,
                error = %err,
                "host call failed"
            );
            InvocationError::host(&self.member, err)
        })?;

        if self.return_type.is_void() || result == HostValue::Void {
            return Ok(None);
        }
        Ok(Some(Value::new(self.effective_return_type(env), result)))
    }

    fn coerce_args(
        &self,
        env: &dyn TypeEnv,
        host: &mut dyn HostProvider,
        mut args: Vec<Value>,
    ) -> Result<Vec<HostValue>, InvocationError> {
        let trailing = if self.varargs_enabled {
            let fixed = self.params.len().saturating_sub(1);
            Some(args.split_off(fixed.min(args.len())))
        } else {
            None
        };

        let mut out = Vec::with_capacity(self.params.len());
        for (value, param) in args.into_iter().zip(self.params.iter()) {
            out.push(coerce(env, host, &self.member, value, param)?);
        }

        if let Some(trailing) = trailing {
            let Some(elem) = self.params.last() else {
                return Ok(out);
            };
            let mut elements = Vec::with_capacity(trailing.len());
            for value in trailing {
                elements.push(coerce(env, host, &self.member, value, elem)?);
            }
            let array = host
                .new_array(&erased_binary_name(env, elem), elements)
                .map_err(|err| InvocationError::host(&self.member, err))?;
            out.push(array);
        }
        Ok(out)
    }
}

/// Convert a value to the raw representation `target` expects on the host.
pub(crate) fn coerce(
    env: &dyn TypeEnv,
    host: &mut dyn HostProvider,
    member: &MemberRef,
    value: Value,
    target: &Type,
) -> Result<HostValue, InvocationError> {
    match target {
        Type::Primitive(prim) => {
            let raw = match value.raw {
                HostValue::Object(_) => host
                    .unbox_value(&value.raw)
                    .map_err(|err| InvocationError::host(member, err))?,
                other => other,
            };
            Ok(widen(&raw, *prim).unwrap_or(raw))
        }
        _ if value.raw.is_primitive() => {
            // Widen first when the target is the box of a wider primitive.
            let raw = match unboxed_primitive(env, target) {
                Some(prim) => widen(&value.raw, prim).unwrap_or(value.raw),
                None => value.raw,
            };
            host.box_value(&raw)
                .map_err(|err| InvocationError::host(member, err))
        }
        _ => Ok(value.raw),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessibleKind {
    Field,
    /// `length` on an array receiver.
    ArrayLength,
}

/// A readable (and possibly writable) member as seen from one receiver type.
#[derive(Debug, Clone, PartialEq)]
pub struct Accessible {
    kind: AccessibleKind,
    name: String,
    declaring_type: Type,
    declared_type: Type,
    target_type: Type,
    is_static: bool,
    is_final: bool,
    member: MemberRef,
}

impl Accessible {
    pub fn array_length(env: &dyn TypeEnv, array: &Type) -> Self {
        let int = Type::Primitive(crate::PrimitiveType::Int);
        Self {
            kind: AccessibleKind::ArrayLength,
            name: "length".to_string(),
            declaring_type: array.clone(),
            declared_type: int.clone(),
            target_type: int,
            is_static: false,
            is_final: true,
            member: MemberRef::field(erased_binary_name(env, array), "length"),
        }
    }

    pub fn kind(&self) -> AccessibleKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declaring_type(&self) -> &Type {
        &self.declaring_type
    }

    /// The type as written in the declaration.
    pub fn declared_type(&self) -> &Type {
        &self.declared_type
    }

    /// The type seen through the receiver's type arguments.
    pub fn target_type(&self) -> &Type {
        &self.target_type
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn member(&self) -> &MemberRef {
        &self.member
    }

    fn receiver_raw<'v>(
        &self,
        receiver: Option<&'v Value>,
    ) -> Result<Option<&'v HostValue>, InvocationError> {
        if self.is_static {
            return Ok(None);
        }
        receiver
            .map(|r| Some(&r.raw))
            .ok_or_else(|| InvocationError::MissingReceiver {
                member: self.member.to_string(),
            })
    }

    pub fn get(
        &self,
        host: &mut dyn HostProvider,
        receiver: Option<&Value>,
    ) -> Result<Value, InvocationError> {
        let receiver = self.receiver_raw(receiver)?;
        let raw = match (self.kind, receiver) {
            (AccessibleKind::ArrayLength, Some(array)) => {
                host.array_length(array).map(HostValue::Int)
            }
            _ => host.get_field(&self.member, receiver),
        }
        .map_err(|err| InvocationError::host(&self.member, err))?;
        Ok(Value::new(self.target_type.clone(), raw))
    }

    /// Store `value`, coercing it to the target type. Array length is read-only.
    pub fn set(
        &self,
        env: &dyn TypeEnv,
        host: &mut dyn HostProvider,
        receiver: Option<&Value>,
        value: Value,
    ) -> Result<(), InvocationError> {
        if self.kind == AccessibleKind::ArrayLength {
            return Err(InvocationError::ReadOnly {
                member: self.member.to_string(),
            });
        }
        let receiver = self.receiver_raw(receiver)?;
        let raw = coerce(env, host, &self.member, value, &self.target_type)?;
        tracing::debug!(target = "brew.invoke", member = %self.member, "setting field");
        host.set_field(&self.member, receiver, raw)
            .map_err(|err| InvocationError::host(&self.member, err))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldResolution {
    Found(Accessible),
    NotFound { name: String, receiver: Type },
}

impl FieldResolution {
    pub fn found(&self) -> Option<&Accessible> {
        match self {
            FieldResolution::Found(acc) => Some(acc),
            FieldResolution::NotFound { .. } => None,
        }
    }
}

/// Bindings that members of `ty` see: the (captured) arguments of a parametrization, the
/// erasures of the formals for a raw type, nothing otherwise.
fn member_bindings(ctx: &mut TyContext<'_>, ty: &Type) -> Substitutions {
    match ty {
        Type::Parametrized(p) => ctx.substitutions(p),
        Type::Class(id) => {
            let formals = ctx
                .class(*id)
                .map(|d| d.type_params.clone())
                .unwrap_or_default();
            Substitutions::simultaneous(
                formals
                    .into_iter()
                    .map(|f| (f, erasure(&*ctx, &Type::TypeVar(f)))),
            )
        }
        _ => Substitutions::empty(),
    }
}

/// Walk `start` and its supertypes breadth-first, visiting each declaration once.
fn walk_declarations(
    ctx: &mut TyContext<'_>,
    start: Type,
    mut visit: impl FnMut(&mut TyContext<'_>, &Type, ClassId) -> bool,
) {
    let mut queue = VecDeque::from([start]);
    let mut visited: HashSet<ClassId> = HashSet::new();
    let mut seen_other: HashSet<Type> = HashSet::new();
    while let Some(current) = queue.pop_front() {
        match current.class_id() {
            Some(id) => {
                if !visited.insert(id) {
                    continue;
                }
                if !visit(ctx, &current, id) {
                    return;
                }
            }
            None => {
                if !seen_other.insert(current.clone()) {
                    continue;
                }
            }
        }
        queue.extend(direct_supertypes(&*ctx, &current));
    }
}

/// Locate field `name` on `receiver` or its supertypes. The receiver is captured first.
pub fn resolve_field(
    ctx: &mut TyContext<'_>,
    receiver: &Type,
    name: &str,
    call_kind: CallKind,
) -> Result<FieldResolution, TypeError> {
    let receiver = ctx.capture_type(receiver)?;
    if receiver.is_array() && name == "length" && call_kind == CallKind::Instance {
        return Ok(FieldResolution::Found(Accessible::array_length(&*ctx, &receiver)));
    }

    let mut found: Option<Accessible> = None;
    walk_declarations(ctx, receiver.clone(), |ctx, current, id| {
        let Some(def) = ctx.class(id) else {
            return true;
        };
        let Some(field) = def.fields.iter().find(|f| f.name == name).cloned() else {
            return true;
        };
        let owner = def.name.clone();
        if call_kind == CallKind::Static && !field.is_static {
            return false;
        }
        let bindings = member_bindings(ctx, current);
        found = Some(Accessible {
            kind: AccessibleKind::Field,
            name: field.name.clone(),
            declaring_type: current.clone(),
            target_type: bindings.apply(&field.ty),
            declared_type: field.ty,
            is_static: field.is_static,
            is_final: field.is_final,
            member: MemberRef::field(owner, name),
        });
        false
    });

    tracing::debug!(
        target = "brew.resolve",
        field = name,
        receiver = %format_type(&*ctx, &receiver),
        found = found.is_some(),
        "field lookup"
    );
    Ok(match found {
        Some(acc) => FieldResolution::Found(acc),
        None => FieldResolution::NotFound {
            name: name.to_string(),
            receiver,
        },
    })
}

/// Methods named `name` visible on `receiver` (already captured), most derived first.
/// Declarations overridden by an already collected method (same erased parameters) are skipped.
pub(crate) fn collect_methods(
    ctx: &mut TyContext<'_>,
    receiver: &Type,
    name: &str,
    call_kind: CallKind,
) -> Vec<Callable> {
    let mut out = Vec::new();
    let mut signatures: HashSet<Vec<String>> = HashSet::new();

    if receiver.is_array() && name == "clone" && call_kind == CallKind::Instance {
        out.push(Callable::array_clone(&*ctx, receiver));
        signatures.insert(Vec::new());
    }

    walk_declarations(ctx, receiver.clone(), |ctx, current, id| {
        let Some(def) = ctx.class(id) else {
            return true;
        };
        let owner = def.name.clone();
        let methods: Vec<MethodDef> = def
            .methods
            .iter()
            .filter(|m| m.name == name)
            .cloned()
            .collect();
        if methods.is_empty() {
            return true;
        }
        let bindings = member_bindings(ctx, current);
        for method in &methods {
            let callable =
                Callable::method(&*ctx, current.clone(), &owner, bindings.clone(), method);
            if !signatures.insert(callable.member.params.clone()) {
                continue;
            }
            if call_kind == CallKind::Static && !method.is_static {
                continue;
            }
            out.push(callable);
        }
        true
    });
    out
}

/// Accessible constructors of `target`. Interfaces and non-class types have none.
pub(crate) fn collect_constructors(ctx: &mut TyContext<'_>, target: &Type) -> Vec<Callable> {
    let Some(id) = target.class_id() else {
        return Vec::new();
    };
    let Some(def) = ctx.class(id) else {
        return Vec::new();
    };
    if def.is_interface() {
        return Vec::new();
    }
    let owner = def.name.clone();
    let ctors: Vec<ConstructorDef> = def
        .constructors
        .iter()
        .filter(|c| c.is_accessible)
        .cloned()
        .collect();
    let bindings = member_bindings(ctx, target);
    ctors
        .iter()
        .map(|c| Callable::constructor(&*ctx, target.clone(), &owner, bindings.clone(), c))
        .collect()
}
