use brew_host::{HostError, HostValue, MockHost};
use brew_types::{
    resolve_field, resolve_method_call, AccessibleKind, CallKind, Callable, ClassDef, ClassKind,
    FieldDef, FieldResolution, InvocationError, MethodCall, PrimitiveType, Type, TyContext,
    TypeEnv, TypeStore, Value,
};

use pretty_assertions::assert_eq;

fn int() -> Type {
    Type::Primitive(PrimitiveType::Int)
}

fn resolve(
    ctx: &mut TyContext<'_>,
    receiver: Type,
    kind: CallKind,
    name: &str,
    args: Vec<Type>,
) -> Callable {
    let call = MethodCall {
        receiver,
        call_kind: kind,
        name,
        args,
        explicit_type_args: vec![],
    };
    resolve_method_call(ctx, &call)
        .unwrap()
        .into_found()
        .unwrap_or_else(|| panic!("`{name}` should resolve"))
        .callable
}

#[test]
fn static_call_widens_primitive_arguments() {
    let env = TypeStore::with_minimal_jdk();
    let string = Type::Class(env.well_known().string);
    let mut ctx = TyContext::new(&env);
    let mut host = MockHost::new();

    let value_of = resolve(
        &mut ctx,
        string.clone(),
        CallKind::Static,
        "valueOf",
        vec![Type::Primitive(PrimitiveType::Byte)],
    );
    let result_obj = host.alloc_object("java.lang.String", []);
    host.push_result("java.lang.String", "valueOf", Ok(result_obj.clone()));

    let result = value_of
        .invoke(
            &ctx,
            &mut host,
            None,
            vec![Value::new(Type::Primitive(PrimitiveType::Byte), HostValue::Byte(5))],
        )
        .unwrap();
    assert_eq!(result, Some(Value::new(string, result_obj)));
    assert_eq!(host.calls.len(), 1);
    assert_eq!(host.calls[0].member.params, vec!["int".to_string()]);
    assert_eq!(host.calls[0].args, vec![HostValue::Int(5)]);
    assert_eq!(host.calls[0].receiver, None);
}

#[test]
fn vararg_arguments_are_packed_into_a_host_array() {
    let env = TypeStore::with_minimal_jdk();
    let wk = env.well_known();
    let string = Type::Class(wk.string);
    let arrays = env.class_id("java.util.Arrays").unwrap();
    let list = env.class_id("java.util.List").unwrap();
    let mut ctx = TyContext::new(&env);
    let mut host = MockHost::new();

    let as_list = resolve(
        &mut ctx,
        Type::Class(arrays),
        CallKind::Static,
        "asList",
        vec![string.clone(), string.clone()],
    );
    let a = host.alloc_object("java.lang.String", []);
    let b = host.alloc_object("java.lang.String", []);
    let list_obj = host.alloc_object("java.util.Arrays$ArrayList", []);
    host.push_result("java.util.Arrays", "asList", Ok(list_obj.clone()));

    let result = as_list
        .invoke(
            &ctx,
            &mut host,
            None,
            vec![
                Value::new(string.clone(), a.clone()),
                Value::new(string.clone(), b.clone()),
            ],
        )
        .unwrap()
        .unwrap();
    assert_eq!(result.ty, Type::class(list, vec![wk.object_type()]));
    assert_eq!(result.raw, list_obj);

    let args = &host.calls[0].args;
    assert_eq!(args.len(), 1);
    let packed = host.object(args[0].object_id().unwrap()).unwrap();
    assert_eq!(packed.runtime_type, "java.lang.Object[]");
    assert_eq!(packed.elements, Some(vec![a, b]));
}

#[test]
fn primitive_arguments_are_boxed_for_reference_parameters() {
    let env = TypeStore::with_minimal_jdk();
    let wk = env.well_known();
    let array_list = env.class_id("java.util.ArrayList").unwrap();
    let receiver_ty = Type::class(array_list, vec![Type::Class(wk.integer)]);
    let mut ctx = TyContext::new(&env);
    let mut host = MockHost::new();

    let add = resolve(&mut ctx, receiver_ty.clone(), CallKind::Instance, "add", vec![int()]);
    let receiver = Value::new(receiver_ty, host.alloc_object("java.util.ArrayList", []));
    host.push_result("java.util.ArrayList", "add", Ok(HostValue::Boolean(true)));

    let result = add
        .invoke(&ctx, &mut host, Some(&receiver), vec![Value::int(3)])
        .unwrap();
    assert_eq!(result, Some(Value::boolean(true)));

    let boxed = &host.calls[0].args[0];
    let boxed_obj = host.object(boxed.object_id().unwrap()).unwrap();
    assert_eq!(boxed_obj.runtime_type, "java.lang.Integer");
    assert_eq!(boxed_obj.boxed, Some(HostValue::Int(3)));
    assert_eq!(host.calls[0].receiver, Some(receiver.raw.clone()));
}

#[test]
fn boxed_arguments_are_unboxed_for_primitive_parameters() {
    let env = TypeStore::with_minimal_jdk();
    let wk = env.well_known();
    let array_list = env.class_id("java.util.ArrayList").unwrap();
    let target = Type::class(array_list, vec![Type::Class(wk.string)]);
    let mut ctx = TyContext::new(&env);
    let mut host = MockHost::new();

    let ctor =
        brew_types::resolve_constructor_call(&mut ctx, &target, &[], &[Type::Class(wk.integer)])
            .unwrap()
            .into_found()
            .unwrap()
            .callable;
    let boxed = brew_host::HostProvider::box_value(&mut host, &HostValue::Int(16)).unwrap();

    let created = ctor
        .invoke(&ctx, &mut host, None, vec![Value::new(Type::Class(wk.integer), boxed)])
        .unwrap()
        .unwrap();
    assert_eq!(created.ty, target);
    assert_eq!(created.raw.runtime_type(), "java.util.ArrayList");
    assert_eq!(host.calls[0].args, vec![HostValue::Int(16)]);
    assert_eq!(host.calls[0].member.to_string(), "java.util.ArrayList.<init>(int)");
}

#[test]
fn instance_methods_require_a_receiver() {
    let env = TypeStore::with_minimal_jdk();
    let string = Type::Class(env.well_known().string);
    let mut ctx = TyContext::new(&env);
    let mut host = MockHost::new();

    let length = resolve(&mut ctx, string, CallKind::Instance, "length", vec![]);
    let err = length.invoke(&ctx, &mut host, None, vec![]).unwrap_err();
    assert!(matches!(err, InvocationError::MissingReceiver { .. }), "{err:?}");
    assert!(host.calls.is_empty());

    let err = length
        .invoke(&ctx, &mut host, Some(&Value::null()), vec![Value::int(1)])
        .unwrap_err();
    assert!(
        matches!(err, InvocationError::ArgumentCount { expected: 0, found: 1, .. }),
        "{err:?}"
    );
}

#[test]
fn host_failures_keep_their_cause() {
    let env = TypeStore::with_minimal_jdk();
    let string = Type::Class(env.well_known().string);
    let mut ctx = TyContext::new(&env);
    let mut host = MockHost::new();

    let concat = resolve(
        &mut ctx,
        string.clone(),
        CallKind::Instance,
        "concat",
        vec![string.clone()],
    );
    host.push_result(
        "java.lang.String",
        "concat",
        Err(HostError::Threw {
            exception_type: "java.lang.NullPointerException".to_string(),
            message: "receiver was null".to_string(),
        }),
    );
    let receiver = Value::new(string.clone(), host.alloc_object("java.lang.String", []));

    let err = concat
        .invoke(&ctx, &mut host, Some(&receiver), vec![Value::null()])
        .unwrap_err();
    let InvocationError::Host { member, source } = &err else {
        panic!("expected host failure, got {err:?}");
    };
    assert_eq!(member.to_string(), "java.lang.String.concat(java.lang.String)");
    assert!(matches!(source, HostError::Threw { .. }));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn static_fields() {
    let env = TypeStore::with_minimal_jdk();
    let integer = Type::Class(env.well_known().integer);
    let mut ctx = TyContext::new(&env);
    let mut host = MockHost::new();
    host.set_static("java.lang.Integer", "MAX_VALUE", HostValue::Int(i32::MAX));

    let field = resolve_field(&mut ctx, &integer, "MAX_VALUE", CallKind::Static).unwrap();
    let acc = field.found().unwrap();
    assert!(acc.is_static());
    assert!(acc.is_final());
    assert_eq!(acc.target_type(), &int());
    assert_eq!(acc.get(&mut host, None).unwrap(), Value::int(i32::MAX));

    let missing = resolve_field(&mut ctx, &integer, "MIN_VALUE", CallKind::Static).unwrap();
    assert_eq!(
        missing,
        FieldResolution::NotFound {
            name: "MIN_VALUE".to_string(),
            receiver: integer,
        }
    );
}

#[test]
fn generic_fields_are_seen_through_receiver_arguments() {
    let mut env = TypeStore::with_minimal_jdk();
    let wk = env.well_known().clone();
    let string = Type::Class(wk.string);

    // class Holder<T> { T value; long count; }
    let t = env.add_type_param("T", vec![wk.object_type()]);
    let holder = env.add_class(ClassDef {
        type_params: vec![t],
        super_class: Some(wk.object_type()),
        fields: vec![
            FieldDef {
                name: "value".to_string(),
                ty: Type::TypeVar(t),
                is_static: false,
                is_final: false,
            },
            FieldDef {
                name: "count".to_string(),
                ty: Type::Primitive(PrimitiveType::Long),
                is_static: false,
                is_final: false,
            },
        ],
        ..ClassDef::new("com.example.Holder", ClassKind::Class)
    });
    let holder_string = Type::class(holder, vec![string.clone()]);
    let mut ctx = TyContext::new(&env);
    let mut host = MockHost::new();

    let value = resolve_field(&mut ctx, &holder_string, "value", CallKind::Instance).unwrap();
    let value = value.found().unwrap();
    assert_eq!(value.declared_type(), &Type::TypeVar(t));
    assert_eq!(value.target_type(), &string);

    // Raw receivers see erased members.
    let raw = resolve_field(&mut ctx, &Type::Class(holder), "value", CallKind::Instance).unwrap();
    assert_eq!(raw.found().unwrap().target_type(), &wk.object_type());

    // Static access to an instance field finds nothing.
    let static_access = resolve_field(&mut ctx, &holder_string, "value", CallKind::Static).unwrap();
    assert!(static_access.found().is_none());

    let count = resolve_field(&mut ctx, &holder_string, "count", CallKind::Instance).unwrap();
    let count = count.found().unwrap().clone();
    let receiver = Value::new(
        holder_string,
        host.alloc_object("com.example.Holder", [("count".to_string(), HostValue::Long(0))]),
    );
    count
        .set(&ctx, &mut host, Some(&receiver), Value::int(41))
        .unwrap();
    assert_eq!(
        count.get(&mut host, Some(&receiver)).unwrap(),
        Value::new(Type::Primitive(PrimitiveType::Long), HostValue::Long(41))
    );
}

#[test]
fn array_length_is_read_only_and_clone_copies() {
    let env = TypeStore::with_minimal_jdk();
    let array_ty = int().as_array(1);
    let mut ctx = TyContext::new(&env);
    let mut host = MockHost::new();
    let array = Value::new(
        array_ty.clone(),
        host.alloc_array("int", vec![HostValue::Int(1), HostValue::Int(2), HostValue::Int(3)]),
    );

    let length = resolve_field(&mut ctx, &array_ty, "length", CallKind::Instance).unwrap();
    let length = length.found().unwrap().clone();
    assert_eq!(length.kind(), AccessibleKind::ArrayLength);
    assert_eq!(length.get(&mut host, Some(&array)).unwrap(), Value::int(3));
    let err = length
        .set(&ctx, &mut host, Some(&array), Value::int(9))
        .unwrap_err();
    assert!(matches!(err, InvocationError::ReadOnly { .. }), "{err:?}");

    let clone = resolve(&mut ctx, array_ty.clone(), CallKind::Instance, "clone", vec![]);
    let copy = clone
        .invoke(&ctx, &mut host, Some(&array), vec![])
        .unwrap()
        .unwrap();
    assert_eq!(copy.ty, array_ty);
    assert_ne!(copy.raw, array.raw);
    let copied = host.object(copy.raw.object_id().unwrap()).unwrap();
    assert_eq!(copied.elements.as_ref().map(Vec::len), Some(3));
}

#[test]
fn void_methods_return_nothing() {
    let env = TypeStore::with_minimal_jdk();
    let runnable = env.class_id("java.lang.Runnable").unwrap();
    let mut ctx = TyContext::new(&env);
    let mut host = MockHost::new();

    let run = resolve(&mut ctx, Type::Class(runnable), CallKind::Instance, "run", vec![]);
    let receiver = Value::new(Type::Class(runnable), host.alloc_object("com.example.Task", []));
    host.push_result("java.lang.Runnable", "run", Ok(HostValue::Void));

    assert_eq!(run.invoke(&ctx, &mut host, Some(&receiver), vec![]).unwrap(), None);
}
