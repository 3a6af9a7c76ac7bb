use brew_config::EvalConfig;
use brew_eval::{CacheError, EvalError, EvalSession};
use brew_host::{HostValue, MockHost};
use brew_types::{
    CallKind, InvocationError, MethodResolution, ParametrizedType, PrimitiveType, Type, TypeEnv,
    Value, WildcardBound,
};

use pretty_assertions::assert_eq;

use super::fixtures;

fn session() -> EvalSession<MockHost> {
    EvalSession::new(fixtures::host(), &EvalConfig::default())
}

fn read_only_session() -> EvalSession<MockHost> {
    let mut config = EvalConfig::default();
    config.invocation.allow_side_effects = false;
    EvalSession::new(fixtures::host(), &config)
}

#[test]
fn members_of_a_parametrized_host_type() {
    let mut session = session();
    let string = session.class_type("java.lang.String").unwrap();
    let box_string = session.parametrize("com.example.Box", vec![string.clone()]).unwrap();

    let get = session
        .resolve_method(&box_string, "get", CallKind::Instance, &[], &[])
        .unwrap();
    assert_eq!(get.found().unwrap().return_type, string);

    let value = session
        .resolve_field(&box_string, "value", CallKind::Instance)
        .unwrap();
    assert_eq!(value.found().unwrap().target_type(), &string);

    let no_match = session
        .resolve_method(
            &box_string,
            "get",
            CallKind::Instance,
            &[],
            &[Type::Primitive(PrimitiveType::Int)],
        )
        .unwrap();
    assert!(matches!(no_match, MethodResolution::NoMatch(_)));
    assert!(session
        .describe_resolution(&no_match)
        .starts_with("no applicable `get` for arguments (int)"));
}

#[test]
fn parametrize_checks_arity() {
    let mut session = session();
    let err = session.parametrize("com.example.Box", vec![]).unwrap_err();
    assert!(
        matches!(
            err,
            EvalError::Type(brew_types::TypeError::ArityMismatch {
                expected: 1,
                found: 0,
                ..
            })
        ),
        "{err:?}"
    );
}

#[test]
fn unknown_host_types_are_cache_errors() {
    let mut session = session();
    let err = session.class_type("com.example.Nope").unwrap_err();
    assert!(
        matches!(
            &err,
            EvalError::Cache(CacheError::UnknownType(name)) if name == "com.example.Nope"
        ),
        "{err:?}"
    );
}

#[test]
fn explicit_type_arguments_respect_f_bounds() {
    let mut session = session();
    let boxed = session.class_type("com.example.Box").unwrap();
    let string = session.class_type("java.lang.String").unwrap();
    let object = session.class_type("java.lang.Object").unwrap();

    let of_string = session
        .resolve_method(
            &boxed,
            "of",
            CallKind::Static,
            &[string.clone()],
            &[string.clone()],
        )
        .unwrap();
    let expected = session.parametrize("com.example.Box", vec![string.clone()]).unwrap();
    assert_eq!(of_string.found().unwrap().return_type, expected);

    // Object is not Comparable<Object>.
    let of_object = session
        .resolve_method(&boxed, "of", CallKind::Static, &[object], &[string])
        .unwrap();
    assert!(matches!(of_object, MethodResolution::NoMatch(_)));
}

#[test]
fn inherited_members_follow_the_f_bound() {
    let mut session = session();
    let leaf = session.class_type("com.example.Leaf").unwrap();
    let node = session.parametrize("com.example.Node", vec![leaf.clone()]).unwrap();

    assert!(session.convertible_to(&leaf, &node));
    let self_call = session
        .resolve_method(&leaf, "self", CallKind::Instance, &[], &[])
        .unwrap();
    assert_eq!(self_call.found().unwrap().return_type, leaf);
}

#[test]
fn inner_class_members_use_owner_arguments() {
    let mut session = session();
    let inner = session.class_type("com.example.Outer$Inner").unwrap();
    let outer = session.class_type("com.example.Outer").unwrap();
    let string = session.class_type("java.lang.String").unwrap();
    let integer = session.class_type("java.lang.Integer").unwrap();

    let ty = Type::Parametrized(
        ParametrizedType::new(inner.class_id().unwrap(), vec![integer.clone()])
            .with_owner(ParametrizedType::new(outer.class_id().unwrap(), vec![string.clone()])),
    );
    let first = session
        .resolve_method(&ty, "first", CallKind::Instance, &[], &[])
        .unwrap();
    let second = session
        .resolve_method(&ty, "second", CallKind::Instance, &[], &[])
        .unwrap();
    assert_eq!(first.found().unwrap().return_type, string);
    assert_eq!(second.found().unwrap().return_type, integer);
    assert_eq!(session.format_type(&ty), "Outer<String>.Inner<Integer>");
}

#[test]
fn captures_live_until_the_request_ends() {
    let mut session = session();
    let number = session.class_type("java.lang.Number").unwrap();
    let list = session.class_type("java.util.List").unwrap();
    let list_id = list.class_id().unwrap();

    let wildcard = ParametrizedType::new(
        list_id,
        vec![Type::Wildcard(WildcardBound::Extends(Box::new(number.clone())))],
    );
    let captured = session.capture(&wildcard).unwrap();
    let cap = captured.args[0].clone();
    assert!(matches!(cap, Type::TypeVar(_)));
    assert_eq!(session.format_type(&Type::Parametrized(captured.clone())), "List<CAP#1>");
    assert!(session.convertible_to(&cap, &number));
    assert_eq!(session.capture(&wildcard).unwrap(), captured);

    session.end_request();
    let again = session.capture(&wildcard).unwrap();
    assert_eq!(session.format_type(&again.args[0]), "CAP#1");
}

#[test]
fn invocation_runs_against_the_host() {
    let mut session = session();
    let string = session.class_type("java.lang.String").unwrap();
    let box_string = session.parametrize("com.example.Box", vec![string.clone()]).unwrap();

    let ctor = session
        .resolve_constructor(&box_string, &[], &[string.clone()])
        .unwrap()
        .into_found()
        .unwrap();
    let arg = Value::new(string.clone(), session.host_mut().alloc_object("java.lang.String", []));
    let created = session.invoke(&ctor.callable, None, vec![arg.clone()]).unwrap().unwrap();
    assert_eq!(created.ty, box_string);
    assert_eq!(created.raw.runtime_type(), "com.example.Box");
    assert_eq!(session.host().calls.len(), 1);
    assert_eq!(session.host().calls[0].args, vec![arg.raw.clone()]);

    let field = session
        .resolve_field(&box_string, "value", CallKind::Instance)
        .unwrap()
        .found()
        .cloned()
        .unwrap();
    session.set(&field, Some(&created), arg.clone()).unwrap();
    assert_eq!(session.get(&field, Some(&created)).unwrap(), Value::new(string, arg.raw));
}

#[test]
fn read_only_sessions_refuse_side_effects() {
    let mut session = read_only_session();
    assert!(!session.allows_side_effects());
    let string = session.class_type("java.lang.String").unwrap();
    let box_string = session.parametrize("com.example.Box", vec![string.clone()]).unwrap();

    let ctor = session
        .resolve_constructor(&box_string, &[], &[string.clone()])
        .unwrap()
        .into_found()
        .unwrap();
    let err = session.invoke(&ctor.callable, None, vec![Value::null()]).unwrap_err();
    assert!(
        matches!(err, EvalError::Invocation(InvocationError::SideEffectsDisallowed { .. })),
        "{err:?}"
    );
    assert!(session.host().calls.is_empty());

    // Reads are still allowed.
    let receiver = Value::new(
        box_string.clone(),
        session.host_mut().alloc_object(
            "com.example.Box",
            [("value".to_string(), HostValue::Null)],
        ),
    );
    let field = session
        .resolve_field(&box_string, "value", CallKind::Instance)
        .unwrap()
        .found()
        .cloned()
        .unwrap();
    assert_eq!(
        session.get(&field, Some(&receiver)).unwrap(),
        Value::new(string, HostValue::Null)
    );
    let err = session.set(&field, Some(&receiver), Value::null()).unwrap_err();
    assert!(matches!(err, EvalError::Invocation(InvocationError::SideEffectsDisallowed { .. })));
}

#[test]
fn purge_reloads_from_the_host() {
    let mut session = session();
    session.class_type("com.example.Box").unwrap();
    assert_eq!(session.cache().loaded_count(), 1);

    session.purge();
    assert_eq!(session.cache().loaded_count(), 0);
    session.class_type("com.example.Box").unwrap();
    assert_eq!(session.host().lookup_count(), 2);
}

#[test]
fn depth_limit_comes_from_config() {
    let mut config = EvalConfig::default();
    config.resolution.max_conversion_depth = 8;
    let session = EvalSession::new(MockHost::new(), &config);
    assert_eq!(session.cache().store().conversion_depth_limit(), 8);
}
