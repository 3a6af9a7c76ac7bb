use brew_types::{
    erasure, is_convertible, ClassDef, ClassId, ClassKind, ParametrizedType, Type, TyContext,
    TypeEnv, TypeError, TypeParamDef, TypeStore, WildcardBound,
};

use pretty_assertions::assert_eq;

fn extends(ty: Type) -> Type {
    Type::Wildcard(WildcardBound::Extends(Box::new(ty)))
}

fn super_of(ty: Type) -> Type {
    Type::Wildcard(WildcardBound::Super(Box::new(ty)))
}

fn unbounded() -> Type {
    Type::Wildcard(WildcardBound::Unbounded)
}

fn list(env: &TypeStore) -> ClassId {
    env.class_id("java.util.List").unwrap()
}

#[test]
fn capture_is_idempotent() {
    let env = TypeStore::with_minimal_jdk();
    let map = env.class_id("java.util.Map").unwrap();
    let number = Type::Class(env.well_known().number);
    let mut ctx = TyContext::new(&env);

    let ty = ParametrizedType::new(map, vec![unbounded(), extends(number)]);
    let once = ctx.capture(&ty).unwrap();
    let twice = ctx.capture(&once).unwrap();
    assert_eq!(once, twice);
    assert!(!once.has_wildcards());

    // Same value, same captured identities.
    let again = ctx.capture(&ty).unwrap();
    assert_eq!(once, again);
    assert_eq!(ctx.capture_var_count(), 2);
}

#[test]
fn capture_preserves_erasure() {
    let env = TypeStore::with_minimal_jdk();
    let wk = env.well_known();
    let map = env.class_id("java.util.Map").unwrap();
    let mut ctx = TyContext::new(&env);

    let ty = Type::class(map, vec![super_of(Type::Class(wk.integer)), Type::Class(wk.string)]);
    let captured = ctx.capture_type(&ty).unwrap();
    assert_eq!(erasure(&ctx, &ty), erasure(&ctx, &captured));
    assert_eq!(erasure(&ctx, &captured), Type::Class(map));
}

#[test]
fn types_without_wildcards_are_returned_unchanged() {
    let env = TypeStore::with_minimal_jdk();
    let ty = ParametrizedType::new(list(&env), vec![Type::Class(env.well_known().string)]);
    let mut ctx = TyContext::new(&env);

    assert_eq!(ctx.capture(&ty).unwrap(), ty);
    assert_eq!(ctx.capture_var_count(), 0);
    assert_eq!(
        ctx.capture_type(&Type::Class(env.well_known().string)).unwrap(),
        Type::Class(env.well_known().string)
    );
}

#[test]
fn extends_wildcard_merges_with_formal_bound() {
    let env = TypeStore::with_minimal_jdk();
    let wk = env.well_known();
    let integer = Type::Class(wk.integer);
    let mut ctx = TyContext::new(&env);

    // List<E extends Object> captured with `? extends Integer`: Object is dropped.
    let captured = ctx
        .capture(&ParametrizedType::new(list(&env), vec![extends(integer.clone())]))
        .unwrap();
    let Type::TypeVar(cap) = captured.args[0] else {
        panic!("expected capture variable, got {captured:?}");
    };
    let def = ctx.type_param(cap).unwrap();
    assert_eq!(def.upper_bounds, vec![integer]);
    assert_eq!(def.lower_bound, None);
    assert_eq!(def.name, "CAP#1");
}

#[test]
fn super_wildcard_becomes_lower_bound() {
    let env = TypeStore::with_minimal_jdk();
    let wk = env.well_known();
    let integer = Type::Class(wk.integer);
    let mut ctx = TyContext::new(&env);

    let captured = ctx
        .capture(&ParametrizedType::new(list(&env), vec![super_of(integer.clone())]))
        .unwrap();
    let cap = captured.args[0].clone();
    let Type::TypeVar(cap_id) = cap else {
        panic!("expected capture variable, got {cap:?}");
    };
    let def = ctx.type_param(cap_id).unwrap();
    assert_eq!(def.upper_bounds, vec![wk.object_type()]);
    assert_eq!(def.lower_bound, Some(integer.clone()));

    // Anything convertible to the lower bound may be stored.
    assert!(is_convertible(&ctx, &integer, &cap));
    assert!(is_convertible(&ctx, &Type::Null, &cap));
    assert!(is_convertible(&ctx, &cap, &wk.object_type()));
    assert!(!is_convertible(&ctx, &cap, &integer));
}

#[test]
fn redundant_bounds_are_pruned() {
    let mut env = TypeStore::with_minimal_jdk();
    let wk = env.well_known().clone();
    let number = Type::Class(wk.number);
    let integer = Type::Class(wk.integer);

    // class Box<T extends Number>
    let t = env.add_type_param("T", vec![number.clone()]);
    let boxed = env.add_class(ClassDef {
        type_params: vec![t],
        super_class: Some(wk.object_type()),
        ..ClassDef::new("com.example.Box", ClassKind::Class)
    });
    let mut ctx = TyContext::new(&env);

    let captured = ctx
        .capture(&ParametrizedType::new(boxed, vec![extends(integer.clone())]))
        .unwrap();
    let Type::TypeVar(cap) = captured.args[0] else {
        panic!("expected capture variable");
    };
    assert_eq!(ctx.type_param(cap).unwrap().upper_bounds, vec![integer]);

    let captured = ctx
        .capture(&ParametrizedType::new(boxed, vec![unbounded()]))
        .unwrap();
    let Type::TypeVar(cap) = captured.args[0] else {
        panic!("expected capture variable");
    };
    assert_eq!(ctx.type_param(cap).unwrap().upper_bounds, vec![number]);
}

#[test]
fn f_bounded_declaration_captures_without_looping() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object_type();

    // class EnumLike<E extends EnumLike<E>>
    let enum_like = env.intern_class_id("com.example.EnumLike");
    let e = env.add_type_param("E", vec![]);
    env.define_type_param(
        e,
        TypeParamDef {
            name: "E".to_string(),
            upper_bounds: vec![Type::class(enum_like, vec![Type::TypeVar(e)])],
            lower_bound: None,
        },
    )
    .unwrap();
    env.define_class(
        enum_like,
        ClassDef {
            type_params: vec![e],
            super_class: Some(object),
            ..ClassDef::new("com.example.EnumLike", ClassKind::Class)
        },
    );

    let mut ctx = TyContext::new(&env);
    let captured = ctx
        .capture(&ParametrizedType::new(enum_like, vec![unbounded()]))
        .unwrap();
    let Type::TypeVar(cap) = captured.args[0] else {
        panic!("expected capture variable, got {captured:?}");
    };
    let self_bound = Type::class(enum_like, vec![Type::TypeVar(cap)]);
    assert_eq!(ctx.type_param(cap).unwrap().upper_bounds, vec![self_bound.clone()]);
    assert!(is_convertible(&ctx, &Type::TypeVar(cap), &self_bound));
    assert_eq!(
        brew_types::format_type(&ctx, &Type::Parametrized(captured)),
        "EnumLike<CAP#1>"
    );
}

#[test]
fn dependent_formals_see_earlier_captures() {
    let mut env = TypeStore::with_minimal_jdk();
    let wk = env.well_known().clone();
    let list = list(&env);
    let string = Type::Class(wk.string);

    // class Pair<B extends List<A>, A>: B's bound depends on A even though A comes second.
    let a = env.add_type_param("A", vec![wk.object_type()]);
    let b = env.add_type_param("B", vec![Type::class(list, vec![Type::TypeVar(a)])]);
    let pair = env.add_class(ClassDef {
        type_params: vec![b, a],
        super_class: Some(wk.object_type()),
        ..ClassDef::new("com.example.Pair", ClassKind::Class)
    });
    let mut ctx = TyContext::new(&env);

    // Non-wildcard arguments bind directly.
    let captured = ctx
        .capture(&ParametrizedType::new(pair, vec![unbounded(), string.clone()]))
        .unwrap();
    let Type::TypeVar(b_cap) = captured.args[0] else {
        panic!("expected capture variable");
    };
    assert_eq!(captured.args[1], string);
    assert_eq!(
        ctx.type_param(b_cap).unwrap().upper_bounds,
        vec![Type::class(list, vec![string])]
    );

    // Both wildcards: A is captured first and B's bound refers to it.
    let captured = ctx
        .capture(&ParametrizedType::new(pair, vec![unbounded(), unbounded()]))
        .unwrap();
    let (Type::TypeVar(b_cap), a_cap) = (captured.args[0].clone(), captured.args[1].clone()) else {
        panic!("expected capture variables");
    };
    assert!(matches!(a_cap, Type::TypeVar(_)));
    assert_eq!(
        ctx.type_param(b_cap).unwrap().upper_bounds,
        vec![Type::class(list, vec![a_cap])]
    );
}

#[test]
fn owner_chain_is_captured() {
    let mut env = TypeStore::with_minimal_jdk();
    let wk = env.well_known().clone();
    let t = env.add_type_param("T", vec![wk.object_type()]);
    let outer = env.add_class(ClassDef {
        type_params: vec![t],
        super_class: Some(wk.object_type()),
        ..ClassDef::new("com.example.Outer", ClassKind::Class)
    });
    let u = env.add_type_param("U", vec![Type::TypeVar(t)]);
    let inner = env.add_class(ClassDef {
        type_params: vec![u],
        outer: Some(outer),
        super_class: Some(wk.object_type()),
        ..ClassDef::new("com.example.Outer$Inner", ClassKind::Class)
    });
    let mut ctx = TyContext::new(&env);

    // Outer<? extends Number>.Inner<?>: U's bound T is the owner's capture.
    let ty = ParametrizedType::new(inner, vec![unbounded()])
        .with_owner(ParametrizedType::new(outer, vec![extends(Type::Class(wk.number))]));
    let captured = ctx.capture(&ty).unwrap();
    let owner = captured.owner.as_deref().unwrap();
    let owner_cap = owner.args[0].clone();
    assert!(matches!(owner_cap, Type::TypeVar(_)));
    let Type::TypeVar(inner_cap) = captured.args[0] else {
        panic!("expected capture variable");
    };
    assert_eq!(ctx.type_param(inner_cap).unwrap().upper_bounds, vec![owner_cap]);
    assert_eq!(
        brew_types::format_type(&ctx, &Type::Parametrized(captured)),
        "Outer<CAP#1>.Inner<CAP#2>"
    );
}

#[test]
fn conflicting_class_bounds_are_rejected() {
    let env = TypeStore::with_minimal_jdk();
    let wk = env.well_known();
    let enum_id = env.class_id("java.lang.Enum").unwrap();
    let mut ctx = TyContext::new(&env);

    // Enum<E extends Enum<E>> with `? extends String`: String and Enum are unrelated classes.
    let err = ctx
        .capture(&ParametrizedType::new(enum_id, vec![extends(Type::Class(wk.string))]))
        .unwrap_err();
    assert!(matches!(err, TypeError::Configuration { .. }), "{err:?}");
}

#[test]
fn arity_mismatch_is_reported() {
    let env = TypeStore::with_minimal_jdk();
    let mut ctx = TyContext::new(&env);
    let err = ctx
        .capture(&ParametrizedType::new(list(&env), vec![unbounded(), unbounded()]))
        .unwrap_err();
    assert_eq!(
        err,
        TypeError::ArityMismatch {
            class: "java.util.List".to_string(),
            expected: 1,
            found: 2,
        }
    );
}

#[test]
fn reset_discards_captures() {
    let env = TypeStore::with_minimal_jdk();
    let mut ctx = TyContext::new(&env);
    let ty = ParametrizedType::new(list(&env), vec![unbounded()]);

    let first = ctx.capture(&ty).unwrap();
    ctx.reset();
    assert_eq!(ctx.capture_var_count(), 0);
    let second = ctx.capture(&ty).unwrap();
    // Fresh context-local ids start over.
    assert_eq!(first, second);
    assert_eq!(ctx.capture_var_count(), 1);
}
