use std::collections::HashMap;

use brew_types::{
    free_type_vars, substitute, substitutions_for, ClassDef, ClassKind, ParametrizedType,
    Substitutions, Type, TypeEnv, TypeError, TypeStore, WildcardBound,
};

use pretty_assertions::assert_eq;

#[test]
fn independent_bindings_are_order_independent() {
    let mut env = TypeStore::with_minimal_jdk();
    let wk = env.well_known().clone();
    let map = env.class_id("java.util.Map").unwrap();
    let t = env.add_type_param("T", vec![]);
    let u = env.add_type_param("U", vec![]);
    let x = Type::Class(wk.string);
    let y = Type::array(Type::Class(wk.integer));

    let target = Type::class(
        map,
        vec![
            Type::TypeVar(t),
            Type::Wildcard(WildcardBound::Super(Box::new(Type::TypeVar(u)))),
        ],
    );
    let forward = Substitutions::resolve([(t, x.clone()), (u, y.clone())]).unwrap();
    let backward = Substitutions::resolve([(u, y.clone()), (t, x.clone())]).unwrap();

    let expected = Type::class(
        map,
        vec![x, Type::Wildcard(WildcardBound::Super(Box::new(y)))],
    );
    assert_eq!(forward.apply(&target), expected);
    assert_eq!(backward.apply(&target), expected);
    assert_eq!(forward.order(), backward.order());
}

#[test]
fn chained_bindings_resolve_through_each_other() {
    let mut env = TypeStore::with_minimal_jdk();
    let wk = env.well_known().clone();
    let list = env.class_id("java.util.List").unwrap();
    let a = env.add_type_param("A", vec![]);
    let b = env.add_type_param("B", vec![]);
    let c = env.add_type_param("C", vec![]);

    // A -> List<B>, B -> C[], C -> Integer
    let subst = Substitutions::resolve([
        (a, Type::class(list, vec![Type::TypeVar(b)])),
        (b, Type::array(Type::TypeVar(c))),
        (c, Type::Class(wk.integer)),
    ])
    .unwrap();

    assert_eq!(subst.order(), &[c, b, a]);
    assert_eq!(
        subst.apply(&Type::TypeVar(a)),
        Type::class(list, vec![Type::array(Type::Class(wk.integer))])
    );
    assert!(free_type_vars(&subst.apply(&Type::TypeVar(a))).is_empty());
}

#[test]
fn mutual_bindings_are_rejected() {
    let mut env = TypeStore::with_minimal_jdk();
    let list = env.class_id("java.util.List").unwrap();
    let a = env.add_type_param("A", vec![]);
    let b = env.add_type_param("B", vec![]);

    let err = Substitutions::resolve([
        (a, Type::array(Type::TypeVar(b))),
        (b, Type::class(list, vec![Type::TypeVar(a)])),
    ])
    .unwrap_err();
    assert_eq!(err, TypeError::CyclicSubstitution { vars: vec![a, b] });
}

#[test]
fn substitution_reaches_every_shape() {
    let mut env = TypeStore::with_minimal_jdk();
    let wk = env.well_known().clone();
    let list = env.class_id("java.util.List").unwrap();
    let t = env.add_type_param("T", vec![]);
    let string = Type::Class(wk.string);

    let ty = Type::Intersection(vec![
        Type::array(Type::TypeVar(t)),
        Type::class(
            list,
            vec![Type::Wildcard(WildcardBound::Extends(Box::new(Type::TypeVar(t))))],
        ),
    ]);
    let map = HashMap::from([(t, string.clone())]);
    assert_eq!(
        substitute(&ty, &map),
        Type::Intersection(vec![
            Type::array(string.clone()),
            Type::class(
                list,
                vec![Type::Wildcard(WildcardBound::Extends(Box::new(string)))],
            ),
        ])
    );
    assert_eq!(free_type_vars(&ty).into_iter().collect::<Vec<_>>(), vec![t]);
}

#[test]
fn parametrized_type_bindings_are_simultaneous() {
    let mut env = TypeStore::with_minimal_jdk();
    let wk = env.well_known().clone();

    // class Swap<X, Y>, used as Swap<Y, X> inside its own body.
    let x = env.add_type_param("X", vec![wk.object_type()]);
    let y = env.add_type_param("Y", vec![wk.object_type()]);
    let swap = env.add_class(ClassDef {
        type_params: vec![x, y],
        super_class: Some(wk.object_type()),
        ..ClassDef::new("com.example.Swap", ClassKind::Class)
    });

    let swapped = ParametrizedType::new(swap, vec![Type::TypeVar(y), Type::TypeVar(x)]);
    let subst = substitutions_for(&env, &swapped);
    assert_eq!(subst.get(x), Some(&Type::TypeVar(y)));
    assert_eq!(subst.get(y), Some(&Type::TypeVar(x)));
    assert_eq!(
        subst.apply(&Type::class(swap, vec![Type::TypeVar(x), Type::TypeVar(y)])),
        Type::Parametrized(swapped)
    );
    assert!(env.class(swap).is_some());
}
