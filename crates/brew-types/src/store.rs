use std::collections::HashMap;

use crate::java::helpers::check_bound_members;
use crate::{
    ClassDef, ClassId, ClassKind, ConstructorDef, FieldDef, MethodDef, ParametrizedType,
    PrimitiveType, Type, TypeError, TypeParamDef, TypeVarId, WildcardBound,
};

/// Recursion bound used by the conversion oracle unless an environment overrides it.
pub const DEFAULT_CONVERSION_DEPTH: usize = 64;

/// Read access to declarations. Implemented by the global [`TypeStore`] and by the
/// per-request [`crate::TyContext`], which layers capture variables on top.
pub trait TypeEnv {
    fn class(&self, id: ClassId) -> Option<&ClassDef>;
    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef>;
    fn lookup_class(&self, name: &str) -> Option<ClassId>;
    fn well_known(&self) -> &WellKnownTypes;

    fn conversion_depth_limit(&self) -> usize {
        DEFAULT_CONVERSION_DEPTH
    }
}

/// Ids of the classes the type algebra itself refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WellKnownTypes {
    pub object: ClassId,
    pub string: ClassId,
    pub cloneable: ClassId,
    pub serializable: ClassId,
    pub number: ClassId,
    pub comparable: ClassId,
    pub boolean: ClassId,
    pub byte: ClassId,
    pub short: ClassId,
    pub character: ClassId,
    pub integer: ClassId,
    pub long: ClassId,
    pub float: ClassId,
    pub double: ClassId,
}

impl WellKnownTypes {
    pub fn box_class(&self, prim: PrimitiveType) -> ClassId {
        match prim {
            PrimitiveType::Boolean => self.boolean,
            PrimitiveType::Byte => self.byte,
            PrimitiveType::Short => self.short,
            PrimitiveType::Char => self.character,
            PrimitiveType::Int => self.integer,
            PrimitiveType::Long => self.long,
            PrimitiveType::Float => self.float,
            PrimitiveType::Double => self.double,
        }
    }

    /// The primitive a box class unboxes to.
    pub fn unboxed(&self, id: ClassId) -> Option<PrimitiveType> {
        PrimitiveType::ALL
            .into_iter()
            .find(|p| self.box_class(*p) == id)
    }

    pub fn object_type(&self) -> Type {
        Type::Class(self.object)
    }
}

/// Arena of class and type-parameter declarations.
///
/// Bounds refer to other declarations by id, so self-referential (F-bounded) declarations are
/// ordinary data: reserve the ids first, then define the bounds.
#[derive(Debug, Clone)]
pub struct TypeStore {
    classes: Vec<ClassDef>,
    class_by_name: HashMap<String, ClassId>,
    type_params: Vec<TypeParamDef>,
    well_known: WellKnownTypes,
    depth_limit: usize,
}

impl Default for TypeStore {
    /// A store holding placeholders for the well-known classes and nothing else.
    fn default() -> Self {
        let mut classes = Vec::new();
        let mut class_by_name = HashMap::new();
        let mut intern = |name: &str| {
            let id = ClassId::from_index(classes.len());
            classes.push(ClassDef::new(name, ClassKind::Class));
            class_by_name.insert(name.to_string(), id);
            id
        };
        let well_known = WellKnownTypes {
            object: intern("java.lang.Object"),
            string: intern("java.lang.String"),
            cloneable: intern("java.lang.Cloneable"),
            serializable: intern("java.io.Serializable"),
            number: intern("java.lang.Number"),
            comparable: intern("java.lang.Comparable"),
            boolean: intern("java.lang.Boolean"),
            byte: intern("java.lang.Byte"),
            short: intern("java.lang.Short"),
            character: intern("java.lang.Character"),
            integer: intern("java.lang.Integer"),
            long: intern("java.lang.Long"),
            float: intern("java.lang.Float"),
            double: intern("java.lang.Double"),
        };
        Self {
            classes,
            class_by_name,
            type_params: Vec::new(),
            well_known,
            depth_limit: DEFAULT_CONVERSION_DEPTH,
        }
    }
}

impl TypeStore {
    /// Return the id for `name`, reserving a placeholder declaration if it is not known yet.
    pub fn intern_class_id(&mut self, name: &str) -> ClassId {
        if let Some(id) = self.class_by_name.get(name) {
            return *id;
        }
        let id = ClassId::from_index(self.classes.len());
        self.classes.push(ClassDef::new(name, ClassKind::Class));
        self.class_by_name.insert(name.to_string(), id);
        id
    }

    /// Replace the declaration behind `id` (typically a placeholder).
    pub fn define_class(&mut self, id: ClassId, def: ClassDef) {
        self.class_by_name.insert(def.name.clone(), id);
        if let Some(slot) = self.classes.get_mut(id.index()) {
            *slot = def;
        }
    }

    pub fn add_class(&mut self, def: ClassDef) -> ClassId {
        let id = self.intern_class_id(&def.name);
        self.define_class(id, def);
        id
    }

    /// Define or overwrite `def.name`, keeping the id stable across redefinitions.
    pub fn upsert_class(&mut self, def: ClassDef) -> ClassId {
        self.add_class(def)
    }

    pub fn class_mut(&mut self, id: ClassId) -> Option<&mut ClassDef> {
        self.classes.get_mut(id.index())
    }

    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.class_by_name.get(name).copied()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Allocate a type variable. The bounds are taken as given; declared bounds that may be
    /// malformed go through [`TypeStore::define_type_param`].
    pub fn add_type_param(
        &mut self,
        name: impl Into<String>,
        upper_bounds: Vec<Type>,
    ) -> TypeVarId {
        let id = TypeVarId::from_index(self.type_params.len());
        self.type_params.push(TypeParamDef {
            name: name.into(),
            upper_bounds,
            lower_bound: None,
        });
        id
    }

    /// Replace the declaration behind `id`, typically the placeholder bounds given to
    /// [`TypeStore::add_type_param`] while the real bounds could not be built yet.
    ///
    /// Upper bounds with more than one class member are rejected and leave `id` unchanged.
    pub fn define_type_param(
        &mut self,
        id: TypeVarId,
        def: TypeParamDef,
    ) -> Result<(), TypeError> {
        check_bound_members(&*self, &def.upper_bounds)?;
        self.set_type_param(id, def);
        Ok(())
    }

    fn set_type_param(&mut self, id: TypeVarId, def: TypeParamDef) {
        if let Some(slot) = self.type_params.get_mut(id.index()) {
            *slot = def;
        }
    }

    pub fn set_conversion_depth_limit(&mut self, limit: usize) {
        self.depth_limit = limit.max(1);
    }

    /// Build `owner.class<args>` checking the argument count against the declaration.
    ///
    /// Returns a literal [`Type::Class`] for a non-generic class without owner arguments.
    pub fn parametrize(
        &self,
        owner: Option<ParametrizedType>,
        class: ClassId,
        args: Vec<Type>,
    ) -> Result<Type, TypeError> {
        let def = self.class(class).ok_or(TypeError::UnknownClass(class))?;
        let expected = def.type_params.len();
        let owner_only = args.is_empty() && owner.is_some();
        if args.len() != expected && !owner_only {
            return Err(TypeError::ArityMismatch {
                class: def.name.clone(),
                expected,
                found: args.len(),
            });
        }
        Ok(match owner {
            None if args.is_empty() => Type::Class(class),
            None => Type::Parametrized(ParametrizedType::new(class, args)),
            Some(owner) => Type::Parametrized(ParametrizedType::new(class, args).with_owner(owner)),
        })
    }

    /// A store pre-populated with a small slice of `java.lang` / `java.util`.
    pub fn with_minimal_jdk() -> Self {
        let mut store = TypeStore::default();
        MinimalJdk::new(&mut store).populate();
        store
    }
}

impl TypeEnv for TypeStore {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.index())
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        if id.context_local_index().is_some() {
            return None;
        }
        self.type_params.get(id.index())
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        self.class_id(name)
    }

    fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }

    fn conversion_depth_limit(&self) -> usize {
        self.depth_limit
    }
}

struct MinimalJdk<'a> {
    store: &'a mut TypeStore,
    object: Type,
}

fn method(name: &str, params: Vec<Type>, return_type: Type) -> MethodDef {
    MethodDef {
        name: name.to_string(),
        type_params: vec![],
        params,
        return_type,
        is_static: false,
        is_varargs: false,
        is_abstract: false,
    }
}

fn static_method(name: &str, params: Vec<Type>, return_type: Type) -> MethodDef {
    MethodDef {
        is_static: true,
        ..method(name, params, return_type)
    }
}

fn abstract_method(name: &str, params: Vec<Type>, return_type: Type) -> MethodDef {
    MethodDef {
        is_abstract: true,
        ..method(name, params, return_type)
    }
}

fn constructor(params: Vec<Type>) -> ConstructorDef {
    ConstructorDef {
        type_params: vec![],
        params,
        is_varargs: false,
        is_accessible: true,
    }
}

impl<'a> MinimalJdk<'a> {
    fn new(store: &'a mut TypeStore) -> Self {
        let object = store.well_known.object_type();
        Self { store, object }
    }

    fn class(&mut self, name: &str, kind: ClassKind) -> ClassDef {
        let super_class = match kind {
            ClassKind::Class => Some(self.object.clone()),
            ClassKind::Interface => None,
        };
        ClassDef {
            super_class,
            ..ClassDef::new(name, kind)
        }
    }

    fn param(&mut self, name: &str) -> TypeVarId {
        self.store.add_type_param(name, vec![self.object.clone()])
    }

    fn populate(&mut self) {
        use PrimitiveType::*;

        let wk = self.store.well_known.clone();
        let int = Type::Primitive(Int);
        let boolean = Type::Primitive(Boolean);
        let string = Type::Class(wk.string);
        let object = self.object.clone();

        self.store.define_class(
            wk.object,
            ClassDef {
                methods: vec![
                    method("equals", vec![object.clone()], boolean.clone()),
                    method("hashCode", vec![], int.clone()),
                    method("toString", vec![], string.clone()),
                ],
                ..ClassDef::new("java.lang.Object", ClassKind::Class)
            },
        );
        let serializable = self.class("java.io.Serializable", ClassKind::Interface);
        self.store.define_class(wk.serializable, serializable);
        let cloneable = self.class("java.lang.Cloneable", ClassKind::Interface);
        self.store.define_class(wk.cloneable, cloneable);

        let comparable_t = self.param("T");
        let mut comparable = self.class("java.lang.Comparable", ClassKind::Interface);
        comparable.type_params = vec![comparable_t];
        comparable.methods = vec![abstract_method(
            "compareTo",
            vec![Type::TypeVar(comparable_t)],
            int.clone(),
        )];
        self.store.define_class(wk.comparable, comparable);

        let mut char_sequence = self.class("java.lang.CharSequence", ClassKind::Interface);
        char_sequence.methods = vec![abstract_method("length", vec![], int.clone())];
        let char_sequence = self.store.add_class(char_sequence);

        let mut runnable = self.class("java.lang.Runnable", ClassKind::Interface);
        runnable.methods = vec![abstract_method("run", vec![], Type::Void)];
        self.store.add_class(runnable);

        let mut string_def = self.class("java.lang.String", ClassKind::Class);
        string_def.interfaces = vec![
            Type::Class(wk.serializable),
            Type::class(wk.comparable, vec![string.clone()]),
            Type::Class(char_sequence),
        ];
        string_def.constructors = vec![constructor(vec![]), constructor(vec![string.clone()])];
        string_def.methods = vec![
            method("length", vec![], int.clone()),
            method("charAt", vec![int.clone()], Type::Primitive(Char)),
            method("concat", vec![string.clone()], string.clone()),
            static_method("valueOf", vec![int.clone()], string.clone()),
            static_method("valueOf", vec![object.clone()], string.clone()),
        ];
        self.store.define_class(wk.string, string_def);

        let mut number = self.class("java.lang.Number", ClassKind::Class);
        number.interfaces = vec![Type::Class(wk.serializable)];
        number.methods = vec![
            abstract_method("intValue", vec![], int.clone()),
            abstract_method("longValue", vec![], Type::Primitive(Long)),
            abstract_method("doubleValue", vec![], Type::Primitive(Double)),
        ];
        self.store.define_class(wk.number, number);

        for prim in PrimitiveType::ALL {
            let id = wk.box_class(prim);
            let boxed = Type::Class(id);
            let mut def = self.class(prim.box_class_name(), ClassKind::Class);
            if prim.is_numeric() && prim != Char {
                def.super_class = Some(Type::Class(wk.number));
            }
            def.interfaces = vec![
                Type::Class(wk.serializable),
                Type::class(wk.comparable, vec![boxed.clone()]),
            ];
            def.constructors = vec![constructor(vec![Type::Primitive(prim)])];
            def.methods = vec![
                static_method("valueOf", vec![Type::Primitive(prim)], boxed.clone()),
                method("compareTo", vec![boxed.clone()], int.clone()),
            ];
            if prim == Int {
                def.fields = vec![FieldDef {
                    name: "MAX_VALUE".to_string(),
                    ty: int.clone(),
                    is_static: true,
                    is_final: true,
                }];
            }
            self.store.define_class(id, def);
        }

        // `Enum<E extends Enum<E>>` is the canonical F-bounded declaration.
        let enum_id = self.store.intern_class_id("java.lang.Enum");
        let enum_e = self.param("E");
        self.store.set_type_param(
            enum_e,
            TypeParamDef {
                name: "E".to_string(),
                upper_bounds: vec![Type::class(enum_id, vec![Type::TypeVar(enum_e)])],
                lower_bound: None,
            },
        );
        let mut enum_def = self.class("java.lang.Enum", ClassKind::Class);
        enum_def.type_params = vec![enum_e];
        enum_def.interfaces = vec![
            Type::class(wk.comparable, vec![Type::TypeVar(enum_e)]),
            Type::Class(wk.serializable),
        ];
        enum_def.methods = vec![
            method("name", vec![], string.clone()),
            method("ordinal", vec![], int.clone()),
        ];
        self.store.define_class(enum_id, enum_def);

        let iterable_t = self.param("T");
        let mut iterable = self.class("java.lang.Iterable", ClassKind::Interface);
        iterable.type_params = vec![iterable_t];
        let iterable = self.store.add_class(iterable);

        let collection_e = self.param("E");
        let mut collection = self.class("java.util.Collection", ClassKind::Interface);
        collection.type_params = vec![collection_e];
        collection.interfaces = vec![Type::class(iterable, vec![Type::TypeVar(collection_e)])];
        collection.methods = vec![
            abstract_method("size", vec![], int.clone()),
            abstract_method("add", vec![Type::TypeVar(collection_e)], boolean.clone()),
        ];
        let collection = self.store.add_class(collection);

        let list_e = self.param("E");
        let mut list = self.class("java.util.List", ClassKind::Interface);
        list.type_params = vec![list_e];
        list.interfaces = vec![Type::class(collection, vec![Type::TypeVar(list_e)])];
        list.methods = vec![
            abstract_method("get", vec![int.clone()], Type::TypeVar(list_e)),
            abstract_method("add", vec![Type::TypeVar(list_e)], boolean.clone()),
        ];
        let list = self.store.add_class(list);

        let array_list_e = self.param("E");
        let mut array_list = self.class("java.util.ArrayList", ClassKind::Class);
        array_list.type_params = vec![array_list_e];
        array_list.interfaces = vec![
            Type::class(list, vec![Type::TypeVar(array_list_e)]),
            Type::Class(wk.cloneable),
            Type::Class(wk.serializable),
        ];
        array_list.constructors = vec![
            constructor(vec![]),
            constructor(vec![int.clone()]),
            constructor(vec![Type::class(
                collection,
                vec![Type::Wildcard(WildcardBound::Extends(Box::new(
                    Type::TypeVar(array_list_e),
                )))],
            )]),
        ];
        array_list.methods = vec![
            method("get", vec![int.clone()], Type::TypeVar(array_list_e)),
            method("add", vec![Type::TypeVar(array_list_e)], boolean.clone()),
            method("size", vec![], int.clone()),
        ];
        self.store.add_class(array_list);

        let map_k = self.param("K");
        let map_v = self.param("V");
        let mut map = self.class("java.util.Map", ClassKind::Interface);
        map.type_params = vec![map_k, map_v];
        map.methods = vec![
            abstract_method("get", vec![object.clone()], Type::TypeVar(map_v)),
            abstract_method(
                "put",
                vec![Type::TypeVar(map_k), Type::TypeVar(map_v)],
                Type::TypeVar(map_v),
            ),
        ];
        let map = self.store.add_class(map);

        let hash_map_k = self.param("K");
        let hash_map_v = self.param("V");
        let mut hash_map = self.class("java.util.HashMap", ClassKind::Class);
        hash_map.type_params = vec![hash_map_k, hash_map_v];
        hash_map.interfaces = vec![Type::class(
            map,
            vec![Type::TypeVar(hash_map_k), Type::TypeVar(hash_map_v)],
        )];
        hash_map.constructors = vec![constructor(vec![])];
        self.store.add_class(hash_map);

        // `static <T> List<T> asList(T... a)`
        let as_list_t = self.param("T");
        let mut arrays = self.class("java.util.Arrays", ClassKind::Class);
        arrays.methods = vec![MethodDef {
            name: "asList".to_string(),
            type_params: vec![as_list_t],
            params: vec![Type::array(Type::TypeVar(as_list_t))],
            return_type: Type::class(list, vec![Type::TypeVar(as_list_t)]),
            is_static: true,
            is_varargs: true,
            is_abstract: false,
        }];
        self.store.add_class(arrays);
    }
}
