use std::collections::{HashMap, HashSet};

use brew_host::{
    access, BaseType, ClassSig, FieldDescriptor, HostProvider, MethodDescriptor, ReturnSig,
    TypeArgSig, TypeDescriptor, TypeParamSig, TypeSig,
};
use brew_types::{
    ClassDef, ClassId, ClassKind, ConstructorDef, FieldDef, MethodDef, ParametrizedType,
    PrimitiveType, Type, TypeEnv, TypeParamDef, TypeStore, TypeVarId, WildcardBound,
};

use crate::CacheError;

/// Type-variable names in scope while converting one declaration, innermost first.
#[derive(Default)]
struct Scope<'a> {
    method: HashMap<String, TypeVarId>,
    class: Option<&'a HashMap<String, TypeVarId>>,
    context: &'a str,
}

impl Scope<'_> {
    fn lookup(&self, name: &str) -> Option<TypeVarId> {
        self.method
            .get(name)
            .or_else(|| self.class.and_then(|vars| vars.get(name)))
            .copied()
    }
}

/// Host type descriptors wrapped into [`TypeStore`] declarations.
///
/// Classes are loaded on demand together with everything their signatures mention. Names the
/// store already defines (the built-in slice of the JDK) are never overwritten. The cache is
/// append-only until [`TypeCache::clear`].
#[derive(Debug)]
pub struct TypeCache {
    store: TypeStore,
    in_progress: HashSet<String>,
    loaded: HashSet<String>,
    /// Names referenced by a signature that the host could not describe.
    placeholders: HashSet<String>,
    depth_limit: usize,
}

impl Default for TypeCache {
    fn default() -> Self {
        Self::new(brew_types::DEFAULT_CONVERSION_DEPTH)
    }
}

impl TypeCache {
    pub fn new(conversion_depth_limit: usize) -> Self {
        let mut store = TypeStore::with_minimal_jdk();
        store.set_conversion_depth_limit(conversion_depth_limit);
        Self {
            store,
            in_progress: HashSet::new(),
            loaded: HashSet::new(),
            placeholders: HashSet::new(),
            depth_limit: conversion_depth_limit,
        }
    }

    pub fn store(&self) -> &TypeStore {
        &self.store
    }

    /// Number of host classes loaded since the last purge.
    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_loaded(&self, binary_name: &str) -> bool {
        self.loaded.contains(binary_name)
    }

    /// Drop everything loaded from the host, returning to the built-in declarations.
    ///
    /// Types and capture variables obtained before the purge must not be used afterwards.
    pub fn clear(&mut self) {
        tracing::debug!(target = "brew.cache", loaded = self.loaded.len(), "purging type cache");
        *self = Self::new(self.depth_limit);
    }

    /// Ensure `binary_name` is present in the store and return its id.
    pub fn ensure_class(
        &mut self,
        host: &dyn HostProvider,
        binary_name: &str,
    ) -> Result<ClassId, CacheError> {
        if self.loaded.contains(binary_name) || self.in_progress.contains(binary_name) {
            if let Some(id) = self.store.class_id(binary_name) {
                return Ok(id);
            }
        }
        if let Some(id) = self.store.class_id(binary_name) {
            if !self.placeholders.contains(binary_name) {
                return Ok(id);
            }
        }

        let Some(desc) = host.describe_type(binary_name) else {
            return Err(CacheError::UnknownType(binary_name.to_string()));
        };

        let id = self.store.intern_class_id(binary_name);
        // Bounds built while this class is in progress must already see an interface as one.
        if let Some(def) = self.store.class_mut(id) {
            def.kind = class_kind(&desc);
        }
        self.in_progress.insert(binary_name.to_string());
        let def = self.build_class_def(host, &desc);
        self.in_progress.remove(binary_name);
        let def = match def {
            Ok(def) => def,
            Err(err) => {
                self.placeholders.insert(binary_name.to_string());
                return Err(err);
            }
        };
        self.store.define_class(id, def);
        self.placeholders.remove(binary_name);
        self.loaded.insert(binary_name.to_string());

        tracing::debug!(
            target = "brew.cache",
            class = binary_name,
            loaded = self.loaded.len(),
            "loaded host type"
        );
        Ok(id)
    }

    /// Convert a signature written in the scope of `context` (used for diagnostics only).
    pub fn type_of(
        &mut self,
        host: &dyn HostProvider,
        sig: &TypeSig,
        context: &str,
    ) -> Result<Type, CacheError> {
        let scope = Scope {
            context,
            ..Scope::default()
        };
        self.type_sig(host, sig, &scope)
    }

    /// A referenced class: loaded when the host knows it, a placeholder extending `Object`
    /// otherwise.
    fn referenced_class(
        &mut self,
        host: &dyn HostProvider,
        binary_name: &str,
    ) -> Result<ClassId, CacheError> {
        match self.ensure_class(host, binary_name) {
            Ok(id) => Ok(id),
            Err(CacheError::UnknownType(_)) => {
                tracing::debug!(
                    target = "brew.cache",
                    class = binary_name,
                    "host has no descriptor; using placeholder"
                );
                let object = self.store.well_known().object_type();
                let id = self.store.intern_class_id(binary_name);
                if let Some(def) = self.store.class_mut(id) {
                    def.super_class = Some(object);
                }
                self.placeholders.insert(binary_name.to_string());
                Ok(id)
            }
            Err(err) => Err(err),
        }
    }

    fn build_class_def(
        &mut self,
        host: &dyn HostProvider,
        desc: &TypeDescriptor,
    ) -> Result<ClassDef, CacheError> {
        let kind = class_kind(desc);

        // Type parameters of the enclosing class are in scope for inner classes.
        let outer = match &desc.enclosing {
            Some(name) => Some(self.ensure_class(host, name)?),
            None => None,
        };
        let mut class_vars = HashMap::new();
        if let Some(outer) = outer {
            self.enclosing_type_vars(outer, &mut class_vars);
        }
        let type_params = self.allocate_type_params(&desc.type_params, &mut class_vars);

        let context = desc.binary_name.as_str();
        let class_scope = Scope {
            method: HashMap::new(),
            class: Some(&class_vars),
            context,
        };
        self.define_type_params(host, &desc.type_params, &type_params, &class_scope)?;

        let super_class = match (&desc.super_class, kind) {
            (Some(sig), ClassKind::Class) => Some(self.class_sig(host, sig, &class_scope)?),
            (None, ClassKind::Class) if desc.binary_name != "java.lang.Object" => {
                Some(self.store.well_known().object_type())
            }
            _ => None,
        };
        let interfaces = desc
            .interfaces
            .iter()
            .map(|sig| self.class_sig(host, sig, &class_scope))
            .collect::<Result<Vec<_>, _>>()?;
        let fields = desc
            .fields
            .iter()
            .map(|field| self.field_def(host, field, &class_scope))
            .collect::<Result<Vec<_>, _>>()?;

        let mut methods = Vec::new();
        for method in &desc.methods {
            methods.push(self.method_def(host, method, &class_vars, context)?);
        }
        let mut constructors = Vec::new();
        for ctor in &desc.constructors {
            constructors.push(self.constructor_def(host, ctor, &class_vars, context)?);
        }

        Ok(ClassDef {
            type_params,
            outer,
            super_class,
            interfaces,
            fields,
            constructors,
            methods,
            ..ClassDef::new(desc.binary_name.clone(), kind)
        })
    }

    fn enclosing_type_vars(&self, mut class: ClassId, vars: &mut HashMap<String, TypeVarId>) {
        let mut seen = HashSet::new();
        while seen.insert(class) {
            let Some(def) = self.store.class(class) else {
                return;
            };
            for tp in &def.type_params {
                if let Some(param) = self.store.type_param(*tp) {
                    vars.entry(param.name.clone()).or_insert(*tp);
                }
            }
            match def.outer {
                Some(outer) => class = outer,
                None => return,
            }
        }
    }

    /// First pass: reserve ids so self-referential bounds (`T extends Comparable<T>`) resolve.
    fn allocate_type_params(
        &mut self,
        params: &[TypeParamSig],
        vars: &mut HashMap<String, TypeVarId>,
    ) -> Vec<TypeVarId> {
        let placeholder = vec![self.store.well_known().object_type()];
        params
            .iter()
            .map(|tp| {
                let id = self.store.add_type_param(tp.name.clone(), placeholder.clone());
                vars.insert(tp.name.clone(), id);
                id
            })
            .collect()
    }

    /// Second pass: convert the bounds now that every name in scope has an id.
    fn define_type_params(
        &mut self,
        host: &dyn HostProvider,
        params: &[TypeParamSig],
        ids: &[TypeVarId],
        scope: &Scope<'_>,
    ) -> Result<(), CacheError> {
        for (tp, id) in params.iter().zip(ids) {
            let mut upper_bounds = Vec::with_capacity(1 + tp.interface_bounds.len());
            match &tp.class_bound {
                Some(bound) => upper_bounds.push(self.type_sig(host, bound, scope)?),
                None if tp.interface_bounds.is_empty() => {
                    upper_bounds.push(self.store.well_known().object_type())
                }
                None => {}
            }
            for bound in &tp.interface_bounds {
                let bound = self.type_sig(host, bound, scope)?;
                self.assume_interface(&bound);
                upper_bounds.push(bound);
            }
            self.store
                .define_type_param(
                    *id,
                    TypeParamDef {
                        name: tp.name.clone(),
                        upper_bounds,
                        lower_bound: None,
                    },
                )
                .map_err(|source| CacheError::MalformedBound {
                    name: tp.name.clone(),
                    context: scope.context.to_string(),
                    source,
                })?;
        }
        Ok(())
    }

    /// A placeholder named in an interface bound position is an interface.
    fn assume_interface(&mut self, bound: &Type) {
        let Some(id) = bound.class_id() else {
            return;
        };
        if let Some(def) = self.store.class_mut(id) {
            if self.placeholders.contains(&def.name) {
                def.kind = ClassKind::Interface;
            }
        }
    }

    fn field_def(
        &mut self,
        host: &dyn HostProvider,
        field: &FieldDescriptor,
        scope: &Scope<'_>,
    ) -> Result<FieldDef, CacheError> {
        Ok(FieldDef {
            name: field.name.clone(),
            ty: self.type_sig(host, &field.ty, scope)?,
            is_static: field.is_static(),
            is_final: field.is_final(),
        })
    }

    fn method_def(
        &mut self,
        host: &dyn HostProvider,
        method: &MethodDescriptor,
        class_vars: &HashMap<String, TypeVarId>,
        context: &str,
    ) -> Result<MethodDef, CacheError> {
        let mut scope = Scope {
            method: HashMap::new(),
            class: (!method.is_static()).then_some(class_vars),
            context,
        };
        let type_params = self.allocate_type_params(&method.type_params, &mut scope.method);
        self.define_type_params(host, &method.type_params, &type_params, &scope)?;

        let params = method
            .params
            .iter()
            .map(|p| self.type_sig(host, p, &scope))
            .collect::<Result<Vec<_>, _>>()?;
        let return_type = match &method.return_type {
            ReturnSig::Void => Type::Void,
            ReturnSig::Type(sig) => self.type_sig(host, sig, &scope)?,
        };

        Ok(MethodDef {
            name: method.name.clone(),
            type_params,
            params,
            return_type,
            is_static: method.is_static(),
            is_varargs: method.is_varargs(),
            is_abstract: method.is_abstract(),
        })
    }

    fn constructor_def(
        &mut self,
        host: &dyn HostProvider,
        ctor: &MethodDescriptor,
        class_vars: &HashMap<String, TypeVarId>,
        context: &str,
    ) -> Result<ConstructorDef, CacheError> {
        let mut scope = Scope {
            method: HashMap::new(),
            class: Some(class_vars),
            context,
        };
        let type_params = self.allocate_type_params(&ctor.type_params, &mut scope.method);
        self.define_type_params(host, &ctor.type_params, &type_params, &scope)?;
        let params = ctor
            .params
            .iter()
            .map(|p| self.type_sig(host, p, &scope))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ConstructorDef {
            type_params,
            params,
            is_varargs: ctor.is_varargs(),
            is_accessible: ctor.access_flags & access::ACC_PRIVATE == 0,
        })
    }

    fn type_sig(
        &mut self,
        host: &dyn HostProvider,
        sig: &TypeSig,
        scope: &Scope<'_>,
    ) -> Result<Type, CacheError> {
        Ok(match sig {
            TypeSig::Base(base) => Type::Primitive(primitive(*base)),
            TypeSig::Array(elem) => Type::array(self.type_sig(host, elem, scope)?),
            TypeSig::Class(cls) => self.class_sig(host, cls, scope)?,
            TypeSig::TypeVariable(name) => match scope.lookup(name) {
                Some(id) => Type::TypeVar(id),
                None => {
                    return Err(CacheError::UnknownTypeVariable {
                        name: name.clone(),
                        context: scope.context.to_string(),
                    })
                }
            },
        })
    }

    fn class_sig(
        &mut self,
        host: &dyn HostProvider,
        sig: &ClassSig,
        scope: &Scope<'_>,
    ) -> Result<Type, CacheError> {
        let id = self.referenced_class(host, &sig.binary_name)?;
        let owner = match &sig.owner {
            Some(owner) => match self.class_sig(host, owner, scope)? {
                Type::Parametrized(p) => Some(p),
                _ => None,
            },
            None => None,
        };
        let args = sig
            .args
            .iter()
            .map(|arg| self.type_arg(host, arg, scope))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(match owner {
            None if args.is_empty() => Type::Class(id),
            None => Type::Parametrized(ParametrizedType::new(id, args)),
            Some(owner) => Type::Parametrized(ParametrizedType::new(id, args).with_owner(owner)),
        })
    }

    fn type_arg(
        &mut self,
        host: &dyn HostProvider,
        arg: &TypeArgSig,
        scope: &Scope<'_>,
    ) -> Result<Type, CacheError> {
        Ok(match arg {
            TypeArgSig::Any => Type::Wildcard(WildcardBound::Unbounded),
            TypeArgSig::Exact(ty) => self.type_sig(host, ty, scope)?,
            TypeArgSig::Extends(ty) => {
                Type::Wildcard(WildcardBound::Extends(Box::new(self.type_sig(host, ty, scope)?)))
            }
            TypeArgSig::Super(ty) => {
                Type::Wildcard(WildcardBound::Super(Box::new(self.type_sig(host, ty, scope)?)))
            }
        })
    }
}

fn class_kind(desc: &TypeDescriptor) -> ClassKind {
    if desc.is_interface() {
        ClassKind::Interface
    } else {
        ClassKind::Class
    }
}

fn primitive(base: BaseType) -> PrimitiveType {
    match base {
        BaseType::Boolean => PrimitiveType::Boolean,
        BaseType::Byte => PrimitiveType::Byte,
        BaseType::Short => PrimitiveType::Short,
        BaseType::Char => PrimitiveType::Char,
        BaseType::Int => PrimitiveType::Int,
        BaseType::Long => PrimitiveType::Long,
        BaseType::Float => PrimitiveType::Float,
        BaseType::Double => PrimitiveType::Double,
    }
}
