use std::cell::Cell;
use std::collections::{HashMap, VecDeque};

use crate::{HostError, HostProvider, HostValue, MemberRef, ObjectId, ObjectRef, TypeDescriptor};

#[derive(Clone, Debug, Default)]
pub struct MockObject {
    pub runtime_type: String,
    pub fields: HashMap<String, HostValue>,
    /// Present for arrays.
    pub elements: Option<Vec<HostValue>>,
    /// Present for boxed primitives.
    pub boxed: Option<HostValue>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedCall {
    pub member: MemberRef,
    pub receiver: Option<HostValue>,
    pub args: Vec<HostValue>,
}

/// Deterministic, in-memory host runtime test double.
///
/// Method results are queued per `(owner, name)`; constructors without a queued result allocate
/// a fresh object of the owner type.
#[derive(Default)]
pub struct MockHost {
    types: HashMap<String, TypeDescriptor>,
    objects: HashMap<ObjectId, MockObject>,
    statics: HashMap<(String, String), HostValue>,
    results: HashMap<(String, String), VecDeque<Result<HostValue, HostError>>>,
    next_object_id: ObjectId,
    lookups: Cell<usize>,
    pub calls: Vec<RecordedCall>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_type(&mut self, desc: TypeDescriptor) {
        self.types.insert(desc.binary_name.clone(), desc);
    }

    pub fn remove_type(&mut self, binary_name: &str) -> Option<TypeDescriptor> {
        self.types.remove(binary_name)
    }

    /// Number of `describe_type` calls served so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.get()
    }

    pub fn alloc_object(
        &mut self,
        runtime_type: impl Into<String>,
        fields: impl IntoIterator<Item = (String, HostValue)>,
    ) -> HostValue {
        let runtime_type = runtime_type.into();
        self.insert_object(MockObject {
            runtime_type,
            fields: fields.into_iter().collect(),
            ..MockObject::default()
        })
    }

    pub fn alloc_array(&mut self, component: &str, elements: Vec<HostValue>) -> HostValue {
        self.insert_object(MockObject {
            runtime_type: format!("{component}[]"),
            elements: Some(elements),
            ..MockObject::default()
        })
    }

    pub fn object(&self, id: ObjectId) -> Option<&MockObject> {
        self.objects.get(&id)
    }

    pub fn set_static(&mut self, owner: &str, name: &str, value: HostValue) {
        self.statics
            .insert((owner.to_string(), name.to_string()), value);
    }

    pub fn push_result(&mut self, owner: &str, name: &str, result: Result<HostValue, HostError>) {
        self.results
            .entry((owner.to_string(), name.to_string()))
            .or_default()
            .push_back(result);
    }

    fn insert_object(&mut self, obj: MockObject) -> HostValue {
        self.next_object_id += 1;
        let id = self.next_object_id;
        let runtime_type = obj.runtime_type.clone();
        self.objects.insert(id, obj);
        HostValue::Object(ObjectRef { id, runtime_type })
    }

    fn object_of(&self, value: Option<&HostValue>) -> Result<ObjectId, HostError> {
        match value {
            Some(HostValue::Object(obj)) if self.objects.contains_key(&obj.id) => Ok(obj.id),
            Some(HostValue::Object(obj)) => Err(HostError::InvalidObject(obj.id)),
            Some(other) => Err(HostError::Other(format!(
                "expected an object receiver, found {}",
                other.runtime_type()
            ))),
            None => Err(HostError::Other("missing receiver".to_string())),
        }
    }

    fn pop_result(&mut self, member: &MemberRef) -> Option<Result<HostValue, HostError>> {
        self.results
            .get_mut(&(member.owner.clone(), member.name.clone()))
            .and_then(|queue| queue.pop_front())
    }
}

fn box_class_name(value: &HostValue) -> Option<&'static str> {
    Some(match value {
        HostValue::Boolean(_) => "java.lang.Boolean",
        HostValue::Byte(_) => "java.lang.Byte",
        HostValue::Short(_) => "java.lang.Short",
        HostValue::Char(_) => "java.lang.Character",
        HostValue::Int(_) => "java.lang.Integer",
        HostValue::Long(_) => "java.lang.Long",
        HostValue::Float(_) => "java.lang.Float",
        HostValue::Double(_) => "java.lang.Double",
        _ => return None,
    })
}

impl HostProvider for MockHost {
    fn describe_type(&self, binary_name: &str) -> Option<TypeDescriptor> {
        self.lookups.set(self.lookups.get() + 1);
        self.types.get(binary_name).cloned()
    }

    fn get_field(
        &mut self,
        field: &MemberRef,
        receiver: Option<&HostValue>,
    ) -> Result<HostValue, HostError> {
        let unknown = || HostError::UnknownMember {
            owner: field.owner.clone(),
            name: field.name.clone(),
        };
        if receiver.is_none() {
            return self
                .statics
                .get(&(field.owner.clone(), field.name.clone()))
                .cloned()
                .ok_or_else(unknown);
        }
        let id = self.object_of(receiver)?;
        self.objects
            .get(&id)
            .and_then(|obj| obj.fields.get(&field.name))
            .cloned()
            .ok_or_else(unknown)
    }

    fn set_field(
        &mut self,
        field: &MemberRef,
        receiver: Option<&HostValue>,
        value: HostValue,
    ) -> Result<(), HostError> {
        if receiver.is_none() {
            self.statics
                .insert((field.owner.clone(), field.name.clone()), value);
            return Ok(());
        }
        let id = self.object_of(receiver)?;
        let obj = self.objects.get_mut(&id).ok_or(HostError::InvalidObject(id))?;
        obj.fields.insert(field.name.clone(), value);
        Ok(())
    }

    fn invoke_method(
        &mut self,
        method: &MemberRef,
        receiver: Option<&HostValue>,
        args: Vec<HostValue>,
    ) -> Result<HostValue, HostError> {
        if receiver.is_some() {
            self.object_of(receiver)?;
        }
        self.calls.push(RecordedCall {
            member: method.clone(),
            receiver: receiver.cloned(),
            args,
        });
        match self.pop_result(method) {
            Some(result) => result,
            None => {
                tracing::debug!(
                    target = "brew.host.mock",
                    member = %method,
                    "no mock result queued"
                );
                Err(HostError::UnknownMember {
                    owner: method.owner.clone(),
                    name: method.name.clone(),
                })
            }
        }
    }

    fn new_instance(
        &mut self,
        constructor: &MemberRef,
        args: Vec<HostValue>,
    ) -> Result<HostValue, HostError> {
        self.calls.push(RecordedCall {
            member: constructor.clone(),
            receiver: None,
            args,
        });
        match self.pop_result(constructor) {
            Some(result) => result,
            None => Ok(self.alloc_object(constructor.owner.clone(), [])),
        }
    }

    fn array_length(&mut self, array: &HostValue) -> Result<i32, HostError> {
        let id = self.object_of(Some(array))?;
        let elements = self
            .objects
            .get(&id)
            .and_then(|obj| obj.elements.as_ref())
            .ok_or_else(|| HostError::Other(format!("object {id} is not an array")))?;
        i32::try_from(elements.len()).map_err(|_| HostError::Other("array too large".to_string()))
    }

    fn new_array(
        &mut self,
        component: &str,
        elements: Vec<HostValue>,
    ) -> Result<HostValue, HostError> {
        Ok(self.alloc_array(component, elements))
    }

    fn clone_array(&mut self, array: &HostValue) -> Result<HostValue, HostError> {
        let id = self.object_of(Some(array))?;
        let obj = self.objects.get(&id).cloned().ok_or(HostError::InvalidObject(id))?;
        if obj.elements.is_none() {
            return Err(HostError::Other(format!("object {id} is not an array")));
        }
        Ok(self.insert_object(obj))
    }

    fn box_value(&mut self, value: &HostValue) -> Result<HostValue, HostError> {
        let Some(class) = box_class_name(value) else {
            return Err(HostError::Other(format!(
                "cannot box {}",
                value.runtime_type()
            )));
        };
        Ok(self.insert_object(MockObject {
            runtime_type: class.to_string(),
            boxed: Some(value.clone()),
            ..MockObject::default()
        }))
    }

    fn unbox_value(&mut self, value: &HostValue) -> Result<HostValue, HostError> {
        let id = self.object_of(Some(value))?;
        self.objects
            .get(&id)
            .and_then(|obj| obj.boxed.clone())
            .ok_or_else(|| HostError::Other(format!("object {id} is not a boxed primitive")))
    }
}
