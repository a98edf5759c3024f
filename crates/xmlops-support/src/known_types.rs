//! Registry of composite and enum types seen by the forward path.
//!
//! The reverse path refuses to rebuild a value whose nested types are not in
//! the registry it is given. The registry is an explicit value: callers pass
//! the same `KnownTypes` to the serializing and reconstructing calls instead
//! of relying on process-wide state.

use std::any::TypeId;

use tracing::debug;

use crate::descriptor::{EnumDescriptor, TypeDescriptor};
use crate::error::ReflectError;
use crate::field::Reconstruct;
use crate::scalar::is_scalar_type_id;

/// A registered non-scalar type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownType {
    pub id: TypeId,
    pub name: &'static str,
}

/// Append-only set of non-scalar types, in registration order.
#[derive(Debug, Clone, Default)]
pub struct KnownTypes {
    entries: Vec<KnownType>,
}

impl KnownTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a type if it is neither scalar nor already present.
    ///
    /// Returns true when the registry grew.
    pub fn register(&mut self, id: TypeId, name: &'static str) -> bool {
        if is_scalar_type_id(id) || self.contains(id) {
            return false;
        }
        debug!(type_name = name, "Registered known type");
        self.entries.push(KnownType { id, name });
        true
    }

    pub fn register_type(&mut self, descriptor: &'static TypeDescriptor) -> bool {
        self.register(descriptor.type_id(), descriptor.name)
    }

    pub fn register_enum(&mut self, descriptor: &'static EnumDescriptor) -> bool {
        self.register(descriptor.type_id(), descriptor.name)
    }

    /// Registers `T` and every type nested inside it.
    ///
    /// This is the explicit alternative to serializing a `T` first.
    pub fn register_all<T: Reconstruct>(&mut self) {
        let descriptor = T::descriptor();
        self.register_type(descriptor);
        for (id, name) in descriptor.nested_types() {
            self.register(id, name);
        }
    }

    pub fn contains(&self, id: TypeId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KnownType> {
        self.entries.iter()
    }

    /// Checks that every type nested inside `descriptor` is registered.
    pub fn ensure_nested_known(
        &self,
        descriptor: &'static TypeDescriptor,
    ) -> Result<(), ReflectError> {
        match descriptor
            .nested_types()
            .into_iter()
            .find(|(id, _)| !self.contains(*id))
        {
            Some((_, type_name)) => Err(ReflectError::UnregisteredType { type_name }),
            None => Ok(()),
        }
    }
}
