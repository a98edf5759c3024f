//! Static type descriptors.
//!
//! A [`TypeDescriptor`] is the ordered list of (element name, field kind)
//! pairs for one composite type. Descriptors are generated once per type by
//! `#[derive(Reflect)]` and live in statics, so field order is the
//! declaration order of the struct and is stable across calls.

use std::any::TypeId;

use crate::error::ReflectError;
use crate::scalar::ScalarKind;

/// The shape of a single field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// A leaf rendered as text.
    Scalar(ScalarKind),
    /// A leaf whose text is a member name of a fieldless enum.
    Enum(fn() -> &'static EnumDescriptor),
    /// A nested user type, recursed into.
    Composite(fn() -> &'static TypeDescriptor),
}

/// One field of a composite type.
#[derive(Debug)]
pub struct FieldDescriptor {
    /// Element name used in XML and key used in JSON for leaves.
    pub name: &'static str,
    /// Resolves the field's kind.
    pub kind: fn() -> FieldKind,
}

impl FieldDescriptor {
    pub fn field_kind(&self) -> FieldKind {
        (self.kind)()
    }

    /// The element (and JSON member) this field is stored under.
    ///
    /// Leaves use the field's own name; nested composites are spliced in
    /// unwrapped, so they appear under their type name.
    pub fn element_name(&self) -> &'static str {
        match self.field_kind() {
            FieldKind::Composite(descriptor) => descriptor().name,
            FieldKind::Scalar(_) | FieldKind::Enum(_) => self.name,
        }
    }
}

/// Ordered description of a composite type.
#[derive(Debug)]
pub struct TypeDescriptor {
    /// Simple type name, used verbatim as the element name.
    pub name: &'static str,
    pub id: fn() -> TypeId,
    pub fields: &'static [FieldDescriptor],
}

impl TypeDescriptor {
    pub fn type_id(&self) -> TypeId {
        (self.id)()
    }

    /// Name of the wrapper element used for lists of this type.
    pub fn list_name(&self) -> String {
        format!("{}List", self.name)
    }

    /// Fails when two members of this type, or of a type nested in it, are
    /// stored under the same element.
    ///
    /// Two fields of the same composite type both land under the type's
    /// name and cannot be told apart on the way back.
    pub fn ensure_unique_elements(&self) -> Result<(), ReflectError> {
        for (index, field) in self.fields.iter().enumerate() {
            let element = field.element_name();
            if self.fields[..index]
                .iter()
                .any(|earlier| earlier.element_name() == element)
            {
                return Err(ReflectError::DuplicateElement {
                    type_name: self.name,
                    element,
                });
            }
            if let FieldKind::Composite(nested) = field.field_kind() {
                nested().ensure_unique_elements()?;
            }
        }
        Ok(())
    }

    /// Every composite and enum type reachable from this one, excluding
    /// itself, in first-seen order.
    pub fn nested_types(&self) -> Vec<(TypeId, &'static str)> {
        let mut seen = vec![(self.type_id(), self.name)];
        self.collect_nested(&mut seen);
        seen.remove(0);
        seen
    }

    fn collect_nested(&self, seen: &mut Vec<(TypeId, &'static str)>) {
        for field in self.fields {
            match field.field_kind() {
                FieldKind::Scalar(_) => {}
                FieldKind::Enum(descriptor) => {
                    let descriptor = descriptor();
                    let id = descriptor.type_id();
                    if !seen.iter().any(|(seen_id, _)| *seen_id == id) {
                        seen.push((id, descriptor.name));
                    }
                }
                FieldKind::Composite(descriptor) => {
                    let descriptor = descriptor();
                    let id = descriptor.type_id();
                    if !seen.iter().any(|(seen_id, _)| *seen_id == id) {
                        seen.push((id, descriptor.name));
                        descriptor.collect_nested(seen);
                    }
                }
            }
        }
    }
}

/// A declared enum member and its integer value.
#[derive(Debug)]
pub struct EnumMember {
    pub name: &'static str,
    pub value: i64,
}

/// Ordered description of a fieldless enum.
#[derive(Debug)]
pub struct EnumDescriptor {
    pub name: &'static str,
    pub id: fn() -> TypeId,
    pub members: &'static [EnumMember],
}

impl EnumDescriptor {
    pub fn type_id(&self) -> TypeId {
        (self.id)()
    }

    pub fn member_by_name(&self, name: &str) -> Option<&'static EnumMember> {
        self.members.iter().find(|member| member.name == name)
    }

    pub fn member_by_value(&self, value: i64) -> Option<&'static EnumMember> {
        self.members.iter().find(|member| member.value == value)
    }
}
