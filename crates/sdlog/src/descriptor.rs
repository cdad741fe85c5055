// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type definitions and the definition-group registry.
//!
//! A [`TypeDefinition`] describes one message type by name and field list.
//! Definitions live in [`DefinitionGroup`]s, the unit of dependency tracking
//! and closure traversal: a group names the other groups whose types it
//! references, in declared order. The [`TypeRegistry`] owns groups for the
//! lifetime of a process and hands them out through the [`TypeProvider`]
//! trait, so closure construction never touches a hidden global registry.

use std::collections::HashMap;
use thiserror::Error;

/// Field kinds understood by the definition model.
///
/// `Message` references another [`TypeDefinition`] by its registered name;
/// everything else is a self-contained scalar or blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    I32,
    I64,
    U32,
    U64,
    F32,
    F64,
    String,
    Bytes,
    Message(String),
}

impl FieldKind {
    /// Name of the referenced message type, if this field is a reference.
    pub fn type_ref(&self) -> Option<&str> {
        match self {
            Self::Message(name) => Some(name),
            _ => None,
        }
    }
}

/// One named field of a [`TypeDefinition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// A complete, immutable description of one message type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    /// Globally-unique type name, e.g. `demo.Student`.
    pub name: String,
    /// Ordered field list.
    pub fields: Vec<FieldDef>,
}

impl TypeDefinition {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Get a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of the message types this definition references directly.
    pub fn message_refs(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().filter_map(|f| f.kind.type_ref())
    }
}

/// The smallest unit of definition source: a named group of type
/// definitions plus the ordered list of group names it depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionGroup {
    /// Group name, e.g. `demo/student`.
    pub name: String,
    /// Names of other groups this one depends on, in declared order.
    pub dependencies: Vec<String>,
    /// Definitions contained in this group.
    pub types: Vec<TypeDefinition>,
}

impl DefinitionGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            types: Vec::new(),
        }
    }

    /// Add a dependency on another group.
    pub fn with_dependency(mut self, group_name: impl Into<String>) -> Self {
        self.dependencies.push(group_name.into());
        self
    }

    /// Add a type definition to this group.
    pub fn with_type(mut self, def: TypeDefinition) -> Self {
        self.types.push(def);
        self
    }

    /// Check whether this group defines the named type.
    pub fn contains_type(&self, type_name: &str) -> bool {
        self.types.iter().any(|t| t.name == type_name)
    }
}

/// Resolution capability handed to the closure builder: given a type name,
/// find the group defining it; given a group name, find the group.
///
/// Implementations must be side-effect-free and stable for the lifetime of
/// the process.
pub trait TypeProvider {
    fn group_for_type(&self, type_name: &str) -> Option<&DefinitionGroup>;

    fn group(&self, group_name: &str) -> Option<&DefinitionGroup>;
}

/// Registry errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("definition group '{0}' is already registered")]
    DuplicateGroup(String),

    #[error("type '{type_name}' is already defined by group '{group}'")]
    DuplicateType { type_name: String, group: String },
}

/// In-memory registry of definition groups, indexed by group name and by
/// contained type name.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    groups: Vec<DefinitionGroup>,
    group_index: HashMap<String, usize>,
    type_index: HashMap<String, usize>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition group.
    ///
    /// Group names and type names must be unique across the registry.
    /// Dependencies are not resolved here; a group may name dependencies
    /// that are registered later.
    pub fn register(&mut self, group: DefinitionGroup) -> Result<(), RegistryError> {
        if self.group_index.contains_key(&group.name) {
            return Err(RegistryError::DuplicateGroup(group.name));
        }
        for def in &group.types {
            if let Some(&idx) = self.type_index.get(&def.name) {
                return Err(RegistryError::DuplicateType {
                    type_name: def.name.clone(),
                    group: self.groups[idx].name.clone(),
                });
            }
        }

        let idx = self.groups.len();
        self.group_index.insert(group.name.clone(), idx);
        for def in &group.types {
            self.type_index.insert(def.name.clone(), idx);
        }
        self.groups.push(group);
        Ok(())
    }

    /// Register the definition group of a concrete message type.
    pub fn register_message<M: crate::message::LogMessage>(&mut self) -> Result<(), RegistryError> {
        self.register(M::definition_group())
    }

    /// Number of registered groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterate over registered groups in registration order.
    pub fn groups(&self) -> impl Iterator<Item = &DefinitionGroup> {
        self.groups.iter()
    }
}

impl TypeProvider for TypeRegistry {
    fn group_for_type(&self, type_name: &str) -> Option<&DefinitionGroup> {
        self.type_index.get(type_name).map(|&idx| &self.groups[idx])
    }

    fn group(&self, group_name: &str) -> Option<&DefinitionGroup> {
        self.group_index
            .get(group_name)
            .map(|&idx| &self.groups[idx])
    }
}
