// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Definition-closure construction and the bundle wire format.
//!
//! A schema's bundle is the serialized, duplicate-free set of every
//! definition-group reachable from the schema's type, including the type's
//! own group. A reader holding only the bundle can reconstruct the full
//! definition graph without the producer's sources.
//!
//! # Bundle Layout
//!
//! ```text
//! +---------------------------------------------------------+
//! | Magic (8) | Version (4) | GroupCount (4)                 |
//! +---------------------------------------------------------+
//! | Group 0                                                  |
//! |   name | dep_count (2) | dep names | type_count (2)      |
//! |   Type: name | field_count (2)                           |
//! |     Field: name | kind (1) [| referenced type name]      |
//! +---------------------------------------------------------+
//! | Group 1 ...                                              |
//! +---------------------------------------------------------+
//! ```
//!
//! All integers are little-endian; strings are u16-length-prefixed UTF-8.
//! Groups appear in traversal order, which makes the bundle deterministic
//! for a fixed definition graph.

use crate::descriptor::{DefinitionGroup, FieldDef, FieldKind, TypeDefinition, TypeProvider};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::collections::{HashSet, VecDeque};
use std::io::{self, Cursor, Read, Write};
use thiserror::Error;

/// Magic bytes: "SDLGDEF\0"
pub const BUNDLE_MAGIC: [u8; 8] = [0x53, 0x44, 0x4c, 0x47, 0x44, 0x45, 0x46, 0x00];

/// Current bundle format version.
pub const BUNDLE_VERSION: u32 = 1;

/// Closure construction errors. All are configuration errors raised before
/// any bundle bytes are produced.
#[derive(Debug, Error)]
pub enum ClosureError {
    #[error("unknown type '{0}': no registered definition group provides it")]
    UnknownType(String),

    #[error("group '{group}' depends on '{dependency}', which is not registered")]
    UnresolvedDependency { group: String, dependency: String },

    #[error("bundle error: {0}")]
    Bundle(#[from] BundleError),
}

/// Bundle serialization errors.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid bundle magic")]
    BadMagic,

    #[error("unsupported bundle version {0}")]
    UnsupportedVersion(u32),

    #[error("malformed bundle: {0}")]
    Malformed(String),
}

/// Build the serialized definition closure for `root_type`.
///
/// Traversal is breadth-first from the root's group, with dependencies
/// enqueued in declared order and a visited set keeping every group to a
/// single appearance no matter how the graph is shaped (diamonds, cycles,
/// self-references).
///
/// # Errors
///
/// Fails before traversal if `root_type` is unknown to the provider or any
/// reachable group names a dependency the provider cannot resolve.
pub fn build_closure(
    provider: &dyn TypeProvider,
    root_type: &str,
) -> Result<Vec<u8>, ClosureError> {
    let root = provider
        .group_for_type(root_type)
        .ok_or_else(|| ClosureError::UnknownType(root_type.to_string()))?;

    verify_resolvable(provider, root)?;

    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(root.name.as_str());
    let mut queue: VecDeque<&DefinitionGroup> = VecDeque::new();
    queue.push_back(root);

    let mut bundle = DefinitionBundle::default();
    while let Some(group) = queue.pop_front() {
        bundle.groups.push(group.clone());
        for dep in &group.dependencies {
            if visited.insert(dep.as_str()) {
                let dep_group =
                    provider
                        .group(dep)
                        .ok_or_else(|| ClosureError::UnresolvedDependency {
                            group: group.name.clone(),
                            dependency: dep.clone(),
                        })?;
                queue.push_back(dep_group);
            }
        }
    }

    tracing::debug!(
        "definition closure for '{}': {} group(s)",
        root_type,
        bundle.groups.len()
    );

    Ok(bundle.encode()?)
}

/// Walk the graph once, checking that every reachable dependency resolves.
fn verify_resolvable(
    provider: &dyn TypeProvider,
    root: &DefinitionGroup,
) -> Result<(), ClosureError> {
    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(root.name.as_str());
    let mut queue: VecDeque<&DefinitionGroup> = VecDeque::new();
    queue.push_back(root);

    while let Some(group) = queue.pop_front() {
        for dep in &group.dependencies {
            let dep_group =
                provider
                    .group(dep)
                    .ok_or_else(|| ClosureError::UnresolvedDependency {
                        group: group.name.clone(),
                        dependency: dep.clone(),
                    })?;
            if visited.insert(dep.as_str()) {
                queue.push_back(dep_group);
            }
        }
    }
    Ok(())
}

/// A decoded (or under-construction) closure bundle: definition groups in
/// traversal order, each appearing exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinitionBundle {
    pub groups: Vec<DefinitionGroup>,
}

impl DefinitionBundle {
    /// Serialize to the bundle wire format.
    pub fn encode(&self) -> Result<Vec<u8>, BundleError> {
        let mut buf = Vec::new();
        buf.write_all(&BUNDLE_MAGIC)?;
        buf.write_u32::<LittleEndian>(BUNDLE_VERSION)?;
        buf.write_u32::<LittleEndian>(self.groups.len() as u32)?;

        for group in &self.groups {
            write_str(&mut buf, &group.name)?;
            buf.write_u16::<LittleEndian>(group.dependencies.len() as u16)?;
            for dep in &group.dependencies {
                write_str(&mut buf, dep)?;
            }
            buf.write_u16::<LittleEndian>(group.types.len() as u16)?;
            for def in &group.types {
                write_str(&mut buf, &def.name)?;
                buf.write_u16::<LittleEndian>(def.fields.len() as u16)?;
                for field in &def.fields {
                    write_str(&mut buf, &field.name)?;
                    write_kind(&mut buf, &field.kind)?;
                }
            }
        }

        Ok(buf)
    }

    /// Parse a bundle back from its wire format.
    pub fn decode(data: &[u8]) -> Result<Self, BundleError> {
        let mut cursor = Cursor::new(data);

        let mut magic = [0u8; 8];
        cursor.read_exact(&mut magic)?;
        if magic != BUNDLE_MAGIC {
            return Err(BundleError::BadMagic);
        }
        let version = cursor.read_u32::<LittleEndian>()?;
        if version != BUNDLE_VERSION {
            return Err(BundleError::UnsupportedVersion(version));
        }

        let group_count = cursor.read_u32::<LittleEndian>()?;
        let mut groups = Vec::with_capacity(group_count.min(1024) as usize);
        for _ in 0..group_count {
            let name = read_str(&mut cursor)?;

            let dep_count = cursor.read_u16::<LittleEndian>()?;
            let mut dependencies = Vec::with_capacity(dep_count as usize);
            for _ in 0..dep_count {
                dependencies.push(read_str(&mut cursor)?);
            }

            let type_count = cursor.read_u16::<LittleEndian>()?;
            let mut types = Vec::with_capacity(type_count as usize);
            for _ in 0..type_count {
                let type_name = read_str(&mut cursor)?;
                let field_count = cursor.read_u16::<LittleEndian>()?;
                let mut fields = Vec::with_capacity(field_count as usize);
                for _ in 0..field_count {
                    let field_name = read_str(&mut cursor)?;
                    let kind = read_kind(&mut cursor)?;
                    fields.push(FieldDef::new(field_name, kind));
                }
                types.push(TypeDefinition::new(type_name, fields));
            }

            groups.push(DefinitionGroup {
                name,
                dependencies,
                types,
            });
        }

        if cursor.position() != data.len() as u64 {
            return Err(BundleError::Malformed(format!(
                "{} trailing byte(s) after last group",
                data.len() as u64 - cursor.position()
            )));
        }

        Ok(Self { groups })
    }

    /// Check whether the bundle carries the named group.
    pub fn contains_group(&self, group_name: &str) -> bool {
        self.groups.iter().any(|g| g.name == group_name)
    }

    /// Find a type definition anywhere in the bundle.
    pub fn find_type(&self, type_name: &str) -> Option<&TypeDefinition> {
        self.groups
            .iter()
            .flat_map(|g| g.types.iter())
            .find(|t| t.name == type_name)
    }
}

// Field-kind wire tags

const TAG_BOOL: u8 = 0;
const TAG_I32: u8 = 1;
const TAG_I64: u8 = 2;
const TAG_U32: u8 = 3;
const TAG_U64: u8 = 4;
const TAG_F32: u8 = 5;
const TAG_F64: u8 = 6;
const TAG_STRING: u8 = 7;
const TAG_BYTES: u8 = 8;
const TAG_MESSAGE: u8 = 9;

fn write_kind<W: Write>(w: &mut W, kind: &FieldKind) -> Result<(), BundleError> {
    match kind {
        FieldKind::Bool => w.write_u8(TAG_BOOL)?,
        FieldKind::I32 => w.write_u8(TAG_I32)?,
        FieldKind::I64 => w.write_u8(TAG_I64)?,
        FieldKind::U32 => w.write_u8(TAG_U32)?,
        FieldKind::U64 => w.write_u8(TAG_U64)?,
        FieldKind::F32 => w.write_u8(TAG_F32)?,
        FieldKind::F64 => w.write_u8(TAG_F64)?,
        FieldKind::String => w.write_u8(TAG_STRING)?,
        FieldKind::Bytes => w.write_u8(TAG_BYTES)?,
        FieldKind::Message(name) => {
            w.write_u8(TAG_MESSAGE)?;
            write_str(w, name)?;
        }
    }
    Ok(())
}

fn read_kind<R: Read>(r: &mut R) -> Result<FieldKind, BundleError> {
    let tag = r.read_u8()?;
    Ok(match tag {
        TAG_BOOL => FieldKind::Bool,
        TAG_I32 => FieldKind::I32,
        TAG_I64 => FieldKind::I64,
        TAG_U32 => FieldKind::U32,
        TAG_U64 => FieldKind::U64,
        TAG_F32 => FieldKind::F32,
        TAG_F64 => FieldKind::F64,
        TAG_STRING => FieldKind::String,
        TAG_BYTES => FieldKind::Bytes,
        TAG_MESSAGE => FieldKind::Message(read_str(r)?),
        other => {
            return Err(BundleError::Malformed(format!(
                "unknown field kind tag {other}"
            )))
        }
    })
}

fn write_str<W: Write>(w: &mut W, s: &str) -> Result<(), BundleError> {
    if s.len() > u16::MAX as usize {
        return Err(BundleError::Malformed(format!(
            "string of {} bytes exceeds the u16 length prefix",
            s.len()
        )));
    }
    w.write_u16::<LittleEndian>(s.len() as u16)?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

fn read_str<R: Read>(r: &mut R) -> Result<String, BundleError> {
    let len = r.read_u16::<LittleEndian>()? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| BundleError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeRegistry;

    fn leaf(name: &str, type_name: &str) -> DefinitionGroup {
        DefinitionGroup::new(name).with_type(TypeDefinition::new(
            type_name,
            vec![FieldDef::new("value", FieldKind::F64)],
        ))
    }

    #[test]
    fn test_closure_single_group() {
        let mut registry = TypeRegistry::new();
        registry.register(leaf("demo/student", "demo.Student")).expect("register");

        let bytes = build_closure(&registry, "demo.Student").expect("closure");
        let bundle = DefinitionBundle::decode(&bytes).expect("decode");

        assert_eq!(bundle.groups.len(), 1);
        assert_eq!(bundle.groups[0].name, "demo/student");
        assert!(bundle.find_type("demo.Student").is_some());
    }

    #[test]
    fn test_closure_diamond_visits_shared_group_once() {
        // a -> b, c; b -> d; c -> d
        let mut registry = TypeRegistry::new();
        registry
            .register(
                DefinitionGroup::new("g/a")
                    .with_dependency("g/b")
                    .with_dependency("g/c")
                    .with_type(TypeDefinition::new(
                        "g.A",
                        vec![
                            FieldDef::new("b", FieldKind::Message("g.B".into())),
                            FieldDef::new("c", FieldKind::Message("g.C".into())),
                        ],
                    )),
            )
            .expect("a");
        registry
            .register(
                DefinitionGroup::new("g/b")
                    .with_dependency("g/d")
                    .with_type(TypeDefinition::new(
                        "g.B",
                        vec![FieldDef::new("d", FieldKind::Message("g.D".into()))],
                    )),
            )
            .expect("b");
        registry
            .register(
                DefinitionGroup::new("g/c")
                    .with_dependency("g/d")
                    .with_type(TypeDefinition::new(
                        "g.C",
                        vec![FieldDef::new("d", FieldKind::Message("g.D".into()))],
                    )),
            )
            .expect("c");
        registry.register(leaf("g/d", "g.D")).expect("d");

        let bytes = build_closure(&registry, "g.A").expect("closure");
        let bundle = DefinitionBundle::decode(&bytes).expect("decode");

        let names: Vec<&str> = bundle.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["g/a", "g/b", "g/c", "g/d"]);
    }

    #[test]
    fn test_closure_cycle_terminates() {
        let mut registry = TypeRegistry::new();
        registry
            .register(leaf("g/a", "g.A").with_dependency("g/b"))
            .expect("a");
        registry
            .register(leaf("g/b", "g.B").with_dependency("g/a"))
            .expect("b");

        let bytes = build_closure(&registry, "g.A").expect("closure");
        let bundle = DefinitionBundle::decode(&bytes).expect("decode");

        let names: Vec<&str> = bundle.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["g/a", "g/b"]);
    }

    #[test]
    fn test_closure_self_dependency() {
        let mut registry = TypeRegistry::new();
        registry
            .register(leaf("g/a", "g.A").with_dependency("g/a"))
            .expect("a");

        let bytes = build_closure(&registry, "g.A").expect("closure");
        let bundle = DefinitionBundle::decode(&bytes).expect("decode");
        assert_eq!(bundle.groups.len(), 1);
    }

    #[test]
    fn test_closure_deterministic() {
        let mut registry = TypeRegistry::new();
        registry
            .register(
                leaf("g/a", "g.A")
                    .with_dependency("g/c")
                    .with_dependency("g/b"),
            )
            .expect("a");
        registry.register(leaf("g/b", "g.B")).expect("b");
        registry.register(leaf("g/c", "g.C")).expect("c");

        let first = build_closure(&registry, "g.A").expect("first");
        let second = build_closure(&registry, "g.A").expect("second");
        assert_eq!(first, second);

        // Declared dependency order is preserved.
        let bundle = DefinitionBundle::decode(&first).expect("decode");
        let names: Vec<&str> = bundle.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["g/a", "g/c", "g/b"]);
    }

    #[test]
    fn test_unknown_root_type() {
        let registry = TypeRegistry::new();
        let err = build_closure(&registry, "g.Missing").expect_err("unknown");
        assert!(matches!(err, ClosureError::UnknownType(name) if name == "g.Missing"));
    }

    #[test]
    fn test_unresolved_dependency_reported_before_output() {
        let mut registry = TypeRegistry::new();
        registry
            .register(leaf("g/a", "g.A").with_dependency("g/b"))
            .expect("a");
        registry
            .register(leaf("g/b", "g.B").with_dependency("g/missing"))
            .expect("b");

        let err = build_closure(&registry, "g.A").expect_err("unresolved");
        match err {
            ClosureError::UnresolvedDependency { group, dependency } => {
                assert_eq!(group, "g/b");
                assert_eq!(dependency, "g/missing");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_bundle_roundtrip() {
        let bundle = DefinitionBundle {
            groups: vec![DefinitionGroup::new("g/pose")
                .with_dependency("g/point")
                .with_type(TypeDefinition::new(
                    "g.Pose",
                    vec![
                        FieldDef::new("position", FieldKind::Message("g.Point".into())),
                        FieldDef::new("valid", FieldKind::Bool),
                        FieldDef::new("tags", FieldKind::Bytes),
                    ],
                ))],
        };

        let bytes = bundle.encode().expect("encode");
        let decoded = DefinitionBundle::decode(&bytes).expect("decode");
        assert_eq!(decoded, bundle);
        assert!(decoded.contains_group("g/pose"));
    }

    #[test]
    fn test_bundle_rejects_bad_magic() {
        let err = DefinitionBundle::decode(b"NOTADEF\0rest").expect_err("magic");
        assert!(matches!(err, BundleError::BadMagic));
    }

    #[test]
    fn test_bundle_rejects_trailing_bytes() {
        let mut bytes = DefinitionBundle::default().encode().expect("encode");
        bytes.push(0xff);
        let err = DefinitionBundle::decode(&bytes).expect_err("trailing");
        assert!(matches!(err, BundleError::Malformed(_)));
    }
}
