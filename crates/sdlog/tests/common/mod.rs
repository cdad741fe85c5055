// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared fixtures: two demo message types with little-endian codecs
//! (strings are u32-length-prefixed UTF-8).

#![allow(dead_code)]

use sdlog::{
    DecoderRegistry, DefinitionGroup, FieldDef, FieldKind, LogMessage, ParseError, TypeDefinition,
    TypeRegistry,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    pub id: i32,
    pub name: String,
    pub age: i32,
    pub email: String,
    pub score: f32,
}

impl Student {
    pub fn sample(i: u32) -> Self {
        Self {
            id: i as i32 + 1,
            name: format!("student-{i}"),
            age: 18 + (i as i32 % 5),
            email: format!("student-{i}@example.com"),
            score: 75.0 + i as f32 * 2.5,
        }
    }
}

impl LogMessage for Student {
    fn type_name() -> &'static str {
        "demo.Student"
    }

    fn definition_group() -> DefinitionGroup {
        DefinitionGroup::new("demo/student").with_type(TypeDefinition::new(
            "demo.Student",
            vec![
                FieldDef::new("id", FieldKind::I32),
                FieldDef::new("name", FieldKind::String),
                FieldDef::new("age", FieldKind::I32),
                FieldDef::new("email", FieldKind::String),
                FieldDef::new("score", FieldKind::F32),
            ],
        ))
    }

    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&self.id.to_le_bytes());
        put_str(&mut buf, &self.name);
        buf.extend_from_slice(&self.age.to_le_bytes());
        put_str(&mut buf, &self.email);
        buf.extend_from_slice(&self.score.to_le_bytes());
        buf
    }

    fn decode(buf: &[u8]) -> Result<Self, ParseError> {
        let mut pos = 0;
        let id = i32::from_le_bytes(take4(buf, &mut pos)?);
        let name = get_str(buf, &mut pos)?;
        let age = i32::from_le_bytes(take4(buf, &mut pos)?);
        let email = get_str(buf, &mut pos)?;
        let score = f32::from_le_bytes(take4(buf, &mut pos)?);
        Ok(Self {
            id,
            name,
            age,
            email,
            score,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn sample(i: u32) -> Self {
        Self {
            x: i as f64,
            y: (i as f64).sin(),
            z: i as f64 * 0.5,
        }
    }
}

impl LogMessage for Point3 {
    fn type_name() -> &'static str {
        "foxglove.Point3"
    }

    fn definition_group() -> DefinitionGroup {
        DefinitionGroup::new("foxglove/point3").with_type(TypeDefinition::new(
            "foxglove.Point3",
            vec![
                FieldDef::new("x", FieldKind::F64),
                FieldDef::new("y", FieldKind::F64),
                FieldDef::new("z", FieldKind::F64),
            ],
        ))
    }

    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&self.x.to_le_bytes());
        buf.extend_from_slice(&self.y.to_le_bytes());
        buf.extend_from_slice(&self.z.to_le_bytes());
        buf
    }

    fn decode(buf: &[u8]) -> Result<Self, ParseError> {
        let mut pos = 0;
        let x = f64::from_le_bytes(take8(buf, &mut pos)?);
        let y = f64::from_le_bytes(take8(buf, &mut pos)?);
        let z = f64::from_le_bytes(take8(buf, &mut pos)?);
        Ok(Self { x, y, z })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Student(Student),
    Point3(Point3),
}

impl From<Student> for Value {
    fn from(value: Student) -> Self {
        Self::Student(value)
    }
}

impl From<Point3> for Value {
    fn from(value: Point3) -> Self {
        Self::Point3(value)
    }
}

pub fn type_registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry
        .register_message::<Student>()
        .expect("register Student group");
    registry
        .register_message::<Point3>()
        .expect("register Point3 group");
    registry
}

pub fn decoder_registry() -> DecoderRegistry<Value> {
    let mut registry = DecoderRegistry::new();
    registry.register_type::<Student>();
    registry.register_type::<Point3>();
    registry
}

fn put_str(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
}

fn take4(buf: &[u8], pos: &mut usize) -> Result<[u8; 4], ParseError> {
    let slice = take(buf, pos, 4)?;
    let mut raw = [0u8; 4];
    raw.copy_from_slice(slice);
    Ok(raw)
}

fn take8(buf: &[u8], pos: &mut usize) -> Result<[u8; 8], ParseError> {
    let slice = take(buf, pos, 8)?;
    let mut raw = [0u8; 8];
    raw.copy_from_slice(slice);
    Ok(raw)
}

fn take<'a>(buf: &'a [u8], pos: &mut usize, n: usize) -> Result<&'a [u8], ParseError> {
    let end = pos.checked_add(n).ok_or(ParseError::Truncated)?;
    if end > buf.len() {
        return Err(ParseError::Truncated);
    }
    let slice = &buf[*pos..end];
    *pos = end;
    Ok(slice)
}

fn get_str(buf: &[u8], pos: &mut usize) -> Result<String, ParseError> {
    let len = u32::from_le_bytes(take4(buf, pos)?) as usize;
    let bytes = take(buf, pos, len)?;
    String::from_utf8(bytes.to_vec()).map_err(|e| ParseError::Malformed(e.to_string()))
}
