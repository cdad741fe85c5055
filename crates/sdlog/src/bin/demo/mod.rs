// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Demo message types shared by the sdlog-write and sdlog-read binaries.
//!
//! Payloads use a plain little-endian layout: scalars in field order,
//! strings as u32-length-prefixed UTF-8.

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
        put_i32(&mut buf, self.id);
        put_str(&mut buf, &self.name);
        put_i32(&mut buf, self.age);
        put_str(&mut buf, &self.email);
        put_f32(&mut buf, self.score);
        buf
    }

    fn decode(buf: &[u8]) -> Result<Self, ParseError> {
        let mut pos = 0;
        Ok(Self {
            id: get_i32(buf, &mut pos)?,
            name: get_str(buf, &mut pos)?,
            age: get_i32(buf, &mut pos)?,
            email: get_str(buf, &mut pos)?,
            score: get_f32(buf, &mut pos)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
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
        put_f64(&mut buf, self.x);
        put_f64(&mut buf, self.y);
        put_f64(&mut buf, self.z);
        buf
    }

    fn decode(buf: &[u8]) -> Result<Self, ParseError> {
        let mut pos = 0;
        Ok(Self {
            x: get_f64(buf, &mut pos)?,
            y: get_f64(buf, &mut pos)?,
            z: get_f64(buf, &mut pos)?,
        })
    }
}

/// Tagged value covering every demo type, for dispatch decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum DemoValue {
    Student(Student),
    Point3(Point3),
}

impl From<Student> for DemoValue {
    fn from(value: Student) -> Self {
        Self::Student(value)
    }
}

impl From<Point3> for DemoValue {
    fn from(value: Point3) -> Self {
        Self::Point3(value)
    }
}

/// Type registry covering the demo definition groups.
pub fn type_registry() -> anyhow::Result<TypeRegistry> {
    let mut registry = TypeRegistry::new();
    registry.register_message::<Student>()?;
    registry.register_message::<Point3>()?;
    Ok(registry)
}

/// Decoder registry covering every demo type.
pub fn decoder_registry() -> DecoderRegistry<DemoValue> {
    let mut registry = DecoderRegistry::new();
    registry.register_type::<Student>();
    registry.register_type::<Point3>();
    registry
}

// Little-endian payload helpers

fn put_i32(buf: &mut Vec<u8>, v: i32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_f32(buf: &mut Vec<u8>, v: f32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_f64(buf: &mut Vec<u8>, v: f64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_str(buf: &mut Vec<u8>, s: &str) {
    put_u32(buf, s.len() as u32);
    buf.extend_from_slice(s.as_bytes());
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

fn get_i32(buf: &[u8], pos: &mut usize) -> Result<i32, ParseError> {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(take(buf, pos, 4)?);
    Ok(i32::from_le_bytes(raw))
}

fn get_u32(buf: &[u8], pos: &mut usize) -> Result<u32, ParseError> {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(take(buf, pos, 4)?);
    Ok(u32::from_le_bytes(raw))
}

fn get_f32(buf: &[u8], pos: &mut usize) -> Result<f32, ParseError> {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(take(buf, pos, 4)?);
    Ok(f32::from_le_bytes(raw))
}

fn get_f64(buf: &[u8], pos: &mut usize) -> Result<f64, ParseError> {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(take(buf, pos, 8)?);
    Ok(f64::from_le_bytes(raw))
}

fn get_str(buf: &[u8], pos: &mut usize) -> Result<String, ParseError> {
    let len = get_u32(buf, pos)? as usize;
    let bytes = take(buf, pos, len)?;
    String::from_utf8(bytes.to_vec()).map_err(|e| ParseError::Malformed(e.to_string()))
}
