// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversions between math types and `serde_json` values.
//!
//! Vectors and quaternions are flat arrays (`[x, y, z, w]` for quaternions).
//! Matrices are arrays of four rows, so a JSON file reads the way a matrix is
//! written on paper even though `glam` stores columns.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use serde_json::{Map, Value};

use crate::transform::Transform;

/// A JSON value did not have the shape of the requested type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversionError {
    target: &'static str,
    payload: String,
}

impl ConversionError {
    fn new(target: &'static str, value: &Value) -> Self {
        Self {
            target,
            payload: serde_json::to_string(value).unwrap_or_default(),
        }
    }

    /// Returns the name of the type that was requested.
    #[must_use]
    pub fn target(&self) -> &'static str {
        self.target
    }

    /// Returns the offending JSON, serialized.
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot convert {} to {}", self.payload, self.target)
    }
}

impl core::error::Error for ConversionError {}

/// Types with a JSON representation.
pub trait JsonConvert: Sized {
    /// Parses `value`.
    fn from_json(value: &Value) -> Result<Self, ConversionError>;

    /// Serializes `self`.
    fn to_json(&self) -> Value;
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "JSON numbers are f64; the math types are f32"
)]
fn floats<const N: usize>(value: &Value, target: &'static str) -> Result<[f32; N], ConversionError> {
    let err = || ConversionError::new(target, value);
    let items = value.as_array().ok_or_else(err)?;
    if items.len() != N {
        return Err(err());
    }
    let mut out = [0.0; N];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = item.as_f64().ok_or_else(err)? as f32;
    }
    Ok(out)
}

fn array(values: &[f32]) -> Value {
    Value::Array(values.iter().map(|&v| Value::from(f64::from(v))).collect())
}

impl JsonConvert for f32 {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "JSON numbers are f64; the math types are f32"
    )]
    fn from_json(value: &Value) -> Result<Self, ConversionError> {
        value
            .as_f64()
            .map(|v| v as f32)
            .ok_or_else(|| ConversionError::new("f32", value))
    }

    fn to_json(&self) -> Value {
        Value::from(f64::from(*self))
    }
}

impl JsonConvert for Vec2 {
    fn from_json(value: &Value) -> Result<Self, ConversionError> {
        floats::<2>(value, "vec2").map(Self::from_array)
    }

    fn to_json(&self) -> Value {
        array(&self.to_array())
    }
}

impl JsonConvert for Vec3 {
    fn from_json(value: &Value) -> Result<Self, ConversionError> {
        floats::<3>(value, "vec3").map(Self::from_array)
    }

    fn to_json(&self) -> Value {
        array(&self.to_array())
    }
}

impl JsonConvert for Vec4 {
    fn from_json(value: &Value) -> Result<Self, ConversionError> {
        floats::<4>(value, "vec4").map(Self::from_array)
    }

    fn to_json(&self) -> Value {
        array(&self.to_array())
    }
}

impl JsonConvert for Quat {
    fn from_json(value: &Value) -> Result<Self, ConversionError> {
        floats::<4>(value, "quat").map(Self::from_array)
    }

    fn to_json(&self) -> Value {
        array(&self.to_array())
    }
}

impl JsonConvert for Mat4 {
    fn from_json(value: &Value) -> Result<Self, ConversionError> {
        let err = || ConversionError::new("mat4", value);
        let rows = value.as_array().ok_or_else(err)?;
        if rows.len() != 4 {
            return Err(err());
        }
        let mut parsed = [[0.0; 4]; 4];
        for (slot, row) in parsed.iter_mut().zip(rows) {
            *slot = floats::<4>(row, "mat4").map_err(|_| err())?;
        }
        Ok(Self::from_cols_array_2d(&parsed).transpose())
    }

    fn to_json(&self) -> Value {
        Value::Array((0..4).map(|r| array(&self.row(r).to_array())).collect())
    }
}

impl JsonConvert for Transform {
    fn from_json(value: &Value) -> Result<Self, ConversionError> {
        let err = || ConversionError::new("transform", value);
        let object = value.as_object().ok_or_else(err)?;
        let field = |key: &str| object.get(key).ok_or_else(err);
        Ok(Self::new(
            Vec3::from_json(field("translation")?)?,
            Quat::from_json(field("rotation")?)?,
            Vec3::from_json(field("scale")?)?,
        ))
    }

    fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("translation".into(), self.translation().to_json());
        object.insert("rotation".into(), self.rotation().to_json());
        object.insert("scale".into(), self.scale().to_json());
        Value::Object(object)
    }
}

/// Reads `key` from `json`, falling back to `default` when it is missing or
/// malformed.
///
/// An empty key or one starting with `/` is treated as a JSON pointer.
pub fn get_value<T: JsonConvert>(json: &Value, key: &str, default: T) -> T {
    let found = if key.is_empty() || key.starts_with('/') {
        json.pointer(key)
    } else {
        json.get(key)
    };
    match found.map(T::from_json) {
        Some(Ok(v)) => v,
        Some(Err(err)) => {
            log::debug!("json key '{key}': {err}");
            default
        }
        None => default,
    }
}

/// Serializes a list of values as a JSON array.
pub fn to_array<T: JsonConvert>(items: &[T]) -> Value {
    Value::Array(items.iter().map(JsonConvert::to_json).collect::<Vec<_>>())
}

/// Parses a JSON array into a list of values.
pub fn from_array<T: JsonConvert>(value: &Value) -> Result<Vec<T>, ConversionError> {
    value
        .as_array()
        .ok_or_else(|| ConversionError::new("array", value))?
        .iter()
        .map(T::from_json)
        .collect()
}
