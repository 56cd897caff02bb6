//! Output-column registration and per-source records.
//!
//! The host pipeline owns schema mutation; outside it, registration becomes
//! an explicit interface: plugins add named, typed fields to a [`Schema`] at
//! construction time and receive [`FieldKey`] handles for writing values into
//! [`SourceRecord`]s. The field set of a schema a plugin registered against
//! is fixed for the plugin's lifetime.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::util::{FpfsError, FpfsResult};

/// Value type of a schema field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// 64-bit floating point value, NaN until written.
    Double,
    /// 32-bit integer value.
    Int,
    /// Boolean flag, false until set.
    Flag,
}

impl FieldType {
    fn name(self) -> &'static str {
        match self {
            FieldType::Double => "double",
            FieldType::Int => "int",
            FieldType::Flag => "flag",
        }
    }
}

/// Description of one output column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Full column name, e.g. `fpfs_source_m00`.
    pub name: String,
    /// Value type of the column.
    pub ftype: FieldType,
    /// Human-readable description.
    pub doc: String,
}

impl FieldDescriptor {
    /// Creates a descriptor.
    pub fn new(name: impl Into<String>, ftype: FieldType, doc: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ftype,
            doc: doc.into(),
        }
    }
}

/// Handle to a registered field, valid for the schema that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldKey {
    index: usize,
    ftype: FieldType,
}

impl FieldKey {
    /// Value type of the field this key addresses.
    pub fn ftype(&self) -> FieldType {
        self.ftype
    }
}

/// Ordered collection of registered fields.
#[derive(Debug, Default)]
pub struct Schema {
    fields: Vec<FieldDescriptor>,
    by_name: HashMap<String, usize>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins name parts with the host's `_` separator convention.
    pub fn join(parts: &[&str]) -> String {
        parts.join("_")
    }

    /// Registers a field and returns its key. Names must be unique.
    pub fn add_field(&mut self, descriptor: FieldDescriptor) -> FpfsResult<FieldKey> {
        if self.by_name.contains_key(&descriptor.name) {
            return Err(FpfsError::DuplicateField {
                name: descriptor.name,
            });
        }
        let index = self.fields.len();
        let key = FieldKey {
            index,
            ftype: descriptor.ftype,
        };
        self.by_name.insert(descriptor.name.clone(), index);
        self.fields.push(descriptor);
        Ok(key)
    }

    /// Looks up the key for a registered field name.
    pub fn key(&self, name: &str) -> FpfsResult<FieldKey> {
        let index = *self.by_name.get(name).ok_or_else(|| FpfsError::UnknownField {
            name: name.to_string(),
        })?;
        Ok(FieldKey {
            index,
            ftype: self.fields[index].ftype,
        })
    }

    /// Returns the descriptor behind a key.
    pub fn descriptor(&self, key: FieldKey) -> &FieldDescriptor {
        &self.fields[key.index]
    }

    /// Returns all registered fields in registration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Creates a record with default values for every registered field.
    pub fn make_record(&self) -> SourceRecord {
        let values = self
            .fields
            .iter()
            .map(|f| match f.ftype {
                FieldType::Double => FieldValue::Double(f64::NAN),
                FieldType::Int => FieldValue::Int(0),
                FieldType::Flag => FieldValue::Flag(false),
            })
            .collect();
        SourceRecord { values }
    }
}

#[derive(Clone, Copy, Debug)]
enum FieldValue {
    Double(f64),
    Int(i32),
    Flag(bool),
}

impl FieldValue {
    fn type_name(self) -> &'static str {
        match self {
            FieldValue::Double(_) => "double",
            FieldValue::Int(_) => "int",
            FieldValue::Flag(_) => "flag",
        }
    }
}

/// Per-source value storage, created from a [`Schema`].
#[derive(Clone, Debug)]
pub struct SourceRecord {
    values: Vec<FieldValue>,
}

impl SourceRecord {
    fn slot(&self, key: FieldKey) -> FpfsResult<FieldValue> {
        self.values
            .get(key.index)
            .copied()
            .ok_or_else(|| FpfsError::UnknownField {
                name: format!("#{}", key.index),
            })
    }

    fn mismatch(&self, key: FieldKey, requested: &'static str) -> FpfsError {
        let actual = self
            .values
            .get(key.index)
            .map(|v| v.type_name())
            .unwrap_or("missing");
        FpfsError::FieldTypeMismatch {
            name: format!("#{}", key.index),
            actual,
            requested,
        }
    }

    /// Reads a double field.
    pub fn get_double(&self, key: FieldKey) -> FpfsResult<f64> {
        match self.slot(key)? {
            FieldValue::Double(v) => Ok(v),
            _ => Err(self.mismatch(key, FieldType::Double.name())),
        }
    }

    /// Writes a double field.
    pub fn set_double(&mut self, key: FieldKey, value: f64) -> FpfsResult<()> {
        match self.values.get_mut(key.index) {
            Some(FieldValue::Double(slot)) => {
                *slot = value;
                Ok(())
            }
            _ => Err(self.mismatch(key, FieldType::Double.name())),
        }
    }

    /// Reads an int field.
    pub fn get_int(&self, key: FieldKey) -> FpfsResult<i32> {
        match self.slot(key)? {
            FieldValue::Int(v) => Ok(v),
            _ => Err(self.mismatch(key, FieldType::Int.name())),
        }
    }

    /// Writes an int field.
    pub fn set_int(&mut self, key: FieldKey, value: i32) -> FpfsResult<()> {
        match self.values.get_mut(key.index) {
            Some(FieldValue::Int(slot)) => {
                *slot = value;
                Ok(())
            }
            _ => Err(self.mismatch(key, FieldType::Int.name())),
        }
    }

    /// Reads a flag field.
    pub fn get_flag(&self, key: FieldKey) -> FpfsResult<bool> {
        match self.slot(key)? {
            FieldValue::Flag(v) => Ok(v),
            _ => Err(self.mismatch(key, FieldType::Flag.name())),
        }
    }

    /// Writes a flag field.
    pub fn set_flag(&mut self, key: FieldKey, value: bool) -> FpfsResult<()> {
        match self.values.get_mut(key.index) {
            Some(FieldValue::Flag(slot)) => {
                *slot = value;
                Ok(())
            }
            _ => Err(self.mismatch(key, FieldType::Flag.name())),
        }
    }
}
