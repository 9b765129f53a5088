//! Classification schemas and typed metadata decoding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SpaceError};

/// Primitive types a metadata field may be declared as.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum PrimitiveType {
    /// Boolean flag.
    Bool,
    /// 64-bit signed integer.
    Int,
    /// UTF-8 string.
    Str,
    /// Decimal number, carried as `f64`.
    Decimal,
}

/// Decoded metadata value, one variant per [`PrimitiveType`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MetadataValue {
    /// Boolean flag.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// UTF-8 string.
    Str(String),
    /// Decimal number.
    Decimal(f64),
}

/// Maps metadata field names to their declared primitive types.
///
/// Implemented by [`Classification`]; collaborators may supply their own
/// schema source.
pub trait MetadataSchema {
    /// Declared type of `field`, if the schema knows it.
    fn field_type(&self, field: &str) -> Option<PrimitiveType>;
}

/// Classification of a space, carrying the metadata schema its versions
/// are decoded against.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    name: String,
    fields: BTreeMap<String, PrimitiveType>,
}

impl Classification {
    /// Creates a classification with no metadata fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Declares one metadata field.
    pub fn with_field(mut self, field: impl Into<String>, primitive: PrimitiveType) -> Self {
        self.fields.insert(field.into(), primitive);
        self
    }

    /// Classification name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, PrimitiveType)> {
        self.fields.iter().map(|(name, ty)| (name.as_str(), *ty))
    }
}

impl MetadataSchema for Classification {
    fn field_type(&self, field: &str) -> Option<PrimitiveType> {
        self.fields.get(field).copied()
    }
}

/// Decodes `field` out of a metadata document against `schema`.
///
/// The stored JSON value must coerce to the declared primitive type;
/// anything else fails with [`SpaceError::UnsupportedMetadata`]. A field
/// the schema does not declare fails the same way, an absent value fails
/// with [`SpaceError::NotFound`].
pub fn decode_field(
    schema: &impl MetadataSchema,
    metadata: &Map<String, Value>,
    field: &str,
) -> Result<MetadataValue> {
    let Some(primitive) = schema.field_type(field) else {
        return Err(SpaceError::UnsupportedMetadata {
            field: field.to_owned(),
            reason: "field not declared by the classification",
        });
    };
    let Some(value) = metadata.get(field) else {
        return Err(SpaceError::NotFound("metadata value"));
    };
    let coerced = match primitive {
        PrimitiveType::Bool => value.as_bool().map(MetadataValue::Bool),
        PrimitiveType::Int => value.as_i64().map(MetadataValue::Int),
        PrimitiveType::Str => value.as_str().map(|s| MetadataValue::Str(s.to_owned())),
        PrimitiveType::Decimal => value.as_f64().map(MetadataValue::Decimal),
    };
    coerced.ok_or_else(|| SpaceError::UnsupportedMetadata {
        field: field.to_owned(),
        reason: "stored value does not coerce to the declared type",
    })
}
