//! Structural checks applied to provider payloads before they are trusted

use super::error::ShapeError;
use serde_json::Value;

/// Expected shape of a decoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// A mapping with at least one entry.
    NonEmptyObject,
    /// A mapping holding `key`, whose value is itself a mapping.
    ObjectWithKey(String),
}

/// Checks `payload` against `shape`, naming the first precondition that fails.
pub fn validate(payload: &Value, shape: &Shape) -> Result<(), ShapeError> {
    let object = payload.as_object().ok_or(ShapeError::NotAnObject)?;

    match shape {
        Shape::NonEmptyObject => {
            if object.is_empty() {
                return Err(ShapeError::EmptyMapping);
            }
        }
        Shape::ObjectWithKey(key) => match object.get(key) {
            None => return Err(ShapeError::MissingKey { key: key.clone() }),
            Some(inner) if !inner.is_object() => {
                return Err(ShapeError::KeyNotAnObject { key: key.clone() });
            }
            Some(_) => {}
        },
    }

    Ok(())
}
