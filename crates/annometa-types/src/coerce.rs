//! Attribute value coercion
//!
//! Converts a stored [`AttributeValue`] into the shape required by a declared
//! [`AttributeType`]. The rules:
//!
//! - numeric widening (`int` -> `long`/`float`/`double`), never truncation
//! - enum constant lookup by name (`"SINGLETON"` -> `Scope.SINGLETON`)
//! - single value -> one-element array, one-element array -> single value
//! - enum and class values render to their names for `string` targets
//!
//! Everything else is a [`TypeError`].

use crate::error::TypeError;
use crate::ty::{AttributeType, EnumType};
use crate::value::{AttributeValue, EnumConstant};

/// Coerce `value` to `ty`
pub fn coerce(value: &AttributeValue, ty: &AttributeType) -> Result<AttributeValue, TypeError> {
    match (ty, value) {
        (AttributeType::Array(element), AttributeValue::Array(items)) => items
            .iter()
            .map(|item| coerce(item, element))
            .collect::<Result<Vec<_>, _>>()
            .map(AttributeValue::Array),
        (AttributeType::Array(element), scalar) => {
            Ok(AttributeValue::Array(vec![coerce(scalar, element)?]))
        }
        (_, AttributeValue::Array(items)) if items.len() == 1 => coerce(&items[0], ty),

        (AttributeType::Bool, AttributeValue::Bool(_)) => Ok(value.clone()),

        (AttributeType::Int, AttributeValue::Int(i)) => {
            if i32::try_from(*i).is_ok() {
                Ok(value.clone())
            } else {
                Err(out_of_range(ty, value))
            }
        }
        (AttributeType::Long, AttributeValue::Int(_)) => Ok(value.clone()),
        (AttributeType::Float, AttributeValue::Int(i)) => {
            let narrowed = *i as f32;
            if narrowed as i128 == i128::from(*i) {
                Ok(AttributeValue::Float(narrowed as f64))
            } else {
                Err(out_of_range(ty, value))
            }
        }
        (AttributeType::Float, AttributeValue::Float(f)) => {
            let narrowed = *f as f32;
            if f.is_nan() || narrowed as f64 == *f {
                Ok(AttributeValue::Float(narrowed as f64))
            } else {
                Err(out_of_range(ty, value))
            }
        }
        (AttributeType::Double, AttributeValue::Int(i)) => {
            let widened = *i as f64;
            if widened as i128 == i128::from(*i) {
                Ok(AttributeValue::Float(widened))
            } else {
                Err(out_of_range(ty, value))
            }
        }
        (AttributeType::Double, AttributeValue::Float(_)) => Ok(value.clone()),

        (AttributeType::String, AttributeValue::String(_)) => Ok(value.clone()),
        (AttributeType::String, AttributeValue::Enum(e)) => {
            Ok(AttributeValue::String(e.constant.clone()))
        }
        (AttributeType::String, AttributeValue::Class(c)) => Ok(AttributeValue::String(c.clone())),

        (AttributeType::Class, AttributeValue::Class(_)) => Ok(value.clone()),
        (AttributeType::Class, AttributeValue::String(s)) => Ok(AttributeValue::Class(s.clone())),

        (AttributeType::Enum(enum_type), AttributeValue::Enum(constant)) => {
            if constant.enum_type != enum_type.name {
                return Err(mismatch(ty, value));
            }
            check_constant(enum_type, &constant.constant)?;
            Ok(value.clone())
        }
        (AttributeType::Enum(enum_type), AttributeValue::String(name)) => {
            check_constant(enum_type, name)?;
            Ok(AttributeValue::Enum(EnumConstant::new(enum_type.name.clone(), name.clone())))
        }

        (AttributeType::Annotation(expected), AttributeValue::Annotation(nested))
            if nested.name == *expected =>
        {
            Ok(value.clone())
        }

        _ => Err(mismatch(ty, value)),
    }
}

fn check_constant(enum_type: &EnumType, constant: &str) -> Result<(), TypeError> {
    if enum_type.has_constant(constant) {
        Ok(())
    } else {
        Err(TypeError::UnknownEnumConstant {
            enum_type: enum_type.name.clone(),
            constant: constant.to_string(),
        })
    }
}

fn mismatch(ty: &AttributeType, value: &AttributeValue) -> TypeError {
    let actual = match value {
        AttributeValue::Annotation(nested) => format!("@{}", nested.name),
        AttributeValue::Enum(e) => format!("enum {}", e.enum_type),
        other => other.type_name().to_string(),
    };
    TypeError::Mismatch {
        expected: ty.to_string(),
        actual,
    }
}

fn out_of_range(ty: &AttributeType, value: &AttributeValue) -> TypeError {
    TypeError::OutOfRange {
        expected: ty.to_string(),
        value: value.to_string(),
    }
}
