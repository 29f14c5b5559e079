//! Typed conversions at the field boundary.
//!
//! [`IntoFieldValue`] runs on encode, [`FromFieldValue`] on decode. Explicit
//! null is handled separately from a present value: [`FromFieldValue::from_null`]
//! names the value a null clears the target to, or `None` when null should leave
//! the target untouched.

use crate::{FieldMap, FieldValue, Result, ValueError};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

/// Converts a typed value into a [`FieldValue`] for encoding.
pub trait IntoFieldValue {
    fn into_field_value(self) -> FieldValue;
}

/// Converts a decoded [`FieldValue`] back into a typed value.
pub trait FromFieldValue: Sized {
    /// Converts a value that may be any variant, including `Null`.
    fn from_field_value(value: FieldValue) -> Result<Self>;

    /// The value an explicit null clears the target to.
    ///
    /// `None` means a null leaves the existing value as it is.
    fn from_null() -> Option<Self> {
        None
    }
}

/// Decodes a possibly-null value.
///
/// Returns `Ok(None)` when the value is null and `T` has no cleared state.
pub fn from_nullable<T: FromFieldValue>(value: FieldValue) -> Result<Option<T>> {
    if value.is_null() {
        if let Some(cleared) = T::from_null() {
            return Ok(Some(cleared));
        }
        return Ok(None);
    }
    T::from_field_value(value).map(Some)
}

// ── Identity ─────────────────────────────────────────────────────

impl IntoFieldValue for FieldValue {
    fn into_field_value(self) -> FieldValue {
        self
    }
}

impl FromFieldValue for FieldValue {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        Ok(value)
    }

    fn from_null() -> Option<Self> {
        Some(FieldValue::Null)
    }
}

impl IntoFieldValue for serde_json::Value {
    fn into_field_value(self) -> FieldValue {
        FieldValue::from(self)
    }
}

impl FromFieldValue for serde_json::Value {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        Ok(value.into())
    }

    fn from_null() -> Option<Self> {
        Some(serde_json::Value::Null)
    }
}

// ── Scalars ──────────────────────────────────────────────────────

impl IntoFieldValue for bool {
    fn into_field_value(self) -> FieldValue {
        FieldValue::Bool(self)
    }
}

impl FromFieldValue for bool {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Bool(b) => Ok(b),
            other => Err(ValueError::mismatch("bool", &other)),
        }
    }

    fn from_null() -> Option<Self> {
        Some(false)
    }
}

macro_rules! integer_conversions {
    ($($ty:ty),*) => {
        $(
            impl IntoFieldValue for $ty {
                fn into_field_value(self) -> FieldValue {
                    match i64::try_from(self) {
                        Ok(i) => FieldValue::Int(i),
                        // Only unsigned values above i64::MAX land here.
                        Err(_) => FieldValue::UInt(self as u64),
                    }
                }
            }

            impl FromFieldValue for $ty {
                fn from_field_value(value: FieldValue) -> Result<Self> {
                    match value {
                        FieldValue::Int(i) => <$ty>::try_from(i).map_err(|_| ValueError::OutOfRange {
                            target: stringify!($ty),
                            value: i.to_string(),
                        }),
                        FieldValue::UInt(u) => <$ty>::try_from(u).map_err(|_| ValueError::OutOfRange {
                            target: stringify!($ty),
                            value: u.to_string(),
                        }),
                        other => Err(ValueError::mismatch("integer", &other)),
                    }
                }

                fn from_null() -> Option<Self> {
                    Some(0)
                }
            }
        )*
    };
}

integer_conversions!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl IntoFieldValue for f64 {
    fn into_field_value(self) -> FieldValue {
        FieldValue::Float(self)
    }
}

impl FromFieldValue for f64 {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        value
            .as_f64()
            .ok_or_else(|| ValueError::mismatch("number", &value))
    }

    fn from_null() -> Option<Self> {
        Some(0.0)
    }
}

impl IntoFieldValue for f32 {
    fn into_field_value(self) -> FieldValue {
        FieldValue::Float(f64::from(self))
    }
}

impl FromFieldValue for f32 {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        let wide = f64::from_field_value(value)?;
        let narrow = wide as f32;
        if wide.is_finite() && !narrow.is_finite() {
            return Err(ValueError::OutOfRange {
                target: "f32",
                value: wide.to_string(),
            });
        }
        Ok(narrow)
    }

    fn from_null() -> Option<Self> {
        Some(0.0)
    }
}

impl IntoFieldValue for String {
    fn into_field_value(self) -> FieldValue {
        FieldValue::String(self)
    }
}

impl IntoFieldValue for &str {
    fn into_field_value(self) -> FieldValue {
        FieldValue::String(self.to_string())
    }
}

impl FromFieldValue for String {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::String(s) => Ok(s),
            other => Err(ValueError::mismatch("string", &other)),
        }
    }

    fn from_null() -> Option<Self> {
        Some(String::new())
    }
}

impl IntoFieldValue for DateTime<Utc> {
    fn into_field_value(self) -> FieldValue {
        FieldValue::Date(self)
    }
}

// No cleared state: null leaves a non-optional date untouched.
impl FromFieldValue for DateTime<Utc> {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Date(d) => Ok(d),
            FieldValue::String(s) => DateTime::parse_from_rfc3339(&s)
                .map(|d| d.with_timezone(&Utc))
                .map_err(|e| ValueError::InvalidDate(format!("{s}: {e}"))),
            other => Err(ValueError::mismatch("date", &other)),
        }
    }
}

// ── Containers ───────────────────────────────────────────────────

impl<T: IntoFieldValue> IntoFieldValue for Option<T> {
    fn into_field_value(self) -> FieldValue {
        self.map_or(FieldValue::Null, IntoFieldValue::into_field_value)
    }
}

impl<T: FromFieldValue> FromFieldValue for Option<T> {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        if value.is_null() {
            return Ok(None);
        }
        T::from_field_value(value).map(Some)
    }

    fn from_null() -> Option<Self> {
        Some(None)
    }
}

impl<T: IntoFieldValue> IntoFieldValue for Vec<T> {
    fn into_field_value(self) -> FieldValue {
        FieldValue::Array(self.into_iter().map(IntoFieldValue::into_field_value).collect())
    }
}

impl<T: FromFieldValue> FromFieldValue for Vec<T> {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Array(items) => items
                .into_iter()
                .map(T::from_field_value)
                .collect(),
            other => Err(ValueError::mismatch("array", &other)),
        }
    }

    fn from_null() -> Option<Self> {
        Some(Vec::new())
    }
}

impl<T: IntoFieldValue> IntoFieldValue for BTreeMap<String, T> {
    fn into_field_value(self) -> FieldValue {
        FieldValue::Object(
            self.into_iter()
                .map(|(key, value)| (key, value.into_field_value()))
                .collect(),
        )
    }
}

impl<T: IntoFieldValue> IntoFieldValue for HashMap<String, T> {
    fn into_field_value(self) -> FieldValue {
        FieldValue::Object(
            self.into_iter()
                .map(|(key, value)| (key, value.into_field_value()))
                .collect::<FieldMap>(),
        )
    }
}

impl<T: FromFieldValue> FromFieldValue for BTreeMap<String, T> {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Object(map) => map
                .into_iter()
                .map(|(key, value)| Ok((key, T::from_field_value(value)?)))
                .collect(),
            other => Err(ValueError::mismatch("object", &other)),
        }
    }

    fn from_null() -> Option<Self> {
        Some(BTreeMap::new())
    }
}

impl<T: FromFieldValue> FromFieldValue for HashMap<String, T> {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        BTreeMap::<String, T>::from_field_value(value).map(|map| map.into_iter().collect())
    }

    fn from_null() -> Option<Self> {
        Some(HashMap::new())
    }
}
