//! Lookups into provider API documents that turn a missing or mistyped
//! field into an `ApiShape` error naming the endpoint.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

pub(crate) fn field<'a>(value: &'a Value, key: &str, url: &str) -> Result<&'a Value> {
    value
        .get(key)
        .ok_or_else(|| Error::api_shape(url, format!("missing field `{}`", key)))
}

pub(crate) fn str_field<'a>(value: &'a Value, key: &str, url: &str) -> Result<&'a str> {
    field(value, key, url)?
        .as_str()
        .ok_or_else(|| Error::api_shape(url, format!("field `{}` is not a string", key)))
}

pub(crate) fn object_field<'a>(
    value: &'a Value,
    key: &str,
    url: &str,
) -> Result<&'a Map<String, Value>> {
    field(value, key, url)?
        .as_object()
        .ok_or_else(|| Error::api_shape(url, format!("field `{}` is not an object", key)))
}

/// Numbers, or strings holding a number (some APIs quote them).
pub(crate) fn number_field(value: &Value, key: &str, url: &str) -> Result<f64> {
    let v = field(value, key, url)?;
    v.as_f64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
        .ok_or_else(|| Error::api_shape(url, format!("field `{}` is not a number", key)))
}
