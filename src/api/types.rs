//! Wire types for the device-management API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;
use thiserror::Error;

use crate::api::error::ApiError;

/// A device as returned by the device endpoints.
///
/// `config` holds the raw JSON text exactly as the server sent it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub device_uuid: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default, with = "raw_json", skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
}

/// A sensor reading as returned by the reading endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub device_uuid: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reading_uuid: String,

    #[serde(
        default,
        rename = "temperature_celcius",
        skip_serializing_if = "Option::is_none"
    )]
    pub temperature_celsius: Option<Measurement>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_humidity: Option<Measurement>,
}

#[derive(Debug, Serialize)]
pub struct RegistrationRequest<'a> {
    pub name: &'a str,
    pub config: &'a RawValue,
}

#[derive(Debug, Serialize)]
pub struct ConfigureDeviceRequest<'a> {
    pub device_uuid: &'a str,
    pub name: &'a str,
    pub config: &'a RawValue,
}

#[derive(Debug, Serialize)]
pub struct GetDeviceTokenRequest<'a> {
    pub device_uuid: &'a str,
}

#[derive(Debug, Serialize)]
pub struct InsertReadingRequest<'a> {
    #[serde(rename = "temperature_celcius")]
    pub temperature_celsius: &'a Measurement,
    pub relative_humidity: &'a Measurement,
}

/// Check that `config` is a JSON document and keep its text as-is.
pub fn parse_config(config: &str) -> Result<Box<RawValue>, ApiError> {
    RawValue::from_string(config.to_owned()).map_err(ApiError::InvalidConfig)
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum MeasurementError {
    #[error("`{0}` is not a JSON number")]
    NotANumber(String),

    #[error("{0} is not a finite number")]
    NotFinite(f64),
}

/// A decimal value sent as its exact JSON number text.
///
/// `"21.10"` goes over the wire as `21.10`, never via a binary float.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Measurement(String);

impl Measurement {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Measurement {
    type Err = MeasurementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        text.parse::<serde_json::Number>()
            .map_err(|_| MeasurementError::NotANumber(s.to_owned()))?;
        Ok(Self(text.to_owned()))
    }
}

impl TryFrom<f64> for Measurement {
    type Error = MeasurementError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(MeasurementError::NotFinite(value));
        }
        // Display for f64 is the shortest text that round-trips, never exponent form.
        Ok(Self(value.to_string()))
    }
}

impl Serialize for Measurement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let raw = RawValue::from_string(self.0.clone()).map_err(serde::ser::Error::custom)?;
        raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Measurement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        let text = raw.get();
        // Quoted numbers are accepted as well.
        let text = if text.starts_with('"') {
            serde_json::from_str::<String>(text).map_err(serde::de::Error::custom)?
        } else {
            text.to_owned()
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// (De)serializes an optional JSON document as its raw text.
mod raw_json {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::value::RawValue;

    pub fn serialize<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(text) => {
                let raw = RawValue::from_string(text.clone()).map_err(serde::ser::Error::custom)?;
                raw.serialize(serializer)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let raw: Option<Box<RawValue>> = Option::deserialize(deserializer)?;
        Ok(raw.map(|raw| raw.get().to_owned()))
    }
}
