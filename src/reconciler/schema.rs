//! Declarative attribute schemas.
//!
//! The orchestrator hands attributes over as a flat string map. Each schema
//! turns that map into checked values, or an explicit [`SchemaError`].

use std::collections::BTreeMap;

use thiserror::Error;

/// Flat attribute map exchanged with the orchestrator.
pub type Attributes = BTreeMap<String, String>;

/// Serialized form of an empty device config.
pub const EMPTY_CONFIG: &str = "{}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeMode {
    /// Must be supplied by the orchestrator.
    Required,
    /// May be supplied; `default` is used otherwise.
    Optional { default: &'static str },
    /// Set by the provider only.
    Computed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    pub name: &'static str,
    pub mode: AttributeMode,
    /// Value must be a JSON document.
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub type_name: &'static str,
    pub attributes: &'static [Attribute],
}

/// Managed resource `fruitpi_device`. Identity is the device UUID.
pub const DEVICE_SCHEMA: Schema = Schema {
    type_name: "fruitpi_device",
    attributes: &[
        Attribute {
            name: "name",
            mode: AttributeMode::Optional { default: "" },
            json: false,
        },
        Attribute {
            name: "config",
            mode: AttributeMode::Optional {
                default: EMPTY_CONFIG,
            },
            json: true,
        },
    ],
};

/// Read-only lookup `fruitpi_device_token`.
pub const DEVICE_TOKEN_SCHEMA: Schema = Schema {
    type_name: "fruitpi_device_token",
    attributes: &[
        Attribute {
            name: "device_uuid",
            mode: AttributeMode::Required,
            json: false,
        },
        Attribute {
            name: "token",
            mode: AttributeMode::Computed,
            json: false,
        },
    ],
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("{resource}: unknown attribute `{name}`")]
    UnknownAttribute { resource: &'static str, name: String },

    #[error("{resource}: missing required attribute `{name}`")]
    MissingRequired {
        resource: &'static str,
        name: &'static str,
    },

    #[error("{resource}: attribute `{name}` is computed and cannot be set")]
    ComputedAttribute {
        resource: &'static str,
        name: &'static str,
    },

    #[error("{resource}: attribute `{name}` is not valid JSON: {reason}")]
    InvalidJson {
        resource: &'static str,
        name: &'static str,
        reason: String,
    },

    #[error("{resource}: attribute `{name}` is declared more than once")]
    DuplicateAttribute {
        resource: &'static str,
        name: &'static str,
    },

    #[error("{resource}: attribute `{name}` has an unusable default")]
    InvalidDefault {
        resource: &'static str,
        name: &'static str,
    },
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    /// Check orchestrator input and fill in defaults.
    ///
    /// The result holds every non-computed attribute exactly once.
    pub fn resolve(&self, input: &Attributes) -> Result<Attributes, SchemaError> {
        for key in input.keys() {
            let attr = self
                .attribute(key)
                .ok_or_else(|| SchemaError::UnknownAttribute {
                    resource: self.type_name,
                    name: key.clone(),
                })?;
            if attr.mode == AttributeMode::Computed {
                return Err(SchemaError::ComputedAttribute {
                    resource: self.type_name,
                    name: attr.name,
                });
            }
        }

        let mut resolved = Attributes::new();
        for attr in self.attributes {
            let value = match (attr.mode, input.get(attr.name)) {
                (AttributeMode::Computed, _) => continue,
                (_, Some(value)) => value.clone(),
                (AttributeMode::Optional { default }, None) => default.to_string(),
                (AttributeMode::Required, None) => {
                    return Err(SchemaError::MissingRequired {
                        resource: self.type_name,
                        name: attr.name,
                    })
                }
            };
            if attr.json {
                self.check_json(attr, &value)?;
            }
            resolved.insert(attr.name.to_string(), value);
        }
        Ok(resolved)
    }

    /// Check the schema itself: unique names, defaults that pass their own checks.
    pub fn validate_definition(&self) -> Result<(), SchemaError> {
        for (i, attr) in self.attributes.iter().enumerate() {
            if self.attributes[..i].iter().any(|a| a.name == attr.name) {
                return Err(SchemaError::DuplicateAttribute {
                    resource: self.type_name,
                    name: attr.name,
                });
            }
            if let AttributeMode::Optional { default } = attr.mode {
                if attr.json && self.check_json(attr, default).is_err() {
                    return Err(SchemaError::InvalidDefault {
                        resource: self.type_name,
                        name: attr.name,
                    });
                }
            }
        }
        Ok(())
    }

    fn check_json(&self, attr: &Attribute, value: &str) -> Result<(), SchemaError> {
        serde_json::from_str::<serde::de::IgnoredAny>(value)
            .map(|_| ())
            .map_err(|e| SchemaError::InvalidJson {
                resource: self.type_name,
                name: attr.name,
                reason: e.to_string(),
            })
    }
}
