//! Declarative payload validation.
//!
//! A [`Schema`] is a static list of [`FieldRule`]s checked by one generic
//! routine. Validation never corrects input: the first offending field is
//! reported as a [`ValidationFailure`] naming the field and the constraint.

pub mod schemas;

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// Validation failure carrying a client-facing message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationFailure {
    pub field: String,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn for_field(field: &str, reason: impl std::fmt::Display) -> Self {
        Self::new(field, format!("\"{}\" {}", field, reason))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Integer,
    Uuid,
}

impl FieldKind {
    fn describe(&self) -> &'static str {
        match self {
            FieldKind::String => "must be a string",
            FieldKind::Number => "must be a number",
            FieldKind::Integer => "must be an integer",
            FieldKind::Uuid => "must be a valid GUID",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Constraint {
    /// Inclusive lower bound for numeric fields
    Min(f64),
    /// Inclusive upper bound for numeric fields
    Max(f64),
    /// Maximum number of fractional digits for numeric fields
    Scale(u32),
    /// Enumerated allow-set for string fields
    OneOf(&'static [&'static str]),
}

/// How keys that no rule names are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownFields {
    Reject,
    Allow,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub nullable: bool,
    pub allow_empty: bool,
    pub constraints: &'static [Constraint],
}

impl FieldRule {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            nullable: false,
            allow_empty: false,
            constraints: &[],
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind)
        }
    }

    pub const fn nullable(self) -> Self {
        Self { nullable: true, ..self }
    }

    pub const fn allow_empty(self) -> Self {
        Self { allow_empty: true, ..self }
    }

    pub const fn with(self, constraints: &'static [Constraint]) -> Self {
        Self { constraints, ..self }
    }

    fn check(&self, value: &Value) -> Result<(), ValidationFailure> {
        if value.is_null() {
            return if self.nullable {
                Ok(())
            } else {
                Err(ValidationFailure::for_field(self.name, self.kind.describe()))
            };
        }

        match self.kind {
            FieldKind::String => {
                let s = value
                    .as_str()
                    .ok_or_else(|| ValidationFailure::for_field(self.name, self.kind.describe()))?;
                if s.is_empty() && !self.allow_empty {
                    return Err(ValidationFailure::for_field(self.name, "is not allowed to be empty"));
                }
            }
            FieldKind::Number => {
                if !value.is_number() {
                    return Err(ValidationFailure::for_field(self.name, self.kind.describe()));
                }
                if as_decimal(value).is_none() {
                    return Err(ValidationFailure::for_field(self.name, "must be a safe number"));
                }
            }
            FieldKind::Integer => {
                if !(value.is_i64() || value.is_u64()) {
                    return Err(ValidationFailure::for_field(self.name, self.kind.describe()));
                }
                // Integer fields land in 32-bit columns
                if !value.as_i64().is_some_and(|n| i32::try_from(n).is_ok()) {
                    return Err(ValidationFailure::for_field(self.name, "must be a safe number"));
                }
            }
            FieldKind::Uuid => {
                let valid = value.as_str().map(|s| Uuid::parse_str(s).is_ok()).unwrap_or(false);
                if !valid {
                    return Err(ValidationFailure::for_field(self.name, self.kind.describe()));
                }
            }
        }

        for constraint in self.constraints {
            match constraint {
                Constraint::Min(min) => {
                    if value.as_f64().map(|n| n < *min).unwrap_or(false) {
                        return Err(ValidationFailure::for_field(
                            self.name,
                            format!("must be greater than or equal to {}", min),
                        ));
                    }
                }
                Constraint::Max(max) => {
                    if value.as_f64().map(|n| n > *max).unwrap_or(false) {
                        return Err(ValidationFailure::for_field(
                            self.name,
                            format!("must be less than or equal to {}", max),
                        ));
                    }
                }
                Constraint::Scale(digits) => {
                    if as_decimal(value).is_some_and(|d| d.normalize().scale() > *digits) {
                        return Err(ValidationFailure::for_field(
                            self.name,
                            format!("must have no more than {} decimal places", digits),
                        ));
                    }
                }
                Constraint::OneOf(allowed) => {
                    let ok = value.as_str().map(|s| allowed.contains(&s)).unwrap_or(false);
                    if !ok {
                        return Err(ValidationFailure::for_field(
                            self.name,
                            format!("must be one of [{}]", allowed.join(", ")),
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}

/// Exact decimal value of a JSON number, if it fits a `Decimal`
fn as_decimal(value: &Value) -> Option<Decimal> {
    let Value::Number(number) = value else {
        return None;
    };
    let text = number.to_string();
    if text.contains(['e', 'E']) {
        Decimal::from_scientific(&text).ok()
    } else {
        Decimal::from_str(&text).ok()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [FieldRule],
    pub unknown: UnknownFields,
    /// Require at least one declared field to be present
    pub require_any: bool,
    /// Compare keys case-insensitively (header maps)
    pub case_insensitive: bool,
}

impl Schema {
    pub const fn closed(name: &'static str, fields: &'static [FieldRule]) -> Self {
        Self {
            name,
            fields,
            unknown: UnknownFields::Reject,
            require_any: false,
            case_insensitive: false,
        }
    }

    /// Validate a payload, returning the normalized object on success
    pub fn validate(&self, payload: &Value) -> Result<Map<String, Value>, ValidationFailure> {
        let object = payload
            .as_object()
            .ok_or_else(|| ValidationFailure::for_field("value", "must be of type object"))?;

        let mut normalized = Map::with_capacity(object.len());
        for (key, value) in object {
            let key = if self.case_insensitive {
                key.to_ascii_lowercase()
            } else {
                key.clone()
            };
            normalized.insert(key, value.clone());
        }

        for rule in self.fields {
            match normalized.get(rule.name) {
                Some(value) => rule.check(value)?,
                None if rule.required => {
                    return Err(ValidationFailure::for_field(rule.name, "is required"));
                }
                None => {}
            }
        }

        if self.unknown == UnknownFields::Reject {
            if let Some(key) = normalized
                .keys()
                .find(|key| !self.fields.iter().any(|rule| rule.name == key.as_str()))
            {
                return Err(ValidationFailure::for_field(key, "is not allowed"));
            }
        }

        if self.require_any && !self.fields.iter().any(|rule| normalized.contains_key(rule.name)) {
            let names: Vec<&str> = self.fields.iter().map(|rule| rule.name).collect();
            return Err(ValidationFailure::for_field(
                "value",
                format!("must contain at least one of [{}]", names.join(", ")),
            ));
        }

        tracing::trace!(schema = self.name, "payload validated");
        Ok(normalized)
    }

    /// Validate, then deserialize the normalized object into `T`
    pub fn validate_into<T: DeserializeOwned>(&self, payload: &Value) -> Result<T, ValidationFailure> {
        let normalized = self.validate(payload)?;
        serde_json::from_value(Value::Object(normalized)).map_err(|e| {
            tracing::debug!(schema = self.name, "payload did not deserialize: {}", e);
            ValidationFailure::for_field("value", "contains an invalid value")
        })
    }
}
