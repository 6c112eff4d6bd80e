//! Parameter validation rules.
//!
//! Rules are declared per field, either as typed [`Rule`] values or with the
//! familiar pipe syntax:
//!
//! ```rust
//! use restkit_client::validation::RuleSet;
//! use serde_json::json;
//!
//! let rules = RuleSet::new()
//!     .parse_field("name", "required|string|max:64")
//!     .unwrap()
//!     .parse_field("age", "integer|min:0")
//!     .unwrap();
//!
//! let params = json!({ "name": "Ada", "age": 36 });
//! assert!(rules.validate(params.as_object().unwrap()).is_ok());
//! ```
//!
//! Fields that are absent and not `required` skip all their other rules.
//! Dotted field names (`address.city`) reach into nested objects.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::error::{Error, ErrorKind, Result};
use crate::response::lookup_in;

/// A single validation rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// Present and not empty.
    Required,
    /// `null` passes every other rule.
    Nullable,
    /// A JSON string.
    String,
    /// An integer, or a string holding one.
    Integer,
    /// A number, or a string holding one.
    Numeric,
    /// `true`, `false`, `0`, `1`, `"0"` or `"1"`.
    Boolean,
    /// A JSON array or object.
    Array,
    /// A string shaped like an email address.
    Email,
    /// A string that parses as an absolute URL.
    Url,
    /// Minimum size: numeric value, string length in chars, or element count.
    Min(f64),
    /// Maximum size, measured like [`Rule::Min`].
    Max(f64),
    /// Value must be one of the listed options.
    In(Vec<String>),
}

impl Rule {
    /// Parse one rule, e.g. `required`, `max:255`, `in:draft,published`.
    pub fn parse(text: &str) -> Result<Self> {
        let (name, arg) = match text.split_once(':') {
            Some((name, arg)) => (name.trim(), Some(arg.trim())),
            None => (text.trim(), None),
        };

        let rule = match (name, arg) {
            ("required", None) => Rule::Required,
            ("nullable", None) => Rule::Nullable,
            ("string", None) => Rule::String,
            ("integer", None) => Rule::Integer,
            ("numeric", None) => Rule::Numeric,
            ("boolean", None) => Rule::Boolean,
            ("array", None) => Rule::Array,
            ("email", None) => Rule::Email,
            ("url", None) => Rule::Url,
            ("min", Some(arg)) => Rule::Min(parse_bound(text, arg)?),
            ("max", Some(arg)) => Rule::Max(parse_bound(text, arg)?),
            ("in", Some(arg)) => Rule::In(arg.split(',').map(|s| s.trim().to_string()).collect()),
            _ => {
                return Err(Error::new(ErrorKind::Config(format!(
                    "unknown validation rule '{text}'"
                ))))
            }
        };
        Ok(rule)
    }

    /// Check a present value; returns the failure message.
    fn check(&self, field: &str, value: &Value, numeric_context: bool) -> Option<String> {
        let ok = match self {
            Rule::Required | Rule::Nullable => true,
            Rule::String => value.is_string(),
            Rule::Integer => is_integer(value),
            Rule::Numeric => as_number(value).is_some(),
            Rule::Boolean => {
                value.is_boolean()
                    || matches!(value.as_i64(), Some(0 | 1))
                    || matches!(value.as_str(), Some("0" | "1"))
            }
            Rule::Array => value.is_array() || value.is_object(),
            Rule::Email => value.as_str().is_some_and(looks_like_email),
            Rule::Url => value
                .as_str()
                .is_some_and(|s| url::Url::parse(s).is_ok()),
            Rule::Min(min) => size_of(value, numeric_context).is_some_and(|size| size >= *min),
            Rule::Max(max) => size_of(value, numeric_context).is_some_and(|size| size <= *max),
            Rule::In(options) => scalar_text(value).is_some_and(|text| options.contains(&text)),
        };

        if ok {
            return None;
        }

        let message = match self {
            Rule::Required | Rule::Nullable => format!("The {field} field is required."),
            Rule::String => format!("The {field} must be a string."),
            Rule::Integer => format!("The {field} must be an integer."),
            Rule::Numeric => format!("The {field} must be a number."),
            Rule::Boolean => format!("The {field} field must be true or false."),
            Rule::Array => format!("The {field} must be an array."),
            Rule::Email => format!("The {field} must be a valid email address."),
            Rule::Url => format!("The {field} format is invalid."),
            Rule::Min(min) => format!("The {field} must be at least {min}."),
            Rule::Max(max) => format!("The {field} may not be greater than {max}."),
            Rule::In(_) => format!("The selected {field} is invalid."),
        };
        Some(message)
    }
}

fn parse_bound(text: &str, arg: &str) -> Result<f64> {
    arg.parse::<f64>().map_err(|_| {
        Error::new(ErrorKind::Config(format!(
            "validation rule '{text}' needs a numeric argument"
        )))
    })
}

fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.is_i64() || n.is_u64(),
        Value::String(s) => s.trim().parse::<i64>().is_ok(),
        _ => false,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Size used by `min`/`max`. Strings count chars unless a numeric rule
/// is also declared for the field.
fn size_of(value: &Value, numeric_context: bool) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if numeric_context => s.trim().parse::<f64>().ok(),
        Value::String(s) => Some(s.chars().count() as f64),
        Value::Array(items) => Some(items.len() as f64),
        Value::Object(map) => Some(map.len() as f64),
        Value::Bool(_) | Value::Null => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        _ => None,
    }
}

fn looks_like_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !s.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Rules for a whole parameter mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    fields: Vec<(String, Vec<Rule>)>,
}

impl RuleSet {
    /// An empty rule set; validation always passes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare rules for a field. Repeated fields accumulate.
    pub fn field(mut self, name: impl Into<String>, rules: impl IntoIterator<Item = Rule>) -> Self {
        let name = name.into();
        let rules: Vec<Rule> = rules.into_iter().collect();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing)) => existing.extend(rules),
            None => self.fields.push((name, rules)),
        }
        self
    }

    /// Declare rules with pipe syntax: `"required|string|max:255"`.
    pub fn parse_field(self, name: impl Into<String>, text: &str) -> Result<Self> {
        let rules = text
            .split('|')
            .filter(|part| !part.trim().is_empty())
            .map(Rule::parse)
            .collect::<Result<Vec<_>>>()?;
        Ok(self.field(name, rules))
    }

    /// Returns true if no rules are declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Run every rule against the params.
    pub fn validate(&self, params: &Map<String, Value>) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        for (field, rules) in &self.fields {
            let value = lookup_in(params, field);
            let required = rules.contains(&Rule::Required);
            let nullable = rules.contains(&Rule::Nullable);

            let value = match value {
                Some(value) if required && is_empty(value) => {
                    errors.add(field, format!("The {field} field is required."));
                    continue;
                }
                None if required => {
                    errors.add(field, format!("The {field} field is required."));
                    continue;
                }
                None => continue,
                Some(Value::Null) if nullable => continue,
                Some(value) => value,
            };

            let numeric_context = rules
                .iter()
                .any(|rule| matches!(rule, Rule::Integer | Rule::Numeric));

            for rule in rules {
                if let Some(message) = rule.check(field, value, numeric_context) {
                    errors.add(field, message);
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Per-field failure messages, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    fn add(&mut self, field: &str, message: String) {
        self.errors.entry(field.to_string()).or_default().push(message);
    }

    /// Returns true if nothing failed.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Names of the fields that failed.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    /// Messages for one field.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    /// All messages keyed by field.
    pub fn as_map(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for messages in self.errors.values() {
            for message in messages {
                if !first {
                    f.write_str(" ")?;
                }
                f.write_str(message)?;
                first = false;
            }
        }
        Ok(())
    }
}
