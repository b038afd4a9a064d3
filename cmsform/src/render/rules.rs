use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::data::field::{FieldKind, FieldSchema};

/// Regex source compiled once when the rule is built.
///
/// An invalid source is logged and then matches everything. Compares and
/// serializes as the source string.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    compiled: Option<Regex>,
}

impl Pattern {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let compiled = match Regex::new(&source) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!("ignoring invalid pattern `{source}`: {e}");
                None
            }
        };
        Pattern { source, compiled }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_valid(&self) -> bool {
        self.compiled.is_some()
    }

    pub fn is_match(&self, s: &str) -> bool {
        self.compiled.as_ref().is_none_or(|re| re.is_match(s))
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.source)
    }
}

/// Validation rule attached to a rendered control or list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Rule {
    /// Value must be present and non-empty.
    Required { message: String },
    /// String values must match `pattern`.
    Pattern { pattern: Pattern, message: String },
    /// Non-empty values must be one of `allowed`.
    OneOf { allowed: Vec<String>, message: String },
    /// Row count bounds of a list.
    Rows {
        min: Option<usize>,
        max: Option<usize>,
        message: String,
    },
}

/// Missing, `null`, `""` and `[]` count as empty. `false` and `0` do not.
pub fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(_) => false,
    }
}

impl Rule {
    pub fn required(label: &str) -> Self {
        Rule::Required {
            message: format!("{label} is required"),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Rule::Required { message }
            | Rule::Pattern { message, .. }
            | Rule::OneOf { message, .. }
            | Rule::Rows { message, .. } => message,
        }
    }

    /// Check `value`; `true` when the rule holds.
    ///
    /// Only `Required` and `Rows` with a minimum reject empty values. An
    /// invalid pattern never fails.
    pub fn check(&self, value: Option<&Value>) -> bool {
        match self {
            Rule::Required { .. } => !is_empty(value),
            Rule::Pattern { pattern, .. } => {
                let Some(Value::String(s)) = value else {
                    return true;
                };
                s.is_empty() || pattern.is_match(s)
            }
            Rule::OneOf { allowed, .. } => match value {
                Some(Value::String(s)) => s.is_empty() || allowed.contains(s),
                v => is_empty(v),
            },
            Rule::Rows { min, max, .. } => {
                let rows = match value {
                    Some(Value::Array(a)) => a.len(),
                    _ => 0,
                };
                if rows == 0 && min.is_none() {
                    return true;
                }
                min.is_none_or(|m| rows >= m) && max.is_none_or(|m| rows <= m)
            }
        }
    }
}

/// Rules for `field`, derived from `required` and type options.
pub fn rules_for(field: &FieldSchema) -> Vec<Rule> {
    let mut rules = Vec::new();
    if field.required {
        rules.push(Rule::required(&field.label));
    }
    match &field.kind {
        FieldKind::Text { options } => {
            if let Some(pattern) = &options.regex {
                rules.push(Rule::Pattern {
                    pattern: Pattern::new(pattern.as_str()),
                    message: format!("{} does not match {pattern}", field.label),
                });
            }
        }
        FieldKind::Repeater { options, .. } => {
            let message = match (options.min, options.max) {
                (Some(min), Some(max)) => format!("{} needs {min} to {max} rows", field.label),
                (Some(min), None) => format!("{} needs at least {min} rows", field.label),
                (None, Some(max)) => format!("{} allows at most {max} rows", field.label),
                (None, None) => return rules,
            };
            rules.push(Rule::Rows {
                min: options.min,
                max: options.max,
                message,
            });
        }
        _ => {}
    }
    rules
}
