// SPDX-License-Identifier: MIT OR Apache-2.0
//! Typed, validated configuration cells attached to blocks.
//!
//! Each kind is a closed variant; assignment revalidates against the
//! declared constraints before the value becomes visible to `process`.

use crate::data::Unit;
use crate::error::ParameterError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A value assignable to a parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterValue {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// Free-form string
    Str(String),
    /// Member of an enumerated choice set
    Choice(String),
    /// Filesystem path
    Path(PathBuf),
}

/// A named, typed parameter cell.
#[derive(Debug, Clone)]
pub enum Parameter {
    /// On/off flag
    Bool(BoolParameter),
    /// Integer with optional range
    Int(IntParameter),
    /// Float with optional range and unit
    Float(FloatParameter),
    /// Free-form string
    Str(StrParameter),
    /// Choice from an enumerated set
    Choice(ChoiceParameter),
    /// Filesystem path with allowed extensions
    Path(PathParameter),
    /// Value-less trigger, fired via `Graph::trigger_action`
    Action(ActionParameter),
}

/// Boolean parameter.
#[derive(Debug, Clone)]
pub struct BoolParameter {
    /// Display label
    pub label: String,
    /// Current value
    pub value: bool,
}

/// Integer parameter with optional inclusive bounds.
#[derive(Debug, Clone)]
pub struct IntParameter {
    /// Display label
    pub label: String,
    /// Current value
    pub value: i64,
    /// Inclusive minimum
    pub min: Option<i64>,
    /// Inclusive maximum
    pub max: Option<i64>,
}

/// Float parameter with optional inclusive bounds and a unit.
#[derive(Debug, Clone)]
pub struct FloatParameter {
    /// Display label
    pub label: String,
    /// Current value
    pub value: f64,
    /// Inclusive minimum
    pub min: Option<f64>,
    /// Inclusive maximum
    pub max: Option<f64>,
    /// Unit of the value
    pub unit: Unit,
}

/// String parameter.
#[derive(Debug, Clone)]
pub struct StrParameter {
    /// Display label
    pub label: String,
    /// Current value
    pub value: String,
}

/// Choice parameter over an enumerated set.
#[derive(Debug, Clone)]
pub struct ChoiceParameter {
    /// Display label
    pub label: String,
    /// Current value, always a member of `choices`
    pub value: String,
    /// Allowed values
    pub choices: Vec<String>,
}

/// Path parameter restricted to a set of file extensions.
#[derive(Debug, Clone)]
pub struct PathParameter {
    /// Display label
    pub label: String,
    /// Current value
    pub value: PathBuf,
    /// Allowed extensions without the dot (empty = any)
    pub extensions: Vec<String>,
}

/// Value-less trigger parameter.
#[derive(Debug, Clone)]
pub struct ActionParameter {
    /// Display label
    pub label: String,
}

impl Parameter {
    /// Boolean parameter.
    pub fn bool(label: impl Into<String>, value: bool) -> Self {
        Self::Bool(BoolParameter {
            label: label.into(),
            value,
        })
    }

    /// Integer parameter with optional inclusive bounds.
    pub fn int(label: impl Into<String>, value: i64, min: Option<i64>, max: Option<i64>) -> Self {
        Self::Int(IntParameter {
            label: label.into(),
            value,
            min,
            max,
        })
    }

    /// Float parameter with optional inclusive bounds and a unit.
    pub fn float(
        label: impl Into<String>,
        value: f64,
        min: Option<f64>,
        max: Option<f64>,
        unit: Unit,
    ) -> Self {
        Self::Float(FloatParameter {
            label: label.into(),
            value,
            min,
            max,
            unit,
        })
    }

    /// String parameter.
    pub fn str(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Str(StrParameter {
            label: label.into(),
            value: value.into(),
        })
    }

    /// Choice parameter; `value` must be a member of `choices`.
    pub fn choice(
        label: impl Into<String>,
        value: impl Into<String>,
        choices: Vec<String>,
    ) -> Self {
        Self::Choice(ChoiceParameter {
            label: label.into(),
            value: value.into(),
            choices,
        })
    }

    /// Path parameter restricted to `extensions` (without the dot).
    pub fn path(label: impl Into<String>, extensions: Vec<String>) -> Self {
        Self::Path(PathParameter {
            label: label.into(),
            value: PathBuf::new(),
            extensions,
        })
    }

    /// Value-less action trigger.
    pub fn action(label: impl Into<String>) -> Self {
        Self::Action(ActionParameter {
            label: label.into(),
        })
    }

    /// Display label.
    pub fn label(&self) -> &str {
        match self {
            Self::Bool(p) => &p.label,
            Self::Int(p) => &p.label,
            Self::Float(p) => &p.label,
            Self::Str(p) => &p.label,
            Self::Choice(p) => &p.label,
            Self::Path(p) => &p.label,
            Self::Action(p) => &p.label,
        }
    }

    /// Current value; `None` for action parameters.
    pub fn value(&self) -> Option<ParameterValue> {
        match self {
            Self::Bool(p) => Some(ParameterValue::Bool(p.value)),
            Self::Int(p) => Some(ParameterValue::Int(p.value)),
            Self::Float(p) => Some(ParameterValue::Float(p.value)),
            Self::Str(p) => Some(ParameterValue::Str(p.value.clone())),
            Self::Choice(p) => Some(ParameterValue::Choice(p.value.clone())),
            Self::Path(p) => Some(ParameterValue::Path(p.value.clone())),
            Self::Action(_) => None,
        }
    }

    /// Assign a value, validating it against the declared constraints.
    ///
    /// The stored value changes only if validation passes.
    pub fn set(&mut self, name: &str, value: ParameterValue) -> Result<(), ParameterError> {
        match (self, value) {
            (Self::Bool(p), ParameterValue::Bool(value)) => {
                p.value = value;
                Ok(())
            }
            (Self::Int(p), ParameterValue::Int(value)) => {
                if p.min.is_some_and(|min| value < min) || p.max.is_some_and(|max| value > max) {
                    return Err(ParameterError::OutOfRange {
                        name: name.to_string(),
                    });
                }
                p.value = value;
                Ok(())
            }
            (Self::Float(p), ParameterValue::Float(value)) => {
                if p.min.is_some_and(|min| value < min) || p.max.is_some_and(|max| value > max) {
                    return Err(ParameterError::OutOfRange {
                        name: name.to_string(),
                    });
                }
                p.value = value;
                Ok(())
            }
            (Self::Str(p), ParameterValue::Str(value)) => {
                p.value = value;
                Ok(())
            }
            (Self::Choice(p), ParameterValue::Choice(value)) => {
                if !p.choices.contains(&value) {
                    return Err(ParameterError::UnknownChoice {
                        name: name.to_string(),
                        value,
                    });
                }
                p.value = value;
                Ok(())
            }
            (Self::Path(p), ParameterValue::Path(value)) => {
                if !p.extensions.is_empty() {
                    let ok = value
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| p.extensions.iter().any(|allowed| allowed == ext));
                    if !ok {
                        return Err(ParameterError::BadExtension {
                            name: name.to_string(),
                            extensions: p.extensions.clone(),
                        });
                    }
                }
                p.value = value;
                Ok(())
            }
            (Self::Action(_), _) => Err(ParameterError::NotAssignable(name.to_string())),
            (parameter, _) => Err(ParameterError::WrongKind {
                name: name.to_string(),
                expected: parameter.kind_name(),
            }),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Choice(_) => "choice",
            Self::Path(_) => "path",
            Self::Action(_) => "action",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_range_is_enforced() {
        let mut parameter = Parameter::int("Samples", 100, Some(1), None);
        assert!(parameter.set("values", ParameterValue::Int(0)).is_err());
        // Rejected assignment leaves the old value in place
        assert_eq!(parameter.value(), Some(ParameterValue::Int(100)));
        parameter.set("values", ParameterValue::Int(64)).unwrap();
        assert_eq!(parameter.value(), Some(ParameterValue::Int(64)));
    }

    #[test]
    fn choice_must_be_member() {
        let mut parameter = Parameter::choice(
            "Shape",
            "sine",
            vec!["sine".to_string(), "square".to_string()],
        );
        let err = parameter
            .set("shape", ParameterValue::Choice("triangle".to_string()))
            .unwrap_err();
        assert!(matches!(err, ParameterError::UnknownChoice { .. }));
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let mut parameter = Parameter::bool("Invert", false);
        let err = parameter.set("invert", ParameterValue::Int(1)).unwrap_err();
        assert!(matches!(err, ParameterError::WrongKind { .. }));
    }

    #[test]
    fn path_extension_is_checked() {
        let mut parameter = Parameter::path("File", vec!["json".to_string()]);
        assert!(parameter
            .set("file", ParameterValue::Path(PathBuf::from("out.wav")))
            .is_err());
        parameter
            .set("file", ParameterValue::Path(PathBuf::from("out.json")))
            .unwrap();
    }

    #[test]
    fn action_cannot_be_assigned() {
        let mut parameter = Parameter::action("Save");
        let err = parameter.set("save", ParameterValue::Bool(true)).unwrap_err();
        assert!(matches!(err, ParameterError::NotAssignable(_)));
    }
}
