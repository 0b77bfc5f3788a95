//! Trigger and dispatch-input extraction.
//!
//! The `on:` node of a workflow may be a single event name, a list of
//! names, or a mapping keyed by event name.  It is resolved once into a
//! [`TriggerSource`] and every shape then feeds the same
//! [`TriggerSet::add`] routine.  Manual-dispatch inputs are read from
//! `on.workflow_dispatch.inputs` when that trigger is present.

use std::collections::BTreeMap;

use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};

use crate::error::{Result, WorkflowError};
use crate::types::{InputSpec, InputType, TriggerSet, WORKFLOW_DISPATCH};

/// The `on:` node, resolved to one of its accepted shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerSource {
    /// `on: push`
    Single(String),
    /// `on: [push, pull_request]`
    List(Vec<String>),
    /// `on: { push: ..., workflow_dispatch: ... }`
    Map(Mapping),
}

impl TriggerSource {
    /// Resolve a YAML node into a trigger source.  A null node is an empty
    /// list; any other non-conforming shape is an error.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::List(Vec::new())),
            Value::Mapping(map) => Ok(Self::Map(map.clone())),
            Value::Sequence(items) => items
                .iter()
                .map(|item| {
                    scalar_to_string(item).ok_or(WorkflowError::UnsupportedShape {
                        field: "on",
                        expected: "a list of event names",
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(Self::List),
            other => scalar_to_string(other)
                .map(Self::Single)
                .ok_or(WorkflowError::UnsupportedShape {
                    field: "on",
                    expected: "an event name, a list of names, or a mapping",
                }),
        }
    }

    /// The trigger names in source order.
    pub fn names(&self) -> Vec<String> {
        match self {
            Self::Single(name) => vec![name.clone()],
            Self::List(names) => names.clone(),
            Self::Map(map) => map.keys().filter_map(scalar_to_string).collect(),
        }
    }

    /// Normalize into flags.
    pub fn trigger_set(&self) -> TriggerSet {
        let mut set = TriggerSet::default();
        for name in self.names() {
            set.add(&name);
        }
        set
    }

    /// Declared `workflow_dispatch` inputs.  A missing or wrong-shaped path
    /// yields an empty mapping.
    pub fn dispatch_inputs(&self) -> BTreeMap<String, InputSpec> {
        let Self::Map(map) = self else {
            return BTreeMap::new();
        };
        let Some(inputs) = map
            .get(WORKFLOW_DISPATCH)
            .and_then(|dispatch| dispatch.get("inputs"))
            .and_then(Value::as_mapping)
        else {
            return BTreeMap::new();
        };

        inputs
            .iter()
            .filter_map(|(name, spec)| Some((scalar_to_string(name)?, input_spec(spec))))
            .collect()
    }
}

/// Triggers and inputs extracted from one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extracted {
    pub triggers: TriggerSet,
    pub inputs: BTreeMap<String, InputSpec>,
}

/// Locate the `on:` node.  YAML 1.1 loaders read the bare key as boolean
/// `true`, so that key is accepted too.
pub fn trigger_node(doc: &Value) -> Option<&Value> {
    let map = doc.as_mapping()?;
    map.get("on").or_else(|| map.get(Value::Bool(true)))
}

/// Extract triggers and, when manual dispatch is enabled, its inputs.
///
/// Never fails: a node that cannot be interpreted is logged and treated as
/// declaring no triggers.
pub fn extract(doc: &Value) -> Extracted {
    let source = match trigger_node(doc).map(TriggerSource::from_value) {
        Some(Ok(source)) => source,
        Some(Err(e)) => {
            warn!(error = %e, "could not interpret trigger source, assuming none");
            return Extracted::default();
        }
        None => return Extracted::default(),
    };

    let triggers = source.trigger_set();
    let inputs = if triggers.workflow_dispatch {
        source.dispatch_inputs()
    } else {
        BTreeMap::new()
    };
    debug!(
        triggers = ?triggers.names(),
        inputs = inputs.len(),
        "extracted triggers"
    );

    Extracted { triggers, inputs }
}

// ---------------------------------------------------------------------------
// Input specs
// ---------------------------------------------------------------------------

fn input_spec(value: &Value) -> InputSpec {
    if !value.is_mapping() {
        return InputSpec::default();
    }

    InputSpec {
        description: value
            .get("description")
            .and_then(scalar_to_string)
            .unwrap_or_default(),
        input_type: value
            .get("type")
            .and_then(Value::as_str)
            .map(InputType::from_name)
            .unwrap_or_default(),
        required: is_truthy(value.get("required")),
        default: value.get("default").map(to_json),
        options: value
            .get("options")
            .and_then(Value::as_sequence)
            .map(|items| items.iter().map(stringify).collect())
            .unwrap_or_default(),
    }
}

/// Truthiness of a `required:` value.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "on" | "1"
        ),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn stringify(value: &Value) -> String {
    scalar_to_string(value).unwrap_or_else(|| {
        serde_yaml::to_string(value)
            .map(|s| s.trim_end().to_owned())
            .unwrap_or_default()
    })
}

/// Keep a default value as declared.  Nodes JSON cannot represent (e.g.
/// non-string mapping keys) are kept as their YAML text.
fn to_json(value: &Value) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or_else(|_| serde_json::Value::String(stringify(value)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn single_name() {
        let out = extract(&doc("on: push\njobs: {}"));
        assert!(out.triggers.push);
        assert!(!out.triggers.workflow_dispatch);
        assert!(out.inputs.is_empty());
    }

    #[test]
    fn list_of_names() {
        let out = extract(&doc(
            "on: [push, workflow_dispatch, custom_event, custom_event]\njobs: {}",
        ));
        assert!(out.triggers.push);
        assert!(out.triggers.workflow_dispatch);
        assert!(!out.triggers.schedule);
        assert!(!out.triggers.pull_request);
        assert_eq!(out.triggers.other.len(), 1);
        assert!(out.triggers.other.contains("custom_event"));
    }

    #[test]
    fn mapping_keys() {
        let out = extract(&doc(
            "on:\n  pull_request:\n    branches: [main]\n  schedule:\n    - cron: '0 0 * * *'\n",
        ));
        assert!(out.triggers.pull_request);
        assert!(out.triggers.schedule);
        assert!(!out.triggers.push);
    }

    #[test]
    fn boolean_on_key_is_accepted() {
        let out = extract(&doc("true: push\njobs: {}"));
        assert!(out.triggers.push);
    }

    #[test]
    fn missing_on_yields_defaults() {
        assert_eq!(extract(&doc("jobs: {}")), Extracted::default());
    }

    #[test]
    fn nested_list_is_rejected_and_degrades() {
        let value = doc("- [push]");
        assert!(TriggerSource::from_value(&value).is_err());
        let out = extract(&doc("on:\n  - [push]\njobs: {}"));
        assert!(out.triggers.is_empty());
    }

    #[test]
    fn choice_input() {
        let yaml = r#"
on:
  workflow_dispatch:
    inputs:
      environment:
        description: Target environment
        type: choice
        required: true
        options: ["dev", "prod"]
      dry_run:
        type: boolean
        default: false
      note:
        type: number
"#;
        let out = extract(&doc(yaml));
        let env = &out.inputs["environment"];
        assert_eq!(env.input_type, InputType::Choice);
        assert!(env.required);
        assert_eq!(env.options, vec!["dev", "prod"]);
        assert_eq!(env.description, "Target environment");

        let dry_run = &out.inputs["dry_run"];
        assert_eq!(dry_run.input_type, InputType::Boolean);
        assert!(!dry_run.required);
        assert_eq!(dry_run.default, Some(serde_json::Value::Bool(false)));

        assert_eq!(out.inputs["note"].input_type, InputType::String);
    }

    #[test]
    fn inputs_ignored_without_dispatch() {
        let yaml = "on:\n  push:\n    inputs:\n      x:\n        type: string\n";
        assert!(extract(&doc(yaml)).inputs.is_empty());
    }

    #[test]
    fn wrong_shaped_inputs_yield_empty_mapping() {
        let yaml = "on:\n  workflow_dispatch:\n    inputs: [a, b]\n";
        let out = extract(&doc(yaml));
        assert!(out.triggers.workflow_dispatch);
        assert!(out.inputs.is_empty());

        let out = extract(&doc("on:\n  workflow_dispatch:\n"));
        assert!(out.inputs.is_empty());
    }

    #[test]
    fn input_with_scalar_body_gets_defaults() {
        let yaml = "on:\n  workflow_dispatch:\n    inputs:\n      tag: ~\n";
        let out = extract(&doc(yaml));
        assert_eq!(out.inputs["tag"], InputSpec::default());
    }

    #[test]
    fn truthiness() {
        assert!(is_truthy(Some(&Value::Bool(true))));
        assert!(is_truthy(Some(&Value::String("Yes".into()))));
        assert!(is_truthy(Some(&doc("1"))));
        assert!(!is_truthy(Some(&doc("0"))));
        assert!(!is_truthy(Some(&Value::String("false".into()))));
        assert!(!is_truthy(Some(&Value::Null)));
        assert!(!is_truthy(None));
    }

    #[test]
    fn options_are_stringified() {
        let yaml = "on:\n  workflow_dispatch:\n    inputs:\n      n:\n        type: choice\n        options: [1, true, x]\n";
        let out = extract(&doc(yaml));
        assert_eq!(out.inputs["n"].options, vec!["1", "true", "x"]);
    }
}
