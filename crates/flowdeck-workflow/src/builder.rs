//! Workflow definition builder.
//!
//! Composes structural validation, trigger/input extraction and the
//! metadata comment scan into one [`WorkflowDefinition`] per file.
//! [`build_definition`] never fails: an invalid or uninterpretable file
//! becomes a disabled definition whose description says why.

use chrono::Utc;
use serde_yaml::Value;
use tracing::debug;

use crate::error::{Result, WorkflowError};
use crate::metadata::parse_metadata;
use crate::problem::{Problem, ProblemKind, settle};
use crate::triggers::{extract, trigger_node};
use crate::types::{WorkflowDefinition, filename_stem};

/// Parse the raw text and check it has both a trigger and a `jobs` key.
pub fn validate(raw: &str) -> Result<Value> {
    let doc: Value = serde_yaml::from_str(raw)?;
    if !doc.is_mapping() {
        return Err(WorkflowError::InvalidStructure {
            reason: "document is not a mapping".into(),
        });
    }
    if trigger_node(&doc).is_none() {
        return Err(WorkflowError::InvalidStructure {
            reason: "missing `on` trigger key".into(),
        });
    }
    if doc.get("jobs").is_none() {
        return Err(WorkflowError::InvalidStructure {
            reason: "missing `jobs` key".into(),
        });
    }
    Ok(doc)
}

/// Build a definition, reporting any failure as a [`Problem`].
pub fn try_build(
    filename: &str,
    path: &str,
    raw: &str,
) -> std::result::Result<WorkflowDefinition, Problem> {
    let doc = validate(raw)
        .map_err(|e| Problem::new(filename, ProblemKind::InvalidStructure, e))?;
    interpret(filename, path, raw, &doc).map_err(|e| Problem::new(filename, ProblemKind::Parse, e))
}

/// Build a definition, degrading any failure to a disabled placeholder.
pub fn build_definition(filename: &str, path: &str, raw: &str) -> WorkflowDefinition {
    let mut problems = Vec::new();
    settle(try_build(filename, path, raw), &mut problems, |problem| {
        placeholder(filename, path, raw, problem)
    })
}

/// The disabled definition standing in for a file that failed.
pub fn placeholder(filename: &str, path: &str, raw: &str, problem: &Problem) -> WorkflowDefinition {
    let description = match problem.kind {
        ProblemKind::InvalidStructure => format!("Invalid workflow file: {}", problem.reason),
        ProblemKind::Read | ProblemKind::Timeout => {
            format!("Could not read workflow file: {}", problem.reason)
        }
        ProblemKind::Parse | ProblemKind::Lookup => {
            format!("Error parsing workflow: {}", problem.reason)
        }
    };
    WorkflowDefinition::disabled(filename, path, raw, description)
}

fn interpret(filename: &str, path: &str, raw: &str, doc: &Value) -> Result<WorkflowDefinition> {
    let name = optional_text(doc, "name")?.unwrap_or_else(|| filename_stem(filename));
    let description = optional_text(doc, "description")?.unwrap_or_default();
    let extracted = extract(doc);
    let metadata = parse_metadata(raw);

    debug!(
        file = filename,
        name = %name,
        has_metadata = metadata.is_some(),
        "built workflow definition"
    );

    Ok(WorkflowDefinition {
        name,
        filename: filename.to_owned(),
        path: path.to_owned(),
        raw: raw.to_owned(),
        enabled: true,
        description,
        last_modified: Utc::now(),
        triggers: extracted.triggers,
        inputs: extracted.inputs,
        metadata,
        last_run: None,
    })
}

/// Read an optional scalar field as text.  Collections are rejected.
fn optional_text(doc: &Value, field: &'static str) -> Result<Option<String>> {
    match doc.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(WorkflowError::UnsupportedShape {
            field,
            expected: "a plain string",
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
