//! Workflow data model.
//!
//! A [`WorkflowDefinition`] is built once per discovered file during a scan
//! and never mutated afterwards; the next scan supersedes it.  Attaching a
//! run summary produces a new value via [`WorkflowDefinition::with_last_run`].

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Workflow definition
// ---------------------------------------------------------------------------

/// One normalized workflow definition file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Display name (`name:` key, falling back to the filename stem).
    pub name: String,

    /// File name including extension (e.g. `deploy.yml`).
    pub filename: String,

    /// Path of the file inside its repository.
    pub path: String,

    /// The raw file text exactly as read.
    pub raw: String,

    /// Whether the definition is structurally valid and usable.
    pub enabled: bool,

    /// `description:` key, or the failure reason for disabled definitions.
    pub description: String,

    /// When this definition was processed.
    pub last_modified: DateTime<Utc>,

    /// Machine-readable trigger flags.
    pub triggers: TriggerSet,

    /// Declared manual-dispatch inputs, keyed by input name.
    #[serde(default)]
    pub inputs: BTreeMap<String, InputSpec>,

    /// Human-written documentation block, if the file carries one.
    pub metadata: Option<MetadataBlock>,

    /// Most recent execution, when one has been attached.
    pub last_run: Option<RunSummary>,
}

impl WorkflowDefinition {
    /// Build a disabled placeholder for a file that could not be used.
    pub fn disabled(
        filename: impl Into<String>,
        path: impl Into<String>,
        raw: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let filename = filename.into();
        Self {
            name: filename_stem(&filename),
            filename,
            path: path.into(),
            raw: raw.into(),
            enabled: false,
            description: description.into(),
            last_modified: Utc::now(),
            triggers: TriggerSet::default(),
            inputs: BTreeMap::new(),
            metadata: None,
            last_run: None,
        }
    }

    /// Return a copy of this definition carrying the given run summary.
    pub fn with_last_run(&self, run: Option<RunSummary>) -> Self {
        Self {
            last_run: run,
            ..self.clone()
        }
    }

    /// Whether the definition can be dispatched manually.
    pub fn is_dispatchable(&self) -> bool {
        self.enabled && self.triggers.workflow_dispatch
    }
}

/// Strip the final extension from a file name (`deploy.yml` -> `deploy`).
pub fn filename_stem(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_owned())
}

// ---------------------------------------------------------------------------
// Triggers
// ---------------------------------------------------------------------------

/// Trigger names with a dedicated flag.
pub const PUSH: &str = "push";
pub const PULL_REQUEST: &str = "pull_request";
pub const WORKFLOW_DISPATCH: &str = "workflow_dispatch";
pub const SCHEDULE: &str = "schedule";

/// The set of events a workflow reacts to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSet {
    pub push: bool,
    pub pull_request: bool,
    pub workflow_dispatch: bool,
    pub schedule: bool,

    /// Unrecognized trigger names, preserved verbatim.
    #[serde(default)]
    pub other: BTreeSet<String>,
}

impl TriggerSet {
    /// Record one trigger name.  Known names set their flag; anything else
    /// lands in [`TriggerSet::other`] once.
    pub fn add(&mut self, name: &str) {
        match name {
            PUSH => self.push = true,
            PULL_REQUEST => self.pull_request = true,
            WORKFLOW_DISPATCH => self.workflow_dispatch = true,
            SCHEDULE => self.schedule = true,
            other => {
                self.other.insert(other.to_owned());
            }
        }
    }

    /// `true` if no trigger at all was recorded.
    pub fn is_empty(&self) -> bool {
        !self.push
            && !self.pull_request
            && !self.workflow_dispatch
            && !self.schedule
            && self.other.is_empty()
    }

    /// All trigger names: recognized ones first, then the others in order.
    pub fn names(&self) -> Vec<&str> {
        let flags = [
            (self.push, PUSH),
            (self.pull_request, PULL_REQUEST),
            (self.workflow_dispatch, WORKFLOW_DISPATCH),
            (self.schedule, SCHEDULE),
        ];
        flags
            .into_iter()
            .filter_map(|(set, name)| set.then_some(name))
            .chain(self.other.iter().map(String::as_str))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Dispatch inputs
// ---------------------------------------------------------------------------

/// Declared type of a manual-dispatch input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    #[default]
    String,
    Boolean,
    Choice,
    Environment,
}

impl InputType {
    /// Parse a declared type name.  Unknown names fall back to `String`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "boolean" => Self::Boolean,
            "choice" => Self::Choice,
            "environment" => Self::Environment,
            _ => Self::String,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Choice => "choice",
            Self::Environment => "environment",
        }
    }
}

impl std::fmt::Display for InputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared manual-dispatch parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    pub description: String,

    #[serde(rename = "type")]
    pub input_type: InputType,

    pub required: bool,

    /// Default value, kept exactly as declared.
    pub default: Option<serde_json::Value>,

    /// Allowed values; only meaningful for [`InputType::Choice`].
    #[serde(default)]
    pub options: Vec<String>,
}

// ---------------------------------------------------------------------------
// Metadata comment block
// ---------------------------------------------------------------------------

/// Free-form documentation extracted from a bracketed comment block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataBlock {
    pub purpose: Option<String>,

    /// Human prose describing when the workflow runs.
    pub trigger: Option<String>,

    pub scope: Option<String>,

    #[serde(default)]
    pub actions: Vec<String>,

    #[serde(default)]
    pub inputs: Vec<String>,
}

impl MetadataBlock {
    /// `true` when every field is empty.
    pub fn is_empty(&self) -> bool {
        let blank = |field: &Option<String>| field.as_deref().is_none_or(str::is_empty);
        blank(&self.purpose)
            && blank(&self.trigger)
            && blank(&self.scope)
            && self.actions.is_empty()
            && self.inputs.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Runs
// ---------------------------------------------------------------------------

/// Summary of one workflow execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub id: u64,
    pub status: String,
    pub conclusion: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub html_url: String,
    pub run_number: u64,
    pub head_sha: String,
    pub event: String,
}

/// Coarse classification of a run's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    Success,
    Failure,
    Cancelled,
    Skipped,
    Other,
}

impl RunSummary {
    /// Classify the raw status/conclusion pair.
    pub fn state(&self) -> RunStatus {
        match self.status.as_str() {
            "queued" | "waiting" | "requested" | "pending" => RunStatus::Queued,
            "in_progress" => RunStatus::InProgress,
            "completed" => match self.conclusion.as_deref() {
                Some("success") => RunStatus::Success,
                Some("failure") | Some("timed_out") | Some("startup_failure") => {
                    RunStatus::Failure
                }
                Some("cancelled") => RunStatus::Cancelled,
                Some("skipped") | Some("neutral") => RunStatus::Skipped,
                _ => RunStatus::Other,
            },
            _ => RunStatus::Other,
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::InProgress => write!(f, "in progress"),
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Skipped => write!(f, "skipped"),
            Self::Other => write!(f, "other"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(status: &str, conclusion: Option<&str>) -> RunSummary {
        RunSummary {
            id: 1,
            status: status.into(),
            conclusion: conclusion.map(Into::into),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            html_url: String::new(),
            run_number: 1,
            head_sha: String::new(),
            event: "push".into(),
        }
    }

    #[test]
    fn stem_strips_extension() {
        assert_eq!(filename_stem("deploy.yml"), "deploy");
        assert_eq!(filename_stem("ci.build.yaml"), "ci.build");
        assert_eq!(filename_stem("noext"), "noext");
    }

    #[test]
    fn trigger_set_deduplicates_other() {
        let mut set = TriggerSet::default();
        set.add("push");
        set.add("repository_dispatch");
        set.add("repository_dispatch");
        assert!(set.push);
        assert_eq!(set.other.len(), 1);
        assert_eq!(set.names(), vec!["push", "repository_dispatch"]);
    }

    #[test]
    fn empty_trigger_set() {
        assert!(TriggerSet::default().is_empty());
    }

    #[test]
    fn input_type_falls_back_to_string() {
        assert_eq!(InputType::from_name("choice"), InputType::Choice);
        assert_eq!(InputType::from_name("number"), InputType::String);
        assert_eq!(InputType::from_name(""), InputType::String);
    }

    #[test]
    fn metadata_with_blank_strings_is_empty() {
        let block = MetadataBlock {
            purpose: Some(String::new()),
            ..Default::default()
        };
        assert!(block.is_empty());
    }

    #[test]
    fn run_state_classification() {
        assert_eq!(run("completed", Some("success")).state(), RunStatus::Success);
        assert_eq!(run("completed", Some("timed_out")).state(), RunStatus::Failure);
        assert_eq!(run("in_progress", None).state(), RunStatus::InProgress);
        assert_eq!(run("queued", None).state(), RunStatus::Queued);
    }

    #[test]
    fn with_last_run_leaves_original_untouched() {
        let def = WorkflowDefinition::disabled("a.yml", "a.yml", "", "broken");
        let updated = def.with_last_run(Some(run("completed", Some("success"))));
        assert!(def.last_run.is_none());
        assert!(updated.last_run.is_some());
        assert_eq!(updated.name, "a");
    }
}
