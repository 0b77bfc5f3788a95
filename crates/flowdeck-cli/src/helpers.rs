//! Shared helper functions used across CLI subcommands.
//!
//! Includes tracing initialization, workflow lookup, and the plain-text
//! renderings printed when `--json` is not given.

use std::fmt::Write as _;

use flowdeck_workflow::{Problem, WorkflowDefinition};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Initialize the tracing subscriber with the given default log level.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Find a workflow by file name, file stem, or display name (in that order).
pub fn find_workflow<'a>(
    definitions: &'a [WorkflowDefinition],
    query: &str,
) -> Option<&'a WorkflowDefinition> {
    definitions
        .iter()
        .find(|d| d.filename == query)
        .or_else(|| {
            definitions
                .iter()
                .find(|d| flowdeck_workflow::filename_stem(&d.filename) == query)
        })
        .or_else(|| definitions.iter().find(|d| d.name.eq_ignore_ascii_case(query)))
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn triggers_label(def: &WorkflowDefinition) -> String {
    let names = def.triggers.names();
    if names.is_empty() {
        "-".to_owned()
    } else {
        names.join(", ")
    }
}

/// One line per definition: state, file, name, triggers.
pub fn render_list(definitions: &[WorkflowDefinition]) -> String {
    let mut out = String::new();
    for def in definitions {
        let state = if def.enabled { "ok " } else { "ERR" };
        let _ = writeln!(
            out,
            "  [{state}] {:<28} {:<28} {}",
            def.filename,
            def.name,
            triggers_label(def)
        );
        if !def.enabled {
            let _ = writeln!(out, "        {}", def.description);
        } else if let Some(purpose) = def.metadata.as_ref().and_then(|m| m.purpose.as_deref()) {
            let _ = writeln!(out, "        {purpose}");
        }
    }
    if definitions.is_empty() {
        out.push_str("  (no workflow definitions found)\n");
    }
    out
}

/// One line per definition with its latest run, if any.
pub fn render_runs(definitions: &[WorkflowDefinition]) -> String {
    let mut out = String::new();
    for def in definitions {
        match &def.last_run {
            Some(run) => {
                let _ = writeln!(
                    out,
                    "  {:<28} #{:<6} {:<12} {} {}",
                    def.filename,
                    run.run_number,
                    run.state().to_string(),
                    run.updated_at.format("%Y-%m-%d %H:%M"),
                    run.html_url
                );
            }
            None => {
                let _ = writeln!(out, "  {:<28} (no runs)", def.filename);
            }
        }
    }
    out
}

/// Full details of one definition.
pub fn render_definition(def: &WorkflowDefinition) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  {} ({})", def.name, def.path);
    let _ = writeln!(out, "  enabled:  {}", def.enabled);
    if !def.description.is_empty() {
        let _ = writeln!(out, "  about:    {}", def.description);
    }
    let _ = writeln!(out, "  triggers: {}", triggers_label(def));

    if !def.inputs.is_empty() {
        out.push_str("  inputs:\n");
        for (name, input) in &def.inputs {
            let required = if input.required { " (required)" } else { "" };
            let _ = writeln!(out, "    {name}: {}{required}", input.input_type);
            if !input.description.is_empty() {
                let _ = writeln!(out, "      {}", input.description);
            }
            if !input.options.is_empty() {
                let _ = writeln!(out, "      options: {}", input.options.join(" | "));
            }
            if let Some(default) = &input.default {
                let _ = writeln!(out, "      default: {default}");
            }
        }
    }

    if let Some(meta) = &def.metadata {
        out.push_str("  metadata:\n");
        for (label, value) in [
            ("purpose", &meta.purpose),
            ("trigger", &meta.trigger),
            ("scope", &meta.scope),
        ] {
            if let Some(value) = value {
                let _ = writeln!(out, "    {label}: {value}");
            }
        }
        for (i, action) in meta.actions.iter().enumerate() {
            let _ = writeln!(out, "    {}. {action}", i + 1);
        }
        for input in &meta.inputs {
            let _ = writeln!(out, "    - {input}");
        }
    }

    if let Some(run) = &def.last_run {
        let _ = writeln!(out, "  last run: #{} {} {}", run.run_number, run.state(), run.html_url);
    }
    out
}

/// Numbered list of scan problems.
pub fn render_problems(problems: &[Problem]) -> String {
    let mut out = String::new();
    for (i, problem) in problems.iter().enumerate() {
        let _ = writeln!(out, "  {}. {problem}", i + 1);
    }
    out
}
