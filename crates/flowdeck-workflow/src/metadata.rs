//! Metadata comment block parser.
//!
//! Workflow files may carry a human-written documentation block made of
//! YAML comments, bracketed by two delimiter lines:
//!
//! ```text
//! # ==========================================================
//! # WORKFLOW: Deploy
//! # PURPOSE: Deploy the service
//! #   to production
//! # TRIGGER: Manual, after a release is tagged
//! # SCOPE: api, worker
//! # ACTIONS:
//! #   - Build the images
//! #   - Roll out to the cluster
//! # INPUTS:
//! #   - environment: target environment
//! # ==========================================================
//! ```
//!
//! Only the first bracketed block is honored.  The scan is a small state
//! machine fed one line at a time; malformed lines never fail, they simply
//! match nothing.

use crate::types::MetadataBlock;

/// Minimum number of `=` characters for a comment line to act as a
/// block delimiter.
const DELIMITER_MIN_LEN: usize = 10;

/// Section kinds recognized inside a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionKind {
    /// `WORKFLOW:`: a title, discarded.
    Title,
    Purpose,
    Trigger,
    Scope,
    Actions,
    Inputs,
}

/// Header labels, matched case-sensitively and followed by a colon.
const HEADERS: [(&str, SectionKind); 6] = [
    ("WORKFLOW", SectionKind::Title),
    ("PURPOSE", SectionKind::Purpose),
    ("TRIGGER", SectionKind::Trigger),
    ("SCOPE", SectionKind::Scope),
    ("ACTIONS", SectionKind::Actions),
    ("INPUTS", SectionKind::Inputs),
];

/// A section being accumulated.
#[derive(Debug)]
struct Section {
    kind: SectionKind,
    items: Vec<String>,
}

#[derive(Debug)]
enum ScanState {
    /// Before the opening delimiter.
    Outside,
    /// Between the delimiters, with the currently open section if any.
    Inside(Option<Section>),
    /// The closing delimiter was seen; later lines are never examined.
    Done,
}

/// Classification of a single source line.
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    /// Not a comment.
    Code,
    /// A comment with nothing after the markers.
    Blank,
    Delimiter,
    Header(SectionKind, &'a str),
    Item(&'a str),
    Text(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    let trimmed = line.trim();
    if !trimmed.starts_with('#') {
        return Line::Code;
    }

    let content = trimmed.trim_start_matches('#').trim();
    if content.is_empty() {
        return Line::Blank;
    }
    if content.len() >= DELIMITER_MIN_LEN && content.chars().all(|c| c == '=') {
        return Line::Delimiter;
    }

    for (label, kind) in HEADERS {
        if let Some(rest) = content
            .strip_prefix(label)
            .and_then(|rest| rest.strip_prefix(':'))
        {
            return Line::Header(kind, rest.trim());
        }
    }

    match content.strip_prefix('-') {
        Some(item) => Line::Item(item.trim()),
        None => Line::Text(content),
    }
}

/// Incremental metadata block scanner.
#[derive(Debug)]
pub struct MetadataParser {
    state: ScanState,
    block: MetadataBlock,
}

impl Default for MetadataParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataParser {
    pub fn new() -> Self {
        Self {
            state: ScanState::Outside,
            block: MetadataBlock::default(),
        }
    }

    /// Feed one line.  Returns `false` once the block has been closed and
    /// further input would be ignored.
    pub fn feed(&mut self, line: &str) -> bool {
        let state = std::mem::replace(&mut self.state, ScanState::Done);
        self.state = match (state, classify(line)) {
            (ScanState::Done, _) => ScanState::Done,
            (ScanState::Outside, Line::Delimiter) => ScanState::Inside(None),
            (ScanState::Outside, _) => ScanState::Outside,
            (ScanState::Inside(open), Line::Delimiter) => {
                self.flush(open);
                ScanState::Done
            }
            (ScanState::Inside(open), Line::Header(kind, rest)) => {
                self.flush(open);
                let mut items = Vec::new();
                if !rest.is_empty() {
                    items.push(rest.to_owned());
                }
                ScanState::Inside(Some(Section { kind, items }))
            }
            (ScanState::Inside(Some(mut section)), Line::Item(item) | Line::Text(item)) => {
                if !item.is_empty() {
                    section.items.push(item.to_owned());
                }
                ScanState::Inside(Some(section))
            }
            (inside @ ScanState::Inside(_), _) => inside,
        };
        !matches!(self.state, ScanState::Done)
    }

    /// Finish the scan, flushing a section left open by a missing closing
    /// delimiter.  An all-empty block yields `None`.
    pub fn finish(mut self) -> Option<MetadataBlock> {
        if let ScanState::Inside(open) = std::mem::replace(&mut self.state, ScanState::Done) {
            self.flush(open);
        }
        if self.block.is_empty() {
            None
        } else {
            Some(self.block)
        }
    }

    fn flush(&mut self, section: Option<Section>) {
        let Some(Section { kind, items }) = section else {
            return;
        };
        let joined = || Some(items.join(" ")).filter(|text| !text.is_empty());
        match kind {
            SectionKind::Title => {}
            SectionKind::Purpose => self.block.purpose = joined(),
            SectionKind::Trigger => self.block.trigger = joined(),
            SectionKind::Scope => self.block.scope = joined(),
            SectionKind::Actions => self.block.actions.extend(items),
            SectionKind::Inputs => self.block.inputs.extend(items),
        }
    }
}

/// Extract the metadata block from a file's raw text.
pub fn parse_metadata(raw: &str) -> Option<MetadataBlock> {
    let mut parser = MetadataParser::new();
    for line in raw.lines() {
        if !parser.feed(line) {
            break;
        }
    }
    parser.finish()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const RULE: &str = "# ==========================================";

    fn block(lines: &[&str]) -> String {
        let mut out = vec![RULE];
        out.extend_from_slice(lines);
        out.push(RULE);
        out.push("name: Deploy");
        out.join("\n")
    }

    #[test]
    fn no_delimiters_yields_none() {
        let raw = "# PURPOSE: not in a block\nname: x\non: push\n";
        assert_eq!(parse_metadata(raw), None);
    }

    #[test]
    fn all_blank_sections_yield_none() {
        let raw = block(&["# PURPOSE:", "# TRIGGER:", "# ACTIONS:", "#"]);
        assert_eq!(parse_metadata(&raw), None);
    }

    #[test]
    fn title_only_yields_none() {
        let raw = block(&["# WORKFLOW: Deploy"]);
        assert_eq!(parse_metadata(&raw), None);
    }

    #[test]
    fn continuation_lines_are_joined() {
        let raw = block(&["# PURPOSE: Deploy the service", "#   to production"]);
        let meta = parse_metadata(&raw).unwrap();
        assert_eq!(meta.purpose.as_deref(), Some("Deploy the service to production"));
    }

    #[test]
    fn actions_keep_file_order() {
        let raw = block(&["# ACTIONS:", "#   - Build images", "#   - Roll out"]);
        let meta = parse_metadata(&raw).unwrap();
        assert_eq!(meta.actions, vec!["Build images", "Roll out"]);
    }

    #[test]
    fn full_block() {
        let raw = block(&[
            "# WORKFLOW: Deploy",
            "# PURPOSE: Ship it",
            "# TRIGGER: On release tags",
            "# SCOPE: api, worker",
            "# ACTIONS:",
            "#   - Build",
            "#   - Deploy",
            "# INPUTS:",
            "#   - environment: target",
        ]);
        let meta = parse_metadata(&raw).unwrap();
        assert_eq!(meta.purpose.as_deref(), Some("Ship it"));
        assert_eq!(meta.trigger.as_deref(), Some("On release tags"));
        assert_eq!(meta.scope.as_deref(), Some("api, worker"));
        assert_eq!(meta.actions.len(), 2);
        assert_eq!(meta.inputs, vec!["environment: target"]);
    }

    #[test]
    fn header_text_is_first_item() {
        let raw = block(&["# ACTIONS: Prepare", "#   - Build"]);
        let meta = parse_metadata(&raw).unwrap();
        assert_eq!(meta.actions, vec!["Prepare", "Build"]);
    }

    #[test]
    fn only_first_block_is_honored() {
        let raw = format!(
            "{}\n# PURPOSE: Second block\n{RULE}\n",
            block(&["# SCOPE: first"])
        );
        let meta = parse_metadata(&raw).unwrap();
        assert_eq!(meta.scope.as_deref(), Some("first"));
        assert_eq!(meta.purpose, None);
    }

    #[test]
    fn unclosed_block_flushes_at_end_of_file() {
        let raw = format!("{RULE}\n# PURPOSE: Never closed\n# - still counted\n");
        let meta = parse_metadata(&raw).unwrap();
        assert_eq!(meta.purpose.as_deref(), Some("Never closed still counted"));
    }

    #[test]
    fn headers_are_case_sensitive() {
        let raw = block(&["# Purpose: lower case", "# SCOPE: real"]);
        let meta = parse_metadata(&raw).unwrap();
        assert_eq!(meta.purpose, None);
        assert_eq!(meta.scope.as_deref(), Some("real"));
    }

    #[test]
    fn non_comment_lines_inside_block_are_ignored() {
        let raw = block(&["# PURPOSE: Build", "env: prod", "#   everything"]);
        let meta = parse_metadata(&raw).unwrap();
        assert_eq!(meta.purpose.as_deref(), Some("Build everything"));
    }

    #[test]
    fn text_before_any_header_is_dropped() {
        let raw = block(&["# stray text", "# SCOPE: ok"]);
        let meta = parse_metadata(&raw).unwrap();
        assert_eq!(meta.scope.as_deref(), Some("ok"));
        assert!(meta.actions.is_empty());
    }

    #[test]
    fn short_rule_is_not_a_delimiter() {
        assert_eq!(classify("# ==="), Line::Text("==="));
        assert_eq!(classify("## =========="), Line::Delimiter);
    }

    #[test]
    fn classify_lines() {
        assert_eq!(classify("on: push"), Line::Code);
        assert_eq!(classify("   #   "), Line::Blank);
        assert_eq!(classify("# - item "), Line::Item("item"));
        assert_eq!(
            classify("# INPUTS: none"),
            Line::Header(SectionKind::Inputs, "none")
        );
        assert_eq!(classify("# PURPOSES: nope"), Line::Text("PURPOSES: nope"));
    }

    #[test]
    fn feed_reports_completion() {
        let mut parser = MetadataParser::new();
        assert!(parser.feed(RULE));
        assert!(parser.feed("# SCOPE: x"));
        assert!(!parser.feed(RULE));
        assert!(!parser.feed("# PURPOSE: ignored"));
        assert_eq!(parser.finish().unwrap().purpose, None);
    }
}
