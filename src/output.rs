//! Result types produced by the stages and export drivers.

use crate::error::SkipReason;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::PathBuf;

/// Which driver is running a stage.
///
/// The stages behave the same in both modes except for how resolution
/// failures are surfaced: a notice to the user in `Single`, a log line in
/// `Batch` (hundreds of notes would otherwise bury the user in warnings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    Single,
    Batch,
}

/// Outcome of rewriting one wiki-link or image embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkRewrite {
    /// `original` is replaced by `replacement`.
    Rewritten {
        span: Range<usize>,
        original: String,
        replacement: String,
    },
    /// `original` stays in the document as-is.
    Skipped {
        span: Range<usize>,
        original: String,
        reason: SkipReason,
    },
}

impl LinkRewrite {
    pub fn span(&self) -> &Range<usize> {
        match self {
            LinkRewrite::Rewritten { span, .. } | LinkRewrite::Skipped { span, .. } => span,
        }
    }

    pub fn is_rewritten(&self) -> bool {
        matches!(self, LinkRewrite::Rewritten { .. })
    }
}

/// Splice every `Rewritten` entry into `content` at its recorded span.
///
/// Spans come from a single regex pass over `content`, so they never overlap.
pub(crate) fn apply_rewrites(content: &str, rewrites: &[LinkRewrite]) -> String {
    let mut ordered: Vec<&LinkRewrite> = rewrites.iter().filter(|r| r.is_rewritten()).collect();
    ordered.sort_by_key(|r| r.span().start);

    let mut out = String::with_capacity(content.len() + 64 * ordered.len());
    let mut last = 0;
    for rewrite in ordered {
        if let LinkRewrite::Rewritten {
            span, replacement, ..
        } = rewrite
        {
            out.push_str(&content[last..span.start]);
            out.push_str(replacement);
            last = span.end;
        }
    }
    out.push_str(&content[last..]);
    out
}

/// Result of exporting one note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteExport {
    /// Vault-relative path of the exported note.
    pub note: PathBuf,
    /// Frontmatter slug.
    pub slug: String,
    /// Absolute path of the written Markdown file.
    pub output_path: PathBuf,
}

/// Per-document result of a batch export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExportOutcome {
    Success { output_path: PathBuf },
    Failed { error: String },
    MissingSlug,
}

/// Aggregate of a batch export run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub success: usize,
    pub failed: usize,
    pub missing_slug: usize,
    /// Every processed note with its outcome, in vault order.
    pub documents: Vec<(PathBuf, ExportOutcome)>,
}

impl BatchSummary {
    pub fn record(&mut self, note: PathBuf, outcome: ExportOutcome) {
        match outcome {
            ExportOutcome::Success { .. } => self.success += 1,
            ExportOutcome::Failed { .. } => self.failed += 1,
            ExportOutcome::MissingSlug => self.missing_slug += 1,
        }
        self.documents.push((note, outcome));
    }

    pub fn total(&self) -> usize {
        self.documents.len()
    }
}
