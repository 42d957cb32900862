//! Text-rewriting stages for Obsidian-to-Hugo export.
//!
//! Each submodule implements exactly one transformation step. Every stage
//! consumes the whole document and returns a new one, so each is testable on
//! its own and the matching strategy of one stage can change without touching
//! the others.
//!
//! ## Data Flow
//!
//! ```text
//! raw ──▶ math ──▶ callout ──▶ wikilink ──▶ image ──▶ mermaid ──▶ final
//!         (katex)  (alert)     (ref/relref) (copy)    (diagram)
//! ```
//!
//! 1. [`math`]    : inline `$…$` to the `katex` shortcode; block math untouched
//! 2. [`callout`] : `> [!type]` blocks to `alert`, skipping fenced code
//! 3. [`wikilink`]: `[[note]]` / `![[note]]` to `ref`, `relref` and
//!    `mdimporter`; link resolutions run concurrently
//! 4. [`image`]   : `![[pic.png]]` copied next to the post and relinked;
//!    embeds are handled one at a time in document order
//! 5. [`mermaid`] : ```` ```mermaid ```` fences to the `mermaid` shortcode
//!
//! ## Order matters
//!
//! The callout stage runs before mermaid fences are rewritten, so it must
//! treat them as opaque code. The image stage needs the document's slug to
//! know where to copy files, so the runner skips it when there is none.
//! [`crate::Exporter::modify_content`] is the only place that chains them.

pub mod callout;
pub mod image;
pub mod math;
pub mod mermaid;
pub mod wikilink;

use crate::config::ExportSettings;
use crate::error::SkipReason;
use crate::naming::NamePrompt;
use crate::output::ExportMode;
use crate::progress::{ExportProgressCallback, NoticeLevel};
use crate::vault::Vault;
use tracing::warn;

/// Everything the I/O-bound stages need besides the document itself.
///
/// Borrowed from the [`crate::Exporter`] for the duration of one run.
#[derive(Clone, Copy)]
pub struct StageContext<'a> {
    pub settings: &'a ExportSettings,
    pub vault: &'a dyn Vault,
    pub prompt: &'a dyn NamePrompt,
    pub progress: &'a dyn ExportProgressCallback,
    pub mode: ExportMode,
}

impl StageContext<'_> {
    /// Surface a skipped occurrence: a notice in single mode, a log line in batch.
    pub(crate) fn report_skip(&self, level: NoticeLevel, reason: &SkipReason) {
        match self.mode {
            ExportMode::Single => self.progress.on_notice(level, reason.to_string()),
            ExportMode::Batch => warn!("{}", reason),
        }
    }
}
