//! Interactive file-name questions.
//!
//! Two points of an export may need the user to pick a name: the output file
//! of a single export, and the file an `![[note]]` embed should import. The
//! pipeline awaits a [`NamePrompt`] for both, so a terminal, a GUI or a test
//! stub can answer without the stages knowing which.

use crate::error::ExportError;
use async_trait::async_trait;

/// Asks the user for a file name, offering `default`.
#[async_trait]
pub trait NamePrompt: Send + Sync {
    /// Output file name (without `.md`) for a single export.
    async fn export_file_name(&self, default: &str) -> Result<String, ExportError>;

    /// File referenced by an `mdimporter` embed, e.g. `index.zh-cn.md`.
    async fn display_file_name(&self, default: &str) -> Result<String, ExportError>;
}

/// Answers every question with the offered default.
#[derive(Debug, Clone, Copy, Default)]
pub struct UseDefaultsPrompt;

#[async_trait]
impl NamePrompt for UseDefaultsPrompt {
    async fn export_file_name(&self, default: &str) -> Result<String, ExportError> {
        Ok(default.to_string())
    }

    async fn display_file_name(&self, default: &str) -> Result<String, ExportError> {
        Ok(default.to_string())
    }
}

/// Default answer to the embed question when none is configured.
pub const DEFAULT_DISPLAY_FILE: &str = "index.zh-cn.md";
