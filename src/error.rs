//! Error types for the vault2hugo library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ExportError`]: **Fatal** for the operation at hand: the note cannot
//!   be exported (no `slug`, unreadable file, bad settings, translation
//!   provider missing). Returned as `Err(ExportError)` from
//!   [`crate::Exporter::export_note`], [`crate::translate::translate_note`]
//!   and friends. In a batch run it is fatal for one document only.
//!
//! * [`SkipReason`]: **Non-fatal**: a single wiki-link or image embed could
//!   not be rewritten. The occurrence is left untouched and the reason is
//!   recorded in a [`crate::output::LinkRewrite::Skipped`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the vault2hugo library.
#[derive(Debug, Error)]
pub enum ExportError {
    // ── Precondition errors ───────────────────────────────────────────────
    /// The note has no `slug` in its frontmatter.
    #[error("Note '{note}' has no slug.\nAdd a `slug:` field to its frontmatter.")]
    MissingSlug { note: String },

    /// The named note does not exist in the vault.
    #[error("Note not found in vault: '{link}'")]
    NoteNotFound { link: String },

    /// A setting required by this command is empty.
    #[error("Setting '{setting}' is not configured.\n{hint}")]
    MissingSetting { setting: &'static str, hint: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Reading a note or attachment failed.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Creating an output directory failed.
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing an output file failed.
    #[error("Failed to write '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The vault root could not be walked.
    #[error("Failed to scan vault '{path}': {detail}")]
    VaultScanFailed { path: PathBuf, detail: String },

    // ── Settings errors ───────────────────────────────────────────────────
    /// The settings file exists but is not valid JSON for [`crate::ExportSettings`].
    #[error("Invalid settings file '{path}': {detail}")]
    SettingsParse { path: PathBuf, detail: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Interaction errors ────────────────────────────────────────────────
    /// The interactive name prompt could not produce an answer.
    #[error("Prompt failed: {0}")]
    PromptFailed(String),

    // ── Translation errors ────────────────────────────────────────────────
    /// The translation provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The translation endpoint returned an error.
    #[error("Translation failed: {message}")]
    TranslationFailed { message: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a single wiki-link or image embed was left unrewritten.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum SkipReason {
    /// `[[]]` or `[[|text]]`: nothing to link to.
    #[error("link has neither a target nor a fragment")]
    EmptyTarget,

    /// The link path does not resolve to any file in the vault.
    #[error("file not found: {target}")]
    Unresolved { target: String },

    /// A `![[image]]` embed, handled by the image stage instead.
    #[error("image embed left for the image stage")]
    ImageEmbed,

    /// The target note exists but has no `slug`.
    #[error("{note} has no slug; add a `slug:` field to its frontmatter")]
    MissingSlug { note: String },

    /// The embed resolves to a non-image attachment.
    #[error("not an image: {path}")]
    NotAnImage { path: String },

    /// Copying the image into the export tree failed.
    #[error("failed to copy image {path}: {detail}")]
    CopyFailed { path: String, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_slug_display_names_note() {
        let e = ExportError::MissingSlug {
            note: "Daily Log".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("Daily Log"), "got: {msg}");
        assert!(msg.contains("slug:"));
    }

    #[test]
    fn test_missing_setting_display() {
        let e = ExportError::MissingSetting {
            setting: "translatedExportPath",
            hint: "Set it in the settings file.".into(),
        };
        assert!(e.to_string().contains("translatedExportPath"));
    }

    #[test]
    fn test_write_failed_keeps_source() {
        use std::error::Error as _;
        let e = ExportError::WriteFailed {
            path: PathBuf::from("/out/posts/a/index.md"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("index.md"));
    }

    #[test]
    fn test_skip_reason_display() {
        let r = SkipReason::Unresolved {
            target: "Missing Note".into(),
        };
        assert_eq!(r.to_string(), "file not found: Missing Note");
    }
}
