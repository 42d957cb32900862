//! Export drivers: one note ([`Exporter::export_note`]) or the whole vault
//! ([`Exporter::export_all`]), both built on the pipeline runner
//! [`Exporter::modify_content`].
//!
//! ## Failure isolation
//!
//! * Inside the runner, a failing stage discards every transformation of
//!   that document and the original text is returned. A half-rewritten note
//!   is never written.
//! * A single export reports its error as a notice and returns it.
//! * A batch export classifies every note as success, failed or
//!   missing-slug and keeps going.

use crate::config::ExportSettings;
use crate::cover::CoverChooser;
use crate::error::ExportError;
use crate::naming::{NamePrompt, UseDefaultsPrompt};
use crate::output::{BatchSummary, ExportMode, ExportOutcome, NoteExport};
use crate::pipeline::{callout, image, math, mermaid, wikilink, StageContext};
use crate::progress::{NoopProgressCallback, NoticeLevel, ProgressCallback};
use crate::vault::{Vault, VaultFile};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Runs the export pipeline against a vault.
///
/// Cheap to share: every collaborator is behind an `Arc`.
pub struct Exporter {
    settings: Arc<ExportSettings>,
    vault: Arc<dyn Vault>,
    prompt: Arc<dyn NamePrompt>,
    progress: ProgressCallback,
    covers: Arc<CoverChooser>,
}

impl Exporter {
    /// An exporter that answers name questions with their defaults and
    /// reports nothing.
    pub fn new(settings: Arc<ExportSettings>, vault: Arc<dyn Vault>) -> Self {
        Self {
            settings,
            vault,
            prompt: Arc::new(UseDefaultsPrompt),
            progress: Arc::new(NoopProgressCallback),
            covers: Arc::new(CoverChooser::new()),
        }
    }

    pub fn with_prompt(mut self, prompt: Arc<dyn NamePrompt>) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_cover_chooser(mut self, covers: CoverChooser) -> Self {
        self.covers = Arc::new(covers);
        self
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    pub fn vault(&self) -> &dyn Vault {
        self.vault.as_ref()
    }

    pub(crate) fn covers(&self) -> &CoverChooser {
        &self.covers
    }

    fn context(&self, mode: ExportMode) -> StageContext<'_> {
        StageContext {
            settings: &self.settings,
            vault: self.vault.as_ref(),
            prompt: self.prompt.as_ref(),
            progress: self.progress.as_ref(),
            mode,
        }
    }

    pub(crate) fn notice(&self, level: NoticeLevel, message: impl Into<String>) {
        self.progress.on_notice(level, message.into());
    }

    // ── Pipeline runner ───────────────────────────────────────────────────

    /// Run Math → Callout → WikiLink → Image → Mermaid over `content`.
    ///
    /// `slug` is the slug of the note being processed; without one the image
    /// stage is skipped. If any stage fails the original `content` is returned
    /// unchanged.
    pub async fn modify_content(
        &self,
        content: &str,
        mode: ExportMode,
        slug: Option<&str>,
    ) -> String {
        match self.run_stages(content, mode, slug).await {
            Ok(out) => out,
            Err(e) => {
                error!("Error modifying content: {}", e);
                if mode == ExportMode::Single {
                    self.notice(
                        NoticeLevel::Error,
                        format!("Conversion failed, exported unchanged: {e}"),
                    );
                }
                content.to_string()
            }
        }
    }

    async fn run_stages(
        &self,
        content: &str,
        mode: ExportMode,
        slug: Option<&str>,
    ) -> Result<String, ExportError> {
        let ctx = self.context(mode);
        let text = math::transform_math(content);
        let text = callout::transform_callouts(&text);
        let text = wikilink::transform_wiki_links(&text, &ctx).await?;
        let text = match slug {
            Some(slug) => image::transform_images(&text, &ctx, slug).await?,
            None => text,
        };
        Ok(mermaid::transform_mermaid(&text))
    }

    // ── Single export ─────────────────────────────────────────────────────

    /// Export the note a wiki-style `link` (`My Note`, `folder/My Note.md`)
    /// resolves to.
    pub async fn export_link(&self, link: &str) -> Result<NoteExport, ExportError> {
        let Some(note) = self.vault.resolve_link(link) else {
            let e = ExportError::NoteNotFound {
                link: link.to_string(),
            };
            self.notice(NoticeLevel::Error, e.to_string());
            return Err(e);
        };
        self.export_note(&note).await
    }

    /// Export one note to `EXPORT/BLOG/SLUG/NAME.md` and choose its cover.
    pub async fn export_note(&self, note: &VaultFile) -> Result<NoteExport, ExportError> {
        match self.try_export_note(note).await {
            Ok(done) => {
                info!("Exported {} -> {}", note.path().display(), done.output_path.display());
                self.notice(
                    NoticeLevel::Success,
                    format!("Export succeeded!\nSaved to:\n{}", done.output_path.display()),
                );
                Ok(done)
            }
            Err(e) => {
                error!("Export of {} failed: {}", note.path().display(), e);
                self.notice(NoticeLevel::Error, format!("Export failed: {e}"));
                Err(e)
            }
        }
    }

    async fn try_export_note(&self, note: &VaultFile) -> Result<NoteExport, ExportError> {
        let slug = self
            .vault
            .slug_of(note)
            .ok_or_else(|| ExportError::MissingSlug {
                note: note.basename(),
            })?;

        let content = self.vault.read_text(note).await?;
        let modified = self
            .modify_content(&content, ExportMode::Single, Some(&slug))
            .await;

        let basename = note.basename();
        let file_name = if self.settings.use_default_export_name {
            self.settings.export_name_for(&basename)
        } else {
            self.prompt.export_file_name(&basename).await?
        };

        let slug_dir = self.settings.slug_dir(&slug);
        create_dir(&slug_dir).await?;
        let output_path = slug_dir.join(format!("{file_name}.md"));
        write_file(&output_path, &modified).await?;

        self.covers.choose_cover(&self.settings, &slug_dir).await;

        Ok(NoteExport {
            note: note.path().to_path_buf(),
            slug,
            output_path,
        })
    }

    // ── Batch export ──────────────────────────────────────────────────────

    /// Export every Markdown note of the vault.
    ///
    /// Notes are processed one after another. Notes without a slug are
    /// counted and skipped without creating anything on disk; any other
    /// failure is counted and the run continues.
    pub async fn export_all(&self) -> Result<BatchSummary, ExportError> {
        let files = self.vault.markdown_files();
        let mut summary = BatchSummary::default();
        if files.is_empty() {
            self.notice(NoticeLevel::Info, "No Markdown files found");
            return Ok(summary);
        }

        let content_dir = self.settings.content_dir();
        create_dir(&content_dir).await.inspect_err(|e| {
            self.notice(NoticeLevel::Error, format!("Export failed: {e}"));
        })?;

        let total = files.len();
        info!("Batch export of {} notes to {}", total, content_dir.display());
        self.progress.on_batch_start(total);

        for (i, file) in files.iter().enumerate() {
            let name = file.basename();
            self.progress.on_document_start(i + 1, total, &name);

            let outcome = match self.export_batch_note(file).await {
                Ok(Some(output_path)) => ExportOutcome::Success { output_path },
                Ok(None) => {
                    warn!("{} has no slug, skipped", name);
                    ExportOutcome::MissingSlug
                }
                Err(e) => {
                    error!("Export of {} failed: {}", file.path().display(), e);
                    ExportOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };

            self.progress.on_document_complete(i + 1, total, &name, &outcome);
            summary.record(file.path().to_path_buf(), outcome);
        }

        info!(
            "Batch export done: {} succeeded, {} failed, {} missing slug",
            summary.success, summary.failed, summary.missing_slug
        );
        self.notice(
            NoticeLevel::Info,
            format!(
                "Export complete!\nSucceeded: {}\nFailed: {}\nMissing slug: {}",
                summary.success, summary.failed, summary.missing_slug
            ),
        );
        self.progress.on_batch_complete(&summary);
        Ok(summary)
    }

    /// `Ok(None)` when the note has no slug.
    async fn export_batch_note(&self, file: &VaultFile) -> Result<Option<PathBuf>, ExportError> {
        let Some(slug) = self.vault.slug_of(file) else {
            return Ok(None);
        };

        let slug_dir = self.settings.slug_dir(&slug);
        create_dir(&slug_dir).await?;

        let content = self.vault.read_text(file).await?;
        // Copy embeds up front; a failing stage later must not drop them.
        let content =
            image::transform_images(&content, &self.context(ExportMode::Batch), &slug).await?;
        let modified = self
            .modify_content(&content, ExportMode::Batch, Some(&slug))
            .await;

        let basename = file.basename();
        let file_name = if self.settings.use_default_export_name {
            self.settings.export_name_for(&basename)
        } else {
            basename
        };
        let output_path = slug_dir.join(format!("{file_name}.md"));
        write_file(&output_path, &modified).await?;

        self.covers.choose_cover(&self.settings, &slug_dir).await;
        debug!("Exported {} -> {}", file.path().display(), output_path.display());
        Ok(Some(output_path))
    }
}

pub(crate) async fn create_dir(path: &Path) -> Result<(), ExportError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| ExportError::CreateDirFailed {
            path: path.to_path_buf(),
            source: e,
        })
}

pub(crate) async fn write_file(path: &Path, content: &str) -> Result<(), ExportError> {
    tokio::fs::write(path, content)
        .await
        .map_err(|e| ExportError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
}
