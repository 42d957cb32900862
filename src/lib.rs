//! # vault2hugo
//!
//! Export an Obsidian vault to a Hugo site using the Blowfish theme.
//!
//! ## Why this crate?
//!
//! Obsidian notes are full of syntax Hugo does not understand: callouts,
//! `$inline$` math, mermaid fences, `[[wiki-links]]` and `![[image]]` embeds.
//! This crate rewrites each of them into the matching Blowfish shortcode or
//! plain Markdown, copies embedded images next to the post, and lays every
//! note out as `content/<blog>/<slug>/<name>.md`, the way Hugo page bundles
//! expect.
//!
//! ## Pipeline Overview
//!
//! ```text
//! note.md
//!  │
//!  ├─ 1. Math      $x$        → {{< katex >}}\\(x\\)
//!  ├─ 2. Callout   > [!note]  → {{< alert … >}}  (fenced code untouched)
//!  ├─ 3. WikiLink  [[Note]]   → [Note]({{< ref "/posts/slug/" >}})
//!  ├─ 4. Image     ![[a.png]] → ![a.png](img/a.png) + file copy
//!  ├─ 5. Mermaid   ```mermaid → {{< mermaid >}}
//!  └─ 6. Output    posts/<slug>/<name>.md + background/featured cover
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vault2hugo::{ExportSettings, Exporter, FsVault};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = ExportSettings::builder()
//!         .export_path("/srv/blog/content")
//!         .default_export_name("index")
//!         .build()?;
//!     let vault = FsVault::load("/home/me/notes").await?;
//!     let exporter = Exporter::new(Arc::new(settings), Arc::new(vault));
//!
//!     let summary = exporter.export_all().await?;
//!     eprintln!("{} exported, {} without slug", summary.success, summary.missing_slug);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `vault2hugo` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! vault2hugo = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod cover;
pub mod error;
pub mod export;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod translate;
pub mod vault;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExportSettings, ExportSettingsBuilder};
pub use cover::CoverChooser;
pub use error::{ExportError, SkipReason};
pub use export::Exporter;
pub use naming::{NamePrompt, UseDefaultsPrompt};
pub use output::{BatchSummary, ExportMode, ExportOutcome, LinkRewrite, NoteExport};
pub use progress::{ExportProgressCallback, NoopProgressCallback, NoticeLevel, ProgressCallback};
pub use translate::{translate_note, Translation};
pub use vault::{FsVault, NoteMetadata, Vault, VaultFile};
