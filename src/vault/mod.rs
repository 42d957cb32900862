//! The vault: where notes, attachments and their metadata come from.
//!
//! The pipeline only consumes a vault. It reads note text and attachment
//! bytes, resolves wiki-link paths to files and looks up frontmatter. The
//! [`Vault`] trait captures exactly those operations so stages can run
//! against a real directory ([`FsVault`]) or an in-memory stub in tests.

pub mod frontmatter;
mod fs;

pub use frontmatter::{parse_metadata, split_frontmatter, NoteMetadata};
pub use fs::FsVault;

use crate::error::ExportError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Extensions the exporter treats as images, lower-case without the dot.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "svg", "webp"];

/// A file inside the vault, addressed by its vault-relative path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VaultFile {
    path: PathBuf,
}

impl VaultFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Vault-relative path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name with extension, e.g. `diagram.png`.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without extension, e.g. `My Note`.
    pub fn basename(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Lower-case extension without the dot, or `""`.
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }

    pub fn is_markdown(&self) -> bool {
        self.extension() == "md"
    }

    pub fn is_image(&self) -> bool {
        is_image_extension(&self.extension())
    }
}

/// `true` when `ext` (any case, no dot) is one of [`IMAGE_EXTENSIONS`].
pub fn is_image_extension(ext: &str) -> bool {
    let ext = ext.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

/// Read access to a note collection.
#[async_trait]
pub trait Vault: Send + Sync {
    /// Full text of a note.
    async fn read_text(&self, file: &VaultFile) -> Result<String, ExportError>;

    /// Raw bytes of an attachment.
    async fn read_binary(&self, file: &VaultFile) -> Result<Vec<u8>, ExportError>;

    /// Resolve a wiki-link path (`Note`, `folder/Note`, `image.png`) to a file.
    fn resolve_link(&self, link: &str) -> Option<VaultFile>;

    /// Frontmatter of a note; `None` for unknown files.
    fn metadata(&self, file: &VaultFile) -> Option<NoteMetadata>;

    /// Every Markdown note, in a stable order.
    fn markdown_files(&self) -> Vec<VaultFile>;

    /// Slug of a note, if it has a non-blank one.
    fn slug_of(&self, file: &VaultFile) -> Option<String> {
        self.metadata(file)
            .and_then(|m| m.slug().map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_file_parts() {
        let f = VaultFile::new("attachments/Diagram.PNG");
        assert_eq!(f.name(), "Diagram.PNG");
        assert_eq!(f.basename(), "Diagram");
        assert_eq!(f.extension(), "png");
        assert!(f.is_image());
        assert!(!f.is_markdown());
    }

    #[test]
    fn test_image_extensions() {
        assert!(is_image_extension("webp"));
        assert!(is_image_extension("SVG"));
        assert!(!is_image_extension("pdf"));
        assert!(!is_image_extension(""));
    }
}
