//! Filesystem-backed vault.
//!
//! ## Why index up front?
//!
//! Wiki-links name notes by basename (`[[My Note]]`) or partial path
//! (`[[folder/My Note]]`), never by absolute path. Resolving them needs the
//! full file list, and every note's `slug` is needed when *other* notes link
//! to it. Both are collected once at open time, the same way the editor keeps
//! a metadata cache, so per-link lookups are plain in-memory searches.

use super::{frontmatter, NoteMetadata, Vault, VaultFile};
use crate::error::ExportError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// A vault rooted at a directory on disk.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
    files: Vec<VaultFile>,
    metadata: HashMap<VaultFile, NoteMetadata>,
}

impl FsVault {
    /// Scan `root`, indexing every non-hidden file and the frontmatter of
    /// every Markdown note.
    ///
    /// Hidden entries (`.obsidian/`, `.trash/`, dot-files) are skipped.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, ExportError> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(ExportError::VaultScanFailed {
                path: root,
                detail: "not a directory".into(),
            });
        }

        let mut files = Vec::new();
        let mut metadata = HashMap::new();

        let walker = WalkDir::new(&root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            let entry = entry.map_err(|e| ExportError::VaultScanFailed {
                path: root.clone(),
                detail: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(&root) else {
                continue;
            };
            let file = VaultFile::new(rel);

            if file.is_markdown() {
                // A stray invalid byte in the body must not cost the note its slug.
                match std::fs::read(entry.path()) {
                    Ok(bytes) => {
                        let text = String::from_utf8_lossy(&bytes);
                        metadata.insert(file.clone(), frontmatter::parse_metadata(&text));
                    }
                    Err(e) => warn!("Skipping frontmatter of {}: {}", rel.display(), e),
                }
            }
            files.push(file);
        }

        files.sort();
        info!(
            "Indexed vault {}: {} files, {} notes",
            root.display(),
            files.len(),
            metadata.len()
        );

        Ok(Self {
            root,
            files,
            metadata,
        })
    }

    /// [`FsVault::open`] on the blocking thread pool.
    pub async fn load(root: impl AsRef<Path>) -> Result<Self, ExportError> {
        let root = root.as_ref().to_path_buf();
        tokio::task::spawn_blocking(move || Self::open(root))
            .await
            .map_err(|e| ExportError::Internal(format!("Vault scan task panicked: {}", e)))?
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a vault file.
    pub fn absolute(&self, file: &VaultFile) -> PathBuf {
        self.root.join(file.path())
    }

    /// Find the best file for a normalised, lower-cased link.
    ///
    /// An exact vault-relative path wins; otherwise the file whose path ends
    /// with the link and has the fewest components.
    fn find(&self, wanted: &str) -> Option<&VaultFile> {
        let suffix = format!("/{wanted}");
        self.files
            .iter()
            .filter_map(|f| {
                let rel = slash_path(f.path()).to_lowercase();
                if rel == wanted {
                    Some((0, f))
                } else if rel.ends_with(&suffix) {
                    Some((f.path().components().count(), f))
                } else {
                    None
                }
            })
            .min_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)))
            .map(|(_, f)| f)
    }
}

#[async_trait]
impl Vault for FsVault {
    async fn read_text(&self, file: &VaultFile) -> Result<String, ExportError> {
        let bytes = self.read_binary(file).await?;
        Ok(match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!("{} is not valid UTF-8, replacing invalid bytes", file.path().display());
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        })
    }

    async fn read_binary(&self, file: &VaultFile) -> Result<Vec<u8>, ExportError> {
        let path = self.absolute(file);
        tokio::fs::read(&path)
            .await
            .map_err(|e| ExportError::ReadFailed { path, source: e })
    }

    fn resolve_link(&self, link: &str) -> Option<VaultFile> {
        let wanted = normalise_link(link);
        if wanted.is_empty() {
            return None;
        }
        let found = self
            .find(&wanted)
            .or_else(|| self.find(&format!("{wanted}.md")))
            .cloned();
        debug!("resolve_link({link:?}) -> {:?}", found.as_ref().map(|f| f.path()));
        found
    }

    fn metadata(&self, file: &VaultFile) -> Option<NoteMetadata> {
        self.metadata.get(file).cloned()
    }

    fn markdown_files(&self) -> Vec<VaultFile> {
        self.files.iter().filter(|f| f.is_markdown()).cloned().collect()
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

fn slash_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Trim, use forward slashes, drop a leading `./` or `/`, lower-case.
fn normalise_link(link: &str) -> String {
    let link = link.trim().replace('\\', "/");
    let link = link.trim_start_matches("./").trim_start_matches('/');
    link.to_lowercase()
}
