//! Cover chooser: give every exported post a background and a featured image.
//!
//! Blowfish picks up `background.*` and `featured.*` files in a post's
//! directory. The chooser copies the shared `background.svg` from the cover
//! directory and one randomly picked cover as `featured.EXT`. Existing files
//! are never replaced, so re-exporting a post keeps its cover.
//!
//! The random source is a seedable [`StdRng`] so tests can pin the choice.

use crate::config::ExportSettings;
use crate::vault::is_image_extension;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, error};

const BACKGROUND_FILE: &str = "background.svg";
const BACKGROUND_STEM: &str = "background";
const FEATURED_STEM: &str = "featured";

/// Picks covers for exported posts.
#[derive(Debug)]
pub struct CoverChooser {
    rng: Mutex<StdRng>,
}

impl Default for CoverChooser {
    fn default() -> Self {
        Self::new()
    }
}

impl CoverChooser {
    /// A chooser seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// A deterministic chooser.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Ensure `slug_dir` has a background and a featured image.
    ///
    /// Best-effort: failures are logged, never returned.
    pub async fn choose_cover(&self, settings: &ExportSettings, slug_dir: &Path) {
        let cover_dir = settings.cover_dir();

        let background = slug_dir.join(BACKGROUND_FILE);
        if !exists(&background).await {
            let source = cover_dir.join(BACKGROUND_FILE);
            if exists(&source).await {
                if let Err(e) = tokio::fs::copy(&source, &background).await {
                    error!("Failed to copy background {}: {}", source.display(), e);
                }
            }
        }

        match has_featured(slug_dir).await {
            Ok(true) => {
                debug!("{} already has a featured image", slug_dir.display());
                return;
            }
            Ok(false) => {}
            Err(e) => {
                error!("Failed to list {}: {}", slug_dir.display(), e);
                return;
            }
        }

        let candidates = match cover_candidates(&cover_dir).await {
            Ok(c) => c,
            Err(e) => {
                error!("Failed to list covers in {}: {}", cover_dir.display(), e);
                return;
            }
        };
        let Some(chosen) = self.pick(&candidates) else {
            debug!("No covers available in {}", cover_dir.display());
            return;
        };

        let ext = chosen
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let target = slug_dir.join(format!("{FEATURED_STEM}.{ext}"));
        match tokio::fs::copy(chosen, &target).await {
            Ok(_) => debug!("Cover {} -> {}", chosen.display(), target.display()),
            Err(e) => error!("Failed to copy cover {}: {}", chosen.display(), e),
        }
    }

    fn pick<'a>(&self, candidates: &'a [PathBuf]) -> Option<&'a PathBuf> {
        if candidates.is_empty() {
            return None;
        }
        let index = match self.rng.lock() {
            Ok(mut rng) => rng.random_range(0..candidates.len()),
            Err(poisoned) => poisoned.into_inner().random_range(0..candidates.len()),
        };
        candidates.get(index)
    }
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

/// Image files in `dir` whose stem satisfies `keep`, sorted by name.
async fn images_in(dir: &Path, keep: impl Fn(&str) -> bool) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut found = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if is_image_extension(&ext) && keep(&stem) {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

async fn has_featured(slug_dir: &Path) -> std::io::Result<bool> {
    if !exists(slug_dir).await {
        return Ok(false);
    }
    Ok(!images_in(slug_dir, |stem| stem == FEATURED_STEM).await?.is_empty())
}

async fn cover_candidates(cover_dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    if !exists(cover_dir).await {
        return Ok(Vec::new());
    }
    images_in(cover_dir, |stem| stem != BACKGROUND_STEM).await
}
