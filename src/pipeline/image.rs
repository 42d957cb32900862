//! Image stage: copy `![[pic.png]]` embeds next to the post and relink them.
//!
//! Embeds are handled one at a time in document order. Each replacement is
//! applied to a working copy (first remaining occurrence of the embed text)
//! before the next embed is looked at, so the stage never loses an update.
//! A failure on one image is reported and skipped; images already copied
//! stay on disk.

use super::StageContext;
use crate::error::{ExportError, SkipReason};
use crate::output::LinkRewrite;
use crate::progress::NoticeLevel;
use crate::vault::VaultFile;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::{debug, error};

static RE_IMAGE_EMBED: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[\[(.*?)\]\]").unwrap());

/// Copy every embedded image of the note `slug` and rewrite its embed.
pub async fn transform_images(
    content: &str,
    ctx: &StageContext<'_>,
    slug: &str,
) -> Result<String, ExportError> {
    let (out, _) = transform_images_with_report(content, ctx, slug).await;
    Ok(out)
}

/// [`transform_images`], also returning what happened to every embed.
pub async fn transform_images_with_report(
    content: &str,
    ctx: &StageContext<'_>,
    slug: &str,
) -> (String, Vec<LinkRewrite>) {
    let image_dir = ctx.settings.image_dir(slug);
    let mut working = content.to_string();
    let mut report = Vec::new();

    for caps in RE_IMAGE_EMBED.captures_iter(content) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let original = whole.as_str().to_string();
        let span = whole.range();
        // `![[pic.png|300]]`: the part after `|` is a size hint.
        let link = caps[1].split('|').next().unwrap_or("").trim();

        let Some(file) = ctx.vault.resolve_link(link) else {
            let reason = SkipReason::Unresolved {
                target: link.to_string(),
            };
            ctx.report_skip(NoticeLevel::Warning, &reason);
            report.push(LinkRewrite::Skipped {
                span,
                original,
                reason,
            });
            continue;
        };

        if !file.is_image() {
            report.push(LinkRewrite::Skipped {
                span,
                original,
                reason: SkipReason::NotAnImage {
                    path: file.path().display().to_string(),
                },
            });
            continue;
        }

        match copy_image(ctx, &file, &image_dir).await {
            Ok(()) => {
                let name = file.name();
                let replacement = format!(
                    "![{name}]({}/{name})",
                    ctx.settings.image_export_path
                );
                working = working.replacen(&original, &replacement, 1);
                report.push(LinkRewrite::Rewritten {
                    span,
                    original,
                    replacement,
                });
            }
            Err(e) => {
                error!("Failed to process image {}: {}", link, e);
                let reason = SkipReason::CopyFailed {
                    path: link.to_string(),
                    detail: e.to_string(),
                };
                ctx.report_skip(NoticeLevel::Error, &reason);
                report.push(LinkRewrite::Skipped {
                    span,
                    original,
                    reason,
                });
            }
        }
    }

    (working, report)
}

async fn copy_image(
    ctx: &StageContext<'_>,
    file: &VaultFile,
    image_dir: &Path,
) -> Result<(), ExportError> {
    let bytes = ctx.vault.read_binary(file).await?;
    tokio::fs::create_dir_all(image_dir)
        .await
        .map_err(|e| ExportError::CreateDirFailed {
            path: image_dir.to_path_buf(),
            source: e,
        })?;
    let target = image_dir.join(file.name());
    tokio::fs::write(&target, &bytes)
        .await
        .map_err(|e| ExportError::WriteFailed {
            path: target.clone(),
            source: e,
        })?;
    debug!("Copied {} -> {}", file.path().display(), target.display());
    Ok(())
}
