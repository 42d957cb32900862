//! WikiLink stage: `[[note]]`, `[[note#section|text]]` and `![[note]]` to
//! Hugo `ref` / `relref` links and Blowfish `mdimporter` embeds.
//!
//! ## Resolution
//!
//! Every occurrence is resolved independently and all resolutions run
//! concurrently (`join_all`); the stage finishes once every one has settled.
//! Each produces a [`LinkRewrite`]:
//!
//! | link                               | result                                  |
//! |------------------------------------|-----------------------------------------|
//! | `[[#Section]]`                     | `[Section]({{< relref "#section" >}})`  |
//! | `[[Note]]`, `[[Note#Sec\|text]]`   | `[text]({{< ref "/posts/slug/#Sec" >}})`|
//! | `![[Note]]`                        | `{{< mdimporter url="content/…" >}}`    |
//! | `![[pic.png]]`                     | skipped, left for the image stage       |
//! | unresolved or slug-less target     | skipped, reported                       |
//!
//! Rewrites are spliced in at the exact byte range of their occurrence, so
//! two identical links are each replaced once and nothing else is touched.

use super::StageContext;
use crate::error::{ExportError, SkipReason};
use crate::output::{apply_rewrites, LinkRewrite};
use crate::progress::NoticeLevel;
use crate::vault::is_image_extension;
use futures::future::join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;
use std::path::Path;
use tracing::debug;

static RE_WIKILINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(!?\[\[(.*?)(?:\|(.*?))?\]\])").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// One parsed wiki-link occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkMatch {
    /// Byte range of `raw` in the document.
    pub span: Range<usize>,
    /// The full matched text, e.g. `![[Note#Intro|see here]]`.
    pub raw: String,
    /// File part of the target, trimmed; empty for `[[#Section]]`.
    pub path: String,
    pub fragment: Option<String>,
    pub display: Option<String>,
    /// `true` for `![[…]]` embeds.
    pub is_display: bool,
}

impl LinkMatch {
    /// Text for a rendered link: display text, then fragment, then `fallback`.
    fn link_text<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.display
            .as_deref()
            .or(self.fragment.as_deref())
            .unwrap_or(fallback)
    }
}

/// Every wiki-link in `content`, in document order.
pub fn find_links(content: &str) -> Vec<LinkMatch> {
    RE_WIKILINK
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let target = caps.get(2).map_or("", |m| m.as_str());
            let display = caps
                .get(3)
                .map(|m| m.as_str().to_string())
                .filter(|s| !s.is_empty());

            let mut parts = target.split('#');
            let file = parts.next().unwrap_or("");
            let fragment = parts
                .next()
                .map(str::to_string)
                .filter(|s| !s.is_empty());
            let path = file.split('|').next().unwrap_or("").trim().to_string();

            Some(LinkMatch {
                span: whole.range(),
                raw: whole.as_str().to_string(),
                path,
                fragment,
                display,
                is_display: whole.as_str().starts_with('!'),
            })
        })
        .collect()
}

/// Anchor id Hugo generates for a heading: ASCII upper-case lowered,
/// whitespace runs replaced by `-`.
pub fn heading_anchor(fragment: &str) -> String {
    RE_WHITESPACE
        .replace_all(&fragment.to_ascii_lowercase(), "-")
        .into_owned()
}

/// Resolve every wiki-link in `content` concurrently.
///
/// Returns one [`LinkRewrite`] per occurrence, in document order. Only a
/// failing name prompt makes the whole stage fail.
pub async fn resolve_links(
    content: &str,
    ctx: &StageContext<'_>,
) -> Result<Vec<LinkRewrite>, ExportError> {
    let links = find_links(content);
    debug!("Resolving {} wiki-links", links.len());
    join_all(links.into_iter().map(|link| resolve_link(link, ctx)))
        .await
        .into_iter()
        .collect()
}

/// Rewrite every resolvable wiki-link in `content`.
pub async fn transform_wiki_links(
    content: &str,
    ctx: &StageContext<'_>,
) -> Result<String, ExportError> {
    let rewrites = resolve_links(content, ctx).await?;
    Ok(apply_rewrites(content, &rewrites))
}

async fn resolve_link(
    link: LinkMatch,
    ctx: &StageContext<'_>,
) -> Result<LinkRewrite, ExportError> {
    let blog = &ctx.settings.blog_path;

    if link.path.is_empty() {
        let Some(fragment) = link.fragment.as_deref() else {
            return Ok(skip(link, SkipReason::EmptyTarget));
        };
        let replacement = format!(
            "[{}]({{{{< relref \"#{}\" >}}}})",
            link.link_text(fragment),
            heading_anchor(fragment)
        );
        return Ok(rewrite(link, replacement));
    }

    // Image embeds, found or not, belong to the image stage.
    if link.is_display && has_image_extension(&link.path) {
        return Ok(skip(link, SkipReason::ImageEmbed));
    }

    let Some(file) = ctx.vault.resolve_link(&link.path) else {
        let reason = SkipReason::Unresolved {
            target: link.path.clone(),
        };
        ctx.report_skip(NoticeLevel::Warning, &reason);
        return Ok(skip(link, reason));
    };

    if link.is_display && file.is_image() {
        return Ok(skip(link, SkipReason::ImageEmbed));
    }

    let Some(slug) = ctx.vault.slug_of(&file) else {
        let reason = SkipReason::MissingSlug {
            note: file.basename(),
        };
        ctx.report_skip(NoticeLevel::Warning, &reason);
        return Ok(skip(link, reason));
    };

    let replacement = if link.is_display {
        let name = if ctx.settings.use_default_disp_name {
            ctx.settings.default_disp_name.clone()
        } else {
            ctx.prompt
                .display_file_name(&ctx.settings.default_disp_name)
                .await?
        };
        format!("{{{{< mdimporter url=\"content/{blog}/{slug}/{name}\" >}}}}")
    } else {
        let basename = file.basename();
        let fragment = link
            .fragment
            .as_deref()
            .map(|f| format!("#{f}"))
            .unwrap_or_default();
        format!(
            "[{}]({{{{< ref \"/{blog}/{slug}/{fragment}\" >}}}})",
            link.link_text(&basename)
        )
    };
    Ok(rewrite(link, replacement))
}

fn has_image_extension(path: &str) -> bool {
    Path::new(path)
        .extension()
        .is_some_and(|ext| is_image_extension(&ext.to_string_lossy()))
}

fn rewrite(link: LinkMatch, replacement: String) -> LinkRewrite {
    LinkRewrite::Rewritten {
        span: link.span,
        original: link.raw,
        replacement,
    }
}

fn skip(link: LinkMatch, reason: SkipReason) -> LinkRewrite {
    LinkRewrite::Skipped {
        span: link.span,
        original: link.raw,
        reason,
    }
}
