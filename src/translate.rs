//! Translate a note with an LLM and optionally export the translation.
//!
//! ## Flow
//!
//! ```text
//! note ──▶ title request ──▶ body request ──▶ TRANSLATED/PREFIX+title.md
//!                                                  │ direct_export_after_translation
//!                                                  ▼
//!                                    pipeline ──▶ EXPORT/BLOG/SLUG/index.<lang>.md
//! ```
//!
//! Two chat requests are made per note, title first, both with the configured
//! temperature. There are no retries and no timeouts: a failed request ends
//! the command with a notice.

use crate::error::{ExportError, SkipReason};
use crate::export::{create_dir, write_file, Exporter};
use crate::output::ExportMode;
use crate::progress::NoticeLevel;
use crate::prompts::{content_prompt, title_prompt};
use crate::vault::VaultFile;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Used when the model returns an empty title.
pub const FALLBACK_TITLE: &str = "Default Title";

/// Result of [`translate_note`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Translation {
    pub title: String,
    /// Where the translated Markdown was written.
    pub translated_path: PathBuf,
    /// Output of the direct export, when enabled.
    pub exported_path: Option<PathBuf>,
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, ExportError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        ExportError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the translation provider, from most-specific to least-specific:
///
/// 1. **Pre-built provider** passed by the caller.
/// 2. **Named provider + model** from the settings (`gpt-4.1-nano` when no
///    model is set). The API key comes from the provider's usual variable.
/// 3. **Environment pair** `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`.
/// 4. **OpenAI** when `OPENAI_API_KEY` is set.
/// 5. Whatever [`ProviderFactory::from_env`] can auto-detect.
pub fn resolve_provider(
    exporter: &Exporter,
    provider: Option<Arc<dyn LLMProvider>>,
) -> Result<Arc<dyn LLMProvider>, ExportError> {
    if let Some(provider) = provider {
        return Ok(provider);
    }

    let settings = exporter.settings();
    let model = settings.model_name.as_deref().unwrap_or("gpt-4.1-nano");
    if let Some(ref name) = settings.provider_name {
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            return create_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| ExportError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure providerName.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

/// Translate `note` into the configured target language.
///
/// Failures are reported through the exporter's progress callback and
/// returned.
pub async fn translate_note(
    exporter: &Exporter,
    provider: Option<Arc<dyn LLMProvider>>,
    note: &VaultFile,
) -> Result<Translation, ExportError> {
    match try_translate(exporter, provider, note).await {
        Ok(t) => Ok(t),
        Err(e) => {
            tracing::error!("Translation of {} failed: {}", note.path().display(), e);
            exporter.notice(NoticeLevel::Error, format!("Translation failed: {e}"));
            Err(e)
        }
    }
}

async fn try_translate(
    exporter: &Exporter,
    provider: Option<Arc<dyn LLMProvider>>,
    note: &VaultFile,
) -> Result<Translation, ExportError> {
    let settings = exporter.settings();
    if settings.translated_export_path.as_os_str().is_empty() {
        return Err(ExportError::MissingSetting {
            setting: "translatedExportPath",
            hint: "Set the directory for translated notes in the settings file.".into(),
        });
    }
    let provider = resolve_provider(exporter, provider)?;

    let content = exporter.vault().read_text(note).await?;
    exporter.notice(NoticeLevel::Info, "Translating...");
    info!(
        "Translating {} into {}",
        note.path().display(),
        settings.target_language
    );

    let options = CompletionOptions {
        temperature: Some(settings.temperature),
        ..Default::default()
    };

    let title = complete(
        provider.as_ref(),
        title_prompt(&settings.target_language),
        note.basename(),
        &options,
    )
    .await?;
    let title = match title.trim() {
        "" => FALLBACK_TITLE.to_string(),
        t => t.to_string(),
    };

    let translated = complete(
        provider.as_ref(),
        content_prompt(&settings.target_language),
        content,
        &options,
    )
    .await?;

    let file_name = format!(
        "{}{}.md",
        settings.translated_file_prefix,
        sanitize_file_name(&title)
    );
    let translated_path = settings.translated_export_path.join(file_name);
    if let Some(parent) = translated_path.parent() {
        create_dir(parent).await?;
    }
    write_file(&translated_path, &translated).await?;
    exporter.notice(
        NoticeLevel::Success,
        format!("Translation complete!\nSaved to:\n{}", translated_path.display()),
    );

    let exported_path = if settings.direct_export_after_translation {
        direct_export(exporter, note, &translated).await?
    } else {
        None
    };

    Ok(Translation {
        title,
        translated_path,
        exported_path,
    })
}

async fn complete(
    provider: &dyn LLMProvider,
    system: String,
    user: String,
    options: &CompletionOptions,
) -> Result<String, ExportError> {
    let messages = vec![ChatMessage::system(system), ChatMessage::user(user)];
    let response = provider
        .chat(&messages, Some(options))
        .await
        .map_err(|e| ExportError::TranslationFailed {
            message: e.to_string(),
        })?;
    debug!(
        "{} input tokens, {} output tokens",
        response.prompt_tokens, response.completion_tokens
    );
    Ok(response.content)
}

/// Run the pipeline on the translated text and write it next to the
/// original post as `index.<lang>.md`.
///
/// A note without a slug keeps its translation; only the export is skipped.
async fn direct_export(
    exporter: &Exporter,
    note: &VaultFile,
    translated: &str,
) -> Result<Option<PathBuf>, ExportError> {
    let Some(slug) = exporter.vault().slug_of(note) else {
        let reason = SkipReason::MissingSlug {
            note: note.basename(),
        };
        warn!("Direct export skipped: {}", reason);
        exporter.notice(NoticeLevel::Warning, format!("Direct export skipped: {reason}"));
        return Ok(None);
    };
    exporter.notice(NoticeLevel::Info, "Running direct export...");

    let settings = exporter.settings();
    let slug_dir = settings.slug_dir(&slug);
    create_dir(&slug_dir).await?;

    let modified = exporter
        .modify_content(translated, ExportMode::Single, Some(&slug))
        .await;
    let output_path = slug_dir.join(format!(
        "{}.md",
        direct_export_file_name(&settings.target_language)
    ));
    write_file(&output_path, &modified).await?;

    exporter.covers().choose_cover(settings, &slug_dir).await;
    exporter.notice(
        NoticeLevel::Success,
        format!("Direct export succeeded!\nSaved to:\n{}", output_path.display()),
    );
    Ok(Some(output_path))
}

/// Hugo language file stem for a target language: `index.zh-cn` for
/// Chinese, `index.en` for anything else.
pub fn direct_export_file_name(language: &str) -> &'static str {
    let language = language.trim();
    if language == "中文"
        || language.eq_ignore_ascii_case("chinese")
        || language.to_ascii_lowercase().starts_with("zh")
    {
        "index.zh-cn"
    } else {
        "index.en"
    }
}

/// Make a model-produced title safe to use as a file name.
pub fn sanitize_file_name(title: &str) -> String {
    let cleaned: String = title
        .trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '“' || c == '”')
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect();
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportSettings;
    use crate::pipeline::testing::MemVault;
    use crate::progress::ExportProgressCallback;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Notices(Mutex<Vec<(NoticeLevel, String)>>);

    impl ExportProgressCallback for Notices {
        fn on_notice(&self, level: NoticeLevel, message: String) {
            self.0.lock().unwrap().push((level, message));
        }
    }

    fn exporter(root: &std::path::Path, vault: MemVault) -> (Exporter, Arc<Notices>) {
        let settings = ExportSettings::builder()
            .export_path(root)
            .target_language("English")
            .build()
            .unwrap();
        let notices = Arc::new(Notices::default());
        let exporter = Exporter::new(Arc::new(settings), Arc::new(vault))
            .with_progress(notices.clone());
        (exporter, notices)
    }

    #[tokio::test]
    async fn test_direct_export_without_slug_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let (exporter, notices) = exporter(dir.path(), MemVault::default().note("Draft.md", None));

        let out = direct_export(&exporter, &VaultFile::new("Draft.md"), "Hello")
            .await
            .unwrap();

        assert_eq!(out, None);
        assert!(notices
            .0
            .lock()
            .unwrap()
            .iter()
            .any(|(l, m)| *l == NoticeLevel::Warning && m.contains("Draft has no slug")));
        assert!(!dir.path().join("posts").exists());
    }

    #[tokio::test]
    async fn test_direct_export_writes_language_file() {
        let dir = tempfile::tempdir().unwrap();
        let (exporter, _) = exporter(dir.path(), MemVault::default().note("Post.md", Some("post")));

        let out = direct_export(&exporter, &VaultFile::new("Post.md"), "$x$ hello")
            .await
            .unwrap();

        let path = dir.path().join("posts/post/index.en.md");
        assert_eq!(out, Some(path.clone()));
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            r"{{< katex >}}\\(x\\) hello"
        );
    }

    #[test]
    fn test_chinese_targets_write_zh_cn() {
        assert_eq!(direct_export_file_name("中文"), "index.zh-cn");
        assert_eq!(direct_export_file_name("Chinese"), "index.zh-cn");
        assert_eq!(direct_export_file_name("zh-CN"), "index.zh-cn");
    }

    #[test]
    fn test_other_targets_write_en() {
        assert_eq!(direct_export_file_name("English"), "index.en");
        assert_eq!(direct_export_file_name("Français"), "index.en");
    }

    #[test]
    fn test_sanitize_strips_separators_and_quotes() {
        assert_eq!(sanitize_file_name("\"A/B: test\"\n"), "A-B- test");
        assert_eq!(sanitize_file_name("  Hello\tWorld "), "Hello World");
    }

    #[test]
    fn test_sanitize_falls_back_when_empty() {
        assert_eq!(sanitize_file_name("  \"\" "), FALLBACK_TITLE);
    }
}
