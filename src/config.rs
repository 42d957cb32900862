//! Export settings.
//!
//! All export behaviour is controlled through [`ExportSettings`], built via
//! its [`ExportSettingsBuilder`] or loaded from a JSON settings file. One
//! instance is created per run and shared by `Arc` with every stage and
//! driver; nothing in the pipeline mutates it. Persisting a changed
//! configuration is an explicit [`ExportSettings::save`] call.
//!
//! The file format is the camelCase JSON the exporter has always stored,
//! and missing keys fall back to their defaults so an old settings file keeps
//! working after new fields are added.

use crate::error::ExportError;
use crate::naming::DEFAULT_DISPLAY_FILE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Placeholder replaced by the note's basename in [`ExportSettings::default_export_name`].
pub const TITLE_PLACEHOLDER: &str = "{{title}}";

/// Configuration for exporting a vault to a Hugo/Blowfish site.
///
/// # Example
/// ```rust
/// use vault2hugo::ExportSettings;
///
/// let settings = ExportSettings::builder()
///     .export_path("/srv/blog")
///     .blog_path("posts")
///     .image_export_path("img")
///     .build()
///     .unwrap();
/// assert_eq!(settings.slug_dir("hello").to_str(), Some("/srv/blog/posts/hello"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportSettings {
    /// The Hugo site's `content/` directory. Default: current dir.
    pub export_path: PathBuf,

    /// Sub-folder of each post directory that receives copied images. Default: `img`.
    pub image_export_path: String,

    /// Directory receiving translated notes. Empty disables translation.
    pub translated_export_path: PathBuf,

    /// LLM provider for translation (openai, anthropic, gemini, ollama, …).
    /// `None` auto-detects from the environment.
    pub provider_name: Option<String>,

    /// Model used for translation. `None` uses `gpt-4.1-nano` when a provider is named.
    /// Older settings files store it as `ModelName`.
    #[serde(alias = "ModelName")]
    pub model_name: Option<String>,

    /// Sampling temperature for both translation requests. Default: 0.3.
    pub temperature: f32,

    /// Language the translator writes, in words ("English", "中文", …).
    pub target_language: String,

    /// Run the export pipeline on the translated text right after translating.
    pub direct_export_after_translation: bool,

    /// Prefix prepended to the translated file name.
    pub translated_file_prefix: String,

    /// Folder under `export_path` holding one directory per slug. Default: `posts`.
    pub blog_path: String,

    /// Folder under `export_path/blog_path` holding cover assets. Default: `.featured`.
    pub cover_path: String,

    /// Skip the file-name prompt and use [`Self::default_export_name`].
    pub use_default_export_name: bool,

    /// Output file name without `.md`; `{{title}}` is replaced by the note name.
    pub default_export_name: String,

    /// Skip the language prompt for `![[note]]` embeds and use [`Self::default_disp_name`].
    pub use_default_disp_name: bool,

    /// File name referenced by `mdimporter` embeds.
    pub default_disp_name: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            export_path: PathBuf::new(),
            image_export_path: "img".to_string(),
            translated_export_path: PathBuf::new(),
            provider_name: None,
            model_name: None,
            temperature: 0.3,
            target_language: "English".to_string(),
            direct_export_after_translation: false,
            translated_file_prefix: String::new(),
            blog_path: "posts".to_string(),
            cover_path: ".featured".to_string(),
            use_default_export_name: false,
            default_export_name: TITLE_PLACEHOLDER.to_string(),
            use_default_disp_name: false,
            default_disp_name: DEFAULT_DISPLAY_FILE.to_string(),
        }
    }
}

impl ExportSettings {
    /// Create a new builder starting from the defaults.
    pub fn builder() -> ExportSettingsBuilder {
        ExportSettingsBuilder {
            settings: Self::default(),
        }
    }

    /// Load settings from a JSON file, merging over the defaults.
    ///
    /// A missing file is not an error: it yields [`ExportSettings::default`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ExportError> {
        let path = path.as_ref();
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ExportError::ReadFailed {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&raw).map_err(|e| ExportError::SettingsParse {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
    }

    /// Persist the settings as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ExportError::CreateDirFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ExportError::Internal(format!("serialise settings: {e}")))?;
        std::fs::write(path, json).map_err(|e| ExportError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// `export_path/blog_path`: parent of every post directory.
    pub fn content_dir(&self) -> PathBuf {
        self.export_path.join(&self.blog_path)
    }

    /// `export_path/blog_path/slug`: output directory of one note.
    pub fn slug_dir(&self, slug: &str) -> PathBuf {
        self.content_dir().join(slug)
    }

    /// `export_path/blog_path/cover_path`: where cover assets are picked from.
    pub fn cover_dir(&self) -> PathBuf {
        self.content_dir().join(&self.cover_path)
    }

    /// `export_path/blog_path/slug/image_export_path`: image output directory of one note.
    pub fn image_dir(&self, slug: &str) -> PathBuf {
        self.slug_dir(slug).join(&self.image_export_path)
    }

    /// [`Self::default_export_name`] with `{{title}}` replaced by `title`.
    pub fn export_name_for(&self, title: &str) -> String {
        self.default_export_name.replacen(TITLE_PLACEHOLDER, title, 1)
    }
}

/// Builder for [`ExportSettings`].
#[derive(Debug)]
pub struct ExportSettingsBuilder {
    settings: ExportSettings,
}

impl ExportSettingsBuilder {
    pub fn export_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings.export_path = path.into();
        self
    }

    pub fn image_export_path(mut self, path: impl Into<String>) -> Self {
        self.settings.image_export_path = path.into();
        self
    }

    pub fn translated_export_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings.translated_export_path = path.into();
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.settings.provider_name = Some(name.into());
        self
    }

    pub fn model_name(mut self, model: impl Into<String>) -> Self {
        self.settings.model_name = Some(model.into());
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.settings.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn target_language(mut self, language: impl Into<String>) -> Self {
        self.settings.target_language = language.into();
        self
    }

    pub fn direct_export_after_translation(mut self, v: bool) -> Self {
        self.settings.direct_export_after_translation = v;
        self
    }

    pub fn translated_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.settings.translated_file_prefix = prefix.into();
        self
    }

    pub fn blog_path(mut self, path: impl Into<String>) -> Self {
        self.settings.blog_path = path.into();
        self
    }

    pub fn cover_path(mut self, path: impl Into<String>) -> Self {
        self.settings.cover_path = path.into();
        self
    }

    /// Use `name` (with `{{title}}` substitution) instead of prompting.
    pub fn default_export_name(mut self, name: impl Into<String>) -> Self {
        self.settings.use_default_export_name = true;
        self.settings.default_export_name = name.into();
        self
    }

    /// Use `name` for `mdimporter` embeds instead of prompting.
    pub fn default_disp_name(mut self, name: impl Into<String>) -> Self {
        self.settings.use_default_disp_name = true;
        self.settings.default_disp_name = name.into();
        self
    }

    /// Build the settings, validating constraints.
    pub fn build(self) -> Result<ExportSettings, ExportError> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}

impl ExportSettings {
    /// Check the constraints every driver relies on.
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.blog_path.trim().is_empty() {
            return Err(ExportError::InvalidConfig("blogPath must not be empty".into()));
        }
        if self.image_export_path.trim().is_empty() {
            return Err(ExportError::InvalidConfig(
                "imageExportPath must not be empty".into(),
            ));
        }
        if self.use_default_export_name && self.default_export_name.trim().is_empty() {
            return Err(ExportError::InvalidConfig(
                "defaultExportName must not be empty when useDefaultExportName is set".into(),
            ));
        }
        if self.use_default_disp_name && self.default_disp_name.trim().is_empty() {
            return Err(ExportError::InvalidConfig(
                "defaultDispName must not be empty when useDefaultDispName is set".into(),
            ));
        }
        Ok(())
    }
}
