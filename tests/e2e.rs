//! End-to-end integration tests for vault2hugo.
//!
//! Each test builds a throwaway vault and Hugo `content/` directory with
//! `tempfile`, runs the public export API against them and inspects what
//! landed on disk. No network access is needed; translation tests stop at
//! the checks that run before a provider is contacted.
//!
//! Run with:
//!   cargo test --test e2e -- --nocapture

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use vault2hugo::{
    translate_note, BatchSummary, CoverChooser, ExportError, ExportOutcome,
    ExportProgressCallback, ExportSettings, Exporter, FsVault, NamePrompt, NoticeLevel, Vault,
};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Route library logs through the test harness; `RUST_LOG=vault2hugo=debug`
/// with `--nocapture` shows them.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

struct Site {
    _vault_dir: tempfile::TempDir,
    _out_dir: tempfile::TempDir,
    vault_root: PathBuf,
    content: PathBuf,
}

impl Site {
    fn new(files: &[(&str, &[u8])]) -> Self {
        init_tracing();
        let vault_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        for (rel, bytes) in files {
            let path = vault_dir.path().join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, bytes).unwrap();
        }
        Self {
            vault_root: vault_dir.path().to_path_buf(),
            content: out_dir.path().to_path_buf(),
            _vault_dir: vault_dir,
            _out_dir: out_dir,
        }
    }

    fn settings(&self) -> ExportSettings {
        ExportSettings::builder()
            .export_path(&self.content)
            .blog_path("posts")
            .image_export_path("img")
            .default_export_name("{{title}}")
            .build()
            .unwrap()
    }

    fn exporter(&self, settings: ExportSettings) -> (Exporter, Arc<Recorder>) {
        let vault = FsVault::open(&self.vault_root).unwrap();
        let recorder = Arc::new(Recorder::default());
        let exporter = Exporter::new(Arc::new(settings), Arc::new(vault))
            .with_progress(recorder.clone())
            .with_cover_chooser(CoverChooser::with_seed(3));
        (exporter, recorder)
    }

    fn post(&self, rel: &str) -> PathBuf {
        self.content.join("posts").join(rel)
    }
}

#[derive(Default)]
struct Recorder {
    notices: Mutex<Vec<(NoticeLevel, String)>>,
    completed: Mutex<Vec<(String, ExportOutcome)>>,
    summary: Mutex<Option<BatchSummary>>,
}

impl Recorder {
    fn has_notice(&self, level: NoticeLevel, needle: &str) -> bool {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }
}

impl ExportProgressCallback for Recorder {
    fn on_notice(&self, level: NoticeLevel, message: String) {
        self.notices.lock().unwrap().push((level, message));
    }

    fn on_document_complete(
        &self,
        _index: usize,
        _total: usize,
        name: &str,
        outcome: &ExportOutcome,
    ) {
        self.completed
            .lock()
            .unwrap()
            .push((name.to_string(), outcome.clone()));
    }

    fn on_batch_complete(&self, summary: &BatchSummary) {
        *self.summary.lock().unwrap() = Some(summary.clone());
    }
}

struct ClosedPrompt;

#[async_trait]
impl NamePrompt for ClosedPrompt {
    async fn export_file_name(&self, default: &str) -> Result<String, ExportError> {
        Ok(default.to_string())
    }

    async fn display_file_name(&self, _default: &str) -> Result<String, ExportError> {
        Err(ExportError::PromptFailed("dialog closed".into()))
    }
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()))
}

// ── Single export ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_single_export_copies_embedded_image() {
    let site = Site::new(&[
        (
            "My Post.md",
            b"---\nslug: my-post\n---\nLook:\n![[diagram.png]]\n",
        ),
        ("attachments/diagram.png", b"\x89PNG\r\n\x1a\nfake"),
    ]);
    let (exporter, recorder) = site.exporter(site.settings());

    let done = exporter.export_link("My Post").await.unwrap();

    assert_eq!(done.slug, "my-post");
    assert_eq!(done.output_path, site.post("my-post/My Post.md"));
    let text = read(&done.output_path);
    assert!(text.contains("![diagram.png](img/diagram.png)"), "got: {text}");
    assert!(!text.contains("![[diagram.png]]"));
    assert_eq!(
        std::fs::read(site.post("my-post/img/diagram.png")).unwrap(),
        b"\x89PNG\r\n\x1a\nfake"
    );
    assert!(recorder.has_notice(NoticeLevel::Success, "Export succeeded"));
}

#[tokio::test]
async fn test_single_export_converts_every_construct() {
    let site = Site::new(&[
        (
            "Guide.md",
            b"---\nslug: guide\n---\n\
              Energy $E = mc^2$.\n\
              > [!warning] Careful\n\
              > Hot surface\n\
              See [[Setup#Install Steps|install]] and [[#Usage]].\n\
              ```mermaid\n  graph TD\n  A-->B\n```\n",
        ),
        ("notes/Setup.md", b"---\nslug: setup\n---\n# Install Steps\n"),
    ]);
    let (exporter, _) = site.exporter(site.settings());

    let done = exporter.export_link("Guide").await.unwrap();
    let text = read(&done.output_path);

    assert!(text.contains(r"{{< katex >}}\\(E = mc^2\\)"));
    assert!(text.contains(
        r##"{{< alert icon="triangle-exclamation" cardColor="#ffcc00" textColor="#333333" iconColor="#8B6914" >}}"##
    ));
    assert!(text.contains("\nHot surface\n{{< /alert >}}"));
    assert!(!text.contains("Careful"));
    assert!(text.contains(r##"[install]({{< ref "/posts/setup/#Install Steps" >}})"##));
    assert!(text.contains(r##"[Usage]({{< relref "#usage" >}})"##));
    assert!(text.contains("{{< mermaid >}}\ngraph TD\nA-->B\n{{< /mermaid >}}"));
}

#[tokio::test]
async fn test_unresolved_links_are_left_and_reported() {
    let site = Site::new(&[(
        "Post.md",
        b"---\nslug: post\n---\nSee [[Nowhere]] and ![[missing.png]].\n",
    )]);
    let (exporter, recorder) = site.exporter(site.settings());

    let done = exporter.export_link("Post").await.unwrap();
    let text = read(&done.output_path);

    assert!(text.contains("[[Nowhere]]"));
    assert!(text.contains("![[missing.png]]"));
    assert!(recorder.has_notice(NoticeLevel::Warning, "file not found: Nowhere"));
    let image_warnings = recorder
        .notices
        .lock()
        .unwrap()
        .iter()
        .filter(|(_, m)| m.contains("missing.png"))
        .count();
    assert_eq!(image_warnings, 1);
    assert!(!site.post("post/img").exists());
}

#[tokio::test]
async fn test_single_export_without_slug_is_refused() {
    let site = Site::new(&[("Draft.md", b"# no frontmatter\n")]);
    let (exporter, recorder) = site.exporter(site.settings());

    let err = exporter.export_link("Draft").await.unwrap_err();

    assert!(matches!(err, ExportError::MissingSlug { .. }));
    assert!(recorder.has_notice(NoticeLevel::Error, "no slug"));
    assert!(!site.content.join("posts").exists());
}

#[tokio::test]
async fn test_unknown_note_is_reported() {
    let site = Site::new(&[("A.md", b"---\nslug: a\n---\n")]);
    let (exporter, _) = site.exporter(site.settings());
    assert!(matches!(
        exporter.export_link("Nope").await,
        Err(ExportError::NoteNotFound { .. })
    ));
}

#[tokio::test]
async fn test_failing_prompt_exports_original_text() {
    let original = "---\nslug: host\n---\n$x$ and ![[Child]]\n";
    let site = Site::new(&[
        ("Host.md", original.as_bytes()),
        ("Child.md", b"---\nslug: child\n---\n"),
    ]);
    let settings = site.settings();
    let vault = FsVault::open(&site.vault_root).unwrap();
    let recorder = Arc::new(Recorder::default());
    let exporter = Exporter::new(Arc::new(settings), Arc::new(vault))
        .with_prompt(Arc::new(ClosedPrompt))
        .with_progress(recorder.clone());

    let done = exporter.export_link("Host").await.unwrap();

    assert_eq!(read(&done.output_path), original);
    assert!(recorder.has_notice(NoticeLevel::Error, "dialog closed"));
}

#[tokio::test]
async fn test_single_export_picks_cover_once() {
    let site = Site::new(&[("P.md", b"---\nslug: p\n---\nbody\n")]);
    let covers = site.content.join("posts/.featured");
    std::fs::create_dir_all(&covers).unwrap();
    std::fs::write(covers.join("background.svg"), b"<svg bg/>").unwrap();
    std::fs::write(covers.join("one.svg"), b"<svg 1/>").unwrap();
    std::fs::write(covers.join("two.svg"), b"<svg 2/>").unwrap();
    let (exporter, _) = site.exporter(site.settings());

    exporter.export_link("P").await.unwrap();
    let featured = read(&site.post("p/featured.svg"));
    assert_eq!(read(&site.post("p/background.svg")), "<svg bg/>");
    assert!(featured == "<svg 1/>" || featured == "<svg 2/>");

    exporter.export_link("P").await.unwrap();
    assert_eq!(read(&site.post("p/featured.svg")), featured);
}

// ── Batch export ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_batch_counts_missing_slugs_without_creating_dirs() {
    let site = Site::new(&[
        ("a.md", b"---\nslug: alpha\n---\nLinks to [[b]].\n"),
        ("b.md", b"---\nslug: beta\n---\n![[pic.png]]\n"),
        ("c.md", b"no slug here\n"),
        ("d.md", b"---\ntitle: Also missing\n---\n"),
        ("pic.png", b"png-bytes"),
    ]);
    let (exporter, recorder) = site.exporter(site.settings());

    let summary = exporter.export_all().await.unwrap();

    assert_eq!(summary.success, 2);
    assert_eq!(summary.missing_slug, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.total(), 4);

    let mut dirs: Vec<String> = std::fs::read_dir(site.content.join("posts"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    dirs.sort();
    assert_eq!(dirs, vec!["alpha", "beta"]);

    assert!(read(&site.post("alpha/a.md")).contains(r#"[b]({{< ref "/posts/beta/" >}})"#));
    assert_eq!(read(&site.post("beta/b.md")), "---\nslug: beta\n---\n![pic.png](img/pic.png)\n");
    assert_eq!(std::fs::read(site.post("beta/img/pic.png")).unwrap(), b"png-bytes");

    assert_eq!(recorder.completed.lock().unwrap().len(), 4);
    assert_eq!(recorder.summary.lock().unwrap().as_ref(), Some(&summary));
    assert!(recorder.has_notice(NoticeLevel::Info, "Missing slug: 2"));
}

#[tokio::test]
async fn test_batch_continues_after_failed_note() {
    let site = Site::new(&[
        ("a.md", b"---\nslug: alpha\n---\nfirst\n"),
        ("b.md", b"---\nslug: beta\n---\nsecond\n"),
    ]);
    // A plain file where alpha's post directory should go.
    std::fs::create_dir_all(site.content.join("posts")).unwrap();
    std::fs::write(site.post("alpha"), b"in the way").unwrap();
    let (exporter, recorder) = site.exporter(site.settings());

    let summary = exporter.export_all().await.unwrap();

    assert_eq!((summary.success, summary.failed, summary.missing_slug), (1, 1, 0));
    assert!(matches!(
        summary.documents[0],
        (_, ExportOutcome::Failed { .. })
    ));
    assert_eq!(read(&site.post("beta/b.md")), "---\nslug: beta\n---\nsecond\n");
    assert!(recorder.has_notice(NoticeLevel::Info, "Failed: 1"));
}

#[tokio::test]
async fn test_batch_exports_note_with_invalid_utf8() {
    let site = Site::new(&[("Bad.md", b"---\nslug: bad\n---\nbody \xff\xfe here\n")]);
    let (exporter, _) = site.exporter(site.settings());

    let summary = exporter.export_all().await.unwrap();

    assert_eq!((summary.success, summary.failed, summary.missing_slug), (1, 0, 0));
    assert!(read(&site.post("bad/Bad.md")).contains(" here\n"));
}

#[tokio::test]
async fn test_batch_uses_basename_without_default_name() {
    let site = Site::new(&[("Note One.md", b"---\nslug: one\n---\nx\n")]);
    let settings = ExportSettings::builder()
        .export_path(&site.content)
        .build()
        .unwrap();
    let (exporter, _) = site.exporter(settings);

    exporter.export_all().await.unwrap();
    assert!(site.post("one/Note One.md").exists());
}

#[tokio::test]
async fn test_batch_on_empty_vault() {
    let site = Site::new(&[("only.png", b"x")]);
    let (exporter, recorder) = site.exporter(site.settings());

    let summary = exporter.export_all().await.unwrap();
    assert_eq!(summary.total(), 0);
    assert!(recorder.has_notice(NoticeLevel::Info, "No Markdown files"));
}

#[tokio::test]
async fn test_vault_metadata_drives_link_targets() {
    let site = Site::new(&[("deep/nested/Target.md", b"---\nslug: \"42\"\n---\n")]);
    let vault = FsVault::open(&site.vault_root).unwrap();
    let file = vault.resolve_link("Target").unwrap();
    assert_eq!(vault.slug_of(&file).as_deref(), Some("42"));
}

// ── Translation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_translation_requires_output_directory() {
    let site = Site::new(&[("T.md", b"---\nslug: t\n---\nHallo\n")]);
    let (exporter, recorder) = site.exporter(site.settings());
    let note = exporter.vault().resolve_link("T").unwrap();

    let err = translate_note(&exporter, None, &note).await.unwrap_err();

    assert!(matches!(
        err,
        ExportError::MissingSetting {
            setting: "translatedExportPath",
            ..
        }
    ));
    assert!(recorder.has_notice(NoticeLevel::Error, "translatedExportPath"));
}
