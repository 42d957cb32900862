//! CLI binary for vault2hugo.
//!
//! A thin shim over the library crate that maps CLI flags onto
//! `ExportSettings`, answers name questions on the terminal and renders
//! notices and batch progress.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use vault2hugo::{
    translate_note, BatchSummary, ExportError, ExportOutcome, ExportProgressCallback,
    ExportSettings, Exporter, FsVault, NamePrompt, NoticeLevel, UseDefaultsPrompt, Vault,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── Terminal reporter using indicatif ────────────────────────────────────────

/// Prints notices to stderr and, for batch runs, drives a progress bar.
struct CliReporter {
    /// `None` when progress output is disabled.
    bar: Option<ProgressBar>,
    quiet: bool,
}

impl CliReporter {
    fn new(show_progress: bool, quiet: bool) -> Arc<Self> {
        let bar = show_progress.then(|| {
            let bar = ProgressBar::new(0);
            bar.set_style(
                ProgressStyle::with_template(
                    "{spinner:.cyan} {prefix:.bold}  \
                     [{bar:42.green/238}] {pos:>4}/{len} notes  {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏  ")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
            );
            bar.set_prefix("Exporting");
            bar
        });
        Arc::new(Self { bar, quiet })
    }

    fn line(&self, text: String) {
        match self.bar {
            Some(ref bar) if !bar.is_hidden() && bar.length().unwrap_or(0) > 0 => bar.println(text),
            _ => eprintln!("{text}"),
        }
    }
}

impl ExportProgressCallback for CliReporter {
    fn on_notice(&self, level: NoticeLevel, message: String) {
        if self.quiet && level != NoticeLevel::Error {
            return;
        }
        let text = match level {
            NoticeLevel::Info => format!("{} {}", cyan("◆"), message),
            NoticeLevel::Success => format!("{} {}", green("✔"), message),
            NoticeLevel::Warning => format!("{} {}", yellow("⚠"), message),
            NoticeLevel::Error => format!("{} {}", red("✘"), message),
        };
        self.line(text);
    }

    fn on_batch_start(&self, total: usize) {
        if let Some(ref bar) = self.bar {
            bar.set_length(total as u64);
            bar.enable_steady_tick(Duration::from_millis(80));
        }
    }

    fn on_document_start(&self, _index: usize, _total: usize, name: &str) {
        if let Some(ref bar) = self.bar {
            bar.set_message(name.to_string());
        }
    }

    fn on_document_complete(
        &self,
        index: usize,
        total: usize,
        name: &str,
        outcome: &ExportOutcome,
    ) {
        let mark = match outcome {
            ExportOutcome::Success { .. } => green("✓"),
            ExportOutcome::MissingSlug => yellow("–"),
            ExportOutcome::Failed { .. } => red("✗"),
        };
        let detail = match outcome {
            ExportOutcome::Success { output_path } => dim(&output_path.display().to_string()),
            ExportOutcome::MissingSlug => dim("no slug, skipped"),
            ExportOutcome::Failed { error } => red(&truncate(error, 80)),
        };
        if !self.quiet {
            self.line(format!("  {mark} {index:>4}/{total:<4} {name}  {detail}"));
        }
        if let Some(ref bar) = self.bar {
            bar.inc(1);
        }
    }

    fn on_batch_complete(&self, _summary: &BatchSummary) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let cut: String = s.chars().take(max - 1).collect();
        format!("{cut}\u{2026}")
    } else {
        s.to_string()
    }
}

// ── Terminal name prompt ─────────────────────────────────────────────────────

/// Asks on stderr and reads the answer from stdin. Empty answers take the
/// default. Questions are serialised because links resolve concurrently.
struct StdinPrompt {
    lock: tokio::sync::Mutex<()>,
}

impl StdinPrompt {
    fn new() -> Self {
        Self {
            lock: tokio::sync::Mutex::new(()),
        }
    }

    async fn ask(&self, question: String, default: &str) -> Result<String, ExportError> {
        let _guard = self.lock.lock().await;
        let default = default.to_string();
        tokio::task::spawn_blocking(move || {
            eprint!("{question} [{default}]: ");
            io::stderr().flush().ok();
            let mut answer = String::new();
            io::stdin()
                .lock()
                .read_line(&mut answer)
                .map_err(|e| ExportError::PromptFailed(e.to_string()))?;
            let answer = answer.trim();
            Ok(if answer.is_empty() {
                default
            } else {
                answer.to_string()
            })
        })
        .await
        .map_err(|e| ExportError::PromptFailed(e.to_string()))?
    }
}

#[async_trait]
impl NamePrompt for StdinPrompt {
    async fn export_file_name(&self, default: &str) -> Result<String, ExportError> {
        self.ask(format!("{} Output file name (without .md)", cyan("?")), default)
            .await
    }

    async fn display_file_name(&self, default: &str) -> Result<String, ExportError> {
        self.ask(format!("{} File to embed for this note", cyan("?")), default)
            .await
    }
}

fn confirm(question: &str) -> Result<bool> {
    eprint!("{} {question} [y/N]: ", cyan("?"));
    io::stderr().flush().ok();
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

// ── CLI definition ───────────────────────────────────────────────────────────

const AFTER_HELP: &str = r#"EXAMPLES:
  # Export one note (asks for the output file name)
  vault2hugo --vault ~/notes export "My Post"

  # Export the whole vault without questions
  vault2hugo --vault ~/notes --non-interactive export-all --yes

  # Batch export with a JSON summary
  vault2hugo export-all --yes --json > summary.json

  # Translate a note, then export the translation next to the original
  vault2hugo translate "My Post"

  # Write a settings file with every default
  vault2hugo config init

OUTPUT LAYOUT:
  EXPORT/BLOG/SLUG/NAME.md           converted note
  EXPORT/BLOG/SLUG/IMAGES/FILE       copied image embeds
  EXPORT/BLOG/SLUG/background.svg    copied from EXPORT/BLOG/COVER
  EXPORT/BLOG/SLUG/featured.EXT      random pick from EXPORT/BLOG/COVER

ENVIRONMENT VARIABLES:
  VAULT2HUGO_VAULT        Vault directory
  VAULT2HUGO_CONFIG       Settings file (camelCase JSON)
  VAULT2HUGO_EXPORT_PATH  Override exportPath
  OPENAI_API_KEY          OpenAI API key (translation)
  ANTHROPIC_API_KEY       Anthropic API key (translation)
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  RUST_LOG                Log filter, e.g. vault2hugo=debug
"#;

#[derive(Parser, Debug)]
#[command(
    name = "vault2hugo",
    version,
    about = "Export an Obsidian vault to a Hugo site with the Blowfish theme",
    long_about = "Rewrite Obsidian notes (callouts, math, mermaid, wiki-links, image embeds) into \
Hugo/Blowfish shortcodes, copy images next to each post, pick a cover, and optionally translate \
notes with an LLM.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Vault directory.
    #[arg(long, env = "VAULT2HUGO_VAULT", default_value = ".", global = true)]
    vault: PathBuf,

    /// Settings file. Default: the exporter plugin's data.json inside the vault.
    #[arg(long, env = "VAULT2HUGO_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Override the Hugo `content/` directory.
    #[arg(long, env = "VAULT2HUGO_EXPORT_PATH", global = true)]
    export_path: Option<PathBuf>,

    /// Override the LLM provider used for translation.
    #[arg(long, env = "EDGEQUAKE_PROVIDER", global = true)]
    provider: Option<String>,

    /// Override the translation model.
    #[arg(long, global = true)]
    model: Option<String>,

    /// Never prompt; use the configured or offered defaults.
    #[arg(long, env = "VAULT2HUGO_NON_INTERACTIVE", global = true)]
    non_interactive: bool,

    #[arg(long, env = "VAULT2HUGO_NO_PROGRESS", global = true)]
    no_progress: bool,

    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export one note, named like a wiki-link (`My Post` or `folder/My Post`).
    Export { note: String },

    /// Export every note of the vault.
    ExportAll {
        /// Skip the confirmation question.
        #[arg(short, long)]
        yes: bool,

        /// Print the batch summary as JSON on stdout.
        #[arg(long)]
        json: bool,
    },

    /// Translate one note into the configured target language.
    Translate { note: String },

    /// Manage the settings file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Write a settings file containing every default.
    Init {
        /// Replace an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Print the effective settings.
    Show,
}

fn default_config_path(vault: &Path) -> PathBuf {
    vault
        .join(".obsidian")
        .join("plugins")
        .join("hugo-blowfish-exporter")
        .join("data.json")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let is_batch = matches!(cli.command, Command::ExportAll { .. });
    let json = matches!(cli.command, Command::ExportAll { json: true, .. });
    let show_progress = is_batch && !cli.quiet && !cli.no_progress && !json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Settings ─────────────────────────────────────────────────────────
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| default_config_path(&cli.vault));
    let settings = load_settings(&cli, &config_path)?;

    if let Command::Config { ref action } = cli.command {
        return match action {
            ConfigAction::Init { force } => {
                if config_path.exists() && !force {
                    bail!(
                        "{} already exists (use --force to overwrite)",
                        config_path.display()
                    );
                }
                ExportSettings::default()
                    .save(&config_path)
                    .context("Failed to write settings")?;
                eprintln!("{} Wrote {}", green("✔"), bold(&config_path.display().to_string()));
                Ok(())
            }
            ConfigAction::Show => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&settings).context("Failed to serialise settings")?
                );
                Ok(())
            }
        };
    }

    // ── Vault + exporter ─────────────────────────────────────────────────
    let vault = FsVault::load(&cli.vault)
        .await
        .with_context(|| format!("Failed to open vault {}", cli.vault.display()))?;
    let vault: Arc<dyn Vault> = Arc::new(vault);

    let reporter = CliReporter::new(show_progress, cli.quiet || json);
    let prompt: Arc<dyn NamePrompt> = if cli.non_interactive {
        Arc::new(UseDefaultsPrompt)
    } else {
        Arc::new(StdinPrompt::new())
    };
    let exporter = Exporter::new(Arc::new(settings), Arc::clone(&vault))
        .with_prompt(prompt)
        .with_progress(reporter);

    // ── Run command ──────────────────────────────────────────────────────
    match cli.command {
        Command::Export { ref note } => {
            exporter.export_link(note).await.context("Export failed")?;
        }
        Command::ExportAll { yes, json } => {
            let total = vault.markdown_files().len();
            if !yes && !cli.non_interactive && total > 0 {
                let question = format!(
                    "Export all {total} notes to {}?",
                    exporter.settings().content_dir().display()
                );
                if !confirm(&question)? {
                    eprintln!("{}", dim("Cancelled."));
                    return Ok(());
                }
            }

            let summary = exporter.export_all().await.context("Batch export failed")?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
                );
            }
            if summary.failed > 0 {
                bail!("{} of {} notes failed to export", summary.failed, summary.total());
            }
        }
        Command::Translate { ref note } => {
            let file = vault
                .resolve_link(note)
                .ok_or_else(|| ExportError::NoteNotFound { link: note.clone() })?;
            let translation = translate_note(&exporter, None, &file)
                .await
                .context("Translation failed")?;
            if !cli.quiet {
                eprintln!(
                    "{}  {}  →  {}",
                    green("✔"),
                    translation.title,
                    bold(&translation.translated_path.display().to_string())
                );
            }
        }
        // Handled before the vault is opened.
        Command::Config { .. } => {}
    }

    Ok(())
}

/// Load the settings file and apply CLI / environment overrides.
fn load_settings(cli: &Cli, path: &Path) -> Result<ExportSettings> {
    let mut settings = ExportSettings::load(path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;

    if let Some(ref p) = cli.export_path {
        settings.export_path = p.clone();
    }
    if let Some(ref p) = cli.provider {
        settings.provider_name = Some(p.clone());
    }
    if let Some(ref m) = cli.model {
        settings.model_name = Some(m.clone());
    }
    if cli.non_interactive {
        settings.use_default_export_name = true;
        settings.use_default_disp_name = true;
    }
    if settings.export_path.as_os_str().is_empty() {
        settings.export_path = PathBuf::from(".");
    }

    settings.validate().context("Invalid settings")?;
    Ok(settings)
}
