use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use consistency_core::config_file::{self, ConfigFile};
use consistency_core::{
    AiProviderOverrides, AnalysisRequest, Config, IssueFilter, RunEvent, Session, UploadFile,
};
use consistency_reporting::{ExportFormat, Report, export_report};

mod output;

use output::ColorMode;

/// Paper Consistency Checker - Find terminology, logic, and citation/figure
/// inconsistencies in academic papers
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Options shared by every command that renders results.
#[derive(Args, Debug)]
struct DisplayArgs {
    /// Only show issues of one type: all, term, logic, citation_figure
    #[arg(long)]
    filter: Option<IssueFilter>,

    /// Activate the issue with this id and highlight its sentence
    #[arg(long)]
    select: Option<String>,

    /// Write a report of the full result set to this path
    #[arg(long)]
    export: Option<PathBuf>,

    /// Report format: md, json, or text
    #[arg(long, default_value = "md")]
    format: ExportFormat,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a paper (PDF, Word, LaTeX, or text) and show the consistency issues found
    Analyze {
        /// Path to the paper to analyze
        file_path: Option<PathBuf>,

        #[command(flatten)]
        display: DisplayArgs,

        /// Base URL of the AI provider the backend should use
        #[arg(long)]
        base_url: Option<String>,

        /// Model name for the AI provider
        #[arg(long)]
        model: Option<String>,

        /// API key for the AI provider (sent only when non-empty)
        #[arg(long)]
        api_key: Option<String>,

        /// Analysis backend base URL
        #[arg(long)]
        backend: Option<String>,
    },

    /// Show a built-in sample dataset without contacting the backend
    Demo {
        /// Dataset to load: pdf, word, or latex
        key: String,

        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Check whether the analysis backend is reachable
    Health {
        /// Analysis backend base URL
        #[arg(long)]
        backend: Option<String>,
    },

    /// Inspect the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the merged configuration as TOML
    Show,
    /// Print the platform config file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let file_config = config_file::load_config();

    match cli.command {
        Command::Analyze {
            file_path,
            display,
            base_url,
            model,
            api_key,
            backend,
        } => {
            let config = resolve_config(&file_config, backend, base_url, model, api_key);
            analyze(file_path, display, &file_config, config).await
        }
        Command::Demo { key, display } => demo(&key, display, &file_config),
        Command::Health { backend } => {
            let config = resolve_config(&file_config, backend, None, None, None);
            health(config, &file_config).await
        }
        Command::Config { action } => show_config(action, &file_config),
    }
}

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Resolve configuration: CLI flags > env vars > config file > defaults.
fn resolve_config(
    file: &ConfigFile,
    backend: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
) -> Config {
    resolve_config_with(file, backend, base_url, model, api_key, process_env)
}

/// [`resolve_config`] with the environment read through `env`. Blank values
/// count as unset.
fn resolve_config_with(
    file: &ConfigFile,
    backend: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
    env: impl Fn(&str) -> Option<String>,
) -> Config {
    let env_var = |name: &str| env(name).filter(|v| !v.trim().is_empty());
    let env_secs = |name: &str| env_var(name).and_then(|v| v.trim().parse::<u64>().ok());

    let defaults = Config::default();
    let backend_cfg = file.backend.clone().unwrap_or_default();
    let ai_cfg = file.ai.clone().unwrap_or_default();

    let backend_url = backend
        .or_else(|| env_var("CONSISTENCY_BACKEND_URL"))
        .or(backend_cfg.url)
        .unwrap_or(defaults.backend_url);
    let health_timeout_secs = env_secs("HEALTH_TIMEOUT")
        .or(backend_cfg.health_timeout_secs)
        .unwrap_or(defaults.health_timeout_secs);
    let request_timeout_secs = env_secs("REQUEST_TIMEOUT")
        .or(backend_cfg.request_timeout_secs)
        .unwrap_or(defaults.request_timeout_secs);

    let base_url = base_url
        .or_else(|| env_var("GLM_BASE_URL"))
        .or(ai_cfg.base_url)
        .unwrap_or_default();
    let model = model
        .or_else(|| env_var("GLM_MODEL"))
        .or(ai_cfg.model)
        .unwrap_or_default();
    let api_key = api_key
        .or_else(|| env_var("GLM_API_KEY"))
        .or(ai_cfg.api_key);

    let config = Config {
        backend_url,
        health_timeout_secs,
        request_timeout_secs,
        ai: AiProviderOverrides::new(&base_url, &model, api_key.as_deref()),
    };
    tracing::debug!(?config, "resolved configuration");
    config
}

fn color_mode(display: &DisplayArgs, file: &ConfigFile) -> ColorMode {
    let configured = file
        .display
        .as_ref()
        .and_then(|d| d.color)
        .unwrap_or(true);
    ColorMode(!display.no_color && configured)
}

/// Filter from the flag, else the config file, else all.
fn initial_filter(display: &DisplayArgs, file: &ConfigFile) -> anyhow::Result<IssueFilter> {
    if let Some(filter) = display.filter {
        return Ok(filter);
    }
    match file.display.as_ref().and_then(|d| d.filter.as_deref()) {
        Some(code) => IssueFilter::from_code(code)
            .ok_or_else(|| anyhow::anyhow!("Invalid filter '{}' in config file", code)),
        None => Ok(IssueFilter::All),
    }
}

/// Apply filter and selection, print the view, and write the report if asked.
fn present(session: &Session, display: &DisplayArgs, file: &ConfigFile) -> anyhow::Result<()> {
    let color = color_mode(display, file);
    session.set_filter(initial_filter(display, file)?);
    if let Some(ref issue_id) = display.select
        && !session.select_issue(issue_id)
    {
        anyhow::bail!("Issue '{}' is not in the displayed list", issue_id);
    }

    let mut writer = std::io::stdout();
    output::print_view(&mut writer, &session.view(), color)?;

    if let Some(ref path) = display.export {
        let report = Report::from_state(&session.snapshot());
        write_report(&report, display.format, path)?;
        writeln!(writer)?;
        writeln!(writer, "{} report written to {}", display.format, path.display())?;
    }
    Ok(())
}

fn write_report(report: &Report, format: ExportFormat, path: &Path) -> anyhow::Result<()> {
    // A directory target gets the default file name.
    let target = if path.is_dir() {
        path.join(format.default_file_name())
    } else {
        path.to_path_buf()
    };
    export_report(report, format, &target).map_err(|e| anyhow::anyhow!(e))
}

async fn analyze(
    file_path: Option<PathBuf>,
    display: DisplayArgs,
    file_config: &ConfigFile,
    config: Config,
) -> anyhow::Result<()> {
    let color = color_mode(&display, file_config);
    let session = config.session();

    let file = match file_path {
        Some(ref path) => {
            if !path.exists() {
                anyhow::bail!("File not found: {}", path.display());
            }
            Some(UploadFile::from_path(path).await?)
        }
        None => None,
    };

    let bar = indicatif::ProgressBar::new(100);
    bar.set_style(
        indicatif::ProgressStyle::with_template(
            "{spinner:.cyan} {msg} [{bar:40.cyan/dim}] {pos}%",
        )?
        .progress_chars("=> "),
    );
    bar.enable_steady_tick(Duration::from_millis(120));

    let request = AnalysisRequest {
        file,
        ai: config.ai.clone(),
    };
    let result = session
        .run_analysis(request, |event| match event {
            RunEvent::Progress(value) => bar.set_position(u64::from(value)),
            RunEvent::Phase(phase) => bar.set_message(phase.label()),
        })
        .await;
    bar.finish_and_clear();

    if let Err(err) = result {
        let mut stderr = std::io::stderr();
        output::print_status(&mut stderr, session.snapshot().status(), color)?;
        anyhow::bail!(err);
    }

    present(&session, &display, file_config)
}

fn demo(key: &str, display: DisplayArgs, file_config: &ConfigFile) -> anyhow::Result<()> {
    // The demo never touches the network, so the default backend is fine.
    let session = Config::default().session();
    if !session.load_demo(key) {
        anyhow::bail!(
            "Unknown demo dataset '{}'. Choose one of: {}",
            key,
            consistency_core::demo::DEMO_KEYS.join(", ")
        );
    }
    present(&session, &display, file_config)
}

async fn health(config: Config, file_config: &ConfigFile) -> anyhow::Result<()> {
    let color = ColorMode(
        file_config
            .display
            .as_ref()
            .and_then(|d| d.color)
            .unwrap_or(true),
    );
    let session = config.session();
    report_health(&session, &mut std::io::stdout(), color).await
}

/// Check the backend and print the outcome. An unreachable backend is an error
/// so the process exits non-zero.
async fn report_health(
    session: &Session,
    w: &mut dyn Write,
    color: ColorMode,
) -> anyhow::Result<()> {
    let outcome = session.check_health().await.map_err(|e| e.to_string());
    output::print_health(w, session.backend_url(), &outcome, color)?;
    if let Err(cause) = outcome {
        anyhow::bail!(cause);
    }
    Ok(())
}

fn show_config(action: ConfigAction, file_config: &ConfigFile) -> anyhow::Result<()> {
    match action {
        ConfigAction::Path => match config_file::config_path() {
            Some(path) => println!("{}", path.display()),
            None => anyhow::bail!("Could not determine config directory"),
        },
        ConfigAction::Show => {
            let mut shown = file_config.clone();
            if let Some(ref mut ai) = shown.ai
                && ai.api_key.is_some()
            {
                ai.api_key = Some("***".to_string());
            }
            print!("{}", toml::to_string_pretty(&shown)?);
        }
    }
    Ok(())
}
