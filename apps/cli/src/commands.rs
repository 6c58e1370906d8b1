//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use playground_core::{ContactRelay, Pipeline};
use playground_shared::{AppConfig, FormData, ToolKind, init_config, load_config, load_config_from};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Playground: AI tools for extraction, repurposing, company scouting and code translation.
#[derive(Parser)]
#[command(
    name = "playground",
    version,
    about = "Run the AI playground tools from the command line.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file to use instead of ~/.playground/playground.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Translate direction as accepted on the command line.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum ModeArg {
    ToCode,
    Explain,
}

impl ModeArg {
    fn as_form_value(self) -> &'static str {
        match self {
            Self::ToCode => "to-code",
            Self::Explain => "explain",
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Extract structured records from unstructured text.
    Extract {
        /// Text to analyze.
        #[arg(long, conflicts_with = "text_file", required_unless_present = "text_file")]
        text: Option<String>,

        /// Read the text to analyze from a file.
        #[arg(long)]
        text_file: Option<PathBuf>,

        /// Comma-separated field names, e.g. "Name, Email, Company".
        #[arg(long)]
        fields: String,
    },

    /// Turn a web page into a tweet, LinkedIn post and newsletter blurb.
    Repurpose {
        /// Page URL.
        url: String,
    },

    /// Analyze a company from its homepage.
    Scout {
        /// Company homepage URL.
        url: String,
    },

    /// Turn a request into code, or explain a piece of code.
    Translate {
        /// Direction of the translation.
        #[arg(long, value_enum, default_value = "explain")]
        mode: ModeArg,

        /// Natural-language request or code.
        input: String,
    },

    /// Send a contact inquiry through the email relay.
    Contact {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        /// consultation, development, legacy, or other.
        #[arg(long = "type")]
        inquiry: String,

        #[arg(long)]
        message: String,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr; stdout carries results.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "playground=info",
        1 => "playground=debug",
        _ => "playground=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = cli.config;
    match cli.command {
        Command::Extract {
            text,
            text_file,
            fields,
        } => {
            let text = match (text, text_file) {
                (Some(text), _) => text,
                (None, Some(path)) => read_text_file(&path)?,
                (None, None) => return Err(eyre!("either --text or --text-file is required")),
            };
            let form = FormData::new().with("text", text).with("fields", fields);
            cmd_tool(config_path.as_deref(), ToolKind::Extract, form).await
        }
        Command::Repurpose { url } => {
            let form = FormData::new().with("url", url);
            cmd_tool(config_path.as_deref(), ToolKind::Repurpose, form).await
        }
        Command::Scout { url } => {
            let form = FormData::new().with("url", url);
            cmd_tool(config_path.as_deref(), ToolKind::Scout, form).await
        }
        Command::Translate { mode, input } => {
            let form = FormData::new()
                .with("input", input)
                .with("mode", mode.as_form_value());
            cmd_tool(config_path.as_deref(), ToolKind::Translate, form).await
        }
        Command::Contact {
            name,
            email,
            inquiry,
            message,
        } => {
            let form = FormData::new()
                .with("name", name)
                .with("email", email)
                .with("type", inquiry)
                .with("message", message);
            cmd_contact(config_path.as_deref(), form).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path.as_deref()),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

fn read_text_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).wrap_err_with(|| format!("failed to read {}", path.display()))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_tool(config_path: Option<&Path>, kind: ToolKind, form: FormData) -> Result<ExitCode> {
    let config = resolve_config(config_path)?;
    let pipeline = Pipeline::from_app_config(&config)?;

    info!(tool = %kind, "running tool");

    let token = cancel_on_ctrl_c();
    let spinner = spinner(format!("Running {kind}..."))?;
    let response = pipeline.run_with_cancel(kind, &form, &token).await;
    spinner.finish_and_clear();

    print_json(&response)?;
    Ok(exit_code(response.success))
}

async fn cmd_contact(config_path: Option<&Path>, form: FormData) -> Result<ExitCode> {
    let config = resolve_config(config_path)?;
    let relay = ContactRelay::from_config(&config.contact)?;

    let spinner = spinner("Sending message...".to_string())?;
    let state = relay.send(&form).await;
    spinner.finish_and_clear();

    print_json(&state)?;
    Ok(exit_code(state.success))
}

fn cmd_config_init() -> Result<ExitCode> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<ExitCode> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A token cancelled by the first Ctrl-C.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling request");
            trigger.cancel();
        }
    });
    token
}

fn spinner(message: String) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")?
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    Ok(spinner)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_translate_mode() {
        let cli = Cli::try_parse_from(["playground", "translate", "--mode", "to-code", "emails ending in .edu"])
            .unwrap();
        match cli.command {
            Command::Translate { mode, input } => {
                assert_eq!(mode.as_form_value(), "to-code");
                assert_eq!(input, "emails ending in .edu");
            }
            _ => panic!("expected translate"),
        }
    }

    #[test]
    fn extract_requires_some_text() {
        assert!(Cli::try_parse_from(["playground", "extract", "--fields", "Name"]).is_err());
        assert!(
            Cli::try_parse_from([
                "playground", "extract", "--text", "a", "--text-file", "b.txt", "--fields", "Name"
            ])
            .is_err()
        );
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "playground", "scout", "https://acme.example", "-vv", "--config", "alt.toml",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config.as_deref(), Some(Path::new("alt.toml")));
    }
}
