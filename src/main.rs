//! generate-commit - CLI entry point.

use std::io::IsTerminal;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use generate_commit::commit::{GeneratedMessage, has_staged_changes, synthesize};
use generate_commit::config::{Settings, load_rules};
use generate_commit::error::RepoError;
use generate_commit::git::{GitState, RepoSession, detect};
use generate_commit::init::{InitReport, run_init};
use generate_commit::llm::{GenerationClient, generate_commit_message};

const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// Generate a commit message for the staged changes using an LLM.
#[derive(Parser, Debug)]
#[command(name = "generate-commit")]
#[command(about = "Generate a commit message for the staged changes using an LLM")]
#[command(version)]
struct Cli {
    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the config, rules file and pre-commit hook in this repository
    Init {
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Command::Init { force }) => init(force),
        None => generate().await,
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

async fn generate() -> Result<()> {
    let mut session = RepoSession::new();
    let repo_root = open_root(&mut session)?;

    let repo = session.open().context("Failed to open repository")?;
    let has_changes =
        has_staged_changes(repo).context("Failed to check for staged changes")?;
    if !has_changes {
        bail!("no staged changes found. Please stage your changes using 'git add'");
    }

    let rules = load_rules().unwrap_or_else(|e| {
        eprintln!("Warning: failed to load rules: {}. Proceeding without rules.", e);
        String::new()
    });

    let state = detect(&repo_root).unwrap_or_else(|e| {
        eprintln!(
            "Warning: failed to detect git state: {}. Proceeding with normal state.",
            e
        );
        GitState::Normal
    });
    print_state_banner(&state);

    let diff = synthesize(repo).context("Failed to get diff")?;
    debug!(
        "Diff covers {} files ({} chars, truncated: {})",
        diff.files.len(),
        diff.text.chars().count(),
        diff.truncated
    );

    let settings = Settings::load(&repo_root).context("Failed to load settings")?;
    let client_config = settings.client_config()?;
    let client = GenerationClient::new(client_config)?;

    println!("Generating commit message...");

    let text = generate_commit_message(&client, diff.as_str(), &rules, &state)
        .await
        .context("Failed to generate commit message")?;

    let color = std::io::stdout().is_terminal();
    match GeneratedMessage::classify(&text) {
        GeneratedMessage::SplitSuggestion(suggestion) => {
            println!("\n{}", paint(YELLOW, "AI Suggestion (Split Changes):", color));
            println!("{}", suggestion);
        }
        GeneratedMessage::Commit(message) => {
            println!("\n{}", paint(CYAN, &message, color));
        }
    }

    Ok(())
}

fn init(force: bool) -> Result<()> {
    let mut session = RepoSession::new();
    let repo_root = open_root(&mut session).map_err(|e| {
        e.context("Please run this command from within a git repository")
    })?;

    if force {
        println!("Forcing reinitialization...");
    }

    match run_init(&repo_root, force).context("Failed to initialize repository")? {
        InitReport::AlreadyInitialized => {
            println!("Repository already initialized. Use --force to reinitialize.");
        }
        InitReport::Initialized(summary) => {
            println!("✓ Created {}", display_name(&summary.config_path));
            if summary.rules_created {
                println!("✓ Created {}", display_name(&summary.rules_path));
            } else {
                println!("✓ Rules file already exists");
            }
            println!("✓ Created pre-commit hook");

            println!("\nInitialization complete!");
            println!("Next steps:");
            println!("1. Update .commit-generator-config with your API key if needed");
            println!("2. Customize .git-commit-rules-for-ai with your team's rules");
            println!(
                "3. Stage your changes and commit - the hook will generate your commit message!"
            );
        }
    }

    Ok(())
}

/// Resolve the working tree root, mapping "no repository" to a plain message.
fn open_root(session: &mut RepoSession) -> Result<std::path::PathBuf> {
    match session.repo_root() {
        Ok(root) => Ok(root),
        Err(RepoError::NotARepository { .. }) => bail!("not a git repository"),
        Err(e) => Err(e).context("Failed to check repository status"),
    }
}

fn print_state_banner(state: &GitState) {
    if !state.conflict_mode() {
        return;
    }

    let color = std::io::stderr().is_terminal();
    eprintln!();
    eprintln!(
        "{}",
        paint(YELLOW, &format!("⚠ Git State Detected: {}", state.kind()), color)
    );
    if let Some(message) = state.original_message() {
        eprintln!("{}", paint(YELLOW, &format!("Original message: {}", message), color));
    }
    eprintln!();
}

fn paint(code: &str, text: &str, enabled: bool) -> String {
    if enabled {
        format!("{code}{text}{RESET}")
    } else {
        text.to_string()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
