//! apiscope CLI - manage the API specifications available to a project.

use apiscope::cli::{Cli, Commands};
use apiscope::commands::{self, Output};
use apiscope::config::ConfigSession;
use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Environment variable controlling log verbosity (tracing filter syntax).
const LOG_ENV: &str = "APISCOPE_LOG";

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;

    // Logs go to stderr so JSON on stdout stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli.command, cli.root, human) {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!(r#"{{"error": {}}}"#, json_string(&e.to_string()));
        }
        process::exit(1);
    }
}

fn run(command: Commands, root: Option<PathBuf>, human: bool) -> Result<(), apiscope::Error> {
    let root = resolve_root(root)?;
    let mut session = ConfigSession::open(root.as_deref())?;

    match command {
        Commands::Init => output(&commands::init(&mut session)?, human),
        Commands::List => output(&commands::list(&session)?, human),
        Commands::Add { name, source } => {
            output(&commands::add(&mut session, &name, &source)?, human)
        }
        Commands::Remove { name } => output(&commands::remove(&mut session, &name)?, human),
        Commands::Show { name } => output(&commands::show(&session, &name)?, human),
    }
    Ok(())
}

/// An explicit root (via -C/--root or APISCOPE_ROOT) is used literally but
/// must exist.
fn resolve_root(explicit: Option<PathBuf>) -> Result<Option<PathBuf>, apiscope::Error> {
    match explicit {
        Some(path) if !path.is_dir() => Err(apiscope::Error::InvalidInput(format!(
            "Specified root does not exist: {}",
            path.display()
        ))),
        other => Ok(other),
    }
}

fn json_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
}

fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
