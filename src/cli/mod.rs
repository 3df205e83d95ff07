//! CLI argument definitions for apiscope.

use clap::{Parser, Subcommand};

/// apiscope - index, search, and query API documentation.
///
/// Keeps a per-project registry of OpenAPI specification sources in
/// `apiscope.ini`. Start with `apiscope init`.
#[derive(Parser, Debug)]
#[command(name = "apiscope")]
#[command(author, version, long_version = long_version(), about = "Manage the API specifications available to a project", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Use <path> as the project root instead of discovering it.
    /// The path must exist. Bypasses root detection - uses the path literally.
    /// Can also be set via APISCOPE_ROOT environment variable.
    #[arg(short = 'C', long = "root", global = true, env = "APISCOPE_ROOT")]
    pub root: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize apiscope for this project
    ///
    /// Creates apiscope.ini and the .apiscope/ cache directory, and makes sure
    /// the cache directory is ignored by git. Safe to run repeatedly.
    Init,

    /// List configured API specifications
    List,

    /// Add an API specification
    Add {
        /// Unique name for the specification
        name: String,

        /// Local file (./api/openapi.yaml) or URL (https://...)
        source: String,
    },

    /// Remove an API specification
    #[command(alias = "rm")]
    Remove {
        /// Name of the specification to remove
        name: String,
    },

    /// Show a single API specification
    Show {
        /// Name of the specification
        name: String,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (commit ",
        env!("APISCOPE_GIT_COMMIT"),
        ", built ",
        env!("APISCOPE_BUILD_TIMESTAMP"),
        ")"
    )
}
