use clap::{Parser, Subcommand};

/// CLI arguments for the codemind assistant.
#[derive(Parser, Debug, PartialEq, Clone)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Question or instruction for the AI.
    #[arg(short, long)]
    pub query: Option<String>,

    /// File currently open in the editor.
    #[arg(short, long)]
    pub file: Option<String>,

    /// Files or directories to attach as context.
    #[arg(short, long, num_args = 1.., value_delimiter = '&')]
    pub context: Vec<String>,

    /// Paths to leave out when expanding context directories.
    #[arg(short, long, num_args = 1.., value_delimiter = '&')]
    pub ignore: Vec<String>,

    /// Workspace root used to resolve project-relative filenames.
    #[arg(short, long)]
    pub workspace: Option<String>,

    /// Show a diff for every proposed file change.
    #[arg(long)]
    pub preview: bool,

    /// Apply proposed changes to disk.
    #[arg(short, long)]
    pub apply: bool,

    /// Use the local model for this run regardless of config.
    #[arg(long)]
    pub local: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for the codemind assistant.
#[derive(Subcommand, Debug, PartialEq, Clone)]
pub enum Commands {
    /// Manage configuration options.
    Config {
        /// Set the log level (off, error, warn, info, debug).
        #[arg(long)]
        set_log_level: Option<String>,

        /// Set the default fence language for the open file.
        #[arg(long)]
        set_language: Option<String>,

        /// Enable or disable .backup snapshots before overwriting files.
        #[arg(long)]
        set_backup: Option<bool>,
    },

    /// Manage model configuration options.
    ModelConfig {
        /// Set the API key for the remote model.
        #[arg(long)]
        set_api_key: Option<String>,

        /// Set the remote model name.
        #[arg(long)]
        set_remote_model: Option<String>,

        /// Set the local model name.
        #[arg(long)]
        set_local_model: Option<String>,

        /// Use the local model by default.
        #[arg(long, conflicts_with = "use_remote")]
        use_local: bool,

        /// Use the remote model by default.
        #[arg(long)]
        use_remote: bool,
    },

    /// Rollback changes made by the last run.
    Rollback {
        /// Workspace root the changes were applied under.
        #[arg(short, long)]
        workspace: Option<String>,
    },
}
