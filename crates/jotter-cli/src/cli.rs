use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "jotter")]
#[command(about = "Rich-text notes with live sync and read-only share links")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// CLI profile name for Firebase configuration and session
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new note (opens $EDITOR when no text is given)
    New {
        /// Note title (plain text)
        #[arg(short, long)]
        title: Option<String>,
        /// Note body (plain text)
        #[arg(short, long)]
        content: Option<String>,
    },
    /// List your notes, most recently updated first
    List {
        /// Number of notes to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the note list every time it changes, until Ctrl-C
    Watch {
        /// Number of notes to show per update
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
    /// Edit an existing note (opens $EDITOR on the raw markup when no text is given)
    Edit {
        /// Note ID or unique ID prefix
        id: String,
        /// Replacement title (plain text)
        #[arg(short, long)]
        title: Option<String>,
        /// Replacement body (plain text)
        #[arg(short, long)]
        content: Option<String>,
    },
    /// Show a note read-only, by ID or share link
    Show {
        /// Note ID or share link
        target: String,
        /// Print sanitized markup instead of plain text
        #[arg(long)]
        raw: bool,
    },
    /// Print the read-only share link for a note
    Share {
        /// Note ID or unique ID prefix
        id: String,
        /// Open the link in the default browser
        #[arg(long)]
        open: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Sign in, sign up, or sign out a CLI profile
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update profile config
    Init {
        /// Profile name to initialize
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Firebase web API key
        #[arg(long, value_name = "KEY")]
        api_key: Option<String>,
        /// Firebase project id
        #[arg(long, value_name = "ID")]
        project_id: Option<String>,
        /// Firestore database id
        #[arg(long, value_name = "ID")]
        database: Option<String>,
        /// Firestore collection holding notes
        #[arg(long, value_name = "NAME")]
        collection: Option<String>,
        /// Web app URL share links point at
        #[arg(long, value_name = "URL")]
        share_base_url: Option<String>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Sign in with email/password and store the session in the keychain
    Login {
        /// Optional profile override
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Create an account and sign in
    Signup {
        /// Optional profile override
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Show auth status for profile
    Status {
        /// Optional profile override
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
    },
    /// Sign out profile and clear stored session
    Logout {
        /// Optional profile override
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
    },
}
