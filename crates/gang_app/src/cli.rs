use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "gang")]
#[command(about = "Drive the Gang boardroom from the terminal", version)]
pub struct Cli {
    /// Config file (RON); defaults to the user config directory
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Backend base URL, overrides config and GANG_BACKEND_URL
    #[arg(long, global = true)]
    pub backend_url: Option<String>,
    /// Log debug output to the terminal
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Show debate status
    Status,
    /// Print the debate transcript
    Transcript {
        /// Emit sanitized HTML instead of speaker-tagged lines
        #[arg(long)]
        html: bool,
    },
    /// Start a boardroom debate with a prompt
    Debate {
        #[arg(required = true, trailing_var_arg = true)]
        prompt: Vec<String>,
    },
    /// Interrupt the running debate
    Abort {
        #[arg(trailing_var_arg = true)]
        reason: Vec<String>,
    },
    /// Clear the boardroom
    Clear,
    /// List registered agents
    Agents,
    /// Enable or disable an agent
    Toggle { name: String },
    /// Reset every agent to its initial state
    ResetAgents,
    /// Show diagnostics for one agent
    Diagnose { name: String },
    /// Show the Gang roster and emergency routing
    Roster,
    /// Upload a file in chunks for agent routing
    Upload { path: PathBuf },
    /// Save the current transcript to boardroom-archive.txt
    Archive,
    /// Live dashboard; reads commands from stdin
    Watch,
}
