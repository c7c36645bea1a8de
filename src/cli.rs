//! Command line arguments

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Find which GitLab projects contain a given branch
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Branch to look for, overrides GITLAB_TARGET_BRANCH and GitLabConfig:TargetBranch
    pub branch: Option<String>,
    /// Directory containing appsettings.json [default: current directory]
    #[arg(short = 'c', long)]
    pub config_dir: Option<PathBuf>,
    /// How progress is displayed [default: terminal, or plain when stdout is not a terminal]
    #[arg(short = 'o', long, value_enum)]
    pub output: Option<OutputFormat>,
    /// Don't scan anything if some projects could not be listed
    #[arg(long, default_value_t = false)]
    pub strict: bool,
}

impl Cli {
    /// The requested output format, or the one fitting stdout
    ///
    /// Pipes and files get [`OutputFormat::Plain`] so that they never receive escape sequences
    pub fn output_format(&self, stdout_is_terminal: bool) -> OutputFormat {
        self.output.unwrap_or(if stdout_is_terminal {
            OutputFormat::Terminal
        } else {
            OutputFormat::Plain
        })
    }
}

/// Available [`Renderer`](crate::render::Renderer)s
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single status line redrawn in place
    Terminal,
    /// One line per event
    Plain,
    /// One JSON object per event
    Json,
}
