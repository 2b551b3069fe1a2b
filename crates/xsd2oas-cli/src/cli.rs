//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API. Long
//! options also accept the single-dash spelling (`-in`, `-out`, `-mask`)
//! that existing scripts use; [`normalize_args`] rewrites those before clap
//! sees them.

use crate::logging::LogFormat;
use clap::{CommandFactory, Parser, ValueEnum};
use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

/// xsd2oas - convert an XML Schema into an OpenAPI 3.0 document
///
/// Reads an XSD, selects the elements the API needs (all mandatory ones plus
/// whatever the optional mask names) and writes the request body schema as
/// OpenAPI YAML, optionally with a sample JSON document.
#[derive(Parser, Debug)]
#[command(name = "xsd2oas", version, author, about, long_about = None)]
pub struct Cli {
    /// XSD file to convert
    #[arg(long = "in", value_name = "XSD")]
    pub input: Option<PathBuf>,

    /// OpenAPI YAML file to write
    #[arg(long = "out", value_name = "YAML")]
    pub output: Option<PathBuf>,

    /// File of element paths to include, one per line
    #[arg(long, value_name = "FILE")]
    pub mask: Option<PathBuf>,

    /// Write a sample JSON document to this file
    #[arg(long = "ex", value_name = "JSON")]
    pub example: Option<PathBuf>,

    /// Write the included leaf element paths to this file (usable as a mask)
    #[arg(long = "path", value_name = "FILE")]
    pub paths: Option<PathBuf>,

    /// Include every optional element and every choice branch
    #[arg(long)]
    pub all: bool,

    /// Lower-case the first letter of element names that have no other capitals
    #[arg(long)]
    pub fixup: bool,

    /// Print each tagged path; repeat to raise log verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Server URL written into the document
    #[arg(long, value_name = "URL")]
    pub domain: Option<String>,

    /// Global element to use as the document root
    #[arg(long, value_name = "ELEMENT")]
    pub root: Option<String>,

    /// Seed for sample value generation
    #[arg(long)]
    pub seed: Option<u64>,

    /// Render every element in the sample document, ignoring the mask
    #[arg(long)]
    pub example_full: bool,

    /// Path to configuration file
    #[arg(short, long, env = "XSD2OAS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Suppress all non-essential output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Log output format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Print shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub generate_completions: Option<Shell>,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse the process arguments, accepting single-dash long options
    pub fn try_parse_args() -> Result<Self, clap::Error> {
        Self::try_parse_from(normalize_args(std::env::args_os()))
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stderr().is_terminal()
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

/// Rewrite `-name` and `-name=value` to `--name` for every known long option
///
/// The program name and anything after a `--` terminator are left alone, as
/// are clustered short flags such as `-vv`.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let command = Cli::command();
    let longs: Vec<&str> = command
        .get_arguments()
        .filter_map(|arg| arg.get_long())
        .chain(["help", "version"])
        .collect();

    let mut terminated = false;
    args.into_iter()
        .map(Into::into)
        .enumerate()
        .map(|(index, arg)| {
            if index == 0 || terminated {
                return arg;
            }
            if arg == "--" {
                terminated = true;
                return arg;
            }
            match arg.to_str() {
                Some(text) if is_legacy_long(text, &longs) => OsString::from(format!("-{}", text)),
                _ => arg,
            }
        })
        .collect()
}

fn is_legacy_long(arg: &str, longs: &[&str]) -> bool {
    let Some(rest) = arg.strip_prefix('-') else {
        return false;
    };
    if rest.starts_with('-') || rest.len() < 2 {
        return false;
    }
    let name = rest.split_once('=').map_or(rest, |(name, _)| name);
    longs.contains(&name)
}
