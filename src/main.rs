//! devenv-secrets CLI
//!
//! Command-line interface for managing secret profiles in the OS keychain.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use devenv_secrets::config::Config;
use devenv_secrets::store::KeyringStore;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Secret profile manager backed by the OS keychain
#[derive(Parser, Debug)]
#[command(name = "secrets")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// No subcommand prints the current profile name
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Edit a profile in $EDITOR
    Edit {
        /// Profile name (defaults to the current profile)
        name: Option<String>,
    },

    /// Make a profile the default
    Switch {
        /// Profile name to make the default
        name: String,
    },

    /// Show all available profiles
    List,

    /// Delete a profile
    Delete {
        /// Profile name to delete
        name: String,
    },

    /// Copy a profile
    Copy {
        /// Source profile name
        source: String,
        /// Target profile name
        target: String,
    },

    /// Output shell commands to export the profile's variables
    Export,
}

// =============================================================================
// Main
// =============================================================================

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let store = KeyringStore::new();
    let config =
        Config::new(store, None).context("Failed to load profiles from the credential store")?;

    match args.command {
        None => cmd_current(&config),
        Some(Command::Edit { name }) => cmd_edit(&config, name.as_deref()),
        Some(Command::Switch { name }) => cmd_switch(&config, &name),
        Some(Command::List) => cmd_list(&config),
        Some(Command::Delete { name }) => cmd_delete(&config, &name),
        Some(Command::Copy { source, target }) => cmd_copy(&config, &source, &target),
        Some(Command::Export) => cmd_export(&config),
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

fn cmd_current(config: &Config<KeyringStore>) -> Result<()> {
    println!("{}", config.current_profile());
    Ok(())
}

fn cmd_edit(config: &Config<KeyringStore>, name: Option<&str>) -> Result<()> {
    config.edit(name)?;
    Ok(())
}

fn cmd_switch(config: &Config<KeyringStore>, name: &str) -> Result<()> {
    config.switch(name)?;
    Ok(())
}

fn cmd_list(config: &Config<KeyringStore>) -> Result<()> {
    let meta = config.meta()?;
    let current = meta.profiles.first().cloned().unwrap_or_default();

    let mut names = meta.profiles;
    names.sort();
    for name in names {
        if name == current {
            println!("{name}*");
        } else {
            println!("{name}");
        }
    }
    Ok(())
}

fn cmd_delete(config: &Config<KeyringStore>, name: &str) -> Result<()> {
    config.delete(name)?;
    Ok(())
}

fn cmd_copy(config: &Config<KeyringStore>, source: &str, target: &str) -> Result<()> {
    config.copy(source, target)?;
    Ok(())
}

fn cmd_export(config: &Config<KeyringStore>) -> Result<()> {
    for line in config.export_lines() {
        println!("{line}");
    }
    Ok(())
}
