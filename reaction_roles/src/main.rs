//! reaction-roles: administrative CLI for reaction-for-role mappings
//!
//! Loads the mapping file, applies one command, and saves the file back
//! (skipped when nothing changed).

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reaction_roles::role_mappings::{GuildId, MessageId, RoleId};
use reaction_roles::{telemetry, Config, ReactionRoles};
use tracing::info;

#[derive(Parser)]
#[command(name = "reaction-roles")]
#[command(about = "Manage reaction-for-role mappings")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "reaction-roles.toml")]
    config: PathBuf,

    /// Mapping file (overrides config file)
    #[arg(short, long, env = "REACTION_ROLES_MAPPINGS")]
    mappings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Map a message to the role its reactions grant
    Add { guild: u64, message: u64, role: u64 },
    /// Remove a mapping if it still grants the given role
    Remove { guild: u64, message: u64, role: u64 },
    /// Show the role mapped to a message
    Get { guild: u64, message: u64 },
    /// List mappings, optionally for one guild
    List {
        #[arg(long)]
        guild: Option<u64>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;
    if let Some(mappings) = cli.mappings {
        config.storage.path = mappings;
    }

    telemetry::init(&config.logging.filter);
    info!(path = %config.storage.path.display(), "Using mapping file");

    let roles = ReactionRoles::start(&config);
    let store = roles.store();

    match cli.command {
        Command::Add { guild, message, role } => {
            match store.add_mapping(GuildId(guild), MessageId(message), RoleId(role)) {
                Some(previous) => {
                    println!("Mapped message {message} to role {role} (was {previous})")
                }
                None => println!("Mapped message {message} to role {role}"),
            }
        }
        Command::Remove { guild, message, role } => {
            if store.remove_mapping(GuildId(guild), MessageId(message), RoleId(role)) {
                println!("Removed mapping for message {message}");
            } else {
                println!("No mapping from message {message} to role {role}; nothing changed");
            }
        }
        Command::Get { guild, message } => {
            match store.get_mapping(GuildId(guild), MessageId(message)) {
                Some(role) => println!("{role}"),
                None => println!("No mapping for message {message}"),
            }
        }
        Command::List { guild } => {
            for record in store.snapshot() {
                if guild.is_some_and(|g| g != record.guild.get()) {
                    continue;
                }
                println!("guild {}", record.guild);
                for entry in &record.entries {
                    println!("  message {} -> role {}", entry.message, entry.role);
                }
            }
        }
    }

    roles.save()?;
    Ok(())
}
