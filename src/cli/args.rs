//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};

/// Pool governance service - pool lifecycle, admin audit trail and notifications
#[derive(Parser, Debug)]
#[command(name = "pool-governance")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),
}

/// Arguments for the serve command; unset values fall back to the environment config
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum MigrateAction {
    /// Apply pending migrations
    Up,
    /// Revert the most recent migrations
    Down {
        /// Number of migrations to revert
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// List every migration with its applied state
    Status,
    /// Drop all tables, audit log included, and re-run every migration
    Fresh {
        /// Confirm the reset; required outside debug builds
        #[arg(long)]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_overrides_are_optional() {
        let cli = Cli::try_parse_from(["pool-governance", "serve"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert!(args.host.is_none());
                assert!(args.port.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    fn migrate_action(argv: &[&str]) -> MigrateAction {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::Migrate(args) => args.action,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn down_reverts_one_step_by_default() {
        assert_eq!(
            migrate_action(&["pool-governance", "migrate", "down"]),
            MigrateAction::Down { steps: 1 }
        );
        assert_eq!(
            migrate_action(&["pool-governance", "migrate", "down", "--steps", "3"]),
            MigrateAction::Down { steps: 3 }
        );
    }

    #[test]
    fn fresh_is_unconfirmed_unless_yes_is_passed() {
        assert_eq!(
            migrate_action(&["pool-governance", "migrate", "fresh"]),
            MigrateAction::Fresh { yes: false }
        );
        assert_eq!(
            migrate_action(&["pool-governance", "migrate", "fresh", "--yes"]),
            MigrateAction::Fresh { yes: true }
        );
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["pool-governance", "migrate", "status", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Migrate(MigrateArgs {
                action: MigrateAction::Status
            })
        ));
    }
}
