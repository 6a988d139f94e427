//! Migrate command - schema management for the pool governance database.

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, MigrationState};

/// Execute the migrate command
pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    if let MigrateAction::Fresh { yes } = args.action {
        guard_fresh(yes, !cfg!(debug_assertions))?;
    }

    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    match args.action {
        MigrateAction::Up => {
            let applied = db.apply_pending().await.map_err(migration_failed)?;
            tracing::info!(applied, "Schema up to date");
        }
        MigrateAction::Down { steps } => {
            db.roll_back(steps).await.map_err(migration_failed)?;
            tracing::info!(steps, "Rolled back");
        }
        MigrateAction::Status => {
            let states = db.migration_states().await.map_err(migration_failed)?;
            println!("{}", render_status(&states));
        }
        MigrateAction::Fresh { .. } => {
            tracing::warn!("Dropping all tables, including the admin audit log");
            db.reset_schema().await.map_err(migration_failed)?;
            tracing::info!("Schema rebuilt from scratch");
        }
    }

    Ok(())
}

fn migration_failed(err: sea_orm::DbErr) -> AppError {
    AppError::internal(format!("Migration failed: {}", err))
}

/// `fresh` destroys the audit trail; outside debug builds it needs `--yes`.
fn guard_fresh(confirmed: bool, release_build: bool) -> AppResult<()> {
    if release_build && !confirmed {
        return Err(AppError::BadRequest(
            "migrate fresh drops every table including the audit log; re-run with --yes".to_string(),
        ));
    }
    Ok(())
}

fn render_status(states: &[MigrationState]) -> String {
    let width = states.iter().map(|s| s.name.len()).max().unwrap_or(0);
    let pending = states.iter().filter(|s| !s.applied).count();

    let mut out = String::new();
    for state in states {
        let label = if state.applied { "applied" } else { "pending" };
        out.push_str(&format!("{:<width$}  {}\n", state.name, label, width = width));
    }
    out.push_str(&format!("{} of {} pending", pending, states.len()));
    out
}
