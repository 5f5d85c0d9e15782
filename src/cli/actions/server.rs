use crate::api;
use crate::cli::actions::Action;
use anyhow::Result;
use std::time::Duration;

/// Handle the server action
/// # Errors
/// Returns an error if the server fails to start
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            session_timeout_minutes,
        } => {
            api::new(
                port,
                dsn,
                Duration::from_secs(session_timeout_minutes * 60),
            )
            .await?;
        }
    }

    Ok(())
}
