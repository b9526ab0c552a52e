use tracing::warn;

use crate::{dto::health::HealthStatus, state::SharedState};

/// Report whether requests can currently reach storage, pinging it when it is installed.
pub async fn health_status(state: &SharedState) -> HealthStatus {
    match state.require_game_store().await {
        Ok(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "storage health check failed");
                return HealthStatus::Degraded;
            }
        }
        Err(_) => warn!("storage unavailable (degraded mode)"),
    }

    if state.is_degraded() {
        HealthStatus::Degraded
    } else {
        HealthStatus::Ok
    }
}
