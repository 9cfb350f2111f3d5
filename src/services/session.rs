// src/services/session.rs
use tracing::{info, warn};
use uuid::Uuid;

use crate::{config::SessionSource, services::backend::HttpBackend};

pub fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Resolves the identifier sent with every request. A `server` source that
/// cannot be reached degrades to a locally generated id.
pub async fn resolve_session(source: &SessionSource, backend: &HttpBackend) -> String {
    match source {
        SessionSource::Fixed(id) => id.clone(),
        SessionSource::Generate => generate_session_id(),
        SessionSource::Server => match backend.open_session().await {
            Ok(id) if !id.trim().is_empty() => {
                info!(session_id = %id, "session issued by server");
                id
            }
            Ok(_) => {
                warn!("server issued an empty session id, generating one locally");
                generate_session_id()
            }
            Err(e) => {
                warn!(error = %e, "could not open a server session, generating one locally");
                generate_session_id()
            }
        },
    }
}
