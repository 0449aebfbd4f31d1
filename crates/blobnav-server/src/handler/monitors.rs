//! Liveness check endpoint.

use axum::Router;
use axum::routing::get;

use crate::extract::Json;
use crate::handler::response::Ack;
use crate::service::ServiceState;

/// Reports that the server is accepting requests.
async fn health() -> Json<Ack> {
    Json(Ack::OK)
}

/// Returns a [`Router`] with the health route.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/health", get(health))
}

#[cfg(test)]
mod test {
    use blobnav_core::backend::InMemoryEnumerator;

    use super::*;
    use crate::handler::test::{create_test_server_with_state, create_test_state};

    #[tokio::test]
    async fn health_is_ok() -> anyhow::Result<()> {
        let state = create_test_state(InMemoryEnumerator::new());
        let server = create_test_server_with_state(routes(), state)?;

        let response = server.get("/health").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Ack>(), Ack::OK);

        Ok(())
    }
}
