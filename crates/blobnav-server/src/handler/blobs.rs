//! Container credential, listing and search handlers.

use axum::Router;
use axum::extract::State;
use axum::routing::{delete, get, post};
use axum_extra::extract::cookie::CookieJar;
use blobnav_core::engine::ListingEngine;
use blobnav_core::path::ContainerUrl;
use blobnav_core::types::ListingPage;

use crate::extract::{Credential, Json, Query, SessionId};
use crate::handler::request::{ListQuery, SetSasRequest};
use crate::handler::response::Ack;
use crate::handler::{ErrorKind, Result};
use crate::service::{ServiceState, SessionStore};

/// Tracing target for blob browsing operations.
const TRACING_TARGET: &str = "blobnav_server::handler::blobs";

/// Stores the caller's container SAS URL in their session.
#[tracing::instrument(skip_all)]
async fn set_sas(
    State(sessions): State<SessionStore>,
    jar: CookieJar,
    Json(request): Json<SetSasRequest>,
) -> Result<(CookieJar, Json<Ack>)> {
    let sas_url = request.sas_url.trim();
    if sas_url.is_empty() {
        return Err(ErrorKind::BadRequest.with_message("sasUrl is required"));
    }

    let container = ContainerUrl::resolve(sas_url)?;
    let session = SessionId::from_jar(&jar).map(|id| id.0);
    let id = sessions.store(session, sas_url.to_owned()).await;

    tracing::info!(
        target: TRACING_TARGET,
        session_id = %id,
        container = %container,
        has_credential = container.has_credential(),
        "Container credential set"
    );

    Ok((jar.add(SessionId(id).cookie()), Json(Ack::OK)))
}

/// Lists a virtual directory, or searches the container when `search` is set.
#[tracing::instrument(skip_all)]
async fn list_blobs(
    State(engine): State<ListingEngine>,
    credential: Credential,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListingPage>> {
    let cursor = query.cursor();
    let page_size = query.page_size();

    let page = match query.search_term() {
        Some(term) => {
            engine
                .search(credential.as_str(), term, cursor.as_ref(), page_size)
                .await?
        }
        None => {
            engine
                .list_directory(
                    credential.as_str(),
                    query.path.as_deref(),
                    cursor.as_ref(),
                    page_size,
                )
                .await?
        }
    };

    tracing::debug!(
        target: TRACING_TARGET,
        items = page.len(),
        has_next = !page.is_last(),
        "Listing served"
    );

    Ok(Json(page))
}

/// Forgets the caller's stored SAS URL and clears the session cookie.
#[tracing::instrument(skip_all)]
async fn clear_session(
    State(sessions): State<SessionStore>,
    session: Option<SessionId>,
    jar: CookieJar,
) -> (CookieJar, Json<Ack>) {
    if let Some(SessionId(id)) = session {
        let removed = sessions.remove(&id).await;
        tracing::info!(
            target: TRACING_TARGET,
            session_id = %id,
            removed,
            "Session cleared"
        );
    }

    (jar.remove(SessionId::removal_cookie()), Json(Ack::OK))
}

/// Returns a [`Router`] with all blob routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/api/blob/setsas", post(set_sas))
        .route("/api/blob/list", get(list_blobs))
        .route("/api/blob/session", delete(clear_session))
}

#[cfg(test)]
mod test {
    use axum::http::StatusCode;
    use axum_extra::extract::cookie::Cookie;
    use axum_test::TestServer;
    use blobnav_core::backend::{BlobProperties, InMemoryEnumerator};
    use blobnav_core::types::ListingPage;
    use serde_json::json;

    use crate::extract::SESSION_COOKIE;
    use crate::handler::test::{create_test_server, create_test_server_with_state, create_test_state};
    use crate::service::ServiceState;

    const SAS_URL: &str = "https://acct.blob.core.windows.net/docs?sv=2022-11-02&sig=abc";

    fn container() -> InMemoryEnumerator {
        InMemoryEnumerator::new()
            .with_blob(BlobProperties::new("a/b/c.txt").with_content_length(42))
            .with_blob(BlobProperties::new("a/b/d/e.txt"))
            .with_blob(BlobProperties::new("reports/Q1-report.pdf"))
            .with_blob(BlobProperties::new("reports/q2-REPORT.pdf"))
            .with_blob(BlobProperties::new("readme.md"))
    }

    async fn server_with_session() -> anyhow::Result<(TestServer, Cookie<'static>)> {
        let server = create_test_server(container())?;
        let response = server
            .post("/api/blob/setsas")
            .json(&json!({ "sasUrl": format!("  {SAS_URL}  ") }))
            .await;
        response.assert_status_ok();
        let cookie = response.cookie(SESSION_COOKIE);
        Ok((server, cookie))
    }

    #[tokio::test]
    async fn set_sas_sets_session_cookie() -> anyhow::Result<()> {
        let (_, cookie) = server_with_session().await?;
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert!(cookie.value().parse::<uuid::Uuid>().is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn set_sas_rejects_blank_and_malformed() -> anyhow::Result<()> {
        let server = create_test_server(container())?;

        for body in [json!({ "sasUrl": "" }), json!({ "sasUrl": "   " }), json!({})] {
            let response = server.post("/api/blob/setsas").json(&body).await;
            response.assert_status_bad_request();
            let error: serde_json::Value = response.json();
            assert_eq!(error["name"], "bad_request");
        }

        let response = server
            .post("/api/blob/setsas")
            .json(&json!({ "sasUrl": "not a url" }))
            .await;
        response.assert_status_bad_request();

        Ok(())
    }

    #[tokio::test]
    async fn list_requires_credential() -> anyhow::Result<()> {
        let server = create_test_server(container())?;

        let response = server.get("/api/blob/list").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let error: serde_json::Value = response.json();
        assert_eq!(error["name"], "authentication_missing");

        Ok(())
    }

    #[tokio::test]
    async fn lists_directory_for_session() -> anyhow::Result<()> {
        let (server, cookie) = server_with_session().await?;

        let response = server
            .get("/api/blob/list")
            .add_query_param("path", "a/b/")
            .add_cookie(cookie)
            .await;
        response.assert_status_ok();

        let page: ListingPage = response.json();
        let names: Vec<_> = page.items.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["c.txt", "d"]);
        assert_eq!(page.items[0].size, Some(42));
        assert!(page.items[0].url.ends_with("/docs/a/b/c.txt?sv=2022-11-02&sig=abc"));
        assert!(page.items[1].is_directory);
        assert_eq!(page.breadcrumbs.len(), 3);
        assert!(page.continuation_token.is_none());

        let raw: serde_json::Value = response.json();
        assert!(raw["items"][0].get("isDirectory").is_some());
        assert!(raw.get("breadcrumbs").is_some());

        Ok(())
    }

    #[tokio::test]
    async fn paginates_with_continuation_token() -> anyhow::Result<()> {
        let (server, cookie) = server_with_session().await?;

        let first: ListingPage = server
            .get("/api/blob/list")
            .add_query_param("pageSize", 2)
            .add_cookie(cookie.clone())
            .await
            .json();
        assert_eq!(first.len(), 2);
        let token = first.continuation_token.expect("more entries remain");

        let second: ListingPage = server
            .get("/api/blob/list")
            .add_query_param("pageSize", 2)
            .add_query_param("continuationToken", token.as_str())
            .add_cookie(cookie)
            .await
            .json();
        assert_eq!(second.len(), 1);
        assert!(second.continuation_token.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn searches_case_insensitively() -> anyhow::Result<()> {
        let (server, cookie) = server_with_session().await?;

        let response = server
            .get("/api/blob/list")
            .add_query_param("search", "report")
            .add_query_param("path", "ignored/")
            .add_cookie(cookie)
            .await;
        response.assert_status_ok();

        let page: ListingPage = response.json();
        let paths: Vec<_> = page.items.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["reports/Q1-report.pdf", "reports/q2-REPORT.pdf"]);
        assert_eq!(page.breadcrumbs.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn invalid_page_size_is_bad_request() -> anyhow::Result<()> {
        let (server, cookie) = server_with_session().await?;

        for page_size in ["0", "abc", "5001"] {
            let response = server
                .get("/api/blob/list")
                .add_query_param("pageSize", page_size)
                .add_cookie(cookie.clone())
                .await;
            response.assert_status_bad_request();
        }

        Ok(())
    }

    #[tokio::test]
    async fn foreign_search_cursor_is_bad_request() -> anyhow::Result<()> {
        let (server, cookie) = server_with_session().await?;

        let response = server
            .get("/api/blob/list")
            .add_query_param("search", "x")
            .add_query_param("continuationToken", "***")
            .add_cookie(cookie)
            .await;
        response.assert_status_bad_request();

        Ok(())
    }

    #[tokio::test]
    async fn search_cursor_is_rejected_by_directory_listing() -> anyhow::Result<()> {
        let (server, cookie) = server_with_session().await?;

        let searched: ListingPage = server
            .get("/api/blob/list")
            .add_query_param("search", "report")
            .add_query_param("pageSize", 1)
            .add_cookie(cookie.clone())
            .await
            .json();
        let token = searched.continuation_token.expect("second match remains");

        let response = server
            .get("/api/blob/list")
            .add_query_param("continuationToken", token.as_str())
            .add_cookie(cookie)
            .await;
        response.assert_status_bad_request();

        Ok(())
    }

    #[tokio::test]
    async fn upstream_failure_is_bad_gateway() -> anyhow::Result<()> {
        let backend = container().fail_after(0, "AuthenticationFailed (HTTP 403): signature expired");
        let server = create_test_server(backend)?;

        let cookie = server
            .post("/api/blob/setsas")
            .json(&json!({ "sasUrl": SAS_URL }))
            .await
            .cookie(SESSION_COOKIE);

        let response = server.get("/api/blob/list").add_cookie(cookie).await;
        response.assert_status(StatusCode::BAD_GATEWAY);

        let error: serde_json::Value = response.json();
        assert_eq!(error["name"], "bad_gateway");
        assert_eq!(
            error["message"],
            "AuthenticationFailed (HTTP 403): signature expired"
        );

        Ok(())
    }

    #[tokio::test]
    async fn fallback_credential_serves_without_session() -> anyhow::Result<()> {
        let state = create_test_state(container());
        let sessions = state.sessions().clone().with_fallback(SAS_URL);
        let state = ServiceState::new(state.engine().clone(), sessions);
        let server = create_test_server_with_state(super::routes(), state)?;

        let response = server.get("/api/blob/list").await;
        response.assert_status_ok();
        let page: ListingPage = response.json();
        assert_eq!(page.len(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn clearing_session_revokes_credential() -> anyhow::Result<()> {
        let (server, cookie) = server_with_session().await?;

        let response = server.delete("/api/blob/session").add_cookie(cookie.clone()).await;
        response.assert_status_ok();

        let response = server.get("/api/blob/list").add_cookie(cookie).await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        Ok(())
    }
}
