//! API Routes
//!
//! Configures the Axum router with all render service endpoints.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    close_document_handler, health_handler, index_handler, page_count_handler,
    page_info_handler, render_page_handler, render_posted_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /` - Service name
/// - `GET /health` - Health check endpoint
/// - `GET /renderservice/:uuid/numpages` - Page count of a stored document
/// - `GET /renderservice/:uuid/:pagenr/pageinfo` - Page dimensions
/// - `GET /renderservice/:uuid/:pagenr` - Render a page as PNG
/// - `POST /renderservice/:pagenr` - Render a page of the posted document
/// - `DELETE /renderservice/:uuid` - Drop a document from the cache
///
/// The last two share one path pattern; its segment is a page number for
/// `POST` and a document id for `DELETE`. Parameter names must agree across
/// routes at the same position, hence `:uuid` for both.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/renderservice/:uuid/numpages", get(page_count_handler))
        .route("/renderservice/:uuid/:pagenr/pageinfo", get(page_info_handler))
        .route("/renderservice/:uuid/:pagenr", get(render_page_handler))
        .route(
            "/renderservice/:uuid",
            delete(close_document_handler).post(render_posted_handler),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::testing::MockFetcher;
    use crate::cache::DocumentCache;
    use crate::render::testing::{fake_document, FakeEngine};
    use crate::render::UnavailableEngine;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::util::ServiceExt;
    use url::Url;

    async fn create_test_app() -> Router {
        let fetcher = MockFetcher::new().with_document("doc", fake_document(2));
        let cache = DocumentCache::new(Arc::new(fetcher));
        cache
            .configure(Url::parse("http://store.local/").unwrap(), 10_000)
            .await;
        create_router(AppState::new(Arc::new(cache), Arc::new(FakeEngine)))
    }

    async fn send(app: Router, method: &str, uri: &str) -> StatusCode {
        app.oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
    }

    #[tokio::test]
    async fn test_index_endpoint() {
        let app = create_test_app().await;
        assert_eq!(send(app, "GET", "/").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app().await;
        assert_eq!(send(app, "GET", "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_numpages_is_not_taken_as_page_number() {
        let app = create_test_app().await;
        assert_eq!(
            send(app, "GET", "/renderservice/doc/numpages").await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_render_endpoint() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/renderservice/doc/1?w=50&h=50")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "image/png");
    }

    #[tokio::test]
    async fn test_page_out_of_range() {
        let app = create_test_app().await;
        assert_eq!(
            send(app, "GET", "/renderservice/doc/3/pageinfo").await,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_delete_endpoint() {
        let app = create_test_app().await;
        assert_eq!(
            send(app, "DELETE", "/renderservice/doc").await,
            StatusCode::NO_CONTENT
        );
    }

    #[tokio::test]
    async fn test_post_without_render_parameters() {
        let app = create_test_app().await;
        assert_eq!(
            send(app, "POST", "/renderservice/1").await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_post_segment_is_page_number() {
        let app = create_test_app().await;

        for (uri, expected) in [
            ("/renderservice/2?z=1", StatusCode::OK),
            ("/renderservice/3?z=1", StatusCode::NOT_FOUND),
            ("/renderservice/doc?z=1", StatusCode::BAD_REQUEST),
        ] {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri(uri)
                        .body(Body::from(fake_document(2)))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), expected, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_unavailable_engine() {
        let cache = DocumentCache::new(Arc::new(
            MockFetcher::new().with_document("doc", fake_document(1)),
        ));
        cache
            .configure(Url::parse("http://store.local/").unwrap(), 10_000)
            .await;
        let app = create_router(AppState::new(Arc::new(cache), Arc::new(UnavailableEngine)));

        assert_eq!(
            send(app, "GET", "/renderservice/doc/numpages").await,
            StatusCode::NOT_IMPLEMENTED
        );
    }
}
