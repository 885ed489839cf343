//! API Handlers
//!
//! HTTP request handlers for each render service endpoint.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::cache::{DocumentCache, HttpFetcher};
use crate::config::Config;
use crate::error::{RenderError, Result, ServiceError};
use crate::models::{parse_page_number, HealthResponse, RenderQuery, RenderTarget};
use crate::render::{PageInfo, RenderEngine, Renderer};

/// Application state shared across all handlers.
///
/// Holds the one document cache of the process (also handed to the sweeper)
/// and the rendering engine.
#[derive(Clone)]
pub struct AppState {
    /// Shared document cache
    pub cache: Arc<DocumentCache>,
    /// Rendering backend
    pub engine: Arc<dyn RenderEngine>,
}

impl AppState {
    /// Creates a new AppState from an existing cache and engine.
    pub fn new(cache: Arc<DocumentCache>, engine: Arc<dyn RenderEngine>) -> Self {
        Self { cache, engine }
    }

    /// Builds an HTTP-backed cache from configuration and configures it.
    ///
    /// Fails if `DOC_URL` is not a valid URL.
    pub async fn from_config(
        config: &Config,
        engine: Arc<dyn RenderEngine>,
    ) -> std::result::Result<Self, url::ParseError> {
        let base_url = config.doc_url()?;
        let cache = DocumentCache::new(Arc::new(HttpFetcher::new()))
            .with_serialization(config.fetch_serialization);
        cache.configure(base_url, config.cache_size_bytes()).await;
        Ok(Self::new(Arc::new(cache), engine))
    }
}

// == Helpers ==
async fn fetch_document(state: &AppState, id: &str) -> Result<Bytes> {
    Ok(state.cache.get(id).await?)
}

/// Opens the document on the blocking pool and runs `f` against it.
async fn with_renderer<T, F>(engine: Arc<dyn RenderEngine>, document: Bytes, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn Renderer) -> std::result::Result<T, RenderError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let renderer = engine.open(document)?;
        f(renderer.as_ref())
    })
    .await
    .map_err(|e| ServiceError::Internal(format!("Render task failed: {}", e)))?
    .map_err(ServiceError::from)
}

fn check_page(renderer: &dyn Renderer, page: u32) -> std::result::Result<(), RenderError> {
    let count = renderer.page_count()?;
    if page > count {
        debug!("The requested page {} is bigger than max: {}", page, count);
        return Err(RenderError::PageOutOfRange { page, count });
    }
    Ok(())
}

async fn render_png(
    engine: Arc<dyn RenderEngine>,
    document: Bytes,
    page: u32,
    target: RenderTarget,
) -> Result<Response> {
    let png = with_renderer(engine, document, move |renderer| {
        check_page(renderer, page)?;
        match target {
            RenderTarget::Zoom(zoom) => renderer.render_zoom(page, zoom),
            RenderTarget::Fit { width, height } => renderer.render_fit(page, width, height),
        }
    })
    .await?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

fn page_and_target(pagenr: &str, query: &RenderQuery) -> Result<(u32, RenderTarget)> {
    let page = parse_page_number(pagenr).map_err(ServiceError::InvalidRequest)?;
    let target = query.target().map_err(ServiceError::InvalidRequest)?;
    Ok((page, target))
}

/// Handler for GET /
pub async fn index_handler() -> &'static str {
    "RenderService"
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /renderservice/:uuid/numpages
///
/// Returns the number of pages as a bare JSON number.
pub async fn page_count_handler(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<Json<u32>> {
    debug!(uuid = %uuid, "Working on page number request");
    let document = fetch_document(&state, &uuid).await?;
    let count = with_renderer(state.engine.clone(), document, |renderer| renderer.page_count())
        .await?;
    Ok(Json(count))
}

/// Handler for GET /renderservice/:uuid/:pagenr/pageinfo
pub async fn page_info_handler(
    State(state): State<AppState>,
    Path((uuid, pagenr)): Path<(String, String)>,
) -> Result<Json<PageInfo>> {
    debug!(uuid = %uuid, "Working on page info request");
    let page = parse_page_number(&pagenr).map_err(ServiceError::InvalidRequest)?;
    let document = fetch_document(&state, &uuid).await?;
    let info = with_renderer(state.engine.clone(), document, move |renderer| {
        check_page(renderer, page)?;
        renderer.page_info(page)
    })
    .await?;
    Ok(Json(info))
}

/// Handler for GET /renderservice/:uuid/:pagenr
///
/// Renders a cached document page as PNG.
pub async fn render_page_handler(
    State(state): State<AppState>,
    Path((uuid, pagenr)): Path<(String, String)>,
    Query(query): Query<RenderQuery>,
) -> Result<Response> {
    let (page, target) = page_and_target(&pagenr, &query)?;
    debug!(uuid = %uuid, page, ?target, "Working on render request");
    let document = fetch_document(&state, &uuid).await?;
    render_png(state.engine.clone(), document, page, target).await
}

/// Handler for POST /renderservice/:pagenr
///
/// Renders a page of the document sent as request body. The cache is not
/// involved. The route shares its pattern with the close endpoint, so the
/// router names the segment `:uuid`; here it is always the page number.
pub async fn render_posted_handler(
    State(state): State<AppState>,
    Path(pagenr): Path<String>,
    Query(query): Query<RenderQuery>,
    body: Bytes,
) -> Result<Response> {
    let (page, target) = page_and_target(&pagenr, &query)?;
    debug!(page, ?target, size = body.len(), "Working on posted render request");
    render_png(state.engine.clone(), body, page, target).await
}

/// Handler for DELETE /renderservice/:uuid
///
/// Frees the cached copy of a document. Unknown ids are accepted as well.
pub async fn close_document_handler(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> StatusCode {
    debug!(uuid = %uuid, "Working on close request");
    state.cache.delete(&uuid).await;
    StatusCode::NO_CONTENT
}
