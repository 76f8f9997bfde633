use crate::encoder::render_qr_png;
use crate::page::IndexView;
use crate::params::{IndexQuery, QrQuery};
use crate::traits::{QrEncoder, UiAssetProvider};
use crate::Error;
use axum::{
    Json, Router,
    body::Body,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

// The shared state for our web server.
// By using `Arc<dyn Trait>`, we can inject any implementation
// that satisfies the trait bounds.
pub type WebServerState = State<Arc<AppState>>;

pub struct AppState {
    pub encoder: Arc<dyn QrEncoder>,
    pub frontend: Arc<dyn UiAssetProvider>,
}

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/qr", get(serve_qr))
        .route("/static/{*path}", get(serve_static_asset))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Starts the Axum web server.
///
/// # Arguments
/// * `addr` - The socket address to listen on.
/// * `encoder` - An `Arc` wrapping a `QrEncoder` implementation.
/// * `frontend` - An `Arc` wrapping a `UiAssetProvider` implementation.
///
/// # Returns
/// A `JoinHandle` for the server task. The task ends after Ctrl-C.
pub fn start_web_server(
    addr: SocketAddr,
    encoder: Arc<dyn QrEncoder>,
    frontend: Arc<dyn UiAssetProvider>,
) -> JoinHandle<Result<(), crate::Error>> {
    let app = router(Arc::new(AppState { encoder, frontend }));

    tokio::spawn(async move {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("🌐 Web server listening on {}", listener.local_addr()?);

        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| crate::Error::WebServer(e.into()))
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("🛑 Shutdown signal received");
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Error::OutOfRange { .. } | Error::InvalidParameter { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Error::AssetNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if self.is_client_error() {
            tracing::warn!("Rejected request ({}): {}", status, self);
        } else {
            tracing::error!("Request failed: {}", self);
        }

        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

fn query_or_reject<T>(query: Result<Query<T>, QueryRejection>) -> crate::Result<T> {
    query
        .map(|Query(q)| q)
        .map_err(|rejection| Error::InvalidArgument(rejection.body_text()))
}

// --- Route Handlers ---

/// Renders the form page.
async fn serve_index(
    State(state): WebServerState,
    query: Result<Query<IndexQuery>, QueryRejection>,
) -> crate::Result<Html<String>> {
    let params = query_or_reject(query)?.validate()?;
    tracing::debug!(mode = params.mode.as_str(), "Handling / request");

    let view = IndexView::new(params);
    let (template, _) = state.frontend.get_asset("index.html").await?;
    let template = String::from_utf8(template.into_owned())?;

    Ok(Html(view.render(&template)))
}

/// Returns the QR code for `data` as a PNG.
async fn serve_qr(
    State(state): WebServerState,
    query: Result<Query<QrQuery>, QueryRejection>,
) -> crate::Result<Response> {
    let params = query_or_reject(query)?.validate()?;
    tracing::debug!(
        len = params.data.len(),
        scale = params.render.scale,
        border = params.render.border,
        "Handling /qr request"
    );

    // Encoding is CPU-bound; keep it off the async workers.
    let encoder = state.encoder.clone();
    let png = tokio::task::spawn_blocking(move || {
        render_qr_png(
            encoder.as_ref(),
            &params.data,
            params.render.scale,
            params.render.border,
        )
    })
    .await??;

    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

/// Serves a static asset (e.g., CSS) from the frontend provider.
async fn serve_static_asset(
    State(state): WebServerState,
    Path(path): Path<String>,
) -> crate::Result<Response> {
    let (data, mime) = state.frontend.get_asset(&path).await?;
    Ok(([(header::CONTENT_TYPE, mime)], Body::from(data)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::QrcodeEncoder;
    use crate::frontends::provider_embed::EmbedFrontend;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> Router {
        router(Arc::new(AppState {
            encoder: Arc::new(QrcodeEncoder::default()),
            frontend: Arc::new(EmbedFrontend::new()),
        }))
    }

    async fn get(uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, content_type, body.to_vec())
    }

    fn error_message(body: &[u8]) -> String {
        let json: serde_json::Value = serde_json::from_slice(body).unwrap();
        json["error"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn qr_returns_png() {
        let (status, content_type, body) =
            get("/qr?data=https%3A%2F%2Fexample.com&scale=5&border=4").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("image/png"));

        let img = image::load_from_memory(&body).unwrap().to_luma8();
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            img.width() as usize,
            img.height() as usize,
            |x, y| img.get_pixel(x as u32, y as u32)[0],
        );
        let grids = prepared.detect_grids();
        let (_, content) = grids[0].decode().unwrap();
        assert_eq!(content, "https://example.com");
    }

    #[tokio::test]
    async fn qr_requires_data() {
        for uri in ["/qr?data=", "/qr", "/qr?scale=5"] {
            let (status, _, body) = get(uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(error_message(&body), "Parameter 'data' is required");
        }
    }

    #[tokio::test]
    async fn qr_rejects_out_of_range() {
        for uri in [
            "/qr?data=x&scale=0",
            "/qr?data=x&scale=51",
            "/qr?data=x&border=-1",
            "/qr?data=x&border=21",
        ] {
            let (status, _, _) = get(uri).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
        }
    }

    #[tokio::test]
    async fn qr_rejects_non_numeric_scale() {
        let (status, _, _) = get("/qr?data=x&scale=big").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn qr_reports_encoding_failure() {
        let uri = format!("/qr?data={}", "x".repeat(4000));
        let (status, _, body) = get(&uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error_message(&body).starts_with("QR encoding failed"));
    }

    #[tokio::test]
    async fn index_renders_text_mode_by_default() {
        let (status, content_type, body) = get("/?mode=banana&data=hello").await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.unwrap().starts_with("text/html"));
        let html = String::from_utf8(body).unwrap();
        assert!(html.contains("src=\"/qr?data=hello&amp;scale=5&amp;border=4\""));
        assert!(!html.contains("{{"));
    }

    #[tokio::test]
    async fn index_builds_wifi_payload() {
        let (status, _, body) = get(
            "/?mode=wifi&wifi_ssid=My%3BNet&wifi_password=p%22w&wifi_auth=wep&wifi_hidden=on",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let html = String::from_utf8(body).unwrap();
        assert!(html.contains(r"WIFI:T:WEP;S:My\;Net;P:p\&quot;w;H:true;;"));
    }

    #[tokio::test]
    async fn index_without_ssid_has_no_payload() {
        let (status, _, body) = get("/?mode=wifi&data=ignored").await;
        assert_eq!(status, StatusCode::OK);
        let html = String::from_utf8(body).unwrap();
        assert!(html.contains("No payload yet"));
        assert!(!html.contains("/qr?data="));
    }

    #[tokio::test]
    async fn index_validates_scale() {
        let (status, _, _) = get("/?scale=0").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn static_assets_are_served() {
        let (status, content_type, _) = get("/static/style.css").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("text/css"));

        let (status, _, _) = get("/static/missing.js").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
