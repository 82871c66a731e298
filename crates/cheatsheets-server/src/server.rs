use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use axum::body::{Body, HttpBody};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Uri, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use cheatsheets::SiteConfig;
use sha2::{Digest, Sha256};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::catch_panic::CatchPanicLayer;

use crate::error::{Result, ServerError};
use crate::site::Site;
use crate::telemetry::{RequestLog, RequestRecord, external_referer};

/// In-flight requests get this long to finish once shutdown starts.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
struct AppState {
    site: Arc<Site>,
    log: RequestLog,
}

/// Every request goes through the site lookup; there are no fixed routes.
pub fn router(site: Arc<Site>, log: RequestLog) -> Router {
    let state = AppState { site, log };
    Router::new()
        .fallback(serve_site)
        .layer(CatchPanicLayer::new())
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .with_state(state)
}

async fn serve_site(State(state): State<AppState>, headers: HeaderMap, uri: Uri) -> Response {
    let path = uri.path().to_string();
    let site = state.site.clone();
    // Lookups read files and render markdown.
    let found = match tokio::task::spawn_blocking(move || site.find(&path)).await {
        Ok(found) => found,
        Err(err) => return internal_error(&err.to_string()),
    };
    let Some(found) = found else {
        return not_found();
    };
    let body = match found.body {
        Ok(body) => body,
        Err(err) => {
            tracing::error!(uri = %found.uri, error = %err, "failed to produce content");
            return internal_error(&err.to_string());
        }
    };

    let etag = etag_for(&body);
    if !found.not_found && etag_matches(&headers, &etag) {
        let mut response = StatusCode::NOT_MODIFIED.into_response();
        insert_etag(&mut response, &etag);
        return response;
    }

    let status = if found.not_found {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };
    let mut response = (status, Body::from(body)).into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(content_type_for(&found.uri)),
    );
    if found.not_found {
        response.headers_mut().insert(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        );
    } else {
        insert_etag(&mut response, &etag);
    }
    response
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
        "404 page not found\n",
    )
        .into_response()
}

fn internal_error(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        format!("{message}\n"),
    )
        .into_response()
}

/// Strong validator: quoted hex SHA-256 of the body.
pub fn etag_for(body: &[u8]) -> String {
    format!("\"{}\"", hex::encode(Sha256::digest(body)))
}

fn etag_matches(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .any(|candidate| candidate == etag || candidate == "*")
}

fn insert_etag(response: &mut Response, etag: &str) {
    if let Ok(value) = HeaderValue::from_str(etag) {
        response.headers_mut().insert(header::ETAG, value);
    }
}

pub fn content_type_for(uri: &str) -> &'static str {
    let ext = uri
        .rsplit('/')
        .next()
        .and_then(|file| file.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" => "text/javascript; charset=utf-8",
        "txt" | "md" => "text/plain; charset=utf-8",
        "xml" => "text/xml; charset=utf-8",
        "json" => "application/json",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "ico" => "image/x-icon",
        "woff2" => "font/woff2",
        _ => "application/octet-stream",
    }
}

async fn log_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let (referer, host) = {
        let headers = req.headers();
        (
            header_string(headers, header::REFERER),
            header_string(headers, header::HOST),
        )
    };

    let response = next.run(req).await;

    state.log.record(&RequestRecord {
        method: &method,
        path: &path,
        status: response.status().as_u16(),
        size: response.body().size_hint().exact().unwrap_or(0),
        duration: start.elapsed(),
        external_referer: external_referer(referer.as_deref(), host.as_deref()),
    });
    response
}

fn header_string(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Serves `app` until `shutdown` resolves, then waits up to
/// [`SHUTDOWN_TIMEOUT`] for in-flight requests.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        finished = &mut server => {
            return match finished {
                Ok(result) => result.map_err(ServerError::from),
                Err(err) => Err(ServerError::Io(io::Error::other(err.to_string()))),
            };
        }
        _ = shutdown => {
            tracing::info!("shutting down http server");
        }
    }

    let _ = stop_tx.send(());
    match tokio::time::timeout(SHUTDOWN_TIMEOUT, server).await {
        Ok(Ok(result)) => {
            result?;
            tracing::info!("server shutdown cleanly");
        }
        Ok(Err(err)) => return Err(ServerError::Io(io::Error::other(err.to_string()))),
        Err(_) => tracing::warn!("server killed due to shutdown timeout"),
    }
    Ok(())
}

/// Binds the configured port on all interfaces and serves `site` until
/// Ctrl-C or SIGTERM.
pub async fn run(site: Site, config: &SiteConfig) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(url = %format!("http://{}", listener.local_addr()?), "starting server");

    let app = router(
        Arc::new(site),
        RequestLog::new(config.log_skip_prefixes.clone()),
    );
    serve(listener, app, shutdown_signal()).await
}

pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to listen for SIGTERM");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
