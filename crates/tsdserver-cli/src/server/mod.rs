//! HTTP front end.
//!
//! A single fallback route hands every request to the core
//! [`RequestHandler`]; this module only translates between axum types and
//! the framework-free request/response of `tsdserver-core`, and keeps the
//! listeners running until shutdown.

mod endpoint;

use std::future::Future;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use tokio::task::JoinSet;
use tokio_util::io::ReaderStream;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tsdserver_core::{HandlerResponse, Request, RequestHandler, ResponseBody, Status};

use crate::error::ServerError;

pub use endpoint::{DEFAULT_PORT, ListenEndpoint, parse_endpoint};

/// Router serving every path through `handler`.
pub fn router(handler: Arc<RequestHandler>) -> Router {
    Router::new()
        .fallback(handle)
        .layer(TraceLayer::new_for_http())
        .with_state(handler)
}

async fn handle(
    State(handler): State<Arc<RequestHandler>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let request = Request {
        method: method.as_str(),
        path: uri.path(),
        if_match: header_str(&headers, header::IF_MATCH),
        if_modified_since: header_str(&headers, header::IF_MODIFIED_SINCE),
    };

    let response = handler.handle(&request).await;
    into_response(response).await
}

fn header_str(headers: &HeaderMap, name: HeaderName) -> Option<&str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn status_code(status: Status) -> StatusCode {
    match status {
        Status::Ok => StatusCode::OK,
        Status::NotModified => StatusCode::NOT_MODIFIED,
        Status::NotFound => StatusCode::NOT_FOUND,
        Status::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        Status::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn into_response(response: HandlerResponse) -> Response {
    let body = match response.body {
        ResponseBody::Empty => Body::empty(),
        ResponseBody::Text(text) => Body::from(text),
        ResponseBody::File(path) => match tokio::fs::File::open(&path).await {
            Ok(file) => Body::from_stream(ReaderStream::new(file)),
            Err(err) => {
                tracing::error!("Failed to open {}: {}", path.display(), err);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Server error: {err}"),
                )
                    .into_response();
            }
        },
    };

    let mut out = Response::new(body);
    *out.status_mut() = status_code(response.status);

    let out_headers = out.headers_mut();
    for (name, value) in response.headers {
        let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
            continue;
        };
        match HeaderValue::from_str(&value) {
            Ok(value) => {
                out_headers.insert(name, value);
            }
            Err(_) => tracing::warn!("Dropping invalid {} header value {:?}", name, value),
        }
    }

    out
}

enum BoundListener {
    Tcp(tokio::net::TcpListener),
    #[cfg(unix)]
    Unix(tokio::net::UnixListener, std::path::PathBuf),
}

async fn bind(endpoint: &ListenEndpoint) -> Result<BoundListener, ServerError> {
    let bind_error = |source| ServerError::Bind {
        endpoint: endpoint.to_string(),
        source,
    };

    match endpoint {
        ListenEndpoint::Tcp { .. } => {
            let address = endpoint
                .socket_address()
                .ok_or_else(|| ServerError::UnsupportedEndpoint(endpoint.to_string()))?;
            let listener = tokio::net::TcpListener::bind(address)
                .await
                .map_err(bind_error)?;
            Ok(BoundListener::Tcp(listener))
        }
        #[cfg(unix)]
        ListenEndpoint::Unix(path) => {
            let listener = tokio::net::UnixListener::bind(path).map_err(bind_error)?;
            Ok(BoundListener::Unix(listener, path.clone()))
        }
        #[cfg(not(unix))]
        ListenEndpoint::Unix(_) => Err(ServerError::UnsupportedEndpoint(endpoint.to_string())),
        ListenEndpoint::Pipe(_) => Err(ServerError::UnsupportedEndpoint(endpoint.to_string())),
    }
}

/// Serve `handler` on every endpoint until `shutdown` completes.
///
/// All endpoints are bound before any of them accepts connections, so a
/// bind failure leaves nothing running.
pub async fn serve<F>(
    handler: Arc<RequestHandler>,
    endpoints: &[ListenEndpoint],
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let mut bound = Vec::with_capacity(endpoints.len());
    for endpoint in endpoints {
        bound.push((endpoint.clone(), bind(endpoint).await?));
    }

    let app = router(handler);
    let token = CancellationToken::new();
    let mut listeners = JoinSet::new();

    for (endpoint, listener) in bound {
        tracing::info!("Accepting connections on {}", endpoint);
        let app = app.clone();
        let stop = token.clone().cancelled_owned();
        listeners.spawn(async move {
            let result = match listener {
                BoundListener::Tcp(listener) => {
                    axum::serve(listener, app).with_graceful_shutdown(stop).await
                }
                #[cfg(unix)]
                BoundListener::Unix(listener, path) => {
                    let result = axum::serve(listener, app).with_graceful_shutdown(stop).await;
                    let _ = tokio::fs::remove_file(&path).await;
                    result
                }
            };
            result.map_err(|err| ServerError::Serve {
                endpoint: endpoint.to_string(),
                reason: err.to_string(),
            })
        });
    }

    let shutdown_token = token.clone();
    tokio::spawn(async move {
        shutdown.await;
        tracing::info!("Gracefully shutting down");
        shutdown_token.cancel();
    });

    let mut first_error = None;
    while let Some(joined) = listeners.join_next().await {
        let result = joined.unwrap_or_else(|err| {
            Err(ServerError::Serve {
                endpoint: "listener task".to_string(),
                reason: err.to_string(),
            })
        });
        if let Err(err) = result {
            tracing::error!("{}", err);
            // One listener failing stops the rest
            token.cancel();
            first_error.get_or_insert(err);
        }
    }

    first_error.map_or(Ok(()), Err)
}

/// Resolves on ctrl-c, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!("Cannot listen for ctrl-c: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!("Cannot listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
