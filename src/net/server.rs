//! HTTP side of the service: decodes a [`Request`] envelope, runs the method, answers with a [`Response`].

use super::{Request, Response, CONTENT_TYPE_JSON};
use crate::{method::CallError, Service};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response as HttpResponse},
    routing::{any, MethodRouter},
    Router,
};
use std::{io, sync::Arc};
use tokio::net::TcpListener;
use tracing::{debug, info};

impl Service {
    /// Handler for a single RPC endpoint.
    ///
    /// It accepts every HTTP method so that anything other than `POST` gets
    /// the dispatcher's own `405` answer.
    pub fn serve(self: Arc<Self>) -> MethodRouter {
        any(dispatch).with_state(self)
    }

    /// A router with the handler mounted at `path`.
    pub fn router(self: Arc<Self>, path: &str) -> Router {
        Router::new().route(path, self.serve())
    }

    /// Serves the handler at `path` on an already bound listener until it fails.
    pub async fn serve_http(self, listener: TcpListener, path: &str) -> io::Result<()> {
        info!(addr = ?listener.local_addr()?, path, "serving rpc");
        axum::serve(listener, Arc::new(self).router(path)).await
    }
}

async fn dispatch(
    State(service): State<Arc<Service>>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> HttpResponse {
    if method != Method::POST {
        return reject(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
    }

    let content_type = headers.get(header::CONTENT_TYPE).map(|v| v.as_bytes());
    if content_type != Some(CONTENT_TYPE_JSON.as_bytes()) {
        return reject(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Content-Type must be application/json",
        );
    }

    let request: Request = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            debug!(%err, "malformed request envelope");
            return reject(StatusCode::BAD_REQUEST, "Bad request");
        }
    };

    let Some(descriptor) = service.method(&request.service_method) else {
        debug!(method = %request.service_method, "no such method");
        return reject(StatusCode::BAD_REQUEST, "Bad request");
    };

    debug!(method = %request.service_method, seq = request.seq, "calling");
    let body = match descriptor.invoke(request.body).await {
        Ok(body) => body,
        Err(err @ CallError::Request(_)) => {
            debug!(method = %request.service_method, %err, "malformed request body");
            return reject(StatusCode::BAD_REQUEST, "Bad request");
        }
        // Method errors travel as bare text, outside the envelope.
        Err(err) => return reject(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    };

    let response = Response {
        service_method: request.service_method,
        body,
        seq: request.seq,
        error: String::new(),
    };
    match serde_json::to_vec(&response) {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, CONTENT_TYPE_JSON)],
            bytes,
        )
            .into_response(),
        Err(err) => reject(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

fn reject(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    (status, message.into()).into_response()
}
