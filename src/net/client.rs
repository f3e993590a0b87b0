use super::{Request, Response, CONTENT_TYPE_JSON};
use crate::Service;
use reqwest::{header, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

impl Service {
    /// Calls `method` on the service at `uri` and decodes the answer into `response`.
    ///
    /// `method` has to be registered locally too; the local registration is
    /// only used to check the name, nothing runs here.
    pub async fn call<Req, Res>(
        &self,
        client: &reqwest::Client,
        uri: &str,
        method: &str,
        request: &Req,
        response: &mut Res,
    ) -> Result<(), ClientError>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        self.call_with_seq(client, uri, method, request, response, 0)
            .await
    }

    /// Like [`call`](Service::call), with a caller-chosen sequence number.
    pub async fn call_with_seq<Req, Res>(
        &self,
        client: &reqwest::Client,
        uri: &str,
        method: &str,
        request: &Req,
        response: &mut Res,
        seq: u64,
    ) -> Result<(), ClientError>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let descriptor = self
            .method(method)
            .ok_or_else(|| ClientError::MethodNotFound(method.to_owned()))?;

        let envelope = Request {
            service_method: descriptor.name().to_owned(),
            body: serde_json::value::to_raw_value(request).map_err(ClientError::Encoding)?,
            seq,
        };
        let bytes = serde_json::to_vec(&envelope).map_err(ClientError::Encoding)?;

        debug!(method, seq, uri, "sending request");
        let http_response = client
            .post(uri)
            .header(header::CONTENT_TYPE, CONTENT_TYPE_JSON)
            .body(bytes)
            .send()
            .await?;
        let status = http_response.status();
        let content_type = http_response.headers().get(header::CONTENT_TYPE).cloned();
        let bytes = http_response.bytes().await?;

        if !status.is_success() {
            let message = String::from_utf8_lossy(&bytes).trim_end().to_owned();
            return Err(if status == StatusCode::INTERNAL_SERVER_ERROR {
                ClientError::Remote(message)
            } else {
                ClientError::Rejected { status, message }
            });
        }

        if content_type.as_ref().map(|v| v.as_bytes()) != Some(CONTENT_TYPE_JSON.as_bytes()) {
            let content_type = content_type.map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
            return Err(ClientError::ContentType(content_type));
        }

        let reply: Response = serde_json::from_slice(&bytes).map_err(ClientError::Decoding)?;
        if reply.seq != seq {
            warn!(method, sent = seq, received = reply.seq, "sequence number mismatch");
        }
        if !reply.error.is_empty() {
            return Err(ClientError::Remote(reply.error));
        }

        *response = serde_json::from_str(reply.body.get()).map_err(ClientError::Decoding)?;
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("rpc: can't find method {0:?}")]
    MethodNotFound(String),

    #[error("rpc: error encoding request: {0}")]
    Encoding(#[source] serde_json::Error),

    #[error("rpc: error sending request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("rpc: error reading response body: {0}")]
    Decoding(#[source] serde_json::Error),

    #[error("rpc: response content type is {0:?}, not application/json")]
    ContentType(Option<String>),

    /// The method ran on the server and failed.
    #[error("rpc: server: {0}")]
    Remote(String),

    #[error("rpc: server rejected request ({status}): {message}")]
    Rejected { status: StatusCode, message: String },
}
