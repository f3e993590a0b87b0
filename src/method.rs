use crate::types::{is_exported_ident, Shape};
use futures::future::BoxFuture;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::value::RawValue;
use std::{error::Error, sync::Arc};
use thiserror::Error;
use tokio::task::{self, JoinError};

/// Error type every remotely callable method returns, after conversion.
pub type BoxError = Box<dyn Error + Send + Sync>;

pub(crate) type CallResult = Result<Box<RawValue>, CallError>;

/// A type whose methods can be exposed through a [`Service`](crate::Service).
///
/// `methods` lists the candidate methods. Registration only keeps the ones
/// with an exported name and exported (or builtin) request/response types;
/// the rest are skipped. The [`rpc_object!`](crate::rpc_object) macro writes
/// this impl from a list of names.
pub trait RpcObject: Sized + Send + Sync + 'static {
    /// Name used as the `<TypeName>` half of qualified method names.
    fn type_name() -> &'static str {
        Shape::of::<Self>().name()
    }

    fn methods(methods: &mut MethodSet<Self>);
}

type BlockingInvoker<S> = Arc<dyn Fn(&S, &RawValue) -> CallResult + Send + Sync>;
type AsyncInvoker<S> =
    Arc<dyn for<'a> Fn(&'a S, &'a RawValue) -> BoxFuture<'a, CallResult> + Send + Sync>;

enum Invoker<S> {
    /// Runs on the blocking thread pool.
    Blocking(BlockingInvoker<S>),
    /// Polled on the request's own task.
    Async(AsyncInvoker<S>),
}

fn blocking_invoker<S, F>(invoke: F) -> Invoker<S>
where
    F: Fn(&S, &RawValue) -> CallResult + Send + Sync + 'static,
{
    Invoker::Blocking(Arc::new(invoke))
}

fn async_invoker<S, F>(invoke: F) -> Invoker<S>
where
    F: for<'a> Fn(&'a S, &'a RawValue) -> BoxFuture<'a, CallResult> + Send + Sync + 'static,
{
    Invoker::Async(Arc::new(invoke))
}

/// Candidate methods of an [`RpcObject`], before the registration filter.
pub struct MethodSet<S> {
    candidates: Vec<Candidate<S>>,
}

pub(crate) struct Candidate<S> {
    pub(crate) name: &'static str,
    request: Shape,
    response: Shape,
    invoke: Invoker<S>,
}

impl<S> MethodSet<S>
where
    S: RpcObject,
{
    pub(crate) fn collect() -> Self {
        let mut methods = Self {
            candidates: Vec::new(),
        };
        S::methods(&mut methods);
        methods
    }

    pub(crate) fn into_candidates(self) -> Vec<Candidate<S>> {
        self.candidates
    }

    /// Adds a method taking a decoded request and a response to fill in.
    ///
    /// The response starts out as `Res::default()` on every call. Calls run
    /// on tokio's blocking pool, so the method may block.
    pub fn add<Req, Res, E, F>(&mut self, name: &'static str, method: F) -> &mut Self
    where
        F: Fn(&S, Req, &mut Res) -> Result<(), E> + Send + Sync + 'static,
        Req: DeserializeOwned + 'static,
        Res: Serialize + Default + 'static,
        E: Into<BoxError>,
    {
        let invoke = blocking_invoker(move |receiver: &S, body: &RawValue| {
            let request: Req = serde_json::from_str(body.get()).map_err(CallError::Request)?;
            let mut response = Res::default();
            method(receiver, request, &mut response).map_err(|err| CallError::Method(err.into()))?;
            serde_json::value::to_raw_value(&response).map_err(CallError::Response)
        });
        self.push::<Req, Res>(name, invoke)
    }

    /// Adds an async method returning its response.
    ///
    /// ```ignore
    /// fn fetch(&self, url: String) -> BoxFuture<'_, Result<String, BoxError>> {
    ///     Box::pin(async move { Ok(reqwest::get(url).await?.text().await?) })
    /// }
    /// ```
    pub fn add_async<Req, Res, E, F>(&mut self, name: &'static str, method: F) -> &mut Self
    where
        F: for<'a> Fn(&'a S, Req) -> BoxFuture<'a, Result<Res, E>> + Send + Sync + 'static,
        Req: DeserializeOwned + 'static,
        Res: Serialize + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        let invoke = async_invoker(move |receiver, body| {
            let call = serde_json::from_str(body.get()).map(|request| method(receiver, request));
            Box::pin(async move {
                let response = call
                    .map_err(CallError::Request)?
                    .await
                    .map_err(|err| CallError::Method(err.into()))?;
                serde_json::value::to_raw_value(&response).map_err(CallError::Response)
            })
        });
        self.push::<Req, Res>(name, invoke)
    }

    /// Promotes every method of an embedded object, reached through `project`.
    pub fn embed<I>(&mut self, project: fn(&S) -> &I) -> &mut Self
    where
        I: RpcObject,
    {
        for candidate in MethodSet::<I>::collect().candidates {
            let invoke = match candidate.invoke {
                Invoker::Blocking(invoke) => {
                    blocking_invoker(move |receiver: &S, body: &RawValue| {
                        invoke(project(receiver), body)
                    })
                }
                Invoker::Async(invoke) => {
                    async_invoker(move |receiver, body| invoke(project(receiver), body))
                }
            };
            self.candidates.push(Candidate {
                name: candidate.name,
                request: candidate.request,
                response: candidate.response,
                invoke,
            });
        }
        self
    }

    fn push<Req, Res>(&mut self, name: &'static str, invoke: Invoker<S>) -> &mut Self {
        self.candidates.push(Candidate {
            name,
            request: Shape::of::<Req>(),
            response: Shape::of::<Res>(),
            invoke,
        });
        self
    }
}

impl<S> Candidate<S> {
    /// Why this candidate is not remotely callable, if it isn't.
    pub(crate) fn rejection(&self) -> Option<&'static str> {
        if !is_exported_ident(self.name) {
            Some("method name is not exported")
        } else if !self.request.is_exported_or_builtin() {
            Some("request type is neither exported nor builtin")
        } else if !self.response.is_exported_or_builtin() {
            Some("response type is neither exported nor builtin")
        } else {
            None
        }
    }
}

/// A registered procedure: qualified name, payload shapes, and the bound receiver.
pub struct MethodDescriptor {
    name: String,
    request: Shape,
    response: Shape,
    bound: Box<dyn DynamicMethod>,
}

impl MethodDescriptor {
    pub(crate) fn bind<S>(name: String, candidate: Candidate<S>, receiver: Arc<S>) -> Self
    where
        S: RpcObject,
    {
        Self {
            name,
            request: candidate.request,
            response: candidate.response,
            bound: Box::new(BoundMethod {
                receiver,
                invoke: candidate.invoke,
            }),
        }
    }

    /// `"<TypeName>.<MethodName>"`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn request_shape(&self) -> Shape {
        self.request
    }

    pub fn response_shape(&self) -> Shape {
        self.response
    }

    /// Decodes `body` into a fresh request, runs the method, and encodes its
    /// response.
    pub async fn invoke(&self, body: Box<RawValue>) -> Result<Box<RawValue>, CallError> {
        self.bound.invoke(body).await
    }
}

/// Receiver type erased away.
trait DynamicMethod: Send + Sync {
    fn invoke(&self, body: Box<RawValue>) -> BoxFuture<'_, CallResult>;
}

struct BoundMethod<S> {
    receiver: Arc<S>,
    invoke: Invoker<S>,
}

impl<S> DynamicMethod for BoundMethod<S>
where
    S: RpcObject,
{
    fn invoke(&self, body: Box<RawValue>) -> BoxFuture<'_, CallResult> {
        match &self.invoke {
            Invoker::Blocking(invoke) => {
                let receiver = self.receiver.clone();
                let invoke = invoke.clone();
                Box::pin(async move {
                    task::spawn_blocking(move || invoke(&*receiver, &body)).await?
                })
            }
            Invoker::Async(invoke) => Box::pin(async move { invoke(&*self.receiver, &body).await }),
        }
    }
}

#[derive(Debug, Error)]
pub enum CallError {
    #[error("decoding request body: {0}")]
    Request(#[source] serde_json::Error),

    /// Displays exactly as the method's own error.
    #[error("{0}")]
    Method(BoxError),

    #[error("encoding response body: {0}")]
    Response(#[source] serde_json::Error),

    #[error("method did not complete: {0}")]
    Aborted(#[from] JoinError),
}
