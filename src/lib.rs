//! Expose the methods of plain Rust objects as remote procedures over HTTP.
//!
//! A [`Service`] maps `"<TypeName>.<MethodName>"` to methods of registered
//! [`RpcObject`]s. The same service answers requests through
//! [`Service::serve`] and sends them with [`Service::call`]; both sides speak
//! JSON [`Request`](net::Request)/[`Response`](net::Response) envelopes.

mod macros;
pub mod method;
pub mod net;
pub mod service;
pub mod types;

pub use futures::future::BoxFuture;
pub use method::{BoxError, MethodDescriptor, MethodSet, RpcObject};
pub use net::client::ClientError;
pub use service::{RegisterError, Service};
pub use types::Shape;
