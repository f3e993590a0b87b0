use crate::{
    method::{MethodDescriptor, MethodSet, RpcObject},
    types::{is_exported_ident, is_ident, Shape},
};
use std::{collections::BTreeMap, sync::Arc};
use thiserror::Error;
use tracing::debug;

/// Maps qualified method names (`"<TypeName>.<MethodName>"`) to [`MethodDescriptor`]s.
///
/// Objects are added with [`register`](Service::register). Registration takes
/// `&mut self`, so it has to be finished before the service is shared with
/// [`serve`](Service::serve); lookups after that are read-only.
///
/// The same registrations also back the client side: [`call`](Service::call)
/// only sends names this service knows about.
#[derive(Default)]
pub struct Service {
    methods: BTreeMap<String, Arc<MethodDescriptor>>,
}

impl Service {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<S>(&mut self, object: S) -> Result<(), RegisterError>
    where
        S: RpcObject,
    {
        self.register_shared(Arc::new(object))
    }

    /// Registers every remotely callable method of `object`.
    ///
    /// Candidates with an unexported name or unexported payload types are
    /// skipped. An earlier method with the same qualified name is replaced.
    pub fn register_shared<S>(&mut self, object: Arc<S>) -> Result<(), RegisterError>
    where
        S: RpcObject,
    {
        let type_name = S::type_name();
        if !is_ident(type_name) {
            return Err(RegisterError::InvalidType(Shape::of::<S>().path()));
        }
        if !is_exported_ident(type_name) {
            return Err(RegisterError::UnexportedType(type_name.to_owned()));
        }

        for candidate in MethodSet::<S>::collect().into_candidates() {
            let name = format!("{type_name}.{}", candidate.name);
            if let Some(reason) = candidate.rejection() {
                debug!(method = %name, reason, "skipping method");
                continue;
            }
            debug!(method = %name, "registered method");
            let descriptor = MethodDescriptor::bind(name.clone(), candidate, object.clone());
            self.methods.insert(name, Arc::new(descriptor));
        }
        Ok(())
    }

    pub fn method(&self, name: &str) -> Option<&Arc<MethodDescriptor>> {
        self.methods.get(name)
    }

    /// Qualified names of all registered methods, sorted.
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegisterError {
    #[error("rpc: type {0} has no name")]
    InvalidType(&'static str),

    #[error("rpc: type name {0} is not exported")]
    UnexportedType(String),
}
