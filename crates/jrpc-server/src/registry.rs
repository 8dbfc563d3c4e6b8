use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::RegistryError;
use crate::handler::RpcHandler;

/// Method name to handler lookup.
///
/// Filled during setup and then shared read-only (usually behind an `Arc`)
/// by every request; there is no removal.
#[derive(Default, Clone)]
pub struct MethodRegistry {
    handlers: HashMap<String, Arc<dyn RpcHandler>>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under its own [`RpcHandler::method_name`]
    pub fn register<H>(&mut self, handler: H) -> Result<(), RegistryError>
    where
        H: RpcHandler + 'static,
    {
        self.register_arc(Arc::new(handler))
    }

    /// Register a handler that is already shared elsewhere
    pub fn register_arc(&mut self, handler: Arc<dyn RpcHandler>) -> Result<(), RegistryError> {
        let method = handler.method_name().to_string();
        if method.is_empty() {
            return Err(RegistryError::EmptyMethodName);
        }
        if self.handlers.contains_key(&method) {
            return Err(RegistryError::DuplicateMethod(method));
        }

        debug!("Registered JSON-RPC method: {}", method);
        self.handlers.insert(method, handler);
        Ok(())
    }

    pub fn lookup(&self, method: &str) -> Option<&Arc<dyn RpcHandler>> {
        self.handlers.get(method)
    }

    pub fn contains(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Registered method names, sorted
    pub fn methods(&self) -> Vec<String> {
        let mut methods: Vec<String> = self.handlers.keys().cloned().collect();
        methods.sort();
        methods
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodRegistry")
            .field("methods", &self.methods())
            .finish()
    }
}
