//! Callback proxies: Rust closures presented to native code as an object
//! implementing a named callback interface.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::error::NativeFault;
use crate::object::{MethodSig, NativeObject};
use crate::runtime::InterfaceDecl;
use crate::value::Value;

/// Handler invoked when native code calls a proxied interface method.
pub type CallbackHandler = Arc<dyn Fn(Vec<Value>) -> Value + Send + Sync>;

/// Handlers keyed by interface method name.
#[derive(Clone, Default)]
pub struct Callbacks {
    handlers: HashMap<String, CallbackHandler>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for `method`; replaces any earlier one.
    pub fn on<F>(mut self, method: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Vec<Value>) -> Value + Send + Sync + 'static,
    {
        self.handlers.insert(method.into(), Arc::new(handler));
        self
    }

    pub fn contains(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    fn get(&self, method: &str) -> Option<&CallbackHandler> {
        self.handlers.get(method)
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("Callbacks").field("methods", &names).finish()
    }
}

/// Object satisfying an [`InterfaceDecl`] by dispatching to [`Callbacks`].
///
/// Dispatch is synchronous on whichever thread native code calls from.
/// Methods without a handler return [`Value::Null`].
pub(crate) struct CallbackProxy {
    interface: InterfaceDecl,
    callbacks: Callbacks,
}

impl CallbackProxy {
    pub(crate) fn new(interface: InterfaceDecl, callbacks: Callbacks) -> Self {
        Self {
            interface,
            callbacks,
        }
    }
}

impl NativeObject for CallbackProxy {
    fn type_name(&self) -> &str {
        &self.interface.name
    }

    fn methods(&self) -> &[MethodSig] {
        &self.interface.methods
    }

    fn call(&self, index: usize, args: Vec<Value>) -> Result<Value, NativeFault> {
        let sig = self.interface.methods.get(index).ok_or_else(|| {
            NativeFault::new(format!(
                "{}: no method at index {}",
                self.interface.name, index
            ))
        })?;

        match self.callbacks.get(&sig.name) {
            Some(handler) => {
                trace!(interface = %self.interface.name, method = %sig.name, "Dispatching callback");
                Ok(handler(args))
            }
            None => Ok(Value::Null),
        }
    }

    fn implements(&self, interface: &str) -> bool {
        self.interface.name == interface
    }
}
