//! Registry of native classes and callback interfaces linked into the process.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::object::{MethodSig, NativeClass};

/// A callback interface that native code calls back into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDecl {
    pub name: String,
    pub methods: Vec<MethodSig>,
}

impl InterfaceDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    pub fn method(mut self, name: impl Into<String>, arity: usize) -> Self {
        self.methods.push(MethodSig::new(name, arity));
        self
    }
}

/// The set of native classes available to the running process.
///
/// A host platform shim populates the runtime once at startup with whatever
/// SDK classes it was able to link.
#[derive(Default)]
pub struct NativeRuntime {
    classes: RwLock<HashMap<String, Arc<dyn NativeClass>>>,
    interfaces: RwLock<HashMap<String, InterfaceDecl>>,
}

impl NativeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a class under its own name.
    pub fn register_class(&self, class: Arc<dyn NativeClass>) {
        let name = class.name().to_string();
        debug!(class = %name, "Registered native class");
        self.classes.write().insert(name, class);
    }

    pub fn register_interface(&self, interface: InterfaceDecl) {
        debug!(interface = %interface.name, "Registered callback interface");
        self.interfaces
            .write()
            .insert(interface.name.clone(), interface);
    }

    pub fn lookup_class(&self, name: &str) -> Option<Arc<dyn NativeClass>> {
        self.classes.read().get(name).cloned()
    }

    pub fn lookup_interface(&self, name: &str) -> Option<InterfaceDecl> {
        self.interfaces.read().get(name).cloned()
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.read().contains_key(name)
    }

    pub fn class_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.classes.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for NativeRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeRuntime")
            .field("classes", &self.class_names())
            .finish()
    }
}
