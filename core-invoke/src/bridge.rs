//! The bridge facade used by Real adapters.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::error::{InvokeError, Result};
use crate::object::{resolve, NativeClass};
use crate::proxy::{CallbackProxy, Callbacks};
use crate::runtime::NativeRuntime;
use crate::value::{Handle, Value};

/// String-addressed access to the classes of a [`NativeRuntime`].
#[derive(Clone)]
pub struct DynamicBridge {
    runtime: Arc<NativeRuntime>,
}

impl DynamicBridge {
    pub fn new(runtime: Arc<NativeRuntime>) -> Self {
        Self { runtime }
    }

    pub fn runtime(&self) -> &Arc<NativeRuntime> {
        &self.runtime
    }

    pub fn has_class(&self, class_name: &str) -> bool {
        self.runtime.has_class(class_name)
    }

    /// Fail with [`InvokeError::CapabilityAbsent`] unless `marker_class` is linked.
    pub fn require(&self, marker_class: &str) -> Result<()> {
        if self.runtime.has_class(marker_class) {
            Ok(())
        } else {
            Err(InvokeError::CapabilityAbsent(marker_class.to_string()))
        }
    }

    fn class(&self, class_name: &str) -> Result<Arc<dyn NativeClass>> {
        self.runtime
            .lookup_class(class_name)
            .ok_or_else(|| InvokeError::ClassNotFound(class_name.to_string()))
    }

    /// Construct `class_name` with the first constructor whose arity matches.
    #[instrument(skip(self, args), fields(arity = args.len()))]
    pub fn instantiate(&self, class_name: &str, args: Vec<Value>) -> Result<Handle> {
        let class = self.class(class_name)?;
        let index = class
            .constructors()
            .iter()
            .position(|arity| *arity == args.len())
            .ok_or_else(|| InvokeError::MethodNotFound {
                type_name: class_name.to_string(),
                method: "<init>".to_string(),
                arity: args.len(),
            })?;

        class
            .construct(index, args)
            .map_err(|fault| InvokeError::Construction {
                type_name: class_name.to_string(),
                fault,
            })
    }

    /// Instantiate `builder_class` with no arguments, apply `steps` as
    /// single-argument setters in the given order, then call `build()`.
    ///
    /// The bridge adds no ordering rules of its own; a native builder that
    /// validates setter order will report it as an invocation failure.
    pub fn build<I, S>(&self, builder_class: &str, steps: I) -> Result<Handle>
    where
        I: IntoIterator<Item = (S, Value)>,
        S: AsRef<str>,
    {
        let builder = self.instantiate(builder_class, Vec::new())?;
        for (setter, value) in steps {
            self.invoke(&builder, setter.as_ref(), vec![value])?;
        }

        let built = self.invoke(&builder, "build", Vec::new())?;
        let actual = built.type_label();
        built.into_object().ok_or(InvokeError::UnexpectedReturn {
            target: format!("{builder_class}.build"),
            expected: "object",
            actual,
        })
    }

    /// Call `method` on `target`, resolved by name and argument count.
    ///
    /// If several declared methods share name and arity the first declared
    /// one is used.
    pub fn invoke(&self, target: &Handle, method: &str, args: Vec<Value>) -> Result<Value> {
        let type_name = target.type_name().to_string();
        let index = resolve(target.methods(), method, args.len()).ok_or_else(|| {
            InvokeError::MethodNotFound {
                type_name: type_name.clone(),
                method: method.to_string(),
                arity: args.len(),
            }
        })?;

        debug!(target_type = %type_name, method, "Invoking native method");
        target.call(index, args).map_err(|fault| {
            warn!(target_type = %type_name, method, %fault, "Native method raised");
            InvokeError::Invocation {
                target: format!("{type_name}.{method}"),
                fault,
            }
        })
    }

    pub fn invoke_static(&self, class_name: &str, method: &str, args: Vec<Value>) -> Result<Value> {
        let class = self.class(class_name)?;
        let index = resolve(class.static_methods(), method, args.len()).ok_or_else(|| {
            InvokeError::MethodNotFound {
                type_name: class_name.to_string(),
                method: method.to_string(),
                arity: args.len(),
            }
        })?;

        debug!(class = class_name, method, "Invoking static native method");
        class
            .call_static(index, args)
            .map_err(|fault| InvokeError::Invocation {
                target: format!("{class_name}.{method}"),
                fault,
            })
    }

    pub fn get_static(&self, class_name: &str, field: &str) -> Result<Value> {
        self.class(class_name)?
            .static_field(field)
            .ok_or_else(|| InvokeError::FieldNotFound {
                class: class_name.to_string(),
                field: field.to_string(),
            })
    }

    /// Create an object implementing `interface_name` whose methods dispatch
    /// to `callbacks`. Interface methods without a handler return null.
    pub fn make_callback_proxy(&self, interface_name: &str, callbacks: Callbacks) -> Result<Handle> {
        let interface = self
            .runtime
            .lookup_interface(interface_name)
            .ok_or_else(|| InvokeError::InterfaceNotFound(interface_name.to_string()))?;

        for sig in &interface.methods {
            if !callbacks.contains(&sig.name) {
                debug!(
                    interface = interface_name,
                    method = %sig.name,
                    "Callback method has no handler; it will return null"
                );
            }
        }

        Ok(Arc::new(CallbackProxy::new(interface, callbacks)))
    }
}

impl fmt::Debug for DynamicBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicBridge")
            .field("runtime", &self.runtime)
            .finish()
    }
}
