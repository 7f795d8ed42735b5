//! # Dynamic Invocation Bridge
//!
//! Calls into native wallet SDKs that may not be linked into the running
//! process, using only string-identified classes, methods and fields.
//!
//! ## Overview
//!
//! The host platform shim (JNI glue on Android, a fake SDK in tests)
//! registers every native class it links into a [`NativeRuntime`]. Adapters
//! never see those classes at compile time; they go through a
//! [`DynamicBridge`], which offers:
//!
//! - [`instantiate`](DynamicBridge::instantiate) - construct an object by class name
//! - [`build`](DynamicBridge::build) - drive a builder-style class through its setters
//! - [`invoke`](DynamicBridge::invoke) - call a method by name and argument count
//! - [`invoke_static`](DynamicBridge::invoke_static) / [`get_static`](DynamicBridge::get_static)
//! - [`make_callback_proxy`](DynamicBridge::make_callback_proxy) - satisfy a callback
//!   interface with plain Rust closures
//!
//! ## Method resolution
//!
//! Methods are resolved by name and arity only. When several declared methods
//! share both, the first one in declaration order is used. Overloads that
//! differ only in argument types therefore cannot be told apart; callers that
//! need a specific overload must make sure it is declared first.
//!
//! ## Failures
//!
//! Every operation returns [`InvokeError`], whose [`kind`](InvokeError::kind)
//! separates "capability absent", "target not found" and "invocation raised".
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use core_invoke::{DynClass, DynObject, DynamicBridge, NativeRuntime, Value};
//!
//! let runtime = Arc::new(NativeRuntime::new());
//! runtime.register_class(Arc::new(DynClass::new("demo.Greeter").constructor(0, |_| {
//!     Ok(DynObject::new("demo.Greeter")
//!         .method("greet", 1, |args| {
//!             let name = args[0].as_str().unwrap_or("stranger").to_string();
//!             Ok(Value::from(format!("hello {name}")))
//!         })
//!         .into_handle())
//! })));
//!
//! let bridge = DynamicBridge::new(runtime);
//! let greeter = bridge.instantiate("demo.Greeter", vec![]).unwrap();
//! let reply = bridge.invoke(&greeter, "greet", vec![Value::from("ada")]).unwrap();
//! assert_eq!(reply.as_str(), Some("hello ada"));
//! ```

pub mod bridge;
pub mod error;
pub mod object;
pub mod proxy;
pub mod runtime;
pub mod value;

pub use bridge::DynamicBridge;
pub use error::{FailureKind, InvokeError, NativeFault, Result};
pub use object::{DynClass, DynObject, MethodSig, NativeClass, NativeObject};
pub use proxy::{CallbackHandler, Callbacks};
pub use runtime::{InterfaceDecl, NativeRuntime};
pub use value::{Handle, Value};
