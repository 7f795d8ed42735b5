//! Native object and class contracts, plus closure-backed implementations.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::NativeFault;
use crate::value::{Handle, Value};

/// Declared method signature: name plus argument count.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSig {
    pub name: String,
    pub arity: usize,
}

impl MethodSig {
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }
}

/// Index of the first declared signature matching `name` and `arity`.
pub(crate) fn resolve(sigs: &[MethodSig], name: &str, arity: usize) -> Option<usize> {
    sigs.iter()
        .position(|sig| sig.name == name && sig.arity == arity)
}

/// A live object owned by native code.
///
/// Methods are exposed as an ordered table; the bridge resolves a call to a
/// table index and then invokes [`call`](NativeObject::call) with it.
pub trait NativeObject: Send + Sync {
    /// Fully qualified native type name
    fn type_name(&self) -> &str;

    /// Declared methods, in declaration order
    fn methods(&self) -> &[MethodSig];

    /// Invoke the method at `index` of [`methods`](NativeObject::methods)
    fn call(&self, index: usize, args: Vec<Value>) -> Result<Value, NativeFault>;

    /// Whether this object satisfies the named interface
    fn implements(&self, _interface: &str) -> bool {
        false
    }
}

impl fmt::Debug for dyn NativeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeObject({})", self.type_name())
    }
}

/// A native class: constructors, static methods and static fields.
pub trait NativeClass: Send + Sync {
    fn name(&self) -> &str;

    /// Arity of each declared constructor, in declaration order
    fn constructors(&self) -> Vec<usize>;

    /// Run the constructor at `index` of [`constructors`](NativeClass::constructors)
    fn construct(&self, index: usize, args: Vec<Value>) -> Result<Handle, NativeFault>;

    fn static_methods(&self) -> &[MethodSig] {
        &[]
    }

    fn call_static(&self, _index: usize, _args: Vec<Value>) -> Result<Value, NativeFault> {
        Err(NativeFault::new("class declares no static methods"))
    }

    fn static_field(&self, _name: &str) -> Option<Value> {
        None
    }
}

type MethodFn = Arc<dyn Fn(Vec<Value>) -> Result<Value, NativeFault> + Send + Sync>;
type CtorFn = Arc<dyn Fn(Vec<Value>) -> Result<Handle, NativeFault> + Send + Sync>;

/// Closure-backed [`NativeObject`].
///
/// Platform shims use it to expose SDK objects; tests use it to fake them.
/// State shared between methods lives in whatever the closures capture.
pub struct DynObject {
    type_name: String,
    interfaces: Vec<String>,
    sigs: Vec<MethodSig>,
    bodies: Vec<MethodFn>,
}

impl DynObject {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            interfaces: Vec::new(),
            sigs: Vec::new(),
            bodies: Vec::new(),
        }
    }

    /// Declare a method. Later declarations with the same name and arity are
    /// shadowed by earlier ones.
    pub fn method<F>(mut self, name: impl Into<String>, arity: usize, body: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, NativeFault> + Send + Sync + 'static,
    {
        self.sigs.push(MethodSig::new(name, arity));
        self.bodies.push(Arc::new(body));
        self
    }

    pub fn implementing(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn into_handle(self) -> Handle {
        Arc::new(self)
    }
}

impl fmt::Debug for DynObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynObject")
            .field("type_name", &self.type_name)
            .field("methods", &self.sigs)
            .finish()
    }
}

impl NativeObject for DynObject {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn methods(&self) -> &[MethodSig] {
        &self.sigs
    }

    fn call(&self, index: usize, args: Vec<Value>) -> Result<Value, NativeFault> {
        let body = self.bodies.get(index).ok_or_else(|| {
            NativeFault::new(format!("{}: no method at index {}", self.type_name, index))
        })?;
        body(args)
    }

    fn implements(&self, interface: &str) -> bool {
        self.interfaces.iter().any(|i| i == interface)
    }
}

/// Closure-backed [`NativeClass`].
pub struct DynClass {
    name: String,
    ctors: Vec<(usize, CtorFn)>,
    static_sigs: Vec<MethodSig>,
    static_bodies: Vec<MethodFn>,
    fields: HashMap<String, Value>,
}

impl DynClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ctors: Vec::new(),
            static_sigs: Vec::new(),
            static_bodies: Vec::new(),
            fields: HashMap::new(),
        }
    }

    pub fn constructor<F>(mut self, arity: usize, body: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Handle, NativeFault> + Send + Sync + 'static,
    {
        self.ctors.push((arity, Arc::new(body)));
        self
    }

    pub fn static_method<F>(mut self, name: impl Into<String>, arity: usize, body: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, NativeFault> + Send + Sync + 'static,
    {
        self.static_sigs.push(MethodSig::new(name, arity));
        self.static_bodies.push(Arc::new(body));
        self
    }

    pub fn static_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

impl fmt::Debug for DynClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynClass")
            .field("name", &self.name)
            .field("constructors", &self.constructors())
            .field("static_methods", &self.static_sigs)
            .finish()
    }
}

impl NativeClass for DynClass {
    fn name(&self) -> &str {
        &self.name
    }

    fn constructors(&self) -> Vec<usize> {
        self.ctors.iter().map(|(arity, _)| *arity).collect()
    }

    fn construct(&self, index: usize, args: Vec<Value>) -> Result<Handle, NativeFault> {
        let (_, body) = self.ctors.get(index).ok_or_else(|| {
            NativeFault::new(format!("{}: no constructor at index {}", self.name, index))
        })?;
        body(args)
    }

    fn static_methods(&self) -> &[MethodSig] {
        &self.static_sigs
    }

    fn call_static(&self, index: usize, args: Vec<Value>) -> Result<Value, NativeFault> {
        let body = self.static_bodies.get(index).ok_or_else(|| {
            NativeFault::new(format!("{}: no static method at index {}", self.name, index))
        })?;
        body(args)
    }

    fn static_field(&self, name: &str) -> Option<Value> {
        self.fields.get(name).cloned()
    }
}
