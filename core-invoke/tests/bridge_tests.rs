//! Integration tests for the dynamic invocation bridge
//!
//! A small fake SDK is registered into a `NativeRuntime` and driven purely
//! through string names, the same way Real wallet adapters drive the
//! provider SDKs.

use core_invoke::{
    Callbacks, DynClass, DynObject, DynamicBridge, FailureKind, Handle, InterfaceDecl,
    InvokeError, NativeFault, NativeRuntime, Value,
};
use std::sync::{Arc, Mutex};

const BUILDER: &str = "sdk.Request$Builder";
const CLIENT: &str = "sdk.Client";
const LISTENER: &str = "sdk.OnCompleteListener";

fn request_builder_class(log: Arc<Mutex<Vec<String>>>) -> DynClass {
    DynClass::new(BUILDER).constructor(0, move |_| {
        let fields = Arc::new(Mutex::new(Vec::<(String, Value)>::new()));
        let log = Arc::clone(&log);

        let set_name = Arc::clone(&fields);
        let set_digits = Arc::clone(&fields);
        let build_fields = Arc::clone(&fields);
        let name_log = Arc::clone(&log);
        let digits_log = Arc::clone(&log);

        Ok(DynObject::new(BUILDER)
            .method("setDisplayName", 1, move |args| {
                name_log.lock().unwrap().push("setDisplayName".into());
                set_name
                    .lock()
                    .unwrap()
                    .push(("displayName".into(), args[0].clone()));
                Ok(Value::Null)
            })
            .method("setLastDigits", 1, move |args| {
                let digits = args[0].as_str().unwrap_or_default().to_string();
                if digits.len() != 4 {
                    return Err(NativeFault::new("last digits must have length 4"));
                }
                digits_log.lock().unwrap().push("setLastDigits".into());
                set_digits
                    .lock()
                    .unwrap()
                    .push(("lastDigits".into(), Value::from(digits)));
                Ok(Value::Null)
            })
            .method("build", 0, move |_| {
                let snapshot = build_fields.lock().unwrap().clone();
                let request = DynObject::new("sdk.Request").method("fields", 0, move |_| {
                    Ok(Value::Map(snapshot.iter().cloned().collect()))
                });
                Ok(Value::Object(request.into_handle()))
            })
            .into_handle())
    })
}

fn client_class() -> DynClass {
    DynClass::new(CLIENT)
        .static_field("CARD_NETWORK_VISA", 4)
        .static_method("getClient", 0, |_| {
            Ok(Value::Object(
                DynObject::new(CLIENT)
                    // Two overloads with the same name and arity: the first one wins
                    .method("lookup", 1, |args| {
                        Ok(Value::from(format!("by-id:{}", args[0].as_str().unwrap_or(""))))
                    })
                    .method("lookup", 1, |_| Ok(Value::from("by-other")))
                    .method("lookup", 2, |_| Ok(Value::from("two-args")))
                    .method("fail", 0, |_| Err(NativeFault::with_status(15002, "no wallet")))
                    .method("runAsync", 1, |args| {
                        let listener = args[0].as_object().cloned().ok_or_else(|| {
                            NativeFault::new("listener required")
                        })?;
                        // Call back from another thread, as provider SDKs do
                        std::thread::spawn(move || {
                            let index = listener
                                .methods()
                                .iter()
                                .position(|sig| sig.name == "onComplete")
                                .unwrap();
                            listener.call(index, vec![Value::from("done")]).unwrap();
                        })
                        .join()
                        .unwrap();
                        Ok(Value::Null)
                    })
                    .into_handle(),
            ))
        })
}

fn bridge() -> (DynamicBridge, Arc<Mutex<Vec<String>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let runtime = Arc::new(NativeRuntime::new());
    runtime.register_class(Arc::new(request_builder_class(Arc::clone(&log))));
    runtime.register_class(Arc::new(client_class()));
    runtime.register_interface(
        InterfaceDecl::new(LISTENER)
            .method("onComplete", 1)
            .method("onCanceled", 0),
    );
    (DynamicBridge::new(runtime), log)
}

fn client(bridge: &DynamicBridge) -> Handle {
    bridge
        .invoke_static(CLIENT, "getClient", vec![])
        .unwrap()
        .into_object()
        .unwrap()
}

#[test]
fn test_build_applies_setters_in_order() {
    let (bridge, log) = bridge();

    let request = bridge
        .build(
            BUILDER,
            vec![
                ("setLastDigits", Value::from("4242")),
                ("setDisplayName", Value::from("Everyday Visa")),
            ],
        )
        .unwrap();

    assert_eq!(request.type_name(), "sdk.Request");
    assert_eq!(*log.lock().unwrap(), vec!["setLastDigits", "setDisplayName"]);

    let fields = bridge.invoke(&request, "fields", vec![]).unwrap();
    let fields = fields.as_map().unwrap();
    assert_eq!(fields.get("lastDigits"), Some(&Value::from("4242")));
    assert_eq!(fields.get("displayName"), Some(&Value::from("Everyday Visa")));
}

#[test]
fn test_build_surfaces_native_validation() {
    let (bridge, _) = bridge();

    let err = bridge
        .build(BUILDER, vec![("setLastDigits", Value::from("42"))])
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::InvocationRaised);
    assert!(matches!(err, InvokeError::Invocation { ref target, .. } if target == "sdk.Request$Builder.setLastDigits"));
}

#[test]
fn test_build_unknown_setter() {
    let (bridge, _) = bridge();

    let err = bridge
        .build(BUILDER, vec![("setColor", Value::from("red"))])
        .unwrap_err();

    assert_eq!(
        err,
        InvokeError::MethodNotFound {
            type_name: BUILDER.to_string(),
            method: "setColor".to_string(),
            arity: 1,
        }
    );
}

#[test]
fn test_invoke_uses_first_declared_overload() {
    let (bridge, _) = bridge();
    let client = client(&bridge);

    let one = bridge.invoke(&client, "lookup", vec![Value::from("x")]).unwrap();
    let two = bridge
        .invoke(&client, "lookup", vec![Value::from("x"), Value::from(1)])
        .unwrap();

    assert_eq!(one.as_str(), Some("by-id:x"));
    assert_eq!(two.as_str(), Some("two-args"));
}

#[test]
fn test_invocation_carries_status() {
    let (bridge, _) = bridge();
    let client = client(&bridge);

    let err = bridge.invoke(&client, "fail", vec![]).unwrap_err();
    assert_eq!(err.kind(), FailureKind::InvocationRaised);
    assert_eq!(err.native_status(), Some(15002));
}

#[test]
fn test_missing_targets() {
    let (bridge, _) = bridge();

    let err = bridge.instantiate("sdk.Missing", vec![]).unwrap_err();
    assert_eq!(err.kind(), FailureKind::TargetNotFound);

    let err = bridge.instantiate(BUILDER, vec![Value::Null]).unwrap_err();
    assert!(matches!(err, InvokeError::MethodNotFound { ref method, arity: 1, .. } if method == "<init>"));

    let err = bridge.get_static(CLIENT, "CARD_NETWORK_JCB").unwrap_err();
    assert_eq!(err.kind(), FailureKind::TargetNotFound);

    let err = bridge
        .make_callback_proxy("sdk.Unknown", Callbacks::new())
        .unwrap_err();
    assert_eq!(err, InvokeError::InterfaceNotFound("sdk.Unknown".to_string()));
}

#[test]
fn test_require_reports_absent_capability() {
    let (bridge, _) = bridge();

    assert!(bridge.require(CLIENT).is_ok());
    let err = bridge.require("other.sdk.Marker").unwrap_err();
    assert_eq!(err.kind(), FailureKind::CapabilityAbsent);
}

#[test]
fn test_static_field() {
    let (bridge, _) = bridge();
    assert_eq!(
        bridge.get_static(CLIENT, "CARD_NETWORK_VISA").unwrap(),
        Value::Int(4)
    );
}

#[test]
fn test_callback_proxy_dispatches_from_native_thread() {
    let (bridge, _) = bridge();
    let client = client(&bridge);

    let received = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&received);
    let listener = bridge
        .make_callback_proxy(
            LISTENER,
            Callbacks::new().on("onComplete", move |args| {
                *slot.lock().unwrap() = args.into_iter().next();
                Value::Null
            }),
        )
        .unwrap();

    assert!(listener.implements(LISTENER));
    bridge
        .invoke(&client, "runAsync", vec![Value::Object(listener.clone())])
        .unwrap();
    assert_eq!(*received.lock().unwrap(), Some(Value::from("done")));

    // No handler registered for onCanceled: neutral default
    assert_eq!(bridge.invoke(&listener, "onCanceled", vec![]).unwrap(), Value::Null);
}
