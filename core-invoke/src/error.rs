use thiserror::Error;

/// Failure raised by native code while running a constructor or method.
///
/// Native SDKs report failures as exceptions that may carry a numeric status
/// (e.g. an API status code). The bridge wraps them in
/// [`InvokeError::Construction`] or [`InvokeError::Invocation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeFault {
    pub status: Option<i32>,
    pub message: String,
}

impl NativeFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(status: i32, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for NativeFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {})", self.message, status),
            None => f.write_str(&self.message),
        }
    }
}

/// Coarse classification of bridge failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The native capability is not linked into this process
    CapabilityAbsent,
    /// A class, method, field or interface could not be resolved
    TargetNotFound,
    /// Native code ran and raised, or returned something unusable
    InvocationRaised,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    #[error("Native capability absent: {0}")]
    CapabilityAbsent(String),

    #[error("Class not found: {0}")]
    ClassNotFound(String),

    #[error("Method not found: {type_name}.{method} with {arity} argument(s)")]
    MethodNotFound {
        type_name: String,
        method: String,
        arity: usize,
    },

    #[error("Field not found: {class}.{field}")]
    FieldNotFound { class: String, field: String },

    #[error("Callback interface not found: {0}")]
    InterfaceNotFound(String),

    #[error("Construction of {type_name} failed: {fault}")]
    Construction { type_name: String, fault: NativeFault },

    #[error("Invocation of {target} raised: {fault}")]
    Invocation { target: String, fault: NativeFault },

    #[error("Unexpected value from {target}: expected {expected}, got {actual}")]
    UnexpectedReturn {
        target: String,
        expected: &'static str,
        actual: &'static str,
    },
}

impl InvokeError {
    pub fn kind(&self) -> FailureKind {
        match self {
            InvokeError::CapabilityAbsent(_) => FailureKind::CapabilityAbsent,
            InvokeError::ClassNotFound(_)
            | InvokeError::MethodNotFound { .. }
            | InvokeError::FieldNotFound { .. }
            | InvokeError::InterfaceNotFound(_) => FailureKind::TargetNotFound,
            InvokeError::Construction { .. }
            | InvokeError::Invocation { .. }
            | InvokeError::UnexpectedReturn { .. } => FailureKind::InvocationRaised,
        }
    }

    /// Native status code carried by a raised failure, if any.
    pub fn native_status(&self) -> Option<i32> {
        match self {
            InvokeError::Construction { fault, .. } | InvokeError::Invocation { fault, .. } => {
                fault.status
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, InvokeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            InvokeError::CapabilityAbsent("x".into()).kind(),
            FailureKind::CapabilityAbsent
        );
        assert_eq!(
            InvokeError::MethodNotFound {
                type_name: "a.B".into(),
                method: "c".into(),
                arity: 2,
            }
            .kind(),
            FailureKind::TargetNotFound
        );
        assert_eq!(
            InvokeError::Invocation {
                target: "a.B.c".into(),
                fault: NativeFault::new("boom"),
            }
            .kind(),
            FailureKind::InvocationRaised
        );
    }

    #[test]
    fn test_native_status() {
        let error = InvokeError::Invocation {
            target: "client.getActiveWalletId".into(),
            fault: NativeFault::with_status(15002, "no active wallet"),
        };
        assert_eq!(error.native_status(), Some(15002));
        assert_eq!(
            error.to_string(),
            "Invocation of client.getActiveWalletId raised: no active wallet (status 15002)"
        );
        assert_eq!(InvokeError::ClassNotFound("x".into()).native_status(), None);
    }
}
