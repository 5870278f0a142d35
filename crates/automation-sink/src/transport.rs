//! Node Transport Seam

use crate::error::AutomationError;
use async_trait::async_trait;
use std::fmt;

/// Typed value for a single node write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeValue {
    Int32(i32),
    Boolean(bool),
    String(String),
}

impl fmt::Display for NodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeValue::Int32(v) => write!(f, "Int32({})", v),
            NodeValue::Boolean(v) => write!(f, "Boolean({})", v),
            NodeValue::String(v) => write!(f, "String({} chars)", v.chars().count()),
        }
    }
}

/// Session identity
#[derive(Clone, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    UserName { user: String, password: String },
}

impl Identity {
    /// Username/password when both are present, anonymous otherwise
    pub fn from_credentials(user: Option<&str>, password: Option<&str>) -> Self {
        match (user, password) {
            (Some(user), Some(password)) if !user.is_empty() => Identity::UserName {
                user: user.to_string(),
                password: password.to_string(),
            },
            _ => Identity::Anonymous,
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Anonymous => write!(f, "Anonymous"),
            Identity::UserName { user, .. } => write!(f, "UserName({}, ***)", user),
        }
    }
}

/// Protocol client the sink writes through
#[async_trait]
pub trait NodeTransport: Send + Sync {
    /// Open a session; replaces any existing one
    async fn connect(&self, endpoint: &str, identity: &Identity) -> Result<(), AutomationError>;

    /// Write one value to one node
    async fn write(&self, node: &str, value: NodeValue) -> Result<(), AutomationError>;

    /// Close the session if open
    async fn disconnect(&self);
}

/// Transport used when the binary is built without OPC UA support
#[derive(Debug, Default)]
pub struct UnavailableTransport;

#[async_trait]
impl NodeTransport for UnavailableTransport {
    async fn connect(&self, _endpoint: &str, _identity: &Identity) -> Result<(), AutomationError> {
        Err(AutomationError::Unsupported(
            "built without the `opcua` feature".to_string(),
        ))
    }

    async fn write(&self, node: &str, _value: NodeValue) -> Result<(), AutomationError> {
        Err(AutomationError::ConnectionLost(format!("no session for {}", node)))
    }

    async fn disconnect(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_requires_both_credentials() {
        assert_eq!(Identity::from_credentials(None, Some("pw")), Identity::Anonymous);
        assert_eq!(Identity::from_credentials(Some(""), Some("pw")), Identity::Anonymous);
        assert_eq!(
            Identity::from_credentials(Some("operator"), Some("pw")),
            Identity::UserName {
                user: "operator".to_string(),
                password: "pw".to_string()
            }
        );
    }

    #[test]
    fn test_identity_debug_hides_password() {
        let identity = Identity::from_credentials(Some("operator"), Some("secret"));
        let rendered = format!("{:?}", identity);
        assert!(rendered.contains("operator"));
        assert!(!rendered.contains("secret"));
    }

    #[tokio::test]
    async fn test_unavailable_transport_refuses_connect() {
        let err = UnavailableTransport
            .connect("opc.tcp://localhost:4840", &Identity::Anonymous)
            .await
            .unwrap_err();
        assert!(matches!(err, AutomationError::Unsupported(_)));
    }
}
