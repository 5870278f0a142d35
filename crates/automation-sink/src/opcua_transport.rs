//! OPC UA client transport
//!
//! The `opcua` client API is synchronous; every call runs on the blocking pool.

use crate::error::AutomationError;
use crate::transport::{Identity, NodeTransport, NodeValue};
use async_trait::async_trait;
use opcua::client::prelude::*;
use opcua::sync::RwLock;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

type SharedSession = Arc<RwLock<Session>>;

/// OPC UA session transport (security mode None, user-name or anonymous identity)
///
/// Writes run one at a time on the blocking pool. A write whose caller was
/// cancelled still holds the lane until it returns, so it can never land
/// after a later write.
#[derive(Default)]
pub struct OpcUaTransport {
    session: Mutex<Option<SharedSession>>,
    write_lane: Arc<Mutex<()>>,
}

impl OpcUaTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&self) -> Option<SharedSession> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn replace(&self, next: Option<SharedSession>) -> Option<SharedSession> {
        let mut slot = self
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::replace(&mut *slot, next)
    }
}

fn is_session_gone(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BadNotConnected
            | StatusCode::BadConnectionClosed
            | StatusCode::BadSessionClosed
            | StatusCode::BadSessionIdInvalid
            | StatusCode::BadCommunicationError
            | StatusCode::BadTimeout
    )
}

fn to_variant(value: NodeValue) -> Variant {
    match value {
        NodeValue::Int32(v) => Variant::Int32(v),
        NodeValue::Boolean(v) => Variant::Boolean(v),
        NodeValue::String(v) => Variant::String(UAString::from(v)),
    }
}

fn open_session(endpoint: &str, identity: &Identity) -> Result<SharedSession, AutomationError> {
    let mut client = ClientBuilder::new()
        .application_name("Health Monitor")
        .application_uri("urn:health-monitor")
        .product_uri("urn:health-monitor")
        .trust_server_certs(true)
        .create_sample_keypair(true)
        .session_retry_limit(0)
        .client()
        .ok_or_else(|| AutomationError::Connection("invalid client configuration".to_string()))?;

    let token = match identity {
        Identity::Anonymous => IdentityToken::Anonymous,
        Identity::UserName { user, password } => {
            IdentityToken::UserName(user.clone(), password.clone())
        }
    };
    let description: EndpointDescription = (
        endpoint,
        SecurityPolicy::None.to_str(),
        MessageSecurityMode::None,
        UserTokenPolicy::anonymous(),
    )
        .into();

    client
        .connect_to_endpoint(description, token)
        .map_err(|status| AutomationError::Connection(status.to_string()))
}

fn write_node(session: &SharedSession, node: &str, value: NodeValue) -> Result<(), AutomationError> {
    let node_id = NodeId::from_str(node).map_err(|status| AutomationError::InvalidNode {
        node: node.to_string(),
        reason: status.to_string(),
    })?;
    let request = WriteValue {
        node_id,
        attribute_id: AttributeId::Value as u32,
        index_range: UAString::null(),
        value: DataValue::value_only(to_variant(value)),
    };

    let results = session.read().write(&[request]).map_err(|status| {
        if is_session_gone(status) {
            AutomationError::ConnectionLost(status.to_string())
        } else {
            AutomationError::WriteRejected {
                node: node.to_string(),
                status: status.to_string(),
            }
        }
    })?;

    match results.first() {
        Some(status) if status.is_good() => Ok(()),
        Some(status) => Err(AutomationError::WriteRejected {
            node: node.to_string(),
            status: status.to_string(),
        }),
        None => Err(AutomationError::WriteRejected {
            node: node.to_string(),
            status: "empty write response".to_string(),
        }),
    }
}

#[async_trait]
impl NodeTransport for OpcUaTransport {
    async fn connect(&self, endpoint: &str, identity: &Identity) -> Result<(), AutomationError> {
        let endpoint = endpoint.to_string();
        let identity = identity.clone();
        let session = tokio::task::spawn_blocking(move || open_session(&endpoint, &identity))
            .await
            .map_err(|e| AutomationError::Connection(e.to_string()))??;

        if let Some(previous) = self.replace(Some(session)) {
            let _ = tokio::task::spawn_blocking(move || previous.read().disconnect()).await;
        }
        info!("OPC UA session established");
        Ok(())
    }

    async fn write(&self, node: &str, value: NodeValue) -> Result<(), AutomationError> {
        let session = self
            .current()
            .ok_or_else(|| AutomationError::ConnectionLost("no session".to_string()))?;
        let node = node.to_string();
        let lane = Arc::clone(&self.write_lane);
        debug!("OPC UA write {}", node);

        tokio::task::spawn_blocking(move || {
            let _turn = lane.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            write_node(&session, &node, value)
        })
            .await
            .map_err(|e| AutomationError::ConnectionLost(e.to_string()))?
    }

    async fn disconnect(&self) {
        if let Some(session) = self.replace(None) {
            let _ = tokio::task::spawn_blocking(move || session.read().disconnect()).await;
        }
    }
}
