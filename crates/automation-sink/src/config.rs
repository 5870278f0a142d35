//! Automation Sink Configuration

use serde::{Deserialize, Serialize};

/// Node ids written each cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeMap {
    pub heart_rate: String,
    pub spo2: String,
    pub timestamp: String,
    pub arrhythmia: String,
    pub anomaly: String,
    pub bradycardia: String,
    pub tachycardia: String,
    /// Severity label
    pub status: String,
    /// Advisory text
    pub recommendation: String,
}

impl Default for NodeMap {
    fn default() -> Self {
        Self {
            heart_rate: "ns=3;i=1020".to_string(),
            spo2: "ns=3;i=1021".to_string(),
            timestamp: "ns=3;i=1022".to_string(),
            arrhythmia: "ns=3;i=1023".to_string(),
            anomaly: "ns=3;i=1024".to_string(),
            bradycardia: "ns=3;i=1025".to_string(),
            tachycardia: "ns=3;i=1026".to_string(),
            status: "ns=3;s=1027".to_string(),
            recommendation: "ns=3;s=1028".to_string(),
        }
    }
}

/// Automation sink configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationConfig {
    /// Server endpoint, e.g. `opc.tcp://plc.local:4840`; empty means not configured
    pub endpoint: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub nodes: NodeMap,
    /// Advisory text is cut to this many characters
    pub advisory_max_len: usize,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            username: None,
            password: None,
            nodes: NodeMap::default(),
            advisory_max_len: 2000,
        }
    }
}

impl AutomationConfig {
    pub fn is_configured(&self) -> bool {
        !self.endpoint.trim().is_empty()
    }
}
