use std::collections::HashMap;
use std::net::IpAddr;

/// Request information for authentication
#[derive(Debug, Clone)]
pub struct AuthRequest {
    /// Header names lowercased
    pub headers: HashMap<String, String>,
    pub source_ip: IpAddr,
}

/// Authenticated identity
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
    pub method: String,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            user_id: "anonymous".to_string(),
            method: "none".to_string(),
        }
    }
}
