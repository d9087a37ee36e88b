use serde::{Deserialize, Serialize};

/// One chat line. Built once by a connection handler, then only read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub timestamp: i64,
    pub username:  String,
    #[serde(rename = "message")]
    #[sqlx(rename = "message")]
    pub body:      String,
}

/// What a client is allowed to send; the server fills in the rest.
#[derive(Debug, Deserialize)]
struct Inbound {
    #[serde(default)]
    timestamp: i64,
    message:   String,
}

impl Message {
    pub fn new(username: impl Into<String>, body: impl Into<String>, timestamp: i64) -> Self {
        Self { timestamp, username: username.into(), body: body.into() }
    }

    /// Parse a client frame. The sender name always comes from the
    /// authenticated session; a missing or zero timestamp becomes "now".
    pub fn from_client(raw: &[u8], username: &str) -> serde_json::Result<Self> {
        let p: Inbound = serde_json::from_slice(raw)?;
        let timestamp = if p.timestamp > 0 { p.timestamp } else { chrono::Utc::now().timestamp() };
        Ok(Self::new(username, p.message, timestamp))
    }

    pub fn to_json(&self) -> String {
        // only plain strings and integers, serialisation can't fail
        serde_json::to_string(self).unwrap_or_default()
    }
}
