//! Client configuration

/// Configuration for the POS client core
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL (e.g. "http://localhost:8080")
    pub base_url: String,

    /// Realtime channel URL
    pub realtime_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Trailing debounce window for outbound mutations, in milliseconds
    pub debounce_window_ms: u64,

    /// Heartbeat ping interval while connected, in milliseconds
    pub heartbeat_interval_ms: u64,

    /// Base reconnect delay, in milliseconds
    pub reconnect_delay_ms: u64,

    /// Upper bound on reconnect attempts before giving up
    pub max_reconnect_attempts: u32,

    /// Number of room slots in the venue's fixed roster
    pub room_count: usize,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            realtime_url: base_url.clone(),
            base_url,
            timeout_secs: 30,
            debounce_window_ms: 1_000,
            heartbeat_interval_ms: 30_000,
            reconnect_delay_ms: 1_000,
            max_reconnect_attempts: 20,
            room_count: 19,
        }
    }

    /// Set the realtime channel URL
    pub fn with_realtime_url(mut self, url: impl Into<String>) -> Self {
        self.realtime_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_secs = seconds;
        self
    }

    /// Set the debounce window
    pub fn with_debounce_window(mut self, millis: u64) -> Self {
        self.debounce_window_ms = millis;
        self
    }

    /// Set the room roster size
    pub fn with_room_count(mut self, count: usize) -> Self {
        self.room_count = count;
        self
    }

    /// Create an HTTP backend client from this configuration
    pub fn build_backend_client(&self) -> crate::error::ClientResult<crate::api::HttpBackendClient> {
        crate::api::HttpBackendClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}
