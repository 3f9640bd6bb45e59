//! Client configuration types.
//!
//! [`ClientConfig`] is the single source of truth for all runtime settings.
//! Keeping it a plain struct (no global state, no environment reads) makes
//! the client easy to embed in tests and host applications; the embedding
//! application decides where the values come from.

use std::time::Duration;

/// All runtime configuration for the UKey WebSocket client.
///
/// # Example
///
/// ```rust
/// use ukey_client::ClientConfig;
///
/// // Defaults match a locally installed control process:
/// let cfg = ClientConfig::default();
/// assert_eq!(cfg.ws_url, "wss://127.0.0.1:1237");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket URL of the native control process.
    ///
    /// The control process listens on a loopback TLS endpoint with a fixed
    /// port; a plain `ws://` URL also works against test peers.
    pub ws_url: String,

    /// Class id of the remote control, appended to every command as
    /// `"<Command>|<control_class_id>"`.
    ///
    /// Vendor-specific; there is no meaningful default, so the placeholder
    /// must be overridden before talking to real hardware.
    pub control_class_id: String,

    /// Module name sent in the `LoadModule` bootstrap frame.
    pub module_name: String,

    /// How long a single command may stay in flight before it fails with a
    /// transport error and is removed from the pending table.
    ///
    /// Token operations that require user presence (PIN entry on a pinpad
    /// device) can be slow, hence the generous default.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    /// Returns a `ClientConfig` suitable for a locally installed control
    /// process.
    ///
    /// | Field              | Default                 |
    /// |--------------------|-------------------------|
    /// | ws_url             | `wss://127.0.0.1:1237`  |
    /// | control_class_id   | empty (must be set)     |
    /// | module_name        | `IActiveXCtrl`          |
    /// | request_timeout    | 30 seconds              |
    fn default() -> Self {
        Self {
            ws_url: "wss://127.0.0.1:1237".to_string(),
            control_class_id: String::new(),
            module_name: "IActiveXCtrl".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ws_url_is_loopback_tls() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.ws_url, "wss://127.0.0.1:1237");
    }

    #[test]
    fn test_default_module_name() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.module_name, "IActiveXCtrl");
    }

    #[test]
    fn test_default_request_timeout_is_30s() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_config_can_be_cloned() {
        // Cloneability is required so the façade and session can each keep
        // their own copy.
        let cfg = ClientConfig {
            control_class_id: "{ABC}".to_string(),
            ..ClientConfig::default()
        };
        let cloned = cfg.clone();
        assert_eq!(cfg.control_class_id, cloned.control_class_id);
        assert_eq!(cfg.ws_url, cloned.ws_url);
    }

    #[test]
    fn test_custom_values_are_stored() {
        let cfg = ClientConfig {
            ws_url: "ws://127.0.0.1:9000".to_string(),
            control_class_id: "{F0E2}".to_string(),
            module_name: "ITestCtrl".to_string(),
            request_timeout: Duration::from_secs(5),
        };
        assert_eq!(cfg.ws_url, "ws://127.0.0.1:9000");
        assert_eq!(cfg.control_class_id, "{F0E2}");
        assert_eq!(cfg.module_name, "ITestCtrl");
        assert_eq!(cfg.request_timeout, Duration::from_secs(5));
    }
}
