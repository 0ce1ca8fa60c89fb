//! Relay server configuration.

use std::net::SocketAddr;
use std::time::Duration;

use relay_translate::TranslatorConfig;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 10000;

/// Default timeout for the outbound webhook call.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the relay server.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Address to bind the HTTP server to.
    pub bind_addr: SocketAddr,
    /// Google Chat incoming webhook URL.
    pub webhook_url: Option<String>,
    /// Message format and action filter settings.
    pub translator: TranslatorConfig,
    /// Timeout for the outbound webhook call.
    pub delivery_timeout: Duration,
    /// Log translated messages instead of posting them.
    pub dry_run: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            webhook_url: None,
            translator: TranslatorConfig::default(),
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
            dry_run: false,
        }
    }
}

impl RelayConfig {
    /// Create a new configuration with the specified bind address.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Self::default()
        }
    }

    /// Set the Google Chat webhook URL. Blank URLs are ignored.
    #[must_use]
    pub fn with_webhook_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.webhook_url = if url.trim().is_empty() { None } else { Some(url) };
        self
    }

    /// Render cards instead of plain text.
    #[must_use]
    pub const fn with_rich_cards(mut self, enabled: bool) -> Self {
        self.translator.use_rich_cards = enabled;
        self
    }

    /// Forward every issue action instead of only `created`.
    #[must_use]
    pub const fn with_all_actions(mut self, enabled: bool) -> Self {
        self.translator.process_all_actions = enabled;
        self
    }

    /// Set the delivery timeout.
    #[must_use]
    pub const fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    /// Log messages instead of posting them.
    #[must_use]
    pub const fn with_dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();

        assert_eq!(config.bind_addr.port(), 10000);
        assert!(config.webhook_url.is_none());
        assert!(!config.translator.use_rich_cards);
        assert!(!config.translator.process_all_actions);
        assert_eq!(config.delivery_timeout, Duration::from_secs(10));
        assert!(!config.dry_run);
    }

    #[test]
    fn test_config_builder() {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 9000);
        let config = RelayConfig::new(addr)
            .with_webhook_url("https://chat.googleapis.com/v1/spaces/AAA/messages?key=k")
            .with_rich_cards(true)
            .with_all_actions(true)
            .with_delivery_timeout(Duration::from_secs(3))
            .with_dry_run(true);

        assert_eq!(config.bind_addr, addr);
        assert!(config.webhook_url.is_some());
        assert!(config.translator.use_rich_cards);
        assert!(config.translator.process_all_actions);
        assert_eq!(config.delivery_timeout, Duration::from_secs(3));
        assert!(config.dry_run);
    }

    #[test]
    fn test_blank_webhook_url_is_unset() {
        let config = RelayConfig::default().with_webhook_url("  ");

        assert!(config.webhook_url.is_none());
    }
}
