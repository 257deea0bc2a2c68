use crate::client::ClientConfig;

/// Configuration for an in-memory client.
///
/// # Purpose
/// `InMemoryClientConfig` carries the connection settings reported through
/// [`DatabaseClient::config`](crate::client::DatabaseClient::config) together
/// with the server limits the in-memory store enforces.
///
/// # Usage
/// ```text
/// let config = InMemoryClientConfig::new().max_open_transactions(4);
/// let client = InMemoryClient::with_config(config);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryClientConfig {
    client_config: ClientConfig,
    max_open_transactions: Option<usize>,
}

impl InMemoryClientConfig {
    pub fn new() -> InMemoryClientConfig {
        InMemoryClientConfig::default()
    }

    pub fn client_config(mut self, client_config: ClientConfig) -> Self {
        self.client_config = client_config;
        self
    }

    /// Caps the number of transactions that may be open at once; further
    /// requests fail with a limit-exceeded error.
    pub fn max_open_transactions(mut self, limit: usize) -> Self {
        self.max_open_transactions = Some(limit);
        self
    }

    pub fn connection(&self) -> &ClientConfig {
        &self.client_config
    }

    pub fn transaction_limit(&self) -> Option<usize> {
        self.max_open_transactions
    }
}
