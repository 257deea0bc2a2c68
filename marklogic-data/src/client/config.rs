use crate::errors::{DataError, DataResult, ErrorKind};
use std::fmt::{Debug, Display, Formatter};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8000;

/// Credentials used when a connection is established.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum Authentication {
    #[default]
    None,
    Basic { username: String, password: String },
    Digest { username: String, password: String },
    /// Client certificate authentication, referencing a PKCS#12 file
    Certificate { path: String },
}

impl Authentication {
    pub fn username(&self) -> Option<&str> {
        match self {
            Authentication::Basic { username, .. } | Authentication::Digest { username, .. } => {
                Some(username)
            }
            _ => None,
        }
    }
}

impl Debug for Authentication {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Authentication::None => write!(f, "None"),
            Authentication::Basic { username, .. } => write!(f, "Basic({}, ****)", username),
            Authentication::Digest { username, .. } => write!(f, "Digest({}, ****)", username),
            Authentication::Certificate { path } => write!(f, "Certificate({})", path),
        }
    }
}

/// Connection settings for a document store.
///
/// The settings are only consumed at connection-construction time; nothing in
/// this crate reads them afterwards except for logging.
///
/// # Examples
///
/// ```rust,ignore
/// use marklogic_data::client::{Authentication, ClientConfig};
///
/// let config = ClientConfig::builder()
///     .host("ml.internal")
///     .port(8010)
///     .database("orders")
///     .authentication(Authentication::Digest {
///         username: "app".into(),
///         password: "secret".into(),
///     })
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    host: String,
    port: u16,
    database: Option<String>,
    authentication: Authentication,
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    pub fn authentication(&self) -> &Authentication {
        &self.authentication
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database: None,
            authentication: Authentication::None,
        }
    }
}

impl Display for ClientConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)?;
        if let Some(database) = &self.database {
            write!(f, "/{}", database)?;
        }
        Ok(())
    }
}

/// Builder for [`ClientConfig`].
///
/// Validation errors are captured when a setter is called and returned from
/// [`build`](ClientConfigBuilder::build); later setters are ignored once an
/// error has been recorded.
#[derive(Default)]
pub struct ClientConfigBuilder {
    error: Option<DataError>,
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        ClientConfigBuilder {
            error: None,
            config: ClientConfig::default(),
        }
    }

    pub fn host(mut self, host: &str) -> Self {
        if self.error.is_none() {
            if host.trim().is_empty() {
                log::error!("Host name cannot be empty");
                self.error = Some(DataError::new(
                    "Host name cannot be empty",
                    ErrorKind::InvalidConfiguration,
                ));
            } else {
                self.config.host = host.trim().to_string();
            }
        }
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        if self.error.is_none() {
            if port == 0 {
                log::error!("Port must be greater than zero");
                self.error = Some(DataError::new(
                    "Port must be greater than zero",
                    ErrorKind::InvalidConfiguration,
                ));
            } else {
                self.config.port = port;
            }
        }
        self
    }

    pub fn database(mut self, database: &str) -> Self {
        if self.error.is_none() {
            if database.trim().is_empty() {
                log::error!("Database name cannot be empty");
                self.error = Some(DataError::new(
                    "Database name cannot be empty",
                    ErrorKind::InvalidConfiguration,
                ));
            } else {
                self.config.database = Some(database.trim().to_string());
            }
        }
        self
    }

    pub fn authentication(mut self, authentication: Authentication) -> Self {
        if self.error.is_none() {
            if let Some(username) = authentication.username() {
                if username.is_empty() {
                    log::error!("Username cannot be empty");
                    self.error = Some(DataError::new(
                        "Username cannot be empty",
                        ErrorKind::InvalidConfiguration,
                    ));
                    return self;
                }
            }
            self.config.authentication = authentication;
        }
        self
    }

    pub fn build(self) -> DataResult<ClientConfig> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.config),
        }
    }
}
