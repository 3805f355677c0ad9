//! Configuration for the registry clients and the HTTP transport.

use std::path::PathBuf;
use std::time::Duration;

/// Default replication endpoint of DAWA (Dataforsyningen)
pub const DEFAULT_REPLICATION_BASE_URL: &str = "https://api.dataforsyningen.dk/replikering";

/// Default DAR REST endpoint of Datafordeler
pub const DEFAULT_DATAFORDELER_BASE_URL: &str = "https://services.datafordeler.dk/DAR/DAR/3.0.0/rest";

/// Default file download API of Datafordeler
pub const DEFAULT_FILE_API_BASE_URL: &str = "https://api.datafordeler.dk";

/// Default page size for paged REST queries
pub const DEFAULT_PAGE_SIZE: usize = 200;

/// Page size used by the legacy access address import
pub const LEGACY_ACCESS_ADDRESS_PAGE_SIZE: usize = 5000;

/// Configuration for the replication client
#[derive(Debug, Clone)]
pub struct ReplicationConfig {
    /// Base URL of the replication API, without trailing slash
    pub base_url: String,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_REPLICATION_BASE_URL.to_string(),
        }
    }
}

/// Configuration for the paged/bulk Datafordeler client
#[derive(Debug, Clone)]
pub struct DatafordelerConfig {
    /// Base URL of the DAR REST service
    pub base_url: String,
    /// Base URL of the file download API
    pub file_api_base_url: String,
    /// API key sent with file catalog and file download requests
    pub api_key: Option<String>,
    /// Page size for every entity except access addresses
    pub page_size: usize,
    /// Page size for access addresses
    pub access_address_page_size: usize,
    /// Parent directory for downloaded archives, system temp dir when `None`
    pub temp_dir: Option<PathBuf>,
}

impl Default for DatafordelerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_DATAFORDELER_BASE_URL.to_string(),
            file_api_base_url: DEFAULT_FILE_API_BASE_URL.to_string(),
            api_key: None,
            page_size: DEFAULT_PAGE_SIZE,
            access_address_page_size: DEFAULT_PAGE_SIZE,
            temp_dir: None,
        }
    }
}

impl DatafordelerConfig {
    /// Configuration matching the legacy access address import (5000 records per page)
    #[must_use]
    pub fn legacy() -> Self {
        Self {
            access_address_page_size: LEGACY_ACCESS_ADDRESS_PAGE_SIZE,
            ..Self::default()
        }
    }

    /// Set the API key used for file downloads
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

/// Configuration for the `reqwest` based transport
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Timeout for establishing a connection
    pub connect_timeout: Duration,
    /// User agent header
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            user_agent: concat!("dawa-address/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
