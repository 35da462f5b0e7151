//! Nexa Node - the main application entry point.
//!
//! Architecture:
//! - Single daemon process with shared RocksDB storage
//! - HTTP API for browser clients (form sessions, profiles, skills, uploads)

use crate::api;
use crate::error::{Error, Result};
use crate::sessions::{SessionRegistry, DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL};
use crate::storage::Storage;
use nexa_profile::{LabelCatalog, UploadPolicy, DEFAULT_MAX_UPLOAD_BYTES};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Configuration for a Nexa node.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Data directory for storage
    pub data_dir: PathBuf,

    /// HTTP API listen address
    pub api_addr: SocketAddr,

    /// Size limit for uploaded media
    pub max_upload_bytes: u64,

    /// Cap on open form sessions
    pub max_sessions: usize,

    /// Idle time after which a form session may be evicted
    pub session_ttl: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./nexa-data"),
            api_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_sessions: DEFAULT_MAX_SESSIONS,
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }
}

impl NodeConfig {
    /// Create config from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let data_dir = lookup("NEXA_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let api_addr = match lookup("NEXA_API_ADDR") {
            Some(addr) => addr
                .parse()
                .map_err(|e| Error::Config(format!("NEXA_API_ADDR={addr}: {e}")))?,
            None => defaults.api_addr,
        };

        let max_upload_bytes = match lookup("NEXA_MAX_UPLOAD_BYTES") {
            Some(bytes) => bytes
                .parse()
                .map_err(|e| Error::Config(format!("NEXA_MAX_UPLOAD_BYTES={bytes}: {e}")))?,
            None => defaults.max_upload_bytes,
        };

        let max_sessions = match lookup("NEXA_MAX_SESSIONS") {
            Some(n) => n
                .parse()
                .map_err(|e| Error::Config(format!("NEXA_MAX_SESSIONS={n}: {e}")))?,
            None => defaults.max_sessions,
        };

        let session_ttl = match lookup("NEXA_SESSION_TTL_SECS") {
            Some(secs) => secs
                .parse()
                .map(Duration::from_secs)
                .map_err(|e| Error::Config(format!("NEXA_SESSION_TTL_SECS={secs}: {e}")))?,
            None => defaults.session_ttl,
        };

        Ok(Self {
            data_dir,
            api_addr,
            max_upload_bytes,
            max_sessions,
            session_ttl,
        })
    }
}

/// Shared state for the node - single storage instance shared by all handlers.
pub struct NodeState {
    pub storage: Arc<Storage>,
    pub sessions: SessionRegistry,
    pub catalog: LabelCatalog,
    pub upload_policy: UploadPolicy,
    pub config: NodeConfig,
}

impl NodeState {
    /// Open storage and build the state for `config`.
    pub fn open(config: NodeConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        let storage = Arc::new(Storage::open(&config.data_dir)?);
        storage.init_default_labels()?;
        let catalog = storage.load_catalog()?;

        Ok(Self {
            storage,
            sessions: SessionRegistry::new(config.max_sessions, config.session_ttl),
            catalog,
            upload_policy: UploadPolicy::default().with_max_bytes(config.max_upload_bytes),
            config,
        })
    }
}

/// A Nexa node instance.
pub struct NexaNode {
    state: Arc<RwLock<NodeState>>,
    config: NodeConfig,
}

impl NexaNode {
    /// Create a new node.
    pub fn new(config: NodeConfig) -> Result<Self> {
        let state = Arc::new(RwLock::new(NodeState::open(config.clone())?));
        Ok(Self { state, config })
    }

    /// Get the shared state (for API handlers).
    pub fn state(&self) -> Arc<RwLock<NodeState>> {
        Arc::clone(&self.state)
    }

    /// Run the node (starts the HTTP server).
    pub async fn run(self) -> Result<()> {
        tracing::info!("Nexa node starting");
        tracing::info!("  API: http://{}", self.config.api_addr);
        tracing::info!("  Data: {:?}", self.config.data_dir);

        let app = api::build_router(self.state.clone());

        let listener = tokio::net::TcpListener::bind(self.config.api_addr).await?;
        tracing::info!("HTTP server listening on {}", self.config.api_addr);

        axum::serve(listener, app).await?;

        Ok(())
    }
}
