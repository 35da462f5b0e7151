//! Nexa Node - profile form service
//!
//! Hosts profile-completion form sessions for browser clients of the Nexa
//! marketplace and persists submitted specialist profiles.
//!
//! # Architecture
//!
//! - **Sessions**: one [`nexa_profile::ProfileForm`] per open browser form
//! - **Storage**: RocksDB-backed profiles and skill labels; also the
//!   submission authority for forms
//! - **API**: HTTP endpoints for form editing, profiles, skills and uploads
//!
//! # Example
//!
//! ```no_run
//! use nexa_node::{NexaNode, NodeConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = NodeConfig::from_env()?;
//!     let node = NexaNode::new(config)?;
//!     node.run().await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod error;
pub mod node;
pub mod record;
pub mod sessions;
pub mod storage;

pub use error::{Error, Result};
pub use node::{NexaNode, NodeConfig, NodeState};
pub use record::StoredProfile;
pub use sessions::SessionRegistry;
pub use storage::Storage;
