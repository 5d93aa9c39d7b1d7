//! Kestrel RPC client library.
//!
//! Provides an async HTTP client for the Kestrel daemon's JSON endpoints.
//!
//! # Example
//!
//! ```ignore
//! use kestrel_rpc::DaemonRpc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let daemon = DaemonRpc::new("http://localhost:11898").unwrap();
//!     let info = daemon.get_info().await.unwrap();
//!     println!("Height: {}", info.height);
//! }
//! ```

pub mod client;
pub mod daemon;
pub mod error;

pub use client::{RpcClient, RpcConfig};
pub use daemon::DaemonRpc;
pub use error::RpcError;

/// Default daemon RPC ports.
pub mod ports {
    pub const DAEMON_MAINNET: u16 = 11898;
    pub const DAEMON_TESTNET: u16 = 21898;
}
