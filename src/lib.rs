//! `edgekeeper` keeps LayerEdge light nodes alive for a set of wallets.
//!
//! Each cycle it walks the configured wallet list, claims the daily point,
//! restarts the node to bank accrued points, and reads the points balance,
//! routing every wallet's traffic through an optional HTTP or SOCKS proxy.
//!
//! The interesting part is [`ApiClient::execute`], which classifies failures
//! against the unreliable remote endpoint and retries them: exponential
//! backoff on server errors, a fixed interval on everything else.

pub mod api;
mod client;
mod error;
mod options;
mod proxy;
mod runner;
mod session;
mod wallet;

pub use client::{ApiClient, Delivered, RequestSpec};
pub use error::KeeperError;
pub use options::RetryPolicy;
pub use proxy::{load_proxies, ProxyAgent};
pub use runner::Runner;
pub use session::WalletSession;
pub use wallet::{load_wallets, Wallet};

pub type Result<T> = std::result::Result<T, KeeperError>;
