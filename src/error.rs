use reqwest::header::HeaderMap;

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum KeeperError {
    /// Network or request execution error from `reqwest`.
    #[error("transport error for {method} {url}: {source}")]
    Transport {
        method: String,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// Server-side HTTP failure (status 500 and above) with the response
    /// body and the request context needed to debug it.
    #[error("http {status} {status_text} for {method} {url}: {body}")]
    Http {
        status: u16,
        status_text: String,
        method: String,
        url: String,
        body: String,
        /// Headers the failing request was sent with.
        request_headers: HeaderMap,
    },
    /// Wallet key parsing or message signing failure.
    #[error("signer error: {0}")]
    Signer(String),
    /// Wallet file, proxy file, or proxy URI problem.
    #[error("config error: {0}")]
    Config(String),
    /// The wallet file loaded to an empty list. Fatal at startup.
    #[error("wallet list is empty; nothing to run")]
    NoWallets,
}
