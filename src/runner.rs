use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::{api, KeeperError, ProxyAgent, Result, Wallet, WalletSession};

/// Pause between full passes over the wallet list.
const CYCLE_DELAY: Duration = Duration::from_secs(3_600);
/// Pause after a wallet whose sequence blew up, before moving on.
const WALLET_FAIL_DELAY: Duration = Duration::from_secs(5);

/// Drives the endless keep-alive loop over all wallets, strictly
/// sequentially, one proxy slot per wallet.
pub struct Runner {
    wallets: Vec<Wallet>,
    proxies: Vec<String>,
    base_url: String,
}

impl Runner {
    /// Validates the inputs. An empty wallet list is the one fatal startup
    /// condition; an empty proxy list only warns.
    pub fn new(wallets: Vec<Wallet>, proxies: Vec<String>) -> Result<Self> {
        if wallets.is_empty() {
            return Err(KeeperError::NoWallets);
        }
        if proxies.is_empty() {
            warn!("no proxies loaded, every wallet connects directly");
        }
        Ok(Self {
            wallets,
            proxies,
            base_url: api::BASE_URL.to_owned(),
        })
    }

    /// Points the runner at a different API host. Used by tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Runs forever: a full cycle over every wallet, then an hour of sleep.
    /// Only external termination stops it once it has started.
    pub async fn run(&self) -> Result<()> {
        loop {
            self.run_cycle().await;
            info!(
                delay_secs = CYCLE_DELAY.as_secs(),
                "cycle complete, sleeping"
            );
            sleep(CYCLE_DELAY).await;
        }
    }

    /// One pass over every wallet. A wallet whose sequence fails is logged
    /// and skipped after a short pause; the cycle always finishes.
    pub async fn run_cycle(&self) {
        for (index, wallet) in self.wallets.iter().enumerate() {
            let proxy = ProxyAgent::for_wallet(&self.proxies, index);
            info!(wallet = %wallet.address, index, proxy = ?proxy, "processing wallet");
            if let Err(err) = self.run_wallet(wallet.clone(), &proxy).await {
                error!(wallet = %wallet.address, error = %err, "wallet sequence failed");
                sleep(WALLET_FAIL_DELAY).await;
            }
        }
    }

    /// The per-wallet sequence. Operation results are ignored for control
    /// flow except the status probe, which decides whether to stop the node
    /// (banking its points) before the unconditional restart.
    async fn run_wallet(&self, wallet: Wallet, proxy: &ProxyAgent) -> Result<()> {
        let session = WalletSession::new(wallet, proxy)?.with_base_url(&self.base_url);
        session.daily_check_in().await;
        if session.check_node_status().await {
            session.stop_node().await;
        }
        session.connect_node().await;
        session.check_node_points().await;
        Ok(())
    }

    /// Verifies the invite code once, then registers every wallet under it.
    pub async fn register_all(&self, code: &str) -> Result<()> {
        for (index, wallet) in self.wallets.iter().enumerate() {
            let proxy = ProxyAgent::for_wallet(&self.proxies, index);
            let session =
                WalletSession::new(wallet.clone(), &proxy)?.with_base_url(&self.base_url);
            if index == 0 && !session.check_invite(code).await {
                return Err(KeeperError::Config(format!(
                    "invite code {code} was rejected"
                )));
            }
            session.register_wallet(code).await;
        }
        Ok(())
    }
}
