use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ORIGIN, USER_AGENT};
use serde::de::DeserializeOwned;
use serde_json::{json, Value as JsonValue};
use tracing::{error, info, warn};

use crate::{
    api, ApiClient, Delivered, ProxyAgent, RequestSpec, Result, RetryPolicy, Wallet,
};

/// Binds one wallet identity to a transport configuration and exposes the
/// keeper's domain operations.
///
/// Every operation returns plain `bool` success and never propagates an
/// error to the caller; failures are logged and converted to `false`.
pub struct WalletSession {
    wallet: Wallet,
    proxy: ProxyAgent,
    client: ApiClient,
    base_url: String,
    headers: HeaderMap,
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(
        ORIGIN,
        HeaderValue::from_static("https://dashboard.layeredge.io"),
    );
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
        ),
    );
    headers
}

fn timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

fn decode<T: DeserializeOwned>(response: &Delivered) -> Option<api::Envelope<T>> {
    serde_json::from_str(&response.body).ok()
}

fn has_body(response: &Delivered) -> bool {
    !response.body.trim().is_empty()
}

impl WalletSession {
    pub fn new(wallet: Wallet, proxy: &ProxyAgent) -> Result<Self> {
        let client = ApiClient::new(proxy)?;
        Ok(Self {
            wallet,
            proxy: proxy.clone(),
            client,
            base_url: api::BASE_URL.to_owned(),
            headers: default_headers(),
        })
    }

    /// Points the session at a different API host. Used by tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Rebuilds the executor with a non-default retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Result<Self> {
        self.client = ApiClient::with_policy(&self.proxy, policy)?;
        Ok(self)
    }

    pub fn address(&self) -> &str {
        &self.wallet.address
    }

    async fn post(&self, url: String, body: JsonValue) -> Result<Delivered> {
        let spec = RequestSpec::post(url, body).with_headers(self.headers.clone());
        self.client.execute(&spec).await
    }

    async fn get(&self, url: String) -> Result<Delivered> {
        let spec = RequestSpec::get(url).with_headers(self.headers.clone());
        self.client.execute(&spec).await
    }

    fn absorb(&self, operation: &'static str, result: Result<bool>) -> bool {
        result.unwrap_or_else(|err| {
            error!(wallet = %self.wallet.address, error = %err, operation, "operation failed");
            false
        })
    }

    /// Verifies an invite code. True iff the server marks it valid.
    pub async fn check_invite(&self, code: &str) -> bool {
        let result = self.try_check_invite(code).await;
        self.absorb("check_invite", result)
    }

    async fn try_check_invite(&self, code: &str) -> Result<bool> {
        let response = self
            .post(
                api::verify_referral_url(&self.base_url),
                json!({ "invite_code": code }),
            )
            .await?;
        let valid = decode::<api::ReferralCheck>(&response)
            .and_then(|envelope| envelope.data)
            .map(|check| check.valid)
            .unwrap_or(false);
        if valid {
            info!(code, "invite code is valid");
        } else {
            warn!(code, status = response.status.as_u16(), "invite code rejected");
        }
        Ok(valid)
    }

    /// Registers the wallet under an invite code. True iff the server
    /// answered with any body at all.
    pub async fn register_wallet(&self, code: &str) -> bool {
        let result = self.try_register_wallet(code).await;
        self.absorb("register_wallet", result)
    }

    async fn try_register_wallet(&self, code: &str) -> Result<bool> {
        let response = self
            .post(
                api::register_wallet_url(&self.base_url, code),
                json!({ "walletAddress": self.wallet.address }),
            )
            .await?;
        let registered = has_body(&response);
        if registered {
            info!(wallet = %self.wallet.address, "wallet registered");
        } else {
            warn!(wallet = %self.wallet.address, "wallet registration returned no body");
        }
        Ok(registered)
    }

    /// Starts the node with a signed activation message. True iff the server
    /// confirms the action with its fixed success message.
    pub async fn connect_node(&self) -> bool {
        let result = self.try_connect_node().await;
        self.absorb("connect_node", result)
    }

    async fn try_connect_node(&self) -> Result<bool> {
        let timestamp = timestamp_ms();
        let message = api::activation_message(&self.wallet.address, timestamp);
        let sign = self.wallet.sign(&message)?;
        let response = self
            .post(
                api::node_action_url(&self.base_url, &self.wallet.address, "start"),
                json!({ "sign": sign, "timestamp": timestamp }),
            )
            .await?;
        let connected = decode::<JsonValue>(&response)
            .and_then(|envelope| envelope.message)
            .is_some_and(|message| message == api::NODE_ACTION_OK);
        if connected {
            info!(wallet = %self.wallet.address, "node connected");
        } else {
            warn!(
                wallet = %self.wallet.address,
                status = response.status.as_u16(),
                body = %response.body,
                "node connect not confirmed"
            );
        }
        Ok(connected)
    }

    /// Stops the node with a signed deactivation message, banking the points
    /// accrued during the run. True iff the server answered with a body.
    pub async fn stop_node(&self) -> bool {
        let result = self.try_stop_node().await;
        self.absorb("stop_node", result)
    }

    async fn try_stop_node(&self) -> Result<bool> {
        let timestamp = timestamp_ms();
        let message = api::deactivation_message(&self.wallet.address, timestamp);
        let sign = self.wallet.sign(&message)?;
        let response = self
            .post(
                api::node_action_url(&self.base_url, &self.wallet.address, "stop"),
                json!({ "sign": sign, "timestamp": timestamp }),
            )
            .await?;
        let stopped = has_body(&response);
        if stopped {
            info!(wallet = %self.wallet.address, "node stopped");
        }
        Ok(stopped)
    }

    /// Claims the daily point. An "already claimed" answer inside the
    /// cooldown window counts as informational success.
    pub async fn daily_check_in(&self) -> bool {
        let result = self.try_daily_check_in().await;
        self.absorb("daily_check_in", result)
    }

    async fn try_daily_check_in(&self) -> Result<bool> {
        let timestamp = timestamp_ms();
        let message = api::daily_claim_message(&self.wallet.address, timestamp);
        let sign = self.wallet.sign(&message)?;
        let response = self
            .post(
                api::claim_points_url(&self.base_url),
                json!({
                    "walletAddress": self.wallet.address,
                    "timestamp": timestamp,
                    "sign": sign,
                }),
            )
            .await?;

        if response.status.as_u16() == api::ALREADY_CLAIMED_STATUS {
            if let Some(text) = decode::<JsonValue>(&response).and_then(|envelope| envelope.message)
            {
                if text.to_lowercase().contains("already claimed") {
                    // Best-effort extraction of the cooldown phrase from a
                    // natural-language message; the exact wording is not a
                    // contract.
                    let cooldown = text
                        .split_once("after")
                        .map(|(_, rest)| rest.trim().trim_end_matches(['.', '!']))
                        .filter(|rest| !rest.is_empty())
                        .unwrap_or("later")
                        .to_owned();
                    info!(
                        wallet = %self.wallet.address,
                        cooldown = %cooldown,
                        "daily point already claimed"
                    );
                    return Ok(true);
                }
            }
        }

        let claimed = has_body(&response);
        if claimed {
            info!(wallet = %self.wallet.address, "daily point claimed");
        }
        Ok(claimed)
    }

    /// True iff the node is currently running, which the API signals with a
    /// non-null start timestamp.
    pub async fn check_node_status(&self) -> bool {
        let result = self.try_check_node_status().await;
        self.absorb("check_node_status", result)
    }

    async fn try_check_node_status(&self) -> Result<bool> {
        let response = self
            .get(api::node_status_url(&self.base_url, &self.wallet.address))
            .await?;
        let running = decode::<api::NodeStatus>(&response)
            .and_then(|envelope| envelope.data)
            .and_then(|status| status.start_timestamp)
            .is_some();
        info!(wallet = %self.wallet.address, running, "node status");
        Ok(running)
    }

    /// Fetches and logs the wallet's points total. Returns whether the call
    /// delivered a body, not anything about the point value.
    pub async fn check_node_points(&self) -> bool {
        let result = self.try_check_node_points().await;
        self.absorb("check_node_points", result)
    }

    async fn try_check_node_points(&self) -> Result<bool> {
        let response = self
            .get(api::wallet_details_url(&self.base_url, &self.wallet.address))
            .await?;
        if !has_body(&response) {
            return Ok(false);
        }
        let points = decode::<api::WalletDetails>(&response)
            .and_then(|envelope| envelope.data)
            .and_then(|details| details.node_points)
            .unwrap_or(0);
        info!(wallet = %self.wallet.address, points, "node points");
        Ok(true)
    }
}
