//! Endpoint layout, signed-message templates, and response shapes for the
//! LayerEdge referral API.

use serde::Deserialize;

/// Production API host.
pub const BASE_URL: &str = "https://referralapi.layeredge.io/api";

/// Body message the server returns when a node start/stop is accepted.
pub const NODE_ACTION_OK: &str = "node action executed successfully";

/// Status the daily claim endpoint answers with when the point was already
/// claimed inside the cooldown window.
pub const ALREADY_CLAIMED_STATUS: u16 = 405;

pub fn verify_referral_url(base: &str) -> String {
    format!("{base}/referral/verify-referral-code")
}

pub fn register_wallet_url(base: &str, code: &str) -> String {
    format!("{base}/referral/register-wallet/{code}")
}

pub fn node_action_url(base: &str, address: &str, action: &str) -> String {
    format!("{base}/light-node/node-action/{address}/{action}")
}

pub fn node_status_url(base: &str, address: &str) -> String {
    format!("{base}/light-node/node-status/{address}")
}

pub fn wallet_details_url(base: &str, address: &str) -> String {
    format!("{base}/referral/wallet-details/{address}")
}

pub fn claim_points_url(base: &str) -> String {
    format!("{base}/light-node/claim-node-points")
}

// The server verifies each signature against the exact byte sequence these
// templates produce. Do not reword them.

pub fn activation_message(address: &str, timestamp_ms: u64) -> String {
    format!("Node activation request for {address} at {timestamp_ms}")
}

pub fn deactivation_message(address: &str, timestamp_ms: u64) -> String {
    format!("Node deactivation request for {address} at {timestamp_ms}")
}

pub fn daily_claim_message(address: &str, timestamp_ms: u64) -> String {
    format!("I am claiming my daily node point for {address} at {timestamp_ms}")
}

/// Message + data envelope every endpoint responds with.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralCheck {
    #[serde(default)]
    pub valid: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatus {
    /// Millisecond timestamp of the current run; null while stopped.
    #[serde(default)]
    pub start_timestamp: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletDetails {
    #[serde(default)]
    pub node_points: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_message_templates_are_byte_exact() {
        let address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
        assert_eq!(
            activation_message(address, 1_700_000_000_000),
            "Node activation request for 0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266 at 1700000000000"
        );
        assert_eq!(
            deactivation_message(address, 1_700_000_000_000),
            "Node deactivation request for 0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266 at 1700000000000"
        );
        assert_eq!(
            daily_claim_message(address, 1_700_000_000_000),
            "I am claiming my daily node point for 0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266 at 1700000000000"
        );
    }

    #[test]
    fn urls_interpolate_address_and_action() {
        assert_eq!(
            node_action_url(BASE_URL, "0xabc", "start"),
            "https://referralapi.layeredge.io/api/light-node/node-action/0xabc/start"
        );
        assert_eq!(
            node_status_url("http://127.0.0.1:9000/api", "0xabc"),
            "http://127.0.0.1:9000/api/light-node/node-status/0xabc"
        );
        assert_eq!(
            register_wallet_url(BASE_URL, "CODE42"),
            "https://referralapi.layeredge.io/api/referral/register-wallet/CODE42"
        );
    }

    #[test]
    fn envelope_tolerates_missing_fields() {
        let envelope: Envelope<NodeStatus> = serde_json::from_str(r#"{}"#).expect("must parse");
        assert!(envelope.message.is_none());
        assert!(envelope.data.is_none());

        let envelope: Envelope<NodeStatus> =
            serde_json::from_str(r#"{"message":"ok","data":{"startTimestamp":null}}"#)
                .expect("must parse");
        assert_eq!(envelope.message.as_deref(), Some("ok"));
        assert!(envelope.data.expect("data present").start_timestamp.is_none());
    }
}
