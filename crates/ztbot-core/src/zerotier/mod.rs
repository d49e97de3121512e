//! HTTP client for the ZeroTier Central member API.
//!
//! Wraps reqwest for member authorize/deauthorize (POST of a partial
//! update) and member listing (GET). Identifiers are validated before any
//! network call. Authorize and deauthorize are idempotent on the remote
//! side, so retrying after a transport error is always safe; no retries
//! happen here.

pub mod types;

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use tracing::{debug, warn};

pub use self::types::{Member, MemberConfig, MemberPatch};

/// Base URL of the ZeroTier Central API.
pub const ZEROTIER_API_URL: &str = "https://my.zerotier.com/api";

/// Bound on any single API call; there is no cancellation beyond this.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

static NODE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[0-9a-f]{10}$").expect("node id pattern"));
static NETWORK_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[0-9a-f]{16}$").expect("network id pattern"));

/// Errors from ZeroTier API operations.
///
/// Malformed identifiers are rejected locally; `Http` covers every
/// transport-level failure (DNS, TLS, timeout, malformed response body).
/// A non-success remote status is not an error: the authorize and
/// deauthorize calls report it as `Ok(false)` so callers can phrase a
/// user-facing failure.
#[derive(Debug, thiserror::Error)]
pub enum ZeroTierError {
    #[error("invalid NodeID format")]
    InvalidNodeId,

    #[error("invalid NetworkID format")]
    InvalidNetworkId,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// ZeroTier Central API client, scoped to one default network.
pub struct ZeroTierApi {
    client: Client,
    base_url: String,
    access_token: String,
    default_network: String,
}

impl ZeroTierApi {
    /// Create a client for the production API.
    pub fn new(access_token: &str, default_network: &str) -> Result<Self, ZeroTierError> {
        Self::with_base_url(access_token, default_network, ZEROTIER_API_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(
        access_token: &str,
        default_network: &str,
        base_url: &str,
    ) -> Result<Self, ZeroTierError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            default_network: default_network.to_string(),
        })
    }

    /// The network this bot administers.
    pub fn default_network(&self) -> &str {
        &self.default_network
    }

    /// Authorize `node_id` in `network_id`, attaching the supplied
    /// metadata. An empty `short_name` leaves the remote name untouched.
    ///
    /// `Ok(true)` iff the remote answered with a success status; a
    /// non-success status is logged and reported as `Ok(false)`.
    pub async fn auth_member(
        &self,
        network_id: &str,
        node_id: &str,
        short_name: &str,
        description: &str,
    ) -> Result<bool, ZeroTierError> {
        validate_ids(network_id, node_id)?;
        let patch = MemberPatch {
            hidden: false,
            name: (!short_name.is_empty()).then(|| short_name.to_string()),
            description: Some(description.to_string()),
            config: MemberConfig {
                authorized: true,
                ip_assignments: Vec::new(),
            },
        };
        self.post_member(network_id, node_id, &patch).await
    }

    /// Clear the authorization flag of `node_id` in `network_id`, leaving
    /// all other metadata as-is. Same result semantics as
    /// [`ZeroTierApi::auth_member`].
    pub async fn unauth_member(
        &self,
        network_id: &str,
        node_id: &str,
    ) -> Result<bool, ZeroTierError> {
        validate_ids(network_id, node_id)?;
        let patch = MemberPatch {
            hidden: false,
            name: None,
            description: None,
            config: MemberConfig {
                authorized: false,
                ip_assignments: Vec::new(),
            },
        };
        self.post_member(network_id, node_id, &patch).await
    }

    /// List the members of `network_id`.
    ///
    /// A non-success remote status yields an empty list, logged but not
    /// raised: the remote API gives no way to tell a failed listing from a
    /// genuinely empty network, and this client keeps that ambiguity
    /// rather than invent a distinction (see DESIGN.md).
    pub async fn list_members(&self, network_id: &str) -> Result<Vec<Member>, ZeroTierError> {
        if !NETWORK_ID_RE.is_match(network_id) {
            return Err(ZeroTierError::InvalidNetworkId);
        }

        let resp = self
            .client
            .get(format!("{}/network/{network_id}/member", self.base_url))
            .header("Authorization", format!("bearer {}", self.access_token))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            warn!(%status, network_id, "failed to list network members");
            return Ok(Vec::new());
        }

        Ok(resp.json().await?)
    }

    async fn post_member(
        &self,
        network_id: &str,
        node_id: &str,
        patch: &MemberPatch,
    ) -> Result<bool, ZeroTierError> {
        debug!(
            network_id,
            node_id,
            authorized = patch.config.authorized,
            "posting member update"
        );

        let resp = self
            .client
            .post(format!(
                "{}/network/{network_id}/member/{node_id}",
                self.base_url
            ))
            .header("Authorization", format!("bearer {}", self.access_token))
            .json(patch)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            warn!(%status, network_id, node_id, "member update rejected");
        }

        Ok(status.is_success())
    }
}

fn validate_ids(network_id: &str, node_id: &str) -> Result<(), ZeroTierError> {
    if !NETWORK_ID_RE.is_match(network_id) {
        return Err(ZeroTierError::InvalidNetworkId);
    }
    if !NODE_ID_RE.is_match(node_id) {
        return Err(ZeroTierError::InvalidNodeId);
    }
    Ok(())
}
