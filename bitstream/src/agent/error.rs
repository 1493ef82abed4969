// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

pub type Result<T, E = AgentError> = std::result::Result<T, E>;

/// Errors raised while sending a signed request to the replica.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Invalid replica url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Canister id must not be empty")]
    InvalidCanisterId,
    #[error("No replica url or transport was given to the agent builder")]
    MissingTransport,
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Replica answered with HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("The signed request channel has expired")]
    ChannelExpired,
    #[error("The session delegation does not cover canister {0}")]
    CanisterNotTargeted(String),
    #[error("Call to {method} was rejected with code {code}: {message}")]
    Rejected {
        method: String,
        code: u64,
        message: String,
    },
    #[error("Failed to serialise request: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Malformed reply from the replica: {0}")]
    MalformedReply(String),
}

impl AgentError {
    /// Whether rebuilding the agent with a fresh identity may let the request through.
    pub fn is_channel_expired(&self) -> bool {
        matches!(self, AgentError::ChannelExpired)
    }
}

/// Replica messages that indicate the request or its delegation is no longer valid.
pub(crate) fn mentions_expiry(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("ingress_expiry") || message.contains("expired")
}
