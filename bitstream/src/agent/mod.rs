// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Signed request channel to the replica hosting the payment-stream canister.
//!
//! Every request is wrapped in an [`Envelope`] whose content is hashed into a request id and
//! signed by the caller's identity. Anonymous requests travel unsigned.

mod error;
mod http;

pub use error::{AgentError, Result};
pub use http::HttpTransport;

pub(crate) use error::mentions_expiry;

use crate::{
    identity::{Identity, Principal, SignedDelegation},
    utils::{duration_nanos, now_nanos},
};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::{sync::Arc, time::Duration};

const REQUEST_DOMAIN: &[u8] = b"bitstream-request";

/// Default lifetime of a signed request. 5 mins
pub const DEFAULT_INGRESS_EXPIRY: Duration = Duration::from_secs(5 * 60);

/// Default timeout for a single HTTP exchange with the replica.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    /// Read-only, answered by a single replica.
    Query,
    /// State-changing, goes through consensus.
    Call,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Query => "query",
            RequestKind::Call => "call",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeContent {
    pub request_type: RequestKind,
    pub canister_id: String,
    pub method_name: String,
    /// Positional arguments as a JSON array.
    pub arg: Value,
    pub sender: Principal,
    /// Nanoseconds since the unix epoch after which the replica refuses the request.
    pub ingress_expiry: u64,
}

impl EnvelopeContent {
    /// SHA-256 over the domain tag and the serialised content.
    pub fn request_id(&self) -> Result<[u8; 32]> {
        let mut hasher = Sha256::new();
        hasher.update(REQUEST_DOMAIN);
        hasher.update(serde_json::to_vec(self)?);
        Ok(hasher.finalize().into())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub content: EnvelopeContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_pubkey: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_sig: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_delegation: Option<Vec<SignedDelegation>>,
}

/// What the replica answers a query or call with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Reply {
    Replied {
        reply: Value,
    },
    Rejected {
        reject_code: u64,
        reject_message: String,
    },
}

/// Moves envelopes to a replica.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Replica status, used as a reachability probe.
    async fn status(&self) -> Result<Value>;

    async fn submit(&self, canister_id: &str, envelope: &Envelope) -> Result<Reply>;
}

/// Sends requests as one identity over one transport.
#[derive(Clone)]
pub struct Agent {
    transport: Arc<dyn Transport>,
    identity: Identity,
    ingress_expiry: Duration,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("identity", &self.identity)
            .field("ingress_expiry", &self.ingress_expiry)
            .finish()
    }
}

impl Agent {
    pub fn builder() -> AgentBuilder {
        AgentBuilder::default()
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn principal(&self) -> Principal {
        self.identity.principal()
    }

    pub async fn status(&self) -> Result<Value> {
        self.transport.status().await
    }

    pub async fn query<A, R>(&self, canister_id: &str, method_name: &str, args: &A) -> Result<R>
    where
        A: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.request(RequestKind::Query, canister_id, method_name, args)
            .await
    }

    pub async fn call<A, R>(&self, canister_id: &str, method_name: &str, args: &A) -> Result<R>
    where
        A: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.request(RequestKind::Call, canister_id, method_name, args)
            .await
    }

    /// Builds and signs the envelope without sending it.
    pub fn sign_request<A>(
        &self,
        kind: RequestKind,
        canister_id: &str,
        method_name: &str,
        args: &A,
    ) -> Result<Envelope>
    where
        A: Serialize + ?Sized,
    {
        let now = now_nanos();
        if self.identity.is_expired_at(now) {
            return Err(AgentError::ChannelExpired);
        }
        if !self.identity.allows(canister_id) {
            return Err(AgentError::CanisterNotTargeted(canister_id.to_string()));
        }

        let content = EnvelopeContent {
            request_type: kind,
            canister_id: canister_id.to_string(),
            method_name: method_name.to_string(),
            arg: serde_json::to_value(args)?,
            sender: self.identity.principal(),
            ingress_expiry: now.saturating_add(duration_nanos(self.ingress_expiry)),
        };
        let request_id = content.request_id()?;
        let auth = self.identity.sign(&request_id);

        Ok(Envelope {
            content,
            sender_pubkey: auth.as_ref().map(|auth| auth.sender_pubkey.clone()),
            sender_sig: auth.as_ref().map(|auth| auth.sender_sig.clone()),
            sender_delegation: auth.and_then(|auth| auth.sender_delegation),
        })
    }

    async fn request<A, R>(
        &self,
        kind: RequestKind,
        canister_id: &str,
        method_name: &str,
        args: &A,
    ) -> Result<R>
    where
        A: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let envelope = self.sign_request(kind, canister_id, method_name, args)?;

        #[cfg(feature = "loud")]
        println!(
            "Sending {} {method_name} to {canister_id} as {}",
            kind.as_str(),
            envelope.content.sender
        );
        trace!(
            "Sending {} {method_name} to {canister_id} as {}",
            kind.as_str(),
            envelope.content.sender
        );

        match self.transport.submit(canister_id, &envelope).await? {
            Reply::Replied { reply } => serde_json::from_value(reply).map_err(|err| {
                AgentError::MalformedReply(format!("{method_name} reply: {err}"))
            }),
            Reply::Rejected {
                reject_code,
                reject_message,
            } => {
                if mentions_expiry(&reject_message) {
                    debug!("{method_name} rejected as expired: {reject_message}");
                    return Err(AgentError::ChannelExpired);
                }
                Err(AgentError::Rejected {
                    method: method_name.to_string(),
                    code: reject_code,
                    message: reject_message,
                })
            }
        }
    }
}

/// Builder for [`Agent`]. Needs either a replica url or a transport.
pub struct AgentBuilder {
    url: Option<String>,
    transport: Option<Arc<dyn Transport>>,
    identity: Identity,
    ingress_expiry: Duration,
    request_timeout: Duration,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self {
            url: None,
            transport: None,
            identity: Identity::Anonymous,
            ingress_expiry: DEFAULT_INGRESS_EXPIRY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl AgentBuilder {
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Use this transport instead of HTTP. Takes precedence over the url.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_ingress_expiry(mut self, ingress_expiry: Duration) -> Self {
        self.ingress_expiry = ingress_expiry;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let transport = match (self.transport, self.url) {
            (Some(transport), _) => transport,
            (None, Some(url)) => Arc::new(HttpTransport::new(&url, self.request_timeout)?),
            (None, None) => return Err(AgentError::MissingTransport),
        };
        Ok(Agent {
            transport,
            identity: self.identity,
            ingress_expiry: self.ingress_expiry,
        })
    }
}
