// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use super::{error::mentions_expiry, AgentError, Envelope, Reply, Result, Transport};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Talks to a replica over its HTTP interface.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let mut base_url = Url::parse(url).map_err(|err| AgentError::InvalidUrl {
            url: url.to_string(),
            reason: err.to_string(),
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(AgentError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme {}", base_url.scheme()),
            });
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|err| AgentError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                reason: err.to_string(),
            })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn status(&self) -> Result<Value> {
        let url = self.endpoint("api/v2/status")?;
        debug!("Probing replica status at {url}");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AgentError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|err| AgentError::MalformedReply(err.to_string()))
    }

    async fn submit(&self, canister_id: &str, envelope: &Envelope) -> Result<Reply> {
        if canister_id.is_empty() {
            return Err(AgentError::InvalidCanisterId);
        }
        let url = self.endpoint(&format!(
            "api/v2/canister/{canister_id}/{}",
            envelope.content.request_type.as_str()
        ))?;

        let response = self.client.post(url).json(envelope).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            if is_expiry_status(status) && mentions_expiry(&body) {
                warn!(
                    "Replica refused {} as expired: {body}",
                    envelope.content.method_name
                );
                return Err(AgentError::ChannelExpired);
            }
            return Err(AgentError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|err| AgentError::MalformedReply(err.to_string()))
    }
}

fn is_expiry_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
    )
}
