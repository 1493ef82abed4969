// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::{
    agent::{Agent, AgentError, Result},
    identity::Principal,
    types::{Oracle, ServiceResult, Stream, StreamStats, UserBalance},
};
use serde_json::Value;

/// Typed bindings for the payment-stream canister interface.
#[derive(Clone, Debug)]
pub struct PaymentStreamActor {
    agent: Agent,
    canister_id: String,
}

impl PaymentStreamActor {
    pub fn new(agent: Agent, canister_id: impl Into<String>) -> Result<Self> {
        let canister_id = canister_id.into();
        if canister_id.trim().is_empty() {
            return Err(AgentError::InvalidCanisterId);
        }
        Ok(Self { agent, canister_id })
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn canister_id(&self) -> &str {
        &self.canister_id
    }

    pub async fn create_stream(&self, stream: &Stream) -> Result<ServiceResult<String>> {
        self.agent
            .call(&self.canister_id, "createStream", &(stream,))
            .await
    }

    pub async fn get_stream(&self, stream_id: &str) -> Result<ServiceResult<Stream>> {
        self.agent
            .query(&self.canister_id, "getStream", &(stream_id,))
            .await
    }

    pub async fn get_user_streams(&self, user: &Principal) -> Result<Vec<Stream>> {
        self.agent
            .query(&self.canister_id, "getUserStreams", &(user,))
            .await
    }

    pub async fn get_all_streams(&self) -> Result<Vec<Stream>> {
        self.agent
            .query(&self.canister_id, "getAllStreams", &no_args())
            .await
    }

    pub async fn update_stream_status(
        &self,
        stream_id: &str,
        status: &str,
    ) -> Result<ServiceResult<()>> {
        self.agent
            .call(&self.canister_id, "updateStreamStatus", &(stream_id, status))
            .await
    }

    pub async fn validate_conditions(&self, stream_id: &str) -> Result<ServiceResult<bool>> {
        self.agent
            .call(&self.canister_id, "validateConditions", &(stream_id,))
            .await
    }

    pub async fn get_user_balance(&self, user: &Principal) -> Result<UserBalance> {
        self.agent
            .query(&self.canister_id, "getUserBalance", &(user,))
            .await
    }

    pub async fn get_stream_stats(&self, user: &Principal) -> Result<StreamStats> {
        self.agent
            .query(&self.canister_id, "getStreamStats", &(user,))
            .await
    }

    pub async fn get_oracles(&self) -> Result<Vec<Oracle>> {
        self.agent
            .query(&self.canister_id, "getOracles", &no_args())
            .await
    }

    pub async fn get_oracle(&self, oracle_id: &str) -> Result<ServiceResult<Oracle>> {
        self.agent
            .query(&self.canister_id, "getOracle", &(oracle_id,))
            .await
    }

    pub async fn add_oracle(&self, oracle: &Oracle) -> Result<ServiceResult<String>> {
        self.agent
            .call(&self.canister_id, "addOracle", &(oracle,))
            .await
    }

    pub async fn update_oracle_status(
        &self,
        oracle_id: &str,
        status: &str,
    ) -> Result<ServiceResult<()>> {
        self.agent
            .call(&self.canister_id, "updateOracleStatus", &(oracle_id, status))
            .await
    }
}

fn no_args() -> Value {
    Value::Array(vec![])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Envelope, Reply, RequestKind, Transport};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingTransport {
        seen: Mutex<Vec<Envelope>>,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn status(&self) -> Result<Value> {
            Ok(json!({}))
        }

        async fn submit(&self, _canister_id: &str, envelope: &Envelope) -> Result<Reply> {
            self.seen.lock().await.push(envelope.clone());
            let reply = match envelope.content.method_name.as_str() {
                "updateStreamStatus" => json!({ "ok": null }),
                "validateConditions" => json!({ "ok": true }),
                _ => json!([]),
            };
            Ok(Reply::Replied { reply })
        }
    }

    fn actor(transport: &Arc<RecordingTransport>) -> PaymentStreamActor {
        let agent = Agent::builder()
            .with_transport(Arc::clone(transport) as Arc<dyn Transport>)
            .build()
            .unwrap();
        PaymentStreamActor::new(agent, "wbyay-dyaaa-aaaag-aue3q-cai").unwrap()
    }

    #[test]
    fn empty_canister_id_is_refused() {
        let agent = Agent::builder()
            .with_transport(Arc::new(RecordingTransport::default()))
            .build()
            .unwrap();
        assert!(matches!(
            PaymentStreamActor::new(agent, " "),
            Err(AgentError::InvalidCanisterId)
        ));
    }

    #[tokio::test]
    async fn arguments_are_sent_positionally() {
        let transport = Arc::new(RecordingTransport::default());
        let actor = actor(&transport);

        let updated = actor
            .update_stream_status("stream-1", "paused")
            .await
            .unwrap();
        assert_eq!(updated, ServiceResult::Ok(()));
        let streams = actor.get_all_streams().await.unwrap();
        assert!(streams.is_empty());
        let valid = actor.validate_conditions("stream-1").await.unwrap();
        assert_eq!(valid, ServiceResult::Ok(true));

        let seen = transport.seen.lock().await;
        assert_eq!(seen[0].content.arg, json!(["stream-1", "paused"]));
        assert_eq!(seen[0].content.request_type, RequestKind::Call);
        assert_eq!(seen[1].content.arg, json!([]));
        assert_eq!(seen[1].content.request_type, RequestKind::Query);
        assert_eq!(seen[2].content.method_name, "validateConditions");
    }

    #[tokio::test]
    async fn principals_travel_as_text() {
        let transport = Arc::new(RecordingTransport::default());
        let streams = actor(&transport)
            .get_user_streams(&Principal::anonymous())
            .await
            .unwrap();
        assert!(streams.is_empty());

        let seen = transport.seen.lock().await;
        assert_eq!(seen[0].content.arg, json!(["04"]));
    }
}
