// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Records mirrored from the payment-stream service interface.
//!
//! Financial values are carried as decimal strings so nothing on the client side rounds
//! them. Timestamps are nanoseconds since the unix epoch.

use crate::identity::Principal;
use serde::{Deserialize, Serialize};

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_PAUSED: &str = "paused";
pub const STATUS_PENDING: &str = "pending";
pub const STATUS_MAINTENANCE: &str = "maintenance";
pub const STATUS_ERROR: &str = "error";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub id: String,
    pub condition_type: String,
    pub operator: String,
    pub value: String,
    pub oracle: String,
}

/// A recurring scheduled payment tracked by the service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub amount: String,
    pub currency: String,
    pub frequency: String,
    pub start_date: String,
    pub end_date: String,
    pub recipient_type: String,
    pub recipient_address: String,
    pub recipient_email: String,
    pub conditions: Vec<Condition>,
    pub max_amount: String,
    pub failure_handling: String,
    pub notifications: bool,
    pub creator: Principal,
    pub created_at: i64,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_execution: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_execution: Option<i64>,
}

impl Stream {
    pub fn is_active(&self) -> bool {
        self.status == STATUS_ACTIVE
    }
}

/// The caller-supplied part of a stream. The service assigns the rest.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStream {
    pub name: String,
    pub description: String,
    pub category: String,
    pub amount: String,
    pub currency: String,
    pub frequency: String,
    pub start_date: String,
    pub end_date: String,
    pub recipient_type: String,
    pub recipient_address: String,
    pub recipient_email: String,
    pub conditions: Vec<Condition>,
    pub max_amount: String,
    pub failure_handling: String,
    pub notifications: bool,
}

impl NewStream {
    /// The full record sent to `createStream`, with placeholders for the service-owned fields.
    pub fn into_stream(self) -> Stream {
        Stream {
            id: String::new(),
            name: self.name,
            description: self.description,
            category: self.category,
            amount: self.amount,
            currency: self.currency,
            frequency: self.frequency,
            start_date: self.start_date,
            end_date: self.end_date,
            recipient_type: self.recipient_type,
            recipient_address: self.recipient_address,
            recipient_email: self.recipient_email,
            conditions: self.conditions,
            max_amount: self.max_amount,
            failure_handling: self.failure_handling,
            notifications: self.notifications,
            creator: Principal::anonymous(),
            created_at: 0,
            status: STATUS_PENDING.to_string(),
            last_execution: None,
            next_execution: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBalance {
    pub overall: String,
    pub available: String,
    pub monthly_profits: String,
    pub monthly: String,
}

impl Default for UserBalance {
    fn default() -> Self {
        Self {
            overall: "0".to_string(),
            available: "0".to_string(),
            monthly_profits: "0".to_string(),
            monthly: "0".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamStats {
    pub total_streams: u64,
    pub active_streams: u64,
    pub total_volume: String,
    pub categories: Vec<(String, u64)>,
}

impl Default for StreamStats {
    fn default() -> Self {
        Self {
            total_streams: 0,
            active_streams: 0,
            total_volume: "0".to_string(),
            categories: vec![],
        }
    }
}

/// An external data source that stream conditions can reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Oracle {
    pub id: String,
    pub name: String,
    pub endpoint: String,
    pub category: String,
    pub status: String,
    pub uptime: String,
    pub last_update: i64,
    pub feeds: u64,
    pub api_key: Option<String>,
    pub is_active: bool,
}

/// The `ok`/`err` variant the service answers fallible calls with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceResult<T> {
    Ok(T),
    Err(String),
}

impl<T> ServiceResult<T> {
    pub fn into_result(self) -> Result<T, String> {
        match self {
            ServiceResult::Ok(value) => Ok(value),
            ServiceResult::Err(message) => Err(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::Result;
    use serde_json::json;

    #[test]
    fn new_stream_gets_service_placeholders() {
        let stream = NewStream {
            name: "Rent".to_string(),
            amount: "0.025".to_string(),
            ..Default::default()
        }
        .into_stream();

        assert_eq!(stream.id, "");
        assert_eq!(stream.status, STATUS_PENDING);
        assert_eq!(stream.created_at, 0);
        assert!(stream.creator.is_anonymous());
        assert_eq!(stream.amount, "0.025");
    }

    #[test]
    fn stream_uses_camel_case_on_the_wire() -> Result<()> {
        let value = serde_json::to_value(NewStream::default().into_stream())?;

        assert!(value.get("recipientAddress").is_some());
        assert!(value.get("failureHandling").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("lastExecution").is_none());
        Ok(())
    }

    #[test]
    fn stats_categories_decode_from_pairs() -> Result<()> {
        let stats: StreamStats = serde_json::from_value(json!({
            "totalStreams": 3,
            "activeStreams": 2,
            "totalVolume": "1.5",
            "categories": [["Housing", 2], ["Investment", 1]]
        }))?;

        assert_eq!(stats.categories[0], ("Housing".to_string(), 2));
        assert_eq!(stats.total_streams, 3);
        Ok(())
    }

    #[test]
    fn service_result_decodes_both_variants() -> Result<()> {
        let ok: ServiceResult<String> = serde_json::from_value(json!({ "ok": "stream-9" }))?;
        let err: ServiceResult<()> = serde_json::from_value(json!({ "err": "Stream not found" }))?;

        assert_eq!(ok.into_result(), Ok("stream-9".to_string()));
        assert_eq!(err.into_result(), Err("Stream not found".to_string()));
        Ok(())
    }
}
