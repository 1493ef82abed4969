// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::{
    error::{Error, Result},
    types::{Condition, NewStream, Oracle, STATUS_ACTIVE},
    utils::now_nanos,
};

/// The create-stream form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamDraft {
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
    /// `"0"` means no limit.
    pub max_amount: String,
    pub failure_handling: String,
    pub notifications: bool,
}

impl Default for StreamDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            category: String::new(),
            amount: String::new(),
            currency: "BTC".to_string(),
            frequency: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            recipient_type: String::new(),
            recipient_address: String::new(),
            recipient_email: String::new(),
            conditions: vec![],
            max_amount: "0".to_string(),
            failure_handling: "pause".to_string(),
            notifications: false,
        }
    }
}

impl StreamDraft {
    /// Checks the required fields in form order.
    pub fn validate(&self) -> Result<()> {
        require("name", &self.name)?;
        require("category", &self.category)?;
        require("amount", &self.amount)?;
        require("frequency", &self.frequency)?;
        require("recipient address", &self.recipient_address)
    }

    pub fn into_new_stream(self) -> Result<NewStream> {
        self.validate()?;
        Ok(NewStream {
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
        })
    }
}

/// The add-oracle form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OracleDraft {
    pub name: String,
    pub endpoint: String,
    pub category: String,
    /// Empty means the oracle needs no key.
    pub api_key: String,
}

impl OracleDraft {
    pub fn validate(&self) -> Result<()> {
        require("name", &self.name)?;
        require("endpoint", &self.endpoint)?;
        require("category", &self.category)
    }

    pub fn into_oracle(self) -> Result<Oracle> {
        self.into_oracle_at(now_nanos())
    }

    /// A fresh, active oracle stamped with `now_nanos`.
    pub fn into_oracle_at(self, now_nanos: u64) -> Result<Oracle> {
        self.validate()?;
        let api_key = if self.api_key.trim().is_empty() {
            None
        } else {
            Some(self.api_key)
        };
        Ok(Oracle {
            id: format!("oracle-{}", now_nanos / 1_000_000),
            name: self.name,
            endpoint: self.endpoint,
            category: self.category,
            status: STATUS_ACTIVE.to_string(),
            uptime: "0%".to_string(),
            last_update: i64::try_from(now_nanos).unwrap_or(i64::MAX),
            feeds: 0,
            api_key,
            is_active: true,
        })
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{field} is required")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_draft_defaults() {
        let draft = StreamDraft::default();
        assert_eq!(draft.currency, "BTC");
        assert_eq!(draft.max_amount, "0");
        assert_eq!(draft.failure_handling, "pause");
        assert!(!draft.notifications);
    }

    #[test]
    fn stream_draft_requires_the_recipient_address() {
        let draft = StreamDraft {
            name: "Rent".to_string(),
            category: "Housing".to_string(),
            amount: "0.025".to_string(),
            frequency: "monthly".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            draft.clone().into_new_stream(),
            Err(Error::InvalidInput(message)) if message == "recipient address is required"
        ));

        let new_stream = StreamDraft {
            recipient_address: "bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh".to_string(),
            ..draft
        }
        .into_new_stream()
        .unwrap();
        assert_eq!(new_stream.currency, "BTC");
        assert_eq!(new_stream.name, "Rent");
    }

    #[test]
    fn stream_draft_reports_the_first_missing_field() {
        assert!(matches!(
            StreamDraft::default().validate(),
            Err(Error::InvalidInput(message)) if message == "name is required"
        ));
    }

    #[test]
    fn oracle_draft_becomes_an_active_oracle() {
        let now = 1_700_000_000_123_456_789;
        let oracle = OracleDraft {
            name: "Chainlink".to_string(),
            endpoint: "https://data.chain.link".to_string(),
            category: "Market Data".to_string(),
            api_key: String::new(),
        }
        .into_oracle_at(now)
        .unwrap();

        assert_eq!(oracle.id, "oracle-1700000000123");
        assert_eq!(oracle.status, "active");
        assert_eq!(oracle.uptime, "0%");
        assert_eq!(oracle.feeds, 0);
        assert_eq!(oracle.api_key, None);
        assert!(oracle.is_active);
        assert_eq!(oracle.last_update, now as i64);
    }

    #[test]
    fn oracle_draft_keeps_a_given_api_key() {
        let oracle = OracleDraft {
            name: "News".to_string(),
            endpoint: "https://newsapi.org".to_string(),
            category: "News".to_string(),
            api_key: "secret".to_string(),
        }
        .into_oracle()
        .unwrap();
        assert_eq!(oracle.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn oracle_draft_requires_an_endpoint() {
        let draft = OracleDraft {
            name: "News".to_string(),
            category: "News".to_string(),
            ..Default::default()
        };
        assert!(draft.into_oracle().is_err());
    }
}
