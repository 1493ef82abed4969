// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! The offline dataset served when the replica cannot be reached.

use crate::{
    identity::Principal,
    types::{
        Condition, Oracle, Stream, StreamStats, UserBalance, STATUS_ACTIVE, STATUS_MAINTENANCE,
        STATUS_PENDING,
    },
    utils::now_nanos,
};

pub fn streams() -> Vec<Stream> {
    let created_at = i64::try_from(now_nanos()).unwrap_or(i64::MAX);
    vec![
        Stream {
            id: "stream-1".to_string(),
            name: "Monthly Rent Payment".to_string(),
            description: "Automated rent payment to landlord".to_string(),
            category: "Housing".to_string(),
            amount: "0.025".to_string(),
            currency: "BTC".to_string(),
            frequency: "monthly".to_string(),
            start_date: "2025-01-01".to_string(),
            end_date: "2025-12-31".to_string(),
            recipient_type: "address".to_string(),
            recipient_address: "bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh".to_string(),
            recipient_email: String::new(),
            conditions: vec![Condition {
                id: "cond-1".to_string(),
                condition_type: "price".to_string(),
                operator: ">=".to_string(),
                value: "95000".to_string(),
                oracle: "coinbase".to_string(),
            }],
            max_amount: "0.1".to_string(),
            failure_handling: "pause".to_string(),
            notifications: true,
            creator: Principal::anonymous(),
            created_at,
            status: STATUS_ACTIVE.to_string(),
            last_execution: None,
            next_execution: None,
        },
        Stream {
            id: "stream-2".to_string(),
            name: "DCA Investment".to_string(),
            description: "Dollar cost averaging into Bitcoin".to_string(),
            category: "Investment".to_string(),
            amount: "0.01".to_string(),
            currency: "BTC".to_string(),
            frequency: "weekly".to_string(),
            start_date: "2025-01-01".to_string(),
            end_date: String::new(),
            recipient_type: "email".to_string(),
            recipient_address: String::new(),
            recipient_email: "investment@example.com".to_string(),
            conditions: vec![],
            max_amount: String::new(),
            failure_handling: "retry".to_string(),
            notifications: true,
            creator: Principal::anonymous(),
            created_at,
            status: STATUS_PENDING.to_string(),
            last_execution: None,
            next_execution: None,
        },
    ]
}

pub fn balance() -> UserBalance {
    UserBalance {
        overall: "2.513".to_string(),
        available: "18.718".to_string(),
        monthly_profits: "0.340".to_string(),
        monthly: "0.520".to_string(),
    }
}

pub fn stats() -> StreamStats {
    StreamStats {
        total_streams: 2,
        active_streams: 1,
        total_volume: "45.321".to_string(),
        categories: vec![("Housing".to_string(), 1), ("Investment".to_string(), 1)],
    }
}

pub fn oracles() -> Vec<Oracle> {
    let last_update = i64::try_from(now_nanos()).unwrap_or(i64::MAX);
    let oracle = |id: &str, name: &str, endpoint: &str, category: &str, uptime: &str, feeds| {
        Oracle {
            id: id.to_string(),
            name: name.to_string(),
            endpoint: endpoint.to_string(),
            category: category.to_string(),
            status: STATUS_ACTIVE.to_string(),
            uptime: uptime.to_string(),
            last_update,
            feeds,
            api_key: None,
            is_active: true,
        }
    };

    let mut sports = oracle(
        "oracle-5",
        "Sports Data",
        "https://api.sportsdata.io",
        "Sports",
        "95.1%",
        2,
    );
    sports.status = STATUS_MAINTENANCE.to_string();
    sports.is_active = false;

    vec![
        oracle(
            "oracle-1",
            "CoinGecko",
            "https://api.coingecko.com/api/v3",
            "Market Data",
            "99.8%",
            8,
        ),
        oracle(
            "oracle-2",
            "GitHub API",
            "https://api.github.com",
            "Development",
            "99.9%",
            5,
        ),
        oracle(
            "oracle-3",
            "Weather API",
            "https://api.openweathermap.org/data/2.5",
            "Weather",
            "99.2%",
            4,
        ),
        oracle(
            "oracle-4",
            "FlightAware",
            "https://flightxml.flightaware.com",
            "Travel",
            "98.5%",
            3,
        ),
        sports,
        oracle(
            "oracle-6",
            "News Sentiment",
            "https://newsapi.org",
            "News",
            "97.8%",
            2,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_matches_the_offline_dashboard() {
        let streams = streams();
        assert_eq!(streams.len(), 2);
        assert_eq!(streams[0].name, "Monthly Rent Payment");
        assert!(streams[0].is_active());
        assert_eq!(streams[1].status, STATUS_PENDING);
        assert_eq!(streams[1].recipient_email, "investment@example.com");

        let stats = stats();
        assert_eq!(stats.total_streams, streams.len() as u64);
        assert_eq!(
            stats.active_streams,
            streams.iter().filter(|stream| stream.is_active()).count() as u64
        );
    }

    #[test]
    fn only_sports_data_is_in_maintenance() {
        let oracles = oracles();
        assert_eq!(oracles.len(), 6);
        let inactive: Vec<_> = oracles.iter().filter(|oracle| !oracle.is_active).collect();
        assert_eq!(inactive.len(), 1);
        assert_eq!(inactive[0].name, "Sports Data");
        assert_eq!(inactive[0].status, STATUS_MAINTENANCE);
        assert_eq!(oracles.iter().map(|oracle| oracle.feeds).sum::<u64>(), 24);
    }
}
