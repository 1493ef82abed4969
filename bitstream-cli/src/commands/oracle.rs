// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use bitstream::{
    forms::OracleDraft,
    utils::now_nanos,
    views::{format_time_ago, OracleFilter, OracleSummary, StatusFilter},
    BitStreamApi,
};
use color_eyre::eyre::{Context, Result};
use prettytable::{Cell, Row, Table};

pub async fn list(
    api: &BitStreamApi,
    status: StatusFilter,
    category: Option<String>,
) -> Result<()> {
    let oracles = api.get_oracles().await.wrap_err("Failed to fetch oracles")?;
    let summary = OracleSummary::from_oracles(&oracles);
    println!(
        "{} active oracles, {} feeds, {} average uptime",
        summary.active, summary.total_feeds, summary.average_uptime
    );
    println!("Categories: {}", summary.categories.join(", "));

    let filter = OracleFilter { status, category };
    let filtered = filter.apply(&oracles);
    if filtered.is_empty() {
        println!("No oracles match the {status} filter");
        return Ok(());
    }

    let now = now_nanos();
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("ID"),
        Cell::new("Name"),
        Cell::new("Category"),
        Cell::new("Status"),
        Cell::new("Uptime"),
        Cell::new("Feeds"),
        Cell::new("Last update"),
    ]));
    for oracle in filtered {
        table.add_row(Row::new(vec![
            Cell::new(&oracle.id),
            Cell::new(&oracle.name),
            Cell::new(&oracle.category),
            Cell::new(&oracle.status),
            Cell::new(&oracle.uptime),
            Cell::new(&oracle.feeds.to_string()),
            Cell::new(&format_time_ago(oracle.last_update, now)),
        ]));
    }
    table.printstd();
    Ok(())
}

pub async fn get(api: &BitStreamApi, id: &str) -> Result<()> {
    let oracle = api
        .get_oracle(id)
        .await
        .wrap_err(format!("Failed to fetch oracle {id}"))?;
    println!("{}", serde_json::to_string_pretty(&oracle)?);
    Ok(())
}

pub async fn add(api: &BitStreamApi, draft: OracleDraft) -> Result<()> {
    let oracle = draft.into_oracle().wrap_err("The oracle is incomplete")?;
    println!("Adding oracle {}...", oracle.name);
    let oracle_id = api
        .add_oracle(&oracle)
        .await
        .wrap_err("Failed to add oracle")?;
    info!("Added oracle {oracle_id}");
    println!("✅ Added oracle {oracle_id}");
    Ok(())
}

pub async fn set_status(api: &BitStreamApi, id: &str, status: &str) -> Result<()> {
    api.update_oracle_status(id, status)
        .await
        .wrap_err(format!("Failed to set status of oracle {id}"))?;
    println!("✅ Oracle {id} is now {status}");
    Ok(())
}
