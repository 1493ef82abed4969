// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use bitstream::{views::active_stream_count, BitStreamApi, Dashboard};
use color_eyre::{eyre::eyre, Result, Section};
use prettytable::{Cell, Row, Table};
use std::sync::Arc;

pub async fn show(api: Arc<BitStreamApi>) -> Result<()> {
    let dashboard = Dashboard::new(api);
    dashboard.check_auth().await;
    let state = dashboard.snapshot().await;

    let Some(principal) = state.auth.principal else {
        return Err(eyre!("Not logged in"))
            .with_suggestion(|| "log in first with `bitstream auth login`");
    };
    println!("Dashboard for {principal}");
    if dashboard.api().is_mock_mode().await {
        println!("⚠️ The service is unreachable, showing offline data");
    }

    let balance = &state.user_balance;
    let stats = &state.stream_stats;
    let mut table = Table::new();
    table.add_row(Row::new(vec![Cell::new("Overall balance"), Cell::new(&balance.overall)]));
    table.add_row(Row::new(vec![Cell::new("Available"), Cell::new(&balance.available)]));
    table.add_row(Row::new(vec![
        Cell::new("Monthly profits"),
        Cell::new(&balance.monthly_profits),
    ]));
    table.add_row(Row::new(vec![Cell::new("Monthly"), Cell::new(&balance.monthly)]));
    table.add_row(Row::new(vec![
        Cell::new("Streams"),
        Cell::new(&format!(
            "{} ({} active)",
            stats.total_streams, stats.active_streams
        )),
    ]));
    table.add_row(Row::new(vec![
        Cell::new("Total volume"),
        Cell::new(&stats.total_volume),
    ]));
    for (category, count) in &stats.categories {
        table.add_row(Row::new(vec![
            Cell::new(&format!("  {category}")),
            Cell::new(&count.to_string()),
        ]));
    }
    table.printstd();

    println!(
        "{} of your {} loaded streams are active",
        active_stream_count(&state.streams),
        state.streams.len()
    );
    Ok(())
}
