// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use bitstream::{forms::StreamDraft, BitStreamApi, Dashboard, Stream};
use color_eyre::{
    eyre::{Context, Result},
    Section,
};
use prettytable::{Cell, Row, Table};
use std::sync::Arc;

pub async fn list(api: &BitStreamApi) -> Result<()> {
    let streams = api
        .get_user_streams()
        .await
        .wrap_err("Failed to fetch your streams")?;
    if streams.is_empty() && !api.is_authenticated().await {
        println!("Not logged in, log in with `bitstream auth login` to see your streams");
        return Ok(());
    }
    print_streams(&streams);
    Ok(())
}

pub async fn all(api: &BitStreamApi) -> Result<()> {
    let streams = api
        .get_all_streams()
        .await
        .wrap_err("Failed to fetch streams")?;
    print_streams(&streams);
    Ok(())
}

pub async fn get(api: &BitStreamApi, id: &str) -> Result<()> {
    let stream = api
        .get_stream(id)
        .await
        .wrap_err(format!("Failed to fetch stream {id}"))?;
    println!("{}", serde_json::to_string_pretty(&stream)?);
    Ok(())
}

pub async fn create(api: Arc<BitStreamApi>, draft: StreamDraft) -> Result<()> {
    let new_stream = draft
        .into_new_stream()
        .wrap_err("The stream is incomplete")?;
    let dashboard = logged_in_dashboard(api).await;

    println!("Creating stream {}...", new_stream.name);
    let stream_id = dashboard
        .create_stream(new_stream)
        .await
        .wrap_err("Failed to create stream")
        .with_suggestion(|| "make sure you are logged in with `bitstream auth login`")?;
    info!("Created stream {stream_id}");
    println!("✅ Created stream {stream_id}");
    Ok(())
}

pub async fn set_status(api: Arc<BitStreamApi>, id: &str, status: &str) -> Result<()> {
    let dashboard = logged_in_dashboard(api).await;
    dashboard
        .update_stream_status(id, status)
        .await
        .wrap_err(format!("Failed to set status of stream {id}"))?;
    println!("✅ Stream {id} is now {status}");
    Ok(())
}

pub async fn toggle(api: Arc<BitStreamApi>, id: &str) -> Result<()> {
    let dashboard = logged_in_dashboard(api).await;
    let status = dashboard
        .toggle_stream(id)
        .await
        .wrap_err(format!("Failed to toggle stream {id}"))?;
    println!("✅ Stream {id} is now {status}");
    Ok(())
}

pub async fn validate(api: &BitStreamApi, id: &str) -> Result<()> {
    let valid = api
        .validate_conditions(id)
        .await
        .wrap_err(format!("Failed to validate conditions of stream {id}"))?;
    if valid {
        println!("✅ All conditions of stream {id} are met");
    } else {
        println!("❌ Conditions of stream {id} are not met");
    }
    Ok(())
}

async fn logged_in_dashboard(api: Arc<BitStreamApi>) -> Dashboard {
    let dashboard = Dashboard::new(api);
    dashboard.check_auth().await;
    if !dashboard.auth_state().await.is_authenticated {
        warn!("Changing streams without a session, the service will see an anonymous caller");
    }
    dashboard
}

fn print_streams(streams: &[Stream]) {
    if streams.is_empty() {
        println!("No streams found");
        return;
    }

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("ID"),
        Cell::new("Name"),
        Cell::new("Category"),
        Cell::new("Amount"),
        Cell::new("Frequency"),
        Cell::new("Status"),
    ]));
    for stream in streams {
        table.add_row(Row::new(vec![
            Cell::new(&stream.id),
            Cell::new(&stream.name),
            Cell::new(&stream.category),
            Cell::new(&format!("{} {}", stream.amount, stream.currency)),
            Cell::new(&stream.frequency),
            Cell::new(&stream.status),
        ]));
    }
    table.printstd();
}
