// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

mod auth;
mod dashboard;
mod oracle;
mod stream;

use crate::{access::data_dir, opt::Opt};
use bitstream::{
    forms::{OracleDraft, StreamDraft},
    views::StatusFilter,
    BitStreamApi, ClientConfig, FileSessionStore, SessionStore, WalletKind,
};
use clap::Subcommand;
use color_eyre::Result;
use std::sync::Arc;

#[derive(Subcommand, Debug)]
pub enum SubCmd {
    /// Log in and out with a wallet.
    Auth {
        #[command(subcommand)]
        command: AuthCmd,
    },

    /// Operations related to payment streams.
    Stream {
        #[command(subcommand)]
        command: StreamCmd,
    },

    /// Show your balance and stream statistics.
    Dashboard,

    /// Operations related to data oracles.
    Oracle {
        #[command(subcommand)]
        command: OracleCmd,
    },
}

#[derive(Subcommand, Debug)]
pub enum AuthCmd {
    /// Log in with a wallet. Any session from the other wallet is closed first.
    Login {
        /// The wallet flow to use: internet-identity or identity-kit.
        #[arg(long, default_value = "internet-identity")]
        wallet: WalletKind,
    },

    /// End the current session.
    Logout,

    /// Show who is logged in and whether the service is reachable.
    Status,
}

#[derive(Subcommand, Debug)]
pub enum StreamCmd {
    /// List your streams.
    List,

    /// List every stream known to the service.
    All,

    /// Show a single stream.
    Get {
        /// The stream id.
        id: String,
    },

    /// Create a new payment stream.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: String,
        /// Amount per payment, e.g. 0.025
        #[arg(long)]
        amount: String,
        /// e.g. weekly or monthly
        #[arg(long)]
        frequency: String,
        #[arg(long)]
        recipient_address: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "BTC")]
        currency: String,
        #[arg(long, default_value = "")]
        start_date: String,
        #[arg(long, default_value = "")]
        end_date: String,
        #[arg(long, default_value = "address")]
        recipient_type: String,
        #[arg(long, default_value = "")]
        recipient_email: String,
        /// Upper bound for a single payment. 0 means no limit.
        #[arg(long, default_value = "0")]
        max_amount: String,
        /// What to do when a payment fails: pause or retry.
        #[arg(long, default_value = "pause")]
        failure_handling: String,
        /// Send notifications for this stream.
        #[arg(long)]
        notifications: bool,
    },

    /// Set the status of a stream.
    Status {
        /// The stream id.
        id: String,
        /// The new status, e.g. active or paused.
        status: String,
    },

    /// Pause an active stream, or activate any other.
    Toggle {
        /// The stream id.
        id: String,
    },

    /// Ask the service to evaluate the stream's conditions.
    Validate {
        /// The stream id.
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum OracleCmd {
    /// List oracles with a summary.
    List {
        /// Only show oracles with this status: all, active, maintenance or error.
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        /// Only show oracles in this category.
        #[arg(long)]
        category: Option<String>,
    },

    /// Show a single oracle.
    Get {
        /// The oracle id.
        id: String,
    },

    /// Register a new oracle.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        endpoint: String,
        #[arg(long)]
        category: String,
        #[arg(long, default_value = "")]
        api_key: String,
    },

    /// Set the status of an oracle.
    Status {
        /// The oracle id.
        id: String,
        /// The new status, e.g. active, maintenance or error.
        status: String,
    },
}

pub async fn handle_subcommand(opt: Opt) -> Result<()> {
    let config = ClientConfig::default()
        .with_host(opt.host)
        .with_canister_id(opt.canister_id)
        .with_identity_provider(opt.identity_provider);
    let session_path = data_dir::get_session_path()?;
    let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(session_path));
    let api = Arc::new(BitStreamApi::new(config, store));

    match opt.command {
        SubCmd::Auth { command } => match command {
            AuthCmd::Login { wallet } => auth::login(&api, wallet).await,
            AuthCmd::Logout => auth::logout(&api).await,
            AuthCmd::Status => auth::status(&api).await,
        },
        SubCmd::Stream { command } => match command {
            StreamCmd::List => stream::list(&api).await,
            StreamCmd::All => stream::all(&api).await,
            StreamCmd::Get { id } => stream::get(&api, &id).await,
            StreamCmd::Create {
                name,
                category,
                amount,
                frequency,
                recipient_address,
                description,
                currency,
                start_date,
                end_date,
                recipient_type,
                recipient_email,
                max_amount,
                failure_handling,
                notifications,
            } => {
                let draft = StreamDraft {
                    name,
                    description,
                    category,
                    amount,
                    currency,
                    frequency,
                    start_date,
                    end_date,
                    recipient_type,
                    recipient_address,
                    recipient_email,
                    conditions: vec![],
                    max_amount,
                    failure_handling,
                    notifications,
                };
                stream::create(api, draft).await
            }
            StreamCmd::Status { id, status } => stream::set_status(api, &id, &status).await,
            StreamCmd::Toggle { id } => stream::toggle(api, &id).await,
            StreamCmd::Validate { id } => stream::validate(&api, &id).await,
        },
        SubCmd::Dashboard => dashboard::show(api).await,
        SubCmd::Oracle { command } => match command {
            OracleCmd::List { status, category } => oracle::list(&api, status, category).await,
            OracleCmd::Get { id } => oracle::get(&api, &id).await,
            OracleCmd::Add {
                name,
                endpoint,
                category,
                api_key,
            } => {
                let draft = OracleDraft {
                    name,
                    endpoint,
                    category,
                    api_key,
                };
                oracle::add(&api, draft).await
            }
            OracleCmd::Status { id, status } => oracle::set_status(&api, &id, &status).await,
        },
    }
}
