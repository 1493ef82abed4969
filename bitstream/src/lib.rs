// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Client for the BitStream payment-stream service.
//!
//! [`BitStreamApi`] is the single entry point. It keeps the wallet session, signs every
//! request with the session identity and talks to the payment-stream canister through a
//! typed [`PaymentStreamActor`]. When the replica cannot be reached it serves a fixed
//! offline dataset instead.
//!
//! [`Dashboard`] layers the cached views a front end renders on top of the API.
//!
//! # Features
//!
//! - `loud`: Print every outgoing request to stdout.

#[macro_use]
extern crate tracing;

pub mod actor;
pub mod agent;
pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod forms;
pub mod identity;
pub mod mock;
pub mod types;
pub mod utils;
pub mod views;

pub use actor::PaymentStreamActor;
pub use api::{BitStreamApi, Mode};
pub use auth::{
    AuthClient, FileSessionStore, IdentityKitConnector, InternetIdentityConnector,
    MemorySessionStore, SessionStore, WalletConnector, WalletKind,
};
pub use config::{ClientConfig, IdleOptions};
pub use context::{AuthState, Dashboard, DashboardState};
pub use error::{Error, Result};
pub use identity::{Identity, Principal};
pub use types::{Condition, NewStream, Oracle, Stream, StreamStats, UserBalance};

#[doc(no_inline)] // Place this under 'Re-exports' in the docs.
pub use bls::{PublicKey, SecretKey};
