// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::{agent::AgentError, auth::AuthError};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by [`crate::BitStreamApi`] and the dashboard context.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Request channel error: {0}")]
    Agent(#[from] AgentError),
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),
    /// The service answered with its `err` variant.
    #[error("Service refused the request: {0}")]
    Service(String),
    #[error("{0} is not available while offline")]
    Offline(&'static str),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub fn is_channel_expired(&self) -> bool {
        matches!(self, Error::Agent(err) if err.is_channel_expired())
    }
}
