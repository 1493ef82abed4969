// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::identity::IdentityError;

pub type Result<T, E = AuthError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Another login is already in progress")]
    LoginInProgress,
    #[error("The signer wallet needs at least one target canister")]
    NoSignerTargets,
    #[error("Invalid identity provider {provider:?}: {reason}")]
    InvalidIdentityProvider { provider: String, reason: String },
    #[error("Wallet connection failed: {0}")]
    Connector(String),
    #[error("Wallet returned an unusable delegation: {0}")]
    Identity(#[from] IdentityError),
    #[error("Failed to access the session store: {0}")]
    Io(#[from] std::io::Error),
    #[error("Session store holds malformed data: {0}")]
    Serialization(#[from] serde_json::Error),
}
