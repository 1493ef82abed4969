// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Shared state behind the dashboard: who is logged in and the last fetched views.

use crate::{
    api::BitStreamApi,
    auth::{WalletConnector, WalletKind},
    error::Result,
    identity::Principal,
    types::{NewStream, Stream, StreamStats, UserBalance},
    views::toggled_status,
};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthState {
    pub is_authenticated: bool,
    pub principal: Option<Principal>,
    pub wallet: Option<WalletKind>,
    /// Set until the first auth check completes.
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            is_authenticated: false,
            principal: None,
            wallet: None,
            loading: true,
        }
    }
}

/// Everything the dashboard pages render from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DashboardState {
    pub auth: AuthState,
    pub streams: Vec<Stream>,
    pub user_balance: UserBalance,
    pub stream_stats: StreamStats,
    pub streams_loading: bool,
    pub analytics_loading: bool,
}

pub struct Dashboard {
    api: Arc<BitStreamApi>,
    state: RwLock<DashboardState>,
}

impl Dashboard {
    pub fn new(api: Arc<BitStreamApi>) -> Self {
        Self {
            api,
            state: RwLock::new(DashboardState::default()),
        }
    }

    pub fn api(&self) -> &Arc<BitStreamApi> {
        &self.api
    }

    pub async fn snapshot(&self) -> DashboardState {
        self.state.read().await.clone()
    }

    pub async fn auth_state(&self) -> AuthState {
        self.state.read().await.auth.clone()
    }

    /// Initialises the API and reads the auth state, loading the views when logged in.
    pub async fn check_auth(&self) {
        debug!("Checking authentication status");
        self.api.init().await;

        let is_authenticated = self.api.is_authenticated().await;
        let (principal, wallet) = if is_authenticated {
            (self.api.principal().await, self.api.wallet().await)
        } else {
            (None, None)
        };
        info!("Authenticated: {is_authenticated}");

        self.state.write().await.auth = AuthState {
            is_authenticated,
            principal,
            wallet,
            loading: false,
        };

        if is_authenticated {
            futures::join!(self.refresh_streams(), self.refresh_analytics());
        }
    }

    pub async fn login(&self, connector: &dyn WalletConnector) -> Result<bool> {
        let success = self.api.login(connector).await?;
        if success {
            self.check_auth().await;
        } else {
            info!("Login with {} did not complete", connector.kind());
        }
        Ok(success)
    }

    pub async fn logout(&self) -> Result<()> {
        self.api.logout().await?;
        self.clear().await;
        Ok(())
    }

    /// Refetches the user's streams. Keeps the previous list if the fetch fails.
    pub async fn refresh_streams(&self) {
        if !self.session_is_live().await {
            return;
        }
        self.state.write().await.streams_loading = true;

        let result = self.api.get_user_streams().await;

        let mut state = self.state.write().await;
        match result {
            Ok(streams) => state.streams = streams,
            Err(err) => error!("Failed to fetch streams: {err}"),
        }
        state.streams_loading = false;
    }

    /// Refetches balance and stats together. Keeps the previous values if either fails.
    pub async fn refresh_analytics(&self) {
        if !self.session_is_live().await {
            return;
        }
        self.state.write().await.analytics_loading = true;

        let (balance, stats) =
            futures::join!(self.api.get_user_balance(), self.api.get_stream_stats());

        let mut state = self.state.write().await;
        match (balance, stats) {
            (Ok(balance), Ok(stats)) => {
                state.user_balance = balance;
                state.stream_stats = stats;
            }
            (Err(err), _) | (_, Err(err)) => error!("Failed to fetch analytics: {err}"),
        }
        state.analytics_loading = false;
    }

    pub async fn create_stream(&self, new_stream: NewStream) -> Result<String> {
        let stream_id = self.api.create_stream(new_stream).await?;
        info!("Created stream {stream_id}");
        self.refresh_after_mutation().await;
        Ok(stream_id)
    }

    pub async fn update_stream_status(&self, stream_id: &str, status: &str) -> Result<()> {
        self.api.update_stream_status(stream_id, status).await?;
        info!("Stream {stream_id} is now {status}");
        self.refresh_after_mutation().await;
        Ok(())
    }

    /// Pauses an active stream and activates anything else. Returns the new status.
    pub async fn toggle_stream(&self, stream_id: &str) -> Result<String> {
        let cached = self
            .state
            .read()
            .await
            .streams
            .iter()
            .find(|stream| stream.id == stream_id)
            .map(|stream| stream.status.clone());
        let current = match cached {
            Some(status) => status,
            None => self.api.get_stream(stream_id).await?.status,
        };

        let next = toggled_status(&current);
        self.update_stream_status(stream_id, next).await?;
        Ok(next.to_string())
    }

    /// False when logged out. A session that ended on the API side since the last
    /// `check_auth` clears the cached views.
    async fn session_is_live(&self) -> bool {
        if !self.state.read().await.auth.is_authenticated {
            return false;
        }
        if self.api.is_authenticated().await {
            return true;
        }
        info!("Session ended, clearing the dashboard");
        self.clear().await;
        false
    }

    async fn clear(&self) {
        *self.state.write().await = DashboardState {
            auth: AuthState {
                loading: false,
                ..AuthState::default()
            },
            ..DashboardState::default()
        };
    }

    async fn refresh_after_mutation(&self) {
        self.refresh_streams().await;
        self.refresh_analytics().await;
    }
}
