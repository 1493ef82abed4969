// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::{
    actor::PaymentStreamActor,
    agent::{Agent, AgentError, Transport},
    auth::{AuthClient, AuthError, LoginOptions, SessionStore, WalletConnector, WalletKind},
    config::ClientConfig,
    error::{Error, Result},
    identity::{Identity, Principal},
    mock,
    types::{NewStream, Oracle, Stream, StreamStats, UserBalance},
};
use std::{future::Future, sync::Arc};
use tokio::sync::{Mutex, OnceCell, RwLock};

/// Where requests are currently answered from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// `init` has not run yet.
    Uninitialized,
    /// Requests go to the replica.
    Live,
    /// The replica could not be reached; reads come from the offline dataset.
    Mock,
}

struct State {
    mode: Mode,
    actor: Option<PaymentStreamActor>,
}

impl State {
    fn live_actor(&self) -> Option<PaymentStreamActor> {
        match self.mode {
            Mode::Live => self.actor.clone(),
            Mode::Uninitialized | Mode::Mock => None,
        }
    }
}

/// Client for the payment-stream service.
///
/// Owns the session lifecycle and the signed request channel. When the replica cannot be
/// reached during initialisation the API switches to mock mode and serves a fixed offline
/// dataset for reads.
pub struct BitStreamApi {
    config: ClientConfig,
    store: Arc<dyn SessionStore>,
    transport: Option<Arc<dyn Transport>>,
    auth: OnceCell<AuthClient>,
    state: RwLock<State>,
    init_lock: Mutex<()>,
}

impl BitStreamApi {
    pub fn new(config: ClientConfig, store: Arc<dyn SessionStore>) -> Self {
        Self {
            config,
            store,
            transport: None,
            auth: OnceCell::new(),
            state: RwLock::new(State {
                mode: Mode::Uninitialized,
                actor: None,
            }),
            init_lock: Mutex::new(()),
        }
    }

    /// Send requests through `transport` instead of HTTP to `config.host`.
    pub fn with_transport(
        config: ClientConfig,
        store: Arc<dyn SessionStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            transport: Some(transport),
            ..Self::new(config, store)
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn mode(&self) -> Mode {
        self.state.read().await.mode
    }

    pub async fn is_mock_mode(&self) -> bool {
        self.mode().await == Mode::Mock
    }

    /// Restores any session, builds the actor and probes the replica.
    ///
    /// Never fails: any error switches the API to mock mode.
    pub async fn init(&self) {
        let _init = self.init_lock.lock().await;
        if self.mode().await != Mode::Uninitialized {
            return;
        }
        info!(
            "Initialising BitStream API with host {} and canister {}",
            self.config.host, self.config.canister_id
        );

        let identity = self.auth().await.identity().await;
        if !identity.is_anonymous() {
            info!("Already authenticated as {}", identity.principal());
        }

        let (mode, actor) = match self.connect(identity).await {
            Ok(actor) => {
                info!("BitStream API initialised");
                (Mode::Live, Some(actor))
            }
            Err(err) => {
                warn!("Failed to initialise BitStream API, enabling mock mode: {err}");
                (Mode::Mock, None)
            }
        };
        *self.state.write().await = State { mode, actor };
    }

    /// Runs the wallet flow. A failed flow is logged and reported as `false`.
    pub async fn login(&self, connector: &dyn WalletConnector) -> Result<bool> {
        self.ensure_init().await;
        let options = LoginOptions {
            identity_provider: self.config.identity_provider.clone(),
            max_time_to_live: self.config.max_time_to_live,
            signer_targets: self.config.signer_targets.clone(),
        };

        match self.auth().await.login(connector, &options).await {
            Ok(principal) => {
                info!("Login successful, updating actor for {principal}");
                self.update_actor().await;
                Ok(true)
            }
            Err(AuthError::LoginInProgress) => Err(AuthError::LoginInProgress.into()),
            Err(err) => {
                error!("Login with {} failed: {err}", connector.kind());
                Ok(false)
            }
        }
    }

    pub async fn logout(&self) -> Result<()> {
        self.ensure_init().await;
        self.auth().await.logout().await?;
        self.update_actor().await;
        Ok(())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.ensure_init().await;
        self.auth().await.is_authenticated().await
    }

    /// The caller's principal, `None` when logged out.
    pub async fn principal(&self) -> Option<Principal> {
        self.ensure_init().await;
        self.auth().await.principal().await
    }

    pub async fn wallet(&self) -> Option<WalletKind> {
        self.ensure_init().await;
        self.auth().await.wallet().await
    }

    pub async fn create_stream(&self, new_stream: NewStream) -> Result<String> {
        let Some(actor) = self.actor().await else {
            return Err(Error::Offline("createStream"));
        };
        let stream = new_stream.into_stream();
        let stream = &stream;
        self.with_retry(actor, |actor| async move { actor.create_stream(stream).await })
            .await?
            .into_result()
            .map_err(Error::Service)
    }

    pub async fn get_stream(&self, stream_id: &str) -> Result<Stream> {
        let Some(actor) = self.actor().await else {
            debug!("Using mock data for stream {stream_id}");
            return mock::streams()
                .into_iter()
                .find(|stream| stream.id == stream_id)
                .ok_or_else(|| Error::Service("Stream not found".to_string()));
        };
        self.with_retry(actor, |actor| async move { actor.get_stream(stream_id).await })
            .await?
            .into_result()
            .map_err(Error::Service)
    }

    /// Streams created by the logged-in user. Empty when logged out.
    pub async fn get_user_streams(&self) -> Result<Vec<Stream>> {
        let Some(actor) = self.actor().await else {
            debug!("Using mock streams data");
            return Ok(mock::streams());
        };
        let Some(principal) = self.auth().await.principal().await else {
            return Ok(vec![]);
        };
        let principal = &principal;
        self.with_retry(actor, |actor| async move {
            actor.get_user_streams(principal).await
        })
        .await
    }

    pub async fn get_all_streams(&self) -> Result<Vec<Stream>> {
        let Some(actor) = self.actor().await else {
            debug!("Using mock streams data");
            return Ok(mock::streams());
        };
        self.with_retry(actor, |actor| async move { actor.get_all_streams().await })
            .await
    }

    pub async fn update_stream_status(&self, stream_id: &str, status: &str) -> Result<()> {
        let Some(actor) = self.actor().await else {
            return Err(Error::Offline("updateStreamStatus"));
        };
        self.with_retry(actor, |actor| async move {
            actor.update_stream_status(stream_id, status).await
        })
        .await?
        .into_result()
        .map_err(Error::Service)
    }

    pub async fn validate_conditions(&self, stream_id: &str) -> Result<bool> {
        let Some(actor) = self.actor().await else {
            return Err(Error::Offline("validateConditions"));
        };
        self.with_retry(actor, |actor| async move {
            actor.validate_conditions(stream_id).await
        })
        .await?
        .into_result()
        .map_err(Error::Service)
    }

    /// The logged-in user's balance. All zeros when logged out.
    pub async fn get_user_balance(&self) -> Result<UserBalance> {
        let Some(actor) = self.actor().await else {
            debug!("Using mock balance data");
            return Ok(mock::balance());
        };
        let Some(principal) = self.auth().await.principal().await else {
            return Ok(UserBalance::default());
        };
        let principal = &principal;
        self.with_retry(actor, |actor| async move {
            actor.get_user_balance(principal).await
        })
        .await
    }

    /// The logged-in user's stream statistics. Zero when logged out.
    pub async fn get_stream_stats(&self) -> Result<StreamStats> {
        let Some(actor) = self.actor().await else {
            debug!("Using mock stats data");
            return Ok(mock::stats());
        };
        let Some(principal) = self.auth().await.principal().await else {
            return Ok(StreamStats::default());
        };
        let principal = &principal;
        self.with_retry(actor, |actor| async move {
            actor.get_stream_stats(principal).await
        })
        .await
    }

    pub async fn get_oracles(&self) -> Result<Vec<Oracle>> {
        let Some(actor) = self.actor().await else {
            debug!("Using mock oracles data");
            return Ok(mock::oracles());
        };
        self.with_retry(actor, |actor| async move { actor.get_oracles().await })
            .await
    }

    pub async fn get_oracle(&self, oracle_id: &str) -> Result<Oracle> {
        let Some(actor) = self.actor().await else {
            debug!("Using mock data for oracle {oracle_id}");
            return mock::oracles()
                .into_iter()
                .find(|oracle| oracle.id == oracle_id)
                .ok_or_else(|| Error::Service("Oracle not found".to_string()));
        };
        self.with_retry(actor, |actor| async move { actor.get_oracle(oracle_id).await })
            .await?
            .into_result()
            .map_err(Error::Service)
    }

    pub async fn add_oracle(&self, oracle: &Oracle) -> Result<String> {
        let Some(actor) = self.actor().await else {
            return Err(Error::Offline("addOracle"));
        };
        self.with_retry(actor, |actor| async move { actor.add_oracle(oracle).await })
            .await?
            .into_result()
            .map_err(Error::Service)
    }

    pub async fn update_oracle_status(&self, oracle_id: &str, status: &str) -> Result<()> {
        let Some(actor) = self.actor().await else {
            return Err(Error::Offline("updateOracleStatus"));
        };
        self.with_retry(actor, |actor| async move {
            actor.update_oracle_status(oracle_id, status).await
        })
        .await?
        .into_result()
        .map_err(Error::Service)
    }

    async fn auth(&self) -> &AuthClient {
        self.auth
            .get_or_init(|| AuthClient::create(Arc::clone(&self.store), self.config.idle))
            .await
    }

    async fn ensure_init(&self) {
        if self.mode().await == Mode::Uninitialized {
            self.init().await;
        }
    }

    /// The live actor, or `None` in mock mode. Counts as user activity.
    ///
    /// Rebuilt first when the session went idle or expired after the actor was built.
    async fn actor(&self) -> Option<PaymentStreamActor> {
        self.ensure_init().await;
        let auth = self.auth().await;
        auth.touch().await;
        let actor = self.state.read().await.live_actor()?;

        let session_principal = auth.identity().await.principal();
        if actor.agent().principal() == session_principal {
            return Some(actor);
        }
        info!(
            "Session identity changed from {} to {session_principal}, rebuilding the actor",
            actor.agent().principal()
        );
        self.update_actor().await;
        self.state.read().await.live_actor()
    }

    fn build_actor(&self, identity: Identity) -> Result<PaymentStreamActor, AgentError> {
        let mut builder = Agent::builder()
            .with_identity(identity)
            .with_ingress_expiry(self.config.ingress_expiry)
            .with_request_timeout(self.config.request_timeout);
        builder = match &self.transport {
            Some(transport) => builder.with_transport(Arc::clone(transport)),
            None => builder.with_url(self.config.host.clone()),
        };
        PaymentStreamActor::new(builder.build()?, self.config.canister_id.clone())
    }

    async fn connect(&self, identity: Identity) -> Result<PaymentStreamActor, AgentError> {
        let actor = self.build_actor(identity)?;
        if self.config.probe_on_init {
            let status = actor.agent().status().await?;
            debug!("Replica status: {status}");
        }
        Ok(actor)
    }

    /// Rebuilds the agent and actor with the current session identity.
    async fn update_actor(&self) {
        let mut state = self.state.write().await;
        if state.mode == Mode::Mock {
            info!("Mock mode enabled, skipping actor update");
            return;
        }

        let identity = self.auth().await.identity().await;
        if identity.is_anonymous() {
            info!("Updating actor with anonymous identity");
        } else {
            info!("Updating actor with identity {}", identity.principal());
        }
        match self.build_actor(identity) {
            Ok(actor) => {
                state.actor = Some(actor);
                state.mode = Mode::Live;
            }
            Err(err) => {
                error!("Failed to update actor, falling back to mock mode: {err}");
                state.actor = None;
                state.mode = Mode::Mock;
            }
        }
    }

    /// Runs `op`, and once more on a fresh actor if the request channel had expired.
    async fn with_retry<T, F, Fut>(&self, actor: PaymentStreamActor, op: F) -> Result<T>
    where
        F: Fn(PaymentStreamActor) -> Fut,
        Fut: Future<Output = Result<T, AgentError>>,
    {
        match op(actor).await {
            Err(err) if err.is_channel_expired() => {
                warn!("Request channel expired, rebuilding the actor and retrying once");
                self.update_actor().await;
                let actor = self.state.read().await.live_actor().ok_or(err)?;
                op(actor).await.map_err(Error::from)
            }
            result => result.map_err(Error::from),
        }
    }
}
