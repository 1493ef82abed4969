// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Session lifecycle for the two supported wallets.
//!
//! A login creates a fresh session key, asks the wallet to delegate to it and keeps the
//! resulting [`DelegatedIdentity`] until it expires, goes idle or the user logs out.

mod error;
mod identity_kit;
mod internet_identity;
mod store;

pub use error::{AuthError, Result};
pub use identity_kit::IdentityKitConnector;
pub use internet_identity::InternetIdentityConnector;
pub use store::{FileSessionStore, MemorySessionStore, SessionStore, StoredSession};

use crate::{
    config::IdleOptions,
    identity::{
        secret_key_from_hex, secret_key_to_hex, DelegatedIdentity, DelegationChain, Identity,
        Principal,
    },
    utils::{duration_nanos, now_nanos},
};
use async_trait::async_trait;
use bls::{PublicKey, SecretKey};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, sync::Arc, time::Duration};
use tokio::sync::Mutex;

/// The wallet flow a session was created with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WalletKind {
    InternetIdentity,
    IdentityKit,
}

impl WalletKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletKind::InternetIdentity => "internet-identity",
            WalletKind::IdentityKit => "identity-kit",
        }
    }
}

impl fmt::Display for WalletKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WalletKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "internet-identity" | "ii" => Ok(WalletKind::InternetIdentity),
            "identity-kit" | "nfid" => Ok(WalletKind::IdentityKit),
            other => Err(format!(
                "Unknown wallet {other:?}, expected internet-identity or identity-kit"
            )),
        }
    }
}

/// Parameters a wallet needs to issue a delegation.
#[derive(Clone, Debug)]
pub struct LoginOptions {
    pub identity_provider: String,
    pub max_time_to_live: Duration,
    /// Canisters a signer wallet restricts its delegation to.
    pub signer_targets: Vec<String>,
}

/// A wallet able to delegate to a session key.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    fn kind(&self) -> WalletKind;

    async fn connect(
        &self,
        session_key: &PublicKey,
        options: &LoginOptions,
    ) -> Result<DelegationChain>;
}

struct Session {
    wallet: WalletKind,
    identity: DelegatedIdentity,
    last_activity: u64,
}

impl Session {
    fn restore(stored: StoredSession) -> Result<Self> {
        let session_key = secret_key_from_hex(&stored.session_key)?;
        Ok(Self {
            wallet: stored.wallet,
            identity: DelegatedIdentity::new(session_key, stored.chain)?,
            last_activity: stored.last_activity,
        })
    }

    fn to_stored(&self) -> StoredSession {
        StoredSession {
            wallet: self.wallet,
            session_key: secret_key_to_hex(self.identity.session_key()),
            chain: self.identity.chain().clone(),
            last_activity: self.last_activity,
        }
    }

    fn identity_principal(&self) -> Principal {
        self.identity.principal().clone()
    }

    fn is_valid_at(&self, now: u64, idle: &IdleOptions) -> bool {
        if self.identity.chain().is_expired_at(now) {
            return false;
        }
        idle.disable_idle
            || now.saturating_sub(self.last_activity) < duration_nanos(idle.idle_timeout)
    }
}

/// Tracks whether the user is logged in, and as whom.
pub struct AuthClient {
    store: Arc<dyn SessionStore>,
    idle: IdleOptions,
    session: Mutex<Option<Session>>,
    login_lock: Mutex<()>,
}

impl AuthClient {
    /// Restores a persisted session when one is still valid.
    pub async fn create(store: Arc<dyn SessionStore>, idle: IdleOptions) -> Self {
        let session = match store.load().await {
            Ok(Some(stored)) => match Session::restore(stored) {
                Ok(session) if session.is_valid_at(now_nanos(), &idle) => {
                    info!(
                        "Restored {} session for {}",
                        session.wallet,
                        session.identity_principal()
                    );
                    Some(session)
                }
                Ok(_) => {
                    info!("Stored session has expired, discarding it");
                    None
                }
                Err(err) => {
                    warn!("Discarding unusable stored session: {err}");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!("Could not read the stored session: {err}");
                None
            }
        };

        let client = Self {
            store,
            idle,
            session: Mutex::new(None),
            login_lock: Mutex::new(()),
        };
        match session {
            Some(session) => *client.session.lock().await = Some(session),
            None => client.clear_store().await,
        }
        client
    }

    pub async fn is_authenticated(&self) -> bool {
        let mut session = self.session.lock().await;
        self.check_session(&mut session).await
    }

    /// The session identity, or the anonymous identity when logged out.
    pub async fn identity(&self) -> Identity {
        let mut session = self.session.lock().await;
        if !self.check_session(&mut session).await {
            return Identity::Anonymous;
        }
        session
            .as_ref()
            .map(|session| Identity::Delegated(session.identity.clone()))
            .unwrap_or_default()
    }

    pub async fn principal(&self) -> Option<Principal> {
        let mut session = self.session.lock().await;
        if !self.check_session(&mut session).await {
            return None;
        }
        session.as_ref().map(Session::identity_principal)
    }

    pub async fn wallet(&self) -> Option<WalletKind> {
        let mut session = self.session.lock().await;
        if !self.check_session(&mut session).await {
            return None;
        }
        session.as_ref().map(|session| session.wallet)
    }

    /// Runs the wallet flow and stores the new session.
    ///
    /// Only one login may run at a time. A session from the other wallet is closed first.
    pub async fn login(
        &self,
        connector: &dyn WalletConnector,
        options: &LoginOptions,
    ) -> Result<Principal> {
        let _login = self
            .login_lock
            .try_lock()
            .map_err(|_| AuthError::LoginInProgress)?;
        let wallet = connector.kind();

        {
            let mut session = self.session.lock().await;
            if let Some(previous) = session.as_ref() {
                if previous.wallet != wallet {
                    info!(
                        "Closing {} session before logging in with {wallet}",
                        previous.wallet
                    );
                    *session = None;
                    self.store.clear().await?;
                }
            }
        }

        let session_key = SecretKey::random();
        let chain = connector
            .connect(&session_key.public_key(), options)
            .await?;
        let session = Session {
            wallet,
            identity: DelegatedIdentity::new(session_key, chain)?,
            last_activity: now_nanos(),
        };
        self.store.save(&session.to_stored()).await?;

        let principal = session.identity_principal();
        info!("Logged in with {wallet} as {principal}");
        *self.session.lock().await = Some(session);
        Ok(principal)
    }

    pub async fn logout(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        if let Some(previous) = session.take() {
            info!("Logging out {} session", previous.wallet);
        }
        self.store.clear().await
    }

    /// Records user activity, pushing back the idle timeout.
    pub async fn touch(&self) {
        let mut session = self.session.lock().await;
        if !self.check_session(&mut session).await {
            return;
        }
        if let Some(session) = session.as_mut() {
            session.last_activity = now_nanos();
            if let Err(err) = self.store.save(&session.to_stored()).await {
                warn!("Failed to persist session activity: {err}");
            }
        }
    }

    async fn check_session(&self, session: &mut Option<Session>) -> bool {
        match session {
            Some(current) if current.is_valid_at(now_nanos(), &self.idle) => true,
            Some(current) => {
                info!("{} session expired or went idle, logging out", current.wallet);
                *session = None;
                self.clear_store().await;
                false
            }
            None => false,
        }
    }

    async fn clear_store(&self) {
        if let Err(err) = self.store.clear().await {
            warn!("Failed to clear the stored session: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn options() -> LoginOptions {
        LoginOptions {
            identity_provider: "https://identity.ic0.app".to_string(),
            max_time_to_live: Duration::from_secs(3600),
            signer_targets: vec!["wbyay-dyaaa-aaaag-aue3q-cai".to_string()],
        }
    }

    async fn client(store: &Arc<MemorySessionStore>, idle: IdleOptions) -> AuthClient {
        AuthClient::create(Arc::clone(store) as Arc<dyn SessionStore>, idle).await
    }

    /// Holds the wallet flow open until released.
    struct GatedConnector {
        gate: Notify,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl WalletConnector for GatedConnector {
        fn kind(&self) -> WalletKind {
            WalletKind::InternetIdentity
        }

        async fn connect(
            &self,
            session_key: &PublicKey,
            options: &LoginOptions,
        ) -> Result<DelegationChain> {
            let _ = self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            let expiration = now_nanos() + duration_nanos(options.max_time_to_live);
            Ok(DelegationChain::create(
                &SecretKey::random(),
                session_key,
                expiration,
                None,
            ))
        }
    }

    #[test]
    fn wallet_kind_parses_cli_names() {
        assert_eq!(
            "internet-identity".parse::<WalletKind>(),
            Ok(WalletKind::InternetIdentity)
        );
        assert_eq!("identity-kit".parse::<WalletKind>(), Ok(WalletKind::IdentityKit));
        assert!("metamask".parse::<WalletKind>().is_err());
        assert_eq!(WalletKind::IdentityKit.to_string(), "identity-kit");
    }

    #[tokio::test]
    async fn fresh_client_is_anonymous() {
        let store = Arc::new(MemorySessionStore::default());
        let auth = client(&store, IdleOptions::default()).await;

        assert!(!auth.is_authenticated().await);
        assert!(auth.identity().await.is_anonymous());
        assert_eq!(auth.principal().await, None);
        assert_eq!(auth.wallet().await, None);
    }

    #[tokio::test]
    async fn login_persists_and_restores_the_session() {
        let store = Arc::new(MemorySessionStore::default());
        let device_key = SecretKey::random();
        let auth = client(&store, IdleOptions::default()).await;

        let principal = auth
            .login(&InternetIdentityConnector::new(device_key.clone()), &options())
            .await
            .unwrap();
        assert_eq!(
            principal,
            Principal::self_authenticating(&device_key.public_key())
        );
        assert!(auth.is_authenticated().await);
        assert_eq!(auth.wallet().await, Some(WalletKind::InternetIdentity));

        let restored = client(&store, IdleOptions::default()).await;
        assert_eq!(restored.principal().await, Some(principal));
    }

    #[tokio::test]
    async fn logout_clears_the_store() {
        let store = Arc::new(MemorySessionStore::default());
        let auth = client(&store, IdleOptions::default()).await;
        let _ = auth
            .login(&IdentityKitConnector::new(SecretKey::random()), &options())
            .await
            .unwrap();

        auth.logout().await.unwrap();

        assert!(!auth.is_authenticated().await);
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn switching_wallets_replaces_the_session() {
        let store = Arc::new(MemorySessionStore::default());
        let auth = client(&store, IdleOptions::default()).await;
        let _ = auth
            .login(&InternetIdentityConnector::new(SecretKey::random()), &options())
            .await
            .unwrap();

        let signer_key = SecretKey::random();
        let principal = auth
            .login(&IdentityKitConnector::new(signer_key.clone()), &options())
            .await
            .unwrap();

        assert_eq!(auth.wallet().await, Some(WalletKind::IdentityKit));
        assert_eq!(
            principal,
            Principal::self_authenticating(&signer_key.public_key())
        );
        let stored = store.load().await.unwrap().unwrap();
        assert_eq!(stored.wallet, WalletKind::IdentityKit);
    }

    #[tokio::test]
    async fn failed_wallet_switch_still_closes_the_old_session() {
        let store = Arc::new(MemorySessionStore::default());
        let auth = client(&store, IdleOptions::default()).await;
        let _ = auth
            .login(&InternetIdentityConnector::new(SecretKey::random()), &options())
            .await
            .unwrap();

        let no_targets = LoginOptions {
            signer_targets: vec![],
            ..options()
        };
        let result = auth
            .login(&IdentityKitConnector::new(SecretKey::random()), &no_targets)
            .await;

        assert!(matches!(result, Err(AuthError::NoSignerTargets)));
        assert!(!auth.is_authenticated().await);
    }

    #[tokio::test]
    async fn concurrent_login_is_refused() {
        let store = Arc::new(MemorySessionStore::default());
        let auth = client(&store, IdleOptions::default()).await;
        let connector = GatedConnector {
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
        };

        let first_options = options();
        let (first, second) = tokio::join!(auth.login(&connector, &first_options), async {
            let second = auth.login(&connector, &options()).await;
            connector.gate.notify_one();
            second
        });

        assert!(first.is_ok());
        assert!(matches!(second, Err(AuthError::LoginInProgress)));
        assert_eq!(connector.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn idle_session_is_dropped() {
        let store = Arc::new(MemorySessionStore::default());
        let idle = IdleOptions {
            disable_idle: false,
            idle_timeout: Duration::from_millis(20),
        };
        let auth = client(&store, idle).await;
        let _ = auth
            .login(&InternetIdentityConnector::new(SecretKey::random()), &options())
            .await
            .unwrap();
        assert!(auth.is_authenticated().await);

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!auth.is_authenticated().await);
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn disabled_idle_keeps_the_session() {
        let store = Arc::new(MemorySessionStore::default());
        let idle = IdleOptions {
            disable_idle: true,
            idle_timeout: Duration::from_millis(1),
        };
        let auth = client(&store, idle).await;
        let _ = auth
            .login(&InternetIdentityConnector::new(SecretKey::random()), &options())
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(auth.is_authenticated().await);
    }

    #[tokio::test]
    async fn expired_stored_session_is_discarded_on_create() {
        let store = Arc::new(MemorySessionStore::default());
        let session_key = SecretKey::random();
        store
            .save(&StoredSession {
                wallet: WalletKind::InternetIdentity,
                session_key: secret_key_to_hex(&session_key),
                chain: DelegationChain::create(
                    &SecretKey::random(),
                    &session_key.public_key(),
                    1,
                    None,
                ),
                last_activity: now_nanos(),
            })
            .await
            .unwrap();

        let auth = client(&store, IdleOptions::default()).await;

        assert!(!auth.is_authenticated().await);
        assert!(store.load().await.unwrap().is_none());
    }
}
