// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use super::{AuthError, LoginOptions, Result, WalletConnector, WalletKind};
use crate::{
    identity::DelegationChain,
    utils::{duration_nanos, now_nanos},
};
use async_trait::async_trait;
use bls::{PublicKey, SecretKey};
use url::Url;

/// The identity-provider flow.
///
/// The device key is the anchor the provider knows this client by. It delegates to the
/// session key for the full time-to-live with no canister restriction.
pub struct InternetIdentityConnector {
    device_key: SecretKey,
}

impl InternetIdentityConnector {
    pub fn new(device_key: SecretKey) -> Self {
        Self { device_key }
    }
}

#[async_trait]
impl WalletConnector for InternetIdentityConnector {
    fn kind(&self) -> WalletKind {
        WalletKind::InternetIdentity
    }

    async fn connect(
        &self,
        session_key: &PublicKey,
        options: &LoginOptions,
    ) -> Result<DelegationChain> {
        let provider = Url::parse(&options.identity_provider).map_err(|err| {
            AuthError::InvalidIdentityProvider {
                provider: options.identity_provider.clone(),
                reason: err.to_string(),
            }
        })?;
        if !matches!(provider.scheme(), "http" | "https") {
            return Err(AuthError::InvalidIdentityProvider {
                provider: options.identity_provider.clone(),
                reason: format!("unsupported scheme {}", provider.scheme()),
            });
        }

        let expiration = now_nanos().saturating_add(duration_nanos(options.max_time_to_live));
        info!("Authorising session key through identity provider {provider}");
        Ok(DelegationChain::create(
            &self.device_key,
            session_key,
            expiration,
            None,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Principal;
    use std::time::Duration;

    fn options(provider: &str) -> LoginOptions {
        LoginOptions {
            identity_provider: provider.to_string(),
            max_time_to_live: Duration::from_secs(60),
            signer_targets: vec![],
        }
    }

    #[tokio::test]
    async fn delegation_is_unrestricted_and_rooted_at_the_device_key() {
        let device_key = SecretKey::random();
        let session_key = SecretKey::random();
        let connector = InternetIdentityConnector::new(device_key.clone());

        let chain = connector
            .connect(&session_key.public_key(), &options("https://identity.ic0.app"))
            .await
            .unwrap();

        assert_eq!(chain.verify().unwrap(), session_key.public_key());
        assert!(chain.allows("any-canister"));
        assert_eq!(
            Principal::self_authenticating(&chain.root_key().unwrap()),
            Principal::self_authenticating(&device_key.public_key())
        );
        assert!(!chain.is_expired_at(now_nanos()));
    }

    #[tokio::test]
    async fn provider_must_be_a_web_url() {
        let connector = InternetIdentityConnector::new(SecretKey::random());
        let result = connector
            .connect(&SecretKey::random().public_key(), &options("identity.ic0.app"))
            .await;
        assert!(matches!(
            result,
            Err(AuthError::InvalidIdentityProvider { .. })
        ));
    }
}
