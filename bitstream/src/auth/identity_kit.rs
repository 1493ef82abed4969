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

/// The signer-wallet flow. The delegation only covers the configured target canisters.
pub struct IdentityKitConnector {
    signer_key: SecretKey,
}

impl IdentityKitConnector {
    pub fn new(signer_key: SecretKey) -> Self {
        Self { signer_key }
    }
}

#[async_trait]
impl WalletConnector for IdentityKitConnector {
    fn kind(&self) -> WalletKind {
        WalletKind::IdentityKit
    }

    async fn connect(
        &self,
        session_key: &PublicKey,
        options: &LoginOptions,
    ) -> Result<DelegationChain> {
        if options.signer_targets.is_empty() {
            return Err(AuthError::NoSignerTargets);
        }

        let expiration = now_nanos().saturating_add(duration_nanos(options.max_time_to_live));
        info!(
            "Signer wallet delegating to session key for targets {:?}",
            options.signer_targets
        );
        Ok(DelegationChain::create(
            &self.signer_key,
            session_key,
            expiration,
            Some(options.signer_targets.clone()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn options(targets: Vec<String>) -> LoginOptions {
        LoginOptions {
            identity_provider: String::new(),
            max_time_to_live: Duration::from_secs(60),
            signer_targets: targets,
        }
    }

    #[tokio::test]
    async fn delegation_is_restricted_to_the_targets() {
        let connector = IdentityKitConnector::new(SecretKey::random());
        let chain = connector
            .connect(
                &SecretKey::random().public_key(),
                &options(vec!["wbyay-dyaaa-aaaag-aue3q-cai".to_string()]),
            )
            .await
            .unwrap();

        assert!(chain.allows("wbyay-dyaaa-aaaag-aue3q-cai"));
        assert!(!chain.allows("35epn-uiaaa-aaaag-aufsq-cai"));
    }

    #[tokio::test]
    async fn empty_targets_are_refused() {
        let connector = IdentityKitConnector::new(SecretKey::random());
        let result = connector
            .connect(&SecretKey::random().public_key(), &options(vec![]))
            .await;
        assert!(matches!(result, Err(AuthError::NoSignerTargets)));
    }
}
