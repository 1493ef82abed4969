// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use std::{env, time::Duration};

pub const DEFAULT_HOST: &str = "https://ic0.app";
pub const DEFAULT_CANISTER_ID: &str = "wbyay-dyaaa-aaaag-aue3q-cai";
pub const DEFAULT_IDENTITY_PROVIDER: &str = "https://identity.ic0.app";

pub const HOST_ENV: &str = "BITSTREAM_HOST";
pub const CANISTER_ID_ENV: &str = "BITSTREAM_CANISTER_ID";
pub const IDENTITY_PROVIDER_ENV: &str = "BITSTREAM_IDENTITY_PROVIDER";

/// How long a wallet delegation stays valid. 7 days
const MAX_TIME_TO_LIVE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Inactivity after which a session is dropped. 30 mins
const IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// How far in the future a signed request stays valid. 5 mins
const INGRESS_EXPIRY: Duration = Duration::from_secs(5 * 60);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Idle handling for an authenticated session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdleOptions {
    pub disable_idle: bool,
    pub idle_timeout: Duration,
}

impl Default for IdleOptions {
    fn default() -> Self {
        Self {
            disable_idle: false,
            idle_timeout: IDLE_TIMEOUT,
        }
    }
}

/// Configuration for [`crate::BitStreamApi`].
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the replica serving the canister.
    pub host: String,
    /// The payment-stream canister.
    pub canister_id: String,
    /// Identity provider used by the Internet Identity flow.
    pub identity_provider: String,
    /// Lifetime of the delegation issued at login.
    pub max_time_to_live: Duration,
    pub idle: IdleOptions,
    /// Canisters the signer wallet delegation is restricted to.
    pub signer_targets: Vec<String>,
    pub ingress_expiry: Duration,
    pub request_timeout: Duration,
    /// Fetch the replica status while initialising and fall back to mock data when it fails.
    pub probe_on_init: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            canister_id: DEFAULT_CANISTER_ID.to_string(),
            identity_provider: DEFAULT_IDENTITY_PROVIDER.to_string(),
            max_time_to_live: MAX_TIME_TO_LIVE,
            idle: IdleOptions::default(),
            signer_targets: vec![DEFAULT_CANISTER_ID.to_string()],
            ingress_expiry: INGRESS_EXPIRY,
            request_timeout: REQUEST_TIMEOUT,
            probe_on_init: true,
        }
    }
}

impl ClientConfig {
    /// Defaults, overridden by `BITSTREAM_HOST`, `BITSTREAM_CANISTER_ID` and
    /// `BITSTREAM_IDENTITY_PROVIDER` when they are set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(host) = env::var(HOST_ENV) {
            info!("Using replica host from {HOST_ENV}: {host}");
            config = config.with_host(host);
        }
        if let Ok(canister_id) = env::var(CANISTER_ID_ENV) {
            info!("Using canister id from {CANISTER_ID_ENV}: {canister_id}");
            config = config.with_canister_id(canister_id);
        }
        if let Ok(provider) = env::var(IDENTITY_PROVIDER_ENV) {
            info!("Using identity provider from {IDENTITY_PROVIDER_ENV}: {provider}");
            config = config.with_identity_provider(provider);
        }
        config
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the canister id. Signer targets still pointing at the previous id follow it.
    pub fn with_canister_id(mut self, canister_id: impl Into<String>) -> Self {
        let canister_id = canister_id.into();
        if self.signer_targets == [self.canister_id.clone()] {
            self.signer_targets = vec![canister_id.clone()];
        }
        self.canister_id = canister_id;
        self
    }

    pub fn with_identity_provider(mut self, identity_provider: impl Into<String>) -> Self {
        self.identity_provider = identity_provider.into();
        self
    }

    pub fn with_max_time_to_live(mut self, max_time_to_live: Duration) -> Self {
        self.max_time_to_live = max_time_to_live;
        self
    }

    pub fn with_idle(mut self, idle: IdleOptions) -> Self {
        self.idle = idle;
        self
    }

    pub fn with_signer_targets(mut self, targets: Vec<String>) -> Self {
        self.signer_targets = targets;
        self
    }

    pub fn with_ingress_expiry(mut self, ingress_expiry: Duration) -> Self {
        self.ingress_expiry = ingress_expiry;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn with_probe_on_init(mut self, probe_on_init: bool) -> Self {
        self.probe_on_init = probe_on_init;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_deployed_service() {
        let config = ClientConfig::default();
        assert_eq!(config.host, "https://ic0.app");
        assert_eq!(config.canister_id, "wbyay-dyaaa-aaaag-aue3q-cai");
        assert_eq!(config.identity_provider, "https://identity.ic0.app");
        assert_eq!(config.max_time_to_live, Duration::from_secs(604_800));
        assert_eq!(config.idle.idle_timeout, Duration::from_secs(1_800));
        assert!(!config.idle.disable_idle);
        assert_eq!(config.signer_targets, vec![DEFAULT_CANISTER_ID.to_string()]);
        assert!(config.probe_on_init);
    }

    #[test]
    fn default_signer_targets_follow_the_canister_id() {
        let config = ClientConfig::default().with_canister_id("aaaaa-aa");
        assert_eq!(config.signer_targets, vec!["aaaaa-aa".to_string()]);

        let config = ClientConfig::default()
            .with_signer_targets(vec!["35epn-uiaaa-aaaag-aufsq-cai".to_string()])
            .with_canister_id("aaaaa-aa");
        assert_eq!(
            config.signer_targets,
            vec!["35epn-uiaaa-aaaag-aufsq-cai".to_string()]
        );
    }
}
