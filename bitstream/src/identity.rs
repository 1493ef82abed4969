// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use bls::{PublicKey, SecretKey, Signature, PK_SIZE, SIG_SIZE, SK_SIZE};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha224, Sha256};
use std::{fmt, str::FromStr};

const ANONYMOUS_TAG: u8 = 0x04;
const SELF_AUTHENTICATING_TAG: u8 = 0x02;
const MAX_PRINCIPAL_LEN: usize = 29;
const DELEGATION_DOMAIN: &[u8] = b"bitstream-delegation";

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Could not decode hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("A principal is 1 to {MAX_PRINCIPAL_LEN} bytes long, got {0}")]
    PrincipalLength(usize),
    #[error("Invalid BLS secret key")]
    InvalidSecretKey,
    #[error("Invalid BLS public key")]
    InvalidPublicKey,
    #[error("Invalid BLS signature")]
    InvalidSignature,
    #[error("Delegation chain is empty")]
    EmptyChain,
    #[error("Delegation {0} in the chain is not signed by its parent key")]
    BrokenChain(usize),
    #[error("Delegation chain does not end at the session key")]
    SessionKeyMismatch,
}

/// The opaque identity of a caller as seen by the service.
///
/// Self-authenticating principals are derived from a public key; the anonymous principal is
/// what unauthenticated callers present.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Principal(Vec<u8>);

impl Principal {
    pub fn anonymous() -> Self {
        Self(vec![ANONYMOUS_TAG])
    }

    pub fn self_authenticating(public_key: &PublicKey) -> Self {
        let mut bytes = Sha224::digest(public_key.to_bytes()).to_vec();
        bytes.push(SELF_AUTHENTICATING_TAG);
        Self(bytes)
    }

    pub fn is_anonymous(&self) -> bool {
        self.0 == [ANONYMOUS_TAG]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn to_text(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn from_text(text: &str) -> Result<Self, IdentityError> {
        let bytes = hex::decode(text.trim())?;
        if bytes.is_empty() || bytes.len() > MAX_PRINCIPAL_LEN {
            return Err(IdentityError::PrincipalLength(bytes.len()));
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Principal({})", self.to_text())
    }
}

impl FromStr for Principal {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

impl From<Principal> for String {
    fn from(principal: Principal) -> Self {
        principal.to_text()
    }
}

impl TryFrom<String> for Principal {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_text(&value)
    }
}

/// Construct a BLS secret key from a hex-encoded string.
pub fn secret_key_from_hex(hex: &str) -> Result<SecretKey, IdentityError> {
    let bytes = hex::decode(hex.trim())?;
    let bytes_fixed_len: [u8; SK_SIZE] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| IdentityError::InvalidSecretKey)?;
    SecretKey::from_bytes(bytes_fixed_len).map_err(|_| IdentityError::InvalidSecretKey)
}

pub fn secret_key_to_hex(secret_key: &SecretKey) -> String {
    hex::encode(secret_key.to_bytes())
}

/// Construct a BLS public key from a hex-encoded string.
pub fn public_key_from_hex(hex: &str) -> Result<PublicKey, IdentityError> {
    let bytes = hex::decode(hex.trim())?;
    let bytes_fixed_len: [u8; PK_SIZE] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| IdentityError::InvalidPublicKey)?;
    PublicKey::from_bytes(bytes_fixed_len).map_err(|_| IdentityError::InvalidPublicKey)
}

pub fn signature_from_hex(hex: &str) -> Result<Signature, IdentityError> {
    let bytes = hex::decode(hex.trim())?;
    let bytes_fixed_len: [u8; SIG_SIZE] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| IdentityError::InvalidSignature)?;
    Signature::from_bytes(bytes_fixed_len).map_err(|_| IdentityError::InvalidSignature)
}

/// Permission for `pubkey` to sign on behalf of the parent key until `expiration`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    /// Hex-encoded delegated public key.
    pub pubkey: String,
    /// Nanoseconds since the unix epoch.
    pub expiration: u64,
    /// Canister ids this delegation may call. `None` means unrestricted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<String>>,
}

impl Delegation {
    fn signable_bytes(&self) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(self.pubkey.as_bytes());
        hasher.update(self.expiration.to_be_bytes());
        if let Some(targets) = &self.targets {
            for target in targets {
                hasher.update((target.len() as u64).to_be_bytes());
                hasher.update(target.as_bytes());
            }
        }
        let mut bytes = DELEGATION_DOMAIN.to_vec();
        bytes.extend_from_slice(&hasher.finalize());
        bytes
    }

    pub fn allows(&self, canister_id: &str) -> bool {
        match &self.targets {
            Some(targets) => targets.iter().any(|target| target == canister_id),
            None => true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedDelegation {
    pub delegation: Delegation,
    /// Hex-encoded signature by the parent key.
    pub signature: String,
}

/// A chain of delegations from a wallet key down to a session key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationChain {
    /// Hex-encoded root (wallet) public key. The principal is derived from it.
    pub public_key: String,
    pub delegations: Vec<SignedDelegation>,
}

impl DelegationChain {
    /// Single-link chain where `from` delegates to `to`.
    pub fn create(
        from: &SecretKey,
        to: &PublicKey,
        expiration: u64,
        targets: Option<Vec<String>>,
    ) -> Self {
        let delegation = Delegation {
            pubkey: hex::encode(to.to_bytes()),
            expiration,
            targets,
        };
        let signature = from.sign(delegation.signable_bytes());
        Self {
            public_key: hex::encode(from.public_key().to_bytes()),
            delegations: vec![SignedDelegation {
                delegation,
                signature: hex::encode(signature.to_bytes()),
            }],
        }
    }

    /// The earliest expiration along the chain.
    pub fn expiration(&self) -> Option<u64> {
        self.delegations
            .iter()
            .map(|signed| signed.delegation.expiration)
            .min()
    }

    pub fn is_expired_at(&self, now_nanos: u64) -> bool {
        self.expiration()
            .map_or(true, |expiration| expiration <= now_nanos)
    }

    pub fn allows(&self, canister_id: &str) -> bool {
        self.delegations
            .iter()
            .all(|signed| signed.delegation.allows(canister_id))
    }

    pub fn root_key(&self) -> Result<PublicKey, IdentityError> {
        public_key_from_hex(&self.public_key)
    }

    /// Checks every link is signed by its parent and returns the key at the end of the chain.
    pub fn verify(&self) -> Result<PublicKey, IdentityError> {
        if self.delegations.is_empty() {
            return Err(IdentityError::EmptyChain);
        }
        let mut signer = self.root_key()?;
        for (index, signed) in self.delegations.iter().enumerate() {
            let signature = signature_from_hex(&signed.signature)?;
            if !signer.verify(&signature, signed.delegation.signable_bytes()) {
                return Err(IdentityError::BrokenChain(index));
            }
            signer = public_key_from_hex(&signed.delegation.pubkey)?;
        }
        Ok(signer)
    }
}

/// A session key acting for the principal at the root of a delegation chain.
#[derive(Clone)]
pub struct DelegatedIdentity {
    session_key: SecretKey,
    chain: DelegationChain,
    principal: Principal,
}

impl DelegatedIdentity {
    pub fn new(session_key: SecretKey, chain: DelegationChain) -> Result<Self, IdentityError> {
        let delegated_to = chain.verify()?;
        if delegated_to != session_key.public_key() {
            return Err(IdentityError::SessionKeyMismatch);
        }
        let principal = Principal::self_authenticating(&chain.root_key()?);
        Ok(Self {
            session_key,
            chain,
            principal,
        })
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn chain(&self) -> &DelegationChain {
        &self.chain
    }

    pub fn session_key(&self) -> &SecretKey {
        &self.session_key
    }
}

/// Request signing material attached to an envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderAuth {
    pub sender_pubkey: String,
    pub sender_sig: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_delegation: Option<Vec<SignedDelegation>>,
}

/// Who a request is sent as.
#[derive(Clone, Default)]
pub enum Identity {
    #[default]
    Anonymous,
    Basic(SecretKey),
    Delegated(DelegatedIdentity),
}

impl Identity {
    pub fn principal(&self) -> Principal {
        match self {
            Identity::Anonymous => Principal::anonymous(),
            Identity::Basic(secret_key) => Principal::self_authenticating(&secret_key.public_key()),
            Identity::Delegated(delegated) => delegated.principal.clone(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }

    /// When the identity stops being usable, in nanoseconds since the epoch.
    pub fn expiration(&self) -> Option<u64> {
        match self {
            Identity::Delegated(delegated) => delegated.chain.expiration(),
            _ => None,
        }
    }

    pub fn is_expired_at(&self, now_nanos: u64) -> bool {
        match self {
            Identity::Delegated(delegated) => delegated.chain.is_expired_at(now_nanos),
            _ => false,
        }
    }

    pub fn allows(&self, canister_id: &str) -> bool {
        match self {
            Identity::Delegated(delegated) => delegated.chain.allows(canister_id),
            _ => true,
        }
    }

    /// Signs a request id. Anonymous requests are sent unsigned.
    pub fn sign(&self, request_id: &[u8]) -> Option<SenderAuth> {
        match self {
            Identity::Anonymous => None,
            Identity::Basic(secret_key) => Some(SenderAuth {
                sender_pubkey: hex::encode(secret_key.public_key().to_bytes()),
                sender_sig: hex::encode(secret_key.sign(request_id).to_bytes()),
                sender_delegation: None,
            }),
            Identity::Delegated(delegated) => Some(SenderAuth {
                sender_pubkey: delegated.chain.public_key.clone(),
                sender_sig: hex::encode(delegated.session_key.sign(request_id).to_bytes()),
                sender_delegation: Some(delegated.chain.delegations.clone()),
            }),
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Anonymous => write!(f, "Identity::Anonymous"),
            Identity::Basic(_) => write!(f, "Identity::Basic({})", self.principal()),
            Identity::Delegated(_) => write!(f, "Identity::Delegated({})", self.principal()),
        }
    }
}
