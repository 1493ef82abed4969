// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use bitstream::{identity, SecretKey};
use color_eyre::{
    eyre::{Context, Result},
    Section,
};
use std::{
    env, fs,
    path::Path,
};

const DEVICE_KEY_ENV: &str = "BITSTREAM_DEVICE_KEY";
const SIGNER_KEY_ENV: &str = "BITSTREAM_SIGNER_KEY";

const DEVICE_KEY_FILE: &str = "device_key";
const SIGNER_KEY_FILE: &str = "signer_key";

/// The key this device authenticates with at the identity provider.
///
/// Read from `BITSTREAM_DEVICE_KEY`, then from the data dir. Generated on first use.
pub fn get_device_key() -> Result<SecretKey> {
    if let Ok(key) = env::var(DEVICE_KEY_ENV) {
        return parse_key(&key, DEVICE_KEY_ENV);
    }
    let dir = super::data_dir::get_client_data_dir_path()
        .wrap_err("Could not access directory for the device key")
        .with_suggestion(|| format!("make sure you've provided the {DEVICE_KEY_ENV} env var"))?;
    load_or_create_device_key(&dir)
}

/// The signer wallet's key, from `BITSTREAM_SIGNER_KEY` or the data dir.
pub fn get_signer_key() -> Result<SecretKey> {
    // try env var first
    let why_env_failed = match env::var(SIGNER_KEY_ENV) {
        Ok(key) => return parse_key(&key, SIGNER_KEY_ENV),
        Err(e) => e,
    };

    // try from data dir
    let dir = super::data_dir::get_client_data_dir_path()
        .wrap_err(format!("Failed to obtain signer key from env var: {why_env_failed}, reading from disk also failed as couldn't access data dir"))
        .with_suggestion(|| format!("make sure you've provided the {SIGNER_KEY_ENV} env var"))?;
    load_signer_key(&dir)
}

fn load_or_create_device_key(dir: &Path) -> Result<SecretKey> {
    let key_path = dir.join(DEVICE_KEY_FILE);
    if key_path.exists() {
        let key_hex =
            fs::read_to_string(&key_path).wrap_err("Failed to read device key from file")?;
        return parse_key(&key_hex, DEVICE_KEY_ENV);
    }

    let key = SecretKey::random();
    write_key(&key_path, &key)?;
    info!("Created new device key at: {key_path:?}");
    println!("Created new device key at: {}", key_path.display());
    Ok(key)
}

fn load_signer_key(dir: &Path) -> Result<SecretKey> {
    let key_path = dir.join(SIGNER_KEY_FILE);
    let key_hex = fs::read_to_string(&key_path)
        .wrap_err("Failed to read signer key from file")
        .with_suggestion(|| format!("make sure you've provided the {SIGNER_KEY_ENV} env var or have the key in a file at {key_path:?}"))
        .with_suggestion(|| "the signer key should be a hex encoded string of a bls secret key")?;
    parse_key(&key_hex, SIGNER_KEY_ENV)
}

fn write_key(key_path: &Path, key: &SecretKey) -> Result<()> {
    fs::write(key_path, identity::secret_key_to_hex(key)).wrap_err("Could not write key to file")
}

fn parse_key(key_hex: &str, env_name: &str) -> Result<SecretKey> {
    identity::secret_key_from_hex(key_hex)
        .wrap_err("Failed to parse key")
        .with_suggestion(|| {
            format!("{env_name} should be a hex encoded string of a bls secret key")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::Result;

    #[test]
    fn device_key_is_created_once() -> Result<()> {
        let dir = tempfile::tempdir()?;

        let created = load_or_create_device_key(dir.path()).map_err(|err| eyre::eyre!("{err}"))?;
        let loaded = load_or_create_device_key(dir.path()).map_err(|err| eyre::eyre!("{err}"))?;

        assert_eq!(created.public_key(), loaded.public_key());
        Ok(())
    }

    #[test]
    fn missing_signer_key_is_an_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        assert!(load_signer_key(dir.path()).is_err());

        let key = SecretKey::random();
        fs::write(
            dir.path().join(SIGNER_KEY_FILE),
            identity::secret_key_to_hex(&key),
        )?;
        let loaded = load_signer_key(dir.path()).map_err(|err| eyre::eyre!("{err}"))?;
        assert_eq!(loaded.public_key(), key.public_key());
        Ok(())
    }

    #[test]
    fn malformed_key_is_rejected() {
        assert!(parse_key("not hex", SIGNER_KEY_ENV).is_err());
    }
}
