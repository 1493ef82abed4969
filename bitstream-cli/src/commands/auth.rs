// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::access::keys;
use bitstream::{
    BitStreamApi, IdentityKitConnector, InternetIdentityConnector, WalletConnector, WalletKind,
};
use color_eyre::{
    eyre::{eyre, Context, Result},
    Section,
};

pub async fn login(api: &BitStreamApi, wallet: WalletKind) -> Result<()> {
    let connector: Box<dyn WalletConnector> = match wallet {
        WalletKind::InternetIdentity => Box::new(InternetIdentityConnector::new(
            keys::get_device_key().wrap_err("The device key is required to log in")?,
        )),
        WalletKind::IdentityKit => Box::new(IdentityKitConnector::new(
            keys::get_signer_key().wrap_err("The signer key is required to log in")?,
        )),
    };

    println!("Logging in with {wallet}...");
    let logged_in = api
        .login(connector.as_ref())
        .await
        .wrap_err("Failed to log in")?;
    if !logged_in {
        error!("Login with {wallet} failed");
        return Err(eyre!("Login with {wallet} failed"))
            .with_suggestion(|| "check the logs for the reason the wallet refused the login");
    }

    let principal = api
        .principal()
        .await
        .ok_or_else(|| eyre!("Logged in but no session is active"))?;
    info!("Logged in with {wallet} as {principal}");
    println!("✅ Logged in with {wallet} as {principal}");
    if api.is_mock_mode().await {
        println!("⚠️ The service is unreachable, showing offline data");
    }
    Ok(())
}

pub async fn logout(api: &BitStreamApi) -> Result<()> {
    api.logout().await.wrap_err("Failed to log out")?;
    println!("✅ Logged out");
    Ok(())
}

pub async fn status(api: &BitStreamApi) -> Result<()> {
    api.init().await;
    match (api.principal().await, api.wallet().await) {
        (Some(principal), Some(wallet)) => println!("Logged in with {wallet} as {principal}"),
        _ => println!("Not logged in"),
    }
    println!("Host: {}", api.config().host);
    println!("Canister: {}", api.config().canister_id);
    println!("Mode: {:?}", api.mode().await);
    Ok(())
}
