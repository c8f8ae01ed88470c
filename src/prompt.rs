use inquire::{CustomType, Password, PasswordDisplayMode};
use log::info;

use crate::{
    config::{ClientSecret, ConfigStore, Credentials},
    schema::UserId,
};

/// Returns the stored API credentials, asking for whichever half is missing.
///
/// Every answer is saved right away, so an interrupted prompt keeps what was entered so far.
pub fn fetch_credentials(store: &mut ConfigStore) -> anyhow::Result<Credentials> {
    let client_id = match store.config().client_id {
        Some(id) => id,
        None => {
            let id: u64 = CustomType::new("Enter your osu! client ID:")
                .with_error_message("Your client ID must be a number!")
                .prompt()?;
            store.config_mut().client_id = Some(id.into());
            store.save()?;
            info!("Saved the client ID to {:?}.", store.path());
            id.into()
        }
    };
    let client_secret = match store.config().client_secret.clone() {
        Some(secret) => secret,
        None => {
            let secret = Password::new("Enter your osu! client secret:")
                .with_display_mode(PasswordDisplayMode::Masked)
                .without_confirmation()
                .prompt()?;
            let secret = ClientSecret::from(secret.trim().to_owned());
            store.config_mut().client_secret = Some(secret.clone());
            store.save()?;
            info!("Saved the client secret to {:?}.", store.path());
            secret
        }
    };
    Ok(Credentials::builder()
        .client_id(client_id)
        .client_secret(client_secret)
        .build())
}

/// The profile to use when no user is given on the command line.
pub fn fetch_profile_id(store: &mut ConfigStore) -> anyhow::Result<UserId> {
    if let Some(id) = store.config().profile_id {
        return Ok(id);
    }
    let id: u64 = CustomType::new("Enter your osu! profile ID:")
        .with_error_message("Your profile ID must be a number!")
        .with_help_message("The number at the end of https://osu.ppy.sh/users/...")
        .prompt()?;
    store.config_mut().profile_id = Some(id.into());
    store.save()?;
    info!("Saved the profile ID to {:?}.", store.path());
    Ok(id.into())
}
