use std::{path::PathBuf, sync::Arc};

use chrono::Local;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use log::info;
use strum::IntoEnumIterator;

use crate::{
    api::{OsuClient, UserQuery},
    config::ConfigStore,
    prompt::{fetch_credentials, fetch_profile_id},
    render::{print_report, validate_output_dir, write_rank_files, Details},
    report::{build_report, ReportOptions},
    schema::GameMode,
    setting::SettingKey,
};

#[derive(Debug)]
pub struct ProfileArgs {
    pub query: Option<String>,
    pub mode: GameMode,
    pub console: bool,
    pub json: Option<PathBuf>,
    pub concurrency: usize,
}

/// Fetches the top plays of a user, and prints or saves their chokes.
pub async fn profile(store: &mut ConfigStore, args: ProfileArgs) -> anyhow::Result<()> {
    if let Some(dir) = &args.json {
        validate_output_dir(dir)?;
    }
    let query = match &args.query {
        Some(query) => UserQuery::parse(query)?,
        None => UserQuery::Id(fetch_profile_id(store)?),
    };
    let credentials = fetch_credentials(store)?;

    let client = OsuClient::login(&credentials).await?;
    let user = client.user(&query, args.mode).await?;
    info!("Found {} (ID {}).", user.username, user.id);
    let scores = client.best_scores(user.id, args.mode).await?;
    info!("Fetched {} top plays.", scores.len());

    let options = ReportOptions::builder()
        .mode(args.mode)
        .concurrency(args.concurrency)
        .build();
    let report = build_report(scores, &user, Arc::new(client), options).await?;

    if args.console || args.json.is_none() {
        print_report(&user, &report);
    }
    if let Some(dir) = &args.json {
        let details = Details::new(&user, &Local::now());
        let paths = write_rank_files(dir, &report, &details)?;
        println!(
            "[SUCCESS] Saved {} rank files to {:?}.",
            paths.len(),
            dir
        );
    }
    Ok(())
}

pub fn config_list(store: &ConfigStore) {
    let config = store.config();
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(["Setting", "Value", "Description"]);
    for key in SettingKey::iter() {
        let value = match config.get_or_default(key) {
            None => "[undefined]".to_owned(),
            Some(_) if key.is_redacted() => "[redacted]".to_owned(),
            Some(value) => value.to_string(),
        };
        table.add_row([key.display_name(), value, key.description().to_owned()]);
    }
    println!("{table}");
}

pub fn config_set(store: &mut ConfigStore, setting: &str, value: &str) -> anyhow::Result<()> {
    let key = SettingKey::resolve(setting, store.config().autocorrect_confidence())?;
    let value = store.config_mut().set(key, value)?;
    store.save()?;
    info!("Saved {key} to {:?}.", store.path());
    let shown = if key.is_redacted() {
        "[redacted]".to_owned()
    } else {
        value.to_string()
    };
    println!(
        "[SUCCESS] {} has been successfully set to {shown}!",
        key.display_name()
    );
    Ok(())
}

pub fn config_reset(store: &mut ConfigStore, setting: Option<&str>) -> anyhow::Result<()> {
    match setting {
        None => {
            store.config_mut().clear_all();
            store.save()?;
            println!("[SUCCESS] The config has been successfully reset!");
        }
        Some(setting) => {
            let key = SettingKey::resolve(setting, store.config().autocorrect_confidence())?;
            store.config_mut().clear(key);
            store.save()?;
            println!(
                "[SUCCESS] {} has been successfully reset!",
                key.display_name()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::{config::ConfigStore, setting::SettingError};

    use super::{config_reset, config_set};

    fn store(name: &str) -> (PathBuf, ConfigStore) {
        let dir = std::env::temp_dir().join(format!(
            "snipe-yourself-commands-{}-{name}",
            std::process::id()
        ));
        let _ = fs_err::remove_dir_all(&dir);
        let path = dir.join("config.json");
        let store = ConfigStore::load(&path).unwrap();
        (dir, store)
    }

    #[test]
    fn test_config_set_autocorrects() {
        let (dir, mut store) = store("set");
        config_set(&mut store, "Profile ID", "16009610").unwrap();
        config_set(&mut store, "clientid", "1234").unwrap();
        config_set(&mut store, "autocorrect confidence", "0.75").unwrap();
        let config = ConfigStore::load(store.path()).unwrap().config().clone();
        assert_eq!(config.profile_id.map(u64::from), Some(16009610));
        assert_eq!(config.client_id.map(u64::from), Some(1234));
        assert_eq!(config.autocorrect_confidence(), 0.75);
        fs_err::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_config_set_rejects_input() {
        let (_, mut store) = store("reject");
        let e = config_set(&mut store, "zzz", "1").unwrap_err();
        assert!(matches!(
            e.downcast_ref::<SettingError>(),
            Some(SettingError::Unresolved { .. })
        ));
        let e = config_set(&mut store, "profile_id", "peppy").unwrap_err();
        assert!(matches!(
            e.downcast_ref::<SettingError>(),
            Some(SettingError::InvalidValue { .. })
        ));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_config_reset() {
        let (dir, mut store) = store("reset");
        config_set(&mut store, "client_id", "1234").unwrap();
        config_set(&mut store, "profile_id", "2").unwrap();

        config_reset(&mut store, Some("client id")).unwrap();
        assert_eq!(store.config().client_id, None);
        assert!(store.config().profile_id.is_some());

        config_reset(&mut store, None).unwrap();
        let config = ConfigStore::load(store.path()).unwrap().config().clone();
        assert_eq!(config, Default::default());
        fs_err::remove_dir_all(&dir).unwrap();
    }
}
