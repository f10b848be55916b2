use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::core::errors::{WishlistError, WishlistResult};

const CONFIG_DIR: &str = ".config/wishlist";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub backend: String,
    pub database_url: String,
}

pub fn cli_flag_present(args: &[String], flag: &str) -> bool {
    args.iter()
        .any(|arg| arg == flag || arg.starts_with(&format!("{flag}=")))
}

pub fn load() -> WishlistResult<Option<RuntimeConfig>> {
    load_from(&config_file_path()?)
}

pub fn save(config: &RuntimeConfig) -> WishlistResult<()> {
    save_to(&config_file_path()?, config)
}

fn load_from(path: &Path) -> WishlistResult<Option<RuntimeConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|_| WishlistError::Config("failed to read runtime config".to_owned()))?;
    let config = serde_json::from_str::<RuntimeConfig>(&content)
        .map_err(|_| WishlistError::Config("invalid runtime config format".to_owned()))?;
    Ok(Some(config))
}

fn save_to(path: &Path, config: &RuntimeConfig) -> WishlistResult<()> {
    let Some(parent) = path.parent() else {
        return Err(WishlistError::Config(
            "invalid runtime config path".to_owned(),
        ));
    };

    fs::create_dir_all(parent)
        .map_err(|_| WishlistError::Config("failed to create config directory".to_owned()))?;
    let serialized = serde_json::to_string_pretty(config)
        .map_err(|_| WishlistError::Config("failed to serialize runtime config".to_owned()))?;
    fs::write(path, serialized)
        .map_err(|_| WishlistError::Config("failed to persist runtime config".to_owned()))?;
    Ok(())
}

fn config_file_path() -> WishlistResult<PathBuf> {
    if let Ok(path) = env::var("WISHLIST_CONFIG_PATH") {
        return Ok(PathBuf::from(path));
    }

    let home = env::var("HOME")
        .map_err(|_| WishlistError::Config("HOME environment variable is not set".to_owned()))?;
    Ok(PathBuf::from(home).join(CONFIG_DIR).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{RuntimeConfig, cli_flag_present, load_from, save_to};

    #[test]
    fn detects_flags_with_and_without_values() {
        let args = vec![
            "wishlist".to_owned(),
            "--backend=mongo".to_owned(),
            "list".to_owned(),
        ];
        assert!(cli_flag_present(&args, "--backend"));
        assert!(!cli_flag_present(&args, "--database-url"));
    }

    #[test]
    fn config_round_trips_through_file() {
        let path = std::env::temp_dir()
            .join(format!("wishlist-config-{}", uuid::Uuid::new_v4().simple()))
            .join("config.json");
        let config = RuntimeConfig {
            backend: "postgres".to_owned(),
            database_url: "postgres://localhost/wishlist".to_owned(),
        };

        save_to(&path, &config).expect("save");
        let loaded = load_from(&path).expect("load");
        assert_eq!(loaded, Some(config));

        let _ = std::fs::remove_dir_all(path.parent().map(PathBuf::from).unwrap_or_default());
    }

    #[test]
    fn missing_config_is_none() {
        let path = std::env::temp_dir().join("wishlist-config-does-not-exist.json");
        assert_eq!(load_from(&path).expect("load"), None);
    }
}
