//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::{AppConfig, ToolsConfig};
use crate::domain::discovery::DiscoveryMode;
use crate::domain::duration::Duration;
use crate::domain::error::ConfigError;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    ensure_known_key(key)?;
    validate_config_value(key, value)?;

    let mut config = store.load().await?;
    apply_value(&mut config, key, value)?;

    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));

    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    ensure_known_key(key)?;

    let config = store.load().await?;
    match read_value(&config, key) {
        Some(v) => presenter.output(&v),
        None => presenter.output(NOT_SET),
    }

    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        let value = read_value(&config, key);
        presenter.key_value(key, value.as_deref().unwrap_or(NOT_SET));
    }

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn ensure_known_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(ConfigError::ValidationError {
        key: key.to_string(),
        message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    })
}

fn apply_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "bind" => config.bind = Some(value.to_string()),
        "scan_duration" => config.scan_duration = Some(value.to_string()),
        "settle_delay" => config.settle_delay = Some(value.to_string()),
        "discovery_mode" => config.discovery_mode = Some(value.to_lowercase()),
        "remember_last_device" => config.remember_last_device = Some(parse_bool_for(key, value)?),
        "tools.pactl" => {
            config.tools.get_or_insert_with(ToolsConfig::default).pactl = Some(value.to_string())
        }
        "tools.bluetoothctl" => {
            config.tools.get_or_insert_with(ToolsConfig::default).bluetoothctl =
                Some(value.to_string())
        }
        _ => return Err(unknown_key(key)),
    }
    Ok(())
}

fn read_value(config: &AppConfig, key: &str) -> Option<String> {
    match key {
        "bind" => config.bind.clone(),
        "scan_duration" => config.scan_duration.clone(),
        "settle_delay" => config.settle_delay.clone(),
        "discovery_mode" => config.discovery_mode.clone(),
        "remember_last_device" => config.remember_last_device.map(|b| b.to_string()),
        "tools.pactl" => config.tools.as_ref().and_then(|t| t.pactl.clone()),
        "tools.bluetoothctl" => config.tools.as_ref().and_then(|t| t.bluetoothctl.clone()),
        _ => None,
    }
}

fn unknown_key(key: &str) -> ConfigError {
    ConfigError::ValidationError {
        key: key.to_string(),
        message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    }
}

/// Validate a config value based on key type
fn validate_config_value(key: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::ValidationError {
        key: key.to_string(),
        message,
    };

    match key {
        "bind" => {
            value
                .parse::<std::net::SocketAddr>()
                .map_err(|e| invalid(format!("Expected host:port ({e})")))?;
        }
        "scan_duration" => {
            let duration = value
                .parse::<Duration>()
                .map_err(|e| invalid(e.to_string()))?;
            if duration > Duration::max_scan_duration() {
                return Err(invalid(format!(
                    "Scan duration may not exceed {}",
                    Duration::max_scan_duration()
                )));
            }
        }
        "settle_delay" => {
            value
                .parse::<Duration>()
                .map_err(|e| invalid(e.to_string()))?;
        }
        "discovery_mode" => {
            value
                .parse::<DiscoveryMode>()
                .map_err(|e| invalid(e.to_string()))?;
        }
        "remember_last_device" => {
            parse_bool_for(key, value)?;
        }
        "tools.pactl" | "tools.bluetoothctl" => {
            if value.trim().is_empty() {
                return Err(invalid("Value may not be empty".to_string()));
            }
        }
        _ => return Err(unknown_key(key)),
    }
    Ok(())
}

fn parse_bool_for(key: &str, value: &str) -> Result<bool, ConfigError> {
    parse_bool(value).ok_or_else(|| ConfigError::ValidationError {
        key: key.to_string(),
        message: "Value must be 'true' or 'false'".to_string(),
    })
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}
