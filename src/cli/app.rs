//! Command runners

use std::env;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::application::ports::{ConfigStore, LastDeviceStore};
use crate::application::{BluetoothControlConfig, StepTimeouts};
use crate::domain::config::AppConfig;
use crate::domain::discovery::DiscoveryMode;
use crate::domain::duration::Duration;
use crate::domain::pairing::{PairingOutcome, PairingStatus};
use crate::infrastructure::{
    BluetoothctlGateway, FileLastDeviceStore, PactlAudioGateway, XdgConfigStore,
};
use crate::server::{self, AppState};

use super::args::{Commands, ServeArgs};
use super::client::{ClientError, ControlClient};
use super::presenter::Presenter;
use super::signals::ShutdownSignal;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Environment override for the listen address
pub const BIND_ENV: &str = "AUDIO_CONTROL_BIND";

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %store.path().display(), error = %e, "ignoring unreadable config file");
            AppConfig::empty()
        }
    };

    merge_config(file_config, env_config(), cli_config)
}

/// Merge: defaults < file < env < cli
pub fn merge_config(file: AppConfig, env: AppConfig, cli: AppConfig) -> AppConfig {
    AppConfig::defaults().merge(file).merge(env).merge(cli)
}

fn env_config() -> AppConfig {
    AppConfig {
        bind: env::var(BIND_ENV).ok().filter(|s| !s.is_empty()),
        ..Default::default()
    }
}

/// Options of `serve` as a config layer
pub fn serve_config(args: &ServeArgs) -> AppConfig {
    AppConfig {
        bind: args.bind.clone(),
        scan_duration: args.scan_duration.clone(),
        discovery_mode: args.discovery_mode.clone(),
        ..Default::default()
    }
}

/// Reject explicitly given values that would otherwise fall back to defaults
pub fn validate_serve_args(args: &ServeArgs) -> Result<(), String> {
    if let Some(bind) = &args.bind {
        bind.parse::<SocketAddr>()
            .map_err(|e| format!("Invalid bind address \"{bind}\": {e}"))?;
    }
    if let Some(duration) = &args.scan_duration {
        duration
            .parse::<Duration>()
            .map_err(|e| format!("Invalid scan duration: {e}"))?;
    }
    if let Some(mode) = &args.discovery_mode {
        mode.parse::<DiscoveryMode>().map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Run the HTTP service until SIGINT or SIGTERM
pub async fn run_serve(args: ServeArgs) -> ExitCode {
    let presenter = Presenter::new();

    if let Err(e) = validate_serve_args(&args) {
        presenter.error(&e);
        return ExitCode::from(EXIT_USAGE_ERROR);
    }

    let config = load_merged_config(serve_config(&args)).await;
    let bind = config.bind_or_default().to_string();

    let shutdown = match ShutdownSignal::install() {
        Ok(signal) => signal,
        Err(e) => {
            presenter.error(&format!("Failed to setup signal handler: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let listener = match TcpListener::bind(&bind).await {
        Ok(listener) => listener,
        Err(e) => {
            presenter.error(&format!("Failed to bind {}: {}", bind, e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let state = build_state(&config);
    info!(
        bind = %bind,
        scan_duration = %state.scan_duration,
        discovery_mode = %config.discovery_mode_or_default(),
        pactl = config.pactl_or_default(),
        bluetoothctl = config.bluetoothctl_or_default(),
        "starting audio-control"
    );
    presenter.success(&format!("Listening on http://{}", bind));

    match server::serve(listener, state, shutdown.wait()).await {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            presenter.error(&format!("Server error: {}", e));
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Wire the production adapters into the use cases
pub fn build_state(config: &AppConfig) -> AppState {
    let audio = Arc::new(PactlAudioGateway::with_program(config.pactl_or_default()));
    let bluetooth = Arc::new(BluetoothctlGateway::with_program(
        config.bluetoothctl_or_default(),
    ));
    let store: Box<dyn LastDeviceStore> = Box::new(FileLastDeviceStore::new());

    let control = BluetoothControlConfig {
        settle_delay: config.settle_delay_or_default(),
        remember_last_device: config.remember_last_device_or_default(),
        discovery_mode: config.discovery_mode_or_default(),
        timeouts: StepTimeouts::default(),
    };

    AppState::new(
        audio,
        bluetooth,
        store,
        control,
        config.scan_duration_or_default(),
    )
}

/// Run one of the client subcommands against a running service
pub async fn run_client(url: &str, command: Commands) -> ExitCode {
    let mut presenter = Presenter::new();
    let client = ControlClient::new(url);

    let result = match command {
        Commands::Devices => client.devices().await.map(|devices| {
            presenter.devices(&devices);
            EXIT_SUCCESS
        }),
        Commands::Active => client.active().await.map(|device| {
            presenter.devices(std::slice::from_ref(&device));
            EXIT_SUCCESS
        }),
        Commands::Volume { percent, device } => client
            .set_volume(percent, device.as_deref())
            .await
            .map(|change| {
                presenter.success(&format!("Volume set to {}%", change.volume));
                EXIT_SUCCESS
            }),
        Commands::Select { id } => client.select(&id).await.map(|selected| {
            presenter.success(&format!(
                "Default output set to {} ({} streams moved)",
                id, selected.moved
            ));
            EXIT_SUCCESS
        }),
        Commands::Scan { duration } => {
            let duration = match duration.map(|d| d.parse::<Duration>()).transpose() {
                Ok(duration) => duration,
                Err(e) => {
                    presenter.error(&format!("Invalid duration: {}", e));
                    return ExitCode::from(EXIT_USAGE_ERROR);
                }
            };
            presenter.start_spinner("Scanning for Bluetooth devices...");
            match client.scan(duration).await {
                Ok(devices) => {
                    presenter.spinner_success(&format!("Found {} devices", devices.len()));
                    presenter.bluetooth_devices(&devices);
                    Ok(EXIT_SUCCESS)
                }
                Err(e) => {
                    presenter.spinner_fail("Scan failed");
                    Err(e)
                }
            }
        }
        Commands::Pair(target) => {
            presenter.start_spinner(&format!("Pairing {}...", target.mac));
            let result = client.pair(&target.mac, &target.name).await;
            finish_pairing(&mut presenter, result)
        }
        Commands::Connect(target) => {
            presenter.start_spinner(&format!("Connecting {}...", target.mac));
            let result = client.connect(&target.mac, &target.name).await;
            finish_pairing(&mut presenter, result)
        }
        Commands::Reconnect => {
            presenter.start_spinner("Reconnecting last device...");
            let result = client.reconnect().await;
            finish_pairing(&mut presenter, result)
        }
        Commands::Serve(_) | Commands::Config { .. } => Ok(EXIT_USAGE_ERROR),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(client_exit_code(&e))
        }
    }
}

/// Render a pairing reply; a partial outcome arrives as HTTP 409
fn finish_pairing(
    presenter: &mut Presenter,
    result: Result<PairingOutcome, ClientError>,
) -> Result<u8, ClientError> {
    match result {
        Ok(outcome) => {
            presenter.spinner_success(&outcome.message);
            Ok(EXIT_SUCCESS)
        }
        Err(ClientError::Api {
            detail,
            pairing_status: Some(status),
            ..
        }) => {
            let status = if status == PairingStatus::Partial.as_str() {
                PairingStatus::Partial
            } else {
                PairingStatus::Error
            };
            presenter.spinner_fail(status.as_str());
            presenter.outcome(&PairingOutcome {
                status,
                message: detail,
                cause: None,
            });
            Ok(EXIT_ERROR)
        }
        Err(e) => {
            presenter.spinner_fail("Request failed");
            Err(e)
        }
    }
}

/// Bad input rejected by the service is a usage error
pub fn client_exit_code(error: &ClientError) -> u8 {
    match error.status() {
        Some(400) => EXIT_USAGE_ERROR,
        _ => EXIT_ERROR,
    }
}
