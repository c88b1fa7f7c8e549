use std::path::Path;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, Command};
use medassist_accounts::CredentialStore;
use medassist_catalog::Catalog;
use medassist_diagnosis::DiagnosisModel;
use medassist_rpc::{start_server, AppState};
use tracing::{info, warn, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

mod settings;
mod version;

use settings::AppConfig;
use version::{git_commit_hash, MEDASSIST_VERSION};

fn build_cli() -> Command {
    Command::new("medassist-node")
        .version(MEDASSIST_VERSION)
        .about("MedAssist healthcare chatbot API server")
        .disable_version_flag(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path"),
        )
        .arg(
            Arg::new("rpc-host")
                .long("rpc-host")
                .value_name("HOST")
                .help("Address to bind the HTTP API on"),
        )
        .arg(
            Arg::new("rpc-port")
                .long("rpc-port")
                .value_name("PORT")
                .value_parser(value_parser!(u16))
                .help("Port to bind the HTTP API on"),
        )
        .arg(
            Arg::new("catalog")
                .long("catalog")
                .value_name("FILE")
                .help("JSON disease table replacing the built-in one"),
        )
        .arg(
            Arg::new("model")
                .long("model")
                .value_name("FILE")
                .help("Frozen diagnosis model (active.json)"),
        )
        .arg(
            Arg::new("users")
                .long("users")
                .value_name("FILE")
                .help("Credential CSV file"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("Log format (pretty or json)"),
        )
        .arg(
            Arg::new("version_flag")
                .short('V')
                .long("version")
                .action(ArgAction::SetTrue)
                .help("Print detailed version information and exit"),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .action(ArgAction::SetTrue)
                .help("Load configuration and data files, then exit"),
        )
}

fn load_config_with_overrides(matches: &clap::ArgMatches) -> Result<AppConfig> {
    let config_path = matches.get_one::<String>("config").map(String::as_str);
    let mut config = AppConfig::load(config_path)?;
    apply_overrides(matches, &mut config);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(matches: &clap::ArgMatches, config: &mut AppConfig) {
    if let Some(rpc_host) = matches.get_one::<String>("rpc-host") {
        config.rpc_host = rpc_host.clone();
    }

    if let Some(rpc_port) = matches.get_one::<u16>("rpc-port") {
        config.rpc_port = *rpc_port;
    }

    if let Some(catalog) = matches.get_one::<String>("catalog") {
        config.catalog_path = Some(catalog.clone());
    }

    if let Some(model) = matches.get_one::<String>("model") {
        config.model_path = Some(model.clone());
    }

    if let Some(users) = matches.get_one::<String>("users") {
        config.users_path = users.clone();
    }

    if let Some(log_level) = matches.get_one::<String>("log-level") {
        config.log_level = log_level.clone();
    }

    if let Some(log_format) = matches.get_one::<String>("log-format") {
        config.log_format = log_format.clone();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    if matches.get_flag("version_flag") {
        println!(
            "MedAssist {} (commit {})",
            MEDASSIST_VERSION,
            git_commit_hash()
        );
        return Ok(());
    }

    let config = load_config_with_overrides(&matches)?;
    init_logging(&config)?;

    info!(
        "Starting MedAssist node {} (commit {})",
        MEDASSIST_VERSION,
        git_commit_hash()
    );
    if let Some(path) = &config.config_path {
        info!("Using configuration file {}", path.display());
    }

    let state = load_state(&config)?;

    if matches.get_flag("check") {
        println!("OK");
        return Ok(());
    }

    start_server(state, &config.rpc_addr()).await
}

fn load_state(config: &AppConfig) -> Result<AppState> {
    let catalog = match &config.catalog_path {
        Some(path) => Catalog::from_json_file(path)
            .with_context(|| format!("failed to load disease catalog from {path}"))?,
        None => {
            info!("Using built-in disease catalog");
            Catalog::builtin()
        }
    };

    let model = match config.resolved_model_path() {
        Some(path) => Some(
            DiagnosisModel::load(&path)
                .with_context(|| format!("failed to load diagnosis model from {}", path.display()))?,
        ),
        None => {
            warn!("No diagnosis model found; diagnosis sessions are disabled");
            None
        }
    };

    let accounts = CredentialStore::open(Path::new(&config.users_path))
        .with_context(|| format!("failed to open credential store {}", config.users_path))?;

    let state = AppState::new(catalog, model, accounts)?
        .with_allowed_origins(config.allowed_origins.clone());

    if let Some(hash) = &state.model_hash {
        info!("Diagnosis model hash {}", hash);
    }

    Ok(state)
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer(&config.log_format, std::io::stdout))
        .init();

    Ok(())
}

/// Line-per-event JSON for `json`, human-readable multi-line output
/// otherwise.
fn fmt_layer<S, W>(log_format: &str, writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    if log_format == "json" {
        Box::new(tracing_subscriber::fmt::layer().json().with_writer(writer))
    } else {
        Box::new(tracing_subscriber::fmt::layer().pretty().with_writer(writer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn cli_overrides_config_values() {
        let matches = build_cli().get_matches_from([
            "medassist-node",
            "--rpc-port",
            "9001",
            "--model",
            "custom/model.json",
            "--log-format",
            "json",
        ]);

        let mut config = AppConfig::default();
        apply_overrides(&matches, &mut config);

        assert_eq!(config.rpc_port, 9001);
        assert_eq!(config.model_path.as_deref(), Some("custom/model.json"));
        assert_eq!(config.log_format, "json");
        assert_eq!(config.rpc_host, "127.0.0.1");
    }

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn json_log_format_emits_json_lines() {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber =
            tracing_subscriber::registry().with(fmt_layer("json", move || writer.clone()));

        tracing::subscriber::with_default(subscriber, || {
            info!(port = 8000, "Listening");
        });

        let output = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        let line = output.lines().next().unwrap();
        let event: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(event["level"], "INFO");
        assert_eq!(event["fields"]["message"], "Listening");
        assert_eq!(event["fields"]["port"], 8000);
    }

    #[test]
    fn pretty_log_format_is_not_json() {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber =
            tracing_subscriber::registry().with(fmt_layer("pretty", move || writer.clone()));

        tracing::subscriber::with_default(subscriber, || {
            info!("Listening");
        });

        let output = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Listening"));
        assert!(serde_json::from_str::<serde_json::Value>(output.trim()).is_err());
    }

    #[test]
    fn load_state_without_model() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            model_path: None,
            users_path: dir.path().join("users.csv").display().to_string(),
            ..AppConfig::default()
        };

        let state = load_state(&config).unwrap();
        assert_eq!(state.catalog.len(), 4);
        assert!(state.accounts.lock().is_empty());
    }

    #[test]
    fn load_state_fails_on_missing_configured_model() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            model_path: Some(dir.path().join("missing.json").display().to_string()),
            users_path: dir.path().join("users.csv").display().to_string(),
            ..AppConfig::default()
        };

        assert!(load_state(&config).is_err());
    }
}
