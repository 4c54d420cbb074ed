//! Node configuration: TOML file, dotted-path overrides and the station's chain info.

use std::{
    fs,
    path::{Path, PathBuf},
};

use format_serde_error::SerdeError;
use podseq_chain::{IngestConfig, DEFAULT_RPC_URL};
use podseq_da::{DEFAULT_CLIENT_NAME, DEFAULT_DA_URL};
use podseq_pipeline::PipelineConfig;
use podseq_settlement::{StationParams, DEFAULT_SETTLEMENT_URL};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use toml::{value::Table, Value};

use crate::errors::{ConfigError, InitError};

const DEFAULT_DATADIR: &str = "podseq-data";

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ClientConfig {
    #[serde(default = "default_datadir")]
    pub datadir: PathBuf,
}

fn default_datadir() -> PathBuf {
    PathBuf::from(DEFAULT_DATADIR)
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            datadir: default_datadir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ExecConfig {
    #[serde(default = "default_exec_rpc_url")]
    pub rpc_url: String,

    #[serde(flatten)]
    pub ingest: IngestConfig,
}

fn default_exec_rpc_url() -> String {
    DEFAULT_RPC_URL.to_owned()
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_exec_rpc_url(),
            ingest: IngestConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DaConfig {
    #[serde(default = "default_da_url")]
    pub url: String,

    #[serde(default = "default_da_client_name")]
    pub client_name: String,
}

fn default_da_url() -> String {
    DEFAULT_DA_URL.to_owned()
}

fn default_da_client_name() -> String {
    DEFAULT_CLIENT_NAME.to_owned()
}

impl Default for DaConfig {
    fn default() -> Self {
        Self {
            url: default_da_url(),
            client_name: default_da_client_name(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SettlementConfig {
    #[serde(default = "default_settlement_url")]
    pub url: String,

    /// JSON file describing the station. Replaces the `[chain_info]` table when set.
    #[serde(default)]
    pub chain_info_path: Option<PathBuf>,

    /// Station id to use if the settlement layer already knows this station.
    #[serde(default)]
    pub station_id: Option<String>,
}

fn default_settlement_url() -> String {
    DEFAULT_SETTLEMENT_URL.to_owned()
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            url: default_settlement_url(),
            chain_info_path: None,
            station_id: None,
        }
    }
}

/// Logging configuration for the node.
#[derive(Debug, Clone, Deserialize, Default)]
pub(crate) struct LoggingConfig {
    /// Service label to append to the service name (e.g., "prod", "dev").
    pub service_label: Option<String>,

    /// OpenTelemetry OTLP endpoint URL for distributed tracing.
    pub otlp_url: Option<String>,

    /// Directory path for file-based logging.
    pub log_dir: Option<PathBuf>,

    /// Prefix for log file names (defaults to "podseq" if not set).
    pub log_file_prefix: Option<String>,

    /// Use JSON format for logs instead of compact format.
    pub json_format: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Config {
    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub exec: ExecConfig,

    #[serde(default)]
    pub da: DaConfig,

    #[serde(default)]
    pub settlement: SettlementConfig,

    /// Free-form station description sent on registration.
    #[serde(default = "empty_object")]
    pub chain_info: JsonValue,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn empty_object() -> JsonValue {
    JsonValue::Object(Default::default())
}

impl Config {
    /// Resolves the station description and pairs it with the verifying key.
    pub(crate) fn station_params(
        &self,
        verification_key: Vec<u8>,
    ) -> Result<StationParams, InitError> {
        let chain_info = match &self.settlement.chain_info_path {
            Some(path) => load_chain_info(path)?,
            None => self.chain_info.clone(),
        };
        let params = StationParams {
            verification_key,
            chain_info,
            station_id: self.settlement.station_id.clone(),
        };
        if params.moniker().is_empty() {
            return Err(ConfigError::MissingKey("chain_info.moniker".to_owned()).into());
        }
        Ok(params)
    }
}

/// Reads the config file if given, applies overrides in order and deserializes the result.
pub(crate) fn load_config(path: Option<&Path>, overrides: &[String]) -> Result<Config, InitError> {
    let mut config_toml = match path {
        Some(path) => load_config_from_path(path)?,
        None => Value::Table(Table::new()),
    };

    let overrides = overrides
        .iter()
        .map(|o| parse_override(o))
        .collect::<Result<Vec<_>, ConfigError>>()?;

    let table = config_toml
        .as_table_mut()
        .ok_or(ConfigError::TraverseNonTableAt {
            key: "<root>".to_string(),
            path: "".to_string(),
        })?;

    for (path, val) in overrides {
        apply_override(&path, val, table)?;
    }

    Ok(config_toml.try_into::<Config>()?)
}

fn load_config_from_path(path: &Path) -> Result<Value, InitError> {
    let config_str = fs::read_to_string(path)?;
    Ok(toml::from_str(&config_str)?)
}

fn load_chain_info(path: &Path) -> Result<JsonValue, InitError> {
    let json = fs::read_to_string(path)?;
    let chain_info =
        serde_json::from_str::<JsonValue>(&json).map_err(|err| SerdeError::new(json, err))?;
    Ok(chain_info)
}

/// Splits `a.b.c=value` into its key path and a TOML value.
///
/// The value is read as a TOML literal when it parses as one and kept as a string otherwise.
fn parse_override(s: &str) -> Result<(Vec<String>, Value), ConfigError> {
    let (path, raw) = s
        .split_once('=')
        .ok_or_else(|| ConfigError::InvalidOverride(s.to_owned()))?;
    let path = path.trim();
    if path.is_empty() || path.split('.').any(str::is_empty) {
        return Err(ConfigError::InvalidOverride(s.to_owned()));
    }

    let raw = raw.trim();
    let value = toml::from_str::<Table>(&format!("v = {raw}"))
        .ok()
        .and_then(|mut t| t.remove("v"))
        .unwrap_or_else(|| Value::String(raw.to_owned()));

    Ok((path.split('.').map(str::to_owned).collect(), value))
}

/// Sets `val` at `path`, creating intermediate tables as needed.
///
/// A string already at `path` stays a string, so `-o client.datadir=123` keeps its type.
fn apply_override(path: &[String], val: Value, table: &mut Table) -> Result<(), ConfigError> {
    let (key, rest) = path
        .split_first()
        .ok_or_else(|| ConfigError::MissingKey("<empty>".to_owned()))?;

    if rest.is_empty() {
        let val = match (table.get(key), val) {
            (Some(Value::String(_)), val @ Value::String(_)) => val,
            (Some(Value::String(_)), other) => Value::String(literal(&other)),
            (_, val) => val,
        };
        table.insert(key.clone(), val);
        return Ok(());
    }

    let entry = table
        .entry(key.clone())
        .or_insert_with(|| Value::Table(Table::new()));
    match entry {
        Value::Table(inner) => apply_override(rest, val, inner),
        _ => Err(ConfigError::TraverseNonTableAt {
            key: key.clone(),
            path: path.join("."),
        }),
    }
}

fn literal(val: &Value) -> String {
    match val {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = load_config(None, &[]).unwrap();
        assert_eq!(config.client.datadir, PathBuf::from("podseq-data"));
        assert_eq!(config.exec.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(config.exec.ingest, IngestConfig::default());
        assert_eq!(config.da.client_name, "celestia");
        assert_eq!(config.settlement.url, DEFAULT_SETTLEMENT_URL);
        assert_eq!(config.pipeline, PipelineConfig::default());
    }

    #[test]
    fn test_file_and_overrides() {
        let file = write_temp(
            r#"
            [exec]
            rpc_url = "http://reth:8545"
            block_delay_ms = 200

            [pipeline]
            da_retry_ms = 100

            [chain_info]
            moniker = "alpha"
            chainType = "evm"
            "#,
        );
        let overrides = vec![
            "pipeline.settlement_max_attempts=3".to_string(),
            "da.url=http://celestia:5050".to_string(),
        ];
        let config = load_config(Some(file.path()), &overrides).unwrap();

        assert_eq!(config.exec.rpc_url, "http://reth:8545");
        assert_eq!(config.exec.ingest.block_delay_ms, 200);
        assert_eq!(config.pipeline.da_retry_ms, 100);
        assert_eq!(config.pipeline.settlement_max_attempts, Some(3));
        assert_eq!(config.da.url, "http://celestia:5050");
        assert_eq!(config.chain_info["moniker"], "alpha");
    }

    #[test]
    fn test_string_override_keeps_type() {
        let file = write_temp("[client]\ndatadir = \"data\"\n");
        let config = load_config(Some(file.path()), &["client.datadir=123".to_string()]).unwrap();
        assert_eq!(config.client.datadir, PathBuf::from("123"));
    }

    #[test]
    fn test_parse_override() {
        let (path, val) = parse_override("pipeline.record_wait_ms=250").unwrap();
        assert_eq!(path, vec!["pipeline", "record_wait_ms"]);
        assert_eq!(val, Value::Integer(250));

        let (_, val) = parse_override("exec.rpc_url=http://x:1").unwrap();
        assert_eq!(val, Value::String("http://x:1".into()));

        assert!(parse_override("no-equals-sign").is_err());
        assert!(parse_override("a..b=1").is_err());
    }

    #[test]
    fn test_override_into_primitive_fails() {
        let mut table = Table::new();
        table.insert("client".into(), Value::Integer(1));
        let err = apply_override(
            &["client".to_string(), "datadir".to_string()],
            Value::String("x".into()),
            &mut table,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::TraverseNonTableAt { .. }));
    }

    #[test]
    fn test_chain_info_file_replaces_table() {
        let info = write_temp(r#"{"moniker": "beta", "rpc": "http://beta"}"#);
        let mut config = load_config(None, &[]).unwrap();
        config.settlement.chain_info_path = Some(info.path().to_path_buf());

        let params = config.station_params(vec![1, 2]).unwrap();
        assert_eq!(params.moniker(), "beta");
        assert_eq!(params.chain_info["rpc"], "http://beta");
    }

    #[test]
    fn test_bad_chain_info_file() {
        let info = write_temp(r#"{"moniker": "#);
        let mut config = load_config(None, &[]).unwrap();
        config.settlement.chain_info_path = Some(info.path().to_path_buf());
        assert!(matches!(
            config.station_params(vec![]),
            Err(InitError::UnparsableChainInfo(_))
        ));
    }

    #[test]
    fn test_moniker_required() {
        let config = load_config(None, &[]).unwrap();
        assert!(matches!(
            config.station_params(vec![]),
            Err(InitError::MalformedConfig(ConfigError::MissingKey(_)))
        ));
    }
}
