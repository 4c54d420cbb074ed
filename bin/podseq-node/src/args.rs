//! CLI argument parsing and environment variable handling.

use std::{env, path::PathBuf};

use argh::FromArgs;

use crate::errors::InitError;

/// Configs overridable by environment. Mostly endpoints that differ per deployment.
#[derive(Debug, Clone, Default)]
pub(crate) struct EnvArgs {
    pub datadir: Option<String>,
    pub exec_rpc: Option<String>,
    pub da_rpc: Option<String>,
    pub settlement_rpc: Option<String>,
    pub otlp_url: Option<String>,
    pub service_label: Option<String>,
}

impl EnvArgs {
    pub(crate) fn from_env() -> Self {
        Self {
            datadir: env::var("PODSEQ_DATADIR").ok(),
            exec_rpc: env::var("PODSEQ_EXEC_RPC").ok(),
            da_rpc: env::var("PODSEQ_DA_RPC").ok(),
            settlement_rpc: env::var("PODSEQ_SETTLEMENT_RPC").ok(),
            otlp_url: env::var("PODSEQ_OTLP_URL").ok(),
            service_label: env::var("PODSEQ_SVC_LABEL").ok(),
        }
    }

    /// Get strings of overrides gathered from env.
    pub(crate) fn get_overrides(&self) -> Vec<String> {
        let pairs = [
            ("client.datadir", &self.datadir),
            ("exec.rpc_url", &self.exec_rpc),
            ("da.url", &self.da_rpc),
            ("settlement.url", &self.settlement_rpc),
            ("logging.otlp_url", &self.otlp_url),
            ("logging.service_label", &self.service_label),
        ];
        pairs
            .into_iter()
            .filter_map(|(path, val)| val.as_ref().map(|v| format!("{path}={v}")))
            .collect()
    }
}

#[derive(Clone, Debug, FromArgs)]
#[argh(description = "Pod sequencer node")]
pub(crate) struct Args {
    // Config non-overriding args
    #[argh(
        option,
        short = 'c',
        description = "path to configuration, defaults apply when omitted"
    )]
    pub config: Option<PathBuf>,

    // Config overriding args
    /// Data directory path that will override the path in the config toml.
    #[argh(option, short = 'd', description = "datadir path for databases and keys")]
    pub datadir: Option<PathBuf>,

    /// Other generic overrides to the config toml.
    /// Will be used, for example, as `-o pipeline.da_retry_ms=1000 -o exec.rpc_url=http://reth`
    #[argh(option, short = 'o', description = "generic config overrides")]
    pub overrides: Vec<String>,
}

impl Args {
    /// Get strings of overrides gathered from user and internal attributes.
    pub(crate) fn get_all_overrides(&self) -> Result<Vec<String>, InitError> {
        let mut overrides = self.overrides.clone();
        if let Some(datadir) = &self.datadir {
            let dd = datadir
                .to_str()
                .ok_or_else(|| InitError::InvalidDatadirPath(datadir.clone()))?;
            overrides.push(format!("client.datadir={dd}"));
        }
        Ok(overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_overrides_skip_unset() {
        let env_args = EnvArgs {
            exec_rpc: Some("http://reth:8545".into()),
            service_label: Some("east".into()),
            ..Default::default()
        };
        assert_eq!(
            env_args.get_overrides(),
            vec![
                "exec.rpc_url=http://reth:8545".to_string(),
                "logging.service_label=east".to_string(),
            ]
        );
    }

    #[test]
    fn test_datadir_arg_becomes_override() {
        let args = Args {
            config: None,
            datadir: Some(PathBuf::from("/var/podseq")),
            overrides: vec!["pipeline.da_retry_ms=10".into()],
        };
        assert_eq!(
            args.get_all_overrides().unwrap(),
            vec![
                "pipeline.da_retry_ms=10".to_string(),
                "client.datadir=/var/podseq".to_string(),
            ]
        );
    }
}
