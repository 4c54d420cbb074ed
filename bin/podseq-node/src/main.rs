//! Pod sequencer node.
//!
//! Ingests execution-layer transactions and runs them through the batch pipeline: pods of fixed
//! size are proven, published to DA and settled, one at a time.

mod args;
mod config;
mod errors;

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use args::{Args, EnvArgs};
use config::{load_config, Config};
use errors::InitError;
use podseq_chain::{ChainIngestor, ExecutionClient, RpcExecutionClient};
use podseq_common::{
    logging::{self, FileLoggingConfig, LoggerConfig},
    ShutdownFlag,
};
use podseq_da::{DaPublisher, HttpDaClient};
use podseq_db::{Databases, PodDatabase, SledDbConfig};
use podseq_pipeline::{BatchAssembler, PipelineDriver};
use podseq_prover::{KeyStore, NativeProver, ProverAdapter};
use podseq_settlement::{ensure_registered, HttpSettlementClient, Settlement};
use strata_tasks::TaskManager;
use tokio::runtime::{self, Handle};
use tracing::*;

const SHUTDOWN_TIMEOUT_MS: u64 = 5000;
const SERVICE_BASE_NAME: &str = "podseq";

fn main() -> Result<()> {
    let args: Args = argh::from_env();
    if let Err(e) = main_inner(args) {
        eprintln!("FATAL ERROR: {e:#}");

        return Err(e);
    }

    Ok(())
}

fn main_inner(args: Args) -> Result<()> {
    let config = get_config(&args)?;

    // Start runtime for async IO tasks.
    let runtime = runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("podseq-rt")
        .build()
        .map_err(InitError::RuntimeBuild)?;
    let handle = runtime.handle().clone();

    // Init the logging before we do anything else.
    init_logging(&handle, &config)?;

    let datadir = &config.client.datadir;
    let dbs = Databases::open(datadir, SledDbConfig::production())?;
    info!(datadir = %datadir.display(), "opened database");

    let keys = KeyStore::new(datadir);
    let vk = keys.ensure_keys()?;
    let station = config.station_params(vk.as_bytes().to_vec())?;

    let exec = Arc::new(RpcExecutionClient::try_new(&config.exec.rpc_url)?);
    let da_client = Arc::new(HttpDaClient::try_new(&config.da.url, &config.da.client_name)?);
    let settlement_client = Arc::new(HttpSettlementClient::try_new(&config.settlement.url)?);

    // Startup runs before signal listeners exist, so nothing triggers this flag.
    let startup = ShutdownFlag::new();
    let chain_info = handle.block_on(ensure_registered(
        settlement_client.as_ref(),
        &dbs.pod,
        &station,
        &config.pipeline.settlement_retry(),
        &startup,
    ))?;
    let chain_id = handle.block_on(exec.network_id())?.to_string();
    info!(station_id = %chain_info.chain_id, %chain_id, "station ready");

    dbs.pod.init_pipeline_state()?;
    let cursor = dbs.pod.check_consistency()?;
    info!(
        batch_count = cursor.batch_count,
        batch_start_index = cursor.batch_start_index,
        "pipeline state consistent"
    );

    let task_manager = TaskManager::new(handle.clone());
    let executor = task_manager.create_executor();

    let ingestor = ChainIngestor::new(exec.clone(), dbs.chain.clone(), config.exec.ingest);
    let ingest_rt = handle.clone();
    executor.spawn_critical("chain_ingestion", move |shutdown| {
        ingest_rt.block_on(ingestor.run(&shutdown))?;
        Ok(())
    });

    let pipeline = &config.pipeline;
    let driver = PipelineDriver::new(
        BatchAssembler::new(exec, dbs.chain.clone(), pipeline.record_wait()),
        ProverAdapter::new(Arc::new(NativeProver::new()), keys, dbs.pod.clone()),
        DaPublisher::new(da_client, dbs.pod.clone(), chain_id, pipeline.da_retry()),
        Settlement::new(settlement_client, dbs.pod.clone(), pipeline.settlement_retry()),
        dbs.pod.clone(),
    );
    let pipeline_rt = handle.clone();
    executor.spawn_critical("batch_pipeline", move |shutdown| {
        pipeline_rt.block_on(driver.run(&shutdown))?;
        Ok(())
    });

    task_manager.start_signal_listeners();
    let res = task_manager.monitor(Some(Duration::from_millis(SHUTDOWN_TIMEOUT_MS)));
    logging::finalize();
    res?;

    info!("exiting podseq");
    Ok(())
}

fn get_config(args: &Args) -> Result<Config, InitError> {
    let mut overrides = EnvArgs::from_env().get_overrides();
    overrides.extend_from_slice(&args.get_all_overrides()?);
    load_config(args.config.as_deref(), &overrides)
}

/// Sets up the logging system given a handle to a runtime context to possibly
/// start the OTLP output on.
fn init_logging(rt: &Handle, config: &Config) -> Result<(), InitError> {
    let lcfg = &config.logging;
    let service_name =
        logging::format_service_name(SERVICE_BASE_NAME, lcfg.service_label.as_deref());
    let json_format = lcfg.json_format.unwrap_or(false);

    let file_logging_config = lcfg.log_dir.as_ref().map(|dir| {
        let prefix = lcfg
            .log_file_prefix
            .clone()
            .unwrap_or_else(|| SERVICE_BASE_NAME.to_owned());
        FileLoggingConfig::new(dir.clone(), prefix).with_json_format(json_format)
    });

    let lconfig = LoggerConfig::new(service_name)
        .with_service_version(env!("CARGO_PKG_VERSION").to_owned())
        .with_json_logging(json_format)
        .with_otlp_url(lcfg.otlp_url.clone())
        .with_file_logging(file_logging_config.clone());

    {
        // OTLP export needs a runtime context.
        let _g = rt.enter();
        logging::init(lconfig)?;
    }

    if let Some(url) = &lcfg.otlp_url {
        info!(%url, "using OpenTelemetry tracing output");
    }
    if let Some(file_config) = &file_logging_config {
        info!(
            log_dir = %file_config.directory.display(),
            log_prefix = %file_config.file_name_prefix,
            "file logging enabled"
        );
    }
    Ok(())
}
