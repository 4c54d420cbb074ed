use std::{fs, path::Path, sync::Arc};

use anyhow::Context;
use typed_sled::SledDb;

use crate::{ChainDBSled, PodDBSled, SledDbConfig};

/// Directory name of the node's database under `<datadir>/sled`.
pub const DB_NAME: &str = "podseq";

/// Opens a sled instance at `<datadir>/sled/<dbname>`, creating the directory if needed.
pub fn open_sled_database(datadir: &Path, dbname: &'static str) -> anyhow::Result<Arc<SledDb>> {
    let database_dir = datadir.join("sled").join(dbname);

    if !database_dir.exists() {
        fs::create_dir_all(&database_dir)?;
    }

    let sled_db = sled::open(&database_dir).context("opening sled database")?;

    let typed_sled = SledDb::new(sled_db)
        .map_err(|e| anyhow::anyhow!("failed to create typed sled db: {e}"))?;
    Ok(Arc::new(typed_sled))
}

/// Both stores, opened over one sled instance.
#[derive(Debug, Clone)]
pub struct Databases {
    pub chain: Arc<ChainDBSled>,
    pub pod: Arc<PodDBSled>,
}

impl Databases {
    pub fn new(sled_db: Arc<SledDb>, config: SledDbConfig) -> anyhow::Result<Self> {
        let chain = ChainDBSled::new(sled_db.clone(), config.clone())
            .context("creating chain database")?;
        let pod = PodDBSled::new(sled_db, config).context("creating pod database")?;
        Ok(Self {
            chain: Arc::new(chain),
            pod: Arc::new(pod),
        })
    }

    pub fn open(datadir: &Path, config: SledDbConfig) -> anyhow::Result<Self> {
        let sled_db = open_sled_database(datadir, DB_NAME)?;
        Self::new(sled_db, config)
    }
}
