use std::sync::Arc;

use typed_sled::SledDb;

use crate::{Databases, SledDbConfig};

/// Opens a throwaway sled instance that is removed on drop.
pub fn get_test_sled_db() -> Arc<SledDb> {
    let db = sled::Config::new()
        .temporary(true)
        .open()
        .expect("open temporary sled");
    Arc::new(SledDb::new(db).expect("wrap temporary sled"))
}

pub fn get_test_databases() -> Databases {
    Databases::new(get_test_sled_db(), SledDbConfig::test()).expect("open test databases")
}
