use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::app::error::{GondolaError, Result};
use crate::config::Config;
use crate::store::SqliteStore;

pub struct AppContext {
    pub store: Arc<SqliteStore>,
    pub config: Config,
    /// Serializes crawls. The browser page is a scoped, exclusive resource;
    /// two crawls must never drive one concurrently.
    pub crawl_guard: Arc<Mutex<()>>,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let db_path = match config.db_path.clone() {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        let store = Arc::new(SqliteStore::new(&db_path)?);

        Ok(Self {
            store,
            config,
            crawl_guard: Arc::new(Mutex::new(())),
        })
    }

    pub fn in_memory(config: Config) -> Result<Self> {
        Ok(Self {
            store: Arc::new(SqliteStore::in_memory()?),
            config,
            crawl_guard: Arc::new(Mutex::new(())),
        })
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| GondolaError::Config("Could not find data directory".into()))?;
        let gondola_dir = data_dir.join("gondola");
        std::fs::create_dir_all(&gondola_dir)?;
        Ok(gondola_dir.join("gondola.db"))
    }
}
