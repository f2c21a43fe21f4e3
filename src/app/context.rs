use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{Result, RunnelError};
use crate::config::Config;
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::Fetcher;
use crate::parser::{IdentifierCache, Parser};
use crate::updater::parallel::ParallelUpdater;
use crate::updater::Updater;

pub struct AppContext {
    pub config: Config,
    pub updater: Arc<Updater>,
    pub parallel_updater: ParallelUpdater,
    pub store_path: PathBuf,
}

impl AppContext {
    /// Wire an HTTP fetcher and the process-wide identifier cache.
    pub fn new(config: Config, store_path: Option<PathBuf>) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(&config.fetch)?);
        Self::with_fetcher(config, store_path, fetcher)
    }

    pub fn with_fetcher(
        config: Config,
        store_path: Option<PathBuf>,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
    ) -> Result<Self> {
        let store_path = match store_path {
            Some(p) => p,
            None => Self::default_store_path()?,
        };

        let cache = IdentifierCache::global();
        cache.set_enabled(config.parser.cache_item_ids);

        let parser = Parser::with_cache(cache).default_refresh(config.parser.default_refresh());
        let updater = Arc::new(Updater::new(fetcher, parser).stale_after(config.update.stale_after()));
        let parallel_updater = ParallelUpdater::with_workers(updater.clone(), config.update.workers);

        Ok(Self {
            config,
            updater,
            parallel_updater,
            store_path,
        })
    }

    fn default_store_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir().ok_or_else(|| {
            RunnelError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not find data directory",
            ))
        })?;
        Ok(data_dir.join("runnel").join("state.json"))
    }
}
