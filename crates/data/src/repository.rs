use crate::cache::PoolCache;
use crate::load::{build_pool, load_source_table, NameTable};
use crate::schema::{BotConfig, SourceConfig, SourceTable};
use chihiro_core::{GachaError, Pool, PoolProvider};
use std::path::PathBuf;
use tracing::{info, warn};

/// An upstream that can describe a pool's rate table.
pub trait PoolSource {
    fn label(&self) -> &str;
    fn fetch(&self, pool_id: u32) -> anyhow::Result<SourceTable>;
}

/// Rate tables saved as `<dir>/<id>.json` snapshots.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    label: String,
    dir: PathBuf,
}

impl SnapshotSource {
    pub fn new(label: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            dir: dir.into(),
        }
    }

    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(config.label.clone(), config.dir.clone())
    }
}

impl PoolSource for SnapshotSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn fetch(&self, pool_id: u32) -> anyhow::Result<SourceTable> {
        load_source_table(&self.dir.join(format!("{}.json", pool_id)))
    }
}

pub struct PoolRepository {
    cache: PoolCache,
    sources: Vec<Box<dyn PoolSource>>,
    names: NameTable,
}

impl PoolRepository {
    pub fn new(cache: PoolCache, names: NameTable) -> Self {
        Self {
            cache,
            sources: Vec::new(),
            names,
        }
    }

    pub fn from_config(config: &BotConfig) -> anyhow::Result<Self> {
        let names = match &config.names_path {
            Some(path) => NameTable::load(path)?,
            None => NameTable::default(),
        };
        let mut repo = Self::new(PoolCache::new(&config.cache_dir), names);
        for source in &config.sources {
            repo.push_source(SnapshotSource::from_config(source));
        }
        Ok(repo)
    }

    /// Sources are tried in insertion order.
    pub fn push_source(&mut self, source: impl PoolSource + 'static) {
        self.sources.push(Box::new(source));
    }

    pub fn cache(&self) -> &PoolCache {
        &self.cache
    }

    fn fetch_remote(&self, pool_id: u32) -> Result<Pool, GachaError> {
        let mut reason = String::from("no sources configured");
        for source in &self.sources {
            match source.fetch(pool_id) {
                Ok(table) => {
                    info!(pool = pool_id, source = source.label(), "fetched pool");
                    return Ok(build_pool(pool_id, &table, &self.names));
                }
                Err(err) => {
                    warn!(pool = pool_id, source = source.label(), error = %err, "source failed");
                    reason = format!("{}: {:#}", source.label(), err);
                }
            }
        }
        Err(GachaError::PoolUnavailable {
            pool: pool_id,
            reason,
        })
    }
}

impl PoolProvider for PoolRepository {
    fn get_pool(&self, pool_id: u32) -> Result<Pool, GachaError> {
        match self.cache.load(pool_id) {
            Ok(Some(pool)) => {
                info!(pool = pool_id, "pool cache hit");
                return Ok(pool);
            }
            Ok(None) => info!(pool = pool_id, "pool cache miss"),
            Err(err) => warn!(pool = pool_id, error = %err, "unreadable cache entry, refetching"),
        }
        let pool = self.fetch_remote(pool_id)?;
        if let Err(err) = self.cache.store(&pool) {
            warn!(pool = pool_id, error = %err, "failed to write pool cache");
        }
        Ok(pool)
    }
}
