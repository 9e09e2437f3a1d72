use crate::load::load_json;
use crate::schema::{CachedPool, CACHE_SCHEMA_VERSION};
use anyhow::{bail, Context};
use chihiro_core::Pool;
use std::fs;
use std::path::PathBuf;

/// Pools persisted as `<dir>/<id>.json`. Written once per id, read after.
#[derive(Debug, Clone)]
pub struct PoolCache {
    dir: PathBuf,
}

impl PoolCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, pool_id: u32) -> PathBuf {
        self.dir.join(format!("{}.json", pool_id))
    }

    pub fn contains(&self, pool_id: u32) -> bool {
        self.path_for(pool_id).is_file()
    }

    pub fn load(&self, pool_id: u32) -> anyhow::Result<Option<Pool>> {
        let path = self.path_for(pool_id);
        if !path.is_file() {
            return Ok(None);
        }
        let cached: CachedPool = load_json(&path)?;
        if cached.version != CACHE_SCHEMA_VERSION {
            bail!(
                "unsupported cache version {} in {} (expected {})",
                cached.version,
                path.display(),
                CACHE_SCHEMA_VERSION
            );
        }
        if cached.id != pool_id {
            bail!("{} holds pool {}, not {}", path.display(), cached.id, pool_id);
        }
        Ok(Some(cached.into_pool()))
    }

    pub fn store(&self, pool: &Pool) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create {}", self.dir.display()))?;
        let path = self.path_for(pool.id);
        let body = serde_json::to_string_pretty(&CachedPool::from_pool(pool))?;
        fs::write(&path, body).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }
}
