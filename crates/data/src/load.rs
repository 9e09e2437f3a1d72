use crate::schema::{BotConfig, SourceRow, SourceTable};
use anyhow::{bail, Context};
use chihiro_core::{Card, Pool, PoolEntry, RateField, Rarity};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const BASE_MASS_TOLERANCE: f64 = 1e-3;

pub fn load_bot_config(path: &Path) -> anyhow::Result<BotConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "config missing, using defaults");
        return Ok(BotConfig::default());
    }
    load_json(path)
}

pub fn load_source_table(path: &Path) -> anyhow::Result<SourceTable> {
    let table: SourceTable = load_json(path)?;
    if table.rows.is_empty() {
        bail!("{} has no rows", path.display());
    }
    Ok(table)
}

/// Romanized name -> display name. Unknown names pass through.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    names: HashMap<String, String>,
}

impl NameTable {
    pub fn from_map(names: HashMap<String, String>) -> Self {
        Self { names }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let names: HashMap<String, String> = load_json(path)?;
        Ok(Self { names })
    }

    pub fn translate(&self, name: &str) -> String {
        self.names
            .get(name.trim())
            .cloned()
            .unwrap_or_else(|| name.trim().to_string())
    }
}

/// New cards sit on top of the table: every SSR/SR before the first R is
/// a pickup, nothing after it is.
pub fn resolve_pickups(rows: &[SourceRow]) -> Vec<bool> {
    let mut open = true;
    rows.iter()
        .map(|row| {
            if row.rarity == Rarity::R {
                open = false;
            }
            open && row.rarity.is_rare()
        })
        .collect()
}

pub fn build_pool(pool_id: u32, table: &SourceTable, names: &NameTable) -> Pool {
    let pickups = resolve_pickups(&table.rows);
    let entries: Vec<PoolEntry> = table
        .rows
        .iter()
        .zip(pickups)
        .map(|(row, pickup)| PoolEntry {
            card: Card {
                name: names.translate(&row.name),
                tag: row.tag.as_deref().map(bracket_tag),
                rarity: row.rarity,
                limited: row.limited,
            },
            base_rate: row.rate / 100.0,
            special_rate: 0.0,
            pickup,
        })
        .collect();
    let pool = Pool::new(pool_id, table.name.clone(), entries);
    let mass = pool.total_rate(RateField::Base);
    if (mass - 1.0).abs() > BASE_MASS_TOLERANCE {
        warn!(pool = pool_id, mass, "base rates do not sum to one");
    }
    pool
}

fn bracket_tag(tag: &str) -> String {
    let tag = tag.trim();
    if tag.starts_with('[') && tag.ends_with(']') {
        tag.to_string()
    } else {
        format!("[{}]", tag)
    }
}

pub(crate) fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}
