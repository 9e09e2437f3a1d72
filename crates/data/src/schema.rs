use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use chihiro_core::{Card, Pool, PoolEntry, Rarity, RollConfig};

pub const CACHE_SCHEMA_VERSION: u32 = 1;

/// One row of an upstream gacha rate table, in page order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRow {
    #[serde(default)]
    pub limited: bool,
    pub rarity: Rarity,
    pub name: String,
    #[serde(default)]
    pub tag: Option<String>,
    /// Percent, as printed upstream (`0.75` means 0.75%).
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceTable {
    pub name: String,
    pub rows: Vec<SourceRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedCard {
    pub name: String,
    #[serde(default)]
    pub tag: Option<String>,
    pub rarity: Rarity,
    #[serde(default)]
    pub limited: bool,
    pub rate: f64,
    #[serde(default)]
    pub pickup: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedPool {
    pub version: u32,
    pub id: u32,
    pub name: String,
    pub cards: Vec<CachedCard>,
}

impl CachedPool {
    pub fn from_pool(pool: &Pool) -> Self {
        Self {
            version: CACHE_SCHEMA_VERSION,
            id: pool.id,
            name: pool.name.clone(),
            cards: pool
                .entries
                .iter()
                .map(|entry| CachedCard {
                    name: entry.card.name.clone(),
                    tag: entry.card.tag.clone(),
                    rarity: entry.card.rarity,
                    limited: entry.card.limited,
                    rate: entry.base_rate,
                    pickup: entry.pickup,
                })
                .collect(),
        }
    }

    pub fn into_pool(self) -> Pool {
        let entries = self
            .cards
            .into_iter()
            .map(|card| PoolEntry {
                card: Card {
                    name: card.name,
                    tag: card.tag,
                    rarity: card.rarity,
                    limited: card.limited,
                },
                base_rate: card.rate,
                special_rate: 0.0,
                pickup: card.pickup,
            })
            .collect();
        Pool::new(self.id, self.name, entries)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceConfig {
    pub label: String,
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CannedText {
    #[serde(default = "default_no_data")]
    pub no_data: String,
    #[serde(default)]
    pub sticker_regular: String,
    #[serde(default)]
    pub sticker_rare: String,
}

fn default_no_data() -> String {
    "No data available.".to_string()
}

impl Default for CannedText {
    fn default() -> Self {
        Self {
            no_data: default_no_data(),
            sticker_regular: String::new(),
            sticker_rare: String::new(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("data").join("gacha")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BotConfig {
    #[serde(default)]
    pub roll: RollConfig,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    /// JSON object mapping romanized names to display names.
    #[serde(default)]
    pub names_path: Option<PathBuf>,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub canned: CannedText,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            roll: RollConfig::default(),
            cache_dir: default_cache_dir(),
            names_path: None,
            sources: Vec::new(),
            canned: CannedText::default(),
        }
    }
}
