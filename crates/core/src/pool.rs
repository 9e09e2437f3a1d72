use crate::Card;
use serde::{Deserialize, Serialize};

pub const RATE_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RateField {
    Base,
    Special,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PoolEntry {
    pub card: Card,
    pub base_rate: f64,
    #[serde(default)]
    pub special_rate: f64,
    #[serde(default)]
    pub pickup: bool,
}

impl PoolEntry {
    pub fn new(card: Card, base_rate: f64) -> Self {
        Self {
            card,
            base_rate,
            special_rate: 0.0,
            pickup: false,
        }
    }

    pub fn pickup(mut self) -> Self {
        self.pickup = true;
        self
    }

    pub fn rate(&self, field: RateField) -> f64 {
        match field {
            RateField::Base => self.base_rate,
            RateField::Special => self.special_rate,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pool {
    pub id: u32,
    pub name: String,
    pub entries: Vec<PoolEntry>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RateRow {
    pub card: Card,
    pub pickup: bool,
    pub base_percent: f64,
    pub special_percent: f64,
}

impl Pool {
    pub fn new(id: u32, name: impl Into<String>, entries: Vec<PoolEntry>) -> Self {
        Self {
            id,
            name: name.into(),
            entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn total_rate(&self, field: RateField) -> f64 {
        self.entries.iter().map(|entry| entry.rate(field)).sum()
    }

    pub fn rate_table(&self) -> Vec<RateRow> {
        self.entries
            .iter()
            .map(|entry| RateRow {
                card: entry.card.clone(),
                pickup: entry.pickup,
                base_percent: entry.base_rate * 100.0,
                special_percent: entry.special_rate * 100.0,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rarity;

    fn sample_pool() -> Pool {
        Pool::new(
            1,
            "test",
            vec![
                PoolEntry::new(Card::new("a", Rarity::SSR), 0.03).pickup(),
                PoolEntry::new(Card::new("b", Rarity::SR), 0.12),
                PoolEntry::new(Card::new("c", Rarity::R), 0.85),
            ],
        )
    }

    #[test]
    fn totals_per_rate_field() {
        let pool = sample_pool();
        assert!((pool.total_rate(RateField::Base) - 1.0).abs() < RATE_EPSILON);
        assert_eq!(pool.total_rate(RateField::Special), 0.0);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn rate_table_reports_percentages() {
        let table = sample_pool().rate_table();
        assert_eq!(table.len(), 3);
        assert!(table[0].pickup);
        assert!((table[2].base_percent - 85.0).abs() < 1e-9);
    }
}
