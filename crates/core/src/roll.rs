use crate::{
    aggregate, derive_special_rates, render, render_single, sample, Card, GachaError, Pool,
    RateField, Rarity, RollConfig,
};
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Supplies parsed pools by id. Implementations own fetching and caching;
/// repeated calls for one id must describe the same pool.
pub trait PoolProvider {
    fn get_pool(&self, pool_id: u32) -> Result<Pool, GachaError>;
}

impl<P: PoolProvider + ?Sized> PoolProvider for &P {
    fn get_pool(&self, pool_id: u32) -> Result<Pool, GachaError> {
        (**self).get_pool(pool_id)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RollOutcome {
    pub pool: String,
    pub results: String,
    pub card: Option<Card>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Reaction {
    Regular,
    Rare,
}

impl Reaction {
    pub fn for_card(card: &Card) -> Self {
        if card.limited || card.rarity == Rarity::SSR {
            Reaction::Rare
        } else {
            Reaction::Regular
        }
    }
}

pub struct Roller<P> {
    provider: P,
    config: RollConfig,
    derived: HashMap<u32, Arc<Pool>>,
}

impl<P: PoolProvider> Roller<P> {
    pub fn new(provider: P, config: RollConfig) -> Self {
        Self {
            provider,
            config,
            derived: HashMap::new(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn pool(&mut self, pool_id: u32) -> Result<Arc<Pool>, GachaError> {
        if let Some(pool) = self.derived.get(&pool_id) {
            return Ok(pool.clone());
        }
        let pool = self.provider.get_pool(pool_id)?;
        let pool = Arc::new(derive_special_rates(&pool)?);
        debug!(pool = pool_id, cards = pool.len(), "memoized derived pool");
        self.derived.insert(pool_id, pool.clone());
        Ok(pool)
    }

    pub fn roll<R: Rng + ?Sized>(
        &mut self,
        pool_id: u32,
        total: u32,
        rng: &mut R,
    ) -> Result<RollOutcome, GachaError> {
        if !self.config.accepts(total) {
            return Err(GachaError::InvalidDrawCount {
                count: total,
                max: self.config.max_draws,
            });
        }
        let pool = self.pool(pool_id)?;
        let outcome = roll_pool(&pool, &self.config, total, rng)?;
        info!(pool = pool_id, total, "rolled");
        Ok(outcome)
    }
}

pub fn roll_pool<R: Rng + ?Sized>(
    pool: &Pool,
    config: &RollConfig,
    total: u32,
    rng: &mut R,
) -> Result<RollOutcome, GachaError> {
    if total == 1 {
        let card = sample(pool, 1, RateField::Base, rng)?
            .pop()
            .cloned()
            .ok_or(GachaError::EmptyPool(pool.id))?;
        return Ok(RollOutcome {
            pool: pool.name.clone(),
            results: render_single(&pool.name, &card),
            card: Some(card),
        });
    }
    let (regular, guaranteed) = config.split(total);
    let mut draws = sample(pool, regular as usize, RateField::Base, rng)?;
    draws.extend(sample(pool, guaranteed as usize, RateField::Special, rng)?);
    let result = aggregate(&pool.name, draws);
    Ok(RollOutcome {
        pool: pool.name.clone(),
        results: render(&result),
        card: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PoolEntry, RngState};
    use rand::rngs::mock::StepRng;
    use std::cell::Cell;

    struct CountingProvider {
        pool: Pool,
        calls: Cell<usize>,
    }

    impl PoolProvider for CountingProvider {
        fn get_pool(&self, pool_id: u32) -> Result<Pool, GachaError> {
            self.calls.set(self.calls.get() + 1);
            if pool_id == self.pool.id {
                Ok(self.pool.clone())
            } else {
                Err(GachaError::PoolUnavailable {
                    pool: pool_id,
                    reason: "unknown".to_string(),
                })
            }
        }
    }

    fn provider() -> CountingProvider {
        CountingProvider {
            pool: Pool::new(
                100,
                "Test Gacha",
                vec![
                    PoolEntry::new(
                        Card::new("A", Rarity::SSR).with_tag("[限定]").limited(),
                        0.03,
                    )
                    .pickup(),
                    PoolEntry::new(Card::new("B", Rarity::SR), 0.12).pickup(),
                    PoolEntry::new(Card::new("C", Rarity::R), 0.85),
                ],
            ),
            calls: Cell::new(0),
        }
    }

    #[test]
    fn single_draw_returns_card_for_reaction() {
        let mut roller = Roller::new(provider(), RollConfig::default());
        let outcome = roller
            .roll(100, 1, &mut StepRng::new(0, 0))
            .expect("roll");
        let card = outcome.card.expect("card");
        assert!(card.limited);
        assert_eq!(card.rarity, Rarity::SSR);
        assert_eq!(Reaction::for_card(&card), Reaction::Rare);
        assert_eq!(outcome.results, "Test Gacha\n限SSR: [限定] A");
    }

    #[test]
    fn batch_draw_has_no_card() {
        let mut roller = Roller::new(provider(), RollConfig::default());
        let outcome = roller
            .roll(100, 10, &mut RngState::from_seed(1))
            .expect("roll");
        assert!(outcome.card.is_none());
        assert!(outcome.results.starts_with("Test Gacha"));
        assert!(outcome.results.contains("\nSR: "));
    }

    #[test]
    fn derived_pool_is_fetched_once() {
        let mut roller = Roller::new(provider(), RollConfig::default());
        let mut rng = RngState::from_seed(2);
        roller.roll(100, 10, &mut rng).expect("first");
        roller.roll(100, 1, &mut rng).expect("second");
        assert_eq!(roller.provider().calls.get(), 1);
    }

    #[test]
    fn out_of_range_counts_are_rejected() {
        let mut roller = Roller::new(provider(), RollConfig::default());
        let mut rng = StepRng::new(0, 0);
        for count in [0, 301] {
            assert!(matches!(
                roller.roll(100, count, &mut rng),
                Err(GachaError::InvalidDrawCount { max: 300, .. })
            ));
        }
    }

    #[test]
    fn unavailable_pool_propagates() {
        let mut roller = Roller::new(provider(), RollConfig::default());
        let err = roller
            .roll(999, 10, &mut StepRng::new(0, 0))
            .expect_err("missing");
        assert!(matches!(err, GachaError::PoolUnavailable { pool: 999, .. }));
    }

    #[test]
    fn regular_reaction_for_plain_cards() {
        assert_eq!(
            Reaction::for_card(&Card::new("r", Rarity::R)),
            Reaction::Regular
        );
        assert_eq!(
            Reaction::for_card(&Card::new("sr", Rarity::SR)),
            Reaction::Regular
        );
        assert_eq!(
            Reaction::for_card(&Card::new("sr", Rarity::SR).limited()),
            Reaction::Rare
        );
        assert_eq!(
            Reaction::for_card(&Card::new("ssr", Rarity::SSR)),
            Reaction::Rare
        );
    }
}
