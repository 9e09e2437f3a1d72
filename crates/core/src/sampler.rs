use crate::{Card, GachaError, Pool, RateField};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CardSampler<'a> {
    pool: &'a Pool,
    index: WeightedIndex<f64>,
}

impl<'a> CardSampler<'a> {
    pub fn new(pool: &'a Pool, field: RateField) -> Result<Self, GachaError> {
        let raw: Vec<f64> = pool
            .entries
            .iter()
            .map(|entry| sanitize(entry.rate(field)))
            .collect();
        let total: f64 = raw.iter().sum();
        if total <= 0.0 || !total.is_finite() {
            return Err(GachaError::NoDrawableWeight {
                pool: pool.id,
                field,
            });
        }
        let index = WeightedIndex::new(raw.iter().map(|weight| weight / total)).map_err(|_| {
            GachaError::NoDrawableWeight {
                pool: pool.id,
                field,
            }
        })?;
        Ok(Self { pool, index })
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> &'a Card {
        &self.pool.entries[self.index.sample(rng)].card
    }

    pub fn draw_many<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<&'a Card> {
        (0..count).map(|_| self.draw(rng)).collect()
    }
}

fn sanitize(rate: f64) -> f64 {
    if rate.is_finite() && rate > 0.0 {
        rate
    } else {
        0.0
    }
}

pub fn sample<'a, R: Rng + ?Sized>(
    pool: &'a Pool,
    count: usize,
    field: RateField,
    rng: &mut R,
) -> Result<Vec<&'a Card>, GachaError> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let sampler = CardSampler::new(pool, field)?;
    debug!(pool = pool.id, count, ?field, "sampling");
    Ok(sampler.draw_many(count, rng))
}
