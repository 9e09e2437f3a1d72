use crate::{GachaError, Pool, Rarity};
use tracing::debug;

/// Guaranteed-slot mass shared by pickup (and limited) SRs.
pub const PICKUP_SR_MASS: f64 = 0.2;
/// Guaranteed-slot mass shared by ordinary SRs. The remaining 0.03 is
/// covered by the SSRs keeping their base rate.
pub const REGULAR_SR_MASS: f64 = 0.77;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SrComposition {
    pub pickup: usize,
    pub regular: usize,
}

impl SrComposition {
    pub fn of(pool: &Pool) -> Self {
        let mut composition = Self::default();
        for entry in &pool.entries {
            if entry.card.rarity != Rarity::SR {
                continue;
            }
            if entry.pickup || entry.card.limited {
                composition.pickup += 1;
            } else {
                composition.regular += 1;
            }
        }
        composition
    }
}

/// Only base rates and flags are read, so applying it twice is a no-op.
pub fn derive_special_rates(pool: &Pool) -> Result<Pool, GachaError> {
    if pool.is_empty() {
        return Err(GachaError::EmptyPool(pool.id));
    }
    let composition = SrComposition::of(pool);
    let pickup_share = share(PICKUP_SR_MASS, composition.pickup);
    let regular_share = share(REGULAR_SR_MASS, composition.regular);

    let mut derived = pool.clone();
    for entry in &mut derived.entries {
        entry.special_rate = match entry.card.rarity {
            Rarity::SSR => entry.base_rate,
            Rarity::SR if entry.pickup || entry.card.limited => pickup_share,
            Rarity::SR => regular_share,
            Rarity::R => 0.0,
        };
    }
    debug!(
        pool = pool.id,
        pickup_sr = composition.pickup,
        regular_sr = composition.regular,
        "derived special rates"
    );
    Ok(derived)
}

fn share(mass: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        mass / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Card, PoolEntry, RateField, RATE_EPSILON};

    fn scenario_pool() -> Pool {
        Pool::new(
            30001,
            "scenario",
            vec![
                PoolEntry::new(Card::new("ssr", Rarity::SSR).limited(), 0.03).pickup(),
                PoolEntry::new(Card::new("sr-pickup-1", Rarity::SR), 0.04).pickup(),
                PoolEntry::new(Card::new("sr-pickup-2", Rarity::SR), 0.04).pickup(),
                PoolEntry::new(Card::new("sr-regular", Rarity::SR), 0.04),
                PoolEntry::new(Card::new("r-1", Rarity::R), 0.44),
                PoolEntry::new(Card::new("r-2", Rarity::R), 0.41),
            ],
        )
    }

    #[test]
    fn scenario_rates_match_guarantee_rule() {
        let derived = derive_special_rates(&scenario_pool()).expect("derive");
        let rates: Vec<f64> = derived.entries.iter().map(|e| e.special_rate).collect();
        assert!((rates[0] - 0.03).abs() < RATE_EPSILON);
        assert!((rates[1] - 0.1).abs() < RATE_EPSILON);
        assert!((rates[2] - 0.1).abs() < RATE_EPSILON);
        assert!((rates[3] - 0.77).abs() < RATE_EPSILON);
        assert_eq!(rates[4], 0.0);
        assert_eq!(rates[5], 0.0);
        assert!((derived.total_rate(RateField::Special) - 1.0).abs() < RATE_EPSILON);
    }

    #[test]
    fn base_rates_are_untouched() {
        let pool = scenario_pool();
        let derived = derive_special_rates(&pool).expect("derive");
        for (before, after) in pool.entries.iter().zip(&derived.entries) {
            assert_eq!(before.base_rate, after.base_rate);
            assert_eq!(before.card, after.card);
        }
    }

    #[test]
    fn derivation_is_idempotent() {
        let once = derive_special_rates(&scenario_pool()).expect("derive");
        let twice = derive_special_rates(&once).expect("derive");
        assert_eq!(once, twice);
    }

    #[test]
    fn limited_sr_counts_toward_pickup_share() {
        let pool = Pool::new(
            2,
            "limited",
            vec![
                PoolEntry::new(Card::new("ssr", Rarity::SSR), 0.03),
                PoolEntry::new(Card::new("sr-pickup", Rarity::SR), 0.04).pickup(),
                PoolEntry::new(Card::new("sr-limited", Rarity::SR).limited(), 0.04),
                PoolEntry::new(Card::new("sr-regular", Rarity::SR), 0.04),
                PoolEntry::new(Card::new("r", Rarity::R), 0.85),
            ],
        );
        assert_eq!(
            SrComposition::of(&pool),
            SrComposition {
                pickup: 2,
                regular: 1
            }
        );
        let derived = derive_special_rates(&pool).expect("derive");
        assert!((derived.entries[1].special_rate - 0.1).abs() < RATE_EPSILON);
        assert!((derived.entries[2].special_rate - 0.1).abs() < RATE_EPSILON);
        assert!((derived.total_rate(RateField::Special) - 1.0).abs() < RATE_EPSILON);
    }

    #[test]
    fn missing_pickup_srs_do_not_produce_nan() {
        let pool = Pool::new(
            3,
            "no pickup",
            vec![
                PoolEntry::new(Card::new("ssr", Rarity::SSR), 0.03),
                PoolEntry::new(Card::new("sr", Rarity::SR), 0.12),
                PoolEntry::new(Card::new("r", Rarity::R), 0.85),
            ],
        );
        let derived = derive_special_rates(&pool).expect("derive");
        assert!(derived.entries.iter().all(|e| e.special_rate.is_finite()));
        assert!((derived.entries[1].special_rate - 0.77).abs() < RATE_EPSILON);
    }

    #[test]
    fn pool_without_srs_keeps_ssr_mass_only() {
        let pool = Pool::new(
            4,
            "no sr",
            vec![
                PoolEntry::new(Card::new("ssr", Rarity::SSR), 0.03),
                PoolEntry::new(Card::new("r", Rarity::R), 0.97),
            ],
        );
        let derived = derive_special_rates(&pool).expect("derive");
        assert!(derived.entries.iter().all(|e| e.special_rate.is_finite()));
        assert!((derived.total_rate(RateField::Special) - 0.03).abs() < RATE_EPSILON);
    }

    #[test]
    fn empty_pool_is_rejected() {
        let pool = Pool::new(5, "empty", Vec::new());
        assert!(matches!(
            derive_special_rates(&pool),
            Err(GachaError::EmptyPool(5))
        ));
    }
}
