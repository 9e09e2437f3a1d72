use crate::{Card, Rarity};
use serde::Serialize;
use std::borrow::Borrow;
use std::collections::HashMap;

const LIMITED_MARK: &str = "限";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum Category {
    LimitedSsr,
    Ssr,
    LimitedSr,
    Sr,
    R,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::LimitedSsr,
        Category::Ssr,
        Category::LimitedSr,
        Category::Sr,
        Category::R,
    ];

    pub fn of(card: &Card) -> Self {
        match (card.rarity, card.limited) {
            (Rarity::SSR, true) => Category::LimitedSsr,
            (Rarity::SSR, false) => Category::Ssr,
            (Rarity::SR, true) => Category::LimitedSr,
            (Rarity::SR, false) => Category::Sr,
            (Rarity::R, _) => Category::R,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Category::LimitedSsr => "限定SSR",
            Category::Ssr => "SSR",
            Category::LimitedSr => "限定SR",
            Category::Sr => "SR",
            Category::R => "R",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Bucket {
    pub cards: Vec<(Card, usize)>,
}

impl Bucket {
    pub fn total(&self) -> usize {
        self.cards.iter().map(|(_, count)| count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn count_of(&self, card: &Card) -> usize {
        self.cards
            .iter()
            .find(|(entry, _)| entry == card)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DrawResult {
    pub pool_name: String,
    buckets: HashMap<Category, Bucket>,
}

impl DrawResult {
    pub fn bucket(&self, category: Category) -> Option<&Bucket> {
        self.buckets.get(&category)
    }

    pub fn count(&self, category: Category) -> usize {
        self.bucket(category).map(Bucket::total).unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.buckets.values().map(Bucket::total).sum()
    }

    pub fn count_of(&self, card: &Card) -> usize {
        self.bucket(Category::of(card))
            .map(|bucket| bucket.count_of(card))
            .unwrap_or(0)
    }
}

pub fn aggregate<I>(pool_name: &str, draws: I) -> DrawResult
where
    I: IntoIterator,
    I::Item: Borrow<Card>,
{
    let mut buckets: HashMap<Category, Bucket> = HashMap::new();
    let mut positions: HashMap<Card, usize> = HashMap::new();
    for draw in draws {
        let card = draw.borrow();
        let bucket = buckets.entry(Category::of(card)).or_default();
        match positions.get(card) {
            Some(&idx) => bucket.cards[idx].1 += 1,
            None => {
                positions.insert(card.clone(), bucket.cards.len());
                bucket.cards.push((card.clone(), 1));
            }
        }
    }
    DrawResult {
        pool_name: pool_name.to_string(),
        buckets,
    }
}

/// Multi-draw summary: per-card sections for limited SSR, SSR and limited
/// SR, then a count-only footer for the remaining SR and R draws.
pub fn render(result: &DrawResult) -> String {
    let mut out = result.pool_name.clone();
    for category in [Category::LimitedSsr, Category::Ssr, Category::LimitedSr] {
        let Some(bucket) = result.bucket(category).filter(|bucket| !bucket.is_empty()) else {
            continue;
        };
        out.push_str(&format!("\n{}: {}\n", category.label(), bucket.total()));
        let lines: Vec<String> = bucket
            .cards
            .iter()
            .map(|(card, count)| {
                let name = if category == Category::Ssr {
                    card.name.clone()
                } else {
                    card.tagged_name()
                };
                with_multiplier(name, *count)
            })
            .collect();
        let separator = if category == Category::Ssr { ", " } else { "\n" };
        out.push_str(&lines.join(separator));
    }
    out.push_str(&format!(
        "\n{}: {} \t {}: {}",
        Category::Sr.label(),
        result.count(Category::Sr),
        Category::R.label(),
        result.count(Category::R)
    ));
    out
}

pub fn render_single(pool_name: &str, card: &Card) -> String {
    let mark = if card.limited { LIMITED_MARK } else { "" };
    format!(
        "{}\n{}{}: {}",
        pool_name,
        mark,
        card.rarity.label(),
        card.tagged_name()
    )
}

fn with_multiplier(name: String, count: usize) -> String {
    if count > 1 {
        format!("{} x{}", name, count)
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limited_ssr(name: &str) -> Card {
        Card::new(name, Rarity::SSR).with_tag("[限定]").limited()
    }

    #[test]
    fn categories_follow_rarity_and_exclusivity() {
        assert_eq!(Category::of(&limited_ssr("a")), Category::LimitedSsr);
        assert_eq!(Category::of(&Card::new("b", Rarity::SSR)), Category::Ssr);
        assert_eq!(
            Category::of(&Card::new("c", Rarity::SR).limited()),
            Category::LimitedSr
        );
        assert_eq!(Category::of(&Card::new("d", Rarity::SR)), Category::Sr);
        assert_eq!(Category::of(&Card::new("e", Rarity::R)), Category::R);
    }

    #[test]
    fn aggregate_counts_equal_cards_together() {
        let a = limited_ssr("A");
        let draws = vec![a.clone(), Card::new("r", Rarity::R), a.clone()];
        let result = aggregate("pool", &draws);
        assert_eq!(result.count_of(&a), 2);
        assert_eq!(result.count(Category::LimitedSsr), 2);
        assert_eq!(result.count(Category::R), 1);
        assert_eq!(result.total(), 3);
    }

    #[test]
    fn buckets_keep_first_drawn_order() {
        let draws = vec![
            Card::new("B", Rarity::SSR),
            Card::new("A", Rarity::SSR),
            Card::new("B", Rarity::SSR),
        ];
        let result = aggregate("pool", draws);
        let names: Vec<&str> = result
            .bucket(Category::Ssr)
            .expect("bucket")
            .cards
            .iter()
            .map(|(card, _)| card.name.as_str())
            .collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(render(&result), "pool\nSSR: 3\nB x2, A\nSR: 0 \t R: 0");
    }

    #[test]
    fn empty_draws_render_footer_only() {
        let result = aggregate("pool", Vec::<Card>::new());
        assert_eq!(render(&result), "pool\nSR: 0 \t R: 0");
    }

    #[test]
    fn limited_sr_section_is_tag_prefixed_and_newline_joined() {
        let draws = vec![
            Card::new("x", Rarity::SR).with_tag("[t1]").limited(),
            Card::new("y", Rarity::SR).with_tag("[t2]").limited(),
            Card::new("y", Rarity::SR).with_tag("[t2]").limited(),
        ];
        let out = render(&aggregate("pool", draws));
        assert_eq!(out, "pool\n限定SR: 3\n[t1] x\n[t2] y x2\nSR: 0 \t R: 0");
    }

    #[test]
    fn limited_r_draws_count_in_the_r_footer() {
        let draws = vec![
            Card::new("plain", Rarity::R),
            Card::new("event", Rarity::R).with_tag("[t]").limited(),
            Card::new("event", Rarity::R).with_tag("[t]").limited(),
        ];
        let result = aggregate("pool", draws);
        assert_eq!(result.count(Category::R), 3);
        assert_eq!(render(&result), "pool\nSR: 0 \t R: 3");
    }

    #[test]
    fn untagged_limited_cards_render_bare_names() {
        let draws = vec![
            Card::new("A", Rarity::SSR).limited(),
            Card::new("B", Rarity::SR).limited(),
            Card::new("B", Rarity::SR).limited(),
        ];
        let out = render(&aggregate("pool", draws));
        assert_eq!(out, "pool\n限定SSR: 1\nA\n限定SR: 2\nB x2\nSR: 0 \t R: 0");
        assert_eq!(
            render_single("pool", &Card::new("A", Rarity::SSR).limited()),
            "pool\n限SSR: A"
        );
    }

    #[test]
    fn single_template_marks_limited_cards() {
        let card = limited_ssr("A");
        assert_eq!(render_single("pool", &card), "pool\n限SSR: [限定] A");
        let plain = Card::new("B", Rarity::R);
        assert_eq!(render_single("pool", &plain), "pool\nR: B");
    }
}
