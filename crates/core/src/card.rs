use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rarity {
    R,
    SR,
    SSR,
}

impl Rarity {
    pub fn label(self) -> &'static str {
        match self {
            Rarity::R => "R",
            Rarity::SR => "SR",
            Rarity::SSR => "SSR",
        }
    }

    pub fn is_rare(self) -> bool {
        self >= Rarity::SR
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Card {
    pub name: String,
    #[serde(default)]
    pub tag: Option<String>,
    pub rarity: Rarity,
    #[serde(default)]
    pub limited: bool,
}

impl Card {
    pub fn new(name: impl Into<String>, rarity: Rarity) -> Self {
        Self {
            name: name.into(),
            tag: None,
            rarity,
            limited: false,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn limited(mut self) -> Self {
        self.limited = true;
        self
    }

    pub fn tagged_name(&self) -> String {
        match &self.tag {
            Some(tag) => format!("{} {}", tag, self.name),
            None => self.name.clone(),
        }
    }
}
