use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_DRAWS: u32 = 300;
pub const DEFAULT_GUARANTEE_INTERVAL: u32 = 10;

fn default_max_draws() -> u32 {
    DEFAULT_MAX_DRAWS
}

fn default_guarantee_interval() -> u32 {
    DEFAULT_GUARANTEE_INTERVAL
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RollConfig {
    #[serde(default = "default_max_draws")]
    pub max_draws: u32,
    /// Every Nth draw of a batch samples the special rate.
    #[serde(default = "default_guarantee_interval")]
    pub guarantee_interval: u32,
}

impl Default for RollConfig {
    fn default() -> Self {
        Self {
            max_draws: DEFAULT_MAX_DRAWS,
            guarantee_interval: DEFAULT_GUARANTEE_INTERVAL,
        }
    }
}

impl RollConfig {
    pub fn accepts(&self, count: u32) -> bool {
        (1..=self.max_draws).contains(&count)
    }

    /// Chat-facing policy: anything out of range falls back to a single draw.
    pub fn normalize_count(&self, count: u32) -> u32 {
        if self.accepts(count) {
            count
        } else {
            1
        }
    }

    pub fn split(&self, total: u32) -> (u32, u32) {
        if self.guarantee_interval == 0 {
            return (total, 0);
        }
        let guaranteed = total / self.guarantee_interval;
        (total - guaranteed, guaranteed)
    }
}
