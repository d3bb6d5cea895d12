use serde::{Deserialize, Serialize};

/// Loyalty tiers, lowest first
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TierLevel {
    Silver,
    Gold,
    Platinum,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tier {
    pub level: TierLevel,
    /// Points required to reach this tier
    pub threshold: u64,
    pub benefits: Vec<String>,
}

impl Tier {
    fn new(level: TierLevel, threshold: u64, benefits: &[&str]) -> Self {
        Self {
            level,
            threshold,
            benefits: benefits.iter().map(|b| b.to_string()).collect(),
        }
    }
}

/// Ordered tier thresholds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TierTable {
    tiers: Vec<Tier>,
}

impl TierTable {
    pub fn standard() -> Self {
        Self {
            tiers: vec![
                Tier::new(TierLevel::Silver, 0, &["Basic support", "5% discount on bookings"]),
                Tier::new(TierLevel::Gold, 500, &["Priority support", "10% discount on bookings"]),
                Tier::new(
                    TierLevel::Platinum,
                    1000,
                    &["24/7 support", "15% discount on bookings", "Free upgrades"],
                ),
            ],
        }
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn get(&self, level: TierLevel) -> Option<&Tier> {
        self.tiers.iter().find(|t| t.level == level)
    }

    /// Highest tier whose threshold is covered by `balance`
    pub fn tier_for(&self, balance: u64) -> TierLevel {
        self.tiers
            .iter()
            .rev()
            .find(|t| t.threshold <= balance)
            .map(|t| t.level)
            .unwrap_or(TierLevel::Silver)
    }

    pub fn next_tier(&self, level: TierLevel) -> Option<&Tier> {
        let index = self.tiers.iter().position(|t| t.level == level)?;
        self.tiers.get(index + 1)
    }

    /// Percentage (0-100) of the way from `level` to the next tier.
    /// The top tier always reports 100.
    pub fn progress(&self, balance: u64, level: TierLevel) -> f64 {
        let (Some(current), Some(next)) = (self.get(level), self.next_tier(level)) else {
            return 100.0;
        };

        let range = next.threshold.saturating_sub(current.threshold);
        if range == 0 {
            return 100.0;
        }

        let progress = (balance as f64 - current.threshold as f64) / range as f64 * 100.0;
        progress.clamp(0.0, 100.0)
    }
}

impl Default for TierTable {
    fn default() -> Self {
        Self::standard()
    }
}
