use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::pricing::PricingError;

/// Product types that carry a dynamic price
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    Flight,
    Hotel,
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductType::Flight => write!(f, "Flight"),
            ProductType::Hotel => write!(f, "Hotel"),
        }
    }
}

/// A single observed price
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PricePoint {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub price: i64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: i64) -> Self {
        Self { timestamp, price }
    }
}

/// Static pricing inputs, configured outside the engine.
///
/// Each factor is an offset on top of the base price: `0.2` means +20%.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PricingFactors {
    pub base_price: f64,
    pub demand_factor: f64,
    pub seasonal_factor: f64,
    pub custom_rules_factor: f64,
}

impl PricingFactors {
    pub fn new(base_price: f64, demand_factor: f64, seasonal_factor: f64, custom_rules_factor: f64) -> Self {
        Self {
            base_price,
            demand_factor,
            seasonal_factor,
            custom_rules_factor,
        }
    }

    pub fn validate(&self) -> Result<(), PricingError> {
        if !self.base_price.is_finite() || self.base_price <= 0.0 {
            return Err(PricingError::InvalidFactors(format!(
                "base price must be positive, got {}",
                self.base_price
            )));
        }

        let factors = [
            ("demand", self.demand_factor),
            ("seasonal", self.seasonal_factor),
            ("custom rules", self.custom_rules_factor),
        ];
        for (name, value) in factors {
            if !value.is_finite() || value < 0.0 {
                return Err(PricingError::InvalidFactors(format!(
                    "{} factor must be non-negative, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }

    /// Current price: base scaled by every factor, rounded to a whole unit
    pub fn calculate_price(&self) -> i64 {
        let demand = 1.0 + self.demand_factor;
        let seasonal = 1.0 + self.seasonal_factor;
        let custom = 1.0 + self.custom_rules_factor;

        (self.base_price * demand * seasonal * custom).round() as i64
    }
}

/// A flight or hotel with its rolling price history and optional freeze
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricedProduct {
    pub id: String,
    pub product_type: ProductType,
    pub factors: PricingFactors,
    price_history: VecDeque<PricePoint>,
    price_freeze_until: Option<DateTime<Utc>>,
}

impl PricedProduct {
    pub fn new(
        id: impl Into<String>,
        product_type: ProductType,
        factors: PricingFactors,
    ) -> Result<Self, PricingError> {
        factors.validate()?;

        Ok(Self {
            id: id.into(),
            product_type,
            factors,
            price_history: VecDeque::new(),
            price_freeze_until: None,
        })
    }

    /// Attach previously observed prices. Out-of-order points are sorted and
    /// only the newest `limit` entries are kept.
    pub fn with_history(mut self, mut history: Vec<PricePoint>, limit: usize) -> Self {
        history.sort_by_key(|p| p.timestamp);
        let skip = history.len().saturating_sub(limit.max(1));
        self.price_history = history.into_iter().skip(skip).collect();
        self
    }

    pub fn price_history(&self) -> &VecDeque<PricePoint> {
        &self.price_history
    }

    pub fn price_freeze_until(&self) -> Option<DateTime<Utc>> {
        self.price_freeze_until
    }

    pub fn is_frozen_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.price_freeze_until, Some(until) if until > now)
    }

    pub fn last_price(&self) -> Option<i64> {
        self.price_history.back().map(|p| p.price)
    }

    /// Resolve the price as seen at `now`.
    ///
    /// While frozen the last observed price is returned and nothing is
    /// recorded. Otherwise the price is recomputed, appended to the history
    /// (evicting the oldest point past `history_limit`) and a lapsed freeze is
    /// cleared.
    pub fn quote_at(&mut self, now: DateTime<Utc>, history_limit: usize) -> i64 {
        if self.is_frozen_at(now) {
            // Frozen before anything was observed: report the formula price
            // without recording it.
            return self
                .last_price()
                .unwrap_or_else(|| self.factors.calculate_price());
        }

        let price = self.factors.calculate_price();

        // Keep timestamps non-decreasing even if the clock steps back.
        let timestamp = match self.price_history.back() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        };
        self.price_history.push_back(PricePoint::new(timestamp, price));
        while self.price_history.len() > history_limit.max(1) {
            self.price_history.pop_front();
        }

        if matches!(self.price_freeze_until, Some(until) if until <= now) {
            self.price_freeze_until = None;
        }

        price
    }

    /// Freeze the price for `window` starting at `now`. Re-freezing extends
    /// the window from `now`. Saturates at the latest representable instant.
    pub fn freeze_at(&mut self, now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
        let until = now.checked_add_signed(window).unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.price_freeze_until = Some(until);
        until
    }
}
