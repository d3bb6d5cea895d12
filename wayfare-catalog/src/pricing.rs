use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::product::{PricePoint, PricedProduct, ProductType};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Maximum number of price points retained per product
    pub history_limit: usize,

    /// Length of a price freeze
    pub freeze_hours: i64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            history_limit: 30,
            freeze_hours: 24,
        }
    }
}

impl PricingConfig {
    /// `None` when `freeze_hours` is outside the range `Duration` can hold
    pub fn freeze_window(&self) -> Option<Duration> {
        Duration::try_hours(self.freeze_hours)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.history_limit == 0 {
            return Err("pricing.history_limit must be at least 1".to_string());
        }
        if self.freeze_hours < 0 || self.freeze_window().is_none() {
            return Err(format!("pricing.freeze_hours out of range: {}", self.freeze_hours));
        }
        Ok(())
    }
}

/// Price as returned to callers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub id: String,
    pub current_price: i64,
    pub price_history: Vec<PricePoint>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub price_freeze_until: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FreezeReceipt {
    pub message: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub price_freeze_until: DateTime<Utc>,
}

/// Dynamic pricing engine over an in-memory set of flights and hotels
pub struct PricingEngine {
    config: PricingConfig,
    products: HashMap<(ProductType, String), PricedProduct>,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self {
            config,
            products: HashMap::new(),
        }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Add or replace a product
    pub fn register(&mut self, product: PricedProduct) {
        let key = (product.product_type, product.id.clone());
        self.products.insert(key, product);
    }

    pub fn product(&self, product_type: ProductType, id: &str) -> Option<&PricedProduct> {
        self.products.get(&(product_type, id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get_price(&mut self, product_type: ProductType, id: &str) -> Result<PriceQuote, PricingError> {
        self.get_price_at(product_type, id, Utc::now())
    }

    /// Compute the current price of a product as of `now`
    pub fn get_price_at(
        &mut self,
        product_type: ProductType,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<PriceQuote, PricingError> {
        let history_limit = self.config.history_limit;
        let product = self.get_product_mut(product_type, id)?;

        let frozen = product.is_frozen_at(now);
        let current_price = product.quote_at(now, history_limit);
        debug!(
            "{} {} priced at {} (frozen: {}, history: {})",
            product_type,
            id,
            current_price,
            frozen,
            product.price_history().len()
        );

        Ok(PriceQuote {
            id: product.id.clone(),
            current_price,
            price_history: product.price_history().iter().copied().collect(),
            price_freeze_until: product.price_freeze_until(),
        })
    }

    pub fn freeze_price(&mut self, product_type: ProductType, id: &str) -> Result<FreezeReceipt, PricingError> {
        self.freeze_price_at(product_type, id, Utc::now())
    }

    /// Freeze a product's price starting at `now`. No price is computed.
    pub fn freeze_price_at(
        &mut self,
        product_type: ProductType,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<FreezeReceipt, PricingError> {
        let window = self
            .config
            .freeze_window()
            .filter(|window| *window >= Duration::zero())
            .ok_or_else(|| PricingError::InvalidConfig(format!("freeze_hours {}", self.config.freeze_hours)))?;
        let hours = self.config.freeze_hours;
        let product = self.get_product_mut(product_type, id)?;

        let until = product.freeze_at(now, window);
        info!("{} {} price frozen until {}", product_type, id, until);

        Ok(FreezeReceipt {
            message: format!("Price frozen for {} hours", hours),
            price_freeze_until: until,
        })
    }

    fn get_product_mut(&mut self, product_type: ProductType, id: &str) -> Result<&mut PricedProduct, PricingError> {
        self.products
            .get_mut(&(product_type, id.to_string()))
            .ok_or_else(|| PricingError::NotFound(product_type, id.to_string()))
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new(PricingConfig::default())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("{0} not found: {1}")]
    NotFound(ProductType, String),

    #[error("Invalid pricing factors: {0}")]
    InvalidFactors(String),

    #[error("Invalid pricing configuration: {0}")]
    InvalidConfig(String),
}
