use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use wayfare_catalog::PricingEngine;
use wayfare_loyalty::LoyaltyEngine;
use wayfare_store::{seed, Config, InMemoryBookingRepository};

pub type SharedLoyalty = LoyaltyEngine<Arc<InMemoryBookingRepository>>;

/// One lock per store; every request runs its read-modify-write under it.
#[derive(Clone)]
pub struct AppState {
    pub pricing: Arc<Mutex<PricingEngine>>,
    pub loyalty: Arc<Mutex<SharedLoyalty>>,
}

impl AppState {
    pub fn new(pricing: PricingEngine, bookings: Arc<InMemoryBookingRepository>, config: &Config) -> Self {
        let loyalty = LoyaltyEngine::new(bookings, config.loyalty.clone());

        Self {
            pricing: Arc::new(Mutex::new(pricing)),
            loyalty: Arc::new(Mutex::new(loyalty)),
        }
    }

    /// Build state from configuration, loading the demo data when enabled
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let now = Utc::now();
        let mut pricing = PricingEngine::new(config.pricing.clone());
        let bookings = if config.seed.enabled {
            seed::seed_pricing(&mut pricing, now)?;
            InMemoryBookingRepository::new(seed::seed_bookings(now))
        } else {
            InMemoryBookingRepository::default()
        };

        Ok(Self::new(pricing, Arc::new(bookings), config))
    }
}
