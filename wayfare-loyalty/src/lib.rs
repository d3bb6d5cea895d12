//! Loyalty points: accrual from bookings, tiering and redemption.

pub mod tier;
pub mod ledger;
pub mod engine;

pub use tier::{Tier, TierLevel, TierTable};
pub use ledger::{BookingRecord, LoyaltyConfig, LoyaltyPointEntry};
pub use engine::{BookingSource, LoyaltyEngine, LoyaltyError, UserLoyalty};
