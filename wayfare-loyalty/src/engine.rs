use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::ledger::{self, BookingRecord, LoyaltyConfig, LoyaltyPointEntry};
use crate::tier::{TierLevel, TierTable};

/// Source of a user's completed bookings
pub trait BookingSource: Send + Sync {
    fn bookings_for_user(&self, user_id: &str) -> Vec<BookingRecord>;
}

impl<T: BookingSource + ?Sized> BookingSource for Arc<T> {
    fn bookings_for_user(&self, user_id: &str) -> Vec<BookingRecord> {
        (**self).bookings_for_user(user_id)
    }
}

/// Loyalty state for one user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserLoyalty {
    pub user_id: String,
    pub points_balance: u64,
    pub points_history: Vec<LoyaltyPointEntry>,
    pub current_tier: TierLevel,
    pub tier_progress: f64,
    pub points_expiry_reminder: String,
}

impl UserLoyalty {
    fn refresh_standing(&mut self, tiers: &TierTable, config: &LoyaltyConfig, now: DateTime<Utc>) {
        self.current_tier = tiers.tier_for(self.points_balance);
        self.tier_progress = tiers.progress(self.points_balance, self.current_tier);
        self.points_expiry_reminder = ledger::expiry_reminder(&self.points_history, now, config.reminder_days);
    }
}

/// Derives, caches and redeems loyalty points per user
pub struct LoyaltyEngine<S> {
    config: LoyaltyConfig,
    tiers: TierTable,
    bookings: S,
    accounts: HashMap<String, UserLoyalty>,
}

impl<S: BookingSource> LoyaltyEngine<S> {
    pub fn new(bookings: S, config: LoyaltyConfig) -> Self {
        Self {
            config,
            tiers: TierTable::standard(),
            bookings,
            accounts: HashMap::new(),
        }
    }

    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }

    /// Cached state, if the user has been seen
    pub fn cached(&self, user_id: &str) -> Option<&UserLoyalty> {
        self.accounts.get(user_id)
    }

    pub fn get_loyalty(&mut self, user_id: &str) -> UserLoyalty {
        self.get_loyalty_at(user_id, Utc::now())
    }

    /// Cached state, derived from bookings on first access
    pub fn get_loyalty_at(&mut self, user_id: &str, now: DateTime<Utc>) -> UserLoyalty {
        if let Some(account) = self.accounts.get(user_id) {
            return account.clone();
        }
        self.rebuild_at(user_id, now)
    }

    /// Rebuild the user's state from scratch and replace the cached copy.
    pub fn rebuild_at(&mut self, user_id: &str, now: DateTime<Utc>) -> UserLoyalty {
        let account = derive_account(&self.bookings, &self.config, &self.tiers, user_id, now);
        self.accounts.insert(user_id.to_string(), account.clone());
        account
    }

    pub fn redeem(&mut self, user_id: &str, points_to_redeem: i64) -> Result<UserLoyalty, LoyaltyError> {
        self.redeem_at(user_id, points_to_redeem, Utc::now())
    }

    /// Redeem points, consuming the oldest unredeemed entries first.
    ///
    /// Rejected requests leave the account untouched.
    pub fn redeem_at(
        &mut self,
        user_id: &str,
        points_to_redeem: i64,
        now: DateTime<Utc>,
    ) -> Result<UserLoyalty, LoyaltyError> {
        if points_to_redeem <= 0 {
            return Err(LoyaltyError::InvalidArgument(format!(
                "points to redeem must be a positive integer, got {}",
                points_to_redeem
            )));
        }
        let requested = points_to_redeem as u64;

        let account = self
            .accounts
            .entry(user_id.to_string())
            .or_insert_with(|| derive_account(&self.bookings, &self.config, &self.tiers, user_id, now));

        if requested > account.points_balance {
            warn!(
                "Rejected redemption of {} points for {}: balance is {}",
                requested, user_id, account.points_balance
            );
            return Err(LoyaltyError::InsufficientBalance {
                requested,
                available: account.points_balance,
            });
        }

        let mut remaining = requested;
        for entry in account.points_history.iter_mut().filter(|e| !e.redeemed) {
            if remaining == 0 {
                break;
            }
            if entry.points <= remaining {
                remaining -= entry.points;
                entry.redeemed = true;
            } else {
                entry.points -= remaining;
                remaining = 0;
            }
        }

        account.points_balance -= requested;
        account.refresh_standing(&self.tiers, &self.config, now);

        info!(
            "Redeemed {} points for {}, balance now {} ({:?})",
            requested, user_id, account.points_balance, account.current_tier
        );

        Ok(account.clone())
    }
}

/// Full derivation from bookings. Expired entries are dropped from the
/// history entirely.
fn derive_account<S: BookingSource>(
    bookings: &S,
    config: &LoyaltyConfig,
    tiers: &TierTable,
    user_id: &str,
    now: DateTime<Utc>,
) -> UserLoyalty {
    let points_history: Vec<LoyaltyPointEntry> = bookings
        .bookings_for_user(user_id)
        .iter()
        .map(|booking| LoyaltyPointEntry::from_booking(booking, config))
        .filter(|entry| entry.is_active_at(now))
        .collect();

    let mut account = UserLoyalty {
        user_id: user_id.to_string(),
        points_balance: ledger::balance(&points_history),
        points_history,
        current_tier: TierLevel::Silver,
        tier_progress: 0.0,
        points_expiry_reminder: String::new(),
    };
    account.refresh_standing(tiers, config, now);

    debug!(
        "Derived loyalty for {}: {} points across {} entries ({:?})",
        user_id,
        account.points_balance,
        account.points_history.len(),
        account.current_tier
    );

    account
}

#[derive(Debug, thiserror::Error)]
pub enum LoyaltyError {
    #[error("Invalid redemption: {0}")]
    InvalidArgument(String),

    #[error("Insufficient points balance: requested {requested}, available {available}")]
    InsufficientBalance {
        requested: u64,
        available: u64,
    },
}
