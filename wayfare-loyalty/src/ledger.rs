use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

/// A completed booking, owned by the booking subsystem
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub id: String,
    pub user_id: String,
    pub amount_spent: f64,
    pub booking_date: DateTime<Utc>,
}

impl BookingRecord {
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        amount_spent: f64,
        booking_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            amount_spent,
            booking_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoyaltyConfig {
    /// Points awarded per full spend block
    pub points_per_block: u64,
    pub spend_block: u64,
    pub expiry_months: u32,
    /// Entries expiring within this many days trigger a reminder
    pub reminder_days: i64,
}

impl Default for LoyaltyConfig {
    fn default() -> Self {
        Self {
            points_per_block: 100,
            spend_block: 1000,
            expiry_months: 6,
            reminder_days: 30,
        }
    }
}

impl LoyaltyConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.spend_block == 0 {
            return Err("loyalty.spend_block must be at least 1".to_string());
        }
        if self.reminder_days < 0 || Duration::try_days(self.reminder_days).is_none() {
            return Err(format!("loyalty.reminder_days out of range: {}", self.reminder_days));
        }
        Ok(())
    }

    pub fn points_for(&self, amount_spent: f64) -> u64 {
        if !amount_spent.is_finite() || amount_spent <= 0.0 {
            return 0;
        }
        let blocks = (amount_spent / self.spend_block.max(1) as f64).floor() as u64;
        blocks.saturating_mul(self.points_per_block)
    }

    /// Calendar-month expiry. The day is clamped to the end of shorter
    /// months, so Aug 31 + 6 months is Feb 28 rather than rolling over into
    /// early March the way a naive `setMonth` style add would.
    pub fn expiry_for(&self, earned: DateTime<Utc>) -> DateTime<Utc> {
        earned
            .checked_add_months(Months::new(self.expiry_months))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Points earned from one booking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyPointEntry {
    pub points: u64,
    pub earned_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub booking_id: String,
    pub redeemed: bool,
}

impl LoyaltyPointEntry {
    pub fn from_booking(booking: &BookingRecord, config: &LoyaltyConfig) -> Self {
        Self {
            points: config.points_for(booking.amount_spent),
            earned_date: booking.booking_date,
            expiry_date: config.expiry_for(booking.booking_date),
            booking_id: booking.id.clone(),
            redeemed: false,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date <= now
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.redeemed && !self.is_expired_at(now)
    }

    fn expires_within(&self, now: DateTime<Utc>, window: Duration) -> bool {
        let remaining = self.expiry_date - now;
        !self.redeemed && remaining > Duration::zero() && remaining <= window
    }
}

/// Sum of points still held in unredeemed entries
pub fn balance(entries: &[LoyaltyPointEntry]) -> u64 {
    entries.iter().filter(|e| !e.redeemed).map(|e| e.points).sum()
}

/// Reminder text for entries about to lapse, empty when there are none
pub fn expiry_reminder(entries: &[LoyaltyPointEntry], now: DateTime<Utc>, reminder_days: i64) -> String {
    let Some(window) = Duration::try_days(reminder_days) else {
        return String::new();
    };
    let expiring = entries.iter().filter(|e| e.expires_within(now, window)).count();

    if expiring > 0 {
        format!(
            "You have {} point entries expiring within {} days. Redeem soon!",
            expiring, reminder_days
        )
    } else {
        String::new()
    }
}
