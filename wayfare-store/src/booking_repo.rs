use parking_lot::RwLock;
use tracing::debug;

use wayfare_loyalty::{BookingRecord, BookingSource};

/// In-memory booking records, in insertion order
#[derive(Debug, Default)]
pub struct InMemoryBookingRepository {
    bookings: RwLock<Vec<BookingRecord>>,
}

impl InMemoryBookingRepository {
    pub fn new(bookings: Vec<BookingRecord>) -> Self {
        Self {
            bookings: RwLock::new(bookings),
        }
    }

    pub fn insert(&self, booking: BookingRecord) {
        debug!("Recorded booking {} for {}", booking.id, booking.user_id);
        self.bookings.write().push(booking);
    }

    pub fn len(&self) -> usize {
        self.bookings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.read().is_empty()
    }
}

impl BookingSource for InMemoryBookingRepository {
    fn bookings_for_user(&self, user_id: &str) -> Vec<BookingRecord> {
        self.bookings
            .read()
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect()
    }
}
