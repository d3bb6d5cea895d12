//! Demo flights, hotels and bookings loaded at startup.

use chrono::{DateTime, Duration, Months, Utc};
use tracing::info;

use wayfare_catalog::{PricePoint, PricedProduct, PricingEngine, PricingError, PricingFactors, ProductType};
use wayfare_loyalty::BookingRecord;

struct ProductSeed {
    id: &'static str,
    factors: (f64, f64, f64, f64),
    history: [i64; 4],
}

const FLIGHTS: [ProductSeed; 3] = [
    ProductSeed { id: "1", factors: (300.0, 0.5, 0.3, 0.2), history: [280, 290, 310, 320] },
    ProductSeed { id: "2", factors: (200.0, 0.7, 0.1, 0.15), history: [190, 195, 210, 220] },
    ProductSeed { id: "3", factors: (150.0, 0.3, 0.2, 0.1), history: [140, 145, 150, 155] },
];

const HOTELS: [ProductSeed; 3] = [
    ProductSeed { id: "1", factors: (150.0, 0.6, 0.4, 0.25), history: [140, 145, 155, 160] },
    ProductSeed { id: "2", factors: (200.0, 0.5, 0.3, 0.2), history: [190, 195, 210, 215] },
    ProductSeed { id: "3", factors: (120.0, 0.4, 0.2, 0.15), history: [110, 115, 120, 125] },
];

/// Register the demo catalog. Each product gets one observed price per day
/// for the last four days, the newest at `now`.
pub fn seed_pricing(engine: &mut PricingEngine, now: DateTime<Utc>) -> Result<(), PricingError> {
    let limit = engine.config().history_limit;

    for (product_type, seeds) in [(ProductType::Flight, &FLIGHTS), (ProductType::Hotel, &HOTELS)] {
        for seed in seeds.iter() {
            let (base, demand, seasonal, custom) = seed.factors;
            let days = seed.history.len() as i64;
            let history = seed
                .history
                .iter()
                .enumerate()
                .map(|(i, price)| PricePoint::new(now - Duration::days(days - 1 - i as i64), *price))
                .collect();

            let product = PricedProduct::new(seed.id, product_type, PricingFactors::new(base, demand, seasonal, custom))?
                .with_history(history, limit);
            engine.register(product);
        }
    }

    info!("Seeded {} priced products", engine.len());
    Ok(())
}

/// Bookings for the demo user: one a month old, one already past expiry and
/// one made today.
pub fn seed_bookings(now: DateTime<Utc>) -> Vec<BookingRecord> {
    let months_ago = |m| now.checked_sub_months(Months::new(m)).unwrap_or(now);

    vec![
        BookingRecord::new("b1", "user1", 4500.0, months_ago(1)),
        BookingRecord::new("b2", "user1", 12000.0, months_ago(7)),
        BookingRecord::new("b3", "user1", 3000.0, now),
    ]
}
