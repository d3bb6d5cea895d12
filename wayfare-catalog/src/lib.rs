pub mod product;
pub mod pricing;

pub use product::{PricePoint, PricedProduct, PricingFactors, ProductType};
pub use pricing::{FreezeReceipt, PriceQuote, PricingConfig, PricingEngine, PricingError};
