pub mod provider;
pub mod series;
pub mod yahoo;

// Re-export the series types for convenient access (e.g. `use crate::market_data::PriceBar`).
pub use provider::MarketDataProvider;
pub use series::{PriceBar, PriceSeries};
pub use yahoo::YahooChartProvider;
