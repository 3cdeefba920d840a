//! MEXC REST adapters for spot and contract market data

pub mod contract;
mod http;
pub mod spot;
pub mod types;

pub use contract::MexcContractMarket;
pub use spot::MexcSpotMarket;
