mod adapter;
mod error;
mod logger;
mod platform;
mod protocol;
mod types;

pub use adapter::{ThermostatAdapter, ThermostatAdapterBuilder};
pub use error::{Error, Result};
pub use logger::TrafficLogMode;
pub use platform::setup_platform;
pub use protocol::DEFAULT_BASE_URL;
pub use types::*;
