//! Registration surface for the host home-automation framework.

use crate::ThermostatAdapter;

/// Entry point invoked by the host when it loads this integration. The host
/// supplies a callback that takes ownership of each entity it should manage;
/// this integration drives exactly one device, so exactly one adapter is
/// handed over.
pub fn setup_platform<F>(add_entity: F)
where
    F: FnOnce(ThermostatAdapter),
{
    add_entity(ThermostatAdapter::builder().build());
}
