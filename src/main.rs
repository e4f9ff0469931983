//! Binary entry point that wires environment bootstrap and launches the
//! serial LED toggle loop.

use anyhow::Result;

use blinkctl::controller;

/// Bootstraps environment variables and runs the controller loop until the
/// user interrupts it.
fn main() -> Result<()> {
    dotenv::dotenv().ok();
    controller::run_led_controller()
}
