use std::env;
use std::time::Duration;

use diy_thermostat::ThermostatAdapter;

#[tokio::main]
async fn main() -> diy_thermostat::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let base_url = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| diy_thermostat::DEFAULT_BASE_URL.to_string());

    let mut adapter = ThermostatAdapter::builder()
        .base_url(&base_url)
        .on_event(|event| {
            println!("{event:?}");
        })
        .build();

    println!("Polling {base_url}...");

    loop {
        if let Err(e) = adapter.refresh().await {
            eprintln!("Refresh error: {e}");
        } else {
            println!(
                "{:.1}\u{00b0}F | mode: {} | action: {} | target: {}",
                adapter.current_temperature(),
                adapter.hvac_mode(),
                adapter.hvac_action(),
                adapter.target(),
            );
        }
        tokio::time::sleep(Duration::from_secs(30)).await;
    }
}
