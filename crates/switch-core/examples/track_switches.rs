//! Track switches in a local JSON file with a background sweeper.
//!
//! Run with: cargo run -p switch-core --example track_switches
//!
//! Configuration via environment variables:
//!   SWITCH_STORE_PATH  - JSON store path (default: switches.json)
//!   SWITCH_PLAN        - plan id: basic, standard, premium (default: standard)

use std::env;
use std::sync::Arc;
use std::time::Duration;

use switch_core::{plans, Clock, JsonFileRepository, Sweeper, SwitchStore};
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = env::var("SWITCH_STORE_PATH").unwrap_or_else(|_| "switches.json".to_string());
    let plan_id = env::var("SWITCH_PLAN").unwrap_or_else(|_| plans::DEFAULT_PLAN_ID.to_string());
    let plan = plans::find(&plan_id).ok_or_else(|| format!("unknown plan: {}", plan_id))?;

    let store = SwitchStore::load(Arc::new(JsonFileRepository::new(&path)))?;
    let store = Arc::new(Mutex::new(store));

    {
        let mut store = store.lock().await;
        let switch = store.create(plan.to_new_switch("If you are reading this, check the desk drawer."))?;
        info!(id = %switch.id, plan = %plan.name, "Created switch");

        let now = store.clock().now();
        for switch in store.all() {
            info!(
                id = %switch.id,
                status = ?switch.status(now),
                remaining = switch.time_remaining(now).as_deref().unwrap_or("-"),
                "Switch"
            );
        }
    }

    let sweeper = Sweeper::new(store.clone())
        .with_interval(Duration::from_secs(5))
        .spawn();

    tokio::time::sleep(Duration::from_secs(12)).await;
    sweeper.shutdown().await;

    let store = store.lock().await;
    info!(active = store.active().len(), expired = store.expired().len(), "Done");
    Ok(())
}
