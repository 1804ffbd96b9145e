//! Ping a target from a device console and report the verdict.
//!
//! # Usage
//!
//! ```bash
//! DEVCONSOLE_INVENTORY=inventory/hosts.yaml cargo run --example ping -- pc1 20.0.0.1
//! ```

use std::env;
use std::sync::Arc;

use devconsole::{Inventory, TaskRunner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let [source, target] = args.as_slice() else {
        eprintln!("Usage: cargo run --example ping -- <device> <target>");
        std::process::exit(2);
    };

    let inventory = Arc::new(Inventory::load_default()?);
    println!("Inventory has {} hosts", inventory.len());

    let runner = TaskRunner::new(inventory);
    let reachability = runner.check_reachability(source, target).await?;
    println!("{}", reachability);

    if !reachability.success {
        std::process::exit(1);
    }
    Ok(())
}
