//! Push a configuration block to a Cisco IOS router console.
//!
//! The router is looked up in the inventory named by `$DEVCONSOLE_INVENTORY`
//! (default `inventory/hosts.yaml`).
//!
//! # Usage
//!
//! ```bash
//! cargo run --example router_config -- --device router
//! cargo run --example router_config -- --device router --file r1.cfg --secret cisco
//! ```

use std::env;
use std::fs;
use std::sync::Arc;

use devconsole::{ConsoleBuilder, Inventory};

const DEFAULT_CONFIG: &str = "\
interface Ethernet0/0
 no shutdown
exit";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set RUST_LOG=debug for the full exchange log
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = match &args.file {
        Some(path) => fs::read_to_string(path)?,
        None => DEFAULT_CONFIG.to_string(),
    };

    let inventory = Arc::new(Inventory::load_default()?);
    let mut builder = ConsoleBuilder::from_inventory(inventory, &args.device);
    if let Some(secret) = &args.secret {
        builder = builder.enable_secret(secret.as_str());
    }
    let mut console = builder.build();

    println!("Connecting to {}...", args.device);
    let result = async {
        console.connect().await?;
        let version = console.send_command("show version | include IOS", None).await?;
        println!("{}", version.output);

        println!("\nApplying configuration:");
        println!("{}", "-".repeat(50));
        console.configure_cisco(&config).await
    }
    .await;
    console.close().await;

    let transcript = result?;
    println!("{}", transcript);
    println!("{}", "-".repeat(50));
    println!("Applied {} commands", transcript.len());

    Ok(())
}

/// Simple argument parser
struct Args {
    device: String,
    file: Option<String>,
    secret: Option<String>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut device = "router".to_string();
        let mut file = None;
        let mut secret = None;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--device" | "-d" => {
                    i += 1;
                    if i < args.len() {
                        device = args[i].clone();
                    }
                }
                "--file" | "-f" => {
                    i += 1;
                    if i < args.len() {
                        file = Some(args[i].clone());
                    }
                }
                "--secret" | "-s" => {
                    i += 1;
                    if i < args.len() {
                        secret = Some(args[i].clone());
                    }
                }
                "--help" => {
                    Self::print_help();
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                }
            }
            i += 1;
        }

        Self {
            device,
            file,
            secret,
        }
    }

    fn print_help() {
        println!(
            r#"devconsole router_config example

USAGE:
    cargo run --example router_config -- [OPTIONS]

OPTIONS:
    -d, --device <NAME>      Inventory name of the router [default: router]
    -f, --file <PATH>        Configuration block to apply
    -s, --secret <SECRET>    Enable secret, if the router asks for one
    --help                   Print this help message
"#
        );
    }
}
