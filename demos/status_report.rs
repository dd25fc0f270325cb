//! Status Report Example
//!
//! Reads the IOtech status and prints it both as a table and as JSON,
//! decoding the error, data format, polarity and SRQ fields.
//!
//! Usage:
//!   cargo run --example status_report -- /dev/ttyUSB0
//!   cargo run --example status_report -- adapter.json   # GpibConfig as JSON
//!
//! Set RUST_LOG environment variable to control logging:
//!   RUST_LOG=debug cargo run --example status_report

use iotech_gpib::constants::DEFAULT_CONFIGURATION;
use iotech_gpib::{describe_polarity, describe_srq_mask, GpibConfig, IOtech, IotechError, Result};
use log::{error, info};

fn load_config(arg: &str) -> Result<GpibConfig> {
    if arg.ends_with(".json") {
        let text = std::fs::read_to_string(arg)?;
        serde_json::from_str(&text).map_err(|e| IotechError::Parse(e.to_string()))
    } else {
        Ok(GpibConfig::new(arg))
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(arg) = std::env::args().nth(1) else {
        error!("Usage: status_report <serial port | config.json>");
        std::process::exit(1);
    };
    let config = load_config(&arg)?;

    info!("Reading IOtech status via {}", config.port_name);
    let mut iotech = IOtech::open(&config, DEFAULT_CONFIGURATION)?;
    let status = iotech.get_status()?.clone();

    println!("{}", status);

    if let Some(err) = status.error() {
        println!("Error: {}", err.description());
    }
    if let Some(format) = status.data_format() {
        println!("Data format: {}", format.description());
    }
    if let Some(polarity) = status.get('I') {
        println!("Polarity: {}", describe_polarity(polarity as u8).join(", "));
    }
    if let Some(mask) = status.get('M') {
        println!("SRQ: {}", describe_srq_mask(mask as u8).join(", "));
    }

    match serde_json::to_string_pretty(&status) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to serialise status: {}", e),
    }

    Ok(())
}
