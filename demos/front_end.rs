//! Front-End Control Example
//!
//! This example drives the receiver front end through the IOtech card:
//! - Listing and selecting serial ports for the GPIB adapter
//! - Bringing the card up with port 1 as output
//! - Printing the card status
//! - Moving the feed 1 load with a low pulse on bit 1
//! - Reading back the bit block per port
//!
//! Usage:
//!   cargo run --example front_end                  # Interactive mode
//!   cargo run --example front_end -- /dev/ttyUSB0  # Specify port
//!   cargo run --example front_end -- COM3 4        # Port and GPIB address
//!
//! TX/RX frames are logged at debug level for this crate by default.
//! Set RUST_LOG environment variable to control logging:
//!   RUST_LOG=info cargo run --example front_end   # hide TX/RX frames

use inquire::Select;
use iotech_gpib::constants::{DEFAULT_CONFIGURATION, DEFAULT_GPIB_ADDRESS, DEFAULT_PULSE_MS};
use iotech_gpib::{BitBlock, GpibConfig, IOtech, Result, SerialGpib};
use log::{info, warn};
use std::time::Duration;

/// Feed 1 load motor, pulsed high-low-high
const FEED_1_LOAD_BIT: u8 = 1;

/// Interactive serial port selection using inquire
fn select_port() -> Result<String> {
    let ports = SerialGpib::list_ports()?;

    if ports.is_empty() {
        eprintln!("No serial ports found!");
        std::process::exit(1);
    }

    let port_names: Vec<String> = ports
        .iter()
        .map(|p| format!("{} - {:?}", p.port_name, p.port_type))
        .collect();

    let selection = Select::new("Select the GPIB adapter port:", port_names)
        .prompt()
        .map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Selection cancelled: {}", e),
            )
        })?;

    // Extract just the port name (before " - ")
    let port_name = selection
        .split(" - ")
        .next()
        .unwrap_or_default()
        .to_string();
    Ok(port_name)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info,iotech_gpib=debug"),
    )
    .init();

    let mut args = std::env::args().skip(1);
    let port_name = args.next().map(Ok).unwrap_or_else(select_port)?;
    let address = args
        .next()
        .and_then(|a| a.parse().ok())
        .unwrap_or(DEFAULT_GPIB_ADDRESS);

    info!("Connecting to IOtech at GPIB address {} via {}...", address, port_name);
    let config = GpibConfig::new(&port_name).address(address);
    let mut iotech = IOtech::open(&config, DEFAULT_CONFIGURATION)?;
    iotech.set_debug_print(true, true);

    info!("=== Status ===");
    iotech.print_status();
    info!("Output ports: {:?}", iotech.output_ports()?);

    info!("=== Moving feed 1 load ===");
    iotech.pulse_bit(
        FEED_1_LOAD_BIT,
        true,
        Duration::from_millis(DEFAULT_PULSE_MS),
    )?;

    info!("=== Bit block ===");
    match iotech.read_all_bits(false, 8)? {
        BitBlock::Ports(ports) => {
            for (port, value) in ports {
                info!("Port {}: {:08b}", port, value);
            }
        }
        other => warn!("Unexpected bit block {:?}", other),
    }

    info!("=== Front-End Control Complete ===");
    Ok(())
}
