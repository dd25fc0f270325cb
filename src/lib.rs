//! # IOtech GPIB Library
//!
//! A Rust library for driving an IOtech digital I/O card (40 bits in five
//! 8-bit ports) over a GPIB bus. On the K-band receiver front end the card
//! switches feed loads, amplifier power, phase-cal and the frequency rail.
//!
//! ## Features
//!
//! - Encode mnemonic command batches (`A3XU3XU5X\r`)
//! - Parse the card's packed status reply into a [`Status`] snapshot
//! - Set, clear, read and pulse individual bits, with direction checks
//! - Write whole ports and read the 40-bit block
//! - Reach the bus through a Prologix-style serial GPIB adapter
//!
//! ## Front-end signal map
//!
//! ```text
//! Port 1 Bit 1 Pin  1: out: high-low-high: move feed 1 load
//!        1     2      2: out: low: feed 1 amp on
//!        1     3      3: out: high-low-high: move feed 2 load
//!        1     4      4: out: low: feed 2 amp on
//!        1     6      6: out: low: phase-cal on
//!        1     7      7: out: low: 1 MHz rail, high: 4 MHz rail
//!        2     3     11: in: high: feed 2 in load
//!        2     4     12: in: high: feed 2 in sky
//!        2     5     13: in: high: feed 1 amp bias on
//!        2     6     14: in: high: feed 2 amp bias on
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use iotech_gpib::{GpibConfig, IOtech};
//! use std::time::Duration;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GpibConfig::new("/dev/ttyUSB0").address(1);
//!     let mut iotech = IOtech::open(&config, 1)?;
//!     iotech.pulse_bit(1, true, Duration::from_millis(500))?;
//!     iotech.print_status();
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod constants;
pub mod error;
pub mod protocol;
pub mod status;
pub mod transport;
pub mod types;

pub use command::{encode_frame, CommandInput};
pub use error::{IotechError, Result};
pub use protocol::IOtech;
pub use status::{parse_status, Status};
pub use transport::{GpibConfig, SerialGpib, Transport};
pub use types::*;
