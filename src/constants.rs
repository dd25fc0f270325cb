//! Protocol constants for IOtech communication.
//!
//! This module defines the mnemonic letters, frame terminators, bit
//! addressing limits, timing defaults and the serial settings used to reach
//! the GPIB bus through a Prologix-style adapter.

/// Execute terminator appended to every mnemonic
pub const EXECUTE: char = 'X';

/// Batch terminator appended to every frame
pub const FRAME_END: char = '\r';

/// Set bit
pub const SET_BIT_CMD: char = 'A';

/// Clear bit
pub const CLEAR_BIT_CMD: char = 'B';

/// Configure port directions
pub const CONFIGURE_CMD: char = 'C';

/// Port data
pub const DATA_CMD: char = 'D';

/// Data format
pub const FORMAT_CMD: char = 'F';

/// Port select (0 = all ports)
pub const PORT_CMD: char = 'P';

/// Status query
pub const STATUS_CMD: char = 'U';

/// Key under which the firmware version is reported
pub const VERSION_KEY: &str = "Version";

/// Number of characters of the version prefix in a status reply
pub const VERSION_LEN: usize = 3;

/// Number of I/O ports on the card
pub const NUM_PORTS: u8 = 5;

/// Bits per port
pub const BITS_PER_PORT: u8 = 8;

/// Highest addressable bit (bits are numbered from 1)
pub const MAX_BIT: u8 = NUM_PORTS * BITS_PER_PORT;

/// Mask covering every addressable bit
pub const ALL_BITS_MASK: u64 = (1 << MAX_BIT) - 1;

/// Configuration used when none is given: port 1 out, the rest in
pub const DEFAULT_CONFIGURATION: u8 = 1;

/// Value written to port 1 at startup (amplifiers and phase-cal off)
pub const STARTUP_PORT1_VALUE: u8 = 0b1111;

/// Default hold time for a bit pulse in milliseconds
pub const DEFAULT_PULSE_MS: u64 = 500;

/// Baud rate of the USB/serial GPIB adapter
pub const BAUD_RATE: u32 = 115_200;

/// Read timeout in milliseconds
pub const TIMEOUT_MS: u64 = 2000;

/// Factory GPIB primary address of the IOtech card
pub const DEFAULT_GPIB_ADDRESS: u8 = 1;

/// Escape byte for the adapter's command stream
pub const ADAPTER_ESCAPE: u8 = 0x1B;

/// Settling time after adapter setup commands
pub const ADAPTER_SETTLE_MS: u64 = 100;
