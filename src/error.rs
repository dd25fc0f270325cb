//! Error types for IOtech driver operations.

use thiserror::Error;

/// Result type alias for IOtech operations.
pub type Result<T> = std::result::Result<T, IotechError>;

/// Error types for IOtech/GPIB communication.
#[derive(Error, Debug)]
pub enum IotechError {
    /// Serial port error from the GPIB adapter
    #[error("Serial port error: {0}")]
    SerialPort(#[from] serialport::Error),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No reply before the adapter timeout
    #[error("Communication timeout")]
    Timeout,

    /// Device returned nothing
    #[error("Empty response")]
    EmptyResponse,

    /// Response didn't match expected format
    #[error("Invalid response: expected {expected}, got {actual}")]
    InvalidResponse {
        /// Expected response format
        expected: String,
        /// Actual response received
        actual: String,
    },

    /// Bit number outside 1-40
    #[error("Invalid bit: {bit} (valid 1-40)")]
    InvalidBit {
        /// Requested bit
        bit: u8,
    },

    /// Port number outside 1-5
    #[error("Invalid port: {port} (valid 1-5)")]
    InvalidPort {
        /// Requested port
        port: u8,
    },

    /// Configuration index outside 0-5
    #[error("Invalid configuration: {0} (valid 0-5)")]
    InvalidConfiguration(u8),

    /// GPIB primary address outside 0-30
    #[error("Invalid GPIB address: {0} (valid 0-30)")]
    InvalidAddress(u8),

    /// Bit addressed on a port configured as input
    #[error("Port {port} is not configured for output (bit {bit})")]
    PortNotOutput {
        /// Owning port
        port: u8,
        /// Requested bit
        bit: u8,
    },

    /// A command could not be delivered to the device
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// Data parsing error
    #[error("Parse error: {0}")]
    Parse(String),
}
