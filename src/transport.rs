//! GPIB bus access.
//!
//! The driver only needs to write a frame and read one reply. [`Transport`]
//! captures that; [`SerialGpib`] implements it on top of a Prologix-style
//! USB/serial GPIB controller, which forwards everything that is not a
//! `++` controller command to the addressed instrument.

use crate::constants::*;
use crate::error::{IotechError, Result};
use serde::{Deserialize, Serialize};
use serialport::SerialPort;
use std::io::{ErrorKind, Read, Write};
use std::thread;
use std::time::Duration;

/// Byte-level access to one instrument on the bus
pub trait Transport {
    /// Send raw bytes to the instrument
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Read one reply from the instrument
    fn read(&mut self) -> Result<String>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        (**self).write(data)
    }

    fn read(&mut self) -> Result<String> {
        (**self).read()
    }
}

/// Settings for the GPIB adapter and the instrument address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpibConfig {
    pub port_name: String,
    pub baud_rate: u32,
    pub address: u8,
    pub timeout_ms: u64,
}

impl Default for GpibConfig {
    fn default() -> Self {
        GpibConfig {
            port_name: String::new(),
            baud_rate: BAUD_RATE,
            address: DEFAULT_GPIB_ADDRESS,
            timeout_ms: TIMEOUT_MS,
        }
    }
}

impl GpibConfig {
    /// Defaults for the adapter on `port_name`
    pub fn new(port_name: &str) -> Self {
        GpibConfig {
            port_name: port_name.to_string(),
            ..Default::default()
        }
    }

    /// GPIB primary address of the card
    pub fn address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }
}

/// Instrument reached through a Prologix-style serial GPIB controller
pub struct SerialGpib {
    port: Box<dyn SerialPort>,
    address: u8,
}

impl SerialGpib {
    /// Open the adapter and address the instrument
    pub fn open(config: &GpibConfig) -> Result<Self> {
        if config.address > 30 {
            return Err(IotechError::InvalidAddress(config.address));
        }
        let port = serialport::new(&config.port_name, config.baud_rate)
            .timeout(Duration::from_millis(config.timeout_ms))
            .open()?;

        let mut gpib = SerialGpib {
            port,
            address: config.address,
        };
        gpib.setup()?;
        log::info!(
            "GPIB adapter on {} addressing device {}",
            config.port_name,
            gpib.address
        );
        Ok(gpib)
    }

    /// List available serial ports
    pub fn list_ports() -> Result<Vec<serialport::SerialPortInfo>> {
        Ok(serialport::available_ports()?)
    }

    /// GPIB primary address in use
    pub fn address(&self) -> u8 {
        self.address
    }

    fn setup(&mut self) -> Result<()> {
        // controller mode, no auto-read, assert EOI, append nothing
        let address = format!("++addr {}", self.address);
        for command in ["++mode 1", address.as_str(), "++auto 0", "++eoi 1", "++eos 3"] {
            self.controller_command(command)?;
        }
        thread::sleep(Duration::from_millis(ADAPTER_SETTLE_MS));
        self.port.clear(serialport::ClearBuffer::Input)?;
        Ok(())
    }

    fn controller_command(&mut self, command: &str) -> Result<()> {
        write_controller_command(&mut *self.port, command)
    }
}

impl Transport for SerialGpib {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        write_instrument_line(&mut *self.port, data)
    }

    fn read(&mut self) -> Result<String> {
        self.port.clear(serialport::ClearBuffer::Input)?;
        read_reply(&mut *self.port)
    }
}

fn write_controller_command<W: Write + ?Sized>(port: &mut W, command: &str) -> Result<()> {
    port.write_all(command.as_bytes())?;
    port.write_all(b"\n")?;
    Ok(())
}

/// Send bytes through to the instrument as one escaped adapter line
fn write_instrument_line<W: Write + ?Sized>(port: &mut W, data: &[u8]) -> Result<()> {
    let mut line = escape_for_adapter(data);
    line.push(b'\n');
    port.write_all(&line)?;
    port.flush()?;
    Ok(())
}

/// Ask the adapter to read until EOI and collect the reply up to `\n`
///
/// A timeout after some data ends the reply; a timeout before any data is
/// an error.
fn read_reply<P: Read + Write + ?Sized>(port: &mut P) -> Result<String> {
    write_controller_command(port, "++read eoi")?;

    let mut reply = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match port.read(&mut byte) {
            Ok(0) => break,
            Ok(_) if byte[0] == b'\n' => break,
            Ok(_) => reply.push(byte[0]),
            Err(e) if e.kind() == ErrorKind::TimedOut => {
                if reply.is_empty() {
                    return Err(IotechError::Timeout);
                }
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(String::from_utf8_lossy(&reply).into_owned())
}

/// Escape bytes the controller would otherwise interpret itself
pub fn escape_for_adapter(data: &[u8]) -> Vec<u8> {
    let mut escaped = Vec::with_capacity(data.len() + 2);
    for &b in data {
        if matches!(b, b'\r' | b'\n' | b'+' | ADAPTER_ESCAPE) {
            escaped.push(ADAPTER_ESCAPE);
        }
        escaped.push(b);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    /// Adapter stand-in: replies from `input`, then times out
    struct FakeAdapter {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl FakeAdapter {
        fn replying(input: &[u8]) -> Self {
            FakeAdapter {
                input: Cursor::new(input.to_vec()),
                output: Vec::new(),
            }
        }
    }

    impl Read for FakeAdapter {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.input.read(buf)? {
                0 => Err(io::Error::new(ErrorKind::TimedOut, "timed out")),
                n => Ok(n),
            }
        }
    }

    impl Write for FakeAdapter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn instrument_line_is_escaped_and_newline_terminated() {
        let mut out = Vec::new();
        write_instrument_line(&mut out, b"A3XU3X\r").unwrap();
        assert_eq!(out, b"A3XU3X\x1b\r\n".to_vec());
    }

    #[test]
    fn reply_requests_read_and_stops_at_newline() {
        let mut adapter = FakeAdapter::replying(b"123C1D255\r\nleftover");
        assert_eq!(read_reply(&mut adapter).unwrap(), "123C1D255\r");
        assert_eq!(adapter.output, b"++read eoi\n".to_vec());
    }

    #[test]
    fn timeout_without_data_is_an_error() {
        let mut adapter = FakeAdapter::replying(b"");
        assert!(matches!(read_reply(&mut adapter), Err(IotechError::Timeout)));
    }

    #[test]
    fn timeout_after_data_keeps_partial_reply() {
        let mut adapter = FakeAdapter::replying(b"00000000FF");
        assert_eq!(read_reply(&mut adapter).unwrap(), "00000000FF");
    }

    #[test]
    fn frame_terminator_is_escaped() {
        assert_eq!(escape_for_adapter(b"C1X\r"), b"C1X\x1b\r".to_vec());
    }

    #[test]
    fn plain_bytes_pass_through() {
        assert_eq!(escape_for_adapter(b"A3XU3X"), b"A3XU3X".to_vec());
    }

    #[test]
    fn plus_and_escape_are_escaped() {
        assert_eq!(escape_for_adapter(b"+\x1b\n"), b"\x1b+\x1b\x1b\x1b\n".to_vec());
    }

    #[test]
    fn config_builder_and_defaults() {
        let config = GpibConfig::new("/dev/ttyUSB0")
            .address(7)
            .timeout(Duration::from_millis(500));
        assert_eq!(config.port_name, "/dev/ttyUSB0");
        assert_eq!(config.address, 7);
        assert_eq!(config.timeout_ms, 500);
        assert_eq!(config.baud_rate, BAUD_RATE);
    }

    #[test]
    fn config_from_partial_json() {
        let config: GpibConfig =
            serde_json::from_str(r#"{"port_name": "COM3", "address": 4}"#).unwrap();
        assert_eq!(config.port_name, "COM3");
        assert_eq!(config.address, 4);
        assert_eq!(config.timeout_ms, TIMEOUT_MS);
    }
}
