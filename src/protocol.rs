use crate::command::{encode_frame, mnemonic, CommandInput};
use crate::constants::*;
use crate::error::{IotechError, Result};
use crate::status::{parse_status, Status};
use crate::transport::{GpibConfig, SerialGpib, Transport};
use crate::types::*;
use log::{debug, error};
use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;

/// Prefix of the reply returned by [`IOtech::read`] when the bus read fails
pub const READ_ERROR_PREFIX: &str = "Error: ";

/// Main IOtech driver interface
pub struct IOtech<T: Transport = Box<dyn Transport>> {
    transport: T,
    print_tx: bool,
    print_rx: bool,
    status: Option<Status>,
}

impl IOtech<SerialGpib> {
    /// Open the GPIB adapter and bring the card up in `configuration`
    pub fn open(config: &GpibConfig, configuration: u8) -> Result<Self> {
        let transport = SerialGpib::open(config)?;
        IOtech::new(transport, configuration)
    }

    /// List available serial ports
    pub fn list_ports() -> Result<Vec<serialport::SerialPortInfo>> {
        SerialGpib::list_ports()
    }
}

impl<T: Transport> IOtech<T> {
    /// Create a new IOtech interface
    ///
    /// Sets the port directions, drives the low nibble of port 1 high (feed
    /// amplifiers and phase-cal off) and reads the initial status.
    pub fn new(transport: T, configuration: u8) -> Result<Self> {
        let configuration = Configuration::new(configuration)?;
        let mut iotech = IOtech {
            transport,
            print_tx: false,
            print_rx: false,
            status: None,
        };

        if !iotech.configure(configuration.index()) {
            return Err(IotechError::CommandFailed(format!(
                "configure {}",
                configuration.index()
            )));
        }
        if !iotech.write_port(1, STARTUP_PORT1_VALUE) {
            return Err(IotechError::CommandFailed("initialise port 1".to_string()));
        }
        iotech.get_status()?;
        Ok(iotech)
    }

    /// Enable/disable debug printing for TX/RX
    pub fn set_debug_print(&mut self, tx: bool, rx: bool) {
        self.print_tx = tx;
        self.print_rx = rx;
    }

    /// Underlying bus transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the bus transport, bypassing the driver
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Send commands to the card
    ///
    /// Accepts `["A3", "U3", "U5"]`, `"A3 U3 U5"` or the verbatim
    /// `"A3XU3XU5X"`; see [`encode_frame`]. Returns false if the bus write
    /// failed.
    pub fn send(&mut self, commands: impl Into<CommandInput>) -> bool {
        let frame = encode_frame(commands);
        if self.print_tx {
            debug!("Sending:  {:?}", frame);
        }
        match self.transport.write(frame.as_bytes()) {
            Ok(()) => true,
            Err(e) => {
                error!("Sending {:?} failed: {}", frame, e);
                false
            }
        }
    }

    /// Read one reply from the card
    ///
    /// Without a preceding query the card answers with the bits of the
    /// configured ports. A failed read comes back as `"Error: <details>"`.
    pub fn read(&mut self) -> String {
        match self.transport.read() {
            Ok(response) => {
                if self.print_rx {
                    debug!("Received: {:?}", response);
                }
                response
            }
            Err(e) => {
                error!("Reading IOtech failed: {}", e);
                format!("{}{}", READ_ERROR_PREFIX, e)
            }
        }
    }

    /// A [`send`](Self::send) followed by a [`read`](Self::read)
    ///
    /// Returns the trimmed reply, or `None` if the command could not be sent.
    pub fn ask(&mut self, query: impl Into<CommandInput>) -> Option<String> {
        if self.send(query) {
            Some(self.read().trim().to_string())
        } else {
            None
        }
    }

    /// Ask, turning send and read failures into errors
    fn ask_checked(&mut self, query: impl Into<CommandInput>) -> Result<String> {
        let query = query.into();
        let description = format!("{:?}", query);
        let reply = self
            .ask(query)
            .ok_or(IotechError::CommandFailed(description))?;
        Self::check_reply(reply)
    }

    fn check_reply(reply: String) -> Result<String> {
        if let Some(details) = reply.strip_prefix(READ_ERROR_PREFIX) {
            return Err(IotechError::CommandFailed(format!("read: {}", details)));
        }
        if reply.is_empty() {
            return Err(IotechError::EmptyResponse);
        }
        Ok(reply)
    }

    /// Configure the port I/O directions
    ///
    /// Configuration `k` makes ports `1..=k` outputs; the default (1) has
    /// port 1 out and the rest in.
    pub fn configure(&mut self, configuration: u8) -> bool {
        let configuration = match Configuration::new(configuration) {
            Ok(c) => c,
            Err(e) => {
                error!("{}", e);
                return false;
            }
        };
        if self.send(mnemonic(CONFIGURE_CMD, configuration.index())) {
            self.status = None;
            true
        } else {
            false
        }
    }

    /// Query and parse the card's status, keeping it as the current snapshot
    pub fn get_status(&mut self) -> Result<&Status> {
        let reply = self.ask_checked(mnemonic(STATUS_CMD, 0))?;
        let status = parse_status(&reply)?;
        Ok(&*self.status.insert(status))
    }

    /// Last status snapshot, if any
    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    /// Print the last status snapshot as a table
    pub fn print_status(&self) {
        match &self.status {
            Some(status) => print!("{}", status),
            None => println!("No status read yet"),
        }
    }

    /// Output flag of each port under the card's current configuration
    pub fn output_ports(&mut self) -> Result<BTreeMap<u8, bool>> {
        let code = match self.status.as_ref().and_then(Status::configuration) {
            Some(code) => code,
            None => self.get_status()?.configuration().ok_or_else(|| {
                IotechError::Parse("status has no configuration field".to_string())
            })?,
        };
        let index = u8::try_from(code).map_err(|_| IotechError::InvalidResponse {
            expected: "configuration 0-5".to_string(),
            actual: code.to_string(),
        })?;
        Ok(Configuration::new(index)?.output_ports())
    }

    /// Get the state of a bit (1-40)
    pub fn get_bit_state(&mut self, bit: u8) -> Result<bool> {
        let address = BitAddress::new(bit)?;
        let reply = self.ask_checked(mnemonic(STATUS_CMD, address.bit))?;
        let value = reply
            .parse::<i64>()
            .map_err(|_| IotechError::InvalidResponse {
                expected: format!("state of bit {}", bit),
                actual: reply.clone(),
            })?;
        Ok(value != 0)
    }

    /// Read all 40 bits
    ///
    /// * `formatted` - render as a 40 digit binary string, split into
    ///   `group_size` digit groups when `group_size > 0`
    /// * otherwise, `group_size > 0` gives one byte per port (port 1 is the
    ///   low byte) and `0` the raw value
    pub fn read_all_bits(&mut self, formatted: bool, group_size: usize) -> Result<BitBlock> {
        let reply = self.read();
        let reply = Self::check_reply(reply.trim().to_string())?;
        let value = u64::from_str_radix(&reply, 16).map_err(|_| IotechError::InvalidResponse {
            expected: "40 bit hex value".to_string(),
            actual: reply.clone(),
        })?;
        if value > ALL_BITS_MASK {
            return Err(IotechError::InvalidResponse {
                expected: "40 bit hex value".to_string(),
                actual: reply,
            });
        }

        Ok(if formatted {
            BitBlock::Formatted(format_bits(value, group_size))
        } else if group_size > 0 {
            BitBlock::Ports(split_ports(value))
        } else {
            BitBlock::Raw(value)
        })
    }

    /// Write a value to a port
    ///
    /// Port and format selection are shared state on the card, so the
    /// select, write and restore frames go out back to back.
    pub fn write_port(&mut self, port: u8, value: u8) -> bool {
        if port == 0 || port > NUM_PORTS {
            error!("{}", IotechError::InvalidPort { port });
            return false;
        }
        let select = vec![
            mnemonic(PORT_CMD, port),
            mnemonic(FORMAT_CMD, DataFormat::AsciiDecimal.code()),
        ];
        if !self.send(select) {
            return false;
        }
        let written = self.send(mnemonic(DATA_CMD, value));
        let restored = self.send(vec![
            mnemonic(PORT_CMD, 0),
            mnemonic(FORMAT_CMD, DataFormat::AsciiHex.code()),
        ]);
        written && restored
    }

    /// Set bit `bit` (1-40) high
    pub fn set_bit(&mut self, bit: u8) -> bool {
        let result = self.drive_bit(SET_BIT_CMD, bit);
        Self::report(result)
    }

    /// Clear bit `bit` (1-40)
    pub fn clr_bit(&mut self, bit: u8) -> bool {
        let result = self.drive_bit(CLEAR_BIT_CMD, bit);
        Self::report(result)
    }

    fn report(result: Result<()>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                error!("{}", e);
                false
            }
        }
    }

    fn drive_bit(&mut self, code: char, bit: u8) -> Result<()> {
        let address = BitAddress::new(bit)?;
        let outputs = self.output_ports()?;
        if !outputs.get(&address.port).copied().unwrap_or(false) {
            return Err(IotechError::PortNotOutput {
                port: address.port,
                bit,
            });
        }
        if self.send(mnemonic(code, address.bit)) {
            Ok(())
        } else {
            Err(IotechError::CommandFailed(mnemonic(code, address.bit)))
        }
    }

    /// Pulse a bit
    ///
    /// With `low` the bit is brought high if needed, held low for `pause`
    /// and left high. Otherwise the levels are swapped and the bit ends low.
    pub fn pulse_bit(&mut self, bit: u8, low: bool, pause: Duration) -> Result<()> {
        let (rest, active) = if low {
            (SET_BIT_CMD, CLEAR_BIT_CMD)
        } else {
            (CLEAR_BIT_CMD, SET_BIT_CMD)
        };

        let high = self.get_bit_state(bit)?;
        if high != low {
            self.drive_bit(rest, bit)?;
            thread::sleep(pause);
        }
        self.drive_bit(active, bit)?;
        thread::sleep(pause);
        self.drive_bit(rest, bit)
    }
}

/// Render 40 bits as binary digits, MSB first, optionally grouped
fn format_bits(value: u64, group_size: usize) -> String {
    let digits = format!("{:0width$b}", value, width = MAX_BIT as usize);
    if group_size == 0 {
        return digits;
    }
    digits
        .as_bytes()
        .chunks(group_size)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split 40 bits into one byte per port, port 1 being the low byte
fn split_ports(value: u64) -> BTreeMap<u8, u8> {
    (0..NUM_PORTS)
        .map(|i| (i + 1, ((value >> (i * BITS_PER_PORT)) & 0xFF) as u8))
        .collect()
}
