use crate::constants::*;
use crate::error::{IotechError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Output flag per port (index 0 = port 1) for each configuration 0-5.
///
/// Configuration `k` makes ports `1..=k` outputs and the rest inputs.
pub const PORTS_OUT: [[bool; NUM_PORTS as usize]; 6] = [
    [false, false, false, false, false],
    [true, false, false, false, false],
    [true, true, false, false, false],
    [true, true, true, false, false],
    [true, true, true, true, false],
    [true, true, true, true, true],
];

/// Direction of an I/O port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortDirection {
    In,
    Out,
}

impl From<bool> for PortDirection {
    fn from(output: bool) -> Self {
        if output {
            PortDirection::Out
        } else {
            PortDirection::In
        }
    }
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortDirection::In => write!(f, "in"),
            PortDirection::Out => write!(f, "out"),
        }
    }
}

/// Port direction profile selected with the `C` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration(u8);

impl Configuration {
    /// Validate a configuration index (0-5)
    pub fn new(index: u8) -> Result<Self> {
        if (index as usize) < PORTS_OUT.len() {
            Ok(Configuration(index))
        } else {
            Err(IotechError::InvalidConfiguration(index))
        }
    }

    /// Index sent with the `C` command
    pub fn index(&self) -> u8 {
        self.0
    }

    /// Output flag keyed by port number 1-5
    pub fn output_ports(&self) -> BTreeMap<u8, bool> {
        PORTS_OUT[self.0 as usize]
            .iter()
            .enumerate()
            .map(|(i, &out)| (i as u8 + 1, out))
            .collect()
    }

    /// Direction of port 1-5
    pub fn direction(&self, port: u8) -> Result<PortDirection> {
        if port == 0 || port > NUM_PORTS {
            return Err(IotechError::InvalidPort { port });
        }
        Ok(PORTS_OUT[self.0 as usize][(port - 1) as usize].into())
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration(DEFAULT_CONFIGURATION)
    }
}

/// Location of a logical bit (1-40) on the card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitAddress {
    pub bit: u8,
    pub port: u8,
    pub offset: u8,
}

impl BitAddress {
    /// Locate bit 1-40
    pub fn new(bit: u8) -> Result<Self> {
        if bit == 0 || bit > MAX_BIT {
            return Err(IotechError::InvalidBit { bit });
        }
        Ok(BitAddress {
            bit,
            port: (bit - 1) / BITS_PER_PORT + 1,
            offset: (bit - 1) % BITS_PER_PORT,
        })
    }
}

/// Decoded bit-block reply, shaped by `read_all_bits` arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BitBlock {
    Raw(u64),
    Formatted(String),
    Ports(BTreeMap<u8, u8>),
}

/// I/O data format (`F` command)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataFormat {
    AsciiHex = 0,
    AsciiChar = 1,
    AsciiBinary = 2,
    AsciiDecimal = 3,
    Binary = 4,
    HighSpeedBinary = 5,
}

impl DataFormat {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(DataFormat::AsciiHex),
            1 => Some(DataFormat::AsciiChar),
            2 => Some(DataFormat::AsciiBinary),
            3 => Some(DataFormat::AsciiDecimal),
            4 => Some(DataFormat::Binary),
            5 => Some(DataFormat::HighSpeedBinary),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn description(&self) -> &'static str {
        match self {
            DataFormat::AsciiHex => "ASCII hex",
            DataFormat::AsciiChar => "ASCII char",
            DataFormat::AsciiBinary => "ASCII binary",
            DataFormat::AsciiDecimal => "ASCII decimal",
            DataFormat::Binary => "binary",
            DataFormat::HighSpeedBinary => "high speed binary",
        }
    }
}

/// Error code reported in the `E` status field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceError {
    NoError = 0,
    UnrecognizedCommand = 1,
    IllegalCommand = 2,
    IoConflict = 3,
    RomError = 4,
    RamError = 5,
}

impl DeviceError {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(DeviceError::NoError),
            1 => Some(DeviceError::UnrecognizedCommand),
            2 => Some(DeviceError::IllegalCommand),
            3 => Some(DeviceError::IoConflict),
            4 => Some(DeviceError::RomError),
            5 => Some(DeviceError::RamError),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DeviceError::NoError => "no error",
            DeviceError::UnrecognizedCommand => "unrecognized command",
            DeviceError::IllegalCommand => "illegal command",
            DeviceError::IoConflict => "I/O conflict",
            DeviceError::RomError => "ROM error",
            DeviceError::RamError => "RAM error",
        }
    }
}

/// Polarity bits (`I` command); zero means all active high
pub const POLARITY_FLAGS: [(u8, &str); 7] = [
    (0b0000_0001, "INHIBIT active low"),
    (0b0000_0010, "TRIGGER active low"),
    (0b0000_0100, "DATA STROBE active low"),
    (0b0000_1000, "CLEAR active low"),
    (0b0001_0000, "data low = True"),
    (0b0010_0000, "EDR in is falling-edge sensitive"),
    (0b0100_0000, "SERVICE in is falling-edge sensitive"),
];

/// SRQ mask bits (`M` command); zero disables SRQ
pub const SRQ_FLAGS: [(u8, &str); 5] = [
    (0b00001, "SRQ on SERVICE"),
    (0b00010, "SRQ on EDR"),
    (0b00100, "SRQ on bus error"),
    (0b01000, "SRQ on self-test error"),
    (0b10000, "SRQ on READY"),
];

/// Describe the polarity flags set in `value`
pub fn describe_polarity(value: u8) -> Vec<&'static str> {
    if value == 0 {
        return vec!["control high, data high = True"];
    }
    describe_flags(&POLARITY_FLAGS, value)
}

/// Describe the SRQ conditions enabled in `value`
pub fn describe_srq_mask(value: u8) -> Vec<&'static str> {
    if value == 0 {
        return vec!["SRQ disabled"];
    }
    describe_flags(&SRQ_FLAGS, value)
}

fn describe_flags(table: &[(u8, &'static str)], value: u8) -> Vec<&'static str> {
    table
        .iter()
        .filter(|(mask, _)| value & mask != 0)
        .map(|&(_, label)| label)
        .collect()
}

/// Meaning of a command letter, as listed in the device manual
pub fn command_description(code: char) -> Option<&'static str> {
    let description = match code {
        'A' => "set bit",
        'B' => "clear bit",
        'C' => "configure",
        'D' => "data",
        'E' => "error message",
        'F' => "format",
        'G' => "input/output mode for talk",
        'H' => "handshake",
        'I' => "polarity",
        'K' => "use EOI",
        'M' => "SRQ mask",
        'P' => "port",
        'Q' => "inhibit",
        'R' => "latch data",
        'T' => "test",
        'U' => "status",
        'X' => "execute",
        'Y' => "terminator",
        _ => return None,
    };
    Some(description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_k_marks_first_k_ports_output() {
        for k in 0..=5u8 {
            let ports = Configuration::new(k).unwrap().output_ports();
            assert_eq!(ports.len(), 5);
            for port in 1..=5u8 {
                assert_eq!(ports[&port], port <= k, "config {} port {}", k, port);
            }
        }
    }

    #[test]
    fn configuration_out_of_range() {
        assert!(matches!(
            Configuration::new(6),
            Err(IotechError::InvalidConfiguration(6))
        ));
    }

    #[test]
    fn default_configuration_is_port_1_out() {
        let config = Configuration::default();
        assert_eq!(config.index(), DEFAULT_CONFIGURATION);
        assert_eq!(config.direction(1).unwrap(), PortDirection::Out);
        assert_eq!(config.direction(2).unwrap(), PortDirection::In);
    }

    #[test]
    fn direction_lookup() {
        let config = Configuration::new(2).unwrap();
        assert_eq!(config.direction(2).unwrap(), PortDirection::Out);
        assert_eq!(config.direction(3).unwrap(), PortDirection::In);
        assert_eq!(config.direction(3).unwrap().to_string(), "in");
        assert!(config.direction(0).is_err());
        assert!(config.direction(6).is_err());
    }

    #[test]
    fn bit_addressing() {
        let first = BitAddress::new(1).unwrap();
        assert_eq!((first.port, first.offset), (1, 0));
        let eighth = BitAddress::new(8).unwrap();
        assert_eq!((eighth.port, eighth.offset), (1, 7));
        let ninth = BitAddress::new(9).unwrap();
        assert_eq!((ninth.port, ninth.offset), (2, 0));
        let last = BitAddress::new(40).unwrap();
        assert_eq!((last.port, last.offset), (5, 7));
        assert!(BitAddress::new(0).is_err());
        assert!(BitAddress::new(41).is_err());
    }

    #[test]
    fn flag_descriptions() {
        assert_eq!(describe_polarity(0), vec!["control high, data high = True"]);
        assert_eq!(
            describe_polarity(0b0001_0001),
            vec!["INHIBIT active low", "data low = True"]
        );
        assert_eq!(describe_srq_mask(0), vec!["SRQ disabled"]);
        assert_eq!(describe_srq_mask(0b10000), vec!["SRQ on READY"]);
    }

    #[test]
    fn code_tables() {
        assert_eq!(DataFormat::from_code(3), Some(DataFormat::AsciiDecimal));
        assert_eq!(DataFormat::AsciiDecimal.code(), 3);
        assert_eq!(DeviceError::from_code(3).unwrap().description(), "I/O conflict");
        assert_eq!(DeviceError::from_code(9), None);
        assert_eq!(command_description('U'), Some("status"));
        assert_eq!(command_description('Z'), None);
    }
}
