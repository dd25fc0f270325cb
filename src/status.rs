//! Status reply decoding.
//!
//! The reply to `U0` starts with a three character firmware version and
//! continues with `<letter><number>` fields packed together without any
//! delimiter, e.g. `123C1D255U0`. Fields are told apart purely by the
//! switch from digits back to a letter.

use crate::constants::*;
use crate::error::{IotechError, Result};
use crate::types::{command_description, DataFormat, DeviceError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Snapshot of the card's status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "Version")]
    pub version: f64,
    pub fields: BTreeMap<char, i64>,
}

impl Status {
    /// Value reported for a command letter
    pub fn get(&self, code: char) -> Option<i64> {
        self.fields.get(&code).copied()
    }

    /// Current configuration index (`C`)
    pub fn configuration(&self) -> Option<i64> {
        self.get(CONFIGURE_CMD)
    }

    /// Decoded error field (`E`)
    pub fn error(&self) -> Option<DeviceError> {
        self.get('E').and_then(DeviceError::from_code)
    }

    /// Decoded data format field (`F`)
    pub fn data_format(&self) -> Option<DataFormat> {
        self.get(FORMAT_CMD).and_then(DataFormat::from_code)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", VERSION_KEY, self.version)?;
        for (code, value) in &self.fields {
            let description = command_description(*code).unwrap_or("unknown");
            writeln!(f, "{:>7}  {:<30}  {:1}", code, description, value)?;
        }
        Ok(())
    }
}

/// Parse a status reply
pub fn parse_status(raw: &str) -> Result<Status> {
    let prefix: String = raw.chars().take(VERSION_LEN).collect();
    if prefix.chars().count() < VERSION_LEN {
        return Err(IotechError::InvalidResponse {
            expected: "status with 3 character version".to_string(),
            actual: raw.to_string(),
        });
    }
    let version = parse_version(&prefix)?;

    let mut fields = BTreeMap::new();
    let mut current: Option<(char, String)> = None;

    for c in raw.chars().skip(VERSION_LEN) {
        match current.as_mut() {
            None => {
                if c.is_alphabetic() {
                    current = Some((c, String::new()));
                }
            }
            Some((_, value)) if c.is_ascii_digit() || c == '.' => value.push(c),
            Some(_) if c == FRAME_END || c == '\n' => {}
            Some(_) => {
                if let Some((code, value)) = current.replace((c, String::new())) {
                    fields.insert(code, parse_field(code, &value)?);
                }
            }
        }
    }
    if let Some((code, value)) = current {
        fields.insert(code, parse_field(code, &value)?);
    }

    Ok(Status {
        timestamp: Utc::now(),
        version,
        fields,
    })
}

/// Version prefix: taken literally when it carries a point, otherwise the
/// point sits after the first digit ("123" is 1.23)
fn parse_version(prefix: &str) -> Result<f64> {
    let literal = if prefix.contains('.') {
        prefix.to_string()
    } else {
        let mut chars = prefix.chars();
        let major = chars.next().unwrap_or_default();
        format!("{}.{}", major, chars.as_str())
    };
    literal
        .parse::<f64>()
        .map_err(|_| IotechError::Parse(format!("bad version '{}'", prefix)))
}

fn parse_field(code: char, value: &str) -> Result<i64> {
    value
        .parse::<i64>()
        .map_err(|_| IotechError::Parse(format!("bad value '{}' for field {}", value, code)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn parses_reference_reply() {
        let status = parse_status("123C1D255U0").unwrap();
        assert_relative_eq!(status.version, 1.23);
        assert_eq!(status.get('C'), Some(1));
        assert_eq!(status.get('D'), Some(255));
        assert_eq!(status.get('U'), Some(0));
        assert_eq!(status.fields.len(), 3);
    }

    #[test]
    fn literal_version_with_point() {
        let status = parse_status("1.2C2").unwrap();
        assert_relative_eq!(status.version, 1.2);
        assert_eq!(status.configuration(), Some(2));
    }

    #[test]
    fn carriage_returns_inside_values_are_skipped() {
        let status = parse_status("123C1\rE0\r").unwrap();
        assert_eq!(status.get('C'), Some(1));
        assert_eq!(status.get('E'), Some(0));
        assert_eq!(status.error(), Some(DeviceError::NoError));
    }

    #[test]
    fn crlf_terminated_reply() {
        let status = parse_status("123C1D255U0\r\n").unwrap();
        assert_eq!(status.fields.len(), 3);
        assert_eq!(status.get('U'), Some(0));
    }

    #[test]
    fn leading_non_letters_before_first_field_are_ignored() {
        let status = parse_status("123  F3M16").unwrap();
        assert_eq!(status.data_format(), Some(DataFormat::AsciiDecimal));
        assert_eq!(status.get('M'), Some(16));
    }

    #[test]
    fn full_device_reply() {
        let status = parse_status("123C1E0F0G0H0I0K1M0P0Q0R0T0Y2").unwrap();
        assert_eq!(status.fields.len(), 13);
        assert_eq!(status.get('K'), Some(1));
        assert_eq!(status.get('Y'), Some(2));
    }

    #[test]
    fn letter_without_value_is_an_error() {
        assert!(matches!(parse_status("123CD1"), Err(IotechError::Parse(_))));
    }

    #[test]
    fn fractional_field_is_an_error() {
        assert!(matches!(parse_status("123C1.5"), Err(IotechError::Parse(_))));
    }

    #[test]
    fn short_reply_is_rejected() {
        assert!(matches!(
            parse_status("12"),
            Err(IotechError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn display_lists_each_field() {
        let text = parse_status("123C1D255").unwrap().to_string();
        assert!(text.starts_with("Version 1.23"));
        assert!(text.contains("configure"));
        assert!(text.contains("255"));
    }
}
