//! Command frame encoding.
//!
//! The card accepts a stream of mnemonics, each a command letter with a
//! numeric argument followed by the execute letter `X`. A batch of
//! mnemonics is closed with a carriage return:
//!
//! ```text
//! A3XU3XU5X\r
//! ```
//!
//! Callers may hand over a list of mnemonics, a space separated string, or
//! a string that is already terminated. All of them end up in the same
//! frame. Nothing here touches the bus.

use crate::constants::*;
use std::fmt::Display;

/// Commands in any of the forms the driver accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandInput {
    /// Discrete mnemonics, e.g. `["A3", "U3"]`
    List(Vec<String>),
    /// Space separated mnemonics, a single mnemonic, or a verbatim frame
    Text(String),
}

impl From<&str> for CommandInput {
    fn from(s: &str) -> Self {
        CommandInput::Text(s.to_string())
    }
}

impl From<String> for CommandInput {
    fn from(s: String) -> Self {
        CommandInput::Text(s)
    }
}

impl From<Vec<String>> for CommandInput {
    fn from(list: Vec<String>) -> Self {
        CommandInput::List(list)
    }
}

impl From<&[&str]> for CommandInput {
    fn from(list: &[&str]) -> Self {
        CommandInput::List(list.iter().map(|s| s.to_string()).collect())
    }
}

impl From<Vec<&str>> for CommandInput {
    fn from(list: Vec<&str>) -> Self {
        list.as_slice().into()
    }
}

impl<const N: usize> From<[&str; N]> for CommandInput {
    fn from(list: [&str; N]) -> Self {
        list.as_slice().into()
    }
}

/// Build one mnemonic from a command letter and its argument
pub fn mnemonic(code: char, argument: impl Display) -> String {
    format!("{}{}", code, argument)
}

/// Turn any accepted command form into the frame sent on the bus
pub fn encode_frame(input: impl Into<CommandInput>) -> String {
    let body = match input.into() {
        CommandInput::List(list) => join_mnemonics(list.iter().map(String::as_str)),
        CommandInput::Text(text) => {
            if text.contains(' ') {
                join_mnemonics(text.split_whitespace())
            } else {
                let text = text.strip_suffix(FRAME_END).unwrap_or(&text);
                if text.is_empty() || text.ends_with(EXECUTE) {
                    text.to_string()
                } else {
                    format!("{}{}", text, EXECUTE)
                }
            }
        }
    };
    format!("{}{}", body, FRAME_END)
}

fn join_mnemonics<'a>(mnemonics: impl Iterator<Item = &'a str>) -> String {
    mnemonics
        .filter(|m| !m.is_empty())
        .map(|m| format!("{}{}", m, EXECUTE))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_input_forms_give_the_same_frame() {
        let expected = "A3XU3XU5X\r";
        assert_eq!(encode_frame(["A3", "U3", "U5"]), expected);
        assert_eq!(encode_frame("A3 U3 U5"), expected);
        assert_eq!(encode_frame("A3XU3XU5X"), expected);
        assert_eq!(encode_frame("A3XU3XU5X\r"), expected);
        assert_eq!(
            encode_frame(vec!["A3".to_string(), "U3".to_string(), "U5".to_string()]),
            expected
        );
    }

    #[test]
    fn single_mnemonic_gets_execute() {
        assert_eq!(encode_frame("C0"), "C0X\r");
        assert_eq!(encode_frame(mnemonic('D', 170)), "D170X\r");
    }

    #[test]
    fn extra_spaces_and_empty_items_are_dropped() {
        assert_eq!(encode_frame("P2  F3 "), "P2XF3X\r");
        assert_eq!(encode_frame(["P0", "", "F0"]), "P0XF0X\r");
    }

    #[test]
    fn empty_input_is_a_bare_terminator() {
        assert_eq!(encode_frame(""), "\r");
        assert_eq!(encode_frame(Vec::<String>::new()), "\r");
    }
}
