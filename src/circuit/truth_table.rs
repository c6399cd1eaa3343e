//! Truth table rows for a two-input function

use serde::{Deserialize, Serialize};

/// One of the two external input channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    One,
    Two,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::One, Channel::Two];

    /// Short name used when printing wiring
    pub fn name(self) -> &'static str {
        match self {
            Channel::One => "a",
            Channel::Two => "b",
        }
    }
}

/// A truth table entry: the constant values of both external signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Row {
    pub ext_signal1: bool,
    pub ext_signal2: bool,
}

impl Row {
    pub fn new(ext_signal1: bool, ext_signal2: bool) -> Self {
        Self {
            ext_signal1,
            ext_signal2,
        }
    }

    /// Value of the given external signal on this row
    pub fn signal(&self, channel: Channel) -> bool {
        match channel {
            Channel::One => self.ext_signal1,
            Channel::Two => self.ext_signal2,
        }
    }

    /// Signal value as a 0/1 coefficient
    pub fn coefficient(&self, channel: Channel) -> i64 {
        i64::from(self.signal(channel))
    }

    /// All four rows of a two-input table, channel 1 toggling fastest
    pub fn full_table() -> Vec<Row> {
        (0..4u8)
            .map(|bits| Row::new(bits & 1 == 1, bits & 2 == 2))
            .collect()
    }
}

/// Render a row-indexed bit vector as a string such as `0110`
pub fn format_pattern(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}
