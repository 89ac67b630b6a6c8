use crate::errors::LinkError;
use serde::{Deserialize, Serialize};

/// Bit rate used when no explicit configuration is given
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Serial configuration parameters handed to the provider on open
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub data_bits: u8,
    pub stop_bits: u8,
    pub parity: ParityMode,
    pub flow_control: FlowControl,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ParityMode {
    None,
    Even,
    Odd,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FlowControl {
    None,
    Hardware,
    Software,
}

impl SerialConfig {
    /// Create a standard 8N1 configuration at specified baud rate
    pub fn new_8n1(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            data_bits: 8,
            stop_bits: 1,
            parity: ParityMode::None,
            flow_control: FlowControl::None,
        }
    }

    /// Parse framing string (e.g., "8N1", "7E1") into configuration
    ///
    /// "Auto" and the empty string fall back to 8N1.
    pub fn from_framing(framing: &str, baud_rate: u32) -> Result<Self, LinkError> {
        let framing = framing.trim();
        if framing.is_empty() || framing.eq_ignore_ascii_case("auto") {
            return Ok(Self::new_8n1(baud_rate));
        }

        let invalid = || LinkError::InvalidFraming(framing.to_string());

        let mut chars = framing.chars();
        let (Some(data), Some(parity), Some(stop), None) =
            (chars.next(), chars.next(), chars.next(), chars.next())
        else {
            return Err(invalid());
        };

        let data_bits = match data.to_digit(10) {
            Some(d @ 5..=8) => d as u8,
            _ => return Err(invalid()),
        };
        let parity = match parity.to_ascii_uppercase() {
            'N' => ParityMode::None,
            'E' => ParityMode::Even,
            'O' => ParityMode::Odd,
            _ => return Err(invalid()),
        };
        let stop_bits = match stop.to_digit(10) {
            Some(s @ 1..=2) => s as u8,
            _ => return Err(invalid()),
        };

        Ok(Self {
            baud_rate,
            data_bits,
            stop_bits,
            parity,
            flow_control: FlowControl::None,
        })
    }

    pub fn with_flow_control(mut self, flow_control: FlowControl) -> Self {
        self.flow_control = flow_control;
        self
    }

    /// Framing in the conventional short form, e.g. "8N1"
    pub fn framing(&self) -> String {
        let parity = match self.parity {
            ParityMode::None => 'N',
            ParityMode::Even => 'E',
            ParityMode::Odd => 'O',
        };
        format!("{}{}{}", self.data_bits, parity, self.stop_bits)
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self::new_8n1(DEFAULT_BAUD_RATE)
    }
}
