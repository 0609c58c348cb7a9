//! Packed binary configuration
//!
//! A configuration image is a sequence of channel records; each record is
//! `header ‖ name ‖ payload` with the payload layout selected by the
//! header's type tag. All integers are little-endian and structures are
//! packed.

mod blocks;
mod header;
mod inputs;
mod outputs;
mod tables;
mod wire;

pub use blocks::{
    CfgCounter, CfgFilter, CfgFlipFlop, CfgHysteresis, CfgLogic, CfgMath, CfgNumber, CfgPid,
    CfgSwitch, CfgTimer, MAX_SWITCH_CASES,
};
pub use header::CfgChannelHeader;
pub use inputs::{ByteOrder, CfgAnalogInput, CfgCanInput, CfgDigitalInput, CfgFrequencyInput};
pub use outputs::{CfgCanOutput, CfgHBridge, CfgPowerOutput, CfgPwmOutput, HBridgeMode, DUTY_FULL_SCALE};
pub use tables::{CfgTable2D, CfgTable3D, MAX_TABLE_2D_POINTS, MAX_TABLE_3D_POINTS};
pub use wire::{LayoutError, WireConfig, WireReader, WireWriter};

use crate::channel::ChannelType;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest payload of any channel type
pub const MAX_CONFIG_SIZE: usize = CfgTable3D::SIZE;

/// Type-specific configuration of a channel
///
/// The variant is the channel type; there is no separate tag that could
/// disagree with the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChannelConfig {
    DigitalInput(CfgDigitalInput),
    AnalogInput(CfgAnalogInput),
    FrequencyInput(CfgFrequencyInput),
    CanInput(CfgCanInput),
    PowerOutput(CfgPowerOutput),
    PwmOutput(CfgPwmOutput),
    HBridge(CfgHBridge),
    CanOutput(CfgCanOutput),
    Timer(CfgTimer),
    Logic(CfgLogic),
    Math(CfgMath),
    Table2D(CfgTable2D),
    Table3D(CfgTable3D),
    Filter(CfgFilter),
    Pid(CfgPid),
    Number(CfgNumber),
    Switch(CfgSwitch),
    Counter(CfgCounter),
    FlipFlop(CfgFlipFlop),
    Hysteresis(CfgHysteresis),
}

impl ChannelConfig {
    pub fn channel_type(&self) -> ChannelType {
        match self {
            Self::DigitalInput(_) => ChannelType::DigitalInput,
            Self::AnalogInput(_) => ChannelType::AnalogInput,
            Self::FrequencyInput(_) => ChannelType::FrequencyInput,
            Self::CanInput(_) => ChannelType::CanInput,
            Self::PowerOutput(_) => ChannelType::PowerOutput,
            Self::PwmOutput(_) => ChannelType::PwmOutput,
            Self::HBridge(_) => ChannelType::HBridge,
            Self::CanOutput(_) => ChannelType::CanOutput,
            Self::Timer(_) => ChannelType::Timer,
            Self::Logic(_) => ChannelType::Logic,
            Self::Math(_) => ChannelType::Math,
            Self::Table2D(_) => ChannelType::Table2D,
            Self::Table3D(_) => ChannelType::Table3D,
            Self::Filter(_) => ChannelType::Filter,
            Self::Pid(_) => ChannelType::Pid,
            Self::Number(_) => ChannelType::Number,
            Self::Switch(_) => ChannelType::Switch,
            Self::Counter(_) => ChannelType::Counter,
            Self::FlipFlop(_) => ChannelType::FlipFlop,
            Self::Hysteresis(_) => ChannelType::Hysteresis,
        }
    }

    /// Default configuration for a channel type
    pub fn default_for(kind: ChannelType) -> Self {
        match kind {
            ChannelType::DigitalInput => Self::DigitalInput(Default::default()),
            ChannelType::AnalogInput => Self::AnalogInput(Default::default()),
            ChannelType::FrequencyInput => Self::FrequencyInput(Default::default()),
            ChannelType::CanInput => Self::CanInput(Default::default()),
            ChannelType::PowerOutput => Self::PowerOutput(Default::default()),
            ChannelType::PwmOutput => Self::PwmOutput(Default::default()),
            ChannelType::HBridge => Self::HBridge(Default::default()),
            ChannelType::CanOutput => Self::CanOutput(Default::default()),
            ChannelType::Timer => Self::Timer(Default::default()),
            ChannelType::Logic => Self::Logic(Default::default()),
            ChannelType::Math => Self::Math(Default::default()),
            ChannelType::Table2D => Self::Table2D(Default::default()),
            ChannelType::Table3D => Self::Table3D(Default::default()),
            ChannelType::Filter => Self::Filter(Default::default()),
            ChannelType::Pid => Self::Pid(Default::default()),
            ChannelType::Number => Self::Number(Default::default()),
            ChannelType::Switch => Self::Switch(Default::default()),
            ChannelType::Counter => Self::Counter(Default::default()),
            ChannelType::FlipFlop => Self::FlipFlop(Default::default()),
            ChannelType::Hysteresis => Self::Hysteresis(Default::default()),
        }
    }

    /// Encoded payload size
    pub fn size(&self) -> usize {
        self.channel_type().config_size()
    }

    /// Decode a payload of the given type
    pub fn decode(kind: ChannelType, bytes: &[u8]) -> Result<Self, LayoutError> {
        if bytes.len() != kind.config_size() {
            return Err(LayoutError::SizeMismatch);
        }
        Ok(match kind {
            ChannelType::DigitalInput => Self::DigitalInput(WireConfig::decode(bytes)?),
            ChannelType::AnalogInput => Self::AnalogInput(WireConfig::decode(bytes)?),
            ChannelType::FrequencyInput => Self::FrequencyInput(WireConfig::decode(bytes)?),
            ChannelType::CanInput => Self::CanInput(WireConfig::decode(bytes)?),
            ChannelType::PowerOutput => Self::PowerOutput(WireConfig::decode(bytes)?),
            ChannelType::PwmOutput => Self::PwmOutput(WireConfig::decode(bytes)?),
            ChannelType::HBridge => Self::HBridge(WireConfig::decode(bytes)?),
            ChannelType::CanOutput => Self::CanOutput(WireConfig::decode(bytes)?),
            ChannelType::Timer => Self::Timer(WireConfig::decode(bytes)?),
            ChannelType::Logic => Self::Logic(WireConfig::decode(bytes)?),
            ChannelType::Math => Self::Math(WireConfig::decode(bytes)?),
            ChannelType::Table2D => Self::Table2D(WireConfig::decode(bytes)?),
            ChannelType::Table3D => Self::Table3D(WireConfig::decode(bytes)?),
            ChannelType::Filter => Self::Filter(WireConfig::decode(bytes)?),
            ChannelType::Pid => Self::Pid(WireConfig::decode(bytes)?),
            ChannelType::Number => Self::Number(WireConfig::decode(bytes)?),
            ChannelType::Switch => Self::Switch(WireConfig::decode(bytes)?),
            ChannelType::Counter => Self::Counter(WireConfig::decode(bytes)?),
            ChannelType::FlipFlop => Self::FlipFlop(WireConfig::decode(bytes)?),
            ChannelType::Hysteresis => Self::Hysteresis(WireConfig::decode(bytes)?),
        })
    }

    /// Encode the payload into `buffer`, returning the bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, LayoutError> {
        match self {
            Self::DigitalInput(c) => c.encode(buffer),
            Self::AnalogInput(c) => c.encode(buffer),
            Self::FrequencyInput(c) => c.encode(buffer),
            Self::CanInput(c) => c.encode(buffer),
            Self::PowerOutput(c) => c.encode(buffer),
            Self::PwmOutput(c) => c.encode(buffer),
            Self::HBridge(c) => c.encode(buffer),
            Self::CanOutput(c) => c.encode(buffer),
            Self::Timer(c) => c.encode(buffer),
            Self::Logic(c) => c.encode(buffer),
            Self::Math(c) => c.encode(buffer),
            Self::Table2D(c) => c.encode(buffer),
            Self::Table3D(c) => c.encode(buffer),
            Self::Filter(c) => c.encode(buffer),
            Self::Pid(c) => c.encode(buffer),
            Self::Number(c) => c.encode(buffer),
            Self::Switch(c) => c.encode(buffer),
            Self::Counter(c) => c.encode(buffer),
            Self::FlipFlop(c) => c.encode(buffer),
            Self::Hysteresis(c) => c.encode(buffer),
        }
    }
}

/// Split one record off the front of `bytes`
///
/// Returns the header, raw name bytes, raw payload and the total record
/// length. No semantic checks are made here.
pub fn split_record(bytes: &[u8]) -> Result<(CfgChannelHeader, &[u8], &[u8], usize), LayoutError> {
    let mut r = WireReader::new(bytes);
    let header = CfgChannelHeader::read(&mut r)?;
    let name = r.bytes(header.name_len as usize)?;
    let payload = r.bytes(header.config_size as usize)?;
    Ok((header, name, payload, r.position()))
}

/// Iterate over the records of a configuration image
pub struct Records<'a> {
    bytes: &'a [u8],
}

impl<'a> Records<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }
}

impl<'a> Iterator for Records<'a> {
    /// Each item is the raw bytes of one record
    type Item = Result<&'a [u8], LayoutError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bytes.is_empty() {
            return None;
        }
        match split_record(self.bytes) {
            Ok((_, _, _, len)) => {
                let (record, rest) = self.bytes.split_at(len);
                self.bytes = rest;
                Some(Ok(record))
            }
            Err(e) => {
                self.bytes = &[];
                Some(Err(e))
            }
        }
    }
}
