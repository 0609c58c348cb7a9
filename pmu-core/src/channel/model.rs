//! Configured channel and its record encoding
//!
//! A [`Channel`] is what the configurator defines: id, name, flags,
//! hardware binding and the typed configuration. Records are decoded and
//! validated in one step so an invalid channel is never built.

use heapless::{String, Vec};

use super::types::{
    ChannelDisplay, ChannelFlags, ChannelId, ChannelRef, ChannelType, HwBinding, HwDevice, CH_REF_NONE,
};
use crate::config::{
    split_record, CfgChannelHeader, ChannelConfig, LayoutError, WireConfig, MAX_CONFIG_SIZE,
};
use crate::validation::{
    validate_channel, validate_header, ValidationError, ValidationLimits, ValidationResult,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Name buffer capacity
pub const MAX_NAME_LEN: usize = 32;

/// Largest possible encoded record
pub const MAX_RECORD_SIZE: usize = CfgChannelHeader::SIZE + MAX_NAME_LEN + MAX_CONFIG_SIZE;

pub type ChannelName = String<MAX_NAME_LEN>;

/// Failure turning a record into a [`Channel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadError {
    /// The bytes do not form a record
    Layout(LayoutError),
    /// The record decoded but its contents are out of range
    Validation(ValidationError),
}

impl From<LayoutError> for LoadError {
    fn from(e: LayoutError) -> Self {
        LoadError::Layout(e)
    }
}

impl From<ValidationError> for LoadError {
    fn from(e: ValidationError) -> Self {
        LoadError::Validation(e)
    }
}

/// A configured channel
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Channel {
    pub id: ChannelId,
    pub name: ChannelName,
    pub flags: ChannelFlags,
    /// Current value (fixed-point, scale per `display.decimal_places`)
    pub value: i32,
    pub hw: HwBinding,
    /// Primary source for output channels
    pub source_id: ChannelRef,
    pub default_value: i32,
    pub display: ChannelDisplay,
    /// Type-specific configuration; also determines the channel type
    pub config: ChannelConfig,
}

impl Channel {
    /// Create an enabled, unnamed, unbound channel
    pub fn new(id: ChannelId, config: ChannelConfig) -> Self {
        let mut channel = Self {
            id,
            name: String::new(),
            flags: ChannelFlags::default(),
            value: 0,
            hw: HwBinding::UNBOUND,
            source_id: CH_REF_NONE,
            default_value: 0,
            display: ChannelDisplay::default(),
            config,
        };
        channel.display.decimal_places = decimal_places(&channel.config);
        channel.value = initial_value(&channel.config, 0);
        channel
    }

    /// Set the channel name
    pub fn with_name(mut self, name: &str) -> Result<Self, LayoutError> {
        self.name.clear();
        self.name.push_str(name).map_err(|_| LayoutError::NameTooLong)?;
        Ok(self)
    }

    pub fn with_source(mut self, source_id: ChannelRef) -> Self {
        self.source_id = source_id;
        self
    }

    pub fn with_hw(mut self, hw: HwBinding) -> Self {
        self.hw = hw;
        self
    }

    pub fn with_flags(mut self, flags: ChannelFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn channel_type(&self) -> ChannelType {
        self.config.channel_type()
    }

    /// Header describing this channel as a record
    pub fn header(&self) -> CfgChannelHeader {
        CfgChannelHeader {
            id: self.id,
            channel_type: self.channel_type().code(),
            flags: self.flags.bits(),
            hw_device: self.hw.device.code(),
            hw_index: self.hw.index,
            source_id: self.source_id,
            default_value: self.default_value,
            name_len: self.name.len() as u8,
            config_size: self.config.size() as u8,
        }
    }

    /// Run the full validation chain on this channel
    pub fn validate(&self, limits: &ValidationLimits) -> ValidationResult {
        validate_channel(&self.header(), &self.name, &self.config, limits)
    }

    /// Decode and validate one record from the front of `bytes`
    ///
    /// Returns the channel and the number of bytes consumed. Nothing is
    /// built unless the whole record passes validation.
    pub fn from_record(bytes: &[u8], limits: &ValidationLimits) -> Result<(Self, usize), LoadError> {
        let (header, name_bytes, payload, len) = split_record(bytes)?;

        if let Err(e) = validate_header(&header, limits) {
            warn!("Channel {} rejected: {}", header.id, e);
            return Err(e.into());
        }
        let kind = header.kind().ok_or(LayoutError::UnknownChannelType)?;
        let name = core::str::from_utf8(name_bytes).map_err(|_| LayoutError::InvalidUtf8)?;
        let config = ChannelConfig::decode(kind, payload)?;

        if let Err(e) = validate_channel(&header, name, &config, limits) {
            warn!("Channel {} rejected: {}", header.id, e);
            return Err(e.into());
        }

        let mut channel = Self::new(header.id, config).with_name(name)?;
        channel.flags = ChannelFlags::from_bits(header.flags);
        channel.hw = HwBinding::new(
            HwDevice::from_code(header.hw_device).unwrap_or_default(),
            header.hw_index,
        );
        channel.source_id = header.source_id;
        channel.default_value = header.default_value;
        channel.value = initial_value(&channel.config, header.default_value);

        debug!("Loaded channel {} ({}, {} bytes)", channel.id, kind, len);
        Ok((channel, len))
    }

    /// Encode as `header ‖ name ‖ payload`, returning the bytes written
    pub fn to_record(&self, buffer: &mut [u8]) -> Result<usize, LayoutError> {
        let header = self.header();
        let total = header.record_len();
        if buffer.len() < total {
            return Err(LayoutError::BufferTooSmall);
        }
        let mut len = header.encode(buffer)?;
        buffer[len..len + self.name.len()].copy_from_slice(self.name.as_bytes());
        len += self.name.len();
        len += self.config.encode(&mut buffer[len..])?;
        Ok(len)
    }

    /// Encode into a fixed-capacity vector
    pub fn to_record_vec(&self) -> Result<Vec<u8, MAX_RECORD_SIZE>, LayoutError> {
        let mut buf = [0u8; MAX_RECORD_SIZE];
        let len = self.to_record(&mut buf)?;
        Vec::from_slice(&buf[..len]).map_err(|_| LayoutError::BufferTooSmall)
    }
}

fn decimal_places(config: &ChannelConfig) -> u8 {
    match config {
        ChannelConfig::AnalogInput(c) => c.decimal_places,
        ChannelConfig::Number(c) => c.decimal_places,
        _ => 0,
    }
}

/// Value a channel holds before its first tick
pub(super) fn initial_value(config: &ChannelConfig, default_value: i32) -> i32 {
    match config {
        ChannelConfig::Number(c) => c.value,
        _ => default_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CfgDigitalInput, CfgLogic, CfgNumber};
    use crate::validation::{ValidationErrorKind, DEFAULT_LIMITS};

    fn and_gate() -> Channel {
        let mut cfg = CfgLogic {
            operation: 0,
            input_count: 2,
            ..Default::default()
        };
        cfg.inputs[0] = 1;
        cfg.inputs[1] = 2;
        Channel::new(10, ChannelConfig::Logic(cfg))
            .with_name("Fan request")
            .unwrap()
    }

    #[test]
    fn test_record_round_trip() {
        let channel = and_gate();
        let record = channel.to_record_vec().unwrap();
        assert_eq!(record.len(), 14 + 11 + 24);
        assert_eq!(&record[0..2], &10u16.to_le_bytes());
        assert_eq!(record[2], 0x21);
        assert_eq!(record[12], 11);
        assert_eq!(record[13], 24);

        let (decoded, used) = Channel::from_record(&record, &DEFAULT_LIMITS).unwrap();
        assert_eq!(used, record.len());
        assert_eq!(decoded, channel);
    }

    #[test]
    fn test_from_record_rejects_invalid() {
        let mut channel = and_gate();
        if let ChannelConfig::Logic(cfg) = &mut channel.config {
            cfg.input_count = 1;
        }
        let record = channel.to_record_vec().unwrap();
        match Channel::from_record(&record, &DEFAULT_LIMITS) {
            Err(LoadError::Validation(e)) => assert_eq!(e.kind, ValidationErrorKind::InputCount),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_from_record_truncated() {
        let record = and_gate().to_record_vec().unwrap();
        assert_eq!(
            Channel::from_record(&record[..record.len() - 1], &DEFAULT_LIMITS),
            Err(LoadError::Layout(LayoutError::Truncated))
        );
    }

    #[test]
    fn test_from_record_bad_utf8() {
        let mut record = and_gate().to_record_vec().unwrap();
        record[14] = 0xFF;
        assert_eq!(
            Channel::from_record(&record, &DEFAULT_LIMITS),
            Err(LoadError::Layout(LayoutError::InvalidUtf8))
        );
    }

    #[test]
    fn test_number_starts_at_configured_value() {
        let cfg = CfgNumber {
            value: 250,
            ..Default::default()
        };
        let channel = Channel::new(3, ChannelConfig::Number(cfg));
        assert_eq!(channel.value, 250);
    }

    #[test]
    fn test_name_too_long() {
        let result = Channel::new(1, ChannelConfig::DigitalInput(CfgDigitalInput::default()))
            .with_name("a name that is far too long for the buffer");
        assert_eq!(result, Err(LayoutError::NameTooLong));
    }
}
