//! Shared channel vocabulary: ids, type tags, flags, hardware bindings

use crate::config::{
    CfgAnalogInput, CfgCanInput, CfgCanOutput, CfgCounter, CfgDigitalInput, CfgFilter,
    CfgFlipFlop, CfgFrequencyInput, CfgHBridge, CfgHysteresis, CfgLogic, CfgMath, CfgNumber,
    CfgPid, CfgPowerOutput, CfgPwmOutput, CfgSwitch, CfgTable2D, CfgTable3D, CfgTimer, WireConfig,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Channel identifier, valid range `1..=max_channel_id`
pub type ChannelId = u16;

/// A configuration field naming another channel as an input
pub type ChannelRef = u16;

/// "Unconnected" reference; resolves to 0
pub const CH_REF_NONE: ChannelRef = 0xFFFF;

/// Reserved "no channel" id; also resolves to 0
pub const CH_ID_NONE: ChannelId = 0;

/// Check if a reference names a real channel
#[inline]
pub const fn is_connected(r: ChannelRef) -> bool {
    r != CH_REF_NONE && r != CH_ID_NONE
}

/// Channel type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum ChannelType {
    DigitalInput = 0x01,
    AnalogInput = 0x02,
    FrequencyInput = 0x03,
    CanInput = 0x04,
    PowerOutput = 0x10,
    PwmOutput = 0x11,
    HBridge = 0x12,
    CanOutput = 0x13,
    Timer = 0x20,
    Logic = 0x21,
    Math = 0x22,
    Table2D = 0x23,
    Table3D = 0x24,
    Filter = 0x25,
    Pid = 0x26,
    Number = 0x27,
    Switch = 0x28,
    Counter = 0x29,
    FlipFlop = 0x2A,
    Hysteresis = 0x2B,
}

impl ChannelType {
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0x01 => Self::DigitalInput,
            0x02 => Self::AnalogInput,
            0x03 => Self::FrequencyInput,
            0x04 => Self::CanInput,
            0x10 => Self::PowerOutput,
            0x11 => Self::PwmOutput,
            0x12 => Self::HBridge,
            0x13 => Self::CanOutput,
            0x20 => Self::Timer,
            0x21 => Self::Logic,
            0x22 => Self::Math,
            0x23 => Self::Table2D,
            0x24 => Self::Table3D,
            0x25 => Self::Filter,
            0x26 => Self::Pid,
            0x27 => Self::Number,
            0x28 => Self::Switch,
            0x29 => Self::Counter,
            0x2A => Self::FlipFlop,
            0x2B => Self::Hysteresis,
            _ => return None,
        })
    }

    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Payload size in bytes for this type
    pub const fn config_size(self) -> usize {
        match self {
            Self::DigitalInput => CfgDigitalInput::SIZE,
            Self::AnalogInput => CfgAnalogInput::SIZE,
            Self::FrequencyInput => CfgFrequencyInput::SIZE,
            Self::CanInput => CfgCanInput::SIZE,
            Self::PowerOutput => CfgPowerOutput::SIZE,
            Self::PwmOutput => CfgPwmOutput::SIZE,
            Self::HBridge => CfgHBridge::SIZE,
            Self::CanOutput => CfgCanOutput::SIZE,
            Self::Timer => CfgTimer::SIZE,
            Self::Logic => CfgLogic::SIZE,
            Self::Math => CfgMath::SIZE,
            Self::Table2D => CfgTable2D::SIZE,
            Self::Table3D => CfgTable3D::SIZE,
            Self::Filter => CfgFilter::SIZE,
            Self::Pid => CfgPid::SIZE,
            Self::Number => CfgNumber::SIZE,
            Self::Switch => CfgSwitch::SIZE,
            Self::Counter => CfgCounter::SIZE,
            Self::FlipFlop => CfgFlipFlop::SIZE,
            Self::Hysteresis => CfgHysteresis::SIZE,
        }
    }

    pub const fn is_input(self) -> bool {
        matches!(
            self,
            Self::DigitalInput | Self::AnalogInput | Self::FrequencyInput | Self::CanInput
        )
    }

    pub const fn is_output(self) -> bool {
        matches!(
            self,
            Self::PowerOutput | Self::PwmOutput | Self::HBridge | Self::CanOutput
        )
    }

    /// Pure logic channel with no hardware behind it
    pub const fn is_virtual(self) -> bool {
        !self.is_input() && !self.is_output()
    }

    /// Check if the type must be bound to an on-board device
    ///
    /// CAN channels are addressed through their own configuration instead.
    pub const fn needs_hardware(self) -> bool {
        matches!(
            self,
            Self::DigitalInput
                | Self::AnalogInput
                | Self::FrequencyInput
                | Self::PowerOutput
                | Self::PwmOutput
                | Self::HBridge
        )
    }
}

/// Channel flag bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelFlags(u8);

impl ChannelFlags {
    pub const NONE: Self = Self(0);
    pub const ENABLED: Self = Self(0x01);
    pub const INVERTED: Self = Self(0x02);
    /// Created by firmware, not by the user
    pub const BUILTIN: Self = Self(0x04);
    /// Value cannot be written by the user
    pub const READONLY: Self = Self(0x08);
    /// Not shown in the configurator
    pub const HIDDEN: Self = Self(0x10);
    /// Set by the hardware layer while the bound device reports a fault
    pub const FAULT: Self = Self(0x20);
    /// Every defined bit
    pub const ALL: Self = Self(0x3F);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Bits outside [`Self::ALL`]
    pub const fn unknown_bits(self) -> u8 {
        self.0 & !Self::ALL.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    pub fn set(&mut self, other: Self, on: bool) {
        if on {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }

    pub const fn is_enabled(self) -> bool {
        self.contains(Self::ENABLED)
    }

    pub const fn is_inverted(self) -> bool {
        self.contains(Self::INVERTED)
    }

    pub const fn is_readonly(self) -> bool {
        self.contains(Self::READONLY)
    }

    pub const fn has_fault(self) -> bool {
        self.contains(Self::FAULT)
    }
}

impl Default for ChannelFlags {
    fn default() -> Self {
        Self::ENABLED
    }
}

impl core::ops::BitOr for ChannelFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Kind of on-board device a channel is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum HwDevice {
    #[default]
    None = 0,
    Gpio = 1,
    Adc = 2,
    Pwm = 3,
    Profet = 4,
    HBridge = 5,
    Can = 6,
    Lin = 7,
    Freq = 8,
}

impl HwDevice {
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::None,
            1 => Self::Gpio,
            2 => Self::Adc,
            3 => Self::Pwm,
            4 => Self::Profet,
            5 => Self::HBridge,
            6 => Self::Can,
            7 => Self::Lin,
            8 => Self::Freq,
            _ => return None,
        })
    }

    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Hardware binding: device kind and pin/instance index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HwBinding {
    pub device: HwDevice,
    pub index: u8,
}

impl HwBinding {
    pub const UNBOUND: Self = Self {
        device: HwDevice::None,
        index: 0,
    };

    pub const fn new(device: HwDevice, index: u8) -> Self {
        Self { device, index }
    }

    pub const fn is_bound(&self) -> bool {
        !matches!(self.device, HwDevice::None)
    }
}

/// Unit string capacity
pub const MAX_UNIT_LEN: usize = 8;

/// How the configurator presents a channel value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelDisplay {
    pub unit: heapless::String<MAX_UNIT_LEN>,
    /// Fixed-point position: a value of 1234 with 2 places shows as 12.34
    pub decimal_places: u8,
    pub min: i32,
    pub max: i32,
}
