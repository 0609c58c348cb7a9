//! Power, PWM, H-bridge and CAN output configurations

use super::inputs::ByteOrder;
use super::wire::{LayoutError, WireConfig, WireReader, WireWriter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Full scale of duty-cycle values (per-mille)
pub const DUTY_FULL_SCALE: i32 = 1000;

/// High-side switch (PROFET) output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CfgPowerOutput {
    pub current_limit_ma: u16,
    /// Limit allowed during the inrush window, 0 = same as steady state
    pub inrush_limit_ma: u16,
    pub inrush_time_ms: u16,
    pub retry_count: u8,
    /// Delay between retries, tenths of a second
    pub retry_delay_ds: u8,
    /// 0 = plain on/off
    pub pwm_frequency_hz: u16,
    pub soft_start_ms: u16,
}

impl Default for CfgPowerOutput {
    fn default() -> Self {
        Self {
            current_limit_ma: 10_000,
            inrush_limit_ma: 0,
            inrush_time_ms: 0,
            retry_count: 3,
            retry_delay_ds: 10,
            pwm_frequency_hz: 0,
            soft_start_ms: 0,
        }
    }
}

impl CfgPowerOutput {
    pub fn is_pwm(&self) -> bool {
        self.pwm_frequency_hz != 0
    }
}

impl WireConfig for CfgPowerOutput {
    const SIZE: usize = 2 + 2 + 2 + 1 + 1 + 2 + 2;

    fn read(r: &mut WireReader<'_>) -> Result<Self, LayoutError> {
        Ok(Self {
            current_limit_ma: r.u16()?,
            inrush_limit_ma: r.u16()?,
            inrush_time_ms: r.u16()?,
            retry_count: r.u8()?,
            retry_delay_ds: r.u8()?,
            pwm_frequency_hz: r.u16()?,
            soft_start_ms: r.u16()?,
        })
    }

    fn write(&self, w: &mut WireWriter<'_>) -> Result<(), LayoutError> {
        w.put_u16(self.current_limit_ma)?;
        w.put_u16(self.inrush_limit_ma)?;
        w.put_u16(self.inrush_time_ms)?;
        w.put_u8(self.retry_count)?;
        w.put_u8(self.retry_delay_ds)?;
        w.put_u16(self.pwm_frequency_hz)?;
        w.put_u16(self.soft_start_ms)
    }
}

/// Low-side PWM output; duties are per-mille
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CfgPwmOutput {
    pub frequency_hz: u16,
    pub min_duty: u16,
    pub max_duty: u16,
    /// Duty used while the source is not connected
    pub default_duty: u16,
}

impl Default for CfgPwmOutput {
    fn default() -> Self {
        Self {
            frequency_hz: 1000,
            min_duty: 0,
            max_duty: 1000,
            default_duty: 0,
        }
    }
}

impl WireConfig for CfgPwmOutput {
    const SIZE: usize = 2 * 4;

    fn read(r: &mut WireReader<'_>) -> Result<Self, LayoutError> {
        Ok(Self {
            frequency_hz: r.u16()?,
            min_duty: r.u16()?,
            max_duty: r.u16()?,
            default_duty: r.u16()?,
        })
    }

    fn write(&self, w: &mut WireWriter<'_>) -> Result<(), LayoutError> {
        w.put_u16(self.frequency_hz)?;
        w.put_u16(self.min_duty)?;
        w.put_u16(self.max_duty)?;
        w.put_u16(self.default_duty)
    }
}

/// Direction handling of an H-bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HBridgeMode {
    /// Signed command, negative drives in reverse
    Bidirectional,
    /// Negative commands are clamped to 0
    ForwardOnly,
}

impl HBridgeMode {
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Bidirectional),
            1 => Some(Self::ForwardOnly),
            _ => None,
        }
    }
}

/// H-bridge motor output; command is signed per-mille duty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CfgHBridge {
    /// [`HBridgeMode`] code
    pub mode: u8,
    pub brake_on_zero: u8,
    pub frequency_hz: u16,
    pub current_limit_ma: u16,
    /// Commands with magnitude at or below this drive 0
    pub deadband: u16,
    pub max_duty: u16,
    /// Pause at zero before changing direction
    pub reversal_delay_ms: u16,
}

impl Default for CfgHBridge {
    fn default() -> Self {
        Self {
            mode: 0,
            brake_on_zero: 1,
            frequency_hz: 20_000,
            current_limit_ma: 10_000,
            deadband: 0,
            max_duty: 1000,
            reversal_delay_ms: 0,
        }
    }
}

impl CfgHBridge {
    pub fn bridge_mode(&self) -> Option<HBridgeMode> {
        HBridgeMode::from_code(self.mode)
    }
}

impl WireConfig for CfgHBridge {
    const SIZE: usize = 1 + 1 + 2 * 5;

    fn read(r: &mut WireReader<'_>) -> Result<Self, LayoutError> {
        Ok(Self {
            mode: r.u8()?,
            brake_on_zero: r.u8()?,
            frequency_hz: r.u16()?,
            current_limit_ma: r.u16()?,
            deadband: r.u16()?,
            max_duty: r.u16()?,
            reversal_delay_ms: r.u16()?,
        })
    }

    fn write(&self, w: &mut WireWriter<'_>) -> Result<(), LayoutError> {
        w.put_u8(self.mode)?;
        w.put_u8(self.brake_on_zero)?;
        w.put_u16(self.frequency_hz)?;
        w.put_u16(self.current_limit_ma)?;
        w.put_u16(self.deadband)?;
        w.put_u16(self.max_duty)?;
        w.put_u16(self.reversal_delay_ms)
    }
}

/// Signal packed into a periodically transmitted CAN frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CfgCanOutput {
    pub can_id: u32,
    pub bus: u8,
    pub dlc: u8,
    pub start_bit: u8,
    pub bit_length: u8,
    pub period_ms: u16,
    /// [`ByteOrder`] code
    pub byte_order: u8,
    pub reserved: u8,
}

impl Default for CfgCanOutput {
    fn default() -> Self {
        Self {
            can_id: 0,
            bus: 0,
            dlc: 8,
            start_bit: 0,
            bit_length: 8,
            period_ms: 100,
            byte_order: 0,
            reserved: 0,
        }
    }
}

impl CfgCanOutput {
    pub fn order(&self) -> Option<ByteOrder> {
        ByteOrder::from_code(self.byte_order)
    }
}

impl WireConfig for CfgCanOutput {
    const SIZE: usize = 4 + 1 + 1 + 1 + 1 + 2 + 1 + 1;

    fn read(r: &mut WireReader<'_>) -> Result<Self, LayoutError> {
        Ok(Self {
            can_id: r.u32()?,
            bus: r.u8()?,
            dlc: r.u8()?,
            start_bit: r.u8()?,
            bit_length: r.u8()?,
            period_ms: r.u16()?,
            byte_order: r.u8()?,
            reserved: r.u8()?,
        })
    }

    fn write(&self, w: &mut WireWriter<'_>) -> Result<(), LayoutError> {
        w.put_u32(self.can_id)?;
        w.put_u8(self.bus)?;
        w.put_u8(self.dlc)?;
        w.put_u8(self.start_bit)?;
        w.put_u8(self.bit_length)?;
        w.put_u16(self.period_ms)?;
        w.put_u8(self.byte_order)?;
        w.put_u8(self.reserved)
    }
}

const _: () = assert!(CfgPowerOutput::SIZE == 12);
const _: () = assert!(CfgPwmOutput::SIZE == 8);
const _: () = assert!(CfgHBridge::SIZE == 12);
const _: () = assert!(CfgCanOutput::SIZE == 12);
