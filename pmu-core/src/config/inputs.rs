//! Physical and CAN input channel configurations

use pmu_blocks::EdgeMode;

use super::wire::{LayoutError, WireConfig, WireReader, WireWriter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Byte order of a CAN signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ByteOrder {
    /// Little endian ("Intel")
    #[default]
    Intel,
    /// Big endian ("Motorola")
    Motorola,
}

impl ByteOrder {
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Intel),
            1 => Some(Self::Motorola),
            _ => None,
        }
    }
}

/// Digital input: switch or sensor on a GPIO
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CfgDigitalInput {
    pub active_high: u8,
    pub use_pullup: u8,
    pub debounce_ms: u16,
}

impl Default for CfgDigitalInput {
    fn default() -> Self {
        Self {
            active_high: 1,
            use_pullup: 0,
            debounce_ms: 20,
        }
    }
}

impl CfgDigitalInput {
    pub fn is_active_high(&self) -> bool {
        self.active_high != 0
    }
}

impl WireConfig for CfgDigitalInput {
    const SIZE: usize = 1 + 1 + 2;

    fn read(r: &mut WireReader<'_>) -> Result<Self, LayoutError> {
        Ok(Self {
            active_high: r.u8()?,
            use_pullup: r.u8()?,
            debounce_ms: r.u16()?,
        })
    }

    fn write(&self, w: &mut WireWriter<'_>) -> Result<(), LayoutError> {
        w.put_u8(self.active_high)?;
        w.put_u8(self.use_pullup)?;
        w.put_u16(self.debounce_ms)
    }
}

/// Analog input: ADC counts mapped linearly to engineering units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CfgAnalogInput {
    pub in_min: i32,
    pub in_max: i32,
    pub out_min: i32,
    pub out_max: i32,
    /// Low-pass time constant, 0 = unfiltered
    pub filter_ms: u16,
    pub decimal_places: u8,
    pub reserved: u8,
}

impl Default for CfgAnalogInput {
    fn default() -> Self {
        Self {
            in_min: 0,
            in_max: 4095,
            out_min: 0,
            out_max: 5000,
            filter_ms: 0,
            decimal_places: 0,
            reserved: 0,
        }
    }
}

impl WireConfig for CfgAnalogInput {
    const SIZE: usize = 4 * 4 + 2 + 1 + 1;

    fn read(r: &mut WireReader<'_>) -> Result<Self, LayoutError> {
        Ok(Self {
            in_min: r.i32()?,
            in_max: r.i32()?,
            out_min: r.i32()?,
            out_max: r.i32()?,
            filter_ms: r.u16()?,
            decimal_places: r.u8()?,
            reserved: r.u8()?,
        })
    }

    fn write(&self, w: &mut WireWriter<'_>) -> Result<(), LayoutError> {
        w.put_i32(self.in_min)?;
        w.put_i32(self.in_max)?;
        w.put_i32(self.out_min)?;
        w.put_i32(self.out_max)?;
        w.put_u16(self.filter_ms)?;
        w.put_u8(self.decimal_places)?;
        w.put_u8(self.reserved)
    }
}

/// Frequency / RPM input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CfgFrequencyInput {
    /// Report 0 after this long without an edge
    pub timeout_ms: u16,
    /// [`EdgeMode`] code of the counted edge
    pub edge_mode: u8,
    pub pulses_per_rev: u8,
    pub multiplier: i32,
    pub divider: i32,
}

impl Default for CfgFrequencyInput {
    fn default() -> Self {
        Self {
            timeout_ms: 1000,
            edge_mode: EdgeMode::Rising.code(),
            pulses_per_rev: 1,
            multiplier: 1,
            divider: 1,
        }
    }
}

impl CfgFrequencyInput {
    pub fn edge(&self) -> Option<EdgeMode> {
        EdgeMode::from_code(self.edge_mode)
    }
}

impl WireConfig for CfgFrequencyInput {
    const SIZE: usize = 2 + 1 + 1 + 4 + 4;

    fn read(r: &mut WireReader<'_>) -> Result<Self, LayoutError> {
        Ok(Self {
            timeout_ms: r.u16()?,
            edge_mode: r.u8()?,
            pulses_per_rev: r.u8()?,
            multiplier: r.i32()?,
            divider: r.i32()?,
        })
    }

    fn write(&self, w: &mut WireWriter<'_>) -> Result<(), LayoutError> {
        w.put_u16(self.timeout_ms)?;
        w.put_u8(self.edge_mode)?;
        w.put_u8(self.pulses_per_rev)?;
        w.put_i32(self.multiplier)?;
        w.put_i32(self.divider)
    }
}

/// Signal extracted from a received CAN frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CfgCanInput {
    pub can_id: u32,
    pub bus: u8,
    pub start_bit: u8,
    pub bit_length: u8,
    /// [`ByteOrder`] code
    pub byte_order: u8,
    /// Report the default value after this long without a frame
    pub timeout_ms: u16,
    pub multiplier: i16,
    pub divider: i16,
    pub offset: i16,
}

impl Default for CfgCanInput {
    fn default() -> Self {
        Self {
            can_id: 0,
            bus: 0,
            start_bit: 0,
            bit_length: 8,
            byte_order: 0,
            timeout_ms: 500,
            multiplier: 1,
            divider: 1,
            offset: 0,
        }
    }
}

impl CfgCanInput {
    pub fn order(&self) -> Option<ByteOrder> {
        ByteOrder::from_code(self.byte_order)
    }
}

impl WireConfig for CfgCanInput {
    const SIZE: usize = 4 + 1 + 1 + 1 + 1 + 2 + 2 + 2 + 2;

    fn read(r: &mut WireReader<'_>) -> Result<Self, LayoutError> {
        Ok(Self {
            can_id: r.u32()?,
            bus: r.u8()?,
            start_bit: r.u8()?,
            bit_length: r.u8()?,
            byte_order: r.u8()?,
            timeout_ms: r.u16()?,
            multiplier: r.i16()?,
            divider: r.i16()?,
            offset: r.i16()?,
        })
    }

    fn write(&self, w: &mut WireWriter<'_>) -> Result<(), LayoutError> {
        w.put_u32(self.can_id)?;
        w.put_u8(self.bus)?;
        w.put_u8(self.start_bit)?;
        w.put_u8(self.bit_length)?;
        w.put_u8(self.byte_order)?;
        w.put_u16(self.timeout_ms)?;
        w.put_i16(self.multiplier)?;
        w.put_i16(self.divider)?;
        w.put_i16(self.offset)
    }
}

const _: () = assert!(CfgDigitalInput::SIZE == 4);
const _: () = assert!(CfgAnalogInput::SIZE == 20);
const _: () = assert!(CfgFrequencyInput::SIZE == 12);
const _: () = assert!(CfgCanInput::SIZE == 16);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analog_input_layout() {
        let cfg = CfgAnalogInput {
            in_min: 1,
            in_max: 2,
            out_min: -3,
            out_max: 4,
            filter_ms: 0x0102,
            decimal_places: 2,
            reserved: 0,
        };
        let mut buf = [0u8; 20];
        assert_eq!(cfg.encode(&mut buf).unwrap(), 20);
        assert_eq!(&buf[8..12], &(-3i32).to_le_bytes());
        assert_eq!(&buf[16..19], &[0x02, 0x01, 2]);
        assert_eq!(CfgAnalogInput::decode(&buf).unwrap(), cfg);
    }

    #[test]
    fn test_decode_wrong_length() {
        assert_eq!(
            CfgDigitalInput::decode(&[1, 0, 5]),
            Err(LayoutError::Truncated)
        );
        assert_eq!(
            CfgDigitalInput::decode(&[1, 0, 5, 0, 0]),
            Err(LayoutError::TrailingBytes)
        );
    }

    #[test]
    fn test_can_input_signed_fields() {
        let cfg = CfgCanInput {
            multiplier: -2,
            offset: -40,
            ..Default::default()
        };
        let mut buf = [0u8; 16];
        cfg.encode(&mut buf).unwrap();
        assert_eq!(&buf[10..12], &(-2i16).to_le_bytes());
        assert_eq!(CfgCanInput::decode(&buf).unwrap().offset, -40);
    }
}
