//! Common channel record header

use super::wire::{LayoutError, WireConfig, WireReader, WireWriter};
use crate::channel::{ChannelId, ChannelRef, ChannelType};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Header preceding every channel record
///
/// A record is `header ‖ name (name_len bytes, UTF-8) ‖ payload
/// (config_size bytes)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CfgChannelHeader {
    pub id: ChannelId,
    /// [`ChannelType`] tag
    pub channel_type: u8,
    /// [`crate::channel::ChannelFlags`] bits
    pub flags: u8,
    /// [`crate::channel::HwDevice`] code
    pub hw_device: u8,
    pub hw_index: u8,
    /// Primary source channel for outputs, [`crate::channel::CH_REF_NONE`] if unused
    pub source_id: ChannelRef,
    pub default_value: i32,
    pub name_len: u8,
    pub config_size: u8,
}

impl CfgChannelHeader {
    /// Decoded type tag
    pub fn kind(&self) -> Option<ChannelType> {
        ChannelType::from_code(self.channel_type)
    }

    /// Length of the whole record this header announces
    pub fn record_len(&self) -> usize {
        Self::SIZE + self.name_len as usize + self.config_size as usize
    }
}

impl WireConfig for CfgChannelHeader {
    const SIZE: usize = 2 + 1 + 1 + 1 + 1 + 2 + 4 + 1 + 1;

    fn read(r: &mut WireReader<'_>) -> Result<Self, LayoutError> {
        Ok(Self {
            id: r.u16()?,
            channel_type: r.u8()?,
            flags: r.u8()?,
            hw_device: r.u8()?,
            hw_index: r.u8()?,
            source_id: r.u16()?,
            default_value: r.i32()?,
            name_len: r.u8()?,
            config_size: r.u8()?,
        })
    }

    fn write(&self, w: &mut WireWriter<'_>) -> Result<(), LayoutError> {
        w.put_u16(self.id)?;
        w.put_u8(self.channel_type)?;
        w.put_u8(self.flags)?;
        w.put_u8(self.hw_device)?;
        w.put_u8(self.hw_index)?;
        w.put_u16(self.source_id)?;
        w.put_i32(self.default_value)?;
        w.put_u8(self.name_len)?;
        w.put_u8(self.config_size)
    }
}

const _: () = assert!(CfgChannelHeader::SIZE == 14);
