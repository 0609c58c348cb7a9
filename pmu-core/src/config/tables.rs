//! Lookup table configurations
//!
//! Breakpoints and outputs are stored as `i16` to keep the records small;
//! the executor widens them to `i32` before interpolating.

use super::wire::{LayoutError, WireConfig, WireReader, WireWriter};
use crate::channel::{ChannelRef, CH_REF_NONE};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Points in a 1D table
pub const MAX_TABLE_2D_POINTS: usize = 16;
/// Points per axis in a 2D table
pub const MAX_TABLE_3D_POINTS: usize = 8;

/// 1D lookup table (`y = f(x)`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CfgTable2D {
    pub x_input: ChannelRef,
    pub count: u8,
    pub reserved: u8,
    /// Strictly increasing over the first `count` entries
    pub x_values: [i16; MAX_TABLE_2D_POINTS],
    pub y_values: [i16; MAX_TABLE_2D_POINTS],
}

impl Default for CfgTable2D {
    fn default() -> Self {
        Self {
            x_input: CH_REF_NONE,
            count: 0,
            reserved: 0,
            x_values: [0; MAX_TABLE_2D_POINTS],
            y_values: [0; MAX_TABLE_2D_POINTS],
        }
    }
}

impl CfgTable2D {
    pub fn point_count(&self) -> usize {
        (self.count as usize).min(MAX_TABLE_2D_POINTS)
    }

    /// Configured points widened to `i32`, and their count
    pub fn widened(&self) -> ([i32; MAX_TABLE_2D_POINTS], [i32; MAX_TABLE_2D_POINTS], usize) {
        (widen(&self.x_values), widen(&self.y_values), self.point_count())
    }
}

impl WireConfig for CfgTable2D {
    const SIZE: usize = 2 + 1 + 1 + 2 * MAX_TABLE_2D_POINTS * 2;

    fn read(r: &mut WireReader<'_>) -> Result<Self, LayoutError> {
        Ok(Self {
            x_input: r.u16()?,
            count: r.u8()?,
            reserved: r.u8()?,
            x_values: r.i16_array()?,
            y_values: r.i16_array()?,
        })
    }

    fn write(&self, w: &mut WireWriter<'_>) -> Result<(), LayoutError> {
        w.put_u16(self.x_input)?;
        w.put_u8(self.count)?;
        w.put_u8(self.reserved)?;
        w.put_i16_slice(&self.x_values)?;
        w.put_i16_slice(&self.y_values)
    }
}

/// 2D lookup map (`z = f(x, y)`), `z_values[y][x]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CfgTable3D {
    pub x_input: ChannelRef,
    pub y_input: ChannelRef,
    pub x_count: u8,
    pub y_count: u8,
    pub reserved: [u8; 2],
    pub x_values: [i16; MAX_TABLE_3D_POINTS],
    pub y_values: [i16; MAX_TABLE_3D_POINTS],
    pub z_values: [[i16; MAX_TABLE_3D_POINTS]; MAX_TABLE_3D_POINTS],
}

impl Default for CfgTable3D {
    fn default() -> Self {
        Self {
            x_input: CH_REF_NONE,
            y_input: CH_REF_NONE,
            x_count: 0,
            y_count: 0,
            reserved: [0; 2],
            x_values: [0; MAX_TABLE_3D_POINTS],
            y_values: [0; MAX_TABLE_3D_POINTS],
            z_values: [[0; MAX_TABLE_3D_POINTS]; MAX_TABLE_3D_POINTS],
        }
    }
}

impl CfgTable3D {
    pub fn x_count(&self) -> usize {
        (self.x_count as usize).min(MAX_TABLE_3D_POINTS)
    }

    pub fn y_count(&self) -> usize {
        (self.y_count as usize).min(MAX_TABLE_3D_POINTS)
    }

    /// Z grid widened to `i32`, flattened row-major with a stride of
    /// [`MAX_TABLE_3D_POINTS`]
    pub fn widened_z(&self) -> [i32; MAX_TABLE_3D_POINTS * MAX_TABLE_3D_POINTS] {
        let mut out = [0i32; MAX_TABLE_3D_POINTS * MAX_TABLE_3D_POINTS];
        for (row, src) in out.chunks_exact_mut(MAX_TABLE_3D_POINTS).zip(self.z_values.iter()) {
            row.copy_from_slice(&widen(src));
        }
        out
    }
}

impl WireConfig for CfgTable3D {
    const SIZE: usize = 2 + 2 + 1 + 1 + 2
        + 2 * MAX_TABLE_3D_POINTS * 2
        + 2 * MAX_TABLE_3D_POINTS * MAX_TABLE_3D_POINTS;

    fn read(r: &mut WireReader<'_>) -> Result<Self, LayoutError> {
        let x_input = r.u16()?;
        let y_input = r.u16()?;
        let x_count = r.u8()?;
        let y_count = r.u8()?;
        let reserved = [r.u8()?, r.u8()?];
        let x_values = r.i16_array()?;
        let y_values = r.i16_array()?;
        let mut z_values = [[0i16; MAX_TABLE_3D_POINTS]; MAX_TABLE_3D_POINTS];
        for row in z_values.iter_mut() {
            *row = r.i16_array()?;
        }
        Ok(Self {
            x_input,
            y_input,
            x_count,
            y_count,
            reserved,
            x_values,
            y_values,
            z_values,
        })
    }

    fn write(&self, w: &mut WireWriter<'_>) -> Result<(), LayoutError> {
        w.put_u16(self.x_input)?;
        w.put_u16(self.y_input)?;
        w.put_u8(self.x_count)?;
        w.put_u8(self.y_count)?;
        w.put_bytes(&self.reserved)?;
        w.put_i16_slice(&self.x_values)?;
        w.put_i16_slice(&self.y_values)?;
        self.z_values
            .iter()
            .try_for_each(|row| w.put_i16_slice(row))
    }
}

fn widen<const N: usize>(values: &[i16; N]) -> [i32; N] {
    let mut out = [0i32; N];
    for (dst, &src) in out.iter_mut().zip(values.iter()) {
        *dst = src as i32;
    }
    out
}

const _: () = assert!(CfgTable2D::SIZE == 68);
const _: () = assert!(CfgTable3D::SIZE == 168);
