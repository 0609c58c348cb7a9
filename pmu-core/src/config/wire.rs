//! Little-endian reader/writer for packed configuration structs
//!
//! Every configuration struct has a fixed wire size ([`WireConfig::SIZE`]);
//! fields are written back-to-back with no padding.

/// Errors decoding or encoding the packed layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayoutError {
    /// Input ended before the structure was complete
    Truncated,
    /// Bytes left over after a fixed-size structure
    TrailingBytes,
    /// Output buffer cannot hold the structure
    BufferTooSmall,
    /// Payload length does not match the structure size
    SizeMismatch,
    /// Type tag does not name a channel type
    UnknownChannelType,
    /// Channel name is not valid UTF-8
    InvalidUtf8,
    /// Channel name does not fit the name buffer
    NameTooLong,
}

/// Cursor over a little-endian byte slice
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Take the next `n` bytes
    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8], LayoutError> {
        if self.remaining() < n {
            return Err(LayoutError::Truncated);
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], LayoutError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    pub fn u8(&mut self) -> Result<u8, LayoutError> {
        Ok(self.array::<1>()?[0])
    }

    pub fn u16(&mut self) -> Result<u16, LayoutError> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    pub fn i16(&mut self) -> Result<i16, LayoutError> {
        Ok(i16::from_le_bytes(self.array()?))
    }

    pub fn u32(&mut self) -> Result<u32, LayoutError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    pub fn i32(&mut self) -> Result<i32, LayoutError> {
        Ok(i32::from_le_bytes(self.array()?))
    }

    pub fn u16_array<const N: usize>(&mut self) -> Result<[u16; N], LayoutError> {
        let mut out = [0u16; N];
        for v in out.iter_mut() {
            *v = self.u16()?;
        }
        Ok(out)
    }

    pub fn i16_array<const N: usize>(&mut self) -> Result<[i16; N], LayoutError> {
        let mut out = [0i16; N];
        for v in out.iter_mut() {
            *v = self.i16()?;
        }
        Ok(out)
    }

    pub fn i32_array<const N: usize>(&mut self) -> Result<[i32; N], LayoutError> {
        let mut out = [0i32; N];
        for v in out.iter_mut() {
            *v = self.i32()?;
        }
        Ok(out)
    }

    /// Fail if any input is left unread
    pub fn finish(&self) -> Result<(), LayoutError> {
        if self.remaining() != 0 {
            return Err(LayoutError::TrailingBytes);
        }
        Ok(())
    }
}

/// Cursor writing little-endian values into a byte slice
pub struct WireWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> WireWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) -> Result<(), LayoutError> {
        let end = self.pos + bytes.len();
        if end > self.buf.len() {
            return Err(LayoutError::BufferTooSmall);
        }
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    pub fn put_u8(&mut self, v: u8) -> Result<(), LayoutError> {
        self.put_bytes(&[v])
    }

    pub fn put_u16(&mut self, v: u16) -> Result<(), LayoutError> {
        self.put_bytes(&v.to_le_bytes())
    }

    pub fn put_i16(&mut self, v: i16) -> Result<(), LayoutError> {
        self.put_bytes(&v.to_le_bytes())
    }

    pub fn put_u32(&mut self, v: u32) -> Result<(), LayoutError> {
        self.put_bytes(&v.to_le_bytes())
    }

    pub fn put_i32(&mut self, v: i32) -> Result<(), LayoutError> {
        self.put_bytes(&v.to_le_bytes())
    }

    pub fn put_u16_slice(&mut self, values: &[u16]) -> Result<(), LayoutError> {
        values.iter().try_for_each(|&v| self.put_u16(v))
    }

    pub fn put_i16_slice(&mut self, values: &[i16]) -> Result<(), LayoutError> {
        values.iter().try_for_each(|&v| self.put_i16(v))
    }

    pub fn put_i32_slice(&mut self, values: &[i32]) -> Result<(), LayoutError> {
        values.iter().try_for_each(|&v| self.put_i32(v))
    }
}

/// A fixed-size packed configuration structure
pub trait WireConfig: Sized {
    /// Exact encoded size in bytes
    const SIZE: usize;

    fn read(r: &mut WireReader<'_>) -> Result<Self, LayoutError>;

    fn write(&self, w: &mut WireWriter<'_>) -> Result<(), LayoutError>;

    /// Decode from a slice of exactly [`Self::SIZE`] bytes
    fn decode(bytes: &[u8]) -> Result<Self, LayoutError> {
        if bytes.len() < Self::SIZE {
            return Err(LayoutError::Truncated);
        }
        let mut r = WireReader::new(bytes);
        let value = Self::read(&mut r)?;
        r.finish()?;
        Ok(value)
    }

    /// Encode into `buffer`, returning the number of bytes written
    fn encode(&self, buffer: &mut [u8]) -> Result<usize, LayoutError> {
        if buffer.len() < Self::SIZE {
            return Err(LayoutError::BufferTooSmall);
        }
        let mut w = WireWriter::new(&mut buffer[..Self::SIZE]);
        self.write(&mut w)?;
        if w.position() != Self::SIZE {
            return Err(LayoutError::SizeMismatch);
        }
        Ok(Self::SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_little_endian() {
        let bytes = [0x34, 0x12, 0xFE, 0xFF, 0xFF, 0xFF, 0x01];
        let mut r = WireReader::new(&bytes);
        assert_eq!(r.u16().unwrap(), 0x1234);
        assert_eq!(r.i32().unwrap(), -2);
        assert_eq!(r.remaining(), 1);
        assert_eq!(r.finish(), Err(LayoutError::TrailingBytes));
        assert_eq!(r.u8().unwrap(), 1);
        assert_eq!(r.u8(), Err(LayoutError::Truncated));
    }

    #[test]
    fn test_writer_bounds() {
        let mut buf = [0u8; 3];
        let mut w = WireWriter::new(&mut buf);
        w.put_u16(0xBEEF).unwrap();
        assert_eq!(w.put_u16(1), Err(LayoutError::BufferTooSmall));
        w.put_u8(7).unwrap();
        assert_eq!(buf, [0xEF, 0xBE, 7]);
    }

    #[test]
    fn test_arrays() {
        let mut buf = [0u8; 8];
        let mut w = WireWriter::new(&mut buf);
        w.put_i16_slice(&[-1, 2]).unwrap();
        w.put_i32_slice(&[0x0102_0304]).unwrap();
        let mut r = WireReader::new(&buf);
        assert_eq!(r.i16_array::<2>().unwrap(), [-1, 2]);
        assert_eq!(r.i32().unwrap(), 0x0102_0304);
    }
}
