//! Binary reader for ROOT's big-endian serialization format.

use crate::error::{Result, RootError};

/// Bit set on the first word of a streamed object when a byte count follows.
pub const BYTE_COUNT_MASK: u32 = 0x4000_0000;
/// Tag announcing a class name that has not been seen in this buffer yet.
pub const NEW_CLASS_TAG: u32 = 0xFFFF_FFFF;
/// Bit marking a tag as a reference to an earlier class entry.
pub const CLASS_MASK: u32 = 0x8000_0000;
/// Offset added to buffer positions when they are stored in the class map.
pub const MAP_OFFSET: u32 = 2;

/// `TObject::kIsReferenced`: a 2-byte process id follows the bits.
const K_IS_REFERENCED: u32 = 1 << 4;

/// A cursor-based reader over a byte slice, using ROOT's big-endian conventions.
pub struct RBuffer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> RBuffer<'a> {
    /// Create a new reader over the given bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current read position.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Total length of underlying buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Remaining bytes from current position.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Set read position absolutely.
    ///
    /// Positions past the end are rejected so that a corrupt byte count
    /// surfaces as an error instead of a later confusing underflow.
    pub fn set_pos(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(RootError::BufferUnderflow {
                offset: self.pos,
                need: pos - self.pos.min(pos),
                have: self.remaining(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    /// Skip `n` bytes forward.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    /// Read a sub-slice of `n` bytes, advancing the cursor.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        let v = self.data[self.pos];
        self.pos += 1;
        Ok(v)
    }

    /// Read a big-endian u16.
    pub fn read_u16(&mut self) -> Result<u16> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    /// Read a big-endian i16.
    pub fn read_i16(&mut self) -> Result<i16> {
        let b = self.read_bytes(2)?;
        Ok(i16::from_be_bytes([b[0], b[1]]))
    }

    /// Read a big-endian u32.
    pub fn read_u32(&mut self) -> Result<u32> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a big-endian i32.
    pub fn read_i32(&mut self) -> Result<i32> {
        let b = self.read_bytes(4)?;
        Ok(i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a big-endian u64.
    pub fn read_u64(&mut self) -> Result<u64> {
        let b = self.read_bytes(8)?;
        Ok(u64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
    }

    /// Read a big-endian f32.
    pub fn read_f32(&mut self) -> Result<f32> {
        let b = self.read_bytes(4)?;
        Ok(f32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a big-endian f64.
    pub fn read_f64(&mut self) -> Result<f64> {
        let b = self.read_bytes(8)?;
        Ok(f64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
    }

    /// Read a ROOT-encoded string (`TString` on disk).
    ///
    /// Format: length byte (if < 255), or 255 + u32 length, then UTF-8 bytes.
    pub fn read_string(&mut self) -> Result<String> {
        let first = self.read_u8()?;
        let len = if first == 255 { self.read_u32()? as usize } else { first as usize };
        if len == 0 {
            return Ok(String::new());
        }
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Read a NUL-terminated C string (used for class names after a new-class tag).
    pub fn read_cstring(&mut self) -> Result<String> {
        let rest = &self.data[self.pos.min(self.data.len())..];
        let nul = rest.iter().position(|&b| b == 0).ok_or_else(|| {
            RootError::Deserialization(format!("unterminated C string at offset {}", self.pos))
        })?;
        let s = String::from_utf8_lossy(&rest[..nul]).into_owned();
        self.pos += nul + 1;
        Ok(s)
    }

    /// Read a ROOT streamer version header.
    ///
    /// Returns `(version, end_pos)` where `end_pos` is the absolute buffer
    /// position where this streamed object ends (`None` if no byte-count header).
    ///
    /// ROOT sets [`BYTE_COUNT_MASK`] on the first u32 to signal that a byte
    /// count is present. The byte count spans from right after the u32 to the
    /// end of the object (it includes the version u16).
    pub fn read_version(&mut self) -> Result<(u16, Option<usize>)> {
        let start = self.pos;
        let raw = self.read_u32()?;
        if raw & BYTE_COUNT_MASK != 0 {
            let byte_count = (raw & !BYTE_COUNT_MASK) as usize;
            let version = self.read_u16()?;
            Ok((version, Some(start + 4 + byte_count)))
        } else {
            // No byte count: the first two bytes are the version.
            self.pos = start + 2;
            Ok(((raw >> 16) as u16, None))
        }
    }

    /// Move to `end` if it lies ahead of the cursor (end of a byte-counted object).
    pub fn seek_end(&mut self, end: Option<usize>) -> Result<()> {
        if let Some(end) = end
            && end > self.pos
        {
            self.set_pos(end)?;
        }
        Ok(())
    }

    /// Skip a byte-counted streamed object (or a null object pointer).
    ///
    /// Both an inline object (`bcnt | version | body`) and a tagged pointer
    /// (`bcnt | tag | body`) start with a masked byte count, so one rule covers
    /// both. A zero word is a null pointer.
    pub fn skip_object(&mut self) -> Result<()> {
        let start = self.pos;
        let raw = self.read_u32()?;
        if raw == 0 {
            return Ok(());
        }
        if raw & BYTE_COUNT_MASK != 0 {
            let byte_count = (raw & !BYTE_COUNT_MASK) as usize;
            return self.set_pos(start + 4 + byte_count);
        }
        Err(RootError::Deserialization(format!(
            "cannot skip object without byte count at offset {start} (word {raw:#010x})"
        )))
    }

    /// Read a `TObject` header: fUniqueID (u32) + fBits (u32).
    pub fn read_tobject(&mut self) -> Result<(u32, u32)> {
        let _ver = self.read_u16()?;
        let unique_id = self.read_u32()?;
        let bits = self.read_u32()?;
        if bits & K_IS_REFERENCED != 0 {
            self.skip(2)?;
        }
        Ok((unique_id, bits))
    }

    /// Read a `TNamed`: TObject + fName + fTitle.
    pub fn read_tnamed(&mut self) -> Result<(String, String)> {
        let (_ver, end) = self.read_version()?;
        self.read_tobject()?;
        let name = self.read_string()?;
        let title = self.read_string()?;
        self.seek_end(end)?;
        Ok((name, title))
    }

    /// Read `n` big-endian f64 values into a Vec.
    pub fn read_array_f64(&mut self, n: usize) -> Result<Vec<f64>> {
        self.ensure(n.saturating_mul(8))?;
        (0..n).map(|_| self.read_f64()).collect()
    }

    /// Read `n` big-endian f32 values, widened to f64.
    pub fn read_array_f32(&mut self, n: usize) -> Result<Vec<f64>> {
        self.ensure(n.saturating_mul(4))?;
        (0..n).map(|_| self.read_f32().map(f64::from)).collect()
    }

    /// Read a counted `TArrayD` (u32 length, then values).
    pub fn read_tarray_d(&mut self) -> Result<Vec<f64>> {
        let n = self.read_u32()? as usize;
        self.read_array_f64(n)
    }

    /// Read a `Double_t* //[fN]` member: a 1-byte presence flag, then `n` values.
    pub fn read_counted_f64(&mut self, n: usize) -> Result<Vec<f64>> {
        let present = self.read_u8()?;
        if present == 0 {
            return Ok(vec![0.0; n]);
        }
        self.read_array_f64(n)
    }

    // ── internal ────────────────────────────────────────────────

    fn ensure(&self, n: usize) -> Result<()> {
        if self.pos.saturating_add(n) > self.data.len() {
            return Err(RootError::BufferUnderflow {
                offset: self.pos,
                need: n,
                have: self.data.len().saturating_sub(self.pos),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_primitives() {
        // u32 big-endian: 0x01020304, then PI as f64
        let data = [0x01, 0x02, 0x03, 0x04, 0x40, 0x09, 0x21, 0xfb, 0x54, 0x44, 0x2d, 0x18];
        let mut r = RBuffer::new(&data);
        assert_eq!(r.read_u32().unwrap(), 0x0102_0304);
        assert!((r.read_f64().unwrap() - std::f64::consts::PI).abs() < 1e-15);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn read_string_short_and_long() {
        let data = [3, b'a', b'b', b'c'];
        let mut r = RBuffer::new(&data);
        assert_eq!(r.read_string().unwrap(), "abc");

        let mut long = vec![255u8];
        long.extend_from_slice(&300u32.to_be_bytes());
        long.extend(std::iter::repeat_n(b'x', 300));
        let mut r = RBuffer::new(&long);
        assert_eq!(r.read_string().unwrap().len(), 300);
    }

    #[test]
    fn read_cstring_stops_at_nul() {
        let data = b"TH1D\0rest";
        let mut r = RBuffer::new(data);
        assert_eq!(r.read_cstring().unwrap(), "TH1D");
        assert_eq!(r.pos(), 5);
        assert!(RBuffer::new(b"abc").read_cstring().is_err());
    }

    #[test]
    fn read_version_with_bytecount() {
        let mut data = Vec::new();
        data.extend_from_slice(&0x4000_0010u32.to_be_bytes());
        data.extend_from_slice(&3u16.to_be_bytes());
        data.extend_from_slice(&[0u8; 20]);
        let mut r = RBuffer::new(&data);
        let (ver, end) = r.read_version().unwrap();
        assert_eq!(ver, 3);
        // end_pos = start(0) + 4 + 16
        assert_eq!(end, Some(20));
    }

    #[test]
    fn read_version_without_bytecount() {
        let data = [0x00, 0x05, 0x00, 0x00];
        let mut r = RBuffer::new(&data);
        let (ver, end) = r.read_version().unwrap();
        assert_eq!(ver, 5);
        assert!(end.is_none());
        assert_eq!(r.pos(), 2);
    }

    #[test]
    fn skip_object_handles_null_and_counted() {
        let mut data = Vec::new();
        data.extend_from_slice(&0u32.to_be_bytes());
        data.extend_from_slice(&0x4000_0004u32.to_be_bytes());
        data.extend_from_slice(&[9, 9, 9, 9]);
        data.push(0x7f);
        let mut r = RBuffer::new(&data);
        r.skip_object().unwrap();
        assert_eq!(r.pos(), 4);
        r.skip_object().unwrap();
        assert_eq!(r.read_u8().unwrap(), 0x7f);
    }

    #[test]
    fn set_pos_past_end_is_an_error() {
        let mut r = RBuffer::new(&[0u8; 4]);
        assert!(r.set_pos(4).is_ok());
        assert!(matches!(r.set_pos(5), Err(RootError::BufferUnderflow { .. })));
    }
}
