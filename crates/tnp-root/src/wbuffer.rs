//! Big-endian writer mirroring [`RBuffer`](crate::rbuffer::RBuffer).

use crate::rbuffer::BYTE_COUNT_MASK;

/// A growable big-endian byte buffer with ROOT byte-count patching.
#[derive(Debug, Default, Clone)]
pub struct WBuffer {
    data: Vec<u8>,
}

impl WBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current length (also the position of the next write).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consume the buffer and return the bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Append raw bytes.
    pub fn write_bytes(&mut self, b: &[u8]) {
        self.data.extend_from_slice(b);
    }

    /// Append one byte.
    pub fn write_u8(&mut self, v: u8) {
        self.data.push(v);
    }

    /// Append a big-endian u16.
    pub fn write_u16(&mut self, v: u16) {
        self.write_bytes(&v.to_be_bytes());
    }

    /// Append a big-endian i16.
    pub fn write_i16(&mut self, v: i16) {
        self.write_bytes(&v.to_be_bytes());
    }

    /// Append a big-endian u32.
    pub fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_be_bytes());
    }

    /// Append a big-endian i32.
    pub fn write_i32(&mut self, v: i32) {
        self.write_bytes(&v.to_be_bytes());
    }

    /// Append a big-endian u64.
    pub fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_be_bytes());
    }

    /// Append a big-endian f32.
    pub fn write_f32(&mut self, v: f32) {
        self.write_bytes(&v.to_be_bytes());
    }

    /// Append a big-endian f64.
    pub fn write_f64(&mut self, v: f64) {
        self.write_bytes(&v.to_be_bytes());
    }

    /// Append a ROOT string (short or long length prefix).
    pub fn write_string(&mut self, s: &str) {
        let bytes = s.as_bytes();
        if bytes.len() < 255 {
            self.write_u8(bytes.len() as u8);
        } else {
            self.write_u8(255);
            self.write_u32(bytes.len() as u32);
        }
        self.write_bytes(bytes);
    }

    /// Append a NUL-terminated C string.
    pub fn write_cstring(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
        self.write_u8(0);
    }

    /// Encoded length of a ROOT string.
    pub fn string_len(s: &str) -> usize {
        let n = s.len();
        if n < 255 { 1 + n } else { 5 + n }
    }

    /// Reserve a byte-count word and write `version`; returns the patch position.
    pub fn begin_versioned(&mut self, version: u16) -> usize {
        let pos = self.begin_counted();
        self.write_u16(version);
        pos
    }

    /// Reserve a byte-count word without a version (tagged object pointers).
    pub fn begin_counted(&mut self) -> usize {
        let pos = self.len();
        self.write_u32(0);
        pos
    }

    /// Patch the byte count reserved at `pos` to cover everything written since.
    pub fn end_counted(&mut self, pos: usize) {
        let count = (self.len() - pos - 4) as u32 | BYTE_COUNT_MASK;
        self.patch_u32(pos, count);
    }

    /// Overwrite a u32 at an earlier position.
    pub fn patch_u32(&mut self, pos: usize, v: u32) {
        self.data[pos..pos + 4].copy_from_slice(&v.to_be_bytes());
    }

    /// Write a `TObject` header (version 1, no byte count).
    pub fn write_tobject(&mut self) {
        self.write_u16(1);
        self.write_u32(0);
        self.write_u32(0x0200_0000);
    }

    /// Write a `TNamed` (byte-counted, version 1).
    pub fn write_tnamed(&mut self, name: &str, title: &str) {
        let pos = self.begin_versioned(1);
        self.write_tobject();
        self.write_string(name);
        self.write_string(title);
        self.end_counted(pos);
    }

    /// Write a counted `TArrayD`.
    pub fn write_tarray_d(&mut self, values: &[f64]) {
        self.write_u32(values.len() as u32);
        for &v in values {
            self.write_f64(v);
        }
    }

    /// Write a `Double_t* //[fN]` member (presence flag + values).
    pub fn write_counted_f64(&mut self, values: &[f64]) {
        if values.is_empty() {
            self.write_u8(0);
            return;
        }
        self.write_u8(1);
        for &v in values {
            self.write_f64(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbuffer::RBuffer;

    #[test]
    fn versioned_block_reads_back_with_end_position() {
        let mut w = WBuffer::new();
        let pos = w.begin_versioned(7);
        w.write_f64(1.5);
        w.write_string("abc");
        w.end_counted(pos);
        w.write_u8(0xAA);

        let bytes = w.into_inner();
        let mut r = RBuffer::new(&bytes);
        let (ver, end) = r.read_version().unwrap();
        assert_eq!(ver, 7);
        assert_eq!(end, Some(bytes.len() - 1));
        assert_eq!(r.read_f64().unwrap(), 1.5);
        assert_eq!(r.read_string().unwrap(), "abc");
        assert_eq!(r.read_u8().unwrap(), 0xAA);
    }

    #[test]
    fn tnamed_round_trip() {
        let mut w = WBuffer::new();
        w.write_tnamed("eff", "efficiency;p_{T};#epsilon");
        let bytes = w.into_inner();
        let (name, title) = RBuffer::new(&bytes).read_tnamed().unwrap();
        assert_eq!(name, "eff");
        assert_eq!(title, "efficiency;p_{T};#epsilon");
    }
}
