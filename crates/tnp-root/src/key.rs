//! TKey parsing: the record header ROOT uses to locate objects.

use crate::error::Result;
use crate::rbuffer::RBuffer;
use crate::wbuffer::WBuffer;

/// TKey class version for records with 32-bit seek pointers.
pub const KEY_VERSION_SMALL: u16 = 4;

/// Class names that denote a ROOT directory.
pub const DIRECTORY_CLASSES: &[&str] = &["TDirectory", "TDirectoryFile"];

/// A parsed TKey record.
#[derive(Debug, Clone)]
pub struct Key {
    /// Total number of bytes in compressed object + key header.
    pub n_bytes: u32,
    /// Version of key class.
    pub version: u16,
    /// Uncompressed object length.
    pub obj_len: u32,
    /// Key creation time (ROOT datime).
    pub datime: u32,
    /// Length of the key header itself.
    pub key_len: u16,
    /// Cycle number (ROOT versioning within a directory).
    pub cycle: u16,
    /// Absolute position of this key in the file.
    pub seek_key: u64,
    /// Parent directory seek position.
    pub seek_pdir: u64,
    /// Class name of the stored object.
    pub class_name: String,
    /// Object name.
    pub name: String,
    /// Object title.
    pub title: String,
}

/// Public info about a key (for `list_keys()`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    /// Object name.
    pub name: String,
    /// Object class name (e.g. "TH1D", "TDirectoryFile").
    pub class_name: String,
    /// Object title.
    pub title: String,
    /// Cycle number.
    pub cycle: u16,
}

impl KeyInfo {
    /// Create from an internal Key.
    pub fn from_key(key: &Key) -> Self {
        Self {
            name: key.name.clone(),
            class_name: key.class_name.clone(),
            title: key.title.clone(),
            cycle: key.cycle,
        }
    }

    /// Whether the key points at a subdirectory.
    pub fn is_directory(&self) -> bool {
        DIRECTORY_CLASSES.contains(&self.class_name.as_str())
    }
}

impl Key {
    /// Read a TKey from the buffer at the current position.
    ///
    /// Keys with `version > 1000` carry 64-bit seek pointers.
    pub fn read(r: &mut RBuffer) -> Result<Self> {
        let n_bytes = r.read_u32()?;
        let version = r.read_u16()?;
        let obj_len = r.read_u32()?;
        let datime = r.read_u32()?;
        let key_len = r.read_u16()?;
        let cycle = r.read_u16()?;

        let (seek_key, seek_pdir) = if version > 1000 {
            (r.read_u64()?, r.read_u64()?)
        } else {
            (r.read_u32()? as u64, r.read_u32()? as u64)
        };

        let class_name = r.read_string()?;
        let name = r.read_string()?;
        let title = r.read_string()?;

        Ok(Key {
            n_bytes,
            version,
            obj_len,
            datime,
            key_len,
            cycle,
            seek_key,
            seek_pdir,
            class_name,
            name,
            title,
        })
    }

    /// Serialize the key header (small-file layout unless `version > 1000`).
    pub fn write(&self, w: &mut WBuffer) {
        w.write_u32(self.n_bytes);
        w.write_u16(self.version);
        w.write_u32(self.obj_len);
        w.write_u32(self.datime);
        w.write_u16(self.key_len);
        w.write_u16(self.cycle);
        if self.version > 1000 {
            w.write_u64(self.seek_key);
            w.write_u64(self.seek_pdir);
        } else {
            w.write_u32(self.seek_key as u32);
            w.write_u32(self.seek_pdir as u32);
        }
        w.write_string(&self.class_name);
        w.write_string(&self.name);
        w.write_string(&self.title);
    }

    /// Header length of a small-layout key with the given strings.
    pub fn small_header_len(class_name: &str, name: &str, title: &str) -> u16 {
        let fixed = 4 + 2 + 4 + 4 + 2 + 2 + 4 + 4;
        (fixed
            + WBuffer::string_len(class_name)
            + WBuffer::string_len(name)
            + WBuffer::string_len(title)) as u16
    }

    /// Whether this key's object is a subdirectory.
    pub fn is_directory(&self) -> bool {
        DIRECTORY_CLASSES.contains(&self.class_name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trip_small_layout() {
        let key_len = Key::small_header_len("TH1D", "pt", "probe pt");
        let key = Key {
            n_bytes: 120,
            version: KEY_VERSION_SMALL,
            obj_len: 80,
            datime: 0,
            key_len,
            cycle: 2,
            seek_key: 400,
            seek_pdir: 100,
            class_name: "TH1D".into(),
            name: "pt".into(),
            title: "probe pt".into(),
        };
        let mut w = WBuffer::new();
        key.write(&mut w);
        assert_eq!(w.len(), key_len as usize);

        let bytes = w.into_inner();
        let back = Key::read(&mut RBuffer::new(&bytes)).unwrap();
        assert_eq!(back.name, "pt");
        assert_eq!(back.class_name, "TH1D");
        assert_eq!(back.cycle, 2);
        assert_eq!(back.seek_key, 400);
        assert_eq!(back.key_len, key_len);
        assert!(!back.is_directory());
    }
}
