//! TDirectory parsing and key-list navigation.

use crate::error::Result;
use crate::key::Key;
use crate::rbuffer::RBuffer;
use crate::wbuffer::WBuffer;

/// Location of a directory's key list, as stored in its TDirectory streamer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryHeader {
    /// Streamer version (> 1000 means 64-bit seeks).
    pub version: u16,
    /// Size of the key-list record.
    pub nbytes_keys: u32,
    /// Size of the directory's name record.
    pub nbytes_name: u32,
    /// Position of this directory's own record.
    pub seek_dir: u64,
    /// Position of the parent directory's record.
    pub seek_parent: u64,
    /// Position of the key-list record (0 for an empty directory).
    pub seek_keys: u64,
}

impl DirectoryHeader {
    /// Parse a TDirectory streamer at the current position.
    pub fn read(r: &mut RBuffer) -> Result<Self> {
        let version = r.read_u16()?;
        let _datime_c = r.read_u32()?;
        let _datime_m = r.read_u32()?;
        let nbytes_keys = r.read_u32()?;
        let nbytes_name = r.read_u32()?;

        let (seek_dir, seek_parent, seek_keys) = if version > 1000 {
            (r.read_u64()?, r.read_u64()?, r.read_u64()?)
        } else {
            (r.read_u32()? as u64, r.read_u32()? as u64, r.read_u32()? as u64)
        };

        Ok(Self { version, nbytes_keys, nbytes_name, seek_dir, seek_parent, seek_keys })
    }

    /// Serialize as a small (32-bit seek) TDirectory streamer followed by a null UUID.
    pub fn write(&self, w: &mut WBuffer, datime: u32) {
        w.write_u16(self.version);
        w.write_u32(datime);
        w.write_u32(datime);
        w.write_u32(self.nbytes_keys);
        w.write_u32(self.nbytes_name);
        w.write_u32(self.seek_dir as u32);
        w.write_u32(self.seek_parent as u32);
        w.write_u32(self.seek_keys as u32);
        w.write_u16(1); // UUID version
        w.write_bytes(&[0u8; 16]);
    }
}

/// Offset of `fNbytesKeys` inside a serialized TDirectory streamer.
pub const NBYTES_KEYS_OFFSET: usize = 2 + 4 + 4;
/// Offset of `fSeekKeys` inside a small TDirectory streamer.
pub const SEEK_KEYS_OFFSET: usize = NBYTES_KEYS_OFFSET + 4 + 4 + 4 + 4;
/// Length of a small TDirectory streamer including its UUID.
pub const SMALL_DIRECTORY_LEN: usize = SEEK_KEYS_OFFSET + 4 + 2 + 16;

/// A parsed TDirectory: an ordered list of TKeys.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    keys: Vec<Key>,
}

impl Directory {
    /// Read the key list from the file at `seek_keys`.
    ///
    /// The key list starts with a TKey header for the list itself, then
    /// a u32 `nkeys`, followed by `nkeys` TKey records.
    pub fn read_key_list(file_data: &[u8], seek_keys: usize) -> Result<Self> {
        let mut r = RBuffer::new(file_data);
        r.set_pos(seek_keys)?;

        let _list_key = Key::read(&mut r)?;
        let nkeys = r.read_u32()? as usize;

        let mut keys = Vec::with_capacity(nkeys.min(4096));
        for _ in 0..nkeys {
            keys.push(Key::read(&mut r)?);
        }

        Ok(Directory { keys })
    }

    /// Read a directory from the decompressed payload of a TDirectoryFile key.
    pub fn read_from_payload(payload: &[u8], file_data: &[u8]) -> Result<Self> {
        let header = DirectoryHeader::read(&mut RBuffer::new(payload))?;
        if header.seek_keys == 0 {
            return Ok(Directory::default());
        }
        Self::read_key_list(file_data, header.seek_keys as usize)
    }

    /// All keys, including older cycles, in file order.
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// One key per name (the highest cycle), in order of first appearance.
    pub fn entries(&self) -> Vec<&Key> {
        let mut out: Vec<&Key> = Vec::with_capacity(self.keys.len());
        for key in &self.keys {
            match out.iter_mut().find(|k| k.name == key.name) {
                Some(slot) if slot.cycle < key.cycle => *slot = key,
                Some(_) => {}
                None => out.push(key),
            }
        }
        out
    }

    /// Find a key by name, returning the highest cycle.
    pub fn find_key(&self, name: &str) -> Option<&Key> {
        self.keys.iter().filter(|k| k.name == name).max_by_key(|k| k.cycle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str, cycle: u16) -> Key {
        Key {
            n_bytes: 0,
            version: 4,
            obj_len: 0,
            datime: 0,
            key_len: 0,
            cycle,
            seek_key: 0,
            seek_pdir: 0,
            class_name: "TH1D".into(),
            name: name.into(),
            title: String::new(),
        }
    }

    #[test]
    fn entries_keep_highest_cycle_in_first_seen_order() {
        let dir = Directory { keys: vec![key("b", 1), key("a", 1), key("b", 3), key("a", 2)] };
        let entries = dir.entries();
        let got: Vec<(&str, u16)> = entries.iter().map(|k| (k.name.as_str(), k.cycle)).collect();
        assert_eq!(got, vec![("b", 3), ("a", 2)]);
    }

    #[test]
    fn header_write_matches_layout_constants() {
        let header = DirectoryHeader {
            version: 5,
            nbytes_keys: 77,
            nbytes_name: 40,
            seek_dir: 100,
            seek_parent: 0,
            seek_keys: 512,
        };
        let mut w = WBuffer::new();
        header.write(&mut w, 0);
        assert_eq!(w.len(), SMALL_DIRECTORY_LEN);
        let bytes = w.into_inner();
        assert_eq!(&bytes[SEEK_KEYS_OFFSET..SEEK_KEYS_OFFSET + 4], &512u32.to_be_bytes());
        assert_eq!(DirectoryHeader::read(&mut RBuffer::new(&bytes)).unwrap(), header);
    }

    #[test]
    fn find_key_prefers_latest_cycle() {
        let dir = Directory { keys: vec![key("h", 5), key("h", 2)] };
        assert_eq!(dir.find_key("h").unwrap().cycle, 5);
        assert!(dir.find_key("missing").is_none());
    }
}
