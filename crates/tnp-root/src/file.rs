//! TFile header parsing and top-level ROOT file interface.

use std::fs;
use std::path::{Path, PathBuf};

use crate::datasource::DataSource;
use crate::decompress::decompress;
use crate::directory::{Directory, DirectoryHeader};
use crate::error::{Result, RootError};
use crate::key::{Key, KeyInfo};
use crate::objects::{self, RootObject};
use crate::rbuffer::RBuffer;

/// Magic bytes every ROOT file starts with.
pub const ROOT_MAGIC: &[u8; 4] = b"root";

/// Smallest possible ROOT file header.
const MIN_FILE_LEN: usize = 64;

/// Parsed ROOT file header.
#[derive(Debug, Clone, Copy)]
struct FileHeader {
    /// File format version.
    version: u32,
    /// Offset of first data record (also where top-level TKey sits).
    begin: u64,
    /// Whether the file uses large (64-bit) seek pointers (version >= 1000000).
    is_large: bool,
    /// Top directory record.
    top: DirectoryHeader,
}

/// A ROOT file opened for reading.
pub struct RootFile {
    /// Raw file bytes (owned or memory-mapped).
    data: DataSource,
    /// Parsed header.
    header: FileHeader,
    /// Path for diagnostics.
    path: PathBuf,
}

impl std::fmt::Debug for RootFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootFile")
            .field("path", &self.path)
            .field("version", &self.header.version)
            .field("len", &self.data.len())
            .finish()
    }
}

impl RootFile {
    /// Open and parse a ROOT file from disk using memory mapping.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = fs::File::open(&path)?;
        // SAFETY: the mapping is only read; a file truncated underneath us is
        // outside what a batch plotting run defends against.
        let mmap = unsafe { memmap2::Mmap::map(&file)? };
        Self::from_datasource(DataSource::Mmap(mmap), path)
    }

    /// Parse a ROOT file from a byte vector.
    pub fn from_bytes(data: Vec<u8>, path: impl Into<PathBuf>) -> Result<Self> {
        Self::from_datasource(DataSource::Owned(data), path.into())
    }

    fn from_datasource(data: DataSource, path: PathBuf) -> Result<Self> {
        if data.len() < MIN_FILE_LEN || &data[0..4] != ROOT_MAGIC {
            return Err(RootError::BadMagic);
        }
        let header = Self::parse_header(&data)?;
        tracing::debug!(
            path = %path.display(),
            version = header.version,
            large = header.is_large,
            "opened ROOT file"
        );
        Ok(Self { data, header, path })
    }

    /// Parse the file-level header and the embedded top TDirectory.
    ///
    /// ROOT file header layout (small file, version < 1000000):
    /// ```text
    /// offset  size  field
    ///    0      4   magic "root"
    ///    4      4   fVersion
    ///    8      4   fBEGIN
    ///   12      4   fEND
    ///   16      4   fSeekFree
    ///   20      4   fNbytesFree
    ///   24      4   nfree
    ///   28      4   fNbytesName
    ///   32      1   fUnits
    ///   33      4   fCompress
    ///   37      4   fSeekInfo
    ///   41      4   fNbytesInfo
    ///   45     18   fUUID
    /// ```
    /// Large files widen fEND, fSeekFree and fSeekInfo to 8 bytes.
    ///
    /// The TDirectory streamer is located at `fBEGIN + fNbytesName`.
    fn parse_header(data: &[u8]) -> Result<FileHeader> {
        let mut r = RBuffer::new(data);
        r.skip(4)?; // magic

        let version = r.read_u32()?;
        let is_large = version >= 1_000_000;
        let begin = r.read_u32()? as u64;

        let seek_width = if is_large { 8 } else { 4 };
        r.skip(2 * seek_width)?; // fEND, fSeekFree
        r.skip(4 + 4)?; // fNbytesFree, nfree
        let nbytes_name = r.read_u32()? as u64;

        let dir_offset = (begin + nbytes_name) as usize;
        if dir_offset >= data.len() {
            return Err(RootError::Deserialization("TDirectory offset past end of file".into()));
        }
        r.set_pos(dir_offset)?;
        let top = DirectoryHeader::read(&mut r)?;

        Ok(FileHeader { version, begin, is_large, top })
    }

    /// Path the file was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// ROOT file format version.
    pub fn version(&self) -> u32 {
        self.header.version
    }

    /// Whether file uses 64-bit seek pointers.
    pub fn is_large(&self) -> bool {
        self.header.is_large
    }

    /// Offset of the first record.
    pub fn begin(&self) -> u64 {
        self.header.begin
    }

    /// List all keys in the top-level directory.
    pub fn list_keys(&self) -> Result<Vec<KeyInfo>> {
        Ok(self.top_directory()?.keys().iter().map(KeyInfo::from_key).collect())
    }

    /// The top-level directory.
    pub fn top_directory(&self) -> Result<Directory> {
        if self.header.top.seek_keys == 0 {
            return Ok(Directory::default());
        }
        Directory::read_key_list(&self.data, self.header.top.seek_keys as usize)
    }

    /// Resolve a `/`-separated directory path; empty means the top directory.
    pub fn directory(&self, path: &str) -> Result<Directory> {
        let mut dir = self.top_directory()?;
        for part in path.split('/').filter(|s| !s.is_empty()) {
            let key = dir
                .find_key(part)
                .ok_or_else(|| RootError::KeyNotFound(format!("{part} (in path {path})")))?;
            if !key.is_directory() {
                return Err(RootError::NotADirectory {
                    name: part.to_string(),
                    class_name: key.class_name.clone(),
                });
            }
            dir = self.read_subdirectory(key)?;
        }
        Ok(dir)
    }

    fn read_subdirectory(&self, key: &Key) -> Result<Directory> {
        let payload = self.read_key_payload(key)?;
        Directory::read_from_payload(&payload, &self.data)
    }

    /// Decode the object stored under `key`.
    pub fn read_object(&self, key: &Key) -> Result<RootObject> {
        let payload = self.read_key_payload(key)?;
        objects::read_object(&payload, &key.class_name, key.key_len as usize)
    }

    /// Get an object by its full path (e.g. `"tpTree/eff_pt"`).
    pub fn get_object(&self, path: &str) -> Result<RootObject> {
        let (dir_path, name) = match path.rsplit_once('/') {
            Some((d, n)) => (d, n),
            None => ("", path),
        };
        let dir = self.directory(dir_path)?;
        let key = dir.find_key(name).ok_or_else(|| RootError::KeyNotFound(path.to_string()))?;
        self.read_object(key)
    }

    /// Read and decompress the payload of a TKey.
    pub fn read_key_payload(&self, key: &Key) -> Result<Vec<u8>> {
        let seek = key.seek_key as usize;
        let n_bytes = key.n_bytes as usize;
        let key_len = key.key_len as usize;
        if seek + n_bytes > self.data.len() || key_len > n_bytes {
            return Err(RootError::BufferUnderflow {
                offset: seek,
                need: n_bytes,
                have: self.data.len().saturating_sub(seek),
            });
        }

        let stored = &self.data[seek + key_len..seek + n_bytes];
        if key.obj_len as usize != stored.len() {
            decompress(stored, key.obj_len as usize)
        } else {
            Ok(stored.to_vec())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_non_root_file() {
        let result = RootFile::from_bytes(vec![0u8; 100], "test.root");
        assert!(matches!(result, Err(RootError::BadMagic)));
    }

    #[test]
    fn reject_truncated_file() {
        let result = RootFile::from_bytes(b"root".to_vec(), "short.root");
        assert!(matches!(result, Err(RootError::BadMagic)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = RootFile::open("/nonexistent/dir/file.root");
        assert!(matches!(result, Err(RootError::Io(_))));
    }
}
