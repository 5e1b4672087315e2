//! ROOT compression block decompression (ZL = zlib, L4 = LZ4, ZS = ZSTD, XZ = LZMA).
//!
//! ROOT writes compressed data as one or more blocks with a 9-byte header:
//! ```text
//! bytes 0-1:  algorithm tag ("ZL", "XZ", "L4", "ZS")
//! byte  2:    method (ignored)
//! bytes 3-5:  compressed size   (3-byte little-endian)
//! bytes 6-8:  uncompressed size (3-byte little-endian)
//! ```
//! The compressed payload immediately follows the header.

use std::io::Read;

use crate::error::{Result, RootError};

/// Size of the per-block header.
pub const BLOCK_HEADER_LEN: usize = 9;

/// LZ4 blocks carry a big-endian xxhash64 of the compressed bytes first.
const LZ4_CHECKSUM_LEN: usize = 8;

/// Compression algorithm named by a block tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// `ZL`: zlib (deflate with zlib framing).
    Zlib,
    /// `L4`: LZ4 block with checksum prefix.
    Lz4,
    /// `ZS`: Zstandard frame.
    Zstd,
    /// `XZ`: LZMA in an xz container.
    Xz,
}

impl Algorithm {
    /// Map a two-byte tag to an algorithm.
    pub fn from_tag(tag: &[u8]) -> Result<Self> {
        match tag {
            b"ZL" => Ok(Self::Zlib),
            b"L4" => Ok(Self::Lz4),
            b"ZS" => Ok(Self::Zstd),
            b"XZ" => Ok(Self::Xz),
            _ => Err(RootError::Decompression(format!(
                "unsupported compression algorithm: {:?}",
                String::from_utf8_lossy(tag)
            ))),
        }
    }
}

/// Header of one compressed block.
#[derive(Debug, Clone, Copy)]
struct BlockHeader {
    algorithm: Algorithm,
    compressed_len: usize,
    uncompressed_len: usize,
}

impl BlockHeader {
    fn parse(h: &[u8]) -> Result<Self> {
        Ok(Self {
            algorithm: Algorithm::from_tag(&h[0..2])?,
            compressed_len: read_le24(&h[3..6]),
            uncompressed_len: read_le24(&h[6..9]),
        })
    }
}

/// Decompress ROOT-compressed data into exactly `expected_len` bytes.
pub fn decompress(src: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(expected_len);
    let mut offset = 0;

    while out.len() < expected_len && offset + BLOCK_HEADER_LEN <= src.len() {
        let header = BlockHeader::parse(&src[offset..offset + BLOCK_HEADER_LEN])?;
        offset += BLOCK_HEADER_LEN;

        let end = offset + header.compressed_len;
        if end > src.len() {
            return Err(RootError::Decompression(format!(
                "compressed block claims {} bytes but only {} remain",
                header.compressed_len,
                src.len() - offset
            )));
        }

        let block = inflate_block(header, &src[offset..end])?;
        if block.len() != header.uncompressed_len {
            return Err(RootError::Decompression(format!(
                "{:?}: expected {} uncompressed bytes, got {}",
                header.algorithm,
                header.uncompressed_len,
                block.len()
            )));
        }
        tracing::trace!(
            algorithm = ?header.algorithm,
            compressed = header.compressed_len,
            uncompressed = header.uncompressed_len,
            "inflated block"
        );

        out.extend_from_slice(&block);
        offset = end;
    }

    if out.len() != expected_len {
        return Err(RootError::Decompression(format!(
            "total decompressed length {} != expected {}",
            out.len(),
            expected_len
        )));
    }

    Ok(out)
}

fn inflate_block(header: BlockHeader, data: &[u8]) -> Result<Vec<u8>> {
    let expected = header.uncompressed_len;
    match header.algorithm {
        Algorithm::Zlib => {
            let mut out = Vec::with_capacity(expected);
            flate2::read::ZlibDecoder::new(data)
                .read_to_end(&mut out)
                .map_err(|e| RootError::Decompression(format!("zlib: {e}")))?;
            Ok(out)
        }
        Algorithm::Lz4 => {
            if data.len() < LZ4_CHECKSUM_LEN {
                return Err(RootError::Decompression(
                    "LZ4 block too small for checksum header".into(),
                ));
            }
            let (checksum, payload) = data.split_at(LZ4_CHECKSUM_LEN);
            let stored = u64::from_be_bytes(checksum.try_into().map_err(|_| {
                RootError::Decompression("LZ4 checksum header truncated".into())
            })?);
            let computed = twox_hash::XxHash64::oneshot(0, payload);
            if stored != computed {
                return Err(RootError::Decompression(format!(
                    "lz4: checksum mismatch (stored {stored:#018x}, computed {computed:#018x})"
                )));
            }
            lz4_flex::decompress(payload, expected)
                .map_err(|e| RootError::Decompression(format!("lz4: {e}")))
        }
        Algorithm::Zstd => {
            let mut source = data;
            let mut decoder = ruzstd::decoding::StreamingDecoder::new(&mut source)
                .map_err(|e| RootError::Decompression(format!("zstd: {e}")))?;
            let mut out = Vec::with_capacity(expected);
            decoder
                .read_to_end(&mut out)
                .map_err(|e| RootError::Decompression(format!("zstd: {e}")))?;
            Ok(out)
        }
        Algorithm::Xz => {
            let mut input = std::io::BufReader::new(data);
            let mut out = Vec::with_capacity(expected);
            lzma_rs::xz_decompress(&mut input, &mut out)
                .map_err(|e| RootError::Decompression(format!("xz: {e}")))?;
            Ok(out)
        }
    }
}

/// Read a 3-byte little-endian unsigned integer.
fn read_le24(b: &[u8]) -> usize {
    b[0] as usize | ((b[1] as usize) << 8) | ((b[2] as usize) << 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_root_block(tag: &[u8; 2], method: u8, compressed: &[u8], u_len: usize) -> Vec<u8> {
        let mut block = Vec::new();
        block.extend_from_slice(tag);
        block.push(method);
        let c_len = compressed.len();
        block.extend_from_slice(&(c_len as u32).to_le_bytes()[..3]);
        block.extend_from_slice(&(u_len as u32).to_le_bytes()[..3]);
        block.extend_from_slice(compressed);
        block
    }

    #[test]
    fn le24_values() {
        assert_eq!(read_le24(&[0x10, 0x00, 0x00]), 16);
        assert_eq!(read_le24(&[0xff, 0xff, 0xff]), 0xFF_FFFF);
        assert_eq!(read_le24(&[0x00, 0x01, 0x00]), 256);
    }

    #[test]
    fn zlib_block() {
        use flate2::Compression;
        use flate2::write::ZlibEncoder;
        use std::io::Write;

        let original = b"probe pt histogram payload, repeated AAAAAAAAAAAAAAAA";
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(original).unwrap();
        let compressed = encoder.finish().unwrap();

        let block = make_root_block(b"ZL", 0x08, &compressed, original.len());
        assert_eq!(decompress(&block, original.len()).unwrap(), original);
    }

    #[test]
    fn two_zlib_blocks_concatenate() {
        use flate2::Compression;
        use flate2::write::ZlibEncoder;
        use std::io::Write;

        let parts: [&[u8]; 2] = [b"first half of the key payload", b" / second half"];
        let mut src = Vec::new();
        for p in parts {
            let mut enc = ZlibEncoder::new(Vec::new(), Compression::fast());
            enc.write_all(p).unwrap();
            src.extend(make_root_block(b"ZL", 0x08, &enc.finish().unwrap(), p.len()));
        }
        let total = parts.iter().map(|p| p.len()).sum();
        assert_eq!(decompress(&src, total).unwrap(), [parts[0], parts[1]].concat());
    }

    #[test]
    fn lz4_block_with_checksum() {
        let original = b"efficiency passed/total, BBBBBBBBBBBBBBBBBBBBBBBB".to_vec();
        let compressed = lz4_flex::compress(&original);
        let mut payload = twox_hash::XxHash64::oneshot(0, &compressed).to_be_bytes().to_vec();
        payload.extend_from_slice(&compressed);

        let block = make_root_block(b"L4", 0x01, &payload, original.len());
        assert_eq!(decompress(&block, original.len()).unwrap(), original);
    }

    #[test]
    fn lz4_checksum_mismatch_is_rejected() {
        let original = b"CCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCC".to_vec();
        let compressed = lz4_flex::compress(&original);
        let mut payload = vec![0u8; 8];
        payload.extend_from_slice(&compressed);

        let block = make_root_block(b"L4", 0x01, &payload, original.len());
        let err = decompress(&block, original.len()).unwrap_err();
        assert!(err.to_string().contains("checksum"), "unexpected error: {err}");
    }

    #[test]
    fn zstd_block() {
        let original = b"Hello ROOT ZSTD compression! Repeated data: BBBBBBBBBB";
        let compressed = ruzstd::encoding::compress_to_vec(
            &original[..],
            ruzstd::encoding::CompressionLevel::Fastest,
        );
        let block = make_root_block(b"ZS", 0x04, &compressed, original.len());
        assert_eq!(decompress(&block, original.len()).unwrap(), &original[..]);
    }

    #[test]
    fn xz_block() {
        let original = b"Hello ROOT XZ compression! Repeated data: CCCCCCCCCC";
        let mut compressed = Vec::new();
        lzma_rs::xz_compress(&mut std::io::BufReader::new(&original[..]), &mut compressed)
            .unwrap();
        let block = make_root_block(b"XZ", 0x05, &compressed, original.len());
        assert_eq!(decompress(&block, original.len()).unwrap(), &original[..]);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let block = make_root_block(b"QQ", 0, &[1, 2, 3], 3);
        assert!(matches!(decompress(&block, 3), Err(RootError::Decompression(_))));
    }
}
