//! Versioned binary format for static geometry
//!
//! A file is a fixed 20-byte header followed by `count` fixed 20-byte records.
//! All fields are little-endian; nothing about the in-memory layout of
//! [`StaticBody`] leaks into the file.
//!
//! ```text
//! header: magic "SLAB2DSB" | version u32 | count u32 | record_stride u32
//! record: pos.x f32 | pos.y f32 | half.x f32 | half.y f32 | layer u32
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use bytemuck::{Pod, Zeroable};
use slab2d_math::Vec2;

use crate::body::StaticBody;
use crate::collision::CollisionLayer;
use crate::error::PersistError;
use crate::shapes::Aabb;

/// Magic bytes at the start of every static geometry file
pub const MAGIC: [u8; 8] = *b"SLAB2DSB";

/// Current format version
pub const VERSION: u32 = 1;

/// Size of the file header in bytes
pub const HEADER_LEN: usize = std::mem::size_of::<Header>();

/// Size of one static body record in bytes
pub const RECORD_STRIDE: usize = std::mem::size_of::<Record>();

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
struct Header {
    magic: [u8; 8],
    version_le: u32,
    count_le: u32,
    stride_le: u32,
}

const _: () = assert!(std::mem::size_of::<Header>() == 20);

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
struct Record {
    position_le: [u32; 2],
    half_size_le: [u32; 2],
    layer_le: u32,
}

const _: () = assert!(std::mem::size_of::<Record>() == 20);

fn f32_to_le(v: f32) -> u32 {
    v.to_bits().to_le()
}

fn f32_from_le(v: u32) -> f32 {
    f32::from_bits(u32::from_le(v))
}

impl Record {
    fn from_body(body: &StaticBody) -> Self {
        let Aabb { position, half_size } = body.aabb;
        Self {
            position_le: [f32_to_le(position.x), f32_to_le(position.y)],
            half_size_le: [f32_to_le(half_size.x), f32_to_le(half_size.y)],
            layer_le: body.collision_layer.bits().to_le(),
        }
    }

    fn to_body(self) -> StaticBody {
        let position = Vec2::new(f32_from_le(self.position_le[0]), f32_from_le(self.position_le[1]));
        let half_size = Vec2::new(f32_from_le(self.half_size_le[0]), f32_from_le(self.half_size_le[1]));
        StaticBody {
            aabb: Aabb::new(position, half_size),
            collision_layer: CollisionLayer::from_bits_retain(u32::from_le(self.layer_le)),
        }
    }
}

/// Serialize static bodies into the v1 format
pub fn encode(bodies: &[StaticBody]) -> Vec<u8> {
    let header = Header {
        magic: MAGIC,
        version_le: VERSION.to_le(),
        count_le: (bodies.len() as u32).to_le(),
        stride_le: (RECORD_STRIDE as u32).to_le(),
    };

    let mut out = Vec::with_capacity(HEADER_LEN + bodies.len() * RECORD_STRIDE);
    out.extend_from_slice(bytemuck::bytes_of(&header));
    for body in bodies {
        out.extend_from_slice(bytemuck::bytes_of(&Record::from_body(body)));
    }
    out
}

/// Parse a v1 file image back into static bodies
///
/// The whole image is validated before any record is returned.
pub fn decode(bytes: &[u8]) -> Result<Vec<StaticBody>, PersistError> {
    if bytes.len() < HEADER_LEN {
        return Err(PersistError::Truncated {
            expected: HEADER_LEN,
            actual: bytes.len(),
        });
    }

    let header: Header = bytemuck::pod_read_unaligned(&bytes[..HEADER_LEN]);
    if header.magic != MAGIC {
        return Err(PersistError::BadMagic(header.magic));
    }

    let version = u32::from_le(header.version_le);
    if version != VERSION {
        return Err(PersistError::UnsupportedVersion(version));
    }

    let stride = u32::from_le(header.stride_le);
    if stride as usize != RECORD_STRIDE {
        return Err(PersistError::StrideMismatch {
            expected: RECORD_STRIDE as u32,
            actual: stride,
        });
    }

    let count = u32::from_le(header.count_le) as usize;
    let expected = count
        .checked_mul(RECORD_STRIDE)
        .and_then(|n| n.checked_add(HEADER_LEN))
        .unwrap_or(usize::MAX);
    if bytes.len() != expected {
        return Err(PersistError::Truncated {
            expected,
            actual: bytes.len(),
        });
    }

    Ok(bytes[HEADER_LEN..]
        .chunks_exact(RECORD_STRIDE)
        .map(|chunk| bytemuck::pod_read_unaligned::<Record>(chunk).to_body())
        .collect())
}

/// Write static bodies to `path` via a sibling temporary file and a rename
pub fn write_file(path: &Path, bodies: &[StaticBody]) -> Result<(), PersistError> {
    let temp = temp_path(path);
    fs::write(&temp, encode(bodies))?;
    if let Err(err) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(err.into());
    }
    Ok(())
}

/// Read and validate the static bodies stored at `path`
pub fn read_file(path: &Path) -> Result<Vec<StaticBody>, PersistError> {
    let bytes = fs::read(path)?;
    decode(&bytes)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "static-bodies".into());
    name.push(".tmp");
    path.with_file_name(name)
}
