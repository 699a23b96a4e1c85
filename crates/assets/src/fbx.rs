//! Minimal binary FBX decoding.
//!
//! Reads the node-record tree and extracts triangle geometry from
//! `Objects/Geometry` (`Vertices` + `PolygonVertexIndex`). Model transforms,
//! materials and animation are ignored. Zlib-compressed property arrays are
//! inflated with `flate2`.
//!
//! Record layout (little endian):
//! ```text
//! end_offset  u32 | u64 (v7500+)   absolute offset of the record's end
//! num_props   u32 | u64
//! props_len   u32 | u64
//! name_len    u8
//! name        [u8; name_len]
//! properties  ...
//! children    records, terminated by an all-zero record
//! ```

use crate::LoadError;
use crate::scene::{MeshSurface, RawAsset, SceneNode};
use flate2::read::ZlibDecoder;
use glam::Vec3;
use std::borrow::Cow;
use std::io::Read;

const MAGIC: &[u8] = b"Kaydara FBX Binary  \0";
const HEADER_LEN: usize = 27;
/// Versions from 7.5 onwards use 64-bit record headers.
const WIDE_RECORD_VERSION: u32 = 7500;
/// Deepest record nesting accepted. Exporters stay far below this.
const MAX_DEPTH: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum FbxError {
    #[error("not a binary FBX file")]
    BadMagic,
    #[error("unexpected end of data at offset {0}")]
    Truncated(usize),
    #[error("unknown property type {code:?} at offset {offset}")]
    UnknownProperty { code: char, offset: usize },
    #[error("unknown array encoding {encoding} at offset {offset}")]
    UnknownEncoding { encoding: u32, offset: usize },
    #[error("corrupt compressed array at offset {offset}: {reason}")]
    Inflate { offset: usize, reason: String },
    #[error("array at offset {offset} holds {actual} bytes, expected {expected}")]
    ArrayLength {
        offset: usize,
        expected: usize,
        actual: usize,
    },
    #[error("records nested too deeply at offset {0}")]
    TooDeep(usize),
    #[error("record at offset {offset} has invalid end offset {end}")]
    BadRecordEnd { offset: usize, end: usize },
    #[error("geometry {geometry:?}: {reason}")]
    BadGeometry { geometry: String, reason: String },
}

impl From<FbxError> for LoadError {
    fn from(e: FbxError) -> Self {
        match e {
            FbxError::UnknownEncoding { .. } => LoadError::Unsupported(format!("FBX: {e}")),
            other => LoadError::Parse(format!("FBX: {other}")),
        }
    }
}

/// A property value attached to a node record.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    I16(i16),
    Bool(bool),
    I32(i32),
    F32(f32),
    F64(f64),
    I64(i64),
    F32Array(Vec<f32>),
    F64Array(Vec<f64>),
    I64Array(Vec<i64>),
    I32Array(Vec<i32>),
    BoolArray(Vec<bool>),
    String(String),
    Raw(Vec<u8>),
}

/// A node record.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub properties: Vec<Property>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// A parsed FBX document: format version plus top-level records.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub version: u32,
    pub nodes: Vec<Node>,
}

impl Document {
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }
}

/// Parse the record tree of a binary FBX file.
pub fn parse(data: &[u8]) -> Result<Document, FbxError> {
    if data.len() < HEADER_LEN || !data.starts_with(MAGIC) {
        return Err(FbxError::BadMagic);
    }
    let mut reader = Reader {
        data,
        pos: MAGIC.len() + 2,
        wide: false,
    };
    let version = reader.u32()?;
    reader.wide = version >= WIDE_RECORD_VERSION;

    let mut nodes = Vec::new();
    while reader.pos < data.len() {
        match reader.node(0)? {
            Some(node) => nodes.push(node),
            None => break,
        }
    }
    Ok(Document { version, nodes })
}

/// Decode a binary FBX file into a container asset with one scene holding a
/// node per geometry.
pub fn decode(bytes: &[u8]) -> Result<RawAsset, LoadError> {
    let doc = parse(bytes)?;
    let mut scene = SceneNode::new("fbx_scene");

    if let Some(objects) = doc.node("Objects") {
        for geometry in objects.children.iter().filter(|n| n.name == "Geometry") {
            let surface = geometry_surface(geometry)?;
            scene
                .children
                .push(SceneNode::new(surface.name.clone()).with_surface(surface));
        }
    }

    tracing::debug!(
        version = doc.version,
        geometries = scene.children.len(),
        "decoded FBX"
    );
    Ok(RawAsset::Container {
        scenes: vec![scene],
        default_scene: 0,
    })
}

fn geometry_surface(geometry: &Node) -> Result<MeshSurface, FbxError> {
    // Object names are stored as "Name\0\x01Class".
    let name = geometry
        .properties
        .iter()
        .find_map(|p| match p {
            Property::String(s) => Some(s.split('\0').next().unwrap_or_default().to_string()),
            _ => None,
        })
        .unwrap_or_else(|| "geometry".to_string());
    let bad = |reason: &str| FbxError::BadGeometry {
        geometry: name.clone(),
        reason: reason.to_string(),
    };

    let positions: Vec<Vec3> = match geometry.child("Vertices").and_then(|v| v.properties.first()) {
        Some(Property::F64Array(v)) => v
            .chunks_exact(3)
            .map(|c| Vec3::new(c[0] as f32, c[1] as f32, c[2] as f32))
            .collect(),
        Some(Property::F32Array(v)) => v
            .chunks_exact(3)
            .map(|c| Vec3::new(c[0], c[1], c[2]))
            .collect(),
        Some(_) => return Err(bad("Vertices is not a float array")),
        None => Vec::new(),
    };

    let polygon_index = match geometry
        .child("PolygonVertexIndex")
        .and_then(|v| v.properties.first())
    {
        Some(Property::I32Array(v)) => v.clone(),
        Some(_) => return Err(bad("PolygonVertexIndex is not an int array")),
        None => Vec::new(),
    };

    let indices = triangulate(&polygon_index);
    if indices.iter().any(|&i| i as usize >= positions.len()) {
        return Err(bad("polygon index out of range"));
    }
    Ok(MeshSurface::new(name, positions, indices))
}

/// Fan-triangulate FBX polygon indices. A negative entry `v` closes its
/// polygon and stands for index `!v`.
fn triangulate(polygon_index: &[i32]) -> Vec<u32> {
    let mut out = Vec::new();
    let mut polygon: Vec<u32> = Vec::new();
    for &raw in polygon_index {
        let last = raw < 0;
        let index = if last { !raw } else { raw };
        polygon.push(index as u32);
        if last {
            for i in 1..polygon.len().saturating_sub(1) {
                out.extend([polygon[0], polygon[i], polygon[i + 1]]);
            }
            polygon.clear();
        }
    }
    out
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    wide: bool,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], FbxError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or(FbxError::Truncated(self.pos))?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], FbxError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, FbxError> {
        Ok(self.array::<1>()?[0])
    }

    fn u32(&mut self) -> Result<u32, FbxError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn offset(&mut self) -> Result<u64, FbxError> {
        if self.wide {
            Ok(u64::from_le_bytes(self.array()?))
        } else {
            Ok(self.u32()? as u64)
        }
    }

    /// Read one record at nesting `depth`. `Ok(None)` for the all-zero
    /// terminator record.
    fn node(&mut self, depth: usize) -> Result<Option<Node>, FbxError> {
        let start = self.pos;
        if depth > MAX_DEPTH {
            return Err(FbxError::TooDeep(start));
        }
        let end = self.offset()? as usize;
        let num_props = self.offset()?;
        let _props_len = self.offset()?;
        let name_len = self.u8()? as usize;
        if end == 0 {
            return Ok(None);
        }
        if end <= start || end > self.data.len() {
            return Err(FbxError::BadRecordEnd { offset: start, end });
        }

        let name = String::from_utf8_lossy(self.take(name_len)?).into_owned();
        let mut properties = Vec::new();
        for _ in 0..num_props {
            properties.push(self.property()?);
        }
        if self.pos > end {
            return Err(FbxError::BadRecordEnd { offset: start, end });
        }

        let mut children = Vec::new();
        while self.pos < end {
            match self.node(depth + 1)? {
                Some(child) => children.push(child),
                None => break,
            }
        }
        self.pos = end;
        Ok(Some(Node {
            name,
            properties,
            children,
        }))
    }

    fn property(&mut self) -> Result<Property, FbxError> {
        let offset = self.pos;
        let code = self.u8()?;
        let prop = match code {
            b'Y' => Property::I16(i16::from_le_bytes(self.array()?)),
            b'C' => Property::Bool(self.u8()? != 0),
            b'I' => Property::I32(i32::from_le_bytes(self.array()?)),
            b'F' => Property::F32(f32::from_le_bytes(self.array()?)),
            b'D' => Property::F64(f64::from_le_bytes(self.array()?)),
            b'L' => Property::I64(i64::from_le_bytes(self.array()?)),
            b'f' => Property::F32Array(self.typed_array::<4, _>(|b| f32::from_le_bytes(le(b)))?),
            b'd' => Property::F64Array(self.typed_array::<8, _>(|b| f64::from_le_bytes(le(b)))?),
            b'l' => Property::I64Array(self.typed_array::<8, _>(|b| i64::from_le_bytes(le(b)))?),
            b'i' => Property::I32Array(self.typed_array::<4, _>(|b| i32::from_le_bytes(le(b)))?),
            b'b' => Property::BoolArray(self.typed_array::<1, _>(|b| b[0] != 0)?),
            b'S' | b'R' => {
                let len = self.u32()? as usize;
                let bytes = self.take(len)?;
                if code == b'S' {
                    Property::String(String::from_utf8_lossy(bytes).into_owned())
                } else {
                    Property::Raw(bytes.to_vec())
                }
            }
            other => {
                return Err(FbxError::UnknownProperty {
                    code: other as char,
                    offset,
                });
            }
        };
        Ok(prop)
    }

    fn typed_array<const N: usize, T>(
        &mut self,
        read: impl Fn(&[u8]) -> T,
    ) -> Result<Vec<T>, FbxError> {
        let offset = self.pos;
        let len = self.u32()? as usize;
        let encoding = self.u32()?;
        let compressed_len = self.u32()? as usize;
        let byte_len = len.checked_mul(N).ok_or(FbxError::Truncated(offset))?;
        let bytes = match encoding {
            0 => Cow::Borrowed(self.take(byte_len)?),
            1 => Cow::Owned(inflate(self.take(compressed_len)?, byte_len, offset)?),
            other => {
                return Err(FbxError::UnknownEncoding {
                    encoding: other,
                    offset,
                });
            }
        };
        Ok(bytes.chunks_exact(N).map(read).collect())
    }
}

/// Inflate a zlib stream that must expand to exactly `expected` bytes.
fn inflate(packed: &[u8], expected: usize, offset: usize) -> Result<Vec<u8>, FbxError> {
    let mut out = Vec::new();
    ZlibDecoder::new(packed)
        .take(expected as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| FbxError::Inflate {
            offset,
            reason: e.to_string(),
        })?;
    if out.len() != expected {
        return Err(FbxError::ArrayLength {
            offset,
            expected,
            actual: out.len(),
        });
    }
    Ok(out)
}

fn le<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}
