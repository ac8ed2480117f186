//! Nether-Vertex: vertex layout descriptions and binary vertex conversion for Nethercore
//!
//! This crate describes how vertex data is laid out in memory and converts
//! vertex buffers from one layout to another. Mesh loaders use it to turn
//! whatever an asset file contains into what a renderer expects, without
//! either side knowing about the other.
//!
//! # Key Features
//!
//! - **Runtime layouts**: [`VertexFormat`] describes any number of interleaved
//!   streams, each an ordered list of (semantic, storage type) elements
//! - **Semantic-aware conversion**: positions gain `w = 1`, normals are
//!   re-packed, bone indices and weights get their platform-specific layouts
//! - **All-or-nothing buffers**: [`convert`] plans every element before writing
//!   a single byte
//! - **Shared cache**: [`FormatCache`] loads named formats from definition
//!   files on demand and resolves per-target variants
//!
//! # Vertex Data Overview
//!
//! - A *format* is a list of *streams* (separate buffers)
//! - A stream is a list of *elements* packed back to back; its *stride* is the
//!   record size
//! - An element is identified by its *semantic* (POSITION, NORMAL, ...) plus a
//!   *semantic index* counted across the whole format (TEXCOORD0, TEXCOORD1)
//! - Its *storage type* (FLOAT3, UBYTE4, SHORT2, ...) fixes the byte encoding
//!
//! # Usage
//!
//! ```ignore
//! use nether_vertex::{BufferSet, BufferSetMut, Semantic, StorageType, VertexFormat, convert};
//!
//! let mut src = VertexFormat::new("xyzn");
//! src.add_stream();
//! src.add_element(0, Semantic::Position, StorageType::Float3)?;
//! src.add_element(0, Semantic::Normal, StorageType::Float3)?;
//!
//! let mut dst = VertexFormat::new("xyzn_packed");
//! dst.add_stream();
//! dst.add_element(0, Semantic::Normal, StorageType::Ubyte4)?;
//! dst.add_element(0, Semantic::Position, StorageType::Float4)?;
//!
//! let mut out = vec![0u8; dst.stream_stride(0) as usize * vertex_count];
//! convert(
//!     &mut BufferSetMut::with_buffers(&dst, [&mut out[..]]),
//!     &BufferSet::with_buffers(&src, [&vertices[..]]),
//!     true,
//! )?;
//! ```

mod cache;
pub mod conversion;
mod definition;
mod error;
pub mod format;
pub mod packing;
mod registry;
pub mod value;
pub mod vertices;

pub use cache::{CacheConfig, DefinitionSource, DirectorySource, FormatCache, MemorySource};
pub use conversion::{
    BufferSet, BufferSetMut, ConversionContext, InvalidSourceData, can_convert, convert,
    convert_buffer, convert_buffer_stream, convert_value, fetch_convert_function,
    fetch_default_value_function, fetch_validation_function, is_source_data_valid,
    validate_source_data,
};
pub use definition::{
    DEFAULT_STORAGE, ElementDefinition, FormatDefinition, MAX_STREAMS, TargetDefinition,
};
pub use error::{ConversionError, DefinitionError, FormatError};
pub use format::{ElementInfo, ProxyElementAccessor, RawElementAccessor, VertexFormat};
pub use registry::{STORAGE_TYPES, ScalarKind, Semantic, StorageInfo, StorageType};
pub use value::{ElementType, ElementValue};
pub use vertices::VertexLayout;
