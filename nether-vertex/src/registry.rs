//! Semantic and storage type metadata
//!
//! Every vertex element is described by two tags:
//! - [`Semantic`] names what the data is *for* (position, normal, ...)
//! - [`StorageType`] names how it is *stored* (float3, ubyte4, packed normal, ...)
//!
//! Name lookups are case-insensitive and never fail: unrecognised names map to
//! the `Unknown` variant, which callers are expected to check for.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Semantics
// ============================================================================

/// Purpose of a vertex element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Semantic {
    #[default]
    Unknown,
    Position,
    BlendWeight,
    BlendIndices,
    Normal,
    PSize,
    TexCoord,
    Tangent,
    Binormal,
    TessFactor,
    PositionT,
    Color,
    Fog,
    Depth,
    Sample,
}

impl Semantic {
    /// All known semantics, in declaration order (excludes `Unknown`).
    pub const ALL: [Semantic; 14] = [
        Semantic::Position,
        Semantic::BlendWeight,
        Semantic::BlendIndices,
        Semantic::Normal,
        Semantic::PSize,
        Semantic::TexCoord,
        Semantic::Tangent,
        Semantic::Binormal,
        Semantic::TessFactor,
        Semantic::PositionT,
        Semantic::Color,
        Semantic::Fog,
        Semantic::Depth,
        Semantic::Sample,
    ];

    /// Number of known semantics (excludes `Unknown`).
    pub const ENTRY_COUNT: usize = Self::ALL.len();

    /// Canonical upper-case name as used in format definition files.
    pub const fn name(self) -> &'static str {
        match self {
            Semantic::Unknown => "UNKNOWN",
            Semantic::Position => "POSITION",
            Semantic::BlendWeight => "BLENDWEIGHT",
            Semantic::BlendIndices => "BLENDINDICES",
            Semantic::Normal => "NORMAL",
            Semantic::PSize => "PSIZE",
            Semantic::TexCoord => "TEXCOORD",
            Semantic::Tangent => "TANGENT",
            Semantic::Binormal => "BINORMAL",
            Semantic::TessFactor => "TESSFACTOR",
            Semantic::PositionT => "POSITIONT",
            Semantic::Color => "COLOR",
            Semantic::Fog => "FOG",
            Semantic::Depth => "DEPTH",
            Semantic::Sample => "SAMPLE",
        }
    }

    /// Case-insensitive lookup. Returns `Unknown` for unrecognised names.
    pub fn from_name(name: &str) -> Semantic {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|semantic| semantic.name().eq_ignore_ascii_case(name))
            .unwrap_or(Semantic::Unknown)
    }

    /// Returns true for the semantics that share packed normal handling.
    #[inline]
    pub const fn is_normal_like(self) -> bool {
        matches!(self, Semantic::Normal | Semantic::Tangent | Semantic::Binormal)
    }
}

impl fmt::Display for Semantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Storage types
// ============================================================================

/// Scalar type of a storage type's components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    F32,
    F16,
    U8,
    I16,
    U16,
    /// Bit-packed encodings that are not addressable per component.
    Packed,
}

/// Physical byte representation of a vertex element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StorageType {
    #[default]
    Unknown,
    Float1,
    Float2,
    Float3,
    Float4,
    Half2,
    Half4,
    Color,
    Ubyte1,
    Ubyte2,
    Ubyte3,
    Ubyte4,
    Ubyte4Normal888,
    Short1,
    Short2,
    Short3,
    Short4,
    Ubyte4N,
    Short2N,
    Short4N,
    Ushort2N,
    Ushort4N,
    UDec3,
    Dec3N,
    Div3III,
    ReverseIII,
    ReversePaddedIII,
    ReversePaddedWideWW,
    ReversePaddedWW,
}

/// Registration data for one storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageInfo {
    pub storage: StorageType,
    pub name: &'static str,
    pub components: u32,
    pub size: u32,
    pub scalar: ScalarKind,
}

const fn info(
    storage: StorageType,
    name: &'static str,
    components: u32,
    size: u32,
    scalar: ScalarKind,
) -> StorageInfo {
    StorageInfo {
        storage,
        name,
        components,
        size,
        scalar,
    }
}

/// Source-of-truth table for every known storage type (excludes `Unknown`).
///
/// Packed and special encodings report their *logical* component count, which
/// may be smaller than their byte size suggests.
pub static STORAGE_TYPES: [StorageInfo; 28] = [
    info(StorageType::Float1, "FLOAT1", 1, 4, ScalarKind::F32),
    info(StorageType::Float2, "FLOAT2", 2, 8, ScalarKind::F32),
    info(StorageType::Float3, "FLOAT3", 3, 12, ScalarKind::F32),
    info(StorageType::Float4, "FLOAT4", 4, 16, ScalarKind::F32),
    info(StorageType::Half2, "FLOAT16_2", 2, 4, ScalarKind::F16),
    info(StorageType::Half4, "FLOAT16_4", 4, 8, ScalarKind::F16),
    info(StorageType::Color, "COLOR", 4, 4, ScalarKind::U8),
    info(StorageType::Ubyte1, "UBYTE1", 1, 1, ScalarKind::U8),
    info(StorageType::Ubyte2, "UBYTE2", 2, 2, ScalarKind::U8),
    info(StorageType::Ubyte3, "UBYTE3", 3, 3, ScalarKind::U8),
    info(StorageType::Ubyte4, "UBYTE4", 4, 4, ScalarKind::U8),
    info(StorageType::Ubyte4Normal888, "UBYTE4_NORMAL_8_8_8", 3, 4, ScalarKind::Packed),
    info(StorageType::Short1, "SHORT1", 1, 2, ScalarKind::I16),
    info(StorageType::Short2, "SHORT2", 2, 4, ScalarKind::I16),
    info(StorageType::Short3, "SHORT3", 3, 6, ScalarKind::I16),
    info(StorageType::Short4, "SHORT4", 4, 8, ScalarKind::I16),
    info(StorageType::Ubyte4N, "UBYTE4N", 4, 4, ScalarKind::U8),
    info(StorageType::Short2N, "SHORT2N", 2, 4, ScalarKind::I16),
    info(StorageType::Short4N, "SHORT4N", 4, 8, ScalarKind::I16),
    info(StorageType::Ushort2N, "USHORT2N", 2, 4, ScalarKind::U16),
    info(StorageType::Ushort4N, "USHORT4N", 4, 8, ScalarKind::U16),
    info(StorageType::UDec3, "UDEC3", 3, 4, ScalarKind::Packed),
    info(StorageType::Dec3N, "DEC3N", 3, 4, ScalarKind::Packed),
    info(StorageType::Div3III, "SC_DIV3_III", 3, 3, ScalarKind::U8),
    info(StorageType::ReverseIII, "SC_REVERSE_III", 3, 3, ScalarKind::U8),
    info(StorageType::ReversePaddedIII, "SC_REVERSE_PADDED_III_", 3, 4, ScalarKind::U8),
    info(StorageType::ReversePaddedWideWW, "SC_REVERSE_PADDED__WW_", 2, 4, ScalarKind::U8),
    info(StorageType::ReversePaddedWW, "SC_REVERSE_PADDED_WW_", 2, 3, ScalarKind::U8),
];

impl StorageType {
    /// Number of known storage types (excludes `Unknown`).
    pub const ENTRY_COUNT: usize = STORAGE_TYPES.len();

    /// Registration data, or `None` for `Unknown`.
    pub fn info(self) -> Option<&'static StorageInfo> {
        STORAGE_TYPES.iter().find(|entry| entry.storage == self)
    }

    /// Canonical name as used in format definition files.
    pub fn name(self) -> &'static str {
        self.info().map_or("UNKNOWN", |entry| entry.name)
    }

    /// Case-insensitive lookup. Returns `Unknown` for unrecognised names.
    pub fn from_name(name: &str) -> StorageType {
        let name = name.trim();
        STORAGE_TYPES
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
            .map_or(StorageType::Unknown, |entry| entry.storage)
    }

    /// Byte footprint of one element (0 for `Unknown`).
    pub fn size(self) -> u32 {
        self.info().map_or(0, |entry| entry.size)
    }

    /// Logical component count (0 for `Unknown`).
    pub fn component_count(self) -> u32 {
        self.info().map_or(0, |entry| entry.components)
    }

    /// Scalar type of the components, or `None` for `Unknown`.
    pub fn scalar(self) -> Option<ScalarKind> {
        self.info().map(|entry| entry.scalar)
    }

    /// FLOAT1..FLOAT4
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(
            self,
            StorageType::Float1 | StorageType::Float2 | StorageType::Float3 | StorageType::Float4
        )
    }

    /// UBYTE1..UBYTE4
    #[inline]
    pub const fn is_ubyte(self) -> bool {
        matches!(
            self,
            StorageType::Ubyte1 | StorageType::Ubyte2 | StorageType::Ubyte3 | StorageType::Ubyte4
        )
    }

    /// SHORT1..SHORT4
    #[inline]
    pub const fn is_short(self) -> bool {
        matches!(
            self,
            StorageType::Short1 | StorageType::Short2 | StorageType::Short3 | StorageType::Short4
        )
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
