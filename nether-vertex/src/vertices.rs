//! Standard vertex types
//!
//! Each type is a `#[repr(C)]` POD struct that can be uploaded as-is, and
//! implements [`VertexLayout`] so the matching [`VertexFormat`] can be
//! produced (or fetched from a [`FormatCache`](crate::FormatCache)) without a
//! definition file. Format names match the stock definition files.
//!
//! Naming: `xyz` position, `n` normal, `uv` texture coordinates, `i` a float
//! bone index, `iii`/`ww` three bone indices and two weights, `tb` tangent and
//! binormal. The `pc` variants are the packed GPU layouts: 8-8-8 directions,
//! 16-bit fixed point texture coordinates and reversed index/weight bytes.
//! Types holding 5-byte index/weight blocks are `packed`, so copy fields out
//! before borrowing them.

use crate::error::FormatError;
use crate::format::VertexFormat;
use crate::registry::{Semantic, StorageType};
use crate::value::{
    Div3Indices, PackedNormal888, ReversePaddedIndices, ReversePaddedWideWeights, Short2, Ubyte2,
    Ubyte3,
};
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// A Rust type whose memory layout is a single-stream vertex format.
pub trait VertexLayout: Pod {
    /// Cache key of the format.
    const FORMAT_NAME: &'static str;

    /// Builds the format describing `Self`, with one element per field.
    fn format() -> Result<VertexFormat, FormatError>;
}

macro_rules! vertex_layouts {
    ($($ty:ident => $name:literal {
        $($field:ident: $semantic:ident $storage:ident),* $(,)?
    })*) => {
        $(
            impl VertexLayout for $ty {
                const FORMAT_NAME: &'static str = $name;

                fn format() -> Result<VertexFormat, FormatError> {
                    let mut format = VertexFormat::new(Self::FORMAT_NAME);
                    let stream = format.add_stream();
                    $(
                        format.add_element_at(
                            stream,
                            Semantic::$semantic,
                            StorageType::$storage,
                            None,
                            Some(std::mem::offset_of!($ty, $field) as u32),
                        )?;
                    )*
                    Ok(format)
                }
            }
        )*
    };
}

/// Position, normal, texture coordinates.
#[repr(C)]
#[derive(Clone, Copy, Default, Debug, PartialEq, Pod, Zeroable)]
pub struct VertexXyznuv {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

#[repr(C)]
#[derive(Clone, Copy, Default, Debug, PartialEq, Pod, Zeroable)]
pub struct VertexXyznuvPc {
    pub position: Vec3,
    pub normal: PackedNormal888,
    pub uv: Short2,
}

/// Position, normal, texture coordinates and a single bone index.
#[repr(C)]
#[derive(Clone, Copy, Default, Debug, PartialEq, Pod, Zeroable)]
pub struct VertexXyznuvi {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    pub index: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Default, Debug, PartialEq, Pod, Zeroable)]
pub struct VertexXyznuviPc {
    pub position: Vec3,
    pub normal: PackedNormal888,
    pub uv: Short2,
    pub index: f32,
}

/// Position, 11-11-10 normal, texture coordinates, 11-11-10 tangent and binormal.
#[repr(C)]
#[derive(Clone, Copy, Default, Debug, PartialEq, Pod, Zeroable)]
pub struct VertexXyznuvtb {
    pub position: Vec3,
    pub normal: u32,
    pub uv: Vec2,
    pub tangent: u32,
    pub binormal: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Default, Debug, PartialEq, Pod, Zeroable)]
pub struct VertexXyznuvtbPc {
    pub position: Vec3,
    pub normal: PackedNormal888,
    pub uv: Short2,
    pub tangent: PackedNormal888,
    pub binormal: PackedNormal888,
}

/// Skinned vertex as exported by older tools: bone indices are not yet
/// multiplied by 3.
#[repr(C, packed)]
#[derive(Clone, Copy, Default, Debug, PartialEq, Pod, Zeroable)]
pub struct VertexXyznuviiiwwV2 {
    pub position: Vec3,
    pub normal: u32,
    pub uv: Vec2,
    pub indices: Div3Indices,
    pub weights: Ubyte2,
}

/// Skinned vertex with three bone indices (pre-multiplied by 3) and two weights.
#[repr(C, packed)]
#[derive(Clone, Copy, Default, Debug, PartialEq, Pod, Zeroable)]
pub struct VertexXyznuviiiww {
    pub position: Vec3,
    /// 11-11-10
    pub normal: u32,
    pub uv: Vec2,
    pub indices: Ubyte3,
    /// 255 = 1.0; the third weight is implied.
    pub weights: Ubyte2,
}

/// GPU layout of [`VertexXyznuviiiww`].
#[repr(C)]
#[derive(Clone, Copy, Default, Debug, PartialEq, Pod, Zeroable)]
pub struct VertexXyznuviiiwwPc {
    pub position: Vec3,
    pub normal: PackedNormal888,
    pub uv: Short2,
    pub indices: ReversePaddedIndices,
    pub weights: ReversePaddedWideWeights,
}

vertex_layouts! {
    VertexXyznuv => "xyznuv" {
        position: Position Float3,
        normal: Normal Float3,
        uv: TexCoord Float2,
    }
    VertexXyznuvPc => "xyznuvpc" {
        position: Position Float3,
        normal: Normal Ubyte4Normal888,
        uv: TexCoord Short2,
    }
    VertexXyznuvi => "xyznuvi" {
        position: Position Float3,
        normal: Normal Float3,
        uv: TexCoord Float2,
        index: BlendIndices Float1,
    }
    VertexXyznuviPc => "xyznuvipc" {
        position: Position Float3,
        normal: Normal Ubyte4Normal888,
        uv: TexCoord Short2,
        index: BlendIndices Float1,
    }
    VertexXyznuvtb => "xyznuvtb" {
        position: Position Float3,
        normal: Normal Ubyte4,
        uv: TexCoord Float2,
        tangent: Tangent Ubyte4,
        binormal: Binormal Ubyte4,
    }
    VertexXyznuvtbPc => "xyznuvtbpc" {
        position: Position Float3,
        normal: Normal Ubyte4Normal888,
        uv: TexCoord Short2,
        tangent: Tangent Ubyte4Normal888,
        binormal: Binormal Ubyte4Normal888,
    }
    VertexXyznuviiiwwV2 => "xyznuviiiww_v2" {
        position: Position Float3,
        normal: Normal Ubyte4,
        uv: TexCoord Float2,
        indices: BlendIndices Div3III,
        weights: BlendWeight Ubyte2,
    }
    VertexXyznuviiiww => "xyznuviiiww" {
        position: Position Float3,
        normal: Normal Ubyte4,
        uv: TexCoord Float2,
        indices: BlendIndices Ubyte3,
        weights: BlendWeight Ubyte2,
    }
    VertexXyznuviiiwwPc => "xyznuviiiwwpc" {
        position: Position Float3,
        normal: Normal Ubyte4Normal888,
        uv: TexCoord Short2,
        indices: BlendIndices ReversePaddedIII,
        weights: BlendWeight ReversePaddedWideWW,
    }
}
