//! Conversion, validation and default-value functions
//!
//! Each function is a small `Copy` value describing *what* to do. `apply`,
//! `validate` and `fill` operate on exactly one element's bytes.

use crate::packing;
use crate::registry::{ScalarKind, StorageType};
use crate::value::{
    Component, DEFAULT_BLEND_WEIGHTS, Div3Indices, ElementValue, Float1, Float3, Float4,
    PackedNormal888, ReverseIndices, ReversePaddedIndices, ReversePaddedWeights,
    ReversePaddedWideWeights, SpecialElement, Ubyte3, copy_components, copy_components_flat,
    validate_components,
};
use bytemuck::Pod;
use glam::Vec3;
use half::f16;

// ============================================================================
// Function descriptions
// ============================================================================

/// How individual components are mapped between scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentRule {
    /// Numeric assignment (saturating when narrowing).
    Assignment,
    /// Unsigned integers ↔ [0, 1], signed integers ↔ [-1, 1].
    Normalized,
    /// 16-bit signed fixed point ↔ float.
    FixedPoint,
}

/// Byte encodings of a direction vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormalEncoding {
    Float3,
    Packed11_11_10,
    Packed888,
}

impl NormalEncoding {
    pub fn of(storage: StorageType) -> Option<Self> {
        match storage {
            StorageType::Float3 => Some(Self::Float3),
            StorageType::Ubyte4 | StorageType::Ubyte4N => Some(Self::Packed11_11_10),
            StorageType::Ubyte4Normal888 => Some(Self::Packed888),
            _ => None,
        }
    }

    fn decode(self, src: &[u8]) -> Vec3 {
        match self {
            Self::Float3 => Float3::read(src).map_or(Vec3::ZERO, |v| Vec3::from_array(v.0)),
            Self::Packed11_11_10 => {
                read_pod::<u32>(src).map_or(Vec3::ZERO, packing::unpack_normal_11_11_10)
            }
            Self::Packed888 => read_pod::<PackedNormal888>(src).map_or(Vec3::ZERO, |p| p.to_vec3()),
        }
    }

    fn encode(self, dst: &mut [u8], dir: Vec3) {
        match self {
            Self::Float3 => {
                Float3::new(dir.to_array()).write(dst);
            }
            Self::Packed11_11_10 => write_pod(dst, &packing::pack_normal_11_11_10(dir)),
            Self::Packed888 => write_pod(dst, &PackedNormal888::from_vec3(dir)),
        }
    }
}

/// Converts one element from a source storage type to a destination storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConvertFunction {
    /// Raw byte copy between identically laid out types.
    Reinterpret { size: u32 },
    /// Component-wise conversion; extra destination components are zeroed.
    Components {
        rule: ComponentRule,
        dst: StorageType,
        src: StorageType,
    },
    /// float3 → float4 with `w = 1.0`.
    PositionAddW,
    /// Decodes a direction and re-encodes it.
    Normal {
        dst: NormalEncoding,
        src: NormalEncoding,
    },
    /// A single float bone index → the same index in all three slots of `dst`.
    BlendIndicesFromFloat1 { dst: StorageType },
}

impl ConvertFunction {
    /// Converts `src` into `dst`.
    ///
    /// Both slices must hold at least one element of their storage type.
    pub fn apply(&self, dst: &mut [u8], src: &[u8]) {
        match *self {
            ConvertFunction::Reinterpret { size } => {
                let size = size as usize;
                if let (Some(dst), Some(src)) = (dst.get_mut(..size), src.get(..size)) {
                    dst.copy_from_slice(src);
                }
            }
            ConvertFunction::Components { rule, dst: dst_type, src: src_type } => {
                convert_components(rule, dst_type, dst, src_type, src);
            }
            ConvertFunction::PositionAddW => {
                let position = Float3::read(src).unwrap_or_default();
                let mut out = Float4::default();
                copy_components_flat(&mut out, &position, 0);
                *out.w_mut() = 1.0;
                out.write(dst);
            }
            ConvertFunction::Normal { dst: encoding, src: decoding } => {
                encoding.encode(dst, decoding.decode(src));
            }
            ConvertFunction::BlendIndicesFromFloat1 { dst: dst_type } => {
                let index = Float1::read(src).unwrap_or_default().x() as u8;
                write_element(dst_type, dst, &Ubyte3::new([index; 3]));
            }
        }
    }
}

/// Checks that a source element survives a particular conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationFunction {
    /// Every float component fits the 16-bit fixed point range.
    FixedPointRange { src: StorageType },
    /// A float3 direction has unit length.
    UnitLengthNormal,
}

impl ValidationFunction {
    pub fn validate(&self, src: &[u8]) -> bool {
        match *self {
            ValidationFunction::FixedPointRange { src: src_type } => {
                match src_type.component_count() {
                    1 => floats_in_fixed_range::<1>(src),
                    2 => floats_in_fixed_range::<2>(src),
                    3 => floats_in_fixed_range::<3>(src),
                    4 => floats_in_fixed_range::<4>(src),
                    _ => false,
                }
            }
            ValidationFunction::UnitLengthNormal => Float3::read(src)
                .is_some_and(|v| packing::is_unit_length(Vec3::from_array(v.0))),
        }
    }
}

fn floats_in_fixed_range<const N: usize>(src: &[u8]) -> bool {
    ElementValue::<f32, N>::read(src)
        .is_some_and(|value| validate_components(&value, packing::fixed16_in_range))
}

/// Synthesizes a destination element that has no source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefaultValueFunction {
    /// All bytes zero.
    Zero { size: u32 },
    /// The storage type's own default value.
    TypeDefault(StorageType),
    /// Two blend weights with everything on the first bone.
    BlendWeights,
}

impl DefaultValueFunction {
    /// Writes the default value into the front of `dst`.
    pub fn fill(&self, dst: &mut [u8]) {
        match *self {
            DefaultValueFunction::Zero { size } => {
                let size = (size as usize).min(dst.len());
                dst[..size].fill(0);
            }
            DefaultValueFunction::TypeDefault(storage) => match storage {
                StorageType::Ubyte4Normal888 => write_pod(dst, &PackedNormal888::default()),
                StorageType::ReversePaddedWideWW => {
                    write_pod(dst, &ReversePaddedWideWeights::default())
                }
                StorageType::ReversePaddedWW => write_pod(dst, &ReversePaddedWeights::default()),
                other => DefaultValueFunction::Zero { size: other.size() }.fill(dst),
            },
            DefaultValueFunction::BlendWeights => {
                DEFAULT_BLEND_WEIGHTS.write(dst);
            }
        }
    }
}

// ============================================================================
// Byte helpers
// ============================================================================

fn read_pod<T: Pod>(bytes: &[u8]) -> Option<T> {
    bytes
        .get(..size_of::<T>())
        .map(bytemuck::pod_read_unaligned)
}

fn write_pod<T: Pod>(bytes: &mut [u8], value: &T) {
    if let Some(dst) = bytes.get_mut(..size_of::<T>()) {
        dst.copy_from_slice(bytemuck::bytes_of(value));
    }
}

// ============================================================================
// Component pipeline
// ============================================================================
//
// source bytes → ElementValue<S, SN> → ElementValue<D, DN> → destination bytes
//
// The scalar types and component counts are picked at runtime from the
// storage types, then everything below is monomorphized.

fn convert_components(
    rule: ComponentRule,
    dst_type: StorageType,
    dst: &mut [u8],
    src_type: StorageType,
    src: &[u8],
) {
    let (Some(dst_scalar), Some(src_scalar)) = (dst_type.scalar(), src_type.scalar()) else {
        return;
    };

    if rule == ComponentRule::Assignment && dst_scalar == src_scalar {
        let job = FlatJob {
            dst_type,
            src_type,
        };
        match dst_scalar {
            ScalarKind::F32 => job.run::<f32>(dst, src),
            ScalarKind::F16 => job.run::<f16>(dst, src),
            ScalarKind::U8 => job.run::<u8>(dst, src),
            ScalarKind::I16 => job.run::<i16>(dst, src),
            ScalarKind::U16 => job.run::<u16>(dst, src),
            ScalarKind::Packed => {}
        }
        return;
    }

    let job = ComponentJob {
        rule,
        dst_type,
        src_type,
    };
    match dst_scalar {
        ScalarKind::F32 => job.with_destination::<f32>(src_scalar, dst, src),
        ScalarKind::F16 => job.with_destination::<f16>(src_scalar, dst, src),
        ScalarKind::U8 => job.with_destination::<u8>(src_scalar, dst, src),
        ScalarKind::I16 => job.with_destination::<i16>(src_scalar, dst, src),
        ScalarKind::U16 => job.with_destination::<u16>(src_scalar, dst, src),
        ScalarKind::Packed => {}
    }
}

#[derive(Clone, Copy)]
struct ComponentJob {
    rule: ComponentRule,
    dst_type: StorageType,
    src_type: StorageType,
}

impl ComponentJob {
    fn with_destination<D: Component>(self, src_scalar: ScalarKind, dst: &mut [u8], src: &[u8]) {
        match src_scalar {
            ScalarKind::F32 => self.with_source::<D, f32>(dst, src),
            ScalarKind::F16 => self.with_source::<D, f16>(dst, src),
            ScalarKind::U8 => self.with_source::<D, u8>(dst, src),
            ScalarKind::I16 => self.with_source::<D, i16>(dst, src),
            ScalarKind::U16 => self.with_source::<D, u16>(dst, src),
            ScalarKind::Packed => {}
        }
    }

    fn with_source<D: Component, S: Component>(self, dst: &mut [u8], src: &[u8]) {
        match self.src_type.component_count() {
            1 => self.read::<D, S, 1>(dst, src),
            2 => self.read::<D, S, 2>(dst, src),
            3 => self.read::<D, S, 3>(dst, src),
            4 => self.read::<D, S, 4>(dst, src),
            _ => {}
        }
    }

    fn read<D: Component, S: Component, const SN: usize>(self, dst: &mut [u8], src: &[u8]) {
        let value = read_element::<S, SN>(self.src_type, src);
        match self.dst_type.component_count() {
            1 => self.store::<D, S, 1, SN>(dst, &value),
            2 => self.store::<D, S, 2, SN>(dst, &value),
            3 => self.store::<D, S, 3, SN>(dst, &value),
            4 => self.store::<D, S, 4, SN>(dst, &value),
            _ => {}
        }
    }

    fn store<D: Component, S: Component, const DN: usize, const SN: usize>(
        self,
        dst: &mut [u8],
        value: &ElementValue<S, SN>,
    ) {
        let mut out = ElementValue::<D, DN>::default();
        match self.rule {
            ComponentRule::Assignment => {
                copy_components(&mut out, value, 0, |c| D::from_f32(c.to_f32()))
            }
            ComponentRule::Normalized => {
                copy_components(&mut out, value, 0, |c| D::from_unit(c.to_unit()))
            }
            ComponentRule::FixedPoint => {
                copy_components(&mut out, value, 0, |c| D::from_fixed(c.to_fixed()))
            }
        }
        write_element(self.dst_type, dst, &out);
    }
}

/// Same scalar type on both sides: components are copied without conversion.
#[derive(Clone, Copy)]
struct FlatJob {
    dst_type: StorageType,
    src_type: StorageType,
}

impl FlatJob {
    fn run<T: Component>(self, dst: &mut [u8], src: &[u8]) {
        match self.src_type.component_count() {
            1 => self.read::<T, 1>(dst, src),
            2 => self.read::<T, 2>(dst, src),
            3 => self.read::<T, 3>(dst, src),
            4 => self.read::<T, 4>(dst, src),
            _ => {}
        }
    }

    fn read<T: Component, const SN: usize>(self, dst: &mut [u8], src: &[u8]) {
        let value = read_element::<T, SN>(self.src_type, src);
        match self.dst_type.component_count() {
            1 => self.store::<T, 1, SN>(dst, &value),
            2 => self.store::<T, 2, SN>(dst, &value),
            3 => self.store::<T, 3, SN>(dst, &value),
            4 => self.store::<T, 4, SN>(dst, &value),
            _ => {}
        }
    }

    fn store<T: Component, const DN: usize, const SN: usize>(
        self,
        dst: &mut [u8],
        value: &ElementValue<T, SN>,
    ) {
        let mut out = ElementValue::<T, DN>::default();
        copy_components_flat(&mut out, value, 0);
        write_element(self.dst_type, dst, &out);
    }
}

/// Reads a storage type's components, undoing any special byte layout.
fn read_element<S: Component, const N: usize>(
    storage: StorageType,
    bytes: &[u8],
) -> ElementValue<S, N> {
    match storage {
        StorageType::Div3III => widen(read_special::<Div3Indices>(bytes).components()),
        StorageType::ReverseIII => widen(read_special::<ReverseIndices>(bytes).components()),
        StorageType::ReversePaddedIII => {
            widen(read_special::<ReversePaddedIndices>(bytes).components())
        }
        StorageType::ReversePaddedWideWW => {
            widen(read_special::<ReversePaddedWideWeights>(bytes).components())
        }
        StorageType::ReversePaddedWW => {
            widen(read_special::<ReversePaddedWeights>(bytes).components())
        }
        _ => ElementValue::read(bytes).unwrap_or_default(),
    }
}

/// Writes components in a storage type's byte layout.
fn write_element<D: Component, const N: usize>(
    storage: StorageType,
    bytes: &mut [u8],
    value: &ElementValue<D, N>,
) {
    match storage {
        StorageType::Div3III => write_special::<Div3Indices, D, 3, N>(bytes, value),
        StorageType::ReverseIII => write_special::<ReverseIndices, D, 3, N>(bytes, value),
        StorageType::ReversePaddedIII => {
            write_special::<ReversePaddedIndices, D, 3, N>(bytes, value)
        }
        StorageType::ReversePaddedWideWW => {
            write_special::<ReversePaddedWideWeights, D, 2, N>(bytes, value)
        }
        StorageType::ReversePaddedWW => {
            write_special::<ReversePaddedWeights, D, 2, N>(bytes, value)
        }
        _ => {
            value.write(bytes);
        }
    }
}

fn read_special<E: SpecialElement>(bytes: &[u8]) -> E {
    read_pod(bytes).unwrap_or_default()
}

fn write_special<E, D, const M: usize, const N: usize>(bytes: &mut [u8], value: &ElementValue<D, N>)
where
    E: SpecialElement<Components = ElementValue<u8, M>>,
    D: Component,
{
    let mut components = ElementValue::<u8, M>::default();
    copy_components(&mut components, value, 0, |c| u8::from_f32(c.to_f32()));
    write_pod(bytes, &E::from_components(components));
}

fn widen<S: Component, const M: usize, const N: usize>(
    bytes: ElementValue<u8, M>,
) -> ElementValue<S, N> {
    let mut out = ElementValue::<S, N>::default();
    copy_components(&mut out, &bytes, 0, |c| S::from_f32(c as f32));
    out
}
