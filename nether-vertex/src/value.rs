//! Typed element values
//!
//! [`ElementValue`] is a fixed-length array of 1-4 homogeneous scalar
//! components with the exact byte layout of the matching [`StorageType`].
//! Conversion rules read source bytes into an `ElementValue`, map the
//! components through a per-component function and write the result back out.

mod special;

pub use special::{
    DEFAULT_BLEND_WEIGHTS, Div3Indices, PackedColor, PackedNormal888, ReverseIndices,
    ReversePaddedIndices, ReversePaddedWeights, ReversePaddedWideWeights, SpecialElement,
};

use crate::packing;
use crate::registry::StorageType;
use bytemuck::{Pod, Zeroable};
use half::f16;
use std::fmt;
use std::ops::{Index, IndexMut};

// ============================================================================
// Scalar components
// ============================================================================

/// A scalar that can be stored as a vertex element component.
///
/// Besides plain numeric assignment, each scalar knows how to map itself to
/// and from the normalized and fixed-point float ranges used by conversions.
pub trait Component: Pod + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Plain numeric value (saturating on the way back in).
    fn to_f32(self) -> f32;
    fn from_f32(value: f32) -> Self;

    /// Normalized value: [0, 1] for unsigned, [-1, 1] for signed integers.
    fn to_unit(self) -> f32 {
        self.to_f32()
    }
    fn from_unit(value: f32) -> Self {
        Self::from_f32(value)
    }

    /// Fixed-point value (only meaningful for 16-bit signed integers).
    fn to_fixed(self) -> f32 {
        self.to_f32()
    }
    fn from_fixed(value: f32) -> Self {
        Self::from_f32(value)
    }
}

impl Component for f32 {
    #[inline]
    fn to_f32(self) -> f32 {
        self
    }
    #[inline]
    fn from_f32(value: f32) -> Self {
        value
    }
}

impl Component for f16 {
    #[inline]
    fn to_f32(self) -> f32 {
        f16::to_f32(self)
    }
    #[inline]
    fn from_f32(value: f32) -> Self {
        f16::from_f32(value)
    }
}

impl Component for u8 {
    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }
    #[inline]
    fn from_f32(value: f32) -> Self {
        value as u8
    }
    #[inline]
    fn to_unit(self) -> f32 {
        packing::unorm8_to_f32(self)
    }
    #[inline]
    fn from_unit(value: f32) -> Self {
        packing::f32_to_unorm8(value)
    }
}

impl Component for i16 {
    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }
    #[inline]
    fn from_f32(value: f32) -> Self {
        value as i16
    }
    #[inline]
    fn to_unit(self) -> f32 {
        packing::snorm16_to_f32(self)
    }
    #[inline]
    fn from_unit(value: f32) -> Self {
        packing::f32_to_snorm16(value)
    }
    #[inline]
    fn to_fixed(self) -> f32 {
        packing::fixed16_to_f32(self)
    }
    #[inline]
    fn from_fixed(value: f32) -> Self {
        packing::f32_to_fixed16(value)
    }
}

impl Component for u16 {
    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }
    #[inline]
    fn from_f32(value: f32) -> Self {
        value as u16
    }
    #[inline]
    fn to_unit(self) -> f32 {
        packing::unorm16_to_f32(self)
    }
    #[inline]
    fn from_unit(value: f32) -> Self {
        packing::f32_to_unorm16(value)
    }
}

// ============================================================================
// ElementValue
// ============================================================================

/// Fixed-length array of `N` scalar components (1 ≤ N ≤ 4).
#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct ElementValue<T: Component, const N: usize>(pub [T; N]);

// SAFETY: `ElementValue` is a transparent wrapper around `[T; N]` with `T: Pod`.
unsafe impl<T: Component, const N: usize> Zeroable for ElementValue<T, N> {}
unsafe impl<T: Component, const N: usize> Pod for ElementValue<T, N> {}

pub type Float1 = ElementValue<f32, 1>;
pub type Float2 = ElementValue<f32, 2>;
pub type Float3 = ElementValue<f32, 3>;
pub type Float4 = ElementValue<f32, 4>;
pub type Half2 = ElementValue<f16, 2>;
pub type Half4 = ElementValue<f16, 4>;
pub type Ubyte1 = ElementValue<u8, 1>;
pub type Ubyte2 = ElementValue<u8, 2>;
pub type Ubyte3 = ElementValue<u8, 3>;
pub type Ubyte4 = ElementValue<u8, 4>;
pub type Short1 = ElementValue<i16, 1>;
pub type Short2 = ElementValue<i16, 2>;
pub type Short3 = ElementValue<i16, 3>;
pub type Short4 = ElementValue<i16, 4>;
pub type Ushort2 = ElementValue<u16, 2>;
pub type Ushort4 = ElementValue<u16, 4>;

impl<T: Component, const N: usize> ElementValue<T, N> {
    /// Number of components.
    pub const COUNT: usize = N;

    #[inline]
    pub const fn new(components: [T; N]) -> Self {
        Self(components)
    }

    /// Reads a value from the front of `bytes` (no alignment requirement).
    ///
    /// Returns `None` if `bytes` is too short.
    #[inline]
    pub fn read(bytes: &[u8]) -> Option<Self> {
        bytes
            .get(..size_of::<Self>())
            .map(bytemuck::pod_read_unaligned)
    }

    /// Writes the value to the front of `bytes`. Returns false if `bytes` is too short.
    #[inline]
    pub fn write(&self, bytes: &mut [u8]) -> bool {
        match bytes.get_mut(..size_of::<Self>()) {
            Some(dst) => {
                dst.copy_from_slice(bytemuck::bytes_of(self));
                true
            }
            None => false,
        }
    }

    /// Compile-time indexed access.
    #[inline]
    pub fn get<const I: usize>(&self) -> T {
        const { assert!(I < N, "component index out of range") };
        self.0[I]
    }

    /// Compile-time indexed mutable access.
    #[inline]
    pub fn get_mut<const I: usize>(&mut self) -> &mut T {
        const { assert!(I < N, "component index out of range") };
        &mut self.0[I]
    }

    #[inline]
    pub fn components(&self) -> &[T; N] {
        &self.0
    }

    #[inline]
    pub fn x(&self) -> T {
        self.get::<0>()
    }
    #[inline]
    pub fn y(&self) -> T {
        self.get::<1>()
    }
    #[inline]
    pub fn z(&self) -> T {
        self.get::<2>()
    }
    #[inline]
    pub fn w(&self) -> T {
        self.get::<3>()
    }
    #[inline]
    pub fn x_mut(&mut self) -> &mut T {
        self.get_mut::<0>()
    }
    #[inline]
    pub fn y_mut(&mut self) -> &mut T {
        self.get_mut::<1>()
    }
    #[inline]
    pub fn z_mut(&mut self) -> &mut T {
        self.get_mut::<2>()
    }
    #[inline]
    pub fn w_mut(&mut self) -> &mut T {
        self.get_mut::<3>()
    }

    #[inline]
    pub fn r(&self) -> T {
        self.x()
    }
    #[inline]
    pub fn g(&self) -> T {
        self.y()
    }
    #[inline]
    pub fn b(&self) -> T {
        self.z()
    }
    #[inline]
    pub fn a(&self) -> T {
        self.w()
    }
    #[inline]
    pub fn r_mut(&mut self) -> &mut T {
        self.x_mut()
    }
    #[inline]
    pub fn g_mut(&mut self) -> &mut T {
        self.y_mut()
    }
    #[inline]
    pub fn b_mut(&mut self) -> &mut T {
        self.z_mut()
    }
    #[inline]
    pub fn a_mut(&mut self) -> &mut T {
        self.w_mut()
    }

    /// Byte-for-byte copy of `source`, clamped to the smaller of the two sizes.
    ///
    /// Bytes beyond the copied range keep their previous value.
    pub fn copy_bytes_from<S: Pod>(&mut self, source: &S) {
        let src = bytemuck::bytes_of(source);
        let dst = bytemuck::bytes_of_mut(self);
        let len = dst.len().min(src.len());
        dst[..len].copy_from_slice(&src[..len]);
    }

    /// Sets the last `count` components to `value`.
    pub fn fill_end_components(&mut self, count: usize, value: T) {
        let start = N.saturating_sub(count);
        self.0[start..].fill(value);
    }
}

impl<T: Component, const N: usize> Default for ElementValue<T, N> {
    fn default() -> Self {
        Zeroable::zeroed()
    }
}

impl<T: Component, const N: usize> From<[T; N]> for ElementValue<T, N> {
    fn from(components: [T; N]) -> Self {
        Self(components)
    }
}

/// Exact byte comparison.
impl<T: Component, const N: usize> PartialEq for ElementValue<T, N> {
    fn eq(&self, other: &Self) -> bool {
        bytemuck::bytes_of(self) == bytemuck::bytes_of(other)
    }
}

impl<T: Component, const N: usize> Eq for ElementValue<T, N> {}

impl<T: Component, const N: usize> fmt::Debug for ElementValue<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ElementValue").field(&self.0).finish()
    }
}

impl<T: Component, const N: usize> Index<usize> for ElementValue<T, N> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.0[index]
    }
}

impl<T: Component, const N: usize> IndexMut<usize> for ElementValue<T, N> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.0[index]
    }
}

// ============================================================================
// Component copies
// ============================================================================

/// Number of components a copy actually touches.
#[inline]
fn copied_components(dst: usize, src: usize, copy_count: usize) -> usize {
    let requested = if copy_count == 0 { dst } else { copy_count };
    dst.min(src).min(requested)
}

/// Copies components through `convert`, then zero-fills the rest of `dst`.
///
/// Copies `min(DN, SN, copy_count)` components, where a `copy_count` of 0
/// means "all destination components".
pub fn copy_components<D, S, const DN: usize, const SN: usize>(
    dst: &mut ElementValue<D, DN>,
    src: &ElementValue<S, SN>,
    copy_count: usize,
    convert: impl Fn(S) -> D,
) where
    D: Component,
    S: Component,
{
    let count = copied_components(DN, SN, copy_count);
    for i in 0..count {
        dst.0[i] = convert(src.0[i]);
    }
    dst.fill_end_components(DN - count, D::zeroed());
}

/// Same-scalar copy: a flat memory copy of the shared components, then zero-fill.
pub fn copy_components_flat<T: Component, const DN: usize, const SN: usize>(
    dst: &mut ElementValue<T, DN>,
    src: &ElementValue<T, SN>,
    copy_count: usize,
) {
    let count = copied_components(DN, SN, copy_count);
    dst.0[..count].copy_from_slice(&src.0[..count]);
    dst.fill_end_components(DN - count, T::zeroed());
}

/// Returns true only if every component satisfies `validate`.
pub fn validate_components<T: Component, const N: usize>(
    src: &ElementValue<T, N>,
    validate: impl Fn(T) -> bool,
) -> bool {
    src.0.iter().all(|&component| validate(component))
}

// ============================================================================
// Rust type ↔ storage type
// ============================================================================

/// A plain-old-data Rust type with a fixed storage type.
///
/// Used by typed accessors to convert buffer contents to and from concrete
/// Rust values.
pub trait ElementType: Pod {
    const STORAGE: StorageType;
}

macro_rules! element_types {
    ($($ty:ty => $storage:ident),* $(,)?) => {
        $(
            impl ElementType for $ty {
                const STORAGE: StorageType = StorageType::$storage;
            }
        )*
    };
}

element_types! {
    f32 => Float1,
    Float1 => Float1,
    Float2 => Float2,
    Float3 => Float3,
    Float4 => Float4,
    glam::Vec2 => Float2,
    glam::Vec3 => Float3,
    glam::Vec4 => Float4,
    Half2 => Half2,
    Half4 => Half4,
    Ubyte1 => Ubyte1,
    Ubyte2 => Ubyte2,
    Ubyte3 => Ubyte3,
    Ubyte4 => Ubyte4,
    Short1 => Short1,
    Short2 => Short2,
    Short3 => Short3,
    Short4 => Short4,
    Ushort2 => Ushort2N,
    Ushort4 => Ushort4N,
    PackedColor => Color,
    PackedNormal888 => Ubyte4Normal888,
    Div3Indices => Div3III,
    ReverseIndices => ReverseIII,
    ReversePaddedIndices => ReversePaddedIII,
    ReversePaddedWideWeights => ReversePaddedWideWW,
    ReversePaddedWeights => ReversePaddedWW,
}

#[cfg(test)]
mod tests;
