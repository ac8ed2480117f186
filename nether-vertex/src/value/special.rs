//! Packed and reordered element encodings
//!
//! These types have the byte layout of their storage type but expose their
//! contents as plain component arrays (`x` first), so conversion rules can
//! treat them like any other element.

use super::{ElementValue, Ubyte2, Ubyte3};
use crate::packing;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// An encoding whose components are bytes stored in a non-linear layout.
pub trait SpecialElement: Pod + Default {
    /// Canonical component array (`x` first).
    type Components: Copy;

    fn components(&self) -> Self::Components;
    fn from_components(components: Self::Components) -> Self;
}

// ============================================================================
// Color
// ============================================================================

/// 32-bit ARGB color (`0xAARRGGBB`), stored little-endian as B, G, R, A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(transparent)]
pub struct PackedColor(pub u32);

impl PackedColor {
    #[inline]
    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }
    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }
    #[inline]
    pub const fn b(self) -> u8 {
        self.0 as u8
    }
    #[inline]
    pub const fn a(self) -> u8 {
        (self.0 >> 24) as u8
    }
}

// ============================================================================
// Packed normal
// ============================================================================

/// Direction packed as three biased bytes plus padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(transparent)]
pub struct PackedNormal888(pub [u8; 4]);

impl PackedNormal888 {
    #[inline]
    pub fn from_vec3(dir: Vec3) -> Self {
        Self(packing::pack_normal_888(dir))
    }

    #[inline]
    pub fn to_vec3(self) -> Vec3 {
        packing::unpack_normal_888(self.0)
    }
}

/// The packed zero vector.
impl Default for PackedNormal888 {
    fn default() -> Self {
        Self::from_vec3(Vec3::ZERO)
    }
}

// ============================================================================
// Bone indices
// ============================================================================

/// Three bone indices stored divided by 3.
///
/// Runtime indices are pre-multiplied by 3, so reading multiplies the stored
/// bytes by 3 (saturating) and writing divides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(transparent)]
pub struct Div3Indices(pub [u8; 3]);

impl SpecialElement for Div3Indices {
    type Components = Ubyte3;

    fn components(&self) -> Ubyte3 {
        ElementValue(self.0.map(|stored| stored.saturating_mul(3)))
    }

    fn from_components(components: Ubyte3) -> Self {
        Self(components.0.map(|index| index / 3))
    }
}

/// Three bone indices stored as `[z, y, x]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(transparent)]
pub struct ReverseIndices(pub [u8; 3]);

impl SpecialElement for ReverseIndices {
    type Components = Ubyte3;

    fn components(&self) -> Ubyte3 {
        let [z, y, x] = self.0;
        ElementValue([x, y, z])
    }

    fn from_components(components: Ubyte3) -> Self {
        let [x, y, z] = components.0;
        Self([z, y, x])
    }
}

/// Three bone indices stored as `[z, y, x, pad]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(transparent)]
pub struct ReversePaddedIndices(pub [u8; 4]);

impl SpecialElement for ReversePaddedIndices {
    type Components = Ubyte3;

    fn components(&self) -> Ubyte3 {
        let [z, y, x, _] = self.0;
        ElementValue([x, y, z])
    }

    fn from_components(components: Ubyte3) -> Self {
        let [x, y, z] = components.0;
        Self([z, y, x, 0])
    }
}

// ============================================================================
// Bone weights
// ============================================================================

/// Default weights for two-bone skinning: everything on the first bone.
pub const DEFAULT_BLEND_WEIGHTS: Ubyte2 = ElementValue([255, 0]);

/// Two bone weights stored as `[pad, y, x, pad]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(transparent)]
pub struct ReversePaddedWideWeights(pub [u8; 4]);

impl SpecialElement for ReversePaddedWideWeights {
    type Components = Ubyte2;

    fn components(&self) -> Ubyte2 {
        let [_, y, x, _] = self.0;
        ElementValue([x, y])
    }

    fn from_components(components: Ubyte2) -> Self {
        let [x, y] = components.0;
        Self([0, y, x, 0])
    }
}

impl Default for ReversePaddedWideWeights {
    fn default() -> Self {
        Self::from_components(DEFAULT_BLEND_WEIGHTS)
    }
}

/// Two bone weights stored as `[y, x, pad]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(transparent)]
pub struct ReversePaddedWeights(pub [u8; 3]);

impl SpecialElement for ReversePaddedWeights {
    type Components = Ubyte2;

    fn components(&self) -> Ubyte2 {
        let [y, x, _] = self.0;
        ElementValue([x, y])
    }

    fn from_components(components: Ubyte2) -> Self {
        let [x, y] = components.0;
        Self([y, x, 0])
    }
}

impl Default for ReversePaddedWeights {
    fn default() -> Self {
        Self::from_components(DEFAULT_BLEND_WEIGHTS)
    }
}
