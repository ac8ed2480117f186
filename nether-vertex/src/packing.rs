//! Vertex data packing utilities
//!
//! Scalar and direction encodings used by the conversion rules:
//! - f32 ↔ unorm8 / unorm16 (unsigned normalized, 0.0 to 1.0)
//! - f32 ↔ snorm16 (signed normalized, -1.0 to 1.0)
//! - f32 ↔ fixed16 (signed 16-bit with 11 fractional bits)
//! - f32x3 ↔ 11-11-10 packed normals
//! - f32x3 ↔ biased 8-8-8 packed normals

use glam::Vec3;

// ============================================================================
// Constants
// ============================================================================

/// Fractional scale of the 16-bit fixed point encoding (11 fractional bits).
pub const FIXED16_SCALE: f32 = 2048.0;

/// Allowed deviation from unit length before a normal is rejected.
pub const NORMAL_LENGTH_TOLERANCE: f32 = 0.01;

// ============================================================================
// Basic Conversion Functions
// ============================================================================

/// Convert f32 to signed normalized 16-bit integer (snorm16)
///
/// Maps f32 range [-1.0, 1.0] to i16 range [-32767, 32767].
#[inline]
pub fn f32_to_snorm16(value: f32) -> i16 {
    let clamped = value.clamp(-1.0, 1.0);
    (clamped * 32767.0) as i16
}

/// Convert snorm16 back to f32 in [-1.0, 1.0]
#[inline]
pub fn snorm16_to_f32(value: i16) -> f32 {
    (value as f32 / 32767.0).max(-1.0)
}

/// Convert f32 to unsigned normalized 8-bit integer (unorm8)
///
/// Maps f32 range [0.0, 1.0] to u8 range [0, 255].
#[inline]
pub fn f32_to_unorm8(value: f32) -> u8 {
    let clamped = value.clamp(0.0, 1.0);
    (clamped * 255.0) as u8
}

/// Convert unorm8 back to f32 in [0.0, 1.0]
#[inline]
pub fn unorm8_to_f32(value: u8) -> f32 {
    value as f32 / 255.0
}

/// Convert f32 to unsigned normalized 16-bit integer (unorm16)
#[inline]
pub fn f32_to_unorm16(value: f32) -> u16 {
    (value.clamp(0.0, 1.0) * 65535.0) as u16
}

/// Convert unorm16 back to f32 in [0.0, 1.0]
#[inline]
pub fn unorm16_to_f32(value: u16) -> f32 {
    value as f32 / 65535.0
}

// ============================================================================
// Fixed Point
// ============================================================================

/// Convert f32 to 16-bit fixed point, saturating at the i16 range.
#[inline]
pub fn f32_to_fixed16(value: f32) -> i16 {
    (value * FIXED16_SCALE)
        .round()
        .clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Convert 16-bit fixed point back to f32
#[inline]
pub fn fixed16_to_f32(value: i16) -> f32 {
    value as f32 / FIXED16_SCALE
}

/// Returns true if `value` survives [`f32_to_fixed16`] without saturating.
#[inline]
pub fn fixed16_in_range(value: f32) -> bool {
    let scaled = (value * FIXED16_SCALE).round();
    scaled.is_finite() && scaled >= i16::MIN as f32 && scaled <= i16::MAX as f32
}

// ============================================================================
// Normal Packing
// ============================================================================

/// Pack a direction into 11-11-10 signed fields (x: bits 0-10, y: 11-21, z: 22-31).
///
/// The input is normalized first. Zero-length input packs to zero.
#[inline]
pub fn pack_normal_11_11_10(dir: Vec3) -> u32 {
    let n = dir
        .normalize_or_zero()
        .clamp(Vec3::splat(-1.0), Vec3::splat(1.0));
    let z = ((n.z * 511.0) as i32 as u32) & 0x3ff;
    let y = ((n.y * 1023.0) as i32 as u32) & 0x7ff;
    let x = ((n.x * 1023.0) as i32 as u32) & 0x7ff;
    (z << 22) | (y << 11) | x
}

/// Unpack an 11-11-10 packed direction, sign-extending each field.
#[inline]
pub fn unpack_normal_11_11_10(packed: u32) -> Vec3 {
    let z = (packed as i32) >> 22;
    let y = ((packed << 10) as i32) >> 21;
    let x = ((packed << 21) as i32) >> 21;
    Vec3::new(x as f32 / 1023.0, y as f32 / 1023.0, z as f32 / 511.0)
}

/// Pack a direction into three biased bytes `[x, y, z, 0]`.
///
/// Each component maps [-1.0, 1.0] to [0, 255].
#[inline]
pub fn pack_normal_888(dir: Vec3) -> [u8; 4] {
    let n = dir
        .normalize_or_zero()
        .clamp(Vec3::splat(-1.0), Vec3::splat(1.0));
    let bias = |c: f32| ((c * 0.5 + 0.5) * 255.0).round() as u8;
    [bias(n.x), bias(n.y), bias(n.z), 0]
}

/// Unpack a biased 8-8-8 direction. The fourth byte is ignored.
#[inline]
pub fn unpack_normal_888(packed: [u8; 4]) -> Vec3 {
    let unbias = |b: u8| b as f32 / 255.0 * 2.0 - 1.0;
    Vec3::new(unbias(packed[0]), unbias(packed[1]), unbias(packed[2]))
}

/// Returns true if `dir` has unit length within [`NORMAL_LENGTH_TOLERANCE`].
#[inline]
pub fn is_unit_length(dir: Vec3) -> bool {
    let length = dir.length();
    length.is_finite() && (length - 1.0).abs() <= NORMAL_LENGTH_TOLERANCE
}
