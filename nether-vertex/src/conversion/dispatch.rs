//! Function selection
//!
//! Every request is resolved in two tiers: semantic-specific rules first,
//! then the default rules for the (destination, source) storage pair. No
//! matching rule means the conversion is unsupported.

use super::functions::{
    ComponentRule, ConvertFunction, DefaultValueFunction, NormalEncoding, ValidationFunction,
};
use crate::registry::{Semantic, StorageType};

// ============================================================================
// Conversion
// ============================================================================

pub(super) fn semantic_convert_function(
    semantic: Semantic,
    dst: StorageType,
    src: StorageType,
) -> Option<ConvertFunction> {
    match semantic {
        Semantic::Position => match (dst, src) {
            (StorageType::Float4, StorageType::Float3) => Some(ConvertFunction::PositionAddW),
            _ => None,
        },
        s if s.is_normal_like() => {
            let (dst_encoding, src_encoding) = (NormalEncoding::of(dst)?, NormalEncoding::of(src)?);
            if dst == src {
                None
            } else if dst_encoding == src_encoding {
                Some(ConvertFunction::Reinterpret { size: dst.size() })
            } else {
                Some(ConvertFunction::Normal {
                    dst: dst_encoding,
                    src: src_encoding,
                })
            }
        }
        Semantic::BlendIndices => match (dst, src) {
            (
                StorageType::Ubyte3 | StorageType::ReverseIII | StorageType::ReversePaddedIII,
                StorageType::Float1,
            ) => Some(ConvertFunction::BlendIndicesFromFloat1 { dst }),
            _ => None,
        },
        _ => None,
    }
}

pub(super) fn default_convert_function(
    dst: StorageType,
    src: StorageType,
) -> Option<ConvertFunction> {
    use StorageType as T;

    if dst == T::Unknown || src == T::Unknown {
        return None;
    }
    if dst == src {
        return Some(ConvertFunction::Reinterpret { size: dst.size() });
    }

    let rule = match (dst, src) {
        // Numeric families
        (d, s) if d.is_float() && s.is_ubyte() => ComponentRule::Normalized,
        (d, s) if d.is_ubyte() && s.is_float() => ComponentRule::Normalized,
        (d, s) if d.is_float() && s.is_short() => ComponentRule::FixedPoint,
        (d, s) if d.is_short() && s.is_float() => ComponentRule::FixedPoint,
        (d, s) if d.is_float() && s.is_float() => ComponentRule::Assignment,
        (d, s) if d.is_ubyte() && s.is_ubyte() => ComponentRule::Assignment,
        (d, s) if d.is_short() && s.is_short() => ComponentRule::Assignment,

        // Half floats
        (T::Half2 | T::Half4, s) if s.is_float() => ComponentRule::Assignment,
        (d, T::Half2 | T::Half4) if d.is_float() => ComponentRule::Assignment,

        // Normalized integers
        (T::Ubyte4N | T::Short2N | T::Short4N | T::Ushort2N | T::Ushort4N, s) if s.is_float() => {
            ComponentRule::Normalized
        }
        (d, T::Ubyte4N | T::Short2N | T::Short4N | T::Ushort2N | T::Ushort4N) if d.is_float() => {
            ComponentRule::Normalized
        }

        // Colors
        (T::Ubyte4, T::Color) | (T::Color, T::Ubyte4) => {
            return Some(ConvertFunction::Reinterpret { size: 4 });
        }
        (T::Ubyte2 | T::Ubyte3, T::Color) | (T::Color, T::Ubyte2 | T::Ubyte3) => {
            ComponentRule::Assignment
        }

        // Bone index and weight encodings
        (T::ReverseIII | T::ReversePaddedIII, T::Ubyte3 | T::Float1) => ComponentRule::Assignment,
        (T::Ubyte3, T::ReverseIII | T::ReversePaddedIII | T::Div3III) => ComponentRule::Assignment,
        (T::ReversePaddedWW | T::ReversePaddedWideWW, T::Ubyte2) => ComponentRule::Assignment,

        _ => return None,
    };

    Some(ConvertFunction::Components { rule, dst, src })
}

// ============================================================================
// Validation
// ============================================================================

pub(super) fn semantic_validation_function(
    semantic: Semantic,
    dst: StorageType,
    src: StorageType,
) -> Option<ValidationFunction> {
    let packs_normal = matches!(
        dst,
        StorageType::Ubyte4 | StorageType::Ubyte4N | StorageType::Ubyte4Normal888
    );
    (semantic.is_normal_like() && src == StorageType::Float3 && packs_normal)
        .then_some(ValidationFunction::UnitLengthNormal)
}

pub(super) fn default_validation_function(
    dst: StorageType,
    src: StorageType,
) -> Option<ValidationFunction> {
    (dst.is_short() && src.is_float()).then_some(ValidationFunction::FixedPointRange { src })
}

// ============================================================================
// Default values
// ============================================================================

pub(super) fn semantic_default_value_function(
    semantic: Semantic,
    dst: StorageType,
) -> Option<DefaultValueFunction> {
    match (semantic, dst) {
        (Semantic::BlendWeight, StorageType::Ubyte2) => Some(DefaultValueFunction::BlendWeights),
        _ => None,
    }
}

pub(super) fn default_default_value_function(dst: StorageType) -> Option<DefaultValueFunction> {
    match dst {
        StorageType::Unknown => None,
        StorageType::Ubyte4Normal888
        | StorageType::ReversePaddedWideWW
        | StorageType::ReversePaddedWW => Some(DefaultValueFunction::TypeDefault(dst)),
        other => Some(DefaultValueFunction::Zero { size: other.size() }),
    }
}
