use super::*;
use crate::error::ConversionError;
use crate::format::VertexFormat;
use crate::packing;
use crate::value::{DEFAULT_BLEND_WEIGHTS, Float2, Float3, Float4, Ubyte2, Ubyte3, Ubyte4};
use glam::Vec3;

/// Builds a format from (stream, semantic, storage) triples, adding streams as needed.
fn format(name: &str, elements: &[(u32, Semantic, StorageType)]) -> VertexFormat {
    let mut format = VertexFormat::new(name);
    for &(stream, semantic, storage) in elements {
        while format.stream_count() <= stream {
            format.add_stream();
        }
        format.add_element(stream, semantic, storage).unwrap();
    }
    format
}

fn floats(values: &[f32]) -> Vec<u8> {
    bytemuck::cast_slice(values).to_vec()
}

fn convert_one<const N: usize>(
    semantic: Semantic,
    dst_type: StorageType,
    src: &[u8],
    src_type: StorageType,
) -> [u8; N] {
    let mut dst = [0u8; N];
    assert!(
        convert_value(semantic, &mut dst, dst_type, src, src_type),
        "{semantic}: {src_type} -> {dst_type}"
    );
    dst
}

// ============================================================================
// Function selection
// ============================================================================

#[test]
fn test_semantic_functions_take_precedence() {
    assert_eq!(
        fetch_convert_function(Semantic::Position, StorageType::Float4, StorageType::Float3),
        Some(ConvertFunction::PositionAddW)
    );
    assert_eq!(
        fetch_convert_function(Semantic::TexCoord, StorageType::Float4, StorageType::Float3),
        Some(ConvertFunction::Components {
            rule: ComponentRule::Assignment,
            dst: StorageType::Float4,
            src: StorageType::Float3,
        })
    );
    assert_eq!(
        fetch_convert_function(Semantic::Normal, StorageType::Ubyte4, StorageType::Float3),
        Some(ConvertFunction::Normal {
            dst: NormalEncoding::Packed11_11_10,
            src: NormalEncoding::Float3,
        })
    );
    assert_eq!(
        fetch_convert_function(Semantic::TexCoord, StorageType::Ubyte4, StorageType::Float3),
        Some(ConvertFunction::Components {
            rule: ComponentRule::Normalized,
            dst: StorageType::Ubyte4,
            src: StorageType::Float3,
        })
    );
}

#[test]
fn test_normal_encodings() {
    assert_eq!(
        fetch_convert_function(Semantic::Tangent, StorageType::Ubyte4N, StorageType::Ubyte4),
        Some(ConvertFunction::Reinterpret { size: 4 })
    );
    assert_eq!(
        fetch_convert_function(
            Semantic::Binormal,
            StorageType::Float3,
            StorageType::Ubyte4Normal888
        ),
        Some(ConvertFunction::Normal {
            dst: NormalEncoding::Float3,
            src: NormalEncoding::Packed888,
        })
    );
    assert_eq!(
        fetch_convert_function(Semantic::Normal, StorageType::Float3, StorageType::Float3),
        Some(ConvertFunction::Reinterpret { size: 12 })
    );
}

#[test]
fn test_unsupported_conversions() {
    assert_eq!(
        fetch_convert_function(Semantic::Normal, StorageType::Short2, StorageType::Color),
        None
    );
    assert_eq!(
        fetch_convert_function(Semantic::Position, StorageType::Unknown, StorageType::Float3),
        None
    );
    assert_eq!(
        fetch_convert_function(Semantic::Position, StorageType::Float3, StorageType::UDec3),
        None
    );
}

#[test]
fn test_validation_selection() {
    assert_eq!(
        fetch_validation_function(Semantic::Normal, StorageType::Ubyte4, StorageType::Float3),
        Some(ValidationFunction::UnitLengthNormal)
    );
    assert_eq!(
        fetch_validation_function(Semantic::TexCoord, StorageType::Short2, StorageType::Float2),
        Some(ValidationFunction::FixedPointRange {
            src: StorageType::Float2
        })
    );
    assert_eq!(
        fetch_validation_function(Semantic::TexCoord, StorageType::Float4, StorageType::Float2),
        None
    );
}

#[test]
fn test_default_value_selection() {
    assert_eq!(
        fetch_default_value_function(Semantic::BlendWeight, StorageType::Ubyte2),
        Some(DefaultValueFunction::BlendWeights)
    );
    assert_eq!(
        fetch_default_value_function(Semantic::TexCoord, StorageType::Ubyte2),
        Some(DefaultValueFunction::Zero { size: 2 })
    );
    assert_eq!(
        fetch_default_value_function(Semantic::Normal, StorageType::Ubyte4Normal888),
        Some(DefaultValueFunction::TypeDefault(StorageType::Ubyte4Normal888))
    );
    assert_eq!(
        fetch_default_value_function(Semantic::Normal, StorageType::Unknown),
        None
    );
}

// ============================================================================
// Single values
// ============================================================================

#[test]
fn test_convert_value_failure_leaves_destination() {
    let mut dst = [0xAAu8; 4];
    let src = [1u8, 2, 3, 4];
    assert!(!convert_value(
        Semantic::Normal,
        &mut dst,
        StorageType::Short2,
        &src,
        StorageType::Color
    ));
    assert_eq!(dst, [0xAA; 4]);

    // Destination too short for FLOAT4
    let mut short = [0xAAu8; 12];
    assert!(!convert_value(
        Semantic::Position,
        &mut short,
        StorageType::Float4,
        &floats(&[1.0, 2.0, 3.0]),
        StorageType::Float3
    ));
    assert_eq!(short, [0xAA; 12]);
}

#[test]
fn test_position_round_trip() {
    let src = floats(&[1.0, 2.0, 3.0]);
    let wide: [u8; 16] = convert_one(Semantic::Position, StorageType::Float4, &src, StorageType::Float3);
    assert_eq!(Float4::read(&wide), Some(Float4::new([1.0, 2.0, 3.0, 1.0])));

    let narrow: [u8; 12] =
        convert_one(Semantic::Position, StorageType::Float3, &wide, StorageType::Float4);
    assert_eq!(&narrow[..], &src[..]);
}

#[test]
fn test_color_round_trip() {
    let color = [0.2, 0.4, 0.6, 1.0];
    let bytes: [u8; 4] =
        convert_one(Semantic::Color, StorageType::Ubyte4, &floats(&color), StorageType::Float4);
    assert_eq!(bytes[3], 255);

    let back: [u8; 16] = convert_one(Semantic::Color, StorageType::Float4, &bytes, StorageType::Ubyte4);
    let back = Float4::read(&back).unwrap();
    for (original, restored) in color.iter().zip(back.components()) {
        assert!((original - restored).abs() <= 1.0 / 255.0);
    }
}

#[test]
fn test_half_and_normalized_shorts() {
    let half: [u8; 4] =
        convert_one(Semantic::TexCoord, StorageType::Half2, &floats(&[0.5, -2.0]), StorageType::Float2);
    let back: [u8; 8] = convert_one(Semantic::TexCoord, StorageType::Float2, &half, StorageType::Half2);
    assert_eq!(Float2::read(&back), Some(Float2::new([0.5, -2.0])));

    let snorm: [u8; 4] = convert_one(
        Semantic::TexCoord,
        StorageType::Short2N,
        &floats(&[1.0, -1.0]),
        StorageType::Float2,
    );
    assert_eq!(
        bytemuck::pod_read_unaligned::<[i16; 2]>(&snorm),
        [i16::MAX, -i16::MAX]
    );
}

#[test]
fn test_fixed_point_shorts() {
    let fixed: [u8; 4] =
        convert_one(Semantic::TexCoord, StorageType::Short2, &floats(&[1.0, -0.5]), StorageType::Float2);
    assert_eq!(
        bytemuck::pod_read_unaligned::<[i16; 2]>(&fixed),
        [packing::f32_to_fixed16(1.0), packing::f32_to_fixed16(-0.5)]
    );

    let back: [u8; 8] = convert_one(Semantic::TexCoord, StorageType::Float2, &fixed, StorageType::Short2);
    assert_eq!(Float2::read(&back), Some(Float2::new([1.0, -0.5])));
}

#[test]
fn test_normal_packing() {
    let src = floats(&[0.0, 0.0, 1.0]);
    let packed: [u8; 4] = convert_one(Semantic::Normal, StorageType::Ubyte4, &src, StorageType::Float3);
    let unpacked = packing::unpack_normal_11_11_10(u32::from_le_bytes(packed));
    assert!(unpacked.abs_diff_eq(Vec3::Z, 0.01));

    let biased: [u8; 4] =
        convert_one(Semantic::Normal, StorageType::Ubyte4Normal888, &src, StorageType::Float3);
    assert_eq!(biased, [128, 128, 255, 0]);

    let restored: [u8; 12] =
        convert_one(Semantic::Normal, StorageType::Float3, &biased, StorageType::Ubyte4Normal888);
    let restored = Float3::read(&restored).unwrap();
    assert!(Vec3::from_array(restored.0).abs_diff_eq(Vec3::Z, 0.01));
}

#[test]
fn test_bone_index_layouts() {
    let index: [u8; 3] = convert_one(
        Semantic::BlendIndices,
        StorageType::Ubyte3,
        &floats(&[7.0]),
        StorageType::Float1,
    );
    assert_eq!(index, [7, 7, 7]);

    let src = Ubyte3::new([1, 2, 3]);
    let bytes = bytemuck::bytes_of(&src);
    let reversed: [u8; 3] =
        convert_one(Semantic::BlendIndices, StorageType::ReverseIII, bytes, StorageType::Ubyte3);
    assert_eq!(reversed, [3, 2, 1]);
    let padded: [u8; 4] =
        convert_one(Semantic::BlendIndices, StorageType::ReversePaddedIII, bytes, StorageType::Ubyte3);
    assert_eq!(padded, [3, 2, 1, 0]);

    let plain: [u8; 3] =
        convert_one(Semantic::BlendIndices, StorageType::Ubyte3, &padded, StorageType::ReversePaddedIII);
    assert_eq!(plain, [1, 2, 3]);
    let premultiplied: [u8; 3] =
        convert_one(Semantic::BlendIndices, StorageType::Ubyte3, &[98, 18, 5], StorageType::Div3III);
    assert_eq!(premultiplied, [255, 54, 15]);
}

#[test]
fn test_float_bone_index_fills_every_slot() {
    let src = floats(&[3.0]);
    let reversed: [u8; 3] =
        convert_one(Semantic::BlendIndices, StorageType::ReverseIII, &src, StorageType::Float1);
    assert_eq!(reversed, [3, 3, 3]);
    let padded: [u8; 4] =
        convert_one(Semantic::BlendIndices, StorageType::ReversePaddedIII, &src, StorageType::Float1);
    assert_eq!(padded, [3, 3, 3, 0]);
    assert_eq!(
        fetch_convert_function(Semantic::BlendIndices, StorageType::ReversePaddedIII, StorageType::Float1),
        Some(ConvertFunction::BlendIndicesFromFloat1 {
            dst: StorageType::ReversePaddedIII
        })
    );
}

#[test]
fn test_bone_weight_layouts() {
    let weights = Ubyte2::new([200, 55]);
    let bytes = bytemuck::bytes_of(&weights);
    let narrow: [u8; 3] =
        convert_one(Semantic::BlendWeight, StorageType::ReversePaddedWW, bytes, StorageType::Ubyte2);
    assert_eq!(narrow, [55, 200, 0]);
    let wide: [u8; 4] =
        convert_one(Semantic::BlendWeight, StorageType::ReversePaddedWideWW, bytes, StorageType::Ubyte2);
    assert_eq!(wide, [0, 55, 200, 0]);
}

#[test]
fn test_color_reinterpret() {
    let bytes: [u8; 4] = convert_one(Semantic::Color, StorageType::Color, &[1, 2, 3, 4], StorageType::Ubyte4);
    assert_eq!(bytes, [1, 2, 3, 4]);
    let rgb: [u8; 3] = convert_one(Semantic::Color, StorageType::Ubyte3, &[1, 2, 3, 4], StorageType::Color);
    assert_eq!(rgb, [1, 2, 3]);
}

// ============================================================================
// Buffers
// ============================================================================

#[test]
fn test_convert_reorders_and_converts() {
    let a = format(
        "a",
        &[
            (0, Semantic::Position, StorageType::Float3),
            (0, Semantic::Normal, StorageType::Float3),
        ],
    );
    let b = format(
        "b",
        &[
            (0, Semantic::Normal, StorageType::Ubyte4),
            (0, Semantic::Position, StorageType::Float4),
        ],
    );
    let src = floats(&[1.0, 2.0, 3.0, 0.0, 1.0, 0.0]);
    let mut dst = vec![0u8; 20];

    let mut dst_set = BufferSetMut::with_buffers(&b, [&mut dst[..]]);
    convert(&mut dst_set, &BufferSet::with_buffers(&a, [&src[..]]), false).unwrap();
    drop(dst_set);

    assert_eq!(Float4::read(&dst[4..]), Some(Float4::new([1.0, 2.0, 3.0, 1.0])));
    let normal = packing::unpack_normal_11_11_10(u32::from_le_bytes([dst[0], dst[1], dst[2], dst[3]]));
    assert!(normal.abs_diff_eq(Vec3::Y, 0.01));
}

#[test]
fn test_missing_blend_weights_are_synthesized() {
    let src_format = format("xyz", &[(0, Semantic::Position, StorageType::Float3)]);
    let dst_format = format(
        "xyzww",
        &[
            (0, Semantic::Position, StorageType::Float3),
            (0, Semantic::BlendWeight, StorageType::Ubyte2),
            (0, Semantic::Normal, StorageType::Ubyte4Normal888),
        ],
    );
    let src = floats(&[0.0; 9]);
    let mut dst = vec![0x11u8; 18 * 3];

    let src_set = BufferSet::with_buffers(&src_format, [&src[..]]);
    let mut dst_set = BufferSetMut::with_buffers(&dst_format, [&mut dst[..]]);
    convert(&mut dst_set, &src_set, false).unwrap();
    drop(dst_set);
    {
        let weights = dst_format.raw_accessor::<Ubyte2, _>(&dst[..], 0, 12);
        assert!(weights.iter().all(|w| w == Ubyte2::new([0x11, 0x11])));
    }

    let mut dst_set = BufferSetMut::with_buffers(&dst_format, [&mut dst[..]]);
    convert(&mut dst_set, &src_set, true).unwrap();
    drop(dst_set);
    let weights = dst_format.raw_accessor::<Ubyte2, _>(&dst[..], 0, 12);
    let normals = dst_format.raw_accessor::<Ubyte4, _>(&dst[..], 0, 14);
    assert_eq!(weights.len(), 3);
    assert!(weights.iter().all(|w| w == DEFAULT_BLEND_WEIGHTS));
    assert!(normals.iter().all(|n| n == Ubyte4::new([128, 128, 128, 0])));
}

#[test]
fn test_vertex_count_mismatch_writes_nothing() {
    let src_format = format(
        "split",
        &[
            (0, Semantic::Position, StorageType::Float3),
            (1, Semantic::TexCoord, StorageType::Float2),
        ],
    );
    let dst_format = format(
        "xyzuv",
        &[
            (0, Semantic::Position, StorageType::Float3),
            (0, Semantic::TexCoord, StorageType::Float2),
        ],
    );
    let positions = vec![0u8; 12 * 20];
    let uvs = vec![0u8; 8 * 50];
    let mut dst = vec![0xAAu8; 20 * 20];

    let src_set = BufferSet::with_buffers(&src_format, [&positions[..], &uvs[..]]);
    let mut dst_set = BufferSetMut::with_buffers(&dst_format, [&mut dst[..]]);

    assert_eq!(
        can_convert(&dst_set, &src_set, true),
        Err(ConversionError::VertexCountMismatch {
            stream: 1,
            expected: 20,
            found: 50
        })
    );
    assert!(convert_buffer(&mut dst_set, &src_set, true).is_err());
    drop(dst_set);
    assert!(dst.iter().all(|&b| b == 0xAA));
}

#[test]
fn test_can_convert_errors() {
    let xyz = format("xyz", &[(0, Semantic::Position, StorageType::Float3)]);
    let src = floats(&[0.0; 6]);
    let empty: &[u8] = &[];
    let mut dst = vec![0u8; 32];

    let unsupported = format("n", &[(0, Semantic::Position, StorageType::UDec3)]);
    let dst_set = BufferSetMut::with_buffers(&unsupported, [&mut dst[..]]);
    assert!(matches!(
        can_convert(&dst_set, &BufferSet::with_buffers(&xyz, [&src[..]]), false),
        Err(ConversionError::Unsupported { .. })
    ));
    drop(dst_set);

    let unknown = format("u", &[(0, Semantic::TexCoord, StorageType::Unknown)]);
    let dst_set = BufferSetMut::new(&unknown);
    assert!(matches!(
        can_convert(&dst_set, &BufferSet::new(&xyz), true),
        Err(ConversionError::MissingDefault { .. })
    ));

    let dst_set = BufferSetMut::with_buffers(&xyz, [&mut dst[..]]);
    assert_eq!(
        can_convert(&dst_set, &BufferSet::new(&xyz), false),
        Err(ConversionError::MissingSourceBuffer {
            stream: 0,
            buffer_count: 0
        })
    );
    assert_eq!(
        can_convert(&dst_set, &BufferSet::with_buffers(&xyz, [empty]), false),
        Err(ConversionError::EmptySource { stream: 0 })
    );

    let dst_set = BufferSetMut::new(&xyz);
    assert_eq!(
        can_convert(&dst_set, &BufferSet::with_buffers(&xyz, [&src[..]]), false),
        Err(ConversionError::MissingDestinationBuffer {
            stream: 0,
            buffer_count: 0
        })
    );
}

#[test]
fn test_convert_buffer_stream() {
    let src_format = format(
        "src",
        &[
            (0, Semantic::Position, StorageType::Float3),
            (1, Semantic::TexCoord, StorageType::Float2),
        ],
    );
    let dst_format = format(
        "dst",
        &[
            (0, Semantic::Position, StorageType::Float4),
            (1, Semantic::TexCoord, StorageType::Half2),
        ],
    );
    let uvs = floats(&[0.25, 0.75, 1.0, 0.0]);
    let mut dst = vec![0u8; 8];

    convert_buffer_stream(&dst_format, 1, &mut dst, &src_format, 1, &uvs, true).unwrap();
    let half = dst_format.proxy_accessor(&dst[..], 1, Semantic::TexCoord, 0);
    assert_eq!(half.get::<Float2>(0), Some(Float2::new([0.25, 0.75])));
    assert_eq!(half.get::<Float2>(1), Some(Float2::new([1.0, 0.0])));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_source_validation_normals() {
    let src_format = format("n", &[(0, Semantic::Normal, StorageType::Float3)]);
    let dst_format = format("p", &[(0, Semantic::Normal, StorageType::Ubyte4)]);

    let good = floats(&[0.0, 1.0, 0.0, 1.0, 0.0, 0.0]);
    let bad = floats(&[0.0, 2.0, 0.0, 0.0, 0.0, 0.0]);

    let good_set = BufferSet::with_buffers(&src_format, [&good[..]]);
    let bad_set = BufferSet::with_buffers(&src_format, [&bad[..]]);
    for (fail_fast, per_element) in [(false, false), (true, false), (false, true)] {
        assert!(is_source_data_valid(&dst_format, &good_set, fail_fast, per_element));
        assert!(!is_source_data_valid(&dst_format, &bad_set, fail_fast, per_element));
    }

    // Same encoding on both sides needs no check
    assert!(is_source_data_valid(&src_format, &bad_set, true, false));
}

#[test]
fn test_source_validation_reports() {
    let src_format = format(
        "nt",
        &[
            (0, Semantic::Normal, StorageType::Float3),
            (0, Semantic::Tangent, StorageType::Float3),
        ],
    );
    let dst_format = format(
        "nt_packed",
        &[
            (0, Semantic::Normal, StorageType::Ubyte4),
            (0, Semantic::Tangent, StorageType::Ubyte4),
        ],
    );
    #[rustfmt::skip]
    let data = floats(&[
        0.0, 2.0, 0.0,   1.0, 0.0, 0.0,
        0.0, 1.0, 0.0,   0.0, 0.0, 3.0,
        2.0, 0.0, 0.0,   0.0, 0.0, 1.0,
    ]);
    let src = BufferSet::with_buffers(&src_format, [&data[..]]);

    let normal = src_format.find_semantic(Semantic::Normal, 0).unwrap();
    let tangent = src_format.find_semantic(Semantic::Tangent, 0).unwrap();
    let report = |element, vertex| InvalidSourceData {
        element,
        vertex: Some(vertex),
    };

    assert_eq!(
        validate_source_data(&dst_format, &src, false, false),
        vec![report(normal, 0), report(normal, 2), report(tangent, 1)]
    );
    assert_eq!(
        validate_source_data(&dst_format, &src, false, true),
        vec![report(normal, 0), report(tangent, 1)]
    );
    assert_eq!(
        validate_source_data(&dst_format, &src, true, false),
        vec![report(normal, 0)]
    );

    let empty = BufferSet::new(&src_format);
    assert_eq!(
        validate_source_data(&dst_format, &empty, false, false),
        vec![InvalidSourceData {
            element: normal,
            vertex: None
        }]
    );
}

#[test]
fn test_source_validation_fixed_point_range() {
    let src_format = format("uv", &[(0, Semantic::TexCoord, StorageType::Float2)]);
    let dst_format = format("uv16", &[(0, Semantic::TexCoord, StorageType::Short2)]);

    let in_range = floats(&[1.0, -1.0, 15.5, -16.0]);
    let out_of_range = floats(&[1.0, -1.0, 17.0, 0.0]);

    assert!(is_source_data_valid(
        &dst_format,
        &BufferSet::with_buffers(&src_format, [&in_range[..]]),
        true,
        false
    ));
    assert!(!is_source_data_valid(
        &dst_format,
        &BufferSet::with_buffers(&src_format, [&out_of_range[..]]),
        false,
        false
    ));
}

// ============================================================================
// Context
// ============================================================================

#[test]
fn test_context_copies_identical_formats() {
    let xyz = format("xyz", &[(0, Semantic::Position, StorageType::Float3)]);
    let context = ConversionContext::new(None, &xyz);
    assert!(context.is_valid());
    assert!(!context.is_conversion_required());
    assert_eq!(context.src_vertex_size(0), 12);
    assert_eq!(context.dst_vertex_size(0), 12);

    let src = floats(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let mut dst = vec![0u8; 24];
    context.convert_single_stream(&mut dst, &src, 2).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn test_context_converts() {
    let xyz = format("xyz", &[(0, Semantic::Position, StorageType::Float3)]);
    let xyzw = format("xyzw", &[(0, Semantic::Position, StorageType::Float4)]);
    let context = ConversionContext::new(Some(&xyzw), &xyz);
    assert!(context.is_conversion_required());
    assert_eq!(context.dst_format().name(), "xyzw");
    assert_eq!(context.src_format().name(), "xyz");

    let src = floats(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let mut dst = vec![0u8; 32];
    context.convert_single_stream(&mut dst, &src, 2).unwrap();
    assert_eq!(Float4::read(&dst[16..]), Some(Float4::new([4.0, 5.0, 6.0, 1.0])));

    assert_eq!(
        context.convert_single_stream(&mut dst, &src, 3),
        Err(ConversionError::BufferTooSmall {
            stream: 0,
            needed: 36,
            available: 24
        })
    );
}

#[test]
fn test_context_rejects_empty_formats() {
    let empty = VertexFormat::new("empty");
    let xyz = format("xyz", &[(0, Semantic::Position, StorageType::Float3)]);
    let context = ConversionContext::new(Some(&empty), &xyz);
    assert!(!context.is_valid());
    assert!(!context.is_conversion_required());
    assert_eq!(
        context.convert_single_stream(&mut [0u8; 16], &[0u8; 12], 1),
        Err(ConversionError::InvalidFormat)
    );
}
