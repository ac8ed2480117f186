use super::*;

#[test]
fn test_named_accessors_alias_components() {
    let mut value = Ubyte4::new([1, 2, 3, 4]);
    assert_eq!((value.x(), value.y(), value.z(), value.w()), (1, 2, 3, 4));
    assert_eq!((value.r(), value.g(), value.b(), value.a()), (1, 2, 3, 4));

    *value.g_mut() = 20;
    *value.w_mut() = 40;
    assert_eq!(value.y(), 20);
    assert_eq!(value[3], 40);
    assert_eq!(value.get::<1>(), 20);
}

#[test]
fn test_runtime_index() {
    let mut value = Float3::new([0.5, 1.5, 2.5]);
    value[2] = 9.0;
    assert_eq!(value[0], 0.5);
    assert_eq!(value.components(), &[0.5, 1.5, 9.0]);
    assert_eq!(Float3::COUNT, 3);
}

#[test]
fn test_copy_bytes_from_packed_integer() {
    let mut value = Ubyte4::default();
    value.copy_bytes_from(&0xDEAD_BEEFu32);
    assert_eq!(value.0, [0xEF, 0xBE, 0xAD, 0xDE]);
}

#[test]
fn test_copy_bytes_from_is_clamped() {
    // Larger source: only the destination size is copied
    let mut small = Ubyte2::new([0, 0]);
    small.copy_bytes_from(&0x0403_0201u32);
    assert_eq!(small.0, [0x01, 0x02]);

    // Smaller source: trailing destination bytes are left alone
    let mut large = Ubyte4::new([9, 9, 9, 9]);
    large.copy_bytes_from(&0x0201u16);
    assert_eq!(large.0, [0x01, 0x02, 9, 9]);
}

#[test]
fn test_fill_end_components() {
    let mut value = Float4::new([1.0, 2.0, 3.0, 4.0]);
    value.fill_end_components(2, 0.0);
    assert_eq!(value.0, [1.0, 2.0, 0.0, 0.0]);

    value.fill_end_components(10, 7.0);
    assert_eq!(value.0, [7.0; 4]);
}

#[test]
fn test_equality_is_bytewise() {
    assert_eq!(Float2::new([1.0, 2.0]), Float2::new([1.0, 2.0]));
    assert_ne!(Float2::new([1.0, 2.0]), Float2::new([1.0, 2.5]));
    // Same bits compare equal even for NaN; signed zeroes differ
    assert_eq!(Float1::new([f32::NAN]), Float1::new([f32::NAN]));
    assert_ne!(Float1::new([0.0]), Float1::new([-0.0]));
}

#[test]
fn test_copy_components_normalized() {
    let src = Ubyte4::new([0, 51, 255, 128]);
    let mut dst = Float4::default();
    copy_components(&mut dst, &src, 0, u8::to_unit);
    assert_eq!(dst.x(), 0.0);
    assert!((dst.y() - 0.2).abs() < 1e-6);
    assert_eq!(dst.z(), 1.0);

    let mut back = Ubyte4::default();
    copy_components(&mut back, &dst, 0, u8::from_unit);
    for i in 0..4 {
        assert!(src[i].abs_diff(back[i]) <= 1);
    }
}

#[test]
fn test_copy_components_expansion_zero_fills() {
    let src = Float2::new([3.0, 4.0]);
    let mut dst = Float4::new([9.0; 4]);
    copy_components(&mut dst, &src, 0, |c| c);
    assert_eq!(dst.0, [3.0, 4.0, 0.0, 0.0]);
}

#[test]
fn test_copy_components_respects_copy_count() {
    let src = Short3::new([1, 2, 3]);
    let mut dst = Short3::new([7, 7, 7]);
    copy_components_flat(&mut dst, &src, 1);
    assert_eq!(dst.0, [1, 0, 0]);

    let mut narrow = Short1::default();
    copy_components_flat(&mut narrow, &src, 0);
    assert_eq!(narrow.0, [1]);
}

#[test]
fn test_validate_components() {
    let value = Float3::new([0.5, -2.0, 1.0]);
    assert!(validate_components(&value, f32::is_finite));
    assert!(!validate_components(&value, |c| c >= 0.0));
}

#[test]
fn test_read_and_write_unaligned() {
    let mut bytes = [0u8; 13];
    assert!(Float3::new([1.0, 2.0, 3.0]).write(&mut bytes[1..]));
    assert_eq!(Float3::read(&bytes[1..]), Some(Float3::new([1.0, 2.0, 3.0])));

    assert_eq!(Float3::read(&bytes[2..]), None);
    assert!(!Float4::default().write(&mut bytes));
}

#[test]
fn test_special_layouts() {
    let reversed = ReverseIndices::from_components(Ubyte3::new([1, 2, 3]));
    assert_eq!(reversed.0, [3, 2, 1]);
    assert_eq!(reversed.components(), Ubyte3::new([1, 2, 3]));

    let padded = ReversePaddedIndices::from_components(Ubyte3::new([4, 5, 6]));
    assert_eq!(padded.0, [6, 5, 4, 0]);

    let div3 = Div3Indices([1, 2, 10]);
    assert_eq!(div3.components(), Ubyte3::new([3, 6, 30]));
    assert_eq!(Div3Indices([86, 0, 85]).components(), Ubyte3::new([255, 0, 255]));
    assert_eq!(Div3Indices::from_components(Ubyte3::new([3, 6, 31])).0, [1, 2, 10]);
}

#[test]
fn test_special_weight_defaults() {
    assert_eq!(ReversePaddedWideWeights::default().0, [0, 0, 255, 0]);
    assert_eq!(ReversePaddedWeights::default().0, [0, 255, 0]);
    assert_eq!(ReversePaddedWeights::default().components(), DEFAULT_BLEND_WEIGHTS);
}

#[test]
fn test_packed_color_channels() {
    let color = PackedColor::from_rgba(0x11, 0x22, 0x33, 0x44);
    assert_eq!(color.0, 0x4411_2233);
    assert_eq!((color.r(), color.g(), color.b(), color.a()), (0x11, 0x22, 0x33, 0x44));
    // Memory order is B, G, R, A
    assert_eq!(bytemuck::bytes_of(&color), &[0x33, 0x22, 0x11, 0x44]);
}

#[test]
fn test_storage_of_rust_types() {
    assert_eq!(<glam::Vec3 as ElementType>::STORAGE, StorageType::Float3);
    assert_eq!(<Ubyte4 as ElementType>::STORAGE, StorageType::Ubyte4);
    assert_eq!(<PackedNormal888 as ElementType>::STORAGE, StorageType::Ubyte4Normal888);
    assert_eq!(size_of::<PackedNormal888>() as u32, StorageType::Ubyte4Normal888.size());
    assert_eq!(size_of::<ReversePaddedWeights>() as u32, StorageType::ReversePaddedWW.size());
}
