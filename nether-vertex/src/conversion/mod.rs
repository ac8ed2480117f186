//! Vertex data conversion
//!
//! Converts element bytes between storage types, optionally taking the
//! element's semantic into account:
//! - [`fetch_convert_function`] / [`fetch_validation_function`] /
//!   [`fetch_default_value_function`] select the function for one element
//! - [`convert_value`] converts a single element
//! - [`convert`] converts whole buffer sets, matching elements by
//!   (semantic, semantic index) and synthesizing missing ones
//! - [`ConversionContext`] wraps a (destination, source) format pair

mod buffers;
mod context;
mod dispatch;
mod functions;

pub use buffers::{
    BufferSet, BufferSetMut, InvalidSourceData, can_convert, convert, convert_buffer,
    convert_buffer_stream, is_source_data_valid, validate_source_data,
};
pub use context::ConversionContext;
pub use functions::{
    ComponentRule, ConvertFunction, DefaultValueFunction, NormalEncoding, ValidationFunction,
};

use crate::registry::{Semantic, StorageType};

/// Selects the function converting `src` to `dst` for `semantic`.
pub fn fetch_convert_function(
    semantic: Semantic,
    dst: StorageType,
    src: StorageType,
) -> Option<ConvertFunction> {
    dispatch::semantic_convert_function(semantic, dst, src)
        .or_else(|| dispatch::default_convert_function(dst, src))
}

/// Selects the check a source value must pass before converting `src` to `dst`.
///
/// `None` means every source value is acceptable.
pub fn fetch_validation_function(
    semantic: Semantic,
    dst: StorageType,
    src: StorageType,
) -> Option<ValidationFunction> {
    dispatch::semantic_validation_function(semantic, dst, src)
        .or_else(|| dispatch::default_validation_function(dst, src))
}

/// Selects the function producing a value for a `dst` element with no source.
pub fn fetch_default_value_function(
    semantic: Semantic,
    dst: StorageType,
) -> Option<DefaultValueFunction> {
    dispatch::semantic_default_value_function(semantic, dst)
        .or_else(|| dispatch::default_default_value_function(dst))
}

/// Converts exactly one element.
///
/// Returns false, leaving `dst` untouched, if no conversion exists or either
/// slice is shorter than its storage type.
pub fn convert_value(
    semantic: Semantic,
    dst: &mut [u8],
    dst_type: StorageType,
    src: &[u8],
    src_type: StorageType,
) -> bool {
    let Some(function) = fetch_convert_function(semantic, dst_type, src_type) else {
        return false;
    };
    let (dst_size, src_size) = (dst_type.size() as usize, src_type.size() as usize);
    if dst.len() < dst_size || src.len() < src_size {
        return false;
    }
    function.apply(&mut dst[..dst_size], &src[..src_size]);
    true
}

#[cfg(test)]
mod tests;
