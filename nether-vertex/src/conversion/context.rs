//! Conversion between one fixed pair of formats

use super::buffers::convert_buffer_stream;
use crate::error::ConversionError;
use crate::format::VertexFormat;

/// A (destination, source) format pair resolved once and reused for many
/// buffers.
///
/// When both formats are structurally equal no conversion is needed and
/// buffers are copied byte for byte.
#[derive(Debug, Clone, Copy)]
pub struct ConversionContext<'a> {
    dst: &'a VertexFormat,
    src: &'a VertexFormat,
}

impl<'a> ConversionContext<'a> {
    /// A missing destination format means "same as the source".
    pub fn new(dst: Option<&'a VertexFormat>, src: &'a VertexFormat) -> Self {
        Self {
            dst: dst.unwrap_or(src),
            src,
        }
    }

    pub fn dst_format(&self) -> &'a VertexFormat {
        self.dst
    }

    pub fn src_format(&self) -> &'a VertexFormat {
        self.src
    }

    /// Both formats have at least one stream.
    pub fn is_valid(&self) -> bool {
        self.dst.stream_count() > 0 && self.src.stream_count() > 0
    }

    /// False when the formats are equal (or the context is invalid).
    pub fn is_conversion_required(&self) -> bool {
        self.is_valid() && self.dst != self.src
    }

    /// Bytes per vertex in source stream `stream`.
    pub fn src_vertex_size(&self, stream: u32) -> u32 {
        self.src.stream_stride(stream)
    }

    /// Bytes per vertex in destination stream `stream`.
    pub fn dst_vertex_size(&self, stream: u32) -> u32 {
        self.dst.stream_stride(stream)
    }

    /// Converts `vertex_count` vertices of stream 0.
    pub fn convert_single_stream(
        &self,
        dst: &mut [u8],
        src: &[u8],
        vertex_count: usize,
    ) -> Result<(), ConversionError> {
        self.convert_single_stream_at(dst, 0, src, 0, vertex_count)
    }

    /// Converts `vertex_count` vertices of one source stream into one
    /// destination stream.
    pub fn convert_single_stream_at(
        &self,
        dst: &mut [u8],
        dst_stream: u32,
        src: &[u8],
        src_stream: u32,
        vertex_count: usize,
    ) -> Result<(), ConversionError> {
        if !self.is_valid() {
            return Err(ConversionError::InvalidFormat);
        }

        let dst_size = self.dst_vertex_size(dst_stream) as usize * vertex_count;
        let src_size = self.src_vertex_size(src_stream) as usize * vertex_count;
        if src_size == 0 || dst_size == 0 {
            return Err(ConversionError::EmptySource { stream: src_stream });
        }
        if src.len() < src_size {
            return Err(ConversionError::BufferTooSmall {
                stream: src_stream,
                needed: src_size,
                available: src.len(),
            });
        }
        if dst.len() < dst_size {
            return Err(ConversionError::BufferTooSmall {
                stream: dst_stream,
                needed: dst_size,
                available: dst.len(),
            });
        }

        let (dst, src) = (&mut dst[..dst_size], &src[..src_size]);
        if !self.is_conversion_required() && dst_stream == src_stream {
            dst.copy_from_slice(src);
            return Ok(());
        }

        convert_buffer_stream(self.dst, dst_stream, dst, self.src, src_stream, src, true)
    }
}
