//! Error types

use crate::registry::{Semantic, StorageType};

/// Errors raised while building a [`VertexFormat`](crate::VertexFormat).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("Stream {stream} does not exist (format has {stream_count} streams)")]
    InvalidStream { stream: u32, stream_count: u32 },

    #[error("Element {semantic}{semantic_index} already exists")]
    DuplicateElement {
        semantic: Semantic,
        semantic_index: u32,
    },

    #[error("Element {semantic}{semantic_index} at offset {offset} ends past the addressable range")]
    OffsetOverflow {
        semantic: Semantic,
        semantic_index: u32,
        offset: u32,
    },

    #[error("Stream {stream} already holds elements")]
    StreamOccupied { stream: u32 },
}

/// Errors raised by buffer-level conversions.
///
/// All of these are detected before any destination byte is written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("No conversion for {semantic}{semantic_index} from {src} to {dst}")]
    Unsupported {
        semantic: Semantic,
        semantic_index: u32,
        dst: StorageType,
        src: StorageType,
    },

    #[error("No default value for missing {semantic}{semantic_index} ({storage})")]
    MissingDefault {
        semantic: Semantic,
        semantic_index: u32,
        storage: StorageType,
    },

    #[error("No source buffer for stream {stream} ({buffer_count} buffers supplied)")]
    MissingSourceBuffer { stream: u32, buffer_count: usize },

    #[error("No destination buffer for stream {stream} ({buffer_count} buffers supplied)")]
    MissingDestinationBuffer { stream: u32, buffer_count: usize },

    #[error("Source stream {stream} contains no vertices")]
    EmptySource { stream: u32 },

    #[error("Vertex count mismatch: expected {expected}, stream {stream} holds {found}")]
    VertexCountMismatch {
        stream: u32,
        expected: usize,
        found: usize,
    },

    #[error("Buffer for stream {stream} holds {available} bytes, {needed} needed")]
    BufferTooSmall {
        stream: u32,
        needed: usize,
        available: usize,
    },

    #[error("Conversion requires formats with at least one stream")]
    InvalidFormat,
}

/// Errors raised while reading a format definition.
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    #[error("Failed to parse definition: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Definition has no <elements> section")]
    MissingElements,

    #[error("Definition declares no usable elements")]
    NoElements,

    #[error("Invalid {field} value '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error(transparent)]
    Format(#[from] FormatError),
}
