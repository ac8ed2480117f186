//! Buffer-level conversion
//!
//! A conversion is resolved into a plan (one step per destination element)
//! before any byte is written, so every failure leaves the destination
//! buffers untouched.

use super::functions::{ConvertFunction, DefaultValueFunction};
use super::{fetch_convert_function, fetch_default_value_function, fetch_validation_function};
use crate::error::ConversionError;
use crate::format::{ElementInfo, VertexFormat};
use smallvec::SmallVec;

// ============================================================================
// Buffer sets
// ============================================================================

/// Read-only vertex data: one byte buffer per stream of `format`.
#[derive(Debug, Clone)]
pub struct BufferSet<'a> {
    format: &'a VertexFormat,
    buffers: SmallVec<[&'a [u8]; 4]>,
}

impl<'a> BufferSet<'a> {
    /// Creates a set with no buffers attached.
    pub fn new(format: &'a VertexFormat) -> Self {
        Self {
            format,
            buffers: SmallVec::new(),
        }
    }

    /// Creates a set from per-stream buffers, in stream order.
    pub fn with_buffers(
        format: &'a VertexFormat,
        buffers: impl IntoIterator<Item = &'a [u8]>,
    ) -> Self {
        Self {
            format,
            buffers: buffers.into_iter().collect(),
        }
    }

    /// Attaches the buffer for the next stream.
    pub fn push(&mut self, buffer: &'a [u8]) {
        self.buffers.push(buffer);
    }

    pub fn format(&self) -> &'a VertexFormat {
        self.format
    }

    pub fn buffer(&self, stream: u32) -> Option<&'a [u8]> {
        self.buffers.get(stream as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Whole records held by `stream`'s buffer.
    pub fn vertex_count(&self, stream: u32) -> Option<usize> {
        vertex_count(self.format, stream, self.buffer(stream)?.len())
    }
}

/// Writable vertex data: one byte buffer per stream of `format`.
#[derive(Debug)]
pub struct BufferSetMut<'a> {
    format: &'a VertexFormat,
    buffers: SmallVec<[&'a mut [u8]; 4]>,
}

impl<'a> BufferSetMut<'a> {
    pub fn new(format: &'a VertexFormat) -> Self {
        Self {
            format,
            buffers: SmallVec::new(),
        }
    }

    pub fn with_buffers(
        format: &'a VertexFormat,
        buffers: impl IntoIterator<Item = &'a mut [u8]>,
    ) -> Self {
        Self {
            format,
            buffers: buffers.into_iter().collect(),
        }
    }

    pub fn push(&mut self, buffer: &'a mut [u8]) {
        self.buffers.push(buffer);
    }

    pub fn format(&self) -> &'a VertexFormat {
        self.format
    }

    pub fn buffer(&self, stream: u32) -> Option<&[u8]> {
        self.buffers.get(stream as usize).map(|buffer| &**buffer)
    }

    pub fn buffer_mut(&mut self, stream: u32) -> Option<&mut [u8]> {
        self.buffers.get_mut(stream as usize).map(|buffer| &mut **buffer)
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn vertex_count(&self, stream: u32) -> Option<usize> {
        vertex_count(self.format, stream, self.buffer(stream)?.len())
    }
}

fn vertex_count(format: &VertexFormat, stream: u32, len: usize) -> Option<usize> {
    match format.stream_stride(stream) as usize {
        0 => None,
        stride => Some(len / stride),
    }
}

// ============================================================================
// Planning
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Action {
    Convert {
        function: ConvertFunction,
        src: ElementInfo,
    },
    Fill(DefaultValueFunction),
}

#[derive(Debug, Clone, Copy)]
struct Step {
    dst: ElementInfo,
    action: Action,
}

struct Plan {
    steps: SmallVec<[Step; 16]>,
    vertex_count: usize,
}

/// Resolves every destination element (of `only_stream`, if given).
fn plan(
    dst: &BufferSetMut<'_>,
    src: &BufferSet<'_>,
    initialize_missing: bool,
    only_stream: Option<u32>,
) -> Result<Plan, ConversionError> {
    let mut steps = SmallVec::<[Step; 16]>::new();

    let dst_elements = dst
        .format()
        .elements()
        .filter(|e| only_stream.is_none_or(|stream| stream == e.stream));
    for dst_element in dst_elements {
        let action = match src
            .format()
            .find_semantic(dst_element.semantic, dst_element.semantic_index)
        {
            Some(src_element) => {
                let function = fetch_convert_function(
                    dst_element.semantic,
                    dst_element.storage,
                    src_element.storage,
                )
                .ok_or(ConversionError::Unsupported {
                    semantic: dst_element.semantic,
                    semantic_index: dst_element.semantic_index,
                    dst: dst_element.storage,
                    src: src_element.storage,
                })?;
                Action::Convert {
                    function,
                    src: src_element,
                }
            }
            None if initialize_missing => {
                let function = fetch_default_value_function(dst_element.semantic, dst_element.storage)
                    .ok_or(ConversionError::MissingDefault {
                        semantic: dst_element.semantic,
                        semantic_index: dst_element.semantic_index,
                        storage: dst_element.storage,
                    })?;
                Action::Fill(function)
            }
            None => continue,
        };
        steps.push(Step {
            dst: dst_element,
            action,
        });
    }

    // Every stream taking part must hold the same number of vertices. Source
    // streams set the count; destination-only conversions take it from the
    // first destination stream.
    let mut expected = None;
    for step in &steps {
        if let Action::Convert { src: src_element, .. } = step.action {
            let count = source_vertex_count(src, src_element.stream)?;
            check_count(&mut expected, src_element.stream, count)?;
        }
    }
    for step in &steps {
        let stream = step.dst.stream;
        let count = dst
            .vertex_count(stream)
            .ok_or(ConversionError::MissingDestinationBuffer {
                stream,
                buffer_count: dst.len(),
            })?;
        check_count(&mut expected, stream, count)?;
    }

    Ok(Plan {
        steps,
        vertex_count: expected.unwrap_or(0),
    })
}

fn source_vertex_count(src: &BufferSet<'_>, stream: u32) -> Result<usize, ConversionError> {
    let count = src
        .vertex_count(stream)
        .ok_or(ConversionError::MissingSourceBuffer {
            stream,
            buffer_count: src.len(),
        })?;
    if count == 0 {
        return Err(ConversionError::EmptySource { stream });
    }
    Ok(count)
}

fn check_count(
    expected: &mut Option<usize>,
    stream: u32,
    found: usize,
) -> Result<(), ConversionError> {
    match *expected {
        None => {
            *expected = Some(found);
            Ok(())
        }
        Some(expected) if expected == found => Ok(()),
        Some(expected) => Err(ConversionError::VertexCountMismatch {
            stream,
            expected,
            found,
        }),
    }
}

// ============================================================================
// Conversion
// ============================================================================

/// Checks that [`convert`] would succeed, without writing anything.
pub fn can_convert(
    dst: &BufferSetMut<'_>,
    src: &BufferSet<'_>,
    initialize_missing: bool,
) -> Result<(), ConversionError> {
    plan(dst, src, initialize_missing, None).map(|_| ())
}

/// Converts every destination element from the source element with the same
/// (semantic, semantic index).
///
/// Destination elements without a source are filled with their default value
/// when `initialize_missing` is set, and left untouched otherwise. Nothing is
/// written unless the whole conversion can be carried out.
pub fn convert(
    dst: &mut BufferSetMut<'_>,
    src: &BufferSet<'_>,
    initialize_missing: bool,
) -> Result<(), ConversionError> {
    let plan = plan(dst, src, initialize_missing, None)?;
    execute(dst, src, &plan);
    Ok(())
}

fn execute(dst: &mut BufferSetMut<'_>, src: &BufferSet<'_>, plan: &Plan) {
    let dst_format = dst.format();
    let src_format = src.format();

    for step in &plan.steps {
        let dst_stride = dst_format.stream_stride(step.dst.stream) as usize;
        let dst_offset = step.dst.offset as usize;
        let dst_size = step.dst.size() as usize;
        let Some(dst_buffer) = dst.buffer_mut(step.dst.stream) else {
            continue;
        };

        match step.action {
            Action::Convert {
                function,
                src: src_element,
            } => {
                let Some(src_buffer) = src.buffer(src_element.stream) else {
                    continue;
                };
                let src_stride = src_format.stream_stride(src_element.stream) as usize;
                let src_offset = src_element.offset as usize;
                let src_size = src_element.size() as usize;

                for vertex in 0..plan.vertex_count {
                    let d = vertex * dst_stride + dst_offset;
                    let s = vertex * src_stride + src_offset;
                    function.apply(
                        &mut dst_buffer[d..d + dst_size],
                        &src_buffer[s..s + src_size],
                    );
                }
            }
            Action::Fill(function) => fill_elements(
                dst_buffer,
                dst_stride,
                dst_offset,
                dst_size,
                plan.vertex_count,
                function,
            ),
        }
    }
}

/// Writes the default value into the first vertex, then copies it to the rest.
fn fill_elements(
    buffer: &mut [u8],
    stride: usize,
    offset: usize,
    size: usize,
    vertex_count: usize,
    function: DefaultValueFunction,
) {
    if vertex_count == 0 || size == 0 {
        return;
    }
    function.fill(&mut buffer[offset..offset + size]);
    for vertex in 1..vertex_count {
        buffer.copy_within(offset..offset + size, vertex * stride + offset);
    }
}

/// Converts a whole buffer set pair, logging the reason on failure.
pub fn convert_buffer(
    dst: &mut BufferSetMut<'_>,
    src: &BufferSet<'_>,
    initialize_missing: bool,
) -> Result<(), ConversionError> {
    convert(dst, src, initialize_missing).inspect_err(|err| {
        tracing::warn!(
            dst_format = dst.format().name(),
            src_format = src.format().name(),
            "Vertex conversion failed: {err}"
        );
    })
}

/// Converts one source stream buffer into one destination stream buffer.
///
/// Only elements of `dst_stream` are written. Their sources must all live in
/// `src_stream`; the other source streams are given empty buffers.
pub fn convert_buffer_stream(
    dst_format: &VertexFormat,
    dst_stream: u32,
    dst: &mut [u8],
    src_format: &VertexFormat,
    src_stream: u32,
    src: &[u8],
    initialize_missing: bool,
) -> Result<(), ConversionError> {
    let mut src_set = BufferSet::new(src_format);
    for _ in 0..src_stream {
        src_set.push(&[]);
    }
    src_set.push(src);

    let mut dst_set = BufferSetMut::new(dst_format);
    for _ in 0..dst_stream {
        dst_set.push(&mut []);
    }
    dst_set.push(dst);

    plan(&dst_set, &src_set, initialize_missing, Some(dst_stream))
        .map(|plan| execute(&mut dst_set, &src_set, &plan))
        .inspect_err(|err| {
            tracing::warn!(
                dst_format = dst_format.name(),
                src_format = src_format.name(),
                dst_stream,
                src_stream,
                "Vertex stream conversion failed: {err}"
            );
        })
}

// ============================================================================
// Validation
// ============================================================================

/// A source value rejected by [`validate_source_data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSourceData {
    /// The offending source element.
    pub element: ElementInfo,
    /// Vertex holding the invalid value, or `None` if the element's stream has no buffer.
    pub vertex: Option<usize>,
}

/// Runs the validation rule of every source element `dst_format` will convert
/// and reports each invalid value found.
///
/// `fail_fast` stops at the first invalid vertex. `fail_fast_per_element`
/// stops checking an element at its first invalid vertex but carries on with
/// the remaining elements, so each bad element is reported once.
pub fn validate_source_data(
    dst_format: &VertexFormat,
    src: &BufferSet<'_>,
    fail_fast: bool,
    fail_fast_per_element: bool,
) -> Vec<InvalidSourceData> {
    let src_format = src.format();
    let mut invalid = Vec::new();

    for dst_element in dst_format.elements() {
        let Some(src_element) =
            src_format.find_semantic(dst_element.semantic, dst_element.semantic_index)
        else {
            continue;
        };
        let Some(validation) = fetch_validation_function(
            dst_element.semantic,
            dst_element.storage,
            src_element.storage,
        ) else {
            continue;
        };
        let Some(buffer) = src.buffer(src_element.stream) else {
            tracing::warn!(
                stream = src_element.stream,
                "No source buffer to validate {}{}",
                src_element.semantic,
                src_element.semantic_index
            );
            invalid.push(InvalidSourceData {
                element: src_element,
                vertex: None,
            });
            return invalid;
        };

        let stride = src_format.stream_stride(src_element.stream) as usize;
        let offset = src_element.offset as usize;
        let size = src_element.size() as usize;
        let count = buffer.len().checked_div(stride).unwrap_or(0);

        for vertex in 0..count {
            let start = vertex * stride + offset;
            if validation.validate(&buffer[start..start + size]) {
                continue;
            }
            tracing::warn!(
                vertex,
                "Invalid {}{} ({}) for conversion to {}",
                src_element.semantic,
                src_element.semantic_index,
                src_element.storage,
                dst_element.storage
            );
            invalid.push(InvalidSourceData {
                element: src_element,
                vertex: Some(vertex),
            });
            if fail_fast {
                return invalid;
            }
            if fail_fast_per_element {
                break;
            }
        }
    }

    invalid
}

/// Whether [`validate_source_data`] finds nothing to report.
pub fn is_source_data_valid(
    dst_format: &VertexFormat,
    src: &BufferSet<'_>,
    fail_fast: bool,
    fail_fast_per_element: bool,
) -> bool {
    validate_source_data(dst_format, src, fail_fast, fail_fast_per_element).is_empty()
}
