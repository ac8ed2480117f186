//! Vertex format descriptions
//!
//! A [`VertexFormat`] is an ordered list of streams. Each stream is an ordered
//! list of elements packed back to back, and its stride is derived from them.
//! Elements can be addressed three ways at once:
//! - by format-global index (streams in order, then elements in order)
//! - by (stream, stream-local index)
//! - by (semantic, semantic index), optionally restricted to one stream

mod accessor;

pub use accessor::{ElementProxy, ElementProxyMut, ProxyElementAccessor, RawElementAccessor};

use crate::error::FormatError;
use crate::registry::{Semantic, StorageType};
use hashbrown::HashMap;

/// Fully resolved description of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementInfo {
    /// Owning stream.
    pub stream: u32,
    pub semantic: Semantic,
    /// Which instance of `semantic` this is, counted across the whole format.
    pub semantic_index: u32,
    pub storage: StorageType,
    /// Byte offset within the owning stream's record.
    pub offset: u32,
}

impl ElementInfo {
    /// Byte size of the element's storage type.
    #[inline]
    pub fn size(&self) -> u32 {
        self.storage.size()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Element {
    semantic: Semantic,
    semantic_index: u32,
    storage: StorageType,
    offset: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Stream {
    elements: Vec<Element>,
    /// Sum of element sizes.
    packed_size: u32,
    /// Record size: the packed size, or further if an explicit offset reaches past it.
    stride: u32,
}

impl Stream {
    fn push(&mut self, element: Element) {
        let end = element.offset + element.storage.size();
        self.packed_size = self.packed_size.saturating_add(element.storage.size());
        self.stride = self.stride.max(end).max(self.packed_size);
        self.elements.push(element);
    }
}

/// Runtime description of a vertex layout.
///
/// Equality is structural: streams, strides and elements are compared, while
/// the name and target mappings are ignored.
#[derive(Debug, Clone, Default)]
pub struct VertexFormat {
    name: String,
    streams: Vec<Stream>,
    /// Target key → name of the format to use for that target.
    targets: HashMap<String, String>,
}

impl PartialEq for VertexFormat {
    fn eq(&self, other: &Self) -> bool {
        self.streams == other.streams
    }
}

impl Eq for VertexFormat {}

impl VertexFormat {
    /// Creates an empty format with no streams.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Appends an empty stream and returns its index.
    pub fn add_stream(&mut self) -> u32 {
        self.streams.push(Stream::default());
        self.streams.len() as u32 - 1
    }

    /// Appends an element at the end of `stream` with the next free semantic index.
    pub fn add_element(
        &mut self,
        stream: u32,
        semantic: Semantic,
        storage: StorageType,
    ) -> Result<ElementInfo, FormatError> {
        self.add_element_at(stream, semantic, storage, None, None)
    }

    /// Adds an element to `stream`.
    ///
    /// A `semantic_index` of `None` picks the lowest index not yet used by
    /// `semantic` anywhere in the format. An `offset` of `None` appends the
    /// element at the stream's current stride.
    pub fn add_element_at(
        &mut self,
        stream: u32,
        semantic: Semantic,
        storage: StorageType,
        semantic_index: Option<u32>,
        offset: Option<u32>,
    ) -> Result<ElementInfo, FormatError> {
        let stream_count = self.stream_count();
        if stream >= stream_count {
            return Err(FormatError::InvalidStream {
                stream,
                stream_count,
            });
        }

        let semantic_index = match semantic_index {
            Some(index) if self.contains_element(semantic, index) => {
                return Err(FormatError::DuplicateElement {
                    semantic,
                    semantic_index: index,
                });
            }
            Some(index) => index,
            None => self.next_semantic_index(semantic),
        };

        let target = &mut self.streams[stream as usize];
        let offset = offset.unwrap_or(target.stride);
        if offset.checked_add(storage.size()).is_none() {
            return Err(FormatError::OffsetOverflow {
                semantic,
                semantic_index,
                offset,
            });
        }
        let element = Element {
            semantic,
            semantic_index,
            storage,
            offset,
        };
        target.push(element);

        Ok(ElementInfo {
            stream,
            semantic,
            semantic_index,
            storage,
            offset: element.offset,
        })
    }

    fn next_semantic_index(&self, semantic: Semantic) -> u32 {
        let mut index = 0;
        while self.contains_element(semantic, index) {
            index += 1;
        }
        index
    }

    /// Copies each non-empty stream of `extra` into the stream with the same
    /// index in `self`, adding empty streams as needed.
    ///
    /// Every receiving stream must still be empty, and no (semantic, semantic
    /// index) pair of `extra` may already be present. On failure `self` is
    /// left unchanged.
    pub fn merge(&mut self, extra: &VertexFormat) -> Result<(), FormatError> {
        let incoming = || {
            extra
                .streams
                .iter()
                .enumerate()
                .filter(|(_, stream)| !stream.elements.is_empty())
        };

        if let Some((stream, _)) =
            incoming().find(|(i, _)| self.count_stream_elements(*i as u32) > 0)
        {
            return Err(FormatError::StreamOccupied {
                stream: stream as u32,
            });
        }
        if let Some(clash) = extra
            .elements()
            .find(|e| self.contains_element(e.semantic, e.semantic_index))
        {
            return Err(FormatError::DuplicateElement {
                semantic: clash.semantic,
                semantic_index: clash.semantic_index,
            });
        }

        for (index, stream) in incoming() {
            if self.streams.len() <= index {
                self.streams.resize_with(index + 1, Stream::default);
            }
            self.streams[index] = stream.clone();
        }
        Ok(())
    }

    // ========================================================================
    // Targets
    // ========================================================================

    /// Declares `format_name` as the format to use for `target`.
    pub fn add_target(&mut self, target: impl Into<String>, format_name: impl Into<String>) {
        self.targets.insert(target.into(), format_name.into());
    }

    /// Name of the format declared for `target`, if any.
    pub fn target_format_name(&self, target: &str) -> Option<&str> {
        self.targets.get(target).map(String::as_str)
    }

    /// All (target, format name) pairs, in no particular order.
    pub fn targets(&self) -> impl Iterator<Item = (&str, &str)> {
        self.targets.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    // ========================================================================
    // Layout queries
    // ========================================================================

    pub fn stream_count(&self) -> u32 {
        self.streams.len() as u32
    }

    /// Record size of `stream` in bytes, or 0 if there is no such stream.
    pub fn stream_stride(&self, stream: u32) -> u32 {
        self.streams.get(stream as usize).map_or(0, |s| s.stride)
    }

    /// Total number of elements across all streams.
    pub fn count_elements(&self) -> u32 {
        self.streams.iter().map(|s| s.elements.len() as u32).sum()
    }

    /// Number of elements in `stream` (0 if there is no such stream).
    pub fn count_stream_elements(&self, stream: u32) -> u32 {
        self.streams
            .get(stream as usize)
            .map_or(0, |s| s.elements.len() as u32)
    }

    /// Number of elements with `semantic` across all streams.
    pub fn count_semantic_elements(&self, semantic: Semantic) -> u32 {
        self.elements().filter(|e| e.semantic == semantic).count() as u32
    }

    /// Number of elements with `semantic` in `stream`.
    pub fn count_stream_semantic_elements(&self, stream: u32, semantic: Semantic) -> u32 {
        self.stream_elements(stream)
            .filter(|e| e.semantic == semantic)
            .count() as u32
    }

    pub fn contains_element(&self, semantic: Semantic, semantic_index: u32) -> bool {
        self.find_semantic(semantic, semantic_index).is_some()
    }

    /// Returns true if *every* semantic in `semantics` is present.
    ///
    /// `semantic_index` and `stream` restrict where a match may be found;
    /// `None` accepts any value. An empty list, a format without streams and
    /// an out-of-range stream all yield false.
    pub fn contains_semantics(
        &self,
        semantics: &[Semantic],
        semantic_index: Option<u32>,
        stream: Option<u32>,
    ) -> bool {
        if semantics.is_empty() || self.streams.is_empty() {
            return false;
        }
        if stream.is_some_and(|s| s >= self.stream_count()) {
            return false;
        }

        semantics.iter().all(|&semantic| {
            self.elements().any(|e| {
                e.semantic == semantic
                    && semantic_index.is_none_or(|index| index == e.semantic_index)
                    && stream.is_none_or(|s| s == e.stream)
            })
        })
    }

    // ========================================================================
    // Element lookup
    // ========================================================================

    /// All elements, streams in order.
    pub fn elements(&self) -> impl Iterator<Item = ElementInfo> + '_ {
        (0..self.stream_count()).flat_map(move |stream| self.stream_elements(stream))
    }

    /// Elements of `stream` in declaration order (empty if there is no such stream).
    pub fn stream_elements(&self, stream: u32) -> impl Iterator<Item = ElementInfo> + '_ {
        self.streams
            .get(stream as usize)
            .into_iter()
            .flat_map(|s| s.elements.iter())
            .map(move |e| ElementInfo {
                stream,
                semantic: e.semantic,
                semantic_index: e.semantic_index,
                storage: e.storage,
                offset: e.offset,
            })
    }

    /// Looks up an element by format-global index.
    pub fn find_element(&self, index: u32) -> Option<ElementInfo> {
        self.elements().nth(index as usize)
    }

    /// Looks up an element by its index within `stream`.
    pub fn find_stream_element(&self, stream: u32, index: u32) -> Option<ElementInfo> {
        self.stream_elements(stream).nth(index as usize)
    }

    /// Looks up an element by (semantic, semantic index), searching streams in order.
    pub fn find_semantic(&self, semantic: Semantic, semantic_index: u32) -> Option<ElementInfo> {
        self.elements()
            .find(|e| e.semantic == semantic && e.semantic_index == semantic_index)
    }

    /// Looks up an element by (semantic, semantic index) within `stream`.
    pub fn find_stream_semantic(
        &self,
        stream: u32,
        semantic: Semantic,
        semantic_index: u32,
    ) -> Option<ElementInfo> {
        self.stream_elements(stream)
            .find(|e| e.semantic == semantic && e.semantic_index == semantic_index)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Typed view of a raw `T` at `offset` in every record of `stream`.
    ///
    /// The accessor is invalid (and empty) if `stream` does not exist or `T`
    /// does not fit in the record at `offset`.
    pub fn raw_accessor<T, B>(&self, buffer: B, stream: u32, offset: u32) -> RawElementAccessor<T, B>
    where
        T: bytemuck::Pod,
        B: AsRef<[u8]>,
    {
        RawElementAccessor::new(buffer, self.stream_stride(stream), offset)
    }

    /// Converting view of the (semantic, semantic index) element of `stream`.
    ///
    /// The accessor is inert if the element cannot be found.
    pub fn proxy_accessor<B: AsRef<[u8]>>(
        &self,
        buffer: B,
        stream: u32,
        semantic: Semantic,
        semantic_index: u32,
    ) -> ProxyElementAccessor<B> {
        match self.find_stream_semantic(stream, semantic, semantic_index) {
            Some(element) => {
                ProxyElementAccessor::new(buffer, element, self.stream_stride(stream))
            }
            None => ProxyElementAccessor::invalid(buffer, semantic),
        }
    }
}
