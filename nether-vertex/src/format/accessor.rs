//! Typed views over vertex buffers
//!
//! Accessors pair a borrowed (or owned) byte buffer with a stream layout and
//! resolve per-vertex byte ranges with explicit bounds checks. Nothing here
//! requires the buffer to be aligned.

use super::ElementInfo;
use crate::conversion::convert_value;
use crate::registry::{Semantic, StorageType};
use crate::value::ElementType;
use bytemuck::Pod;
use std::marker::PhantomData;
use std::ops::Range;

// ============================================================================
// Raw accessor
// ============================================================================

/// Reads and writes a plain `T` at a fixed offset in every record of a stream.
#[derive(Debug)]
pub struct RawElementAccessor<T, B> {
    buffer: B,
    offset: usize,
    stride: usize,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T: Pod, B: AsRef<[u8]>> RawElementAccessor<T, B> {
    /// Wraps `buffer`, a sequence of `stride`-byte records with `T` at `offset`.
    pub fn new(buffer: B, stride: u32, offset: u32) -> Self {
        let stride = stride as usize;
        let offset = offset as usize;
        let fits = stride > 0 && offset + size_of::<T>() <= stride;
        let len = if fits {
            buffer.as_ref().len() / stride
        } else {
            0
        };
        Self {
            buffer,
            offset,
            stride,
            len,
            _marker: PhantomData,
        }
    }

    /// False if the layout could not hold a `T`.
    pub fn is_valid(&self) -> bool {
        self.stride > 0 && self.offset + size_of::<T>() <= self.stride
    }

    /// Number of whole records in the buffer.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Byte range of record `index`, or `None` if out of bounds.
    pub fn try_index(&self, index: usize) -> Option<Range<usize>> {
        (index < self.len).then(|| {
            let start = index * self.stride + self.offset;
            start..start + size_of::<T>()
        })
    }

    pub fn get(&self, index: usize) -> Option<T> {
        let range = self.try_index(index)?;
        Some(bytemuck::pod_read_unaligned(&self.buffer.as_ref()[range]))
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len).filter_map(|index| self.get(index))
    }

    pub fn into_inner(self) -> B {
        self.buffer
    }
}

impl<T: Pod, B: AsRef<[u8]> + AsMut<[u8]>> RawElementAccessor<T, B> {
    /// Writes `value` into record `index`. Returns false if out of bounds.
    pub fn set(&mut self, index: usize, value: T) -> bool {
        match self.try_index(index) {
            Some(range) => {
                self.buffer.as_mut()[range].copy_from_slice(bytemuck::bytes_of(&value));
                true
            }
            None => false,
        }
    }
}

// ============================================================================
// Proxy accessor
// ============================================================================

/// One element of one vertex, convertible to any supported Rust type.
#[derive(Debug, Clone, Copy)]
pub struct ElementProxy<'a> {
    semantic: Semantic,
    storage: StorageType,
    bytes: &'a [u8],
}

impl ElementProxy<'_> {
    pub fn storage(&self) -> StorageType {
        self.storage
    }

    pub fn bytes(&self) -> &[u8] {
        self.bytes
    }

    /// The value converted to `T`, or `None` if no conversion exists.
    pub fn get<T: ElementType>(&self) -> Option<T> {
        read_converted(self.semantic, self.bytes, self.storage)
    }
}

/// Mutable counterpart of [`ElementProxy`].
#[derive(Debug)]
pub struct ElementProxyMut<'a> {
    semantic: Semantic,
    storage: StorageType,
    bytes: &'a mut [u8],
}

impl ElementProxyMut<'_> {
    pub fn storage(&self) -> StorageType {
        self.storage
    }

    pub fn get<T: ElementType>(&self) -> Option<T> {
        read_converted(self.semantic, self.bytes, self.storage)
    }

    /// Stores `value` converted to the element's storage type.
    ///
    /// Returns false, leaving the element untouched, if no conversion exists.
    pub fn set<T: ElementType>(&mut self, value: &T) -> bool {
        convert_value(
            self.semantic,
            self.bytes,
            self.storage,
            bytemuck::bytes_of(value),
            T::STORAGE,
        )
    }
}

fn read_converted<T: ElementType>(
    semantic: Semantic,
    bytes: &[u8],
    storage: StorageType,
) -> Option<T> {
    let mut value = <T as bytemuck::Zeroable>::zeroed();
    convert_value(
        semantic,
        bytemuck::bytes_of_mut(&mut value),
        T::STORAGE,
        bytes,
        storage,
    )
    .then_some(value)
}

/// Per-vertex access to one (semantic, semantic index) element of a stream,
/// converting to and from whatever Rust type the caller asks for.
#[derive(Debug)]
pub struct ProxyElementAccessor<B> {
    buffer: B,
    semantic: Semantic,
    storage: StorageType,
    offset: usize,
    stride: usize,
    len: usize,
}

impl<B: AsRef<[u8]>> ProxyElementAccessor<B> {
    pub(crate) fn new(buffer: B, element: ElementInfo, stride: u32) -> Self {
        let stride = stride as usize;
        let len = if stride > 0 {
            buffer.as_ref().len() / stride
        } else {
            0
        };
        Self {
            buffer,
            semantic: element.semantic,
            storage: element.storage,
            offset: element.offset as usize,
            stride,
            len,
        }
    }

    pub(crate) fn invalid(buffer: B, semantic: Semantic) -> Self {
        Self {
            buffer,
            semantic,
            storage: StorageType::Unknown,
            offset: 0,
            stride: 0,
            len: 0,
        }
    }

    /// False if the element could not be resolved.
    pub fn is_valid(&self) -> bool {
        self.storage != StorageType::Unknown && self.stride > 0
    }

    pub fn semantic(&self) -> Semantic {
        self.semantic
    }

    /// Storage type of the resolved element (`Unknown` when invalid).
    pub fn storage(&self) -> StorageType {
        self.storage
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Byte range of the element in record `index`, or `None` if out of bounds.
    pub fn try_index(&self, index: usize) -> Option<Range<usize>> {
        (self.is_valid() && index < self.len).then(|| {
            let start = index * self.stride + self.offset;
            start..start + self.storage.size() as usize
        })
    }

    pub fn element(&self, index: usize) -> Option<ElementProxy<'_>> {
        let range = self.try_index(index)?;
        Some(ElementProxy {
            semantic: self.semantic,
            storage: self.storage,
            bytes: &self.buffer.as_ref()[range],
        })
    }

    /// Element of vertex `index` converted to `T`.
    pub fn get<T: ElementType>(&self, index: usize) -> Option<T> {
        self.element(index)?.get()
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> ProxyElementAccessor<B> {
    pub fn element_mut(&mut self, index: usize) -> Option<ElementProxyMut<'_>> {
        let range = self.try_index(index)?;
        Some(ElementProxyMut {
            semantic: self.semantic,
            storage: self.storage,
            bytes: &mut self.buffer.as_mut()[range],
        })
    }

    /// Stores `value` into vertex `index`. Returns false if out of bounds or
    /// not convertible.
    pub fn set<T: ElementType>(&mut self, index: usize, value: &T) -> bool {
        self.element_mut(index)
            .is_some_and(|mut element| element.set(value))
    }
}
