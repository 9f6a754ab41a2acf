//! Single-element typed pointers in both encodings

use super::ElementSize;
use crate::core::types::{Address, MemoryResult};
use crate::marshal::{resolver, Marshal};
use crate::source::{LocalMemory, MemoryReadWrite};
use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// A typed pointer in the raw encoding.
///
/// `get`/`set` transfer the in-memory layout of `T`, so `T` must be
/// plain data (see [`MemoryReadWrite::read`]). Arithmetic steps by
/// `size_of::<T>()`. The view itself never validates the address; it is as
/// unchecked as the pointer it wraps.
pub struct Ptr<T, S = LocalMemory> {
    address: Address,
    source: S,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Ptr<T> {
    /// Creates a pointer into the calling process's own address space.
    pub fn new(address: impl Into<Address>) -> Self {
        Self::with_source(address, LocalMemory)
    }
}

impl<T, S> Ptr<T, S> {
    /// Creates a pointer reading through an explicit source.
    pub fn with_source(address: impl Into<Address>, source: S) -> Self {
        Ptr {
            address: address.into(),
            source,
            _marker: PhantomData,
        }
    }

    /// The address this pointer designates.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The source this pointer reads through.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// A pointer displaced by `count` elements, negative values moving down.
    pub fn offset(&self, count: isize) -> Self
    where
        S: Clone,
    {
        Ptr {
            address: self
                .address
                .offset(count * mem::size_of::<T>() as isize),
            source: self.source.clone(),
            _marker: PhantomData,
        }
    }

    /// Converts to the marshalled encoding at the same address.
    pub fn marshalled(self) -> MarshalledPtr<T, S>
    where
        T: Marshal,
    {
        MarshalledPtr::with_source(self.address, self.source)
    }
}

impl<T, S: MemoryReadWrite> Ptr<T, S> {
    /// Reads the pointee.
    pub fn get(&self) -> MemoryResult<T>
    where
        T: Copy,
    {
        self.source.read(self.address)
    }

    /// Writes the pointee.
    pub fn set(&self, value: &T) -> MemoryResult<()>
    where
        T: Copy,
    {
        self.source.write(self.address, value)
    }
}

impl<T, S> ElementSize for Ptr<T, S> {
    fn element_size(&self) -> usize {
        mem::size_of::<T>()
    }
}

impl<T, S> Add<usize> for Ptr<T, S> {
    type Output = Self;

    fn add(mut self, count: usize) -> Self {
        self.address = self.address.offset((count * mem::size_of::<T>()) as isize);
        self
    }
}

impl<T, S> Sub<usize> for Ptr<T, S> {
    type Output = Self;

    fn sub(mut self, count: usize) -> Self {
        self.address = self
            .address
            .offset(-((count * mem::size_of::<T>()) as isize));
        self
    }
}

impl<T, S> AddAssign<usize> for Ptr<T, S> {
    fn add_assign(&mut self, count: usize) {
        self.address = self.address.offset((count * mem::size_of::<T>()) as isize);
    }
}

impl<T, S> SubAssign<usize> for Ptr<T, S> {
    fn sub_assign(&mut self, count: usize) {
        self.address = self
            .address
            .offset(-((count * mem::size_of::<T>()) as isize));
    }
}

impl<T, S: Clone> Clone for Ptr<T, S> {
    fn clone(&self) -> Self {
        Ptr {
            address: self.address,
            source: self.source.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, S: Copy> Copy for Ptr<T, S> {}

impl<T, S> fmt::Debug for Ptr<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ptr<{}>({})", type_name::<T>(), self.address)
    }
}

/// A typed pointer in the marshalled encoding.
///
/// `get`/`set` transfer the wire form defined by `T`'s [`Marshal`] impl. The
/// wire size is resolved once at construction through the cached resolver and
/// drives all arithmetic, so stepping a `MarshalledPtr` can move by a
/// different stride than stepping a `Ptr` of the same `T`.
pub struct MarshalledPtr<T, S = LocalMemory> {
    address: Address,
    element_size: usize,
    source: S,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Marshal> MarshalledPtr<T> {
    /// Creates a pointer into the calling process's own address space.
    pub fn new(address: impl Into<Address>) -> Self {
        Self::with_source(address, LocalMemory)
    }
}

impl<T: Marshal, S> MarshalledPtr<T, S> {
    /// Creates a pointer reading through an explicit source.
    pub fn with_source(address: impl Into<Address>, source: S) -> Self {
        MarshalledPtr {
            address: address.into(),
            element_size: resolver::marshalled_size_of::<T>(),
            source,
            _marker: PhantomData,
        }
    }

    /// Converts back to the raw encoding at the same address.
    pub fn raw(self) -> Ptr<T, S> {
        Ptr::with_source(self.address, self.source)
    }
}

impl<T, S> MarshalledPtr<T, S> {
    /// The address this pointer designates.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The source this pointer reads through.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// A pointer displaced by `count` elements, negative values moving down.
    pub fn offset(&self, count: isize) -> Self
    where
        S: Clone,
    {
        MarshalledPtr {
            address: self
                .address
                .offset(count * self.element_size as isize),
            element_size: self.element_size,
            source: self.source.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Marshal, S: MemoryReadWrite> MarshalledPtr<T, S> {
    /// Reads and decodes the pointee.
    pub fn get(&self) -> MemoryResult<T> {
        self.source.read_marshalled(self.address)
    }

    /// Encodes and writes the pointee.
    pub fn set(&self, value: &T) -> MemoryResult<()> {
        self.source.write_marshalled(self.address, value)
    }
}

impl<T, S> ElementSize for MarshalledPtr<T, S> {
    fn element_size(&self) -> usize {
        self.element_size
    }
}

impl<T, S> Add<usize> for MarshalledPtr<T, S> {
    type Output = Self;

    fn add(mut self, count: usize) -> Self {
        self.address = self.address.offset((count * self.element_size) as isize);
        self
    }
}

impl<T, S> Sub<usize> for MarshalledPtr<T, S> {
    type Output = Self;

    fn sub(mut self, count: usize) -> Self {
        self.address = self
            .address
            .offset(-((count * self.element_size) as isize));
        self
    }
}

impl<T, S> AddAssign<usize> for MarshalledPtr<T, S> {
    fn add_assign(&mut self, count: usize) {
        self.address = self.address.offset((count * self.element_size) as isize);
    }
}

impl<T, S> SubAssign<usize> for MarshalledPtr<T, S> {
    fn sub_assign(&mut self, count: usize) {
        self.address = self
            .address
            .offset(-((count * self.element_size) as isize));
    }
}

impl<T, S: Clone> Clone for MarshalledPtr<T, S> {
    fn clone(&self) -> Self {
        MarshalledPtr {
            address: self.address,
            element_size: self.element_size,
            source: self.source.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, S: Copy> Copy for MarshalledPtr<T, S> {}

impl<T, S> fmt::Debug for MarshalledPtr<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MarshalledPtr<{}>({}, wire {} bytes)",
            type_name::<T>(),
            self.address,
            self.element_size
        )
    }
}
