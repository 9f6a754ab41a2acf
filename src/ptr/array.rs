//! Array views over memory sources, counted and uncounted

use super::single::{MarshalledPtr, Ptr};
use super::ElementSize;
use crate::core::types::{Address, MemoryError, MemoryResult};
use crate::marshal::{resolver, Marshal};
use crate::source::{LocalMemory, MemoryReadWrite};
use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::slice;

/// An indexed view of unknown length in the raw encoding.
///
/// Indexing carries **no bounds check**: the view does not know how many
/// elements exist, so every index the caller passes is a claim that the
/// corresponding range is valid. Use [`FixedArrayPtr`] when the element
/// count is known.
pub struct ArrayPtr<T, S = LocalMemory> {
    address: Address,
    source: S,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ArrayPtr<T> {
    /// Creates a view into the calling process's own address space.
    pub fn new(address: impl Into<Address>) -> Self {
        Self::with_source(address, LocalMemory)
    }
}

impl<T, S> ArrayPtr<T, S> {
    /// Creates a view reading through an explicit source.
    pub fn with_source(address: impl Into<Address>, source: S) -> Self {
        ArrayPtr {
            address: address.into(),
            source,
            _marker: PhantomData,
        }
    }

    /// Base address of element 0.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The source this view reads through.
    pub fn source(&self) -> &S {
        &self.source
    }

    fn element_address(&self, index: usize) -> Address {
        self.address.offset((index * mem::size_of::<T>()) as isize)
    }

    /// A single-element pointer to `index`, unchecked like the view itself.
    pub fn ptr_to_element(&self, index: usize) -> Ptr<T, S>
    where
        S: Clone,
    {
        Ptr::with_source(self.element_address(index), self.source.clone())
    }
}

impl<T, S: MemoryReadWrite> ArrayPtr<T, S> {
    /// Reads element `index`.
    pub fn get(&self, index: usize) -> MemoryResult<T>
    where
        T: Copy,
    {
        self.source.read(self.element_address(index))
    }

    /// Writes element `index`.
    pub fn set(&self, index: usize, value: &T) -> MemoryResult<()>
    where
        T: Copy,
    {
        self.source.write(self.element_address(index), value)
    }
}

impl<T, S> ElementSize for ArrayPtr<T, S> {
    fn element_size(&self) -> usize {
        mem::size_of::<T>()
    }
}

impl<T, S: Clone> Clone for ArrayPtr<T, S> {
    fn clone(&self) -> Self {
        ArrayPtr {
            address: self.address,
            source: self.source.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, S: Copy> Copy for ArrayPtr<T, S> {}

impl<T, S> fmt::Debug for ArrayPtr<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArrayPtr<{}>({})", type_name::<T>(), self.address)
    }
}

/// A counted array view in the raw encoding.
///
/// All element access is bounds-checked against the count given at
/// construction; an out-of-range index reports
/// [`OutOfBounds`](MemoryError::OutOfBounds) without computing an address.
/// The count is a caller claim about the target memory, not something the
/// view can verify.
pub struct FixedArrayPtr<T, S = LocalMemory> {
    address: Address,
    count: usize,
    source: S,
    _marker: PhantomData<fn() -> T>,
}

impl<T> FixedArrayPtr<T> {
    /// Creates a view of `count` elements in the calling process's own
    /// address space.
    pub fn new(address: impl Into<Address>, count: usize) -> Self {
        Self::with_source(address, count, LocalMemory)
    }
}

impl<T, S> FixedArrayPtr<T, S> {
    /// Creates a view of `count` elements reading through an explicit source.
    pub fn with_source(address: impl Into<Address>, count: usize, source: S) -> Self {
        FixedArrayPtr {
            address: address.into(),
            count,
            source,
            _marker: PhantomData,
        }
    }

    /// Base address of element 0.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The source this view reads through.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Number of elements in the view.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether the view spans zero elements.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Total span of the view in bytes.
    pub fn byte_size(&self) -> usize {
        self.count * mem::size_of::<T>()
    }

    fn bounds_check(&self, index: usize) -> MemoryResult<()> {
        if index >= self.count {
            return Err(MemoryError::OutOfBounds {
                index,
                count: self.count,
            });
        }
        Ok(())
    }

    fn element_address(&self, index: usize) -> Address {
        self.address.offset((index * mem::size_of::<T>()) as isize)
    }

    /// A single-element pointer to `index`.
    pub fn ptr_to_element(&self, index: usize) -> MemoryResult<Ptr<T, S>>
    where
        S: Clone,
    {
        self.bounds_check(index)?;
        Ok(Ptr::with_source(
            self.element_address(index),
            self.source.clone(),
        ))
    }

    /// Converts to the marshalled encoding over the same element count.
    pub fn marshalled(self) -> MarshalledFixedArrayPtr<T, S>
    where
        T: Marshal,
    {
        MarshalledFixedArrayPtr::with_source(self.address, self.count, self.source)
    }
}

impl<T, S: MemoryReadWrite> FixedArrayPtr<T, S> {
    /// Reads element `index`.
    pub fn get(&self, index: usize) -> MemoryResult<T>
    where
        T: Copy,
    {
        self.bounds_check(index)?;
        self.source.read(self.element_address(index))
    }

    /// Writes element `index`.
    pub fn set(&self, index: usize, value: &T) -> MemoryResult<()>
    where
        T: Copy,
    {
        self.bounds_check(index)?;
        self.source.write(self.element_address(index), value)
    }

    /// Writes the elements of `data` into the view front, in one transfer.
    ///
    /// `data` may be shorter than the view; elements past `data.len()` are
    /// left untouched. A longer `data` is rejected.
    pub fn copy_from(&self, data: &[T]) -> MemoryResult<()>
    where
        T: Copy,
    {
        if data.len() > self.count {
            return Err(MemoryError::BufferTooSmall {
                expected: data.len(),
                actual: self.count,
            });
        }
        // Safety: any initialized [T] of plain data is readable as bytes.
        let bytes = unsafe {
            slice::from_raw_parts(data.as_ptr() as *const u8, data.len() * mem::size_of::<T>())
        };
        self.source.write_raw(self.address, bytes)
    }

    /// Reads every element into the front of `out`, in one transfer.
    ///
    /// `out` must hold at least [`count`](Self::count) elements; extra slots
    /// are left untouched.
    pub fn copy_to(&self, out: &mut [T]) -> MemoryResult<()>
    where
        T: Copy,
    {
        if out.len() < self.count {
            return Err(MemoryError::BufferTooSmall {
                expected: self.count,
                actual: out.len(),
            });
        }
        // Safety: the prefix spans exactly byte_size() bytes of `out`, which
        // read_raw fills completely or fails; T is plain data per the raw
        // encoding contract.
        let bytes = unsafe {
            slice::from_raw_parts_mut(out.as_mut_ptr() as *mut u8, self.byte_size())
        };
        self.source.read_raw(self.address, bytes)
    }

    /// Index of the first element equal to `value`, or `None`.
    pub fn index_of(&self, value: &T) -> MemoryResult<Option<usize>>
    where
        T: Copy + PartialEq,
    {
        for index in 0..self.count {
            if self.get(index)? == *value {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// Whether any element equals `value`.
    pub fn contains(&self, value: &T) -> MemoryResult<bool>
    where
        T: Copy + PartialEq,
    {
        Ok(self.index_of(value)?.is_some())
    }

    /// Iterates the elements lazily by repeated reads.
    ///
    /// Nothing is snapshotted: an element mutated between `next` calls is
    /// read in its new state, and a fresh `iter()` restarts from element 0.
    pub fn iter(&self) -> FixedArrayIter<'_, T, S> {
        FixedArrayIter {
            view: self,
            index: 0,
        }
    }
}

impl<T, S> ElementSize for FixedArrayPtr<T, S> {
    fn element_size(&self) -> usize {
        mem::size_of::<T>()
    }
}

impl<T, S: Clone> Clone for FixedArrayPtr<T, S> {
    fn clone(&self) -> Self {
        FixedArrayPtr {
            address: self.address,
            count: self.count,
            source: self.source.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, S: Copy> Copy for FixedArrayPtr<T, S> {}

impl<T, S> fmt::Debug for FixedArrayPtr<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FixedArrayPtr<{}>({}, {} elements)",
            type_name::<T>(),
            self.address,
            self.count
        )
    }
}

/// Lazy element iterator over a [`FixedArrayPtr`].
pub struct FixedArrayIter<'a, T, S> {
    view: &'a FixedArrayPtr<T, S>,
    index: usize,
}

impl<T: Copy, S: MemoryReadWrite> Iterator for FixedArrayIter<'_, T, S> {
    type Item = MemoryResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.view.count() {
            return None;
        }
        let item = self.view.get(self.index);
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.view.count().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<T: Copy, S: MemoryReadWrite> ExactSizeIterator for FixedArrayIter<'_, T, S> {}

impl<'a, T: Copy, S: MemoryReadWrite> IntoIterator for &'a FixedArrayPtr<T, S> {
    type Item = MemoryResult<T>;
    type IntoIter = FixedArrayIter<'a, T, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A counted array view in the marshalled encoding.
///
/// Elements occupy their wire size, resolved once at construction, so the
/// view's layout can differ from a `[T]` in memory. Bulk transfers stage the
/// whole wire block through one buffer and one syscall, encoding or decoding
/// each element in place.
pub struct MarshalledFixedArrayPtr<T, S = LocalMemory> {
    address: Address,
    count: usize,
    element_size: usize,
    source: S,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Marshal> MarshalledFixedArrayPtr<T> {
    /// Creates a view of `count` elements in the calling process's own
    /// address space.
    pub fn new(address: impl Into<Address>, count: usize) -> Self {
        Self::with_source(address, count, LocalMemory)
    }
}

impl<T: Marshal, S> MarshalledFixedArrayPtr<T, S> {
    /// Creates a view of `count` elements reading through an explicit source.
    pub fn with_source(address: impl Into<Address>, count: usize, source: S) -> Self {
        MarshalledFixedArrayPtr {
            address: address.into(),
            count,
            element_size: resolver::marshalled_size_of::<T>(),
            source,
            _marker: PhantomData,
        }
    }

    /// Converts back to the raw encoding over the same element count.
    pub fn raw(self) -> FixedArrayPtr<T, S> {
        FixedArrayPtr::with_source(self.address, self.count, self.source)
    }
}

impl<T, S> MarshalledFixedArrayPtr<T, S> {
    /// Base address of element 0.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The source this view reads through.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Number of elements in the view.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether the view spans zero elements.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Total span of the view in bytes, in wire terms.
    pub fn byte_size(&self) -> usize {
        self.count * self.element_size
    }

    fn bounds_check(&self, index: usize) -> MemoryResult<()> {
        if index >= self.count {
            return Err(MemoryError::OutOfBounds {
                index,
                count: self.count,
            });
        }
        Ok(())
    }

    fn element_address(&self, index: usize) -> Address {
        self.address.offset((index * self.element_size) as isize)
    }
}

impl<T: Marshal, S: MemoryReadWrite> MarshalledFixedArrayPtr<T, S> {
    /// Reads and decodes element `index`.
    pub fn get(&self, index: usize) -> MemoryResult<T> {
        self.bounds_check(index)?;
        self.source.read_marshalled(self.element_address(index))
    }

    /// Encodes and writes element `index`.
    pub fn set(&self, index: usize, value: &T) -> MemoryResult<()> {
        self.bounds_check(index)?;
        self.source
            .write_marshalled(self.element_address(index), value)
    }

    /// A single-element pointer to `index`.
    pub fn ptr_to_element(&self, index: usize) -> MemoryResult<MarshalledPtr<T, S>>
    where
        S: Clone,
    {
        self.bounds_check(index)?;
        Ok(MarshalledPtr::with_source(
            self.element_address(index),
            self.source.clone(),
        ))
    }

    /// Encodes the elements of `data` into the view front, in one transfer.
    ///
    /// `data` may be shorter than the view; elements past `data.len()` are
    /// left untouched. A longer `data` is rejected.
    pub fn copy_from(&self, data: &[T]) -> MemoryResult<()> {
        if data.len() > self.count {
            return Err(MemoryError::BufferTooSmall {
                expected: data.len(),
                actual: self.count,
            });
        }
        let mut buffer = vec![0u8; data.len() * self.element_size];
        for (index, item) in data.iter().enumerate() {
            let start = index * self.element_size;
            item.marshal(&mut buffer[start..start + self.element_size])?;
        }
        self.source.write_raw(self.address, &buffer)
    }

    /// Reads and decodes every element into the front of `out`, in one
    /// transfer.
    ///
    /// `out` must hold at least [`count`](Self::count) elements; extra slots
    /// are left untouched.
    pub fn copy_to(&self, out: &mut [T]) -> MemoryResult<()> {
        if out.len() < self.count {
            return Err(MemoryError::BufferTooSmall {
                expected: self.count,
                actual: out.len(),
            });
        }
        let mut buffer = vec![0u8; self.byte_size()];
        self.source.read_raw(self.address, &mut buffer)?;
        for (index, slot) in out.iter_mut().enumerate().take(self.count) {
            let start = index * self.element_size;
            *slot = T::unmarshal(&buffer[start..start + self.element_size])?;
        }
        Ok(())
    }

    /// Index of the first element equal to `value`, or `None`.
    pub fn index_of(&self, value: &T) -> MemoryResult<Option<usize>>
    where
        T: PartialEq,
    {
        for index in 0..self.count {
            if self.get(index)? == *value {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// Whether any element equals `value`.
    pub fn contains(&self, value: &T) -> MemoryResult<bool>
    where
        T: PartialEq,
    {
        Ok(self.index_of(value)?.is_some())
    }

    /// Iterates the elements lazily by repeated reads, decoding each.
    pub fn iter(&self) -> MarshalledFixedArrayIter<'_, T, S> {
        MarshalledFixedArrayIter {
            view: self,
            index: 0,
        }
    }
}

impl<T, S> ElementSize for MarshalledFixedArrayPtr<T, S> {
    fn element_size(&self) -> usize {
        self.element_size
    }
}

impl<T, S: Clone> Clone for MarshalledFixedArrayPtr<T, S> {
    fn clone(&self) -> Self {
        MarshalledFixedArrayPtr {
            address: self.address,
            count: self.count,
            element_size: self.element_size,
            source: self.source.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, S: Copy> Copy for MarshalledFixedArrayPtr<T, S> {}

impl<T, S> fmt::Debug for MarshalledFixedArrayPtr<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MarshalledFixedArrayPtr<{}>({}, {} x {} bytes)",
            type_name::<T>(),
            self.address,
            self.count,
            self.element_size
        )
    }
}

/// Lazy element iterator over a [`MarshalledFixedArrayPtr`].
pub struct MarshalledFixedArrayIter<'a, T, S> {
    view: &'a MarshalledFixedArrayPtr<T, S>,
    index: usize,
}

impl<T: Marshal, S: MemoryReadWrite> Iterator for MarshalledFixedArrayIter<'_, T, S> {
    type Item = MemoryResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.view.count() {
            return None;
        }
        let item = self.view.get(self.index);
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.view.count().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<T: Marshal, S: MemoryReadWrite> ExactSizeIterator for MarshalledFixedArrayIter<'_, T, S> {}

impl<'a, T: Marshal, S: MemoryReadWrite> IntoIterator for &'a MarshalledFixedArrayPtr<T, S> {
    type Item = MemoryResult<T>;
    type IntoIter = MarshalledFixedArrayIter<'a, T, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marshal::FixedText;

    #[test]
    fn test_array_ptr_element_addresses() {
        let view = ArrayPtr::<u32>::new(0x1000usize);
        assert_eq!(view.ptr_to_element(0).address(), Address::new(0x1000));
        assert_eq!(view.ptr_to_element(3).address(), Address::new(0x100C));
        assert_eq!(view.element_size(), 4);
    }

    #[test]
    fn test_fixed_array_rejects_out_of_range_index() {
        // The address is bogus on purpose: bounds failures must surface
        // before any address is computed or dereferenced.
        let view = FixedArrayPtr::<u32>::new(0x10usize, 4);

        match view.get(4) {
            Err(MemoryError::OutOfBounds { index, count }) => {
                assert_eq!(index, 4);
                assert_eq!(count, 4);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(view.set(9, &0).is_err());
        assert!(view.ptr_to_element(4).is_err());

        let element = view.ptr_to_element(3).unwrap();
        assert_eq!(element.address(), Address::new(0x10 + 12));
    }

    #[test]
    fn test_copy_length_validation() {
        let view = FixedArrayPtr::<u32>::new(0x10usize, 4);

        let too_long = [0u32; 5];
        match view.copy_from(&too_long) {
            Err(MemoryError::BufferTooSmall { expected, actual }) => {
                assert_eq!(expected, 5);
                assert_eq!(actual, 4);
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let mut too_short = [0u32; 3];
        match view.copy_to(&mut too_short) {
            Err(MemoryError::BufferTooSmall { expected, actual }) => {
                assert_eq!(expected, 4);
                assert_eq!(actual, 3);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_empty_view() {
        let view = FixedArrayPtr::<u64>::new(0x10usize, 0);
        assert!(view.is_empty());
        assert_eq!(view.byte_size(), 0);
        assert!(view.iter().next().is_none());
        assert!(view.copy_from(&[]).is_ok());
        assert!(view.copy_to(&mut []).is_ok());
        assert_eq!(view.index_of(&5).unwrap(), None);
    }

    #[test]
    fn test_view_debug_formats() {
        let counted = FixedArrayPtr::<u32>::new(0x2000usize, 7);
        let text = format!("{:?}", counted);
        assert!(text.contains("u32"));
        assert!(text.contains("7 elements"));

        let marshalled = MarshalledFixedArrayPtr::<FixedText<8>>::new(0x2000usize, 3);
        assert!(format!("{:?}", marshalled).contains("3 x 8 bytes"));
    }

    #[test]
    fn test_marshalled_view_sizes() {
        let view = MarshalledFixedArrayPtr::<FixedText<8>>::new(0x3000usize, 4);
        assert_eq!(view.element_size(), 8);
        assert_eq!(view.byte_size(), 32);

        let raw = view.raw();
        assert_eq!(raw.element_size(), mem::size_of::<FixedText<8>>());
        assert_eq!(raw.count(), 4);
        assert_eq!(raw.address(), Address::new(0x3000));
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_fixed_array_get_set() {
        let mut data = [0u32; 8];
        let view = FixedArrayPtr::<u32>::new(data.as_mut_ptr() as usize, 8);

        view.set(2, &99).unwrap();
        assert_eq!(view.get(2).unwrap(), 99);
        assert_eq!(data[2], 99);
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_bulk_copy_round_trip() {
        let mut data = [0u32; 4];
        let view = FixedArrayPtr::<u32>::new(data.as_mut_ptr() as usize, 4);

        view.copy_from(&[10, 20, 30, 40]).unwrap();
        assert_eq!(data, [10, 20, 30, 40]);

        // A shorter slice fills only the front
        view.copy_from(&[7, 8]).unwrap();
        assert_eq!(data, [7, 8, 30, 40]);

        let mut out = [0u32; 4];
        view.copy_to(&mut out).unwrap();
        assert_eq!(out, [7, 8, 30, 40]);
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_index_of_and_contains() {
        let mut data = [5u32, 6, 7, 8];
        let view = FixedArrayPtr::<u32>::new(data.as_mut_ptr() as usize, 4);

        assert_eq!(view.index_of(&7).unwrap(), Some(2));
        assert_eq!(view.index_of(&5).unwrap(), Some(0));
        assert_eq!(view.index_of(&99).unwrap(), None);
        assert!(view.contains(&8).unwrap());
        assert!(!view.contains(&99).unwrap());
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_iterator_reads_lazily() {
        let mut data = [1u32, 2, 3];
        let view = FixedArrayPtr::<u32>::new(data.as_mut_ptr() as usize, 3);

        let mut iter = view.iter();
        assert_eq!(iter.len(), 3);
        assert_eq!(iter.next().unwrap().unwrap(), 1);

        // Mutation between next() calls is visible: nothing was snapshotted
        view.set(1, &22).unwrap();
        assert_eq!(iter.next().unwrap().unwrap(), 22);
        assert_eq!(iter.next().unwrap().unwrap(), 3);
        assert!(iter.next().is_none());

        // A fresh iterator restarts from element 0
        let first: Vec<u32> = view.iter().map(|item| item.unwrap()).collect();
        assert_eq!(first, vec![1, 22, 3]);
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_marshalled_array_round_trip() {
        let mut backing = [0u8; 32];
        let view =
            MarshalledFixedArrayPtr::<FixedText<8>>::new(backing.as_mut_ptr() as usize, 4);

        let names = [
            FixedText::<8>::new("iron").unwrap(),
            FixedText::<8>::new("gold").unwrap(),
            FixedText::<8>::new("salt").unwrap(),
        ];
        view.copy_from(&names).unwrap();

        assert_eq!(view.get(1).unwrap().as_str(), "gold");
        assert_eq!(view.index_of(&names[2]).unwrap(), Some(2));

        view.set(1, &FixedText::new("lead").unwrap()).unwrap();
        assert_eq!(view.get(1).unwrap().as_str(), "lead");

        // The wire block is NUL-padded text, 8 bytes per element
        assert_eq!(&backing[0..4], b"iron");
        assert_eq!(&backing[8..12], b"lead");
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_marshalled_copy_to_decodes_fresh_values() {
        let mut backing = [0u8; 24];
        let view =
            MarshalledFixedArrayPtr::<FixedText<8>>::new(backing.as_mut_ptr() as usize, 3);

        let items = [
            FixedText::<8>::new("a").unwrap(),
            FixedText::<8>::new("bb").unwrap(),
            FixedText::<8>::new("ccc").unwrap(),
        ];
        view.copy_from(&items).unwrap();

        let mut out = [
            FixedText::<8>::default(),
            FixedText::<8>::default(),
            FixedText::<8>::default(),
        ];
        view.copy_to(&mut out).unwrap();
        assert_eq!(out, items);

        let lengths: Vec<usize> = view.iter().map(|item| item.unwrap().len()).collect();
        assert_eq!(lengths, vec![1, 2, 3]);
    }
}
