//! Typed pointer views over memory sources
//!
//! A view is a plain value pairing an [`Address`](crate::core::types::Address)
//! with the source it reads through; copying a view copies nothing but the
//! address and the (usually zero-sized or borrowed) source. Views come in two
//! element encodings. Raw views ([`Ptr`], [`ArrayPtr`], [`FixedArrayPtr`])
//! transfer the in-memory layout of `T` directly and never consult the
//! marshaller. Marshalled views ([`MarshalledPtr`],
//! [`MarshalledFixedArrayPtr`]) transfer the fixed wire form defined by the
//! type's [`Marshal`](crate::marshal::Marshal) impl, whose size may differ
//! from `size_of::<T>()`.
//!
//! The source parameter defaults to [`LocalMemory`](crate::source::LocalMemory);
//! `with_source` pairs a view with any other backend (pass `&ProcessMemory`
//! to keep the view copyable).

pub mod array;
pub mod single;

pub use array::{
    ArrayPtr, FixedArrayIter, FixedArrayPtr, MarshalledFixedArrayIter, MarshalledFixedArrayPtr,
};
pub use single::{MarshalledPtr, Ptr};

/// Step width of a view's pointer arithmetic, in bytes.
///
/// Raw views step by `size_of::<T>()`; marshalled views step by the wire
/// size resolved when the view was constructed.
pub trait ElementSize {
    /// Size in bytes of one element as this view encodes it.
    fn element_size(&self) -> usize;
}
