//! The allocation capability consumed by the table engine.
//!
//! [`HashTable`](crate::HashTable) never calls the global allocator directly.
//! Everything it owns - the bucket array and each individually-boxed entry -
//! goes through an injected [`Allocator`], so callers can substitute arenas,
//! free-lists, or instrumented allocators without touching table code.

use alloc::alloc::handle_alloc_error;
use core::alloc::Layout;
use core::ptr::NonNull;

/// A narrow allocation capability: raw block allocation plus typed entry
/// construction and destruction.
///
/// The surface is deliberately infallible. An implementation that runs out of
/// memory must diverge (the provided [`Global`] calls
/// [`handle_alloc_error`]); it must never return a dangling or null pointer
/// for a non-zero-sized layout. This keeps every caller free of partial-state
/// recovery paths: a failed allocation aborts before any table state has been
/// modified.
pub trait Allocator {
    /// Allocates a block of memory described by `layout`.
    ///
    /// For zero-sized layouts the returned pointer is dangling but correctly
    /// aligned; it must not be read through or passed to the system
    /// deallocator.
    fn allocate(&self, layout: Layout) -> NonNull<u8>;

    /// Releases a block previously returned by [`allocate`](Self::allocate).
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate` on this same allocator
    /// with this same `layout`, and must not be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Moves `value` into freshly allocated storage and returns a pointer to
    /// it.
    fn construct<T>(&self, value: T) -> NonNull<T> {
        let ptr = self.allocate(Layout::new::<T>()).cast::<T>();
        // SAFETY: `allocate` returned storage valid for `Layout::new::<T>()`.
        unsafe { ptr.write(value) };
        ptr
    }

    /// Moves the value out of storage produced by
    /// [`construct`](Self::construct) and releases the storage.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `construct` on this same allocator,
    /// must point to a live value, and must not be used afterwards.
    unsafe fn destroy<T>(&self, ptr: NonNull<T>) -> T {
        // SAFETY: the caller guarantees `ptr` holds a live `T` obtained from
        // `construct`, which used `Layout::new::<T>()`.
        unsafe {
            let value = ptr.read();
            self.deallocate(ptr.cast(), Layout::new::<T>());
            value
        }
    }
}

impl<A: Allocator + ?Sized> Allocator for &A {
    fn allocate(&self, layout: Layout) -> NonNull<u8> {
        (**self).allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded verbatim; the caller upholds the contract.
        unsafe { (**self).deallocate(ptr, layout) }
    }
}

/// The global allocator, adapted to the [`Allocator`] capability.
///
/// This is the default allocation strategy for
/// [`HashTable`](crate::HashTable) and [`HashMap`](crate::HashMap).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Global;

impl Allocator for Global {
    fn allocate(&self, layout: Layout) -> NonNull<u8> {
        if layout.size() == 0 {
            // An aligned dangling pointer stands in for zero-sized blocks.
            let dangling = core::ptr::without_provenance_mut::<u8>(layout.align());
            // SAFETY: `layout.align()` is non-zero.
            return unsafe { NonNull::new_unchecked(dangling) };
        }

        // SAFETY: the layout has non-zero size, and a null return is diverted
        // to `handle_alloc_error`.
        unsafe {
            let raw = alloc::alloc::alloc(layout);
            if raw.is_null() {
                handle_alloc_error(layout);
            }
            NonNull::new_unchecked(raw)
        }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() != 0 {
            // SAFETY: the caller guarantees `ptr` came from `allocate` with
            // `layout`, which for non-zero sizes used the global allocator.
            unsafe { alloc::alloc::dealloc(ptr.as_ptr(), layout) };
        }
    }
}
