//! An abstract "obtain N bytes / release N bytes"
//! capability that the rest of the crate is parametric over.
//!
//! Rust's global allocator already backs every `String`/`Vec` the value
//! model uses, so this module does not hand out raw memory itself; instead
//! it is an accounting hook that callers can install to cap how much the
//! library is willing to allocate (exercised by the Printer's `noalloc`
//! path and by property tests that want to force an `Error::Alloc`).
//!
//! Mirrors `cJSON_InitHooks`: a single process-wide allocator, replaceable
//! before first use, idempotent when reset with `None`.

use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::error::{Error, Result};

/// An abstract allocation budget. `reserve` is called before the library
/// grows an owned buffer; `release` is called when that growth is undone
/// (e.g. a print buffer shrinks back, or a subtree is dropped after having
/// reserved space for a no-alloc printer target).
pub trait Allocator: Send + Sync {
    fn reserve(&self, bytes: usize) -> Result<()>;
    fn release(&self, bytes: usize);
}

/// The default allocator: delegates entirely to the system allocator and
/// never refuses a request.
#[derive(Debug, Default)]
pub struct SystemAllocator;

impl Allocator for SystemAllocator {
    fn reserve(&self, _bytes: usize) -> Result<()> {
        Ok(())
    }

    fn release(&self, _bytes: usize) {}
}

/// An allocator with a fixed capacity, counting bytes currently reserved.
/// Useful for exercising `Error::Alloc` / the Printer's no-alloc overflow
/// path deterministically in tests.
#[derive(Debug)]
pub struct BoundedAllocator {
    capacity: usize,
    used: std::sync::atomic::AtomicUsize,
}

impl BoundedAllocator {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            used: std::sync::atomic::AtomicUsize::new(0),
        }
    }
}

impl Allocator for BoundedAllocator {
    fn reserve(&self, bytes: usize) -> Result<()> {
        use std::sync::atomic::Ordering;
        let mut current = self.used.load(Ordering::Relaxed);
        loop {
            let next = current.checked_add(bytes).ok_or(Error::Alloc)?;
            if next > self.capacity {
                return Err(Error::Alloc);
            }
            match self.used.compare_exchange_weak(
                current,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Ok(()),
                Err(observed) => current = observed,
            }
        }
    }

    fn release(&self, bytes: usize) {
        use std::sync::atomic::Ordering;
        self.used.fetch_sub(bytes, Ordering::Relaxed);
    }
}

static GLOBAL: Lazy<RwLock<Arc<dyn Allocator>>> =
    Lazy::new(|| RwLock::new(Arc::new(SystemAllocator)));

/// Install a process-wide allocator. Passing `None` resets to the default
/// [`SystemAllocator`]. This is *not* re-entrant with mutation of a
/// live tree: callers must install hooks before building any `Value`s.
pub fn set_global_allocator(allocator: Option<Arc<dyn Allocator>>) {
    let allocator = allocator.unwrap_or_else(|| Arc::new(SystemAllocator));
    *GLOBAL.write().expect("allocator lock poisoned") = allocator;
}

pub fn global_allocator() -> Arc<dyn Allocator> {
    Arc::clone(&GLOBAL.read().expect("allocator lock poisoned"))
}
