//! Cell sharing a driver or PAL instance between the main loop and the
//! interrupt handlers.



use core::cell::RefCell;

use critical_section::Mutex;



/// A value guarded by a critical section, empty until `put`.
pub struct Shared<T> {
    inner: Mutex<RefCell<Option<T>>>,
}

impl<T> Shared<T> {
    /// Creates an empty cell, usable in a `static`.
    pub const fn new() -> Self {
        Self { inner: Mutex::new(RefCell::new(None)) }
    }

    /// Stores a value. Returns the previous one.
    pub fn put(&self, value: T) -> Option<T> {
        critical_section::with(|cs| self.inner.borrow(cs).replace(Some(value)))
    }

    /// Removes the value, leaving the cell empty.
    pub fn take(&self) -> Option<T> {
        critical_section::with(|cs| self.inner.borrow(cs).take())
    }

    /// Runs `f` on the value inside a critical section. Returns `None` if
    /// the cell is empty or already borrowed by an outer call.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        critical_section::with(|cs| {
            let mut guard = self.inner.borrow(cs).try_borrow_mut().ok()?;
            guard.as_mut().map(f)
        })
    }
}

impl<T> Default for Shared<T> {
    fn default() -> Self {
        Self::new()
    }
}
