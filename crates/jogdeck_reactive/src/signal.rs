use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::error::ReactiveError;
use crate::runtime::{RuntimeInner, SignalId};

/// A readable and writable reactive value.
///
/// Handles are cheap to clone and all clones refer to the same value.
/// Writing a signal from inside its own [`with`](Self::with) closure fails
/// with [`ReactiveError::Borrowed`].
pub struct RwSignal<T> {
    id: SignalId,
    value: Rc<RefCell<T>>,
    runtime: Weak<RuntimeInner>,
}

impl<T> Clone for RwSignal<T> {
    fn clone(&self) -> Self {
        Self { id: self.id, value: self.value.clone(), runtime: self.runtime.clone() }
    }
}

impl<T> std::fmt::Debug for RwSignal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RwSignal").field("id", &self.id).finish()
    }
}

impl<T: 'static> RwSignal<T> {
    pub(crate) fn new_in(runtime: &Rc<RuntimeInner>, value: T) -> Self {
        Self {
            id: runtime.register_signal(),
            value: Rc::new(RefCell::new(value)),
            runtime: Rc::downgrade(runtime),
        }
    }

    fn track(&self) {
        if let Some(runtime) = self.runtime.upgrade() {
            runtime.track(self.id);
        }
    }

    fn notify(&self) -> Result<(), ReactiveError> {
        match self.runtime.upgrade() {
            Some(runtime) => runtime.notify(self.id),
            None => Err(ReactiveError::Disposed),
        }
    }

    /// Borrow the value, subscribing the running effect.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.track();
        f(&self.value.borrow())
    }

    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.with(T::clone)
    }

    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.with_untracked(T::clone)
    }

    /// Replace the value and synchronously re-run its subscribers.
    ///
    /// The value is stored even when a subscriber run fails. A write while
    /// the value is borrowed is refused and stores nothing.
    pub fn set(&self, value: T) -> Result<(), ReactiveError> {
        let mut slot = self.value.try_borrow_mut().map_err(|_| ReactiveError::Borrowed)?;
        *slot = value;
        drop(slot);
        self.notify()
    }

    /// Modify a copy of the value and publish it.
    ///
    /// `f` may read this signal; it sees the value from before the update.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> Result<(), ReactiveError>
    where
        T: Clone,
    {
        let mut next = self.get_untracked();
        f(&mut next);
        self.set(next)
    }

    pub fn read_only(&self) -> ReadSignal<T> {
        ReadSignal { inner: self.clone() }
    }

    pub fn write_only(&self) -> WriteSignal<T> {
        WriteSignal { inner: self.clone() }
    }

    pub fn split(&self) -> (ReadSignal<T>, WriteSignal<T>) {
        (self.read_only(), self.write_only())
    }
}

/// Read half of a signal.
pub struct ReadSignal<T> {
    inner: RwSignal<T>,
}

impl<T> Clone for ReadSignal<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T> std::fmt::Debug for ReadSignal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadSignal").field("id", &self.inner.id).finish()
    }
}

impl<T: 'static> ReadSignal<T> {
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.inner.with(f)
    }

    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.inner.with_untracked(f)
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.inner.get()
    }

    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.inner.get_untracked()
    }
}

/// Write half of a signal.
pub struct WriteSignal<T> {
    inner: RwSignal<T>,
}

impl<T> Clone for WriteSignal<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T: 'static> WriteSignal<T> {
    pub fn set(&self, value: T) -> Result<(), ReactiveError> {
        self.inner.set(value)
    }

    pub fn update(&self, f: impl FnOnce(&mut T)) -> Result<(), ReactiveError>
    where
        T: Clone,
    {
        self.inner.update(f)
    }
}
