use crate::effect::Effect;
use crate::signal::ReadSignal;

/// Read-only derived value, see [`Runtime::memo`](crate::Runtime::memo).
pub struct Memo<T> {
    signal: ReadSignal<T>,
    effect: Effect,
}

impl<T> Clone for Memo<T> {
    fn clone(&self) -> Self {
        Self { signal: self.signal.clone(), effect: self.effect.clone() }
    }
}

impl<T> std::fmt::Debug for Memo<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memo").field("effect", &self.effect).finish()
    }
}

impl<T: 'static> Memo<T> {
    pub(crate) fn new(signal: ReadSignal<T>, effect: Effect) -> Self {
        Self { signal, effect }
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.signal.with(f)
    }

    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.signal.with_untracked(f)
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.signal.get()
    }

    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.signal.get_untracked()
    }

    /// Stop recomputing; the last value stays readable.
    pub fn dispose(&self) {
        self.effect.dispose();
    }
}
