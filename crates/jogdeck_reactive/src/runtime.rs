use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{error, trace};

use crate::effect::Effect;
use crate::error::ReactiveError;
use crate::memo::Memo;
use crate::signal::RwSignal;

/// Default cap on nested effect runs.
pub const DEFAULT_MAX_DEPTH: usize = 64;

pub(crate) type SignalId = usize;
pub(crate) type EffectId = usize;

struct EffectSlot {
    run: Rc<dyn Fn()>,
    /// Signals read during the most recent run.
    sources: Vec<SignalId>,
}

pub(crate) struct RuntimeInner {
    /// Subscribers per signal, indexed by `SignalId`.
    subscribers: RefCell<Vec<Vec<EffectId>>>,
    /// `None` once disposed.
    effects: RefCell<Vec<Option<EffectSlot>>>,
    /// Stack of running effects; the top one records reads.
    observers: RefCell<Vec<EffectId>>,
    depth: Cell<usize>,
    max_depth: usize,
    /// First overflow of the current cascade, reported by the outermost write.
    overflow: RefCell<Option<ReactiveError>>,
}

/// Pops the observer stack even if the effect body panics.
struct RunGuard<'a> {
    runtime: &'a RuntimeInner,
}

impl<'a> RunGuard<'a> {
    fn enter(runtime: &'a RuntimeInner, effect: EffectId) -> Self {
        runtime.observers.borrow_mut().push(effect);
        runtime.depth.set(runtime.depth.get() + 1);
        Self { runtime }
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.runtime.observers.borrow_mut().pop();
        self.runtime.depth.set(self.runtime.depth.get().saturating_sub(1));
    }
}

impl RuntimeInner {
    fn new(max_depth: usize) -> Self {
        Self {
            subscribers: RefCell::new(Vec::new()),
            effects: RefCell::new(Vec::new()),
            observers: RefCell::new(Vec::new()),
            depth: Cell::new(0),
            max_depth,
            overflow: RefCell::new(None),
        }
    }

    pub(crate) fn register_signal(&self) -> SignalId {
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.push(Vec::new());
        subscribers.len() - 1
    }

    /// Subscribe the running effect, if any, to `signal`.
    pub(crate) fn track(&self, signal: SignalId) {
        let Some(effect) = self.observers.borrow().last().copied() else {
            return;
        };

        if let Some(subscribers) = self.subscribers.borrow_mut().get_mut(signal) {
            if !subscribers.contains(&effect) {
                subscribers.push(effect);
            }
        }
        if let Some(Some(slot)) = self.effects.borrow_mut().get_mut(effect) {
            if !slot.sources.contains(&signal) {
                slot.sources.push(signal);
            }
        }
    }

    /// Re-run every current subscriber of `signal`.
    pub(crate) fn notify(&self, signal: SignalId) -> Result<(), ReactiveError> {
        let outermost = self.depth.get() == 0;
        let subscribers = self
            .subscribers
            .borrow()
            .get(signal)
            .cloned()
            .unwrap_or_default();

        for effect in subscribers {
            if self.overflow.borrow().is_some() {
                break;
            }
            self.run_effect(effect);
        }

        self.finish(outermost)
    }

    fn finish(&self, outermost: bool) -> Result<(), ReactiveError> {
        let overflow = if outermost {
            self.overflow.borrow_mut().take()
        } else {
            self.overflow.borrow().clone()
        };
        match overflow {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn register_effect(&self, run: Rc<dyn Fn()>) -> EffectId {
        let mut effects = self.effects.borrow_mut();
        effects.push(Some(EffectSlot { run, sources: Vec::new() }));
        effects.len() - 1
    }

    fn run_effect(&self, effect: EffectId) {
        let run = match self.effects.borrow().get(effect) {
            Some(Some(slot)) => slot.run.clone(),
            _ => return,
        };

        let depth = self.depth.get();
        if depth >= self.max_depth {
            error!(
                "[reactive] effect {} refused at depth {}: recursion limit {} reached",
                effect,
                depth + 1,
                self.max_depth
            );
            self.overflow
                .borrow_mut()
                .get_or_insert(ReactiveError::RecursionLimit {
                    depth: depth + 1,
                    limit: self.max_depth,
                });
            return;
        }

        self.clear_sources(effect);
        trace!("[reactive] running effect {} at depth {}", effect, depth + 1);
        let _guard = RunGuard::enter(self, effect);
        run();
    }

    fn clear_sources(&self, effect: EffectId) {
        let sources = match self.effects.borrow_mut().get_mut(effect) {
            Some(Some(slot)) => std::mem::take(&mut slot.sources),
            _ => return,
        };
        let mut subscribers = self.subscribers.borrow_mut();
        for signal in sources {
            if let Some(list) = subscribers.get_mut(signal) {
                list.retain(|id| *id != effect);
            }
        }
    }

    pub(crate) fn dispose_effect(&self, effect: EffectId) {
        self.clear_sources(effect);
        if let Some(slot) = self.effects.borrow_mut().get_mut(effect) {
            *slot = None;
        }
    }

    pub(crate) fn is_effect_active(&self, effect: EffectId) -> bool {
        matches!(self.effects.borrow().get(effect), Some(Some(_)))
    }

    fn untrack<R>(&self, f: impl FnOnce() -> R) -> R {
        let saved = std::mem::take(&mut *self.observers.borrow_mut());
        let result = f();
        *self.observers.borrow_mut() = saved;
        result
    }
}

/// Owner of all signals and effects of one reactive graph.
///
/// Cloning is cheap and yields a handle to the same graph. Graphs created by
/// different `Runtime::new` calls never interact.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("signals", &self.inner.subscribers.borrow().len())
            .field("effects", &self.inner.effects.borrow().len())
            .field("depth", &self.inner.depth.get())
            .field("max_depth", &self.inner.max_depth)
            .finish()
    }
}

impl Runtime {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    /// Runtime whose write cascades may nest at most `max_depth` effect runs.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { inner: Rc::new(RuntimeInner::new(max_depth)) }
    }

    pub fn max_depth(&self) -> usize {
        self.inner.max_depth
    }

    /// True while an effect is running and recording reads.
    pub fn is_tracking(&self) -> bool {
        !self.inner.observers.borrow().is_empty()
    }

    pub fn signal<T: 'static>(&self, value: T) -> RwSignal<T> {
        RwSignal::new_in(&self.inner, value)
    }

    /// Register `f` and run it once immediately to collect its dependencies.
    ///
    /// If that first run overflows the recursion limit the effect is
    /// disposed and the error returned.
    pub fn effect(&self, f: impl Fn() + 'static) -> Result<Effect, ReactiveError> {
        let outermost = self.inner.depth.get() == 0;
        let id = self.inner.register_effect(Rc::new(f));
        self.inner.run_effect(id);

        if let Err(err) = self.inner.finish(outermost) {
            self.inner.dispose_effect(id);
            return Err(err);
        }
        Ok(Effect::new(id, Rc::downgrade(&self.inner)))
    }

    /// Derived value recomputed whenever a signal read by `f` changes.
    ///
    /// `f` should only compute a value; side effects in it run on every
    /// recompute.
    pub fn memo<T: 'static>(&self, f: impl Fn() -> T + 'static) -> Result<Memo<T>, ReactiveError> {
        let slot: Rc<RefCell<Option<RwSignal<T>>>> = Rc::new(RefCell::new(None));
        let runtime: Weak<RuntimeInner> = Rc::downgrade(&self.inner);

        let effect = self.effect({
            let slot = slot.clone();
            move || {
                let value = f();
                let current = slot.borrow().clone();
                match current {
                    // Overflow is latched and reported by the outermost write.
                    Some(signal) => {
                        let _ = signal.set(value);
                    }
                    None => {
                        if let Some(inner) = runtime.upgrade() {
                            *slot.borrow_mut() = Some(RwSignal::new_in(&inner, value));
                        }
                    }
                }
            }
        })?;

        let signal = slot.borrow().clone().ok_or(ReactiveError::Disposed)?;
        Ok(Memo::new(signal.read_only(), effect))
    }

    /// Run `f` without recording any signal reads as dependencies.
    pub fn untrack<R>(&self, f: impl FnOnce() -> R) -> R {
        self.inner.untrack(f)
    }
}
