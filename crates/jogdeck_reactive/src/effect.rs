use std::rc::Weak;

use crate::runtime::{EffectId, RuntimeInner};

/// Handle to a registered effect.
///
/// Dropping the handle does not stop the effect; it lives as long as its
/// runtime unless [`dispose`](Self::dispose) is called.
#[derive(Clone)]
pub struct Effect {
    id: EffectId,
    runtime: Weak<RuntimeInner>,
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Effect {
    pub(crate) fn new(id: EffectId, runtime: Weak<RuntimeInner>) -> Self {
        Self { id, runtime }
    }

    /// Unsubscribe from all signals; the effect never runs again.
    pub fn dispose(&self) {
        if let Some(runtime) = self.runtime.upgrade() {
            runtime.dispose_effect(self.id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.runtime
            .upgrade()
            .is_some_and(|runtime| runtime.is_effect_active(self.id))
    }
}
