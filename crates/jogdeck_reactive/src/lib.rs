//! # Jogdeck Reactive
//!
//! A small single-threaded reactive runtime: signals, effects and memos with
//! automatic dependency tracking.
//!
//! ## Semantics
//!
//! - Reading a signal inside a running effect subscribes that effect to it.
//! - Writing a signal synchronously re-runs every current subscriber, depth
//!   first, in the writer's call stack. There is no batching.
//! - Before each run an effect drops all of its subscriptions and rebuilds
//!   them from the reads of that run, so dependencies follow control flow.
//! - [`Runtime::untrack`] suspends dependency recording.
//! - Nested effect runs are capped at [`Runtime::max_depth`]. Exceeding the
//!   cap aborts the cascade and the outermost write returns
//!   [`ReactiveError::RecursionLimit`].
//!
//! ## Example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use jogdeck_reactive::Runtime;
//!
//! let runtime = Runtime::new();
//! let count = runtime.signal(1);
//! let doubled = runtime.memo({
//!     let count = count.clone();
//!     move || count.get() * 2
//! }).unwrap();
//!
//! let seen = Rc::new(Cell::new(0));
//! let _log = runtime.effect({
//!     let (doubled, seen) = (doubled.clone(), seen.clone());
//!     move || seen.set(doubled.get())
//! }).unwrap();
//!
//! count.set(5).unwrap();
//! assert_eq!(seen.get(), 10);
//! ```
//!
//! Effect closures should capture signal handles, not the [`Runtime`]
//! itself: the runtime owns its effects, so capturing it leaks both.

mod effect;
mod error;
mod memo;
mod runtime;
mod signal;

pub use effect::Effect;
pub use error::ReactiveError;
pub use memo::Memo;
pub use runtime::{DEFAULT_MAX_DEPTH, Runtime};
pub use signal::{ReadSignal, RwSignal, WriteSignal};
