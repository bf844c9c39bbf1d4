use thiserror::Error;

/// Errors surfaced by the reactive runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReactiveError {
    /// A write cascaded into more nested effect runs than allowed.
    ///
    /// Usually an effect that writes a signal it (transitively) reads.
    #[error("effect recursion reached depth {depth}, limit is {limit}")]
    RecursionLimit {
        /// Nesting depth of the run that was refused
        depth: usize,
        /// Configured maximum nesting depth
        limit: usize,
    },

    /// The runtime that owns this signal or effect has been dropped.
    #[error("reactive runtime has been dropped")]
    Disposed,

    /// The signal was written while its value was borrowed by `with`.
    #[error("signal written while its value is borrowed")]
    Borrowed,
}
