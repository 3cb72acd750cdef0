use thiserror::Error;

pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[derive(Clone, Debug, Error)]
pub enum RuntimeError {
    #[error("Unknown channel `{name}`")]
    UnknownChannel { name: String },
    #[error("`{name}` is not a channel")]
    NotAChannel { name: String },
    #[error("Receive on `{name}` timed out")]
    ReceiveTimeout { name: String },
    #[error("Channel `{name}` is closed")]
    ChannelClosed { name: String },
    #[error("Unlock of `{name}` by a worker that does not hold it")]
    UnlockWithoutOwnership { name: String },
    /// Terminal guard for AST node kinds an executing component does not
    /// handle. Exhaustive matching makes this unreachable today; it exists
    /// so future node kinds fail loudly instead of being skipped.
    #[error("Unsupported construct: {what}")]
    UnsupportedConstruct { what: String },
}
