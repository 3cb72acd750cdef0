pub mod channel;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod sync;
pub mod value;
pub mod worker;

pub use interpreter::Interpreter;
