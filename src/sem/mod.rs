pub mod deadlock;
pub mod race;
pub mod symbol;

pub use symbol::{analyze, SymbolTable};
