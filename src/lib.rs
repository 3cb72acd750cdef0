pub mod codegen;
pub mod diagnostics;
pub mod language;
pub mod runtime;
pub mod sem;
pub mod tools;
