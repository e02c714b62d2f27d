//! Runtime that drives one file's dialogue against real or mock I/O

mod console;
mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use console::{rule, StdConsole};
pub use executor::{DialogueError, DialogueRuntime};
pub use traits::*;
