pub mod memory;

pub use memory::{MEMORY_SIZE, Memory};
