pub mod disk;
pub mod memory;

pub use disk::FjallQuoteStore;
pub use memory::MemoryQuoteStore;
