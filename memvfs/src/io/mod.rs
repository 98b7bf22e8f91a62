mod block;
mod mem;

pub use block::{BlockNumber, BlockStorage};
pub use mem::{MemoryBlockStore, MemoryBlockStoreBuilder};
