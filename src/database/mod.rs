pub mod memory;
pub mod pool;
pub mod repositories;

pub use memory::MemoryStore;
pub use repositories::Repositories;
