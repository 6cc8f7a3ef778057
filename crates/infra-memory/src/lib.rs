// Waitline Infrastructure - In-Memory Adapter
// Implements: QueueRepository without a database (tests, single-process demos)

mod queue_repository;

pub use queue_repository::InMemoryQueueRepository;
