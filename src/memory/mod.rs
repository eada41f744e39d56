pub mod partition_queue;

pub use partition_queue::PartitionQueue;
