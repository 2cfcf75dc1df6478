pub mod model;
pub mod queue;
pub mod queue_redis;
pub mod scheduler;
pub mod worker;

pub use queue::JobQueue;
pub use queue_redis::RedisJobQueue;
pub use scheduler::ReportScheduler;
pub use worker::{Worker, WorkerConfig};
