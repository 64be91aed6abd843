pub mod item;
pub mod result;
pub mod task;
pub mod timestamp;

pub use item::{Item, ItemDetail, Page};
pub use result::{Listing, Pagination, TaskResult};
pub use task::{validate_task_id, validate_tasks, Query, Site, Task};
pub use timestamp::Timestamp;
