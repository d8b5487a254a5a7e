mod task;

pub use task::{Category, CompletedTask, NewTask, Priority, Recurrence, Task};
