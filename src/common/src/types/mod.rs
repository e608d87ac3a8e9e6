pub mod job;
pub mod machine;
pub mod task;
pub mod trace;
