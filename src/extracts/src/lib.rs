pub mod assembler;
pub mod fs;
pub mod parsers;
pub mod timeline;

pub use assembler::{AssemblerOptions, TraceAssembler};
pub use timeline::TaskTimeline;
