//! Memory pressure generator.
//!
//! Grows the resident memory of the process in fixed-size, fully committed
//! chunks until either the configured amount is reached or the host refuses an
//! allocation. The intended end state in a container with a memory limit is an
//! OOM kill of the whole process, which is outside of anything this module
//! can observe:
//!
//! `Idle -> Allocating(chunk) -> Completed | Failed(out of memory) | Killed(external)`

pub mod allocator;
pub mod generator;
pub mod store;

pub use allocator::{ChunkAllocator, HeapAllocator};
pub use generator::{AllocationSummary, MIB, PressureConfig, PressureGenerator};
pub use store::{PAGE_SIZE, RetainedBuffer, RetentionStore, touch_pages};
