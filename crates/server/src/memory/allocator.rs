use crate::error::AllocationRefused;

/// Source of raw chunk memory for the pressure generator.
///
/// Implementations must report a refusal as an error rather than aborting, so
/// the generator can keep serving other requests after an allocation fails.
pub trait ChunkAllocator: Send + Sync {
    /// Allocate a block whose length is exactly `size` bytes.
    fn allocate(&self, size: usize) -> Result<Vec<u8>, AllocationRefused>;
}

/// Allocates chunks on the global heap via `try_reserve_exact`.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeapAllocator;

impl ChunkAllocator for HeapAllocator {
    fn allocate(&self, size: usize) -> Result<Vec<u8>, AllocationRefused> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(size)
            .map_err(|e| AllocationRefused::from_reserve(size, e))?;
        // Filling inside the reserved capacity cannot reallocate.
        bytes.resize(size, 0);
        Ok(bytes)
    }
}
