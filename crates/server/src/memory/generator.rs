use crate::error::PressureError;
use crate::memory::allocator::{ChunkAllocator, HeapAllocator};
use crate::memory::store::{RetainedBuffer, RetentionStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

pub const MIB: usize = 1024 * 1024;

pub const DEFAULT_CHUNK_SIZE_BYTES: usize = 20 * MIB;
pub const DEFAULT_CHUNK_COUNT: usize = 10;
pub const DEFAULT_INTER_CHUNK_DELAY: Duration = Duration::from_millis(100);

/// Shape of one allocation run: `chunk_count` chunks of `chunk_size_bytes`,
/// separated by `inter_chunk_delay`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PressureConfig {
    pub chunk_size_bytes: usize,
    pub chunk_count: usize,
    pub inter_chunk_delay: Duration,
}

impl Default for PressureConfig {
    fn default() -> Self {
        Self {
            chunk_size_bytes: DEFAULT_CHUNK_SIZE_BYTES,
            chunk_count: DEFAULT_CHUNK_COUNT,
            inter_chunk_delay: DEFAULT_INTER_CHUNK_DELAY,
        }
    }
}

impl PressureConfig {
    pub fn validate(&self) -> Result<(), PressureError> {
        if self.chunk_size_bytes == 0 {
            return Err(PressureError::InvalidConfiguration(
                "chunk_size_bytes must be > 0".into(),
            ));
        }
        if self.chunk_count == 0 {
            return Err(PressureError::InvalidConfiguration(
                "chunk_count must be > 0".into(),
            ));
        }
        if self.chunk_size_bytes.checked_mul(self.chunk_count).is_none() {
            return Err(PressureError::InvalidConfiguration(
                "chunk_size_bytes * chunk_count overflows".into(),
            ));
        }
        Ok(())
    }

    pub fn target_bytes(&self) -> usize {
        self.chunk_size_bytes.saturating_mul(self.chunk_count)
    }

    pub fn target_mib(&self) -> usize {
        self.target_bytes() / MIB
    }
}

/// Body returned once every chunk has been allocated and retained.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSummary {
    pub message: String,
    pub status: String,
    #[serde(rename = "targetMiB")]
    pub target_mib: usize,
    pub target_bytes: usize,
    pub chunks_allocated: usize,
    pub note: String,
}

/// Deliberately grows the resident set of the process in observable steps.
///
/// Every chunk is handed to the [`RetentionStore`], so memory obtained here is
/// only ever given back when the process is killed. Repeated runs add up.
#[derive(Clone)]
pub struct PressureGenerator {
    config: PressureConfig,
    store: RetentionStore,
    allocator: Arc<dyn ChunkAllocator>,
}

impl PressureGenerator {
    pub fn new(config: PressureConfig, store: RetentionStore) -> Self {
        Self::with_allocator(config, store, Arc::new(HeapAllocator))
    }

    pub fn with_allocator(
        config: PressureConfig,
        store: RetentionStore,
        allocator: Arc<dyn ChunkAllocator>,
    ) -> Self {
        Self {
            config,
            store,
            allocator,
        }
    }

    pub fn config(&self) -> &PressureConfig {
        &self.config
    }

    pub fn store(&self) -> &RetentionStore {
        &self.store
    }

    /// Run one allocation pass with the configuration given at construction.
    pub async fn trigger(&self) -> Result<AllocationSummary, PressureError> {
        self.trigger_allocation(&self.config).await
    }

    /// Allocate, commit and retain `config.chunk_count` chunks.
    ///
    /// A refused allocation stops the run and is returned as
    /// [`PressureError::ResourceExhaustion`]; chunks retained before it stay
    /// retained. A kernel or orchestrator OOM kill ends the process instead
    /// and is never observed here.
    #[tracing::instrument(
        skip(self, config),
        fields(
            chunk_size_bytes = config.chunk_size_bytes,
            chunk_count = config.chunk_count,
            delay_ms = config.inter_chunk_delay.as_millis() as u64,
        )
    )]
    pub async fn trigger_allocation(
        &self,
        config: &PressureConfig,
    ) -> Result<AllocationSummary, PressureError> {
        config.validate()?;

        // Nothing is garbage collected here: dropped memory is already freed.
        tracing::debug!("Skipping reclamation hint, heap has no pending garbage");

        let target_mib = config.target_mib();
        tracing::warn!(
            target_mib,
            "Memory consumption endpoint invoked - will allocate ~{target_mib}MiB to trigger OOMKill"
        );

        for index in 0..config.chunk_count {
            let chunk = index + 1;
            let bytes = match self.allocator.allocate(config.chunk_size_bytes) {
                Ok(bytes) => bytes,
                Err(source) => {
                    let err = PressureError::ResourceExhaustion {
                        chunk,
                        total: config.chunk_count,
                        source,
                    };
                    tracing::error!(
                        chunk,
                        retained_chunks = self.store.len(),
                        "Out of memory caught during allocation: {err}"
                    );
                    return Err(err);
                }
            };

            self.store.retain(RetainedBuffer::commit(bytes));
            tracing::info!(
                chunk,
                total = config.chunk_count,
                size_bytes = config.chunk_size_bytes,
                "Memory chunk {chunk}/{} allocated ({}MiB)",
                config.chunk_count,
                config.chunk_size_bytes / MIB
            );

            if config.inter_chunk_delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(config.inter_chunk_delay).await;
            }
        }

        Ok(AllocationSummary {
            message: "Starting consuming memory...".into(),
            status: "allocated".into(),
            target_mib,
            target_bytes: config.target_bytes(),
            chunks_allocated: config.chunk_count,
            note: "Pod will restart when its memory limit is exceeded".into(),
        })
    }
}

impl std::fmt::Debug for PressureGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PressureGenerator")
            .field("config", &self.config)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AllocationRefused;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_test::traced_test;

    /// Grants the first `allow` requests, then refuses every one after.
    struct RefuseAfter {
        allow: usize,
        calls: AtomicUsize,
    }

    impl ChunkAllocator for RefuseAfter {
        fn allocate(&self, size: usize) -> Result<Vec<u8>, AllocationRefused> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.allow {
                Ok(vec![0u8; size])
            } else {
                Err(AllocationRefused {
                    requested: size,
                    reason: "memory limit reached".into(),
                })
            }
        }
    }

    fn small_config(count: usize) -> PressureConfig {
        PressureConfig {
            chunk_size_bytes: 8 * 1024,
            chunk_count: count,
            inter_chunk_delay: Duration::ZERO,
        }
    }

    #[test]
    fn default_config_targets_200_mib() {
        let config = PressureConfig::default();
        assert_eq!(config.chunk_size_bytes, 20 * MIB);
        assert_eq!(config.chunk_count, 10);
        assert_eq!(config.inter_chunk_delay, Duration::from_millis(100));
        assert_eq!(config.target_mib(), 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_sizes() {
        let mut config = small_config(3);
        config.chunk_size_bytes = 0;
        assert!(matches!(
            config.validate(),
            Err(PressureError::InvalidConfiguration(_))
        ));

        let mut config = small_config(3);
        config.chunk_count = 0;
        assert!(matches!(
            config.validate(),
            Err(PressureError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn validate_rejects_overflowing_target() {
        let config = PressureConfig {
            chunk_size_bytes: usize::MAX,
            chunk_count: 2,
            inter_chunk_delay: Duration::ZERO,
        };
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn invalid_config_allocates_nothing() {
        let store = RetentionStore::new();
        let generator = PressureGenerator::new(small_config(3), store.clone());
        let err = generator
            .trigger_allocation(&small_config(0))
            .await
            .unwrap_err();
        assert!(matches!(err, PressureError::InvalidConfiguration(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn successful_run_retains_every_chunk() {
        let store = RetentionStore::new();
        let generator = PressureGenerator::new(small_config(4), store.clone());

        let summary = generator.trigger().await.unwrap();

        assert_eq!(summary.status, "allocated");
        assert_eq!(summary.chunks_allocated, 4);
        assert_eq!(summary.target_bytes, 4 * 8 * 1024);
        assert_eq!(store.len(), 4);
        assert_eq!(store.chunk_sizes(), vec![8 * 1024; 4]);
    }

    #[tokio::test]
    async fn refusal_keeps_partial_progress() {
        let store = RetentionStore::new();
        let allocator = Arc::new(RefuseAfter {
            allow: 5,
            calls: AtomicUsize::new(0),
        });
        let generator =
            PressureGenerator::with_allocator(small_config(10), store.clone(), allocator);

        let err = generator.trigger().await.unwrap_err();

        match &err {
            PressureError::ResourceExhaustion { chunk, total, .. } => {
                assert_eq!(*chunk, 6);
                assert_eq!(*total, 10);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_out_of_memory());
        assert_eq!(store.len(), 5);
    }

    #[traced_test]
    #[tokio::test]
    async fn chunk_events_are_emitted_in_order() {
        let generator = PressureGenerator::new(small_config(3), RetentionStore::new());
        generator.trigger().await.unwrap();

        logs_assert(|lines: &[&str]| {
            let positions: Vec<usize> = ["chunk 1/3", "chunk 2/3", "chunk 3/3"]
                .iter()
                .map(|needle| {
                    lines
                        .iter()
                        .position(|line| line.contains(needle))
                        .ok_or_else(|| format!("missing log line for {needle}"))
                })
                .collect::<Result<_, _>>()?;
            if positions.windows(2).all(|w| w[0] < w[1]) {
                Ok(())
            } else {
                Err(format!("chunk events out of order: {positions:?}"))
            }
        });
        assert!(logs_contain("will allocate ~0MiB to trigger OOMKill"));
    }

    #[traced_test]
    #[tokio::test]
    async fn refusal_emits_one_error_event() {
        let allocator = Arc::new(RefuseAfter {
            allow: 1,
            calls: AtomicUsize::new(0),
        });
        let generator =
            PressureGenerator::with_allocator(small_config(3), RetentionStore::new(), allocator);
        generator.trigger().await.unwrap_err();

        logs_assert(|lines: &[&str]| {
            let errors = lines.iter().filter(|line| line.contains("ERROR")).count();
            if errors == 1 {
                Ok(())
            } else {
                Err(format!("expected exactly one error event, saw {errors}"))
            }
        });
        assert!(logs_contain("Out of memory caught during allocation"));
        assert!(!logs_contain("Memory chunk 2/3"));
    }
}
