use crate::config::FjallConfig;
use crate::store::FjallStore;
use fjall::CompressionType;
use stepwise::errors::MigrateResult;

/// Fluent configuration for a [FjallStore].
///
/// ```rust,no_run
/// use stepwise_fjall_adapter::FjallStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = FjallStore::builder()
///     .durable_preset()
///     .db_path("/var/lib/app/markers")
///     .open()?;
/// # Ok(())
/// # }
/// ```
pub struct FjallStoreBuilder {
    store_config: FjallConfig,
}

impl FjallStoreBuilder {
    pub fn new() -> FjallStoreBuilder {
        FjallStoreBuilder {
            store_config: FjallConfig::new(),
        }
    }

    /// Persists the journal every 100ms in the background on top of the
    /// commit on close.
    pub fn durable_preset(self) -> Self {
        self.fsync_frequency(100)
            .manual_journal_persist(false)
            .commit_before_close(true)
    }

    /// Smallest footprint: tiny caches and a single worker of each kind.
    pub fn low_memory_preset(self) -> Self {
        self.cache_size(4 * 1024 * 1024)
            .max_write_buffer_size(8 * 1024 * 1024)
            .max_memtable_size(2 * 1024 * 1024)
            .flush_workers(1)
            .compaction_workers(1)
    }

    pub fn db_path(self, db_path: &str) -> Self {
        self.store_config.set_db_path(db_path);
        self
    }

    pub fn manual_journal_persist(self, manual_journal_persist: bool) -> Self {
        self.store_config.set_manual_journal_persist(manual_journal_persist);
        self
    }

    pub fn flush_workers(self, count: usize) -> Self {
        self.store_config.set_flush_workers(count);
        self
    }

    pub fn compaction_workers(self, count: usize) -> Self {
        self.store_config.set_compaction_workers(count);
        self
    }

    pub fn cache_size(self, bytes: u64) -> Self {
        self.store_config.set_cache_size(bytes);
        self
    }

    pub fn max_journaling_size(self, bytes: u64) -> Self {
        self.store_config.set_max_journaling_size(bytes);
        self
    }

    pub fn max_write_buffer_size(self, bytes: u64) -> Self {
        self.store_config.set_max_write_buffer_size(bytes);
        self
    }

    pub fn fsync_frequency(self, millis: u16) -> Self {
        self.store_config.set_fsync_frequency(millis);
        self
    }

    pub fn commit_before_close(self, commit: bool) -> Self {
        self.store_config.set_commit_before_close(commit);
        self
    }

    /// Bits per key for partition bloom filters, capped at 127.
    pub fn bloom_filter_bits(self, bits: u8) -> Self {
        let bits = i8::try_from(bits).unwrap_or(i8::MAX);
        self.store_config.set_bloom_filter_bits(bits);
        self
    }

    pub fn compression_type(self, compression_type: CompressionType) -> Self {
        self.store_config.set_compression_type(compression_type);
        self
    }

    pub fn max_memtable_size(self, bytes: u32) -> Self {
        self.store_config.set_max_memtable_size(bytes);
        self
    }

    pub fn block_size(self, bytes: u32) -> Self {
        self.store_config.set_block_size(bytes);
        self
    }

    /// Returns the collected settings without opening anything.
    pub fn build(self) -> FjallConfig {
        self.store_config
    }

    /// Opens or creates the keyspace.
    pub fn open(self) -> MigrateResult<FjallStore> {
        FjallStore::open(self.store_config)
    }
}

impl Default for FjallStoreBuilder {
    fn default() -> Self {
        FjallStoreBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_reach_config() {
        let config = FjallStoreBuilder::new()
            .db_path("/tmp/markers")
            .manual_journal_persist(true)
            .flush_workers(2)
            .compaction_workers(1)
            .cache_size(1024)
            .max_journaling_size(2048)
            .max_write_buffer_size(4096)
            .fsync_frequency(10)
            .commit_before_close(false)
            .bloom_filter_bits(8)
            .compression_type(CompressionType::None)
            .max_memtable_size(512)
            .block_size(8192)
            .build();

        assert_eq!(config.db_path(), "/tmp/markers");
        assert!(config.manual_journal_persist());
        assert_eq!(config.flush_workers(), 2);
        assert_eq!(config.compaction_workers(), 1);
        assert_eq!(config.cache_size(), 1024);
        assert_eq!(config.max_journaling_size(), 2048);
        assert_eq!(config.max_write_buffer_size(), 4096);
        assert_eq!(config.fsync_frequency(), 10);
        assert!(!config.commit_before_close());
        assert_eq!(config.bloom_filter_bits(), 8);
        assert_eq!(config.compression_type(), CompressionType::None);
        assert_eq!(config.max_memtable_size(), 512);
        assert_eq!(config.block_size(), 8192);
    }

    #[test]
    fn large_bloom_filter_bits_are_capped() {
        let config = FjallStoreBuilder::new().bloom_filter_bits(200).build();
        assert_eq!(config.bloom_filter_bits(), 127);

        let config = FjallStoreBuilder::new().bloom_filter_bits(u8::MAX).build();
        assert!(config.bloom_filter_bits() > 0);
    }

    #[test]
    fn durable_preset() {
        let config = FjallStoreBuilder::new().durable_preset().build();
        assert_eq!(config.fsync_frequency(), 100);
        assert!(!config.manual_journal_persist());
        assert!(config.commit_before_close());
    }

    #[test]
    fn low_memory_preset() {
        let config = FjallStoreBuilder::new().low_memory_preset().build();
        assert_eq!(config.cache_size(), 4 * 1024 * 1024);
        assert_eq!(config.flush_workers(), 1);
        assert_eq!(config.compaction_workers(), 1);
    }

    #[test]
    fn later_settings_override_preset() {
        let config = FjallStoreBuilder::new()
            .low_memory_preset()
            .flush_workers(3)
            .build();
        assert_eq!(config.flush_workers(), 3);
    }
}
