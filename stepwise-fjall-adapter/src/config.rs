use fjall::{CompressionType, Config, PartitionCreateOptions};
use stepwise::common::{atomic, Atomic, ReadExecutor, WriteExecutor};
use std::sync::atomic::{AtomicBool, AtomicI8, AtomicU16, AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

/// Fjall keyspace and partition settings.
///
/// Cheap to clone; clones share the same settings. Every field is an atomic
/// so the config can be read from any thread without locking. Setters are
/// crate-private and reached through [crate::FjallStoreBuilder].
#[derive(Clone)]
pub struct FjallConfig {
    inner: Arc<FjallConfigInner>,
}

impl FjallConfig {
    pub fn new() -> FjallConfig {
        FjallConfig {
            inner: Arc::new(FjallConfigInner::new()),
        }
    }

    /// Translates these settings into a keyspace [Config].
    pub(crate) fn keyspace_config(&self) -> Config {
        let inner = &self.inner;
        let mut config = Config::new(self.db_path())
            .manual_journal_persist(inner.manual_journal_persist.load(Ordering::Relaxed))
            .flush_workers(inner.flush_workers.load(Ordering::Relaxed))
            .compaction_workers(inner.compaction_workers.load(Ordering::Relaxed))
            .cache_size(inner.cache_size.load(Ordering::Relaxed))
            .max_journaling_size(inner.max_journaling_size.load(Ordering::Relaxed))
            .max_write_buffer_size(inner.max_write_buffer_size.load(Ordering::Relaxed));

        let fsync_ms = inner.fsync_frequency.load(Ordering::Relaxed);
        if fsync_ms > 0 {
            config = config.fsync_ms(Some(fsync_ms));
        }
        config
    }

    /// Options used for every marker partition.
    pub(crate) fn partition_config(&self) -> PartitionCreateOptions {
        let bits = self.bloom_filter_bits();
        PartitionCreateOptions::default()
            .bloom_filter_bits(if bits < 0 { None } else { Some(bits as u8) })
            .compression(self.compression_type())
            .max_memtable_size(self.max_memtable_size())
            .block_size(self.block_size())
    }

    pub fn db_path(&self) -> &str {
        self.inner.db_path.get().map(String::as_str).unwrap_or("")
    }

    /// The path can only be set once.
    pub(crate) fn set_db_path(&self, db_path: &str) {
        self.inner.db_path.get_or_init(|| db_path.to_string());
    }

    pub fn manual_journal_persist(&self) -> bool {
        self.inner.manual_journal_persist.load(Ordering::Relaxed)
    }

    pub(crate) fn set_manual_journal_persist(&self, value: bool) {
        self.inner.manual_journal_persist.store(value, Ordering::Relaxed)
    }

    pub fn flush_workers(&self) -> usize {
        self.inner.flush_workers.load(Ordering::Relaxed)
    }

    pub(crate) fn set_flush_workers(&self, count: usize) {
        self.inner.flush_workers.store(count, Ordering::Relaxed)
    }

    pub fn compaction_workers(&self) -> usize {
        self.inner.compaction_workers.load(Ordering::Relaxed)
    }

    pub(crate) fn set_compaction_workers(&self, count: usize) {
        self.inner.compaction_workers.store(count, Ordering::Relaxed)
    }

    /// Block cache capacity in bytes.
    pub fn cache_size(&self) -> u64 {
        self.inner.cache_size.load(Ordering::Relaxed)
    }

    pub(crate) fn set_cache_size(&self, bytes: u64) {
        self.inner.cache_size.store(bytes, Ordering::Relaxed)
    }

    pub fn max_journaling_size(&self) -> u64 {
        self.inner.max_journaling_size.load(Ordering::Relaxed)
    }

    pub(crate) fn set_max_journaling_size(&self, bytes: u64) {
        self.inner.max_journaling_size.store(bytes, Ordering::Relaxed)
    }

    pub fn max_write_buffer_size(&self) -> u64 {
        self.inner.max_write_buffer_size.load(Ordering::Relaxed)
    }

    pub(crate) fn set_max_write_buffer_size(&self, bytes: u64) {
        self.inner.max_write_buffer_size.store(bytes, Ordering::Relaxed)
    }

    /// Background fsync interval in milliseconds, `0` disables it.
    pub fn fsync_frequency(&self) -> u16 {
        self.inner.fsync_frequency.load(Ordering::Relaxed)
    }

    pub(crate) fn set_fsync_frequency(&self, millis: u16) {
        self.inner.fsync_frequency.store(millis, Ordering::Relaxed)
    }

    /// Whether closing the store persists the journal first.
    pub fn commit_before_close(&self) -> bool {
        self.inner.commit_before_close.load(Ordering::Relaxed)
    }

    pub(crate) fn set_commit_before_close(&self, value: bool) {
        self.inner.commit_before_close.store(value, Ordering::Relaxed)
    }

    /// Bloom filter bits per key, negative disables the filter.
    pub fn bloom_filter_bits(&self) -> i8 {
        self.inner.bloom_filter_bits.load(Ordering::Relaxed)
    }

    pub(crate) fn set_bloom_filter_bits(&self, bits: i8) {
        self.inner.bloom_filter_bits.store(bits, Ordering::Relaxed)
    }

    pub fn compression_type(&self) -> CompressionType {
        self.inner.compression_type.read_with(|it| it.clone())
    }

    pub(crate) fn set_compression_type(&self, compression: CompressionType) {
        self.inner.compression_type.write_with(|it| *it = compression);
    }

    pub fn max_memtable_size(&self) -> u32 {
        self.inner.max_memtable_size.load(Ordering::Relaxed)
    }

    pub(crate) fn set_max_memtable_size(&self, bytes: u32) {
        self.inner.max_memtable_size.store(bytes, Ordering::Relaxed)
    }

    pub fn block_size(&self) -> u32 {
        self.inner.block_size.load(Ordering::Relaxed)
    }

    pub(crate) fn set_block_size(&self, bytes: u32) {
        self.inner.block_size.store(bytes, Ordering::Relaxed)
    }
}

impl Default for FjallConfig {
    fn default() -> Self {
        FjallConfig::new()
    }
}

struct FjallConfigInner {
    db_path: OnceLock<String>,
    manual_journal_persist: AtomicBool,
    flush_workers: AtomicUsize,
    compaction_workers: AtomicUsize,
    cache_size: AtomicU64,
    max_journaling_size: AtomicU64,
    max_write_buffer_size: AtomicU64,
    fsync_frequency: AtomicU16,
    commit_before_close: AtomicBool,
    bloom_filter_bits: AtomicI8,
    compression_type: Atomic<CompressionType>,
    max_memtable_size: AtomicU32,
    block_size: AtomicU32,
}

impl FjallConfigInner {
    /// Marker collections are tiny, so the defaults favour a small footprint.
    const DEFAULT_CACHE_MB: u64 = 16;
    const DEFAULT_WRITE_BUFFER_MB: u64 = 32;
    const DEFAULT_MAX_JOURNALING_MB: u64 = 64;
    const DEFAULT_MEMTABLE_MB: u32 = 8;

    fn new() -> FjallConfigInner {
        let cpus = std::thread::available_parallelism()
            .map(usize::from)
            .unwrap_or(4);

        FjallConfigInner {
            db_path: OnceLock::new(),
            manual_journal_persist: AtomicBool::new(false),
            flush_workers: AtomicUsize::new((cpus / 2).max(1)),
            compaction_workers: AtomicUsize::new((cpus / 4).max(1)),
            cache_size: AtomicU64::new(Self::DEFAULT_CACHE_MB * 1_024 * 1_024),
            max_journaling_size: AtomicU64::new(Self::DEFAULT_MAX_JOURNALING_MB * 1_024 * 1_024),
            max_write_buffer_size: AtomicU64::new(Self::DEFAULT_WRITE_BUFFER_MB * 1_024 * 1_024),
            fsync_frequency: AtomicU16::new(0),
            commit_before_close: AtomicBool::new(true),
            bloom_filter_bits: AtomicI8::new(10),
            compression_type: atomic(CompressionType::Lz4),
            max_memtable_size: AtomicU32::new(Self::DEFAULT_MEMTABLE_MB * 1_024 * 1_024),
            block_size: AtomicU32::new(4 * 1_024),
        }
    }
}
