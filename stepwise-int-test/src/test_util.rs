use parking_lot::Mutex;
use std::backtrace::Backtrace;
use std::time::{Duration, Instant};
use std::{env, fs, thread};
use stepwise::errors::{MigrateError, MigrateResult};
use stepwise::migration::MigrationRegistry;
use stepwise::store::{DocumentStore, DocumentStoreProvider};

/// Database handle used by the integration tests: every forward and
/// backward function appends a line to it.
pub type Journal = Mutex<Vec<String>>;

/// Runs a test with retry logic and error handling.
/// Tests run on the current thread to avoid thread exhaustion when running many tests in parallel.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> MigrateResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> MigrateResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> MigrateResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    const MAX_RETRIES: u32 = 3;
    let mut last_error: Option<String> = None;

    for attempt in 1..=MAX_RETRIES {
        let start_time = Instant::now();

        let result = std::panic::catch_unwind(|| {
            let backtrace = Backtrace::capture();
            let ctx = before()
                .map_err(|e| (format!("Before run failed: {:?}", e), backtrace.to_string()))?;
            match test(ctx.clone()) {
                Ok(_) => after(ctx)
                    .map_err(|e| (format!("After run failed: {:?}", e), backtrace.to_string())),
                Err(e) => {
                    let _ = after(ctx);
                    Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                }
            }
        });

        let elapsed = start_time.elapsed();
        let failure = match result {
            Ok(Ok(_)) => return,
            Ok(Err((e, bt))) => {
                if !bt.is_empty() && !bt.contains("disabled") {
                    format!("{}\n{}", e, bt)
                } else {
                    e
                }
            }
            Err(panic_err) => {
                let msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_err.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                format!("Panic: {}", msg)
            }
        };

        if attempt < MAX_RETRIES {
            eprintln!(
                "\n========== Test Attempt {}/{} Failed (took {:?}) ==========",
                attempt, MAX_RETRIES, elapsed
            );
            eprintln!("{}", failure);
            thread::sleep(Duration::from_millis(100 * attempt as u64));
        }
        last_error = Some(failure);
    }

    panic!(
        "Test failed after {} attempts. Last error: {}",
        MAX_RETRIES,
        last_error.unwrap_or_default()
    );
}

/// A store opened for one test, plus the path to remove afterwards.
#[derive(Clone)]
pub struct TestContext {
    path: String,
    store: DocumentStore,
}

impl TestContext {
    pub fn new(path: String, store: DocumentStore) -> Self {
        Self { path, store }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn store(&self) -> DocumentStore {
        self.store.clone()
    }
}

pub fn random_path() -> String {
    let id = uuid::Uuid::new_v4();
    let temp_dir = env::temp_dir();
    temp_dir
        .join(format!("stepwise_{}", id))
        .to_string_lossy()
        .to_string()
}

#[cfg(feature = "fjall")]
pub fn open_store(path: &str) -> MigrateResult<DocumentStore> {
    use stepwise_fjall_adapter::FjallStore;

    // low memory keeps the worker thread count down when tests run in parallel
    let store = FjallStore::builder()
        .low_memory_preset()
        .db_path(path)
        .open()?;
    Ok(store.as_document_store())
}

#[cfg(not(feature = "fjall"))]
pub fn open_store(_path: &str) -> MigrateResult<DocumentStore> {
    Ok(stepwise::store::memory::InMemoryStore::new().as_document_store())
}

pub fn create_test_context() -> MigrateResult<TestContext> {
    const MAX_ATTEMPTS: u32 = 3;
    let mut last_error: Option<MigrateError> = None;

    for attempt in 1..=MAX_ATTEMPTS {
        let path = random_path();
        match open_store(&path) {
            Ok(store) => return Ok(TestContext::new(path, store)),
            Err(e) => {
                let _ = fs::remove_dir_all(&path);
                if attempt < MAX_ATTEMPTS {
                    eprintln!(
                        "Warning: Failed to create test context (attempt {}/{}): {:?}",
                        attempt, MAX_ATTEMPTS, e
                    );
                    thread::sleep(Duration::from_millis(50 * attempt as u64));
                }
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| "Failed to create test context".into()))
}

pub fn cleanup(ctx: TestContext) -> MigrateResult<()> {
    if let Err(e) = ctx.store().close() {
        eprintln!("Warning: Failed to close store: {:?}", e);
    }
    let path = ctx.path().to_string();
    drop(ctx);
    remove_path(&path);
    Ok(())
}

/// Removes a test directory, retrying while file handles are released.
pub fn remove_path(path: &str) {
    let mut delay_ms = 50u64;
    for retry in 0..10 {
        if !std::path::Path::new(path).exists() {
            return;
        }
        match fs::remove_dir_all(path) {
            Ok(_) => return,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
            Err(e) if retry == 9 => {
                eprintln!("Warning: Failed to remove test directory {}: {:?}", path, e);
            }
            Err(_) => {
                thread::sleep(Duration::from_millis(delay_ms));
                delay_ms = std::cmp::min(delay_ms * 2, 1000);
            }
        }
    }
}

/// Registers a migration for `version` that records `up N` and `down N` in
/// the journal.
pub fn register_recording(registry: &MigrationRegistry<Journal>, version: i64) -> MigrateResult<()> {
    registry.register(
        version,
        move |db: &Journal| {
            db.lock().push(format!("up {}", version));
            Ok(())
        },
        move |db: &Journal| {
            db.lock().push(format!("down {}", version));
            Ok(())
        },
    )
}

pub fn journal_of(db: &Journal) -> Vec<String> {
    db.lock().clone()
}
