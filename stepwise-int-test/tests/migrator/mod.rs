mod concurrency_test;
mod migrator_test;
#[cfg(feature = "fjall")]
mod persistence_test;
