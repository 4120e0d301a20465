use std::sync::Arc;
use std::thread;
use stepwise::errors::ErrorKind;
use stepwise::migration::MigrationRegistry;
use stepwise::migrator::Migrator;
use stepwise_int_test::test_util::{
    cleanup, create_test_context, journal_of, register_recording, run_test, Journal,
};

#[test]
fn test_parallel_registration_of_distinct_versions() {
    let registry: MigrationRegistry<Journal> = MigrationRegistry::new();
    let handles: Vec<_> = (0..8i64)
        .map(|worker| {
            let registry = registry.clone();
            thread::spawn(move || {
                for i in 0..50i64 {
                    register_recording(&registry, worker * 50 + i).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(registry.len(), 400);
    assert_eq!(registry.versions(false), (0..400).collect::<Vec<i64>>());
}

#[test]
fn test_parallel_registration_of_same_version() {
    let registry: MigrationRegistry<Journal> = MigrationRegistry::new();
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = registry.clone();
            thread::spawn(move || register_recording(&registry, 42).err().map(|e| e.kind().clone()))
        })
        .collect();

    let outcomes: Vec<Option<ErrorKind>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(outcomes.iter().filter(|o| o.is_none()).count(), 1);
    assert!(outcomes
        .iter()
        .flatten()
        .all(|kind| *kind == ErrorKind::DuplicateVersion));
}

#[test]
fn test_registration_while_running() {
    run_test(
        create_test_context,
        |ctx| {
            let registry: MigrationRegistry<Journal> = MigrationRegistry::new();
            for version in 1..=20 {
                register_recording(&registry, version)?;
            }
            let migrator = Arc::new(
                Migrator::builder()
                    .registry(registry.clone())
                    .store(ctx.store())
                    .database(Journal::default())
                    .open()?,
            );

            let runner = {
                let migrator = migrator.clone();
                thread::spawn(move || migrator.up())
            };
            let registrar = {
                let registry = registry.clone();
                thread::spawn(move || {
                    for version in 21..=40 {
                        register_recording(&registry, version).unwrap();
                    }
                })
            };
            registrar.join().unwrap();
            runner.join().unwrap()?;

            // the run sees a consistent snapshot, a second run picks up the rest
            let first_run = journal_of(migrator.database()).len();
            assert!(first_run >= 20);
            migrator.up()?;
            assert_eq!(journal_of(migrator.database()).len(), 40);
            assert_eq!(migrator.version()?, 40);
            Ok(())
        },
        cleanup,
    );
}
