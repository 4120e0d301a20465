use stepwise::migration::MigrationRegistry;
use stepwise::migrator::Migrator;
use stepwise::store::DocumentStoreProvider;
use stepwise_fjall_adapter::FjallStore;
use stepwise_int_test::test_util::{journal_of, random_path, register_recording, remove_path, Journal};

fn registry_of(versions: &[i64]) -> MigrationRegistry<Journal> {
    let registry = MigrationRegistry::new();
    for version in versions {
        register_recording(&registry, *version).expect("Failed to register migration");
    }
    registry
}

fn open_migrator(path: &str, registry: MigrationRegistry<Journal>) -> (FjallStore, Migrator<Journal>) {
    let store = FjallStore::builder()
        .low_memory_preset()
        .db_path(path)
        .open()
        .expect("Failed to open fjall store");
    let migrator = Migrator::builder()
        .registry(registry)
        .store(store.as_document_store())
        .database(Journal::default())
        .open()
        .expect("Failed to open migrator");
    (store, migrator)
}

#[test]
fn test_version_survives_reopen() {
    let path = random_path();

    {
        let (store, migrator) = open_migrator(&path, registry_of(&[1, 2, 3]));
        migrator.up().expect("Failed to migrate up");
        assert_eq!(migrator.version().unwrap(), 3);
        store.close().expect("Failed to close store");
    }

    {
        let (store, migrator) = open_migrator(&path, registry_of(&[1, 2, 3, 4]));
        assert_eq!(migrator.version().unwrap(), 3);

        // only the new version runs after reopening
        migrator.up().expect("Failed to migrate up");
        assert_eq!(journal_of(migrator.database()), vec!["up 4"]);
        assert_eq!(migrator.version().unwrap(), 4);
        store.close().expect("Failed to close store");
    }

    remove_path(&path);
}

#[test]
fn test_down_after_reopen() {
    let path = random_path();

    {
        let (store, migrator) = open_migrator(&path, registry_of(&[1, 2]));
        migrator.up().expect("Failed to migrate up");
        store.close().expect("Failed to close store");
    }

    {
        let (store, migrator) = open_migrator(&path, registry_of(&[1, 2]));
        migrator.down().expect("Failed to migrate down");
        assert_eq!(journal_of(migrator.database()), vec!["down 1", "down 2"]);
        assert_eq!(migrator.version().unwrap(), 0);
        store.close().expect("Failed to close store");
    }

    {
        let (store, migrator) = open_migrator(&path, registry_of(&[1, 2]));
        assert_eq!(migrator.version().unwrap(), 0);
        store.close().expect("Failed to close store");
    }

    remove_path(&path);
}

#[test]
fn test_commit_without_close() {
    let path = random_path();
    let (store, migrator) = open_migrator(&path, registry_of(&[7]));
    migrator.up().expect("Failed to migrate up");
    store.commit().expect("Failed to commit");
    assert_eq!(migrator.version().unwrap(), 7);
    store.close().expect("Failed to close store");
    drop(migrator);
    drop(store);
    remove_path(&path);
}
