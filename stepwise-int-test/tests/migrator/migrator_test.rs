use chrono::{Duration, Utc};
use stepwise::errors::{ErrorKind, MigrateError};
use stepwise::filter::all;
use stepwise::migration::MigrationRegistry;
use stepwise::migrator::Migrator;
use stepwise::migrator_config::MigratorOptions;
use stepwise::store::OperationContext;
use stepwise_int_test::test_util::{
    cleanup, create_test_context, journal_of, register_recording, run_test, Journal,
};

fn open(
    registry: &MigrationRegistry<Journal>,
    ctx: &stepwise_int_test::test_util::TestContext,
) -> Migrator<Journal> {
    Migrator::builder()
        .registry(registry.clone())
        .store(ctx.store())
        .database(Journal::default())
        .open()
        .expect("Failed to open migrator")
}

#[test]
fn test_up_applies_pending_versions_in_order() {
    run_test(
        create_test_context,
        |ctx| {
            let registry = MigrationRegistry::new();
            register_recording(&registry, 2)?;
            register_recording(&registry, 1)?;
            let migrator = open(&registry, &ctx);

            assert_eq!(migrator.version()?, 0);
            migrator.up()?;
            assert_eq!(journal_of(migrator.database()), vec!["up 1", "up 2"]);
            assert_eq!(migrator.version()?, 2);

            // one marker per applied version
            let markers = ctx.store().collection("migrations")?;
            assert_eq!(markers.size()?, 2);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_second_up_runs_nothing() {
    run_test(
        create_test_context,
        |ctx| {
            let registry = MigrationRegistry::new();
            register_recording(&registry, 1)?;
            register_recording(&registry, 2)?;
            let migrator = open(&registry, &ctx);

            migrator.up()?;
            migrator.up()?;
            assert_eq!(journal_of(migrator.database()).len(), 2);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_new_registration_is_applied_by_next_up() {
    run_test(
        create_test_context,
        |ctx| {
            let registry = MigrationRegistry::new();
            register_recording(&registry, 1)?;
            let migrator = open(&registry, &ctx);
            migrator.up()?;

            register_recording(&registry, 2)?;
            migrator.up()?;
            assert_eq!(journal_of(migrator.database()), vec!["up 1", "up 2"]);
            assert_eq!(migrator.version()?, 2);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_down_reverts_and_removes_markers() {
    run_test(
        create_test_context,
        |ctx| {
            let registry = MigrationRegistry::new();
            register_recording(&registry, 1)?;
            register_recording(&registry, 2)?;
            let migrator = open(&registry, &ctx);

            migrator.up()?;
            migrator.down()?;
            assert_eq!(
                journal_of(migrator.database()),
                vec!["up 1", "up 2", "down 1", "down 2"]
            );
            assert_eq!(migrator.version()?, 0);
            assert_eq!(ctx.store().collection("migrations")?.size()?, 0);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_down_only_touches_applied_versions() {
    run_test(
        create_test_context,
        |ctx| {
            let registry = MigrationRegistry::new();
            register_recording(&registry, 1)?;
            let migrator = open(&registry, &ctx);
            migrator.up()?;

            // registered after the run, never applied
            register_recording(&registry, 2)?;
            migrator.down()?;
            assert_eq!(journal_of(migrator.database()), vec!["up 1", "down 1"]);
            assert_eq!(migrator.version()?, 0);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_failed_forward_keeps_earlier_steps() {
    run_test(
        create_test_context,
        |ctx| {
            let registry: MigrationRegistry<Journal> = MigrationRegistry::new();
            register_recording(&registry, 1)?;
            registry.register(
                2,
                |_| Err(MigrateError::new("index build failed", ErrorKind::StorageError)),
                |_| Ok(()),
            )?;
            register_recording(&registry, 3)?;
            let migrator = open(&registry, &ctx);

            let err = migrator.up().expect_err("up should fail at version 2");
            assert_eq!(err.kind(), &ErrorKind::MigrationFunctionError);
            assert_eq!(err.root_cause().message(), "index build failed");
            assert_eq!(journal_of(migrator.database()), vec!["up 1"]);
            assert_eq!(migrator.version()?, 1);

            // fixing the registry lets the next run continue from version 1
            registry.unregister(2);
            register_recording(&registry, 2)?;
            migrator.up()?;
            assert_eq!(journal_of(migrator.database()), vec!["up 1", "up 2", "up 3"]);
            assert_eq!(migrator.version()?, 3);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_custom_schema_and_options() {
    run_test(
        create_test_context,
        |ctx| {
            let registry = MigrationRegistry::new();
            register_recording(&registry, 1)?;
            let options = MigratorOptions::new()
                .with_schema("schema_history")
                .with_timeout("5s");
            let migrator = Migrator::builder()
                .options(&options)
                .registry(registry)
                .store(ctx.store())
                .database(Journal::default())
                .open()?;

            migrator.up()?;
            assert_eq!(migrator.schema(), "schema_history");
            assert_eq!(migrator.timeout(), std::time::Duration::from_secs(5));

            let markers = ctx.store().collection("schema_history")?;
            let marker = markers
                .find_one(&OperationContext::unbounded(), &all(), None)?
                .expect("marker should exist");
            assert_eq!(marker.get("version").as_i64(), Some(1));
            let stamped = *marker
                .get("timestamp")
                .as_date_time()
                .expect("marker should carry a timestamp");
            assert!(stamped <= Utc::now());
            assert!(Utc::now() - stamped < Duration::minutes(5));
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_invalid_timeout_is_rejected() {
    run_test(
        create_test_context,
        |ctx| {
            let err = Migrator::<Journal>::builder()
                .timeout("invalid")
                .store(ctx.store())
                .database(Journal::default())
                .open()
                .expect_err("invalid timeout must fail");
            assert_eq!(err.kind(), &ErrorKind::InvalidTimeout);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_closed_store_fails_runs() {
    run_test(
        create_test_context,
        |ctx| {
            let registry = MigrationRegistry::new();
            register_recording(&registry, 1)?;
            let migrator = open(&registry, &ctx);
            ctx.store().close()?;

            let err = migrator.up().expect_err("closed store must fail");
            assert_eq!(err.kind(), &ErrorKind::StoreAlreadyClosed);
            assert!(journal_of(migrator.database()).is_empty());
            Ok(())
        },
        cleanup,
    );
}
