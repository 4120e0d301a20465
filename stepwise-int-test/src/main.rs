use stepwise::errors::MigrateResult;
use stepwise::migration::MigrationRegistry;
use stepwise::migrator::Migrator;
use stepwise_int_test::test_util::{cleanup, create_test_context, register_recording, Journal};

fn main() -> MigrateResult<()> {
    println!("Starting stress test...");
    let ctx = create_test_context()?;

    let count = 2_000i64;
    let registry: MigrationRegistry<Journal> = MigrationRegistry::new();
    for version in 1..=count {
        register_recording(&registry, version)?;
    }

    let migrator = Migrator::builder()
        .registry(registry)
        .store(ctx.store())
        .database(Journal::default())
        .timeout("10s")
        .open()?;

    let start = std::time::Instant::now();
    migrator.up()?;
    let elapsed = start.elapsed();
    println!(
        "Applied {} migrations in {:?}, version is {}",
        count,
        elapsed,
        migrator.version()?
    );

    let start = std::time::Instant::now();
    migrator.down()?;
    let elapsed = start.elapsed();
    println!(
        "Reverted {} migrations in {:?}, version is {}",
        count,
        elapsed,
        migrator.version()?
    );

    drop(migrator);
    cleanup(ctx)?;
    Ok(())
}
