use json_kv::{JsonKv, OverwriteGuard};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let dir = std::env::temp_dir();

    // compact JSON, falsy values may be set again, advisory lock held
    let db = JsonKv::builder("json_kv_example_builder")
        .dir(&dir)
        .pretty(false)
        .overwrite_guard(OverwriteGuard::Truthy)
        .lock(true)
        .build()?;
    db.reset()?;

    db.set("name", "json-kv")?;
    db.set("ready", false)?;
    db.set("ready", true)?;
    let backup = db.backup("json_kv_example_builder_backup")?;

    let contents = std::fs::read_to_string(db.path())?;
    println!("On-disk JSON: {contents}");
    println!("Backup at {}", backup.display());
    println!("\nDebug output: {db:?}");

    let _ = std::fs::remove_file(&backup);
    let _ = std::fs::remove_file(db.path());
    Ok(())
}
