use json_kv::{JsonKv, MathOp};

fn main() -> Result<(), json_kv::Error> {
    let dir = std::env::temp_dir();
    let db = JsonKv::builder("json_kv_example_counters").dir(&dir).build()?;
    db.reset()?;

    for _ in 0..10 {
        db.add("hits", 1.0)?;
    }
    db.subtract("hits", 2.0)?;
    println!("hits = {:?}", db.fetch("hits")?);

    let op: MathOp = "*".parse()?;
    db.math("hits", op, 1.5)?;
    println!("hits * 1.5 = {:?}", db.fetch("hits")?);

    db.set("flag", false)?;
    println!("flag toggled to {}", db.toggle("flag")?);

    let busy = db.count_by(|_, v| v.as_f64().is_some_and(|n| n > 5.0))?;
    println!("numeric entries above 5: {busy}");

    let _ = std::fs::remove_file(db.path());
    Ok(())
}
