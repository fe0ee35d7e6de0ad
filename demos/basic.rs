use json_kv::{ErrorCode, JsonKv};
use serde_json::json;

fn main() -> Result<(), json_kv::Error> {
    let dir = std::env::temp_dir();
    let db = JsonKv::builder("json_kv_example_basic").dir(&dir).build()?;
    db.reset()?;

    // set / fetch / delete
    db.set("apples", 3)?;
    db.set("bananas", 5)?;
    println!("apples  = {:?}", db.fetch("apples")?);
    println!("bananas = {:?}", db.fetch("bananas")?);

    // a key can only be declared once
    match db.set("apples", 10) {
        Err(e) if e.is(ErrorCode::KeyAlreadyDeclared) => println!("refused: {e}"),
        other => println!("unexpected: {other:?}"),
    }

    // update in place
    db.update("apples", 4)?;
    db.updater("bananas", |v| json!(v.as_i64().unwrap_or(0) * 2))?;

    // arrays and objects
    db.push("basket", "pear")?;
    db.push("basket", "plum")?;
    db.merge("owner", json!({"name": "sam"}))?;
    db.merge("owner", json!({"city": "oslo"}))?;

    // snapshots
    println!("keys   = {:?}", db.keys()?);
    println!("values = {:?}", db.values()?);
    println!("size   = {}", db.size()?);
    println!("names  = {:?}", db.pluck("name")?);

    db.delete("bananas")?;
    println!("after delete: {:?}", db.fetch_all()?);

    let _ = std::fs::remove_file(db.path());
    Ok(())
}
