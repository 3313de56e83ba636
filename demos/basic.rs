use filedict::pack::StringKeys;
use filedict::{DataDir, SerializedDict};

fn main() -> Result<(), filedict::Error> {
    let root = std::env::temp_dir().join("filedict_demo_basic");
    let dir = DataDir::new(&root);
    dir.create()?;

    let mut db = SerializedDict::<String, i32>::open(&dir, "fruit.json")?;

    // set / get / delete, each one rewrites fruit.json
    db.set("apples".into(), 3)?;
    db.set("bananas".into(), 5)?;
    println!("apples  = {:?}", db.get(&"apples".into()));
    db.delete(&"bananas".into())?;
    println!("bananas = {:?}", db.get(&"bananas".into()).err());

    // update in place
    db.update(&"apples".into(), |n| *n += 1)?;
    println!("apples after update = {:?}", db.get(&"apples".into()));

    // bulk insert, one write
    db.extend(vec![("grapes".into(), 12), ("lemons".into(), 7)])?;
    println!("sorted keys = {:?}", db.list());

    let snap = db.backup()?;
    println!("backup at {}", snap.display());

    // integer keys need to become strings for JSON
    let mut ids = SerializedDict::<u64, String>::builder(&dir, "ids.json")
        .packer(StringKeys)
        .build()?;
    ids.set(42, "answer".into())?;
    println!("ids.json = {}", std::fs::read_to_string(ids.path())?);

    let _ = std::fs::remove_dir_all(&root);
    Ok(())
}
