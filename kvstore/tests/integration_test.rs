use kvstore::{KVDb, KVStoreError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct Sighting {
    addr: String,
    family: String,
    points: Vec<String>,
}

#[test]
fn write_and_read_object() -> Result<(), KVStoreError> {
    let _ = env_logger::builder().is_test(true).try_init();
    let tempdir = tempfile::tempdir()?;
    let sqlite_db = tempdir.path().join("kvs-db/kvstore.db");

    let db = KVDb::new(&sqlite_db)?;

    let sighting = Sighting {
        addr: String::from("28179023"),
        family: String::from("bacnet"),
        points: vec![String::from("zone_temp"), String::from("fan_run_status")],
    };

    db.set("sighting", &sighting)?;
    let read_back: Sighting = db.get("sighting")?.expect("sighting was stored");
    assert_eq!(read_back, sighting);

    // A second connection sees the same persisted data
    let db2 = KVDb::new(&sqlite_db)?;
    let read_again: Sighting = db2.get("sighting")?.expect("sighting was stored");
    assert_eq!(read_again, sighting);

    log::info!("Removing DB directory {}", tempdir.path().display());
    Ok(())
}
