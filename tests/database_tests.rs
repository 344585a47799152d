//! Integration tests for the fjall-backed table facade.
//!
//! Each test opens a fresh store in a temporary directory.

#![cfg(feature = "store")]

use dotkv::{
    ConnectionOptions, Database, Error, Event, ImportOptions, LATENCY_KEY, MathOp, RawQuery,
    Record, SortOptions, ValueType, transfer,
};
use serde_json::{Value, json};
use tempfile::TempDir;

fn open() -> anyhow::Result<(Database, TempDir)> {
    let dir = TempDir::new()?;
    let url = format!("fjall://{}", dir.path().join("db").display());
    let db = Database::open(&url, "JSON", ConnectionOptions::default())?;
    Ok((db, dir))
}

fn ids(records: &[Record]) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}

// =============================================================================
// Set / Get / Delete
// =============================================================================

#[test]
fn test_set_and_get_nested() -> anyhow::Result<()> {
    let (db, _dir) = open()?;

    let data = db.set("user", json!({ "name": "ada" }))?;
    assert_eq!(data, json!({ "name": "ada" }));

    let data = db.set("user.settings.theme", json!("dark"))?;
    assert_eq!(data, json!({ "name": "ada", "settings": { "theme": "dark" } }));

    assert_eq!(db.get("user.settings.theme")?, Some(json!("dark")));
    assert_eq!(db.fetch("user.name")?, Some(json!("ada")));
    assert_eq!(db.get("user.missing")?, None);
    assert_eq!(db.get("nobody")?, None);
    Ok(())
}

#[test]
fn test_set_creates_record_from_target() -> anyhow::Result<()> {
    let (db, _dir) = open()?;

    db.set("guild.members[1]", json!("grace"))?;
    assert_eq!(db.get("guild")?, Some(json!({ "members": [null, "grace"] })));
    Ok(())
}

#[test]
fn test_set_target_on_scalar_record_fails() -> anyhow::Result<()> {
    let (db, _dir) = open()?;

    db.set("count", json!(3))?;
    let err = db.set("count.inner", json!(1)).unwrap_err();
    assert!(matches!(err, Error::TargetNotObject(_)));
    assert!(err.is_type_mismatch());
    assert_eq!(db.get("count")?, Some(json!(3)));
    Ok(())
}

#[test]
fn test_invalid_keys() -> anyhow::Result<()> {
    let (db, _dir) = open()?;

    assert!(matches!(db.set("", json!(1)), Err(Error::InvalidKey(_))));
    assert!(matches!(db.get(".nested"), Err(Error::InvalidKey(_))));
    assert!(db.set("doc.a..b", json!(1)).unwrap_err().is_invalid_input());
    Ok(())
}

#[test]
fn test_far_array_index_is_rejected() -> anyhow::Result<()> {
    let (db, _dir) = open()?;

    let err = db.set("u.a[18446744073709551615]", json!(1)).unwrap_err();
    assert!(err.is_invalid_input());
    let err = db.set("u.a[2305843009213693952]", json!(1)).unwrap_err();
    assert!(err.is_invalid_input());
    assert!(db.push("u.a[1000000000]", json!(1)).unwrap_err().is_invalid_input());
    assert_eq!(db.get("u")?, None);

    db.set("u.a[3]", json!(1))?;
    assert_eq!(db.get("u.a")?, Some(json!([null, null, null, 1])));
    Ok(())
}

#[test]
fn test_delete_nested_and_whole() -> anyhow::Result<()> {
    let (db, _dir) = open()?;

    db.set("doc", json!({ "a": 1, "b": [1, 2, 3] }))?;
    assert!(db.delete("doc.a")?);
    assert!(!db.delete("doc.a")?);
    assert!(db.delete("doc.b[0]")?);
    assert_eq!(db.get("doc")?, Some(json!({ "b": [2, 3] })));

    assert!(db.delete("doc")?);
    assert!(!db.delete("doc")?);
    assert!(!db.exists("doc")?);
    Ok(())
}

#[test]
fn test_exists_has_is() -> anyhow::Result<()> {
    let (db, _dir) = open()?;

    db.set("flag", json!({ "on": true, "off": null }))?;
    assert!(db.exists("flag.on")?);
    assert!(db.has("flag.off")?);
    assert!(!db.has("flag.missing")?);
    assert!(db.is("flag.on", &json!(true))?);
    assert!(!db.is("flag.on", &json!(false))?);
    Ok(())
}

#[test]
fn test_value_type() -> anyhow::Result<()> {
    let (db, _dir) = open()?;

    db.set("doc", json!({ "s": "x", "n": 1.5, "b": false, "a": [], "o": {}, "z": null }))?;
    assert_eq!(db.value_type("doc")?, ValueType::Object);
    assert_eq!(db.value_type("doc.s")?, ValueType::String);
    assert_eq!(db.value_type("doc.n")?, ValueType::Number);
    assert_eq!(db.value_type("doc.b")?, ValueType::Boolean);
    assert_eq!(db.value_type("doc.a")?, ValueType::Array);
    assert_eq!(db.value_type("doc.z")?, ValueType::Null);
    assert_eq!(db.value_type("doc.nope")?, ValueType::Undefined);
    Ok(())
}

// =============================================================================
// Math
// =============================================================================

#[test]
fn test_math_operations() -> anyhow::Result<()> {
    let (db, _dir) = open()?;

    assert_eq!(db.add("stats.visits", 5.0)?, json!(5));
    assert_eq!(db.subtract("stats.visits", 2.0)?, json!(3));
    assert_eq!(db.math("stats.visits", MathOp::Multiply, 4.0)?, json!(12));
    assert_eq!(db.math("stats.visits", MathOp::Divide, 8.0)?, json!(1.5));
    assert_eq!(db.math("stats.visits", MathOp::Modulo, 1.0)?, json!(0.5));
    assert_eq!(db.get("stats")?, Some(json!({ "visits": 0.5 })));

    assert_eq!(db.add("counter", 1.0)?, json!(1));
    assert_eq!(db.get("counter")?, Some(json!(1)));
    Ok(())
}

#[test]
fn test_math_errors() -> anyhow::Result<()> {
    let (db, _dir) = open()?;

    db.set("doc", json!({ "name": "ada", "n": 2 }))?;
    assert!(matches!(
        db.add("doc.name", 1.0),
        Err(Error::NotANumber { found: ValueType::String, .. })
    ));
    assert!(matches!(
        db.math("doc.n", MathOp::Divide, 0.0),
        Err(Error::DivisionByZero)
    ));
    assert!(matches!(db.add("doc.n", f64::NAN), Err(Error::InvalidNumber(_))));
    assert_eq!(db.get("doc.n")?, Some(json!(2)));

    let err = "pow".parse::<MathOp>().unwrap_err();
    assert!(matches!(err, Error::InvalidOperator(_)));
    Ok(())
}

// =============================================================================
// Arrays
// =============================================================================

#[test]
fn test_push_and_pull() -> anyhow::Result<()> {
    let (db, _dir) = open()?;

    assert_eq!(db.push("list.items", json!("a"))?, json!(["a"]));
    assert_eq!(db.push("list.items", json!(["b", "c", "a"]))?, json!(["a", "b", "c", "a"]));

    assert_eq!(db.pull("list.items", json!("a"))?, Some(json!(["b", "c"])));
    assert_eq!(db.pull("list.items", json!(["c"]))?, Some(json!(["b"])));
    assert_eq!(db.pull("list.missing", json!("x"))?, None);
    assert_eq!(db.get("list")?, Some(json!({ "items": ["b"] })));
    Ok(())
}

#[test]
fn test_concurrent_updates_are_not_lost() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let url = dir.path().join("db").display().to_string();
    let db = Database::open(&url, "JSON", ConnectionOptions { durable: false })?;

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let db = db.clone();
            scope.spawn(move || {
                for _ in 0..250 {
                    db.add("counter", 1.0).unwrap();
                }
            });
        }
        for _ in 0..4 {
            let db = db.table("JSON").unwrap();
            scope.spawn(move || {
                for n in 0..100 {
                    db.push("log.items", json!(n)).unwrap();
                }
            });
        }
    });

    assert_eq!(db.get("counter")?, Some(json!(2000)));
    let items = db.get("log.items")?.unwrap_or_default();
    assert_eq!(items.as_array().map(Vec::len), Some(400));
    Ok(())
}

#[test]
fn test_push_onto_non_array_fails() -> anyhow::Result<()> {
    let (db, _dir) = open()?;

    db.set("doc.name", json!("ada"))?;
    assert!(matches!(db.push("doc.name", json!(1)), Err(Error::NotAnArray(_))));
    assert!(matches!(db.pull("doc.name", json!(1)), Err(Error::NotAnArray(_))));
    Ok(())
}

// =============================================================================
// Listing and queries
// =============================================================================

#[test]
fn test_all_keys_values_entries() -> anyhow::Result<()> {
    let (db, _dir) = open()?;

    db.set("b", json!(2))?;
    db.set("a", json!(1))?;
    db.set("c", json!(3))?;

    assert_eq!(ids(&db.all(None)?), ["a", "b", "c"]);
    assert_eq!(ids(&db.all(Some(2))?), ["a", "b"]);
    assert_eq!(db.all(Some(0))?.len(), 3);
    assert_eq!(db.key_array()?, ["a", "b", "c"]);
    assert_eq!(db.value_array()?, [json!(1), json!(2), json!(3)]);
    assert_eq!(db.entries()?, 3);
    Ok(())
}

#[test]
fn test_raw_window() -> anyhow::Result<()> {
    let (db, _dir) = open()?;

    for id in ["r1", "r2", "r3", "r4"] {
        db.set(id, json!(id))?;
    }
    let out = db.raw(&RawQuery { skip: 1, limit: Some(2) })?;
    assert_eq!(ids(&out), ["r2", "r3"]);
    assert_eq!(db.raw(&RawQuery::default())?.len(), 4);
    Ok(())
}

#[test]
fn test_starts_with_sorted() -> anyhow::Result<()> {
    let (db, _dir) = open()?;

    db.set("user_1", json!({ "xp": 10 }))?;
    db.set("user_2", json!({ "xp": 30 }))?;
    db.set("user_3", json!({ "xp": 20 }))?;
    db.set("guild_1", json!({ "xp": 99 }))?;

    let out = db.starts_with("user_", &SortOptions::default())?;
    assert_eq!(ids(&out), ["user_1", "user_2", "user_3"]);

    let out = db.starts_with("user_", &SortOptions::by("data.xp").limit(2))?;
    assert_eq!(ids(&out), ["user_2", "user_3"]);
    Ok(())
}

#[test]
fn test_random() -> anyhow::Result<()> {
    let (db, _dir) = open()?;

    assert!(db.random(3)?.is_empty());

    for id in ["a", "b", "c"] {
        db.set(id, json!(id))?;
    }
    assert_eq!(db.random(0)?.len(), 1);

    let mut out: Vec<String> = db.random(10)?.into_iter().map(|r| r.id).collect();
    out.sort();
    assert_eq!(out, ["a", "b", "c"]);
    Ok(())
}

#[test]
fn test_delete_all_emits_debug() -> anyhow::Result<()> {
    let (db, _dir) = open()?;
    let mut events = db.subscribe();

    db.set("a", json!(1))?;
    db.set("b", json!(2))?;
    assert_eq!(db.delete_all()?, 2);
    assert_eq!(db.entries()?, 0);
    assert_eq!(
        events.try_recv()?,
        Event::Debug("Deleting everything from the database...".into())
    );
    Ok(())
}

// =============================================================================
// Tables and connection
// =============================================================================

#[test]
fn test_tables_are_isolated() -> anyhow::Result<()> {
    let (db, _dir) = open()?;
    let users = db.table("users")?;

    db.set("ada", json!("json table"))?;
    users.set("ada", json!({ "xp": 1 }))?;

    assert_eq!(db.get("ada")?, Some(json!("json table")));
    assert_eq!(users.get("ada.xp")?, Some(json!(1)));
    assert_eq!(users.name(), "users");
    assert_eq!(users.to_string(), "Database<{users}>");

    assert!(matches!(db.table(""), Err(Error::InvalidTable(_))));
    assert!(matches!(db.table("bad name"), Err(Error::InvalidTable(_))));
    Ok(())
}

#[test]
fn test_disconnect_and_reconnect_keeps_data() -> anyhow::Result<()> {
    let (db, _dir) = open()?;
    let url = db.url().unwrap_or_default();

    db.set("persisted", json!({ "ok": true }))?;
    assert!(db.uptime() >= std::time::Duration::ZERO);

    db.disconnect()?;
    assert!(!db.is_connected());
    assert!(db.get("persisted").unwrap_err().is_not_connected());
    db.disconnect()?;

    let mut events = db.subscribe();
    db.connect(&url)?;
    assert_eq!(
        events.try_recv()?,
        Event::Debug("Creating database connection...".into())
    );
    assert_eq!(events.try_recv()?, Event::Ready);
    assert_eq!(db.get("persisted.ok")?, Some(json!(true)));
    Ok(())
}

#[test]
fn test_buffered_writes_survive_disconnect() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let url = dir.path().join("db").display().to_string();

    let db = Database::open(&url, "JSON", ConnectionOptions { durable: false })?;
    db.set("k", json!(1))?;
    db.disconnect()?;

    let db = Database::open(&url, "JSON", ConnectionOptions::default())?;
    assert_eq!(db.get("k")?, Some(json!(1)));
    Ok(())
}

#[test]
fn test_unconnected_database() -> anyhow::Result<()> {
    let db = Database::new("JSON", ConnectionOptions::default())?;
    assert!(!db.is_connected());
    assert_eq!(db.url(), None);
    assert!(db.set("a", json!(1)).unwrap_err().is_not_connected());
    Ok(())
}

#[test]
fn test_fetch_latency_cleans_up() -> anyhow::Result<()> {
    let (db, _dir) = open()?;

    let latency = db.ping()?;
    assert!(latency.read >= 0.0);
    assert!(latency.write >= 0.0);
    assert_eq!(latency.average, (latency.read + latency.write) / 2.0);
    assert!(!db.exists(LATENCY_KEY)?);
    Ok(())
}

#[test]
fn test_fetch_latency_keeps_stored_value() -> anyhow::Result<()> {
    let (db, _dir) = open()?;
    db.set(LATENCY_KEY, json!({ "owner": "ada" }))?;

    db.fetch_latency()?;
    assert_eq!(db.get(LATENCY_KEY)?, Some(json!({ "owner": "ada" })));
    Ok(())
}

// =============================================================================
// Export / Import
// =============================================================================

#[test]
fn test_export_import_roundtrip() -> anyhow::Result<()> {
    let (db, dir) = open()?;

    db.set("a", json!({ "n": 1 }))?;
    db.set("b", json!([1, 2]))?;
    let path = db.export(Some("backup"), Some(dir.path()))?;
    assert_eq!(path, dir.path().join("backup.json"));

    let records = transfer::read_export(&path)?;
    let other = db.table("restored")?;
    assert!(other.import(records, ImportOptions::default())?);
    assert_eq!(other.all(None)?, db.all(None)?);
    Ok(())
}

#[test]
fn test_import_options() -> anyhow::Result<()> {
    let (db, _dir) = open()?;

    db.set("a", json!("old"))?;
    assert!(!db.import(Vec::new(), ImportOptions::default())?);

    let records = vec![Record::new("a", json!("new")), Record::new("b", json!("b"))];

    assert!(db.import(records.clone(), ImportOptions::default())?);
    assert_eq!(db.get("a")?, Some(json!("old")));
    assert_eq!(db.get("b")?, Some(json!("b")));

    let strict = ImportOptions {
        overwrite_existing: false,
        validate: true,
    };
    assert!(matches!(db.import(records.clone(), strict), Err(Error::Import(_))));

    let overwrite = ImportOptions {
        overwrite_existing: true,
        validate: true,
    };
    assert!(db.import(records, overwrite)?);
    assert_eq!(db.get("a")?, Some(json!("new")));

    let invalid = vec![Record::new("c", json!(1)), Record::new("", json!(2))];
    assert!(matches!(db.import(invalid, overwrite), Err(Error::Import(_))));
    assert!(!db.exists("c")?);
    Ok(())
}

#[test]
fn test_export_to_quickdb() -> anyhow::Result<()> {
    let (db, _dir) = open()?;

    db.set("a", json!({ "x": [1, "two"] }))?;
    db.set("b", json!("plain"))?;

    let out = db.export_to_quickdb()?;
    assert_eq!(out.len(), 2);
    let first = out.first().map(|r| (r.id.as_str(), r.data.as_str()));
    assert_eq!(first, Some(("a", r#"{"x":[1,"two"]}"#)));
    let parsed: Value = serde_json::from_str(&out.get(1).map(|r| r.data.clone()).unwrap_or_default())?;
    assert_eq!(parsed, json!("plain"));
    Ok(())
}
