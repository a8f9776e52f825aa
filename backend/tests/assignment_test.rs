mod common;

use std::collections::BTreeMap;

use serde_json::{json, Value};
use timetable_backend::{
    models::assignment::{AssignmentMap, SlotKey},
    timetable::assignments::{cache_key, load_assignments, AssignmentCache, AssignmentSource},
};

fn entries(value: Value) -> BTreeMap<String, Value> {
    serde_json::from_value(value).unwrap()
}

#[test]
fn slot_key_round_trips_through_its_string_form() {
    let key: SlotKey = "3-100-2".parse().unwrap();
    assert_eq!(key, SlotKey::new(3, 100, 2));
    assert_eq!(key.to_string(), "3-100-2");
}

#[test]
fn malformed_slot_keys_are_rejected() {
    for bad in ["", "3-100", "3-100-2-1", "x-100-2", "8-100-2", "0-1-1", "3--2"] {
        assert!(bad.parse::<SlotKey>().is_err(), "{bad:?} should not parse");
    }
}

#[test]
fn wire_entries_accept_several_subject_shapes() {
    let map = AssignmentMap::from_wire_entries(entries(json!({
        "1-100-1": { "subjectId": 501 },
        "1-100-2": { "subject_id": "502" },
        "2-100-1": { "subject": { "id": 503 } },
        "2-100-2": 504,
        "2-100-3": { "subjectId": null },
        "garbage": { "subjectId": 1 },
    })));
    assert_eq!(map.to_wire().len(), 4);
    assert_eq!(map.subject_at(SlotKey::new(1, 100, 1)), Some(501));
    assert_eq!(map.subject_at(SlotKey::new(1, 100, 2)), Some(502));
    assert_eq!(map.subject_at(SlotKey::new(2, 100, 1)), Some(503));
    assert_eq!(map.subject_at(SlotKey::new(2, 100, 2)), Some(504));
    assert_eq!(map.subject_at(SlotKey::new(2, 100, 3)), None);
}

#[test]
fn serializes_in_wire_form() {
    let mut map = AssignmentMap::new();
    map.insert(SlotKey::new(1, 100, 1), 501);
    assert_eq!(
        serde_json::to_value(&map).unwrap(),
        json!({ "1-100-1": { "subjectId": 501 } })
    );
}

#[test]
fn cache_key_matches_storage_layout() {
    assert_eq!(cache_key(42), "timetable:blockAssign:42");
    let cache = AssignmentCache::new("/tmp/cache");
    let path = cache.path_for(42).unwrap();
    assert!(path.ends_with("timetable_blockAssign_42.json"));
    assert!(AssignmentCache::disabled().path_for(42).is_none());
}

#[tokio::test]
async fn cache_round_trip() {
    let (cache, dir) = common::temp_cache();
    let mut map = AssignmentMap::new();
    map.insert(SlotKey::new(5, 101, 4), 503);

    cache.write(9, &map).await.unwrap();
    assert_eq!(cache.read(9).await, map);
    assert!(cache.read(10).await.is_empty());

    let _ = tokio::fs::remove_dir_all(dir).await;
}

#[tokio::test]
async fn malformed_cache_entry_reads_as_empty() {
    let (cache, dir) = common::temp_cache();
    tokio::fs::create_dir_all(&dir).await.unwrap();
    tokio::fs::write(cache.path_for(3).unwrap(), b"{not json").await.unwrap();

    assert!(cache.read(3).await.is_empty());

    let _ = tokio::fs::remove_dir_all(dir).await;
}

#[tokio::test]
async fn server_assignments_win_over_cache() {
    let (cache, dir) = common::temp_cache();
    let mut stale = AssignmentMap::new();
    stale.insert(SlotKey::new(1, 100, 1), 999);
    cache.write(1, &stale).await.unwrap();

    let mut server = AssignmentMap::new();
    server.insert(SlotKey::new(1, 100, 1), 501);

    let (map, source) = load_assignments(1, Some(server.clone()), &cache).await;
    assert_eq!(source, AssignmentSource::Server);
    assert_eq!(map, server);
    // The cache now mirrors the server copy.
    assert_eq!(cache.read(1).await, server);

    let _ = tokio::fs::remove_dir_all(dir).await;
}

#[tokio::test]
async fn cache_answers_when_server_has_nothing() {
    let (cache, dir) = common::temp_cache();
    let mut cached = AssignmentMap::new();
    cached.insert(SlotKey::new(2, 100, 1), 502);
    cache.write(2, &cached).await.unwrap();

    let (map, source) = load_assignments(2, None, &cache).await;
    assert_eq!(source, AssignmentSource::Cache);
    assert_eq!(map, cached);

    let (map, source) = load_assignments(3, None, &cache).await;
    assert_eq!(source, AssignmentSource::None);
    assert!(map.is_empty());

    let _ = tokio::fs::remove_dir_all(dir).await;
}

#[tokio::test]
async fn disabled_cache_is_never_consulted() {
    let (map, source) = load_assignments(1, None, &AssignmentCache::disabled()).await;
    assert_eq!(source, AssignmentSource::None);
    assert!(map.is_empty());

    let mut server = AssignmentMap::new();
    server.insert(SlotKey::new(1, 1, 1), 1);
    let (_, source) = load_assignments(1, Some(server), &AssignmentCache::disabled()).await;
    assert_eq!(source, AssignmentSource::Server);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_cache_writes_all_land() {
    let (cache, dir) = common::temp_cache();
    let mut map = AssignmentMap::new();
    map.insert(SlotKey::new(1, 100, 1), 501);
    map.insert(SlotKey::new(2, 101, 3), 502);

    let writes = (0..32).map(|_| {
        let cache = cache.clone();
        let map = map.clone();
        tokio::spawn(async move { cache.write(1, &map).await })
    });
    for result in futures::future::join_all(writes).await {
        result.unwrap().unwrap();
    }

    assert_eq!(cache.read(1).await, map);
    let mut files = tokio::fs::read_dir(&dir).await.unwrap();
    let mut names = Vec::new();
    while let Some(entry) = files.next_entry().await.unwrap() {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    assert_eq!(names, vec!["timetable_blockAssign_1.json".to_string()]);

    let _ = tokio::fs::remove_dir_all(dir).await;
}

#[tokio::test]
async fn unchanged_server_assignments_are_not_rewritten() {
    let (cache, dir) = common::temp_cache();
    let mut server = AssignmentMap::new();
    server.insert(SlotKey::new(1, 100, 1), 501);
    cache.write(1, &server).await.unwrap();
    let path = cache.path_for(1).unwrap();
    let written = tokio::fs::metadata(&path).await.unwrap().modified().unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    let (map, source) = load_assignments(1, Some(server.clone()), &cache).await;
    assert_eq!(source, AssignmentSource::Server);
    assert_eq!(map, server);
    let after = tokio::fs::metadata(&path).await.unwrap().modified().unwrap();
    assert_eq!(written, after);

    let _ = tokio::fs::remove_dir_all(dir).await;
}
