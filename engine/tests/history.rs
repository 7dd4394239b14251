use std::fs;

use chrono::NaiveDate;
use dice_engine::{
    HistoryEntry, HistoryLimit, HistoryStore, RollOutcome, Roller, ScriptedDice, parse,
};
use tempfile::tempdir;

fn outcome(text: &str, draws: &[u32]) -> RollOutcome {
    let spec = parse(text).unwrap();
    Roller::new(ScriptedDice::new(draws.to_vec())).roll(spec, text)
}

fn stamp(minute: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(10, minute, 0)
        .unwrap()
}

#[test]
fn missing_file_is_empty() {
    let dir = tempdir().unwrap();
    let store = HistoryStore::at(dir.path().join("history.json"));
    assert!(store.recent(HistoryLimit::All).is_empty());
    assert!(!store.path().exists());
}

#[test]
fn append_round_trips_last_entry() {
    let dir = tempdir().unwrap();
    let store = HistoryStore::at(dir.path().join("history.json"));
    let out = outcome("4d8+3", &[2, 5, 1, 8]);
    store.append(&out);

    let all = store.recent(HistoryLimit::All);
    let last = all.last().unwrap();
    assert_eq!(last.command, "4d8+3");
    assert_eq!((last.count, last.sides, last.modifier), (4, 8, 3));
    assert_eq!(last.individual_rolls, vec![2, 5, 1, 8]);
    assert_eq!(last.total, 19);
    assert_eq!(last.outcome(), Some(out));
}

#[test]
fn recent_returns_last_window_in_order() {
    let dir = tempdir().unwrap();
    let store = HistoryStore::at(dir.path().join("history.json"));
    for i in 0..25u32 {
        let out = outcome(&format!("1d{}", i + 1), &[1]);
        store.append_entry(HistoryEntry::from_outcome(&out, stamp(i)));
    }

    let window = store.recent(HistoryLimit::Last(20));
    assert_eq!(window.len(), 20);
    let commands: Vec<_> = window.iter().map(|e| e.command.as_str()).collect();
    let expected: Vec<_> = (6..=25).map(|i| format!("1d{i}")).collect();
    assert_eq!(commands, expected);

    assert_eq!(store.recent(HistoryLimit::default()), window);
    assert_eq!(store.recent(HistoryLimit::All).len(), 25);
    assert_eq!(store.recent(HistoryLimit::Last(100)).len(), 25);
    assert!(store.recent(HistoryLimit::Last(0)).is_empty());
}

#[test]
fn clear_empties_the_log() {
    let dir = tempdir().unwrap();
    let store = HistoryStore::at(dir.path().join("history.json"));
    store.append(&outcome("1d20", &[12]));
    store.append(&outcome("3d6", &[1, 2, 3]));
    store.clear();
    assert!(store.recent(HistoryLimit::All).is_empty());
    assert!(store.recent(HistoryLimit::Last(5)).is_empty());
    assert_eq!(fs::read_to_string(store.path()).unwrap().trim(), "[]");
}

#[test]
fn garbage_file_reads_as_empty_and_is_overwritten() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("history.json");
    fs::write(&path, b"\x00\x01not json {{").unwrap();
    let store = HistoryStore::at(&path);
    assert!(store.recent(HistoryLimit::All).is_empty());

    store.append(&outcome("1d6", &[4]));
    let all = store.recent(HistoryLimit::All);
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].total, 4);
}

#[test]
fn empty_file_reads_as_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("history.json");
    fs::write(&path, "").unwrap();
    assert!(HistoryStore::at(&path).load().is_empty());
}

#[test]
fn file_is_pretty_printed_json_array() {
    let dir = tempdir().unwrap();
    let store = HistoryStore::at(dir.path().join("history.json"));
    store.append_entry(HistoryEntry::from_outcome(&outcome("2d10-1", &[3, 9]), stamp(5)));

    let text = fs::read_to_string(store.path()).unwrap();
    assert!(text.starts_with("[\n  {"));
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    let obj = &value[0];
    assert_eq!(obj["timestamp"], "2024-05-01T10:05:00");
    assert_eq!(obj["command"], "2d10-1");
    assert_eq!(obj["count"], 2);
    assert_eq!(obj["sides"], 10);
    assert_eq!(obj["modifier"], -1);
    assert_eq!(obj["individual_rolls"], serde_json::json!([3, 9]));
    assert_eq!(obj["total"], 11);
}

#[test]
fn reads_microsecond_timestamps() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("history.json");
    fs::write(
        &path,
        r#"[{"timestamp": "2024-05-01T10:11:12.123456", "command": "1d20",
            "count": 1, "sides": 20, "modifier": 0, "individual_rolls": [17], "total": 17}]"#,
    )
    .unwrap();
    let all = HistoryStore::at(&path).recent(HistoryLimit::All);
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].timestamp.format("%H:%M:%S").to_string(), "10:11:12");
}

#[test]
fn write_failure_is_swallowed() {
    let dir = tempdir().unwrap();
    let store = HistoryStore::at(dir.path().join("missing-dir").join("history.json"));
    store.append(&outcome("1d20", &[20]));
    store.clear();
    assert!(store.recent(HistoryLimit::All).is_empty());
}
