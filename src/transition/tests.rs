//! Tests for transition module

use super::*;
use crate::error::Error;
use crate::storage::ObjectStorage;
use bytes::Bytes;

fn landing_to_raw() -> KeyMapping {
    KeyMapping::new("landing_zone/", "raw_data/", ".dat", ".parquet")
}

fn uppercase(_key: &str, data: Bytes) -> crate::error::Result<Bytes> {
    let text = std::str::from_utf8(&data).map_err(|e| Error::decode(e.to_string()))?;
    if text.contains("corrupt") {
        return Err(Error::decode("corrupt payload"));
    }
    Ok(Bytes::from(text.to_uppercase()))
}

// ============================================================================
// KeyMapping Tests
// ============================================================================

#[test]
fn test_key_mapping_landing_to_raw() {
    let mapping = landing_to_raw();
    assert_eq!(
        mapping.map("landing_zone/batch_1700000000_3.dat").as_deref(),
        Some("raw_data/batch_1700000000_3.parquet")
    );
}

#[test]
fn test_key_mapping_only_rewrites_trailing_suffix() {
    let mapping = landing_to_raw();
    assert_eq!(
        mapping.map("landing_zone/old.dat.backup.dat").as_deref(),
        Some("raw_data/old.dat.backup.parquet")
    );
}

#[test]
fn test_key_mapping_raw_to_clean() {
    let mapping = KeyMapping::new("raw_data/", "clean_data/", ".parquet", ".parquet");
    assert_eq!(
        mapping.map("raw_data/batch_1_0.parquet").as_deref(),
        Some("clean_data/batch_1_0.parquet")
    );
}

#[test]
fn test_key_mapping_outside_zone() {
    assert_eq!(landing_to_raw().map("other/batch.dat"), None);
}

#[test]
fn test_key_mapping_matches() {
    let mapping = landing_to_raw();
    assert!(mapping.matches("landing_zone/a.dat"));
    assert!(!mapping.matches("landing_zone/a.csv"));
    assert!(!mapping.matches("raw_data/a.dat"));
}

// ============================================================================
// Report Tests
// ============================================================================

#[test]
fn test_report_counts() {
    let report = TransitionReport {
        outcomes: vec![
            ObjectOutcome::Processed {
                source: "a".to_string(),
                dest: "b".to_string(),
            },
            ObjectOutcome::Skipped {
                key: "c".to_string(),
                reason: "boom".to_string(),
            },
        ],
        ..Default::default()
    };

    assert_eq!(report.processed(), 1);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.written_keys(), vec!["b"]);
    assert_eq!(report.failures(), vec![("c", "boom")]);
    assert_eq!(report.outcomes[1].source_key(), "c");
}

// ============================================================================
// Transition Pass Tests
// ============================================================================

#[tokio::test]
async fn test_transition_moves_and_retires() {
    let storage = ObjectStorage::in_memory("lake");
    storage
        .put("landing_zone/batch_1700000000_3.dat", Bytes::from_static(b"abc"))
        .await
        .unwrap();

    let report = StageTransition::new(landing_to_raw())
        .run(&storage, &uppercase)
        .await;

    assert_eq!(report.processed(), 1);
    assert_eq!(
        storage
            .get("raw_data/batch_1700000000_3.parquet")
            .await
            .unwrap(),
        Bytes::from_static(b"ABC")
    );
    assert!(!storage
        .exists("landing_zone/batch_1700000000_3.dat")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_transition_keep_source() {
    let storage = ObjectStorage::in_memory("lake");
    storage
        .put("landing_zone/a.dat", Bytes::from_static(b"abc"))
        .await
        .unwrap();

    let report = StageTransition::new(landing_to_raw())
        .keep_source(true)
        .run(&storage, &uppercase)
        .await;

    assert_eq!(report.processed(), 1);
    assert!(storage.exists("landing_zone/a.dat").await.unwrap());
}

#[tokio::test]
async fn test_transition_is_batch_tolerant() {
    let storage = ObjectStorage::in_memory("lake");
    for i in 1..=5 {
        let body = if i == 3 { "corrupt" } else { "ok" };
        storage
            .put(&format!("landing_zone/file_{i}.dat"), Bytes::from(body))
            .await
            .unwrap();
    }

    let report = StageTransition::new(landing_to_raw())
        .run(&storage, &uppercase)
        .await;

    assert_eq!(report.processed(), 4);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.failures()[0].0, "landing_zone/file_3.dat");

    for i in [1, 2, 4, 5] {
        assert!(storage
            .exists(&format!("raw_data/file_{i}.parquet"))
            .await
            .unwrap());
    }
    // The failed source stays for a future run and nothing was written for it
    assert!(storage.exists("landing_zone/file_3.dat").await.unwrap());
    assert!(!storage.exists("raw_data/file_3.parquet").await.unwrap());
}

#[tokio::test]
async fn test_transition_ignores_foreign_suffix() {
    let storage = ObjectStorage::in_memory("lake");
    storage
        .put("landing_zone/readme.txt", Bytes::from_static(b"x"))
        .await
        .unwrap();

    let report = StageTransition::new(landing_to_raw())
        .run(&storage, &uppercase)
        .await;

    assert!(report.is_empty());
    assert!(storage.exists("landing_zone/readme.txt").await.unwrap());
}

#[tokio::test]
async fn test_transition_empty_zone_is_success() {
    let storage = ObjectStorage::in_memory("lake");
    let report = StageTransition::new(landing_to_raw())
        .run(&storage, &uppercase)
        .await;

    assert!(report.is_empty());
    assert!(report.listing_error.is_none());
}

#[tokio::test]
async fn test_transition_reprocessing_is_idempotent() {
    let storage = ObjectStorage::in_memory("lake");
    let transition = StageTransition::new(landing_to_raw());

    storage
        .put("landing_zone/a.dat", Bytes::from_static(b"abc"))
        .await
        .unwrap();
    transition.run(&storage, &uppercase).await;
    let first = storage.get("raw_data/a.parquet").await.unwrap();

    // Same source lands again, as after a crash between write and delete
    storage
        .put("landing_zone/a.dat", Bytes::from_static(b"abc"))
        .await
        .unwrap();
    transition.run(&storage, &uppercase).await;

    assert_eq!(storage.get("raw_data/a.parquet").await.unwrap(), first);
}

#[tokio::test]
async fn test_transition_moves_keys_with_special_characters() {
    let storage = ObjectStorage::in_memory("lake");
    for key in ["landing_zone/a#b.dat", "landing_zone/rate 100%.dat"] {
        storage.put(key, Bytes::from_static(b"abc")).await.unwrap();
    }

    let report = StageTransition::new(landing_to_raw())
        .run(&storage, &uppercase)
        .await;

    assert_eq!(report.processed(), 2);
    assert_eq!(report.skipped(), 0);
    assert!(storage.list("landing_zone/").await.unwrap().is_empty());
    assert_eq!(
        storage.list("raw_data/").await.unwrap(),
        vec!["raw_data/a#b.parquet", "raw_data/rate 100%.parquet"]
    );
}

#[tokio::test]
async fn test_transition_keeps_source_when_write_fails() {
    let dir = tempfile::tempdir().unwrap();
    let storage = ObjectStorage::local(dir.path().to_str().unwrap(), "lake").unwrap();
    storage
        .put("landing_zone/a.dat", Bytes::from_static(b"abc"))
        .await
        .unwrap();
    // A plain file where the destination directory should be
    std::fs::write(dir.path().join("lake").join("raw_data"), b"").unwrap();

    let report = StageTransition::new(landing_to_raw())
        .run(&storage, &uppercase)
        .await;

    assert_eq!(report.processed(), 0);
    assert!(matches!(
        &report.outcomes[..],
        [ObjectOutcome::Skipped { key, .. }] if key == "landing_zone/a.dat"
    ));
    assert!(storage.exists("landing_zone/a.dat").await.unwrap());
}
