//! Durability Tests for the Video Store
//!
//! Drive the repository through long mixed sequences of mutations and check the
//! file on disk after every step, including when a write dies between the temp
//! file and the rename.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use crate::core::clock::FixedClock;
use crate::core::settings::{AppSettings, SettingsManager};
use crate::core::store::EntityStore;
use crate::core::videos::{VideoDraft, VideoEntry, VideoRepository};
use crate::core::ErrorKind;

fn repository(dir: &TempDir) -> VideoRepository {
    let store = EntityStore::open(dir.path()).unwrap();
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap());
    VideoRepository::with_clock(store, Arc::new(clock))
}

fn draft(n: usize) -> VideoDraft {
    VideoDraft {
        url: format!("https://youtu.be/v{n}"),
        title: format!("video {n}"),
        channel: format!("channel {}", n % 3),
        release_date: "2024-12-01".to_string(),
        log_date: format!("2025-01-{:02} {}:15 PM", n % 28 + 1, n % 12 + 1),
        rating: (n % 11) as f64 / 2.0,
        rewatched: n % 4 == 0,
        review: String::new(),
    }
}

/// Parses the collection file as-is, independent of the repository.
fn on_disk(repo: &VideoRepository) -> Vec<VideoEntry> {
    let raw = std::fs::read(repo.store().videos_path()).unwrap();
    serde_json::from_slice(&raw).unwrap()
}

fn assert_no_temp_files(dir: &TempDir) {
    let leftovers: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name.starts_with(".tmp-"))
        .collect();
    assert!(leftovers.is_empty(), "{leftovers:?}");
}

fn assert_sorted(videos: &[VideoEntry]) {
    for pair in videos.windows(2) {
        let (a, b) = (pair[0].logged_at().unwrap(), pair[1].logged_at().unwrap());
        assert!(a >= b, "{} before {}", pair[0].log_date, pair[1].log_date);
    }
}

#[test]
fn test_interleaved_mutations_keep_file_valid() {
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir);
    let mut live: Vec<String> = Vec::new();

    for step in 0..60 {
        match step % 5 {
            0 | 1 | 2 => {
                let created = repo.create(draft(step)).unwrap();
                live.push(created.id);
            }
            3 => {
                let id = &live[step % live.len()];
                let mut entry = repo.find_by_id(id).unwrap();
                entry.review = format!("edited at step {step}");
                entry.rating = 2.5;
                repo.update(entry).unwrap();
            }
            _ => {
                let id = live.remove(0);
                repo.delete(&id).unwrap();
            }
        }

        let persisted = on_disk(&repo);
        assert_eq!(persisted.len(), live.len(), "step {step}");
        assert_eq!(repo.count().unwrap(), live.len());
        assert_sorted(&persisted);
        for id in &live {
            assert!(persisted.iter().any(|v| &v.id == id));
        }
    }
}

#[test]
fn test_fault_between_temp_write_and_rename_keeps_previous_collection() {
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir);
    let mut ids = Vec::new();
    for n in 0..3 {
        ids.push(repo.create(draft(n)).unwrap().id);
    }
    let before = std::fs::read(repo.store().videos_path()).unwrap();

    repo.store().fail_next_write();
    let err = repo.create(draft(3)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(std::fs::read(repo.store().videos_path()).unwrap(), before);

    repo.store().fail_next_write();
    assert!(repo.delete(&ids[0]).is_err());
    assert_eq!(std::fs::read(repo.store().videos_path()).unwrap(), before);

    repo.store().fail_next_write();
    let mut edited = repo.find_by_id(&ids[1]).unwrap();
    edited.review = "never committed".to_string();
    assert!(repo.update(edited).is_err());
    assert_eq!(std::fs::read(repo.store().videos_path()).unwrap(), before);

    assert_eq!(on_disk(&repo).len(), 3);
    assert!(repo.find_by_id(&ids[1]).unwrap().review.is_empty());
    assert_no_temp_files(&dir);

    // The repository keeps working after the aborted writes.
    repo.create(draft(9)).unwrap();
    repo.delete(&ids[0]).unwrap();
    assert_eq!(repo.count().unwrap(), 3);
}

#[test]
fn test_failed_delete_and_update_do_not_touch_file() {
    let dir = TempDir::new().unwrap();
    let repo = repository(&dir);
    let kept = repo.create(draft(1)).unwrap();
    let before = std::fs::read(repo.store().videos_path()).unwrap();

    assert!(repo.delete("0000000000000000").is_err());

    let mut invalid = kept.clone();
    invalid.rating = 7.0;
    assert!(repo.update(invalid).is_err());

    let mut ghost = kept;
    ghost.id = "0000000000000000".to_string();
    assert!(repo.update(ghost).is_err());

    assert_eq!(std::fs::read(repo.store().videos_path()).unwrap(), before);
}

#[test]
fn test_settings_and_videos_share_one_directory() {
    let dir = TempDir::new().unwrap();
    let store = EntityStore::open(dir.path()).unwrap();
    let settings = SettingsManager::new(store.clone());
    let repo = VideoRepository::new(store);

    repo.create(draft(2)).unwrap();
    let stored = AppSettings {
        theme: "orange".to_string(),
        ..Default::default()
    };
    settings.save(&stored).unwrap();

    assert_eq!(settings.load(), stored);
    assert_eq!(repo.count().unwrap(), 1);
    assert_no_temp_files(&dir);
}
