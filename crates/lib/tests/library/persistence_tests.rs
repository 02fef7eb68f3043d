use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use critstore_lib::codec::{CodecKind, CompactCodec, TextCodec, WithLegacy};
use critstore_lib::config::Config;
use critstore_lib::persist::{PersistError, PersistenceManager, Recovery, StoreFiles};
use critstore_lib::store::Section;
use tempfile::TempDir;

fn open(dir: &TempDir, kind: CodecKind) -> PersistenceManager {
  PersistenceManager::open(StoreFiles::in_dir(dir.path()), kind.build()).unwrap()
}

#[test]
fn committed_state_survives_reopen_for_every_codec() {
  for kind in [
    CodecKind::Text,
    CodecKind::Compact,
    CodecKind::CompactGzip,
    CodecKind::CompactLegacyText,
  ] {
    let dir = TempDir::new().unwrap();
    {
      let mut manager = open(&dir, kind);
      assert_eq!(manager.recovered_from(), Recovery::Cold);
      manager.write(Section::Meters, 1, "coin-in", &1250u64).unwrap();
      manager.write(Section::ThemeCriticalData, 0, "denom", &"0.25".to_string()).unwrap();
      manager.commit().unwrap();
    }

    let manager = open(&dir, kind);
    assert_eq!(manager.recovered_from(), Recovery::Committed, "{kind}");
    assert_eq!(manager.read::<u64>(Section::Meters, 1, "coin-in").unwrap(), 1250);
    assert_eq!(
      manager.read::<String>(Section::ThemeCriticalData, 0, "denom").unwrap(),
      "0.25"
    );
  }
}

#[test]
fn uncommitted_changes_are_lost() {
  let dir = TempDir::new().unwrap();
  {
    let mut manager = open(&dir, CodecKind::Compact);
    manager.write(Section::History, 0, "round", &1u32).unwrap();
    manager.commit().unwrap();
    manager.write(Section::History, 0, "round", &2u32).unwrap();
  }

  let manager = open(&dir, CodecKind::Compact);
  assert_eq!(manager.read::<u32>(Section::History, 0, "round").unwrap(), 1);
}

#[test]
fn crash_between_write_and_promote_recovers_from_modifier() {
  let dir = TempDir::new().unwrap();
  let files = StoreFiles::in_dir(dir.path());
  {
    let mut manager = PersistenceManager::open(files.clone(), Box::new(CompactCodec)).unwrap();
    manager.write_raw(Section::HostData, 0, "state", b"paying");
    manager.commit().unwrap();
  }
  // A torn promote leaves a truncated committed file behind.
  fs::write(&files.committed, b"CDS").unwrap();

  let manager = PersistenceManager::open(files, Box::new(CompactCodec)).unwrap();
  assert_eq!(manager.recovered_from(), Recovery::Modifier);
  assert_eq!(manager.read_raw(Section::HostData, 0, "state"), Some(&b"paying"[..]));
}

#[test]
fn legacy_text_store_is_readable_by_migrating_codec() {
  let dir = TempDir::new().unwrap();
  {
    let mut manager = open(&dir, CodecKind::Text);
    manager.write(Section::Progressive, 2, "level", &7u8).unwrap();
    manager.commit().unwrap();
  }

  let mut manager = PersistenceManager::open(
    StoreFiles::in_dir(dir.path()),
    Box::new(WithLegacy::new(CompactCodec, TextCodec)),
  )
  .unwrap();
  assert_eq!(manager.recovered_from(), Recovery::Committed);
  assert_eq!(manager.read::<u8>(Section::Progressive, 2, "level").unwrap(), 7);

  // The next commit rewrites the image in the compact format.
  manager.commit().unwrap();
  let compact = PersistenceManager::open(StoreFiles::in_dir(dir.path()), Box::new(CompactCodec)).unwrap();
  assert_eq!(compact.recovered_from(), Recovery::Committed);
}

#[test]
fn observers_fire_once_per_commit() {
  let dir = TempDir::new().unwrap();
  let mut manager = open(&dir, CodecKind::CompactGzip);
  let calls = Arc::new(AtomicUsize::new(0));
  let seen = Arc::clone(&calls);
  manager.on_commit(move || {
    seen.fetch_add(1, Ordering::SeqCst);
  });

  manager.commit().unwrap();
  manager.commit().unwrap();
  assert_eq!(calls.load(Ordering::SeqCst), 2);
  assert_eq!(manager.commit_count(), 2);
}

#[test]
fn scope_operations_persist() {
  let dir = TempDir::new().unwrap();
  {
    let mut manager = open(&dir, CodecKind::Compact);
    manager.write_raw(Section::ThemeConfiguration, 0, "lines", b"25");
    manager.write_raw(Section::ThemeConfiguration, 1, "lines", b"50");
    manager.swap_scopes(Section::ThemeConfiguration, 0, Section::ThemeConfiguration, 1);
    manager.copy_scope(Section::ThemeConfiguration, 0, Section::ThemeConfigurationProfile, 0);
    manager.commit().unwrap();
  }

  let manager = open(&dir, CodecKind::Compact);
  assert_eq!(manager.read_raw(Section::ThemeConfiguration, 0, "lines"), Some(&b"50"[..]));
  assert_eq!(manager.read_raw(Section::ThemeConfiguration, 1, "lines"), Some(&b"25"[..]));
  assert_eq!(
    manager.read_raw(Section::ThemeConfigurationProfile, 0, "lines"),
    Some(&b"50"[..])
  );
  assert_eq!(manager.usage(Section::ThemeConfiguration, 0), 2);
}

#[test]
fn config_naming_one_file_twice_is_rejected() {
  let dir = TempDir::new().unwrap();
  let mut config = Config::new();
  config.store.dir = Some(dir.path().to_path_buf());
  config.store.modifier = "critical.dat".to_string();
  config.store.committed = "critical.dat".to_string();

  let err = PersistenceManager::open(config.store_files(), config.store.codec.build()).unwrap_err();
  assert!(matches!(err, PersistError::SharedFile { .. }));
}

#[test]
fn codec_mismatch_opens_cold_without_touching_files() {
  let dir = TempDir::new().unwrap();
  {
    let mut manager = open(&dir, CodecKind::CompactGzip);
    manager.write(Section::Meters, 1, "coin-in", &1250u64).unwrap();
    manager.commit().unwrap();
  }
  let files = StoreFiles::in_dir(dir.path());
  let before = fs::read(&files.committed).unwrap();

  let mismatched = open(&dir, CodecKind::Compact);
  assert_eq!(mismatched.recovered_from(), Recovery::Cold);
  drop(mismatched);

  assert_eq!(fs::read(&files.committed).unwrap(), before);
  let manager = open(&dir, CodecKind::CompactGzip);
  assert_eq!(manager.read::<u64>(Section::Meters, 1, "coin-in").unwrap(), 1250);
}
