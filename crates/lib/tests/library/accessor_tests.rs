use critstore_lib::access::{
  AccessError, AccessKind, CriticalDataAccessor, DataChunk, PermitAll, RulePolicy, Selector, WriteItem,
};
use critstore_lib::codec::CompactCodec;
use critstore_lib::config::Config;
use critstore_lib::index::{IndexError, Registry, ScopeCategory, ScopeIndexer};
use critstore_lib::persist::{PersistenceManager, StoreFiles};
use critstore_lib::store::Section;
use tempfile::TempDir;

fn registry() -> Registry {
  Registry::new()
    .with_theme("dragon", ["dragon-88", "dragon-92"])
    .with_theme("tiger", ["tiger-90"])
    .with_extensions(["jackpot"])
}

fn seeded_persistence() -> PersistenceManager {
  let mut persistence = PersistenceManager::unbacked(Box::new(CompactCodec));
  persistence.write(Section::ThemeCriticalData, 1, "bet", &40u32).unwrap();
  persistence.write(Section::PayvarCriticalData, 1 << 16, "rtp", &9_000u32).unwrap();
  persistence.write(Section::ExtensionCriticalData, 0, "pool", &123_456u64).unwrap();
  persistence.write(Section::ClientData, 1, "spins-left", &3u8).unwrap();
  persistence
}

#[test]
fn reads_resolve_through_context_and_registry() {
  let mut indexer = ScopeIndexer::new(registry());
  indexer.update_context("tiger", "tiger-90");
  let accessor = CriticalDataAccessor::new(indexer, seeded_persistence(), PermitAll);

  let bet = Selector::new(ScopeCategory::Theme, "bet");
  let rtp = Selector::new(ScopeCategory::Payvar, "rtp");
  let pool = Selector::new(ScopeCategory::Extension, "pool").with_identifier("jackpot");
  let spins = Selector::new(ScopeCategory::Feature, "spins-left");

  let chunk = accessor
    .read_transactional(&[bet.clone(), rtp.clone(), pool.clone(), spins.clone()])
    .unwrap();

  let codec = CompactCodec;
  assert_eq!(chunk.decode::<u32>(&codec, &bet).unwrap(), 40);
  assert_eq!(chunk.decode::<u32>(&codec, &rtp).unwrap(), 9_000);
  assert_eq!(chunk.decode::<u64>(&codec, &pool).unwrap(), 123_456);
  assert_eq!(chunk.decode::<u8>(&codec, &spins).unwrap(), 3);
}

#[test]
fn context_change_redirects_default_reads() {
  let mut indexer = ScopeIndexer::new(registry());
  indexer.update_context("tiger", "tiger-90");
  let mut accessor = CriticalDataAccessor::new(indexer, seeded_persistence(), PermitAll);
  let bet = Selector::new(ScopeCategory::Theme, "bet");

  let before = accessor.read_non_transactional(std::slice::from_ref(&bet)).unwrap();
  assert_eq!(before.decode::<u32>(&CompactCodec, &bet).unwrap(), 40);

  accessor.indexer_mut().update_context("dragon", "dragon-88");
  let after = accessor.read_non_transactional(std::slice::from_ref(&bet)).unwrap();
  assert_eq!(after.get(&bet), Some(&b""[..]));
  assert_eq!(after.decode::<u32>(&CompactCodec, &bet).unwrap(), 0);
}

#[test]
fn chunk_survives_transfer() {
  let mut indexer = ScopeIndexer::new(registry());
  indexer.update_context("tiger", "tiger-90");
  let accessor = CriticalDataAccessor::new(indexer, seeded_persistence(), PermitAll);
  let chunk = accessor
    .read_transactional(&[Selector::new(ScopeCategory::Theme, "bet")])
    .unwrap();

  let received = DataChunk::from_bytes(&chunk.to_bytes().unwrap()).unwrap();
  assert_eq!(received, chunk);
}

#[test]
fn policy_rejects_before_touching_the_store() {
  let policy = RulePolicy::new()
    .deny(ScopeCategory::History, AccessKind::Write)
    .deny(ScopeCategory::History, AccessKind::Remove);
  let accessor = CriticalDataAccessor::new(ScopeIndexer::new(registry()), seeded_persistence(), policy);
  // No context is set, so resolving a history selector would fail if attempted.
  let history = Selector::new(ScopeCategory::History, "round-1");

  assert!(matches!(
    accessor.write_transactional(&[WriteItem::new(history.clone(), b"x".to_vec())]),
    Err(AccessError::Denied {
      access: AccessKind::Write,
      ..
    })
  ));
  assert!(matches!(
    accessor.remove_transactional(&[history.clone()]),
    Err(AccessError::Denied {
      access: AccessKind::Remove,
      ..
    })
  ));
  assert!(matches!(
    accessor.read_transactional(&[history]),
    Err(AccessError::Index(IndexError::InvalidArgument(_)))
  ));
}

#[test]
fn configured_accessor_reads_committed_data() {
  let dir = TempDir::new().unwrap();
  let files = StoreFiles::in_dir(dir.path());
  let config: Config = serde_json::from_str(
    r#"{
      "version": 1,
      "store": {"codec": "compact"},
      "registry": {"themes": [{"id": "dragon", "payvars": ["dragon-88"]}]},
      "context": {"theme": "dragon", "paytable": "dragon-88"}
    }"#,
  )
  .unwrap();

  {
    let mut persistence = PersistenceManager::open(files.clone(), config.store.codec.build()).unwrap();
    persistence.write(Section::PayvarCriticalData, 0, "credits", &500i64).unwrap();
    persistence.commit().unwrap();
  }

  let persistence = PersistenceManager::open(files, config.store.codec.build()).unwrap();
  let accessor = CriticalDataAccessor::new(config.indexer(), persistence, config.policy());
  let credits = Selector::new(ScopeCategory::Payvar, "credits");
  let chunk = accessor.read_transactional(std::slice::from_ref(&credits)).unwrap();
  assert_eq!(
    chunk.decode::<i64>(accessor.persistence().codec(), &credits).unwrap(),
    500
  );
}
