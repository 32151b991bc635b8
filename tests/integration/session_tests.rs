use chrono::{DateTime, Duration, Utc};
use crawl_keeper::config::{parse_config, QuotaConfig};
use crawl_keeper::input::{prompt_target, LineSource};
use crawl_keeper::similarity::{phonetic_code, relation_key, set_similarity_ratio};
use crawl_keeper::state::{CrawlState, START_CURSOR};
use crawl_keeper::storage::{
    load_or_create_state, open_storage, Record, RecordRepository, Storage,
};
use crawl_keeper::{Checkpointer, SharedCrawlState};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::io::Cursor;
use std::sync::{Arc, Mutex};

/// Cursor value the fake service returns after the last page of a subset
const END_OF_SUBSET: i64 = 0;

/// A paginated remote service: subsets of pages of entity ids
struct FakeRemote {
    subsets: Vec<Vec<Vec<u64>>>,
}

impl FakeRemote {
    /// `subsets` subsets of `pages` pages with `per_page` unique ids each
    fn new(subsets: usize, pages: usize, per_page: usize) -> Self {
        let mut next_id = 1000u64;
        let subsets = (0..subsets)
            .map(|_| {
                (0..pages)
                    .map(|_| {
                        (0..per_page)
                            .map(|_| {
                                next_id += 1;
                                next_id
                            })
                            .collect()
                    })
                    .collect()
            })
            .collect();
        Self { subsets }
    }

    fn all_ids(&self) -> HashSet<u64> {
        self.subsets.iter().flatten().flatten().copied().collect()
    }

    /// Returns the page at `cursor` and the cursor of the following page
    fn fetch(&self, subset: u32, cursor: i64) -> Option<(Vec<u64>, i64)> {
        let pages = self.subsets.get(subset as usize - 1)?;
        let index = if cursor == START_CURSOR {
            0
        } else {
            cursor as usize
        };
        let page = pages.get(index)?.clone();
        let next = if index + 1 < pages.len() {
            (index + 1) as i64
        } else {
            END_OF_SUBSET
        };
        Some((page, next))
    }
}

/// Simulated orchestrator loop
///
/// Performs at most `budget` fetches, sleeping on the simulated clock whenever
/// the quota is exhausted. Returns true once every subset has been fetched.
fn crawl(
    state: &mut CrawlState,
    remote: &FakeRemote,
    clock: &mut DateTime<Utc>,
    budget: usize,
    collected: &mut Vec<u64>,
) -> bool {
    let mut fetches = 0;
    loop {
        if fetches == budget {
            return false;
        }
        if !state.can_make_call(*clock) {
            let wake = state.next_available_at(*clock);
            assert!(wake > *clock);
            *clock = wake;
            continue;
        }

        let Some((ids, next)) = remote.fetch(state.subset(), state.cursor()) else {
            return true;
        };
        state.register_call(*clock);
        collected.extend(ids);

        if next == END_OF_SUBSET {
            state.advance_subset();
            state.set_cursor(START_CURSOR);
        } else {
            state.set_cursor(next);
        }

        fetches += 1;
        *clock += Duration::seconds(1);
    }
}

fn start_time() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
}

#[test]
fn test_full_crawl_respects_quota() {
    let dir = tempfile::tempdir().unwrap();
    let mut storage = open_storage(&dir.path().join("crawl.db")).unwrap();
    let quota = QuotaConfig::default();
    let remote = FakeRemote::new(2, 20, 3);

    let target = "42".parse().unwrap();
    let mut state = load_or_create_state(&mut storage, target, &quota).unwrap();
    assert_eq!(state.subset(), 1);
    assert_eq!(state.cursor(), -1);

    let mut clock = start_time();
    let mut collected = Vec::new();
    let finished = crawl(&mut state, &remote, &mut clock, usize::MAX, &mut collected);
    storage.save_crawl_state(&state).unwrap();

    assert!(finished);
    assert_eq!(state.subset(), 3);
    assert_eq!(state.total_calls(), 40);
    assert_eq!(collected.len(), 120);
    assert_eq!(collected.iter().copied().collect::<HashSet<_>>(), remote.all_ids());

    // 40 calls at 15 per window need two full waits
    assert!(clock - start_time() >= Duration::minutes(30));
    assert!(state.call_history().count() <= 15);
}

#[test]
fn test_restart_resumes_without_gaps_or_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("crawl.db");
    let quota = QuotaConfig::default();
    let remote = FakeRemote::new(2, 10, 5);
    let mut clock = start_time();
    let mut collected = Vec::new();

    // first run reads the target from its input source and stops mid-subset
    let saved_summary = {
        let mut source = LineSource::new(Cursor::new("not-a-number\n77\n"));
        let target = prompt_target(&mut source).unwrap();

        let mut storage = open_storage(&db_path).unwrap();
        let mut state = load_or_create_state(&mut storage, target, &quota).unwrap();
        assert!(!crawl(&mut state, &remote, &mut clock, 17, &mut collected));
        storage.save_crawl_state(&state).unwrap();
        state.describe()
    };
    assert_eq!(saved_summary.subset, 2);
    assert_eq!(saved_summary.cursor, 7);

    // second run picks up exactly where the first one stopped
    let mut storage = open_storage(&db_path).unwrap();
    let target = "77".parse().unwrap();
    let mut state = load_or_create_state(&mut storage, target, &quota).unwrap();
    assert_eq!(state.describe(), saved_summary);

    // the restored history still counts against the quota
    let in_window = state.call_history().filter(|t| *t > clock - quota.window()).count();
    assert_eq!(state.can_make_call(clock), in_window < 15);

    assert!(crawl(&mut state, &remote, &mut clock, usize::MAX, &mut collected));
    storage.save_crawl_state(&state).unwrap();

    let unique: HashSet<u64> = collected.iter().copied().collect();
    assert_eq!(unique.len(), collected.len(), "an id was fetched twice");
    assert_eq!(unique, remote.all_ids());
    assert_eq!(state.total_calls(), 20);
}

#[test]
fn test_restart_with_full_window_waits() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("crawl.db");
    let quota = parse_config("[quota]\nmax-calls = 3\nwindow-secs = 60\n")
        .unwrap()
        .quota;
    let target = "5".parse().unwrap();

    {
        let mut storage = open_storage(&db_path).unwrap();
        let mut state = load_or_create_state(&mut storage, target, &quota).unwrap();
        for i in 0..3 {
            state.register_call(start_time() + Duration::seconds(i));
        }
        storage.save_crawl_state(&state).unwrap();
    }

    let storage = open_storage(&db_path).unwrap();
    let state = storage.load_crawl_state(target, &quota).unwrap().unwrap();
    let now = start_time() + Duration::seconds(10);
    assert!(!state.can_make_call(now));
    assert_eq!(state.next_available_at(now), start_time() + Duration::seconds(60));
    assert_eq!(
        state.time_until_next_call(now),
        Some(std::time::Duration::from_secs(50))
    );
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Profile {
    id: u64,
    name: String,
    following: Vec<u64>,
}

impl Record for Profile {
    const KIND: &'static str = "profile";
}

#[test]
fn test_collected_profiles_can_be_matched() {
    let dir = tempfile::tempdir().unwrap();
    let mut storage = open_storage(&dir.path().join("crawl.db")).unwrap();

    let profiles = vec![
        Profile {
            id: 1,
            name: "Robert".to_string(),
            following: vec![10, 11, 12],
        },
        Profile {
            id: 2,
            name: "Rupert".to_string(),
            following: vec![11, 12, 13],
        },
        Profile {
            id: 3,
            name: "Alice".to_string(),
            following: vec![20],
        },
        Profile {
            id: 4,
            name: "Zed".to_string(),
            following: vec![],
        },
    ];
    storage.store_records(profiles.as_slice()).unwrap();

    let loaded: Vec<Profile> = storage.load_records(3).unwrap();
    assert_eq!(loaded, profiles[..3].to_vec());

    let mut by_code: BTreeMap<String, Vec<u64>> = BTreeMap::new();
    for profile in &loaded {
        by_code
            .entry(phonetic_code(&profile.name))
            .or_default()
            .push(profile.id);
    }
    assert_eq!(by_code.get("R163"), Some(&vec![1, 2]));
    assert_eq!(by_code.len(), 2);

    let overlap = set_similarity_ratio(
        Some(loaded[0].following.as_slice()),
        Some(loaded[1].following.as_slice()),
    );
    assert_eq!(overlap, 0.5);
    assert_eq!(relation_key(loaded[0].id, loaded[1].id), "2_1");
}

#[tokio::test]
async fn test_checkpointer_persists_concurrent_progress() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("crawl.db");
    let quota = QuotaConfig::default();
    let target = "42".parse().unwrap();

    let mut storage = open_storage(&db_path).unwrap();
    let state = load_or_create_state(&mut storage, target, &quota).unwrap();
    let shared = SharedCrawlState::new(state);
    let storage = Arc::new(Mutex::new(storage));

    let checkpointer = Checkpointer::new(
        shared.clone(),
        storage.clone(),
        std::time::Duration::from_millis(10),
    );
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let writer = tokio::spawn(checkpointer.run(shutdown_rx));

    let crawler = {
        let shared = shared.clone();
        tokio::spawn(async move {
            let mut admitted = 0;
            for page in 1..=20i64 {
                let now = start_time() + Duration::seconds(page);
                if shared.try_register_call(now).unwrap() {
                    shared.set_cursor(page).unwrap();
                    admitted += 1;
                }
                tokio::time::sleep(std::time::Duration::from_millis(2)).await;
            }
            admitted
        })
    };

    let admitted = crawler.await.unwrap();
    assert_eq!(admitted, 15);

    shutdown_tx.send(true).unwrap();
    writer.await.unwrap().unwrap();

    let final_summary = shared.describe().unwrap();
    let reopened = open_storage(&db_path).unwrap();
    let saved = reopened.load_crawl_state(target, &quota).unwrap().unwrap();
    assert_eq!(saved.describe(), final_summary);
    assert_eq!(saved.cursor(), 15);
    assert_eq!(saved.total_calls(), 15);
}
