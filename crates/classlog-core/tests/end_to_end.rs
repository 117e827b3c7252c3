//! End-to-end scenarios run through `Session` against an in-memory site
//! and an on-disk site.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;

use classlog_core::auth::ACCESS_FLAG_KEY;
use classlog_core::cache::{ManualClock, MemoryStore};
use classlog_core::markup::{self, tokenize, Span};
use classlog_core::{
    Config, FileStore, KeyValueStore, MemoryFetcher, ProgressReporter, Session, SessionOptions,
};

const T0: i64 = 1_700_000_000_000;

fn class_site() -> MemoryFetcher {
    MemoryFetcher::new()
        .with_json("data/record/records_index.json", &json!(["r1.json", "r2.json"]))
        .with_json(
            "data/record/r1.json",
            &json!({"date": "2024-01-01", "author": "p1", "content": "hello"}),
        )
        .with_json(
            "data/record/r2.json",
            &json!({"date": "2024-01-02", "author": "p2", "content": "[[p1|Alice]] said hi"}),
        )
        .with_json("data/people/people_index.json", &json!(["p1.json", "p2.json"]))
        .with_json("data/people/p1.json", &json!({"id": "p1", "role": "student", "alias": "Alice"}))
        .with_json("data/people/p2.json", &json!({"id": "p2", "role": "student"}))
        .with_json("data/glossary/glossary_index.json", &json!(["t1.json"]))
        .with_json(
            "data/glossary/t1.json",
            &json!({"id": "t1", "term": "slang", "since": "2023-09-01"}),
        )
}

fn unlocked_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.set(ACCESS_FLAG_KEY, "true").unwrap();
    store
}

fn session(fetcher: &Arc<MemoryFetcher>, store: &Arc<MemoryStore>) -> Session {
    Session::new(
        fetcher.clone(),
        store.clone(),
        Arc::new(ManualClock::new(T0)),
        SessionOptions::default(),
    )
}

#[derive(Default)]
struct Recorder(Mutex<Vec<f64>>);

impl ProgressReporter for Recorder {
    fn report(&self, fraction: f64) {
        self.0.lock().unwrap().push(fraction);
    }
}

#[tokio::test]
async fn test_records_get_positional_ids_and_cross_references() {
    let fetcher = Arc::new(class_site());
    let session = session(&fetcher, &unlocked_store());

    let records = session.records().load_all().await.unwrap();
    let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["R001", "R002"]);

    let xref = session.cross_references().await.unwrap();
    assert_eq!(xref.count_participated("p1"), 1);
    assert_eq!(xref.count_authored("p1"), 1);
    assert_eq!(xref.count_authored("p2"), 1);
    assert_eq!(xref.participated_in("p1")[0].id, "R002");
}

#[tokio::test]
async fn test_participation_matches_whole_ids() {
    let fetcher = Arc::new(
        MemoryFetcher::new()
            .with_json("data/record/records_index.json", &json!(["a.json", "b.json"]))
            .with_json(
                "data/record/a.json",
                &json!({"date": "2024-01-01", "content": "[[p10|Ten]] only"}),
            )
            .with_json(
                "data/record/b.json",
                &json!({"date": "2024-01-02", "content": "[[p1|One]] and [[p1|One again]]"}),
            ),
    );
    let session = session(&fetcher, &unlocked_store());

    let xref = session.cross_references().await.unwrap();
    assert_eq!(xref.count_participated("p1"), 1);
    assert_eq!(xref.count_participated("p10"), 1);
}

#[tokio::test]
async fn test_load_all_is_idempotent_within_a_session() {
    let fetcher = Arc::new(class_site());
    let session = session(&fetcher, &unlocked_store());

    let first = session.records().load_all().await.unwrap();
    let fetches = fetcher.fetch_count();
    let second = session.records().load_all().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(fetcher.fetch_count(), fetches);
}

#[tokio::test]
async fn test_progress_is_monotonic_and_completes() {
    let fetcher = Arc::new(class_site());
    let session = session(&fetcher, &unlocked_store());

    let recorder = Recorder::default();
    session.ensure_all_loaded(Some(&recorder)).await.unwrap();

    let fractions = recorder.0.lock().unwrap().clone();
    assert_eq!(fractions.len(), 5);
    assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*fractions.last().unwrap(), 1.0);
}

#[tokio::test]
async fn test_loads_wait_for_the_access_key() {
    let fetcher = Arc::new(class_site());
    let store = Arc::new(MemoryStore::new());
    let session = Arc::new(session(&fetcher, &store));

    let waiter = {
        let session = session.clone();
        tokio::spawn(async move { session.ensure_all_loaded(None).await })
    };
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(!waiter.is_finished());
    assert_eq!(fetcher.fetch_count(), 0);

    let wrong = session.gate().verify("nope").unwrap();
    assert!(!wrong.ok);
    assert!(session.gate().verify("classrecord").unwrap().ok);

    waiter.await.unwrap().unwrap();
    assert_eq!(session.records().load_all().await.unwrap().len(), 2);
    assert_eq!(store.get(ACCESS_FLAG_KEY).unwrap().as_deref(), Some("true"));
}

#[test]
fn test_redaction_and_term_markup() {
    let text = "[[REDACT|secret]] and {{t1|slang}}";
    assert_eq!(
        tokenize(text),
        [
            Span::Redaction("secret"),
            Span::Text(" and "),
            Span::TermRef { id: "t1", label: "slang" },
        ]
    );
    assert_eq!(
        markup::parse(text),
        r#"<span class="redacted">secret</span> and <span class="term-tag" data-id="t1">slang</span>"#
    );
}

#[test]
fn test_plain_text_survives_parsing() {
    let text = "No markup here, just a sentence.";
    assert_eq!(markup::parse(text), text);
    assert_eq!(markup::format("line one\nline two\n\nnext"), "line one<br>line twonext");
}

#[tokio::test]
async fn test_site_on_disk_with_file_cache() {
    let site = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    let write = |path: &str, value: serde_json::Value| {
        let full = site.path().join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, value.to_string()).unwrap();
    };
    write("data/record/records_index.json", json!(["r1.json"]));
    write("data/record/r1.json", json!({"date": "2024-03-01", "author": "p1", "content": "hi"}));
    write("data/people/people_index.json", json!(["p1.json"]));
    write("data/people/p1.json", json!({"id": "p1", "role": "student"}));
    write("data/glossary/glossary_index.json", json!([]));

    let config = Config {
        data_dir: Some(site.path().to_path_buf()),
        ..Config::default()
    };
    let store = Arc::new(FileStore::new(cache.path().to_path_buf()).unwrap());
    store.set(ACCESS_FLAG_KEY, "true").unwrap();

    let fetcher: Arc<dyn classlog_core::Fetcher> = match config.data_source().unwrap() {
        classlog_core::DataSource::Dir(dir) => Arc::new(classlog_core::DirFetcher::new(dir)),
        other => panic!("unexpected source {:?}", other),
    };
    let clock = Arc::new(ManualClock::new(T0));
    let options = SessionOptions {
        expire: config.cache_expire(),
        access_key_hash: None,
    };

    let first = Session::new(fetcher.clone(), store.clone(), clock.clone(), options.clone());
    first.ensure_all_loaded(None).await.unwrap();
    assert_eq!(first.records().load_all().await.unwrap()[0].id, "R001");

    // The site disappears; a fresh session is served from the file cache
    std::fs::remove_dir_all(site.path().join("data")).unwrap();
    let second = Session::new(fetcher, store.clone(), clock, options);
    assert!(!second.needs_load());
    second.ensure_all_loaded(None).await.unwrap();
    assert_eq!(second.people().load_all().await.unwrap()[0].id, "p1");

    assert_eq!(second.clear_cache().unwrap(), 6);
    assert_eq!(store.keys().unwrap(), [ACCESS_FLAG_KEY]);
}

#[tokio::test]
async fn test_every_record_counts_despite_stray_markers() {
    let fetcher = Arc::new(
        MemoryFetcher::new()
            .with_json("data/record/records_index.json", &json!(["r1.json", "r2.json"]))
            .with_json(
                "data/record/r1.json",
                &json!({"date": "2024-01-01", "author": "p1", "content": "a_b met [[stu_02|Bo]]"}),
            )
            .with_json(
                "data/record/r2.json",
                &json!({"id": "R001", "date": "2024-01-02", "author": "p2", "content": "2^10 with [[stu_02|Bo]] ^_^"}),
            ),
    );
    let session = session(&fetcher, &unlocked_store());

    let records = session.records().load_all().await.unwrap();
    assert_eq!(records.len(), 2);

    let xref = session.cross_references().await.unwrap();
    assert_eq!(xref.count_participated("stu_02"), 2);
    assert_eq!(xref.count_authored("p2"), 1);
}
