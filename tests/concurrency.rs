//! Concurrency tests for rebuilds running alongside query streams.
//!
//! Two corpora give distinct answers to the same query, so every result can
//! be attributed to exactly one index generation.

use sift::query::{QueryResult, SearchHit};
use sift::server::{SearchServer, SharedSink};
use sift::{InvertedIndex, QueryEngine, Synchronized};
use std::io::Cursor;
use std::sync::Arc;
use std::thread;

const QUERY: &str = "a b";

/// 50 documents, each "a b": every document scores 2
fn corpus_wide() -> String {
    "a b\n".repeat(50)
}

/// 3 documents, each "a a a b": every document scores 4
fn corpus_narrow() -> String {
    "a a a b\n".repeat(3)
}

fn expected_wide() -> Vec<SearchHit> {
    (0..5).map(|doc_id| SearchHit { doc_id, hit_count: 2 }).collect()
}

fn expected_narrow() -> Vec<SearchHit> {
    (0..3).map(|doc_id| SearchHit { doc_id, hit_count: 4 }).collect()
}

fn reader(text: String) -> Cursor<Vec<u8>> {
    Cursor::new(text.into_bytes())
}

#[test]
fn queries_observe_a_single_generation() {
    let mut server = SearchServer::with_documents(reader(corpus_wide())).unwrap();
    let collected = SharedSink::new(Vec::<QueryResult>::new());

    let queries = format!("{}\n", QUERY).repeat(300);
    for round in 0..20 {
        if round % 4 == 0 {
            server
                .submit_query_stream(reader(queries.clone()), collected.clone())
                .unwrap();
        }
        let batch = if round % 2 == 0 { corpus_narrow() } else { corpus_wide() };
        server.submit_rebuild(reader(batch)).unwrap();
    }

    let summary = server.shutdown().unwrap();
    assert_eq!(summary.rebuilds, 20);
    assert_eq!(summary.query_streams, 5);
    assert_eq!(summary.queries, 1_500);

    let results = collected.try_unwrap().ok().unwrap();
    assert_eq!(results.len(), 1_500);

    let wide = expected_wide();
    let narrow = expected_narrow();
    for result in &results {
        assert_eq!(result.query, QUERY);
        assert!(
            result.hits == wide || result.hits == narrow,
            "mixed generations: {:?}",
            result.hits
        );
    }
}

#[test]
fn final_generation_is_last_rebuild_joined() {
    let mut server = SearchServer::with_documents(reader(corpus_wide())).unwrap();
    server.submit_rebuild(reader(corpus_narrow())).unwrap();
    server.wait().unwrap();

    assert_eq!(server.query(QUERY).hits, expected_narrow());

    server.submit_rebuild(reader(corpus_wide())).unwrap();
    server.wait().unwrap();
    assert_eq!(server.query(QUERY).hits, expected_wide());
}

#[test]
fn concurrent_streams_keep_their_own_order() {
    let mut server = SearchServer::with_documents(reader(
        "alpha\nbeta beta\ngamma gamma gamma\n".to_string(),
    ))
    .unwrap();

    let words = ["alpha", "beta", "gamma", "delta"];
    let receivers: Vec<_> = (0..4)
        .map(|offset| {
            let stream: String = (0..100)
                .map(|i| format!("{}\n", words[(i + offset) % words.len()]))
                .collect();
            server.submit_query_channel(reader(stream)).unwrap().1
        })
        .collect();
    server.wait().unwrap();

    for (offset, rx) in receivers.into_iter().enumerate() {
        let results: Vec<QueryResult> = rx.iter().collect();
        assert_eq!(results.len(), 100);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.query, words[(i + offset) % words.len()]);
        }
    }
}

#[test]
fn direct_engines_share_one_slot() {
    let index = Arc::new(Synchronized::new(InvertedIndex::build(
        corpus_wide().lines().map(str::to_string),
    )));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let index = Arc::clone(&index);
            thread::spawn(move || {
                let mut engine = QueryEngine::new();
                (0..500)
                    .map(|_| engine.answer(QUERY, &index))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let writer = {
        let index = Arc::clone(&index);
        thread::spawn(move || {
            for round in 0..50 {
                let batch = if round % 2 == 0 { corpus_narrow() } else { corpus_wide() };
                let next = InvertedIndex::build(batch.lines().map(str::to_string));
                drop(index.replace(next));
            }
        })
    };

    writer.join().unwrap();
    let wide = expected_wide();
    let narrow = expected_narrow();
    for handle in readers {
        for hits in handle.join().unwrap() {
            assert!(hits == wide || hits == narrow);
        }
    }
}
