#![no_main]

use libfuzzer_sys::fuzz_target;
use sift::{InvertedIndex, Synchronized};

fuzz_target!(|data: (Vec<String>, String)| {
    let (docs, query) = data;
    let count = docs.len();
    let index = InvertedIndex::build(docs);

    // Posting lists stay sorted and within range for arbitrary input
    for (_, list) in index.terms() {
        assert!(list.windows(2).all(|w| w[0].doc_id < w[1].doc_id));
        assert!(list.iter().all(|p| p.doc_id < count && p.hit_count >= 1));
    }

    let hits = sift::query::answer(&query, &Synchronized::new(index));
    assert!(hits.len() <= sift::MAX_RESULTS);
    assert!(hits.iter().all(|h| h.hit_count > 0));
});
