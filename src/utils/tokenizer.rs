use memchr::memchr_iter;

/// Word separator. Only the plain space counts; tabs and punctuation are
/// part of words.
const SEPARATOR: u8 = b' ';

/// Split a line into words on runs of spaces.
///
/// Empty fragments (leading, trailing or repeated spaces) are dropped and the
/// original word order is preserved. Words borrow from `line`.
pub fn split_into_words(line: &str) -> impl Iterator<Item = &str> + '_ {
    let bytes = line.as_bytes();
    let mut start = 0usize;

    memchr_iter(SEPARATOR, bytes)
        .chain(std::iter::once(bytes.len()))
        .filter_map(move |end| {
            // ' ' is ASCII, so both bounds are char boundaries
            let word = &line[start..end];
            start = end + 1;
            (!word.is_empty()).then_some(word)
        })
}

/// Count the words in a line without collecting them
pub fn count_words(line: &str) -> usize {
    split_into_words(line).count()
}
