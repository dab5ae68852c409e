use crate::index::InvertedIndex;
use std::io::{self, Write};

/// Number of most frequent terms listed by [`write_stats`]
const TOP_TERMS: usize = 15;

/// Write index statistics in a human-readable table
pub fn write_stats<W: Write>(out: &mut W, index: &InvertedIndex) -> io::Result<()> {
    let stats = index.stats();

    writeln!(out, "Index Statistics")?;
    writeln!(out, "================")?;
    writeln!(out)?;
    writeln!(out, "Document count:   {}", stats.documents)?;
    writeln!(out, "Distinct terms:   {}", stats.terms)?;
    writeln!(out, "Token count:      {}", stats.tokens)?;
    writeln!(out, "Posting entries:  {}", stats.postings)?;
    writeln!(out, "Longest posting:  {}", stats.longest_posting)?;
    writeln!(out, "Avg posting len:  {:.2}", stats.avg_posting_len())?;

    if stats.terms == 0 {
        return Ok(());
    }

    // Most widespread terms first, ties alphabetical
    let mut terms: Vec<(&str, usize)> = index
        .terms()
        .map(|(term, list)| (term, list.len()))
        .collect();
    terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    writeln!(out)?;
    writeln!(out, "Terms by document frequency:")?;
    for (term, docs) in terms.iter().take(TOP_TERMS) {
        writeln!(out, "  {:15} {}", term, docs)?;
    }

    if terms.len() > TOP_TERMS {
        writeln!(out, "  ... and {} more", terms.len() - TOP_TERMS)?;
    }

    Ok(())
}

/// Write every term with its full posting list, then every document
pub fn write_dump<W: Write>(out: &mut W, index: &InvertedIndex) -> io::Result<()> {
    let mut terms: Vec<_> = index.terms().collect();
    terms.sort_unstable_by(|a, b| a.0.cmp(b.0));

    writeln!(out, "INDEX")?;
    for (term, list) in terms {
        write!(out, "{}\t", term)?;
        for posting in list {
            write!(out, " {}:{}", posting.doc_id, posting.hit_count)?;
        }
        writeln!(out)?;
    }

    writeln!(out, "DOCS")?;
    for (doc_id, text) in index.documents().enumerate() {
        writeln!(out, "{}\t{}", doc_id, text)?;
    }

    Ok(())
}
