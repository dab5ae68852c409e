//! Result rendering for query streams.
//!
//! Text format, one line per query:
//!
//! ```text
//! the sat: {docid: 1, hitcount: 3} {docid: 0, hitcount: 2}
//! ```
//!
//! JSON format, one object per line:
//!
//! ```text
//! {"query":"the sat","hits":[{"doc_id":1,"hit_count":3},{"doc_id":0,"hit_count":2}]}
//! ```

use crate::error::Result;
use crate::query::SearchHit;
use crate::server::ResultSink;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, WriteColor};

/// Output format for query results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// When to emit ANSI colors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn choice(self) -> ColorChoice {
        match self {
            ColorMode::Auto => ColorChoice::Auto,
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
        }
    }
}

/// Writes results as `query: {docid: N, hitcount: M} ...` lines
pub struct TextSink<W> {
    out: W,
}

impl<W: WriteColor> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, query: &str, hits: &[SearchHit]) -> io::Result<()> {
        self.out
            .set_color(ColorSpec::new().set_fg(Some(Color::Magenta)).set_bold(true))?;
        write!(self.out, "{}", query)?;
        self.out.reset()?;
        write!(self.out, ":")?;

        for hit in hits {
            write!(self.out, " {{docid: ")?;
            self.out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
            write!(self.out, "{}", hit.doc_id)?;
            self.out.reset()?;
            write!(self.out, ", hitcount: ")?;
            self.out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
            write!(self.out, "{}", hit.hit_count)?;
            self.out.reset()?;
            write!(self.out, "}}")?;
        }

        writeln!(self.out)
    }
}

impl<W: WriteColor> ResultSink for TextSink<W> {
    fn write_result(&mut self, query: &str, hits: &[SearchHit]) -> Result<()> {
        self.write_line(query, hits)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    query: &'a str,
    hits: &'a [SearchHit],
}

/// Writes results as JSON lines
pub struct JsonSink<W> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultSink for JsonSink<W> {
    fn write_result(&mut self, query: &str, hits: &[SearchHit]) -> Result<()> {
        serde_json::to_writer(&mut self.out, &JsonRecord { query, hits })?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
