//! Line sources for documents and queries.
//!
//! Files are memory-mapped and read through a cursor so large document
//! batches are not copied into a buffer up front. `-` reads standard input.

use crate::error::Result;
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor};
use std::path::Path;

/// A line source that can be moved into a task thread
pub type LineSource = Box<dyn BufRead + Send>;

/// Path that selects standard input
pub const STDIN_PATH: &str = "-";

/// Open a file (or stdin for `-`) as a line source
pub fn open_lines(path: &Path) -> Result<LineSource> {
    if path.as_os_str() == STDIN_PATH {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }

    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(Box::new(io::empty()));
    }

    // SAFETY: the map is read-only and lives as long as the cursor. Callers
    // must not truncate the file while it is being read.
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(Box::new(Cursor::new(mmap)))
}

/// Iterate over the lines of a source, stripping `\n` and `\r\n`.
///
/// Lines are split on raw bytes. Invalid UTF-8 is replaced with U+FFFD, so a
/// malformed line is still yielded and only read errors end the iteration.
pub fn read_lines<R: BufRead>(mut reader: R) -> impl Iterator<Item = io::Result<String>> {
    let mut buf = Vec::new();
    std::iter::from_fn(move || {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => None,
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&buf).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    })
}
