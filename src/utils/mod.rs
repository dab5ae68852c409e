//! Utility functions shared by the index, the query engine and the CLI.
//!
//! ## Modules
//!
//! - [`tokenizer`] - Whitespace word splitting for documents and queries
//! - [`source`] - Line sources (memory-mapped files, stdin)
//!
//! ```
//! use sift::utils::split_into_words;
//!
//! let words: Vec<&str> = split_into_words("  the   cat sat ").collect();
//! assert_eq!(words, ["the", "cat", "sat"]);
//! ```

pub mod source;
pub mod tokenizer;

pub use source::*;
pub use tokenizer::*;
