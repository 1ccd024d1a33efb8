//! Surface syntax: the tokenizer and chain reader.

pub mod reader;

pub use reader::{read, read_tagged};
