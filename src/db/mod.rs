//! Account store schema (C3), read snapshots (C4), and the writer (C5).
//!
//! Module organisation mirrors `full-service/src/db/mod.rs`'s "one
//! `pub mod` per entity plus a central handle" shape (see `DESIGN.md`).

pub mod account;
pub mod block;
pub mod common;
pub mod image;
pub mod output;
pub mod reader;
pub mod request;
pub mod spend;
pub mod writer;

pub use reader::Reader;
pub use writer::Writer;
