//! Git history extraction.
//!
//! Walks a repository with git2, turns every commit into a
//! [`CommitRecord`](commitscope_core::CommitRecord), and reads or writes the
//! resulting rows as CSV.

pub mod csv_io;
pub mod mining;
