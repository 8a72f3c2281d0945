//! Notion proxy for the Bench Tracker repair app.
//!
//! Records and mappers live in [`models`], the Notion-facing work in
//! [`operations`], and [`dispatch`] routes HTTP requests to them. The Lambda
//! binaries in `src/bin` are thin wrappers around [`dispatch::respond`] and
//! [`dispatch::respond_inbox`].

pub mod dispatch;
pub mod models;
pub mod operations;
pub mod reconcile;

#[cfg(test)]
mod testing;
