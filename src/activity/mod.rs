//! Structured record of every change made through the server.
//!
//! Each mutation appends one JSON line to the activity log
//! (`~/.propdesk/activity.jsonl` by default). `propdesk history` reads it
//! back.

pub mod logger;
