//! Shared building blocks for TypeFast.
//!
//! - `scoring`: WPM / accuracy / points formulas used by solo tests and races
//! - `protocol`: realtime channel frames exchanged between client and server
//! - `api`: HTTP bodies of the room directory and leaderboard endpoints
//! - `time`: clock abstraction and timestamp formatting
//! - `logger`: tracing subscriber setup for the binaries

pub mod api;
pub mod logger;
pub mod protocol;
pub mod scoring;
pub mod time;
