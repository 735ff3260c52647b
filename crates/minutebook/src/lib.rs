//! `minutebook` - Meeting scheduling, live minute-taking and minutes documents
//!
//! This library provides the meeting record model, the lifecycle controller
//! that moves meetings from scheduled to completed, the record store, and the
//! document pipeline that drafts minutes with a text-generation service and
//! exports them as PDF.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod document;
pub mod editable;
pub mod error;
pub mod generation;
pub mod lifecycle;
pub mod logging;
pub mod mail;
pub mod meeting;
pub mod session;
pub mod storage;
pub mod templates;

pub use config::Config;
pub use error::{Error, Result};
pub use generation::{DraftState, GeminiClient, TextGenerator};
pub use lifecycle::MeetingService;
pub use logging::init_logging;
pub use meeting::{Meeting, MeetingStatus};
pub use storage::{MemoryStore, RecordStore, SqliteStore, StoreStats};
