//! Data models for the Caseflow case management backend.
//!
//! Field names follow the established wire contract of the case API
//! (`case_description`, `crc32`, `status_id`, ...), so everything stays
//! snake_case on the wire.

mod activity;
mod case;
mod pipeline;
mod user;

pub use activity::*;
pub use case::*;
pub use pipeline::*;
pub use user::*;
