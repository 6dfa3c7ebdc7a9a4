//! Shared rendering helpers
//!
//! Small, format-level building blocks used by the report assembler and the tile handlers:
//! Markdown headings, fences and pipe tables ([`markdown`]) and scalar rendering of loosely typed
//! JSON values ([`values`]).

pub mod markdown;
pub mod values;
