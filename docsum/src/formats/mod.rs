//! Embedded sub-serializers
//!
//! Each submodule turns one kind of nested tile payload into text:
//!
//!     - [`slate`]: rich-text trees to Markdown
//!     - [`describe`]: arbitrary key/value data to a bullet list and a prose paragraph
//!     - [`graphviz`]: dataflow programs to Graphviz DOT
//!     - [`svg`]: drawing object lists to inline SVG
//!
//! They are pure functions of their input. Handlers decide what to do when one fails.

pub mod describe;
pub mod graphviz;
pub mod slate;
pub mod svg;
