//! Target-name construction: stem grammars, templates, and the composer that
//! combines them with a conflict marker.

pub mod compose;
pub mod grammar;
pub mod template;

pub use compose::NameComposer;
pub use grammar::{DateMatch, Marker, extract_date, split_marker};
pub use template::{NameTemplate, RenderContext};
