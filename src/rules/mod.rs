//! Per-kind semantic validation rules (spec §4.7, component C7).
//!
//! Each `validate` function is a pure predicate over a proposed (or
//! already-committed) entity plus the current registry snapshot; it never
//! mutates anything and returns every violation it finds rather than
//! stopping at the first one, so a caller sees the complete picture for a
//! rejected mutation (spec §8 universal property 2).

pub mod attribute_type;
pub mod matching_rule;
pub mod misc;
pub mod object_class;
pub mod syntax;
