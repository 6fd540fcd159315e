//! Limits applied while building.

/// Maximum nesting depth of field paths the decode bridge will follow.
///
/// Reached only by recursive target types whose construction keeps asking
/// for deeper fields.
pub const MAX_DEPTH: usize = 64;
