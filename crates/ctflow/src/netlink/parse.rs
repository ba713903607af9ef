//! winnow plumbing shared by fixed-header parsers.

/// Result type for winnow-based header parsers.
pub type PResult<T> = winnow::ModalResult<T>;
