//! Scope wrapping and line counting for bundle assembly.
//!
//! Every stitched file and the finished bundle itself pass through [`wrap`],
//! so the line arithmetic used for source mapping lives here too: the
//! generated-line offsets depend on exactly how wrapping trims and re-indents
//! content.

use cow_utils::CowUtils;

/// Opening line of an isolating scope.
pub(crate) const SCOPE_OPEN: &str = "(function() {";

/// Closing line of an isolating scope.
pub(crate) const SCOPE_CLOSE: &str = "})();";

/// Indentation unit applied to every wrapped line.
pub(crate) const INDENT: &str = "  ";

/// Wrap `code` in an isolating function scope.
///
/// The input is trimmed of surrounding whitespace and each of its lines is
/// indented one unit deeper. When `append_newline` is set a trailing newline
/// separates this block from whatever is appended next; the last block of a
/// bundle omits it.
pub(crate) fn wrap(code: &str, append_newline: bool) -> String {
    let indented = code.trim().cow_replace('\n', "\n  ");

    let mut wrapped = String::with_capacity(
        SCOPE_OPEN.len() + INDENT.len() + indented.len() + SCOPE_CLOSE.len() + 3,
    );
    wrapped.push_str(SCOPE_OPEN);
    wrapped.push('\n');
    wrapped.push_str(INDENT);
    wrapped.push_str(&indented);
    wrapped.push('\n');
    wrapped.push_str(SCOPE_CLOSE);
    if append_newline {
        wrapped.push('\n');
    }
    wrapped
}

/// Number of newline characters in `text`.
pub(crate) fn newline_count(text: &str) -> u32 {
    text.matches('\n').count() as u32
}

/// Number of lines `text` occupies once trimmed and stitched.
///
/// A final line without a trailing newline still counts, so this is the
/// trimmed newline count plus one. Empty input counts as a single line: the
/// wrapper emits one (blank) line for it, and that line must stay mapped or
/// every following file would be off by one.
pub(crate) fn line_count(text: &str) -> u32 {
    newline_count(text.trim()) + 1
}
