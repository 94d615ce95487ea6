//! Utility functions for label escaping in Newick strings.

/// Characters that force a label to be quoted in a Newick string.
const NEWICK_SPECIAL_CHARS: &[char] = &[
    ' ', ',', ';', '\t', '\n', '\r', '(', ')', ':', '[', ']', '\'',
];

/// Checks if a label can be written verbatim, without single quotes.
///
/// # Examples
/// ```
/// # use nexprune::parser::utils::is_plain_label;
/// assert!(is_plain_label("Pukeko"));
/// assert!(is_plain_label("Australasian_Swamphen"));
/// assert!(!is_plain_label("Australasian Swamphen"));
/// assert!(!is_plain_label("Pu[ke]ko"));
/// assert!(!is_plain_label(""));
/// ```
pub fn is_plain_label(label: &str) -> bool {
    !label.is_empty() && !label.contains(NEWICK_SPECIAL_CHARS)
}

/// Escapes a label for use in a Newick string.
///
/// Labels that are empty or contain whitespace or Newick punctuation are
/// wrapped in single quotes, doubling internal single quotes.
/// Unlike some tools, spaces are never rewritten as underscores (and
/// underscores stay underscores), so parsing the result yields the
/// exact same label.
///
/// # Examples
/// ```
/// # use nexprune::parser::utils::escape_label;
/// assert_eq!(escape_label("Pukeko"), "Pukeko");
/// assert_eq!(escape_label("Australasian_Swamphen"), "Australasian_Swamphen");
/// assert_eq!(escape_label("Australasian Swamphen"), "'Australasian Swamphen'");
/// assert_eq!(escape_label("Baillon's Crake"), "'Baillon''s Crake'");
/// ```
pub fn escape_label(label: &str) -> String {
    if is_plain_label(label) {
        label.to_string()
    } else {
        format!("'{}'", label.replace('\'', "''"))
    }
}
