//! Constants for reading alignments.

/// First byte of a record header line
pub(crate) const HEADER_MARKER: u8 = b'>';

/// Line terminator; a preceding `\r` is stripped from labels as well
pub(crate) const NEWLINE: u8 = b'\n';

pub(crate) const CARRIAGE_RETURN: u8 = b'\r';
