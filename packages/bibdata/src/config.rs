//! Constants shared by the record model.

/// Prefix bound to the document's default namespace in query paths.
pub const DEFAULT_NS_PREFIX: &str = "xmlns";

/// Sort key for records whose identifier carries no document number.
///
/// Sorts such records after every numbered one.
pub const UNNUMBERED_SORT_KEY: u64 = 999_999;

/// Characters replaced by `-` when deriving a file name from an identifier.
pub const FILENAME_UNSAFE_CHARS: [char; 12] =
    ['/', '\\', '?', '%', '*', ':', '|', '"', '<', '>', '.', ' '];

/// Namespace of `relaton-collection` documents.
pub const COLLECTION_NS: &str = "https://open.ribose.com/relaton-xml";

/// Root element name of a collection document.
pub const COLLECTION_TAG: &str = "relaton-collection";

/// Revision date layout written to markup and mappings.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Compact revision date layout also accepted on input.
pub const BASIC_DATE_FORMAT: &str = "%Y%m%d";
