//! XML utilities: namespace rewriting of query paths, path queries and
//! node helpers.

mod namespace;
mod query;
mod utils;

pub use namespace::{ns, ns_with_prefix};
pub use query::{select_all, select_first, select_text, QueryPath, Selection};
pub use utils::{element_children, first_element_child, get_tag_name, get_text};
