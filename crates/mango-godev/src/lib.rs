//! Release source backed by the go.dev download page.

mod source;

pub use source::{DEFAULT_BASE_URL, GoDevSource};
