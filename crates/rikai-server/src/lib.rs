pub mod extract;
pub mod fragments;
pub mod handlers;
pub mod lookup;
pub mod rate_limit;
pub mod render;

pub use extract::{Document, Node, Rect, TextRun, TextSource};
pub use handlers::{AppState, MAX_TEXT_LEN, router};
pub use lookup::{LookupResult, LookupService, LookupSource, lookup_at_point};
pub use render::{RenderedEntry, render, split_senses};
