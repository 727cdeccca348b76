//! Generic in-memory query engine.
//!
//! A [`QuerySpec`] describes a view over a collection (search text, tagged
//! filters, sort key, page window); [`run`] applies it in a fixed order:
//! search, filters, sort, paginate.

pub mod engine;
pub mod filter;
pub mod spec;

pub use engine::{run, run_at, QueryResult};
pub use filter::{DateBucket, Filter};
pub use spec::{QueryParams, QuerySpec, QuerySpecBuilder, SortDirection, SortSpec};
