pub mod collect;
pub mod extract;
pub mod fetch;
pub mod merge;
pub mod normalize;
pub mod page;
pub mod query;
pub mod record;
pub mod store;

pub use record::{MovieRecord, NormalizedRecord, RawItem};
