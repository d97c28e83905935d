pub mod dedup;
pub mod extractor;
pub mod fallback;
pub mod fetcher;
pub mod loadout;
pub mod normalize;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod strategies;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
