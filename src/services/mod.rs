pub mod fetcher;
pub mod poll;
pub mod recommendation;
pub mod session;
pub mod store;
