//! Local/remote data access.
//!
//! [`policy`] picks a strategy, [`fetch`] runs it against caller-supplied
//! reads, and [`repository`] binds the two to a [`KeyValueStore`].

pub mod fetch;
pub mod http;
pub mod policy;
pub mod repository;
pub mod response;
pub mod store;

pub use fetch::{fetch, fetch_sourced, fetch_stream, FetchStream, Origin, Sourced};
pub use http::{HttpPageSource, HttpRemote};
pub use policy::{effective, DataSource, DataSourceConfig};
pub use repository::Repository;
pub use response::RemoteResponse;
pub use store::{KeyValueStore, MemoryStore};
