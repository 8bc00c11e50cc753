//! Application services for Cinescope.

pub mod cache;
pub mod catalog;
pub mod keys;
pub mod omdb;
pub mod provider;
pub mod scheduler;
pub mod throttle;
pub mod tmdb;

pub use cache::ResponseCache;
pub use catalog::{Catalog, ListKind};
pub use keys::KeyPool;
pub use omdb::OmdbClient;
pub use provider::{build_provider, MovieProvider};
pub use scheduler::{JobContext, Scheduler};
pub use throttle::Throttle;
pub use tmdb::TmdbClient;
