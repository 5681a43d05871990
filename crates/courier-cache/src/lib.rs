//! # courier-cache
//!
//! Cache backends for Courier behind the [`CacheProvider`] trait:
//! Redis for shared deployments, in-memory (moka) for single-node and
//! test use. The backend is selected by configuration via [`CacheManager`].
//!
//! [`CacheProvider`]: courier_core::traits::cache::CacheProvider

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::CacheManager;
