//! Query execution against a pooled relational backend.
//!
//! The [`pool::Pool`] lends connections of any [`backend::Backend`], [`execution::execute`]
//! runs one query on a borrowed connection and the [`postgres`] module implements the
//! Postgres wire protocol.

pub mod backend;
pub mod execution;
pub mod handshake;
pub mod metrics;
pub mod pool;
pub mod postgres;

pub use backend::{Backend, BackendError, Credentials, HandshakePoll};
pub use execution::execute;
pub use pool::{Pool, PoolError, PoolStatus, PooledConnection};
