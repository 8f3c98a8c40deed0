//! An account ledger kept in memory in front of a relational store.
//!
//! [`cache::Ledger`] enforces the overdraft invariant under concurrent credits and debits,
//! while [`service::Bank`] pairs every change with its persistence so that storage never
//! trails the cache by more than one locked operation.

pub mod accounts;
pub mod cache;
pub mod error;
pub mod movements;
pub mod service;
pub mod state;
pub mod transaction;
