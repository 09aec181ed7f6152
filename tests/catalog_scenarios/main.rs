//! End-to-end catalog scenarios
//!
//! Exercises the public API the way a front end would:
//! - scenarios: the basic insert/find/query/delete flows
//! - properties: ordering, addressing and identity under random workloads
//! - dirty_tracking: what a save writes after load and after mutations

mod common;

mod dirty_tracking;
mod properties;
mod scenarios;
