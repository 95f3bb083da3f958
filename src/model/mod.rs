//! Core data structures describing metal production routes and their results.
//!
//! This module provides the types that flow through `circu-forge`:
//!
//! - [`types`] – The closed stage-type enumeration.
//! - [`stage`] – Process stages with metrics, circular loops, and byproducts.
//! - [`route`] – Ordered stage sequences plus route-level caches and logistics.
//! - [`reference`] – Static metal and ore reference data.
//! - [`record`] – Project, scenario, and report records exchanged with storage.
//! - [`result`] – Aggregates, per-stage breakdowns, and comparison deltas.
//!
//! Routes are immutable input: the [`crate::pipeline`] derives new values from
//! a [`ProcessingRoute`] and never writes back into it.
//!
//! [`ProcessingRoute`]: route::ProcessingRoute

pub mod record;
pub mod reference;
pub mod result;
pub mod route;
pub mod stage;
pub mod types;
