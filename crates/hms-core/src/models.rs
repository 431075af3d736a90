//! Domain models for the hospital management backend.
//!
//! Every data-bearing entity carries the `hospital_id` of the tenant
//! that owns it. Models serialize to camelCase for the JSON API;
//! password hashes never leave the process.

pub mod appointment;
pub mod doctor;
pub mod hospital;
pub mod patient;
pub mod prescription;
pub mod role;
pub mod user;
