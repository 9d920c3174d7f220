//! # venthub-domain
//!
//! Pure domain model for the venthub ventilation controller.
//!
//! ## Responsibilities
//! - Foundational types: named identifiers, error conventions, timestamps
//! - Reduce raw **sensor readings** into a current value and a baseline
//! - Decide **actuation** from an aggregate using a hysteresis band
//! - Model the **cooldown gate** that blocks restarts after a forced timeout
//! - Describe **notifications** and the text-to-speech payload policy
//! - Decide **summer ventilation** from indoor/outdoor conditions
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod cooldown;
pub mod hysteresis;
pub mod notification;
pub mod sensor;
pub mod speech;
pub mod summer;
