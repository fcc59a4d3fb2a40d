//! Core types and services for the rollcall attendance tracker.
//!
//! This crate holds the domain model, the session controller, and the traits
//! at every seam (store, presentation surface, geolocation, camera). It has no
//! database or terminal dependencies; `rollcall-store-sqlite` and
//! `rollcall-cli` plug into it.

// Native `async fn` in traits; the store and device traits spell out `Send`
// bounds on their returned futures explicitly.
#![allow(async_fn_in_trait)]

pub mod attendance;
pub mod capture;
pub mod controller;
pub mod credentials;
pub mod directory;
pub mod error;
pub mod forms;
pub mod live;
pub mod notify;
pub mod recorder;
pub mod render;
pub mod role;
pub mod session;
pub mod stats;
pub mod store;
pub mod subscription;
pub mod surface;
pub mod user;

#[cfg(test)]
mod testing;

pub use controller::Controller;
pub use error::{Error, Result, ValidationError};
