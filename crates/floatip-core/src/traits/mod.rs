//! Core traits for floatip
//!
//! This module defines the narrow capability interfaces the loop depends on.
//!
//! - [`PresenceScanner`]: Observe (MAC, IP) neighbors on a segment
//! - [`InterfaceConfigurator`]: Inspect and mutate interface addresses
//! - [`Sleeper`]: Suspend between iterations

pub mod interface;
pub mod scanner;
pub mod sleeper;

pub use interface::InterfaceConfigurator;
pub use scanner::{Neighbor, PresenceScanner};
pub use sleeper::{Sleeper, TokioSleeper};
