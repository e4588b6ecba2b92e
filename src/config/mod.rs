//! Runtime configuration resolved from settings and environment.

mod client;
pub(crate) mod helpers;

pub use client::{ClientConfig, ConfigOverrides};
