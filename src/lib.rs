//! LawGic terminal client.
//!
//! The library turns loosely-typed payloads from the legal analysis backend
//! into structured display blocks and drives the conversation with it:
//!
//! ```text
//! Session (mode, compose box, attachments, transcript)
//!   └── Transport ──► backend (/api/predict/, /api/analyze/, /api/research/)
//!         └── prediction ──► normalize() ──► render() ──► DisplayBlocks
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod i18n;
pub mod response;
pub mod session;
pub mod settings;
pub mod transport;
