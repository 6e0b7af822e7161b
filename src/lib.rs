//! Logpage Library
//!
//! Expand/collapse behaviour for rendered conversation log pages: click
//! routing, per-node toggles, the page-wide token details flag and optional
//! hierarchy diagnostics.

pub mod config;
pub mod dispatch;
pub mod document;
pub mod hierarchy;
pub mod runner;
pub mod style;
pub mod toggle;
pub mod tokens;
pub mod trace;

pub use dispatch::{Controller, DispatchError, Interaction, TargetKind};
pub use document::{Document, NodeId};
