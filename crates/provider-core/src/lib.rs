//! Core types shared across the `uci-provider` workspace.

pub mod secret;
