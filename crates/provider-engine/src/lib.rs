#![forbid(unsafe_code)]
#![deny(unreachable_pub)]
#![deny(missing_docs)]

//! Bridge between the lichess external-engine broker and a local UCI engine
//! (registration, work polling, analysis streaming).

/// Public API for the provider engine crate.
pub mod api;
/// Adapter around the UCI engine subprocess.
pub mod uci;

mod broker;
mod registry;
mod serve;

pub use api::{ProviderConfig, Work, run_provider};
pub use uci::{Analysis, UciEngine, UciError};
