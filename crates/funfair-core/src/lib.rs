//! Core types and traits for the Funfair simulation pipeline.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions shared by the engine and replay crates:
//! strongly-typed IDs, the [`Action`] data model, action results and
//! error kinds, checksum hashing helpers, and the observer traits
//! through which external services watch the simulation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod action;
pub mod error;
pub mod hash;
pub mod id;
pub mod result;
pub mod traits;

pub use action::{Action, ActionFlags, ActionKind, ActionParams, ParamKey, ParamValue};
pub use error::{ActionError, SessionError};
pub use id::{EntityId, PeerId, TickId};
pub use result::{ActionReceipt, ActionResult};
pub use traits::{ActionObserver, SimObserver, TickObserver};
