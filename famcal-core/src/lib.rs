//! Core types for the famcal proxy.
//!
//! This crate provides the provider-neutral pieces shared by the proxy
//! server and its tests:
//! - `event` types for event requests and backend event listings
//! - `adapter` for shaping backend-specific payloads
//! - `backend` traits for the hub's service dispatcher and entities
//! - `invoker` for the ordered fallback chains across backends
//! - `registry` for calendar display configuration

pub mod adapter;
pub mod backend;
pub mod capability;
pub mod error;
pub mod event;
pub mod invoker;
pub mod registry;

pub use adapter::{NormalizedEvent, NormalizedTime};
pub use capability::CapabilityTable;
pub use error::{Attempt, BackendError, InvokeError};
pub use event::{BackendEvent, EventRequest, EventTime};
pub use invoker::{FallbackInvoker, PROPAGATION_DELAY};
pub use registry::{CalendarRegistration, ConfigRegistry};
