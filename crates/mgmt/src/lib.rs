// Path: crates/mgmt/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # NDN Kernel Management
//!
//! The server side of the management protocol: a request dispatcher that
//! multiplexes a name namespace into Control Commands, Status Datasets,
//! and Notification Streams, authorizing each request, segmenting and
//! signing responses, and serving retransmissions from an in-memory
//! store.

/// Authorization of incoming management requests.
pub mod authorization;
/// ControlParameters trait and the raw-block parameter carrier.
pub mod control_parameters;
/// The ControlResponse carried in command replies and producer Nacks.
pub mod control_response;
/// The request dispatcher.
pub mod dispatcher;
/// FIFO in-memory Data store for retransmissions.
pub mod in_memory_storage;
/// The segmenting response context for Status Dataset handlers.
pub mod status_dataset_context;

pub use authorization::{make_accept_all_authorization, Authorization, AuthorizationResult, RejectReply};
pub use control_parameters::{ControlParametersBase, RawParameters};
pub use control_response::ControlResponse;
pub use dispatcher::Dispatcher;
pub use status_dataset_context::StatusDatasetContext;
