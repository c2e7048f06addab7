//! Datamodel stubs that do not need a remote application
//!
//! - `MockDatamodel`: in-memory tree that records every call, for tests and
//!   the CLI's offline mode

pub mod mock;

pub use mock::{MockDatamodel, MockNode, RecordedCall};
