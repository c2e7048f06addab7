//! Meshlink Connect: client-side gRPC connectivity to the meshing datamodel
//!
//! This crate owns everything between the proxy layer and the wire.
//!
//! # Architecture
//!
//! - **GrpcStub**: implements `DatamodelStub` by forwarding to a tonic client
//! - **TraceInterceptor**: logs each call and attaches the session header
//! - **DatamodelService**: transport-error guard with a configurable `ErrorPolicy`
//! - **Session**: one `DatamodelService` per remote sub-system (TUI, settings)
//!
//! # Example
//!
//! ```rust,no_run
//! use meshlink_connect::{ErrorPolicy, Session, SessionOptions};
//! use meshlink_proto::GetStateRequest;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let mut options = SessionOptions::new("http://127.0.0.1:50055");
//!     options.error_policy = ErrorPolicy::Propagate;
//!     let session = Session::connect(&options).await?;
//!
//!     let response = session
//!         .settings()
//!         .get_state(GetStateRequest { path: "/setup".to_string() })
//!         .await?;
//!     println!("{:?}", response.state);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod interceptor;
pub mod service;
pub mod session;
pub mod stub;

pub use error::ConnectError;
pub use interceptor::{TraceInterceptor, SESSION_HEADER};
pub use service::{DatamodelService, ErrorPolicy};
pub use session::{Session, SessionOptions};
pub use stub::GrpcStub;
