//! Session: one guarded datamodel service per remote sub-system

use crate::error::ConnectError;
use crate::interceptor::TraceInterceptor;
use crate::service::{DatamodelService, ErrorPolicy};
use crate::stub::GrpcStub;
use meshlink_interface::{DatamodelStub, Subsystem};
use std::sync::Arc;
use std::time::Duration;
use tonic::transport::Endpoint;
use tracing::{debug, info};

/// Connection parameters for a session
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Address of the meshing application's gRPC server (e.g., "http://127.0.0.1:50055")
    pub endpoint: String,

    /// Upper bound on establishing the channel
    pub connect_timeout: Duration,

    /// Upper bound on any single call
    pub request_timeout: Duration,

    /// Sent as `x-meshlink-session` on every call when set
    pub session_id: Option<String>,

    /// Applied to both services
    pub error_policy: ErrorPolicy,
}

impl SessionOptions {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            session_id: None,
            error_policy: ErrorPolicy::default(),
        }
    }
}

/// Top-level handle on a running meshing application.
///
/// Holds one [`DatamodelService`] for the TUI menu tree and one for the
/// settings tree. Both share a single channel; the services are read-only
/// and shared by every proxy built from this session.
///
/// # Example
///
/// ```rust,no_run
/// use meshlink_connect::{Session, SessionOptions};
///
/// # async fn example() -> anyhow::Result<()> {
/// let session = Session::connect(&SessionOptions::new("http://127.0.0.1:50055")).await?;
/// println!("{:?}", session.tui());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    tui: Arc<DatamodelService>,
    settings: Arc<DatamodelService>,
}

impl Session {
    /// Open a channel to the application and wrap both sub-systems.
    pub async fn connect(options: &SessionOptions) -> Result<Self, ConnectError> {
        debug!("Connecting to datamodel server at {}", options.endpoint);

        let endpoint = Endpoint::from_shared(options.endpoint.clone())
            .map_err(|e| ConnectError::ConnectionFailed {
                endpoint: options.endpoint.clone(),
                reason: format!("Invalid endpoint: {}", e),
            })?
            .connect_timeout(options.connect_timeout)
            .timeout(options.request_timeout);

        let channel = endpoint
            .connect()
            .await
            .map_err(|e| ConnectError::ConnectionFailed {
                endpoint: options.endpoint.clone(),
                reason: format!("Connection failed: {}", e),
            })?;

        let session_id = options.session_id.as_deref();
        let tui = GrpcStub::new(
            channel.clone(),
            Subsystem::Tui,
            TraceInterceptor::new(Subsystem::Tui, session_id)?,
        );
        let settings = GrpcStub::new(
            channel,
            Subsystem::Settings,
            TraceInterceptor::new(Subsystem::Settings, session_id)?,
        );

        info!("Connected to datamodel server at {}", options.endpoint);

        Ok(Self::from_stubs(
            Arc::new(tui),
            Arc::new(settings),
            options.error_policy,
        ))
    }

    /// Build a session over arbitrary stubs (test doubles, in-process servers).
    pub fn from_stubs(
        tui: Arc<dyn DatamodelStub>,
        settings: Arc<dyn DatamodelStub>,
        policy: ErrorPolicy,
    ) -> Self {
        Self {
            tui: Arc::new(DatamodelService::new(tui, policy)),
            settings: Arc::new(DatamodelService::new(settings, policy)),
        }
    }

    pub fn tui(&self) -> &Arc<DatamodelService> {
        &self.tui
    }

    pub fn settings(&self) -> &Arc<DatamodelService> {
        &self.settings
    }

    pub fn service(&self, subsystem: Subsystem) -> &Arc<DatamodelService> {
        match subsystem {
            Subsystem::Tui => &self.tui,
            Subsystem::Settings => &self.settings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_options_defaults() {
        let options = SessionOptions::new("http://localhost:50055");
        assert_eq!(options.endpoint, "http://localhost:50055");
        assert_eq!(options.connect_timeout, Duration::from_secs(10));
        assert_eq!(options.request_timeout, Duration::from_secs(60));
        assert!(options.session_id.is_none());
        assert_eq!(options.error_policy, ErrorPolicy::Suppress);
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_endpoint() {
        let options = SessionOptions::new("not a uri");
        let result = Session::connect(&options).await;
        assert!(matches!(
            result,
            Err(ConnectError::ConnectionFailed { .. })
        ));
    }
}
