//! Tracing interceptor attached to every datamodel channel

use meshlink_interface::Subsystem;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::service::Interceptor;
use tonic::{Request, Status};
use tracing::trace;

use crate::error::ConnectError;

/// Metadata key carrying the client session id
pub const SESSION_HEADER: &str = "x-meshlink-session";

/// Logs each outgoing call and tags it with the session id, if one is set.
#[derive(Debug, Clone)]
pub struct TraceInterceptor {
    subsystem: Subsystem,
    session_id: Option<MetadataValue<Ascii>>,
}

impl TraceInterceptor {
    pub fn new(subsystem: Subsystem, session_id: Option<&str>) -> Result<Self, ConnectError> {
        let session_id = match session_id {
            Some(id) => Some(id.parse::<MetadataValue<Ascii>>()?),
            None => None,
        };
        Ok(Self {
            subsystem,
            session_id,
        })
    }
}

impl Interceptor for TraceInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        trace!(
            service = self.subsystem.service_name(),
            "outgoing datamodel call"
        );
        if let Some(ref session_id) = self.session_id {
            request
                .metadata_mut()
                .insert(SESSION_HEADER, session_id.clone());
        }
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_header_is_attached() {
        let mut interceptor = TraceInterceptor::new(Subsystem::Tui, Some("session-42")).unwrap();
        let request = interceptor.call(Request::new(())).unwrap();
        let value = request.metadata().get(SESSION_HEADER).unwrap();
        assert_eq!(value.to_str().unwrap(), "session-42");
    }

    #[test]
    fn test_no_session_header_without_session() {
        let mut interceptor = TraceInterceptor::new(Subsystem::Settings, None).unwrap();
        let request = interceptor.call(Request::new(())).unwrap();
        assert!(request.metadata().get(SESSION_HEADER).is_none());
    }

    #[test]
    fn test_invalid_session_id_is_rejected() {
        let result = TraceInterceptor::new(Subsystem::Tui, Some("bad\nsession"));
        assert!(matches!(result, Err(ConnectError::InvalidMetadata(_))));
    }
}
