/// Protocol definitions for the remote meshing datamodel.
///
/// The message types mirror what `prost-build` emits for
/// `meshlink/datamodel/v1/datamodel.proto`; they are kept in-tree so the
/// workspace builds without `protoc`.
pub mod meshlink {
    pub mod datamodel {
        pub mod v1 {
            include!("datamodel.v1.rs");
        }
    }
}

// Re-export commonly used types for convenience
pub use meshlink::datamodel::v1::*;
