//! A Rust library for retrieving Danish address registry data from the DAWA
//! replication API and from Datafordeler, normalized into one set of records.

pub mod async_io;
pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod transport;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::{DatafordelerConfig, ReplicationConfig, TransportConfig};
pub use error::{DawaError, Result};
pub use models::{
    AccessAddress, AddressStatus, ChangeOperation, EntityChange, NamedRoadMunicipalDistrict,
    NamedRoadMunicipalDistrictStatus, PostCode, PostCodeStatus, Road, RoadStatus, TransactionCursor,
    UnitAddress,
};

// Clients
pub use registry::{
    CrossReferenceIndex, DatafordelerClient, DatafordelerEntity, FlatFileEntity, ReplicationClient,
    ReplicationEntity,
};

// Streaming and transport
pub use async_io::RecordStream;
pub use transport::{ByteStream, HttpTransport, Transport, TransportFuture};

// Cancellation tokens are part of every client signature
pub use tokio_util::sync::CancellationToken;
