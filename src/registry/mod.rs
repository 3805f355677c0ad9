//! Upstream address registries
//!
//! - [`replication`]: the DAWA replication API (transaction log)
//! - [`datafordeler`]: the DAR REST service and bulk files on Datafordeler

pub mod datafordeler;
pub mod geometry;
pub mod replication;
pub mod wire;

pub use datafordeler::{CrossReferenceIndex, DatafordelerClient, DatafordelerEntity, FlatFileEntity};
pub use replication::{ReplicationClient, ReplicationEntity};
