//! DAWA replication API

pub mod client;
pub mod mapping;
pub mod wire;

pub use client::ReplicationClient;
pub use mapping::ReplicationEntity;
