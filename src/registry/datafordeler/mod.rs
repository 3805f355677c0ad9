//! Datafordeler DAR REST service and bulk files

pub mod client;
pub mod mapping;
pub mod wire;
pub mod xref;

pub use client::DatafordelerClient;
pub use mapping::{DatafordelerEntity, FlatFileEntity};
pub use xref::{AddressPointLocation, CrossReferenceIndex, CrossReferenceIndexBuilder};
