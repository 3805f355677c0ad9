//! Common domain type definitions
//!
//! Status enums, the replication cursor and the change-feed wrapper shared by
//! all normalized records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::error::{DawaError, Result};
use crate::utils::datetime::deserialize_timestamp;

/// Lifecycle status of access addresses and unit addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressStatus {
    /// Provisional address, not yet in effect
    Pending,
    /// Address in effect
    Active,
    /// Address retired after having been in effect
    Discontinued,
    /// Address withdrawn before coming into effect
    Canceled,
}

/// Lifecycle status of named roads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoadStatus {
    /// Provisional road name
    Temporary,
    /// Road name in effect
    Effective,
    /// Road name retired
    Discontinued,
    /// Road name withdrawn
    Canceled,
}

/// Lifecycle status of postal codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostCodeStatus {
    /// Postal code in effect
    Active,
    /// Postal code retired
    Discontinued,
}

/// Lifecycle status of named road / municipality relations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedRoadMunicipalDistrictStatus {
    /// Provisional relation
    Temporary,
    /// Relation in effect
    Active,
    /// Relation retired
    Discontinued,
    /// Relation withdrawn
    Canceled,
}

/// Position in the replication log
///
/// Always strictly positive. Encodes as `{"txid": N}`, the shape the
/// replication API uses for transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "TransactionRecord", into = "TransactionRecord")]
pub struct TransactionCursor(u64);

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct TransactionRecord {
    txid: u64,
}

impl TransactionCursor {
    /// Create a cursor, rejecting 0
    pub fn new(id: u64) -> Result<Self> {
        if id == 0 {
            return Err(DawaError::validation("transaction id cannot be 0"));
        }
        Ok(Self(id))
    }

    /// The raw transaction id
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The first transaction id after this cursor
    #[must_use]
    pub const fn next_id(self) -> u64 {
        self.0.saturating_add(1)
    }
}

impl TryFrom<TransactionRecord> for TransactionCursor {
    type Error = DawaError;

    fn try_from(record: TransactionRecord) -> Result<Self> {
        Self::new(record.txid)
    }
}

impl From<TransactionCursor> for TransactionRecord {
    fn from(cursor: TransactionCursor) -> Self {
        Self { txid: cursor.0 }
    }
}

impl TryFrom<u64> for TransactionCursor {
    type Error = DawaError;

    fn try_from(id: u64) -> Result<Self> {
        Self::new(id)
    }
}

impl fmt::Display for TransactionCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of change recorded in the replication log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOperation {
    /// Record created
    Insert,
    /// Record modified
    Update,
    /// Record removed
    Delete,
}

/// One entry of a change feed: the record as it stood after the change
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EntityChange<T> {
    /// Transaction that made the change
    #[serde(rename = "txid", deserialize_with = "deserialize_cursor_id")]
    pub id: TransactionCursor,
    /// Insert, update or delete
    pub operation: ChangeOperation,
    /// Ordering of the change within the log
    #[serde(rename = "sekvensnummer")]
    pub sequence_number: u64,
    /// When the change happened
    #[serde(rename = "tidspunkt", deserialize_with = "deserialize_timestamp")]
    pub change_time: DateTime<Utc>,
    /// The record after the change
    pub data: T,
}

impl<T> EntityChange<T> {
    /// Map the payload, dropping the change when the mapper drops the record
    pub fn try_filter_map<U, F>(self, f: F) -> Result<Option<EntityChange<U>>>
    where
        F: FnOnce(T) -> Result<Option<U>>,
    {
        let Some(data) = f(self.data)? else {
            return Ok(None);
        };
        Ok(Some(EntityChange {
            id: self.id,
            operation: self.operation,
            sequence_number: self.sequence_number,
            change_time: self.change_time,
            data,
        }))
    }
}

fn deserialize_cursor_id<'de, D>(deserializer: D) -> std::result::Result<TransactionCursor, D::Error>
where
    D: Deserializer<'de>,
{
    let id = u64::deserialize(deserializer)?;
    TransactionCursor::new(id).map_err(de::Error::custom)
}
