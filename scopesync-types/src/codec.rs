//! JSON codec for change-sets and snapshots.
//!
//! Readers stream from any [`io::Read`], writers stream into any
//! [`io::Write`]. The schema is strict: unknown properties, nested lists and
//! malformed references fail with [`Error::MalformedJson`](crate::Error).

use crate::{Changes, Result, Snapshot};
use std::io;

/// Reads a change-set.
pub fn read_changes<R: io::Read>(reader: R) -> Result<Changes> {
    Ok(serde_json::from_reader(reader)?)
}

/// Writes a change-set.
pub fn write_changes<W: io::Write>(writer: W, changes: &Changes) -> Result<()> {
    serde_json::to_writer(writer, changes)?;
    Ok(())
}

pub fn changes_from_str(json: &str) -> Result<Changes> {
    Ok(serde_json::from_str(json)?)
}

pub fn changes_to_string(changes: &Changes) -> Result<String> {
    Ok(serde_json::to_string(changes)?)
}

/// Reads a full snapshot.
pub fn read_snapshot<R: io::Read>(reader: R) -> Result<Snapshot> {
    Ok(serde_json::from_reader(reader)?)
}

/// Writes a full snapshot.
pub fn write_snapshot<W: io::Write>(writer: W, snapshot: &Snapshot) -> Result<()> {
    serde_json::to_writer(writer, snapshot)?;
    Ok(())
}

pub fn snapshot_from_str(json: &str) -> Result<Snapshot> {
    Ok(serde_json::from_str(json)?)
}

pub fn snapshot_to_string(snapshot: &Snapshot) -> Result<String> {
    Ok(serde_json::to_string(snapshot)?)
}
