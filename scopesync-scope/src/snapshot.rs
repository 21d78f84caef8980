//! Full-scope dump and load.

use crate::{Scope, ScopeError, ScopeEvent, ScopeResult};
use scopesync_types::{codec, ObjectId, ObjectState, Snapshot, Value};
use std::io;
use tracing::debug;

impl Scope {
    /// Dumps every object with its persistent properties, in registration
    /// order, together with the id high-water-mark.
    pub fn write_snapshot(&self) -> Snapshot {
        let objects = self
            .objects()
            .filter_map(|object| {
                let id = object.id()?.clone();
                let descriptor = self.registry().get(object.type_name());
                let properties = object
                    .persistent_properties(descriptor)
                    .map(|(name, value)| (name.to_string(), value.clone()))
                    .collect();
                Some(ObjectState {
                    id,
                    type_name: object.type_name().to_string(),
                    properties,
                })
            })
            .collect();
        Snapshot {
            objects,
            last_id: Some(self.last_id()),
        }
    }

    /// Loads a snapshot into this scope without tracking it as local
    /// changes.
    ///
    /// Runs in three phases so that references between objects of the same
    /// snapshot always resolve: register an empty stub per object, resolve
    /// every property value against the now complete id index, then write
    /// the values. Listeners get `Prepare`, one `Create` per object, and
    /// `PostProcess`.
    pub fn read_snapshot(&mut self, snapshot: &Snapshot) -> ScopeResult<()> {
        if self.is_replaying() {
            return Err(ScopeError::ReplayActive);
        }

        for state in &snapshot.objects {
            self.insert_stub(state.id.clone(), state.type_name.clone())?;
        }
        if let Some(last_id) = snapshot.last_id {
            self.bump_id_source(last_id);
        }

        let mut resolved: Vec<(&ObjectId, &str, Value)> = Vec::new();
        for state in &snapshot.objects {
            for (property, value) in &state.properties {
                self.check_value(property, value)?;
                resolved.push((&state.id, property.as_str(), value.clone()));
            }
        }

        for (id, property, value) in resolved {
            self.write_raw(id, property, value);
        }

        self.fire(ScopeEvent::Prepare);
        for state in &snapshot.objects {
            self.fire(ScopeEvent::Create(state.id.clone()));
        }
        self.fire(ScopeEvent::PostProcess);

        debug!(
            objects = snapshot.objects.len(),
            last_id = self.last_id(),
            "loaded snapshot"
        );
        Ok(())
    }

    /// Writes [`Scope::write_snapshot`] as JSON.
    pub fn write_to<W: io::Write>(&self, writer: W) -> ScopeResult<()> {
        codec::write_snapshot(writer, &self.write_snapshot())?;
        Ok(())
    }

    /// Reads a JSON snapshot and loads it with [`Scope::read_snapshot`].
    pub fn read_from<R: io::Read>(&mut self, reader: R) -> ScopeResult<()> {
        let snapshot = codec::read_snapshot(reader)?;
        self.read_snapshot(&snapshot)
    }
}
