use scopesync_types::ObjectId;

/// Lifecycle notification fanned out to scope listeners.
///
/// Applying a remote change-set dispatches, in order: `Prepare`, one
/// `Delete` per deleted object (before anything is removed), one `Create`
/// per created object and one `Update` per written property (after the
/// whole batch is applied), then `PostProcess`.
///
/// Local mutations dispatch `Create` after the object is registered,
/// `Update` before the new value is stored, and `Delete` before the object
/// is removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeEvent {
    Prepare,
    Create(ObjectId),
    Delete(ObjectId),
    Update { id: ObjectId, property: String },
    PostProcess,
}

/// The kind of a [`ScopeEvent`], without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Prepare,
    PostProcess,
    Create,
    Delete,
    Update,
}

impl ScopeEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ScopeEvent::Prepare => EventKind::Prepare,
            ScopeEvent::Create(_) => EventKind::Create,
            ScopeEvent::Delete(_) => EventKind::Delete,
            ScopeEvent::Update { .. } => EventKind::Update,
            ScopeEvent::PostProcess => EventKind::PostProcess,
        }
    }

    /// The object the event is about, if any.
    pub fn object_id(&self) -> Option<&ObjectId> {
        match self {
            ScopeEvent::Create(id) | ScopeEvent::Delete(id) | ScopeEvent::Update { id, .. } => {
                Some(id)
            }
            ScopeEvent::Prepare | ScopeEvent::PostProcess => None,
        }
    }
}
