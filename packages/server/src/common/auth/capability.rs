/// What an actor wants to do within an event.
///
/// Only two levels exist: any active member, or an active organizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventCapability {
    /// Read the event, its steps, members and own QR code
    ViewEvent,

    /// Delete the event
    ManageEvent,

    /// Invite, approve requests, change roles/payment, remove members
    ManageMembers,

    /// Create, update and delete itinerary steps
    ManageSteps,

    /// Record check-ins and scan QR codes
    RecordCheckIns,
}

impl EventCapability {
    pub fn requires_organizer(&self) -> bool {
        !matches!(self, EventCapability::ViewEvent)
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self {
            EventCapability::ViewEvent => "view this event",
            EventCapability::ManageEvent => "manage this event",
            EventCapability::ManageMembers => "manage members of this event",
            EventCapability::ManageSteps => "manage the itinerary of this event",
            EventCapability::RecordCheckIns => "record check-ins for this event",
        }
    }
}
