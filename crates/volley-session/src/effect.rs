use std::time::Duration;

use volley_protocol::{MatchSummary, SessionId};

use crate::TimerId;

/// Work the registry needs done outside itself.
///
/// The registry never spawns tasks or talks to the network; it returns
/// effects and whoever drives it carries them out in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Start the session's tick loop.
    StartLoop(SessionId),
    /// Cancel the session's tick loop.
    StopLoop(SessionId),
    /// Fire a grace expiry for `session_id` carrying `timer` after `after`.
    ArmGrace {
        session_id: SessionId,
        timer: TimerId,
        after: Duration,
    },
    /// Cancel a previously armed grace timer.
    CancelGrace(TimerId),
    /// Hand a finished match to the history service.
    Report(MatchSummary),
}
