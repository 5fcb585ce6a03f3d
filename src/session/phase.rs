// Session phase - forward-only lifecycle of one capture session
//
// Idle → Capturing → Finalizing → Reported
//
// A session never moves backwards; a new capture always starts a new session.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No session has been started yet
    Idle,
    /// Frames are being accumulated
    Capturing,
    /// End of stream received, metrics being computed
    Finalizing,
    /// Metrics and verdict available, immutable
    Reported,
}

impl SessionPhase {
    /// The only phase this one may advance to
    pub fn next(self) -> Option<SessionPhase> {
        match self {
            SessionPhase::Idle => Some(SessionPhase::Capturing),
            SessionPhase::Capturing => Some(SessionPhase::Finalizing),
            SessionPhase::Finalizing => Some(SessionPhase::Reported),
            SessionPhase::Reported => None,
        }
    }

    pub fn can_transition_to(self, target: SessionPhase) -> bool {
        self.next() == Some(target)
    }

    pub fn accepts_frames(self) -> bool {
        self == SessionPhase::Capturing
    }

    pub fn has_report(self) -> bool {
        self == SessionPhase::Reported
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Capturing => "capturing",
            SessionPhase::Finalizing => "finalizing",
            SessionPhase::Reported => "reported",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_only() {
        assert!(SessionPhase::Idle.can_transition_to(SessionPhase::Capturing));
        assert!(SessionPhase::Capturing.can_transition_to(SessionPhase::Finalizing));
        assert!(SessionPhase::Finalizing.can_transition_to(SessionPhase::Reported));

        assert!(!SessionPhase::Capturing.can_transition_to(SessionPhase::Idle));
        assert!(!SessionPhase::Reported.can_transition_to(SessionPhase::Capturing));
        assert!(!SessionPhase::Idle.can_transition_to(SessionPhase::Reported));
        assert_eq!(SessionPhase::Reported.next(), None);
    }

    #[test]
    fn test_only_capturing_accepts_frames() {
        assert!(SessionPhase::Capturing.accepts_frames());
        assert!(!SessionPhase::Idle.accepts_frames());
        assert!(!SessionPhase::Reported.accepts_frames());
        assert!(SessionPhase::Reported.has_report());
    }
}
