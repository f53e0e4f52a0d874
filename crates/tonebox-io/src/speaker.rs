//! Speaker power stand-in for hosts without an amplifier enable line.

use tonebox_core::SpeakerControl;

/// Records the requested speaker state.
///
/// A desktop sound card has no power rail to switch; the request is logged
/// and remembered so callers can check it.
#[derive(Debug, Default, Clone)]
pub struct HostSpeaker {
    enabled: bool,
    changes: u32,
}

impl HostSpeaker {
    /// Create a speaker that starts disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last requested state.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of enable/disable requests received.
    pub fn changes(&self) -> u32 {
        self.changes
    }
}

impl SpeakerControl for HostSpeaker {
    fn set_speaker_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.changes += 1;
        tracing::debug!(enabled, "speaker power");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_state() {
        let mut speaker = HostSpeaker::new();
        assert!(!speaker.is_enabled());
        speaker.set_speaker_enabled(true);
        assert!(speaker.is_enabled());
        assert_eq!(speaker.changes(), 1);
    }
}
