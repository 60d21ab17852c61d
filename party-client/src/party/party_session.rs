use crate::PartyError;
use party_core::{PartyCode, PartyRole, PeerId};

/// Session-level party state.
///
/// Host and join requests are pending until the relay confirms them with
/// `join_code` or `join_success`. A joiner's code is shown while pending
/// and discarded if the relay rejects it.
#[derive(Debug, Default)]
pub struct PartySession {
    code: Option<PartyCode>,
    role: PartyRole,
    confirmed: bool,
    host_id: Option<PeerId>,
}

impl PartySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn code(&self) -> Option<&PartyCode> {
        self.code.as_ref()
    }

    pub fn role(&self) -> PartyRole {
        self.role
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    pub fn host_id(&self) -> Option<&PeerId> {
        self.host_id.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.role != PartyRole::None
    }

    pub fn is_join_pending(&self) -> bool {
        self.role == PartyRole::Joiner && !self.confirmed
    }

    pub fn begin_host(&mut self) -> Result<(), PartyError> {
        if self.is_active() {
            return Err(PartyError::PartyActive);
        }
        self.role = PartyRole::Host;
        Ok(())
    }

    pub fn begin_join(&mut self, code: PartyCode) -> Result<(), PartyError> {
        if self.is_active() {
            return Err(PartyError::PartyActive);
        }
        self.role = PartyRole::Joiner;
        self.code = Some(code);
        Ok(())
    }

    /// Applies `join_code`. Returns false if we were not waiting for one.
    pub fn confirm_hosted(&mut self, code: PartyCode) -> bool {
        if self.role != PartyRole::Host || self.confirmed {
            return false;
        }
        self.code = Some(code);
        self.confirmed = true;
        true
    }

    /// Applies `join_success`, returning the confirmed code.
    pub fn confirm_joined(&mut self, host_id: PeerId) -> Option<PartyCode> {
        if !self.is_join_pending() {
            return None;
        }
        self.confirmed = true;
        self.host_id = Some(host_id);
        self.code.clone()
    }

    /// Applies `join_failed`. Returns the rejected code, or `None` if no
    /// join was pending.
    pub fn join_failed(&mut self) -> Option<PartyCode> {
        if !self.is_join_pending() {
            return None;
        }
        let code = self.code.take();
        self.reset();
        code
    }

    /// Reacts to a peer going away. A joiner cannot stay in a party whose
    /// host is gone, so that case resets the session and returns true.
    pub fn peer_closed(&mut self, peer_id: &PeerId) -> bool {
        if self.role != PartyRole::Joiner || self.host_id.as_ref() != Some(peer_id) {
            return false;
        }
        self.reset();
        true
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
