// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

use meshsdk_envelope::Envelope;

/// Decides whether an inbound envelope satisfies one required response of a
/// transaction. Implementations hold whatever state they need to recognize
/// their own reply (a request id, the expected sender, ...).
pub trait ResponseMatcher: Send {
    /// Offers one inbound envelope. Returns `true` once this matcher is
    /// satisfied; further offers after that are a no-op.
    fn offer(&mut self, envelope: &Envelope) -> bool;

    fn is_satisfied(&self) -> bool;
}

/// Matches the first envelope from a given sender address, once.
pub struct FromSender {
    expected: meshsdk_core::NodeAddress,
    satisfied: bool,
}

impl FromSender {
    #[must_use]
    pub fn new(expected: meshsdk_core::NodeAddress) -> Self {
        Self { expected, satisfied: false }
    }
}

impl ResponseMatcher for FromSender {
    fn offer(&mut self, envelope: &Envelope) -> bool {
        if self.satisfied {
            return true;
        }
        if envelope.sender.as_ref() == Some(&self.expected) {
            self.satisfied = true;
        }
        self.satisfied
    }

    fn is_satisfied(&self) -> bool {
        self.satisfied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshsdk_envelope::PayloadPath;
    use serde_json::Map;

    fn envelope_from(sender: &str) -> Envelope {
        Envelope {
            sender: Some(meshsdk_core::NodeAddress::new(sender)),
            destination: Vec::new(),
            encrypted: false,
            path: PayloadPath::default(),
            body: Map::new(),
            signature: None,
        }
    }

    #[test]
    fn matches_only_expected_sender() {
        let mut matcher = FromSender::new(meshsdk_core::NodeAddress::new("n1"));
        assert!(!matcher.offer(&envelope_from("other")));
        assert!(matcher.offer(&envelope_from("n1")));
        assert!(matcher.is_satisfied());
    }
}
