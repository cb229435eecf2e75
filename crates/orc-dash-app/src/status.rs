// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

/// Transient status text. Every `set` bumps a generation token; an expiry
/// only clears the message it was scheduled for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusLine {
    message: Option<String>,
    token: u64,
}

impl StatusLine {
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn token(&self) -> u64 {
        self.token
    }

    /// Replaces the message and returns the token its expiry must carry.
    pub fn set(&mut self, message: impl Into<String>) -> u64 {
        self.message = Some(message.into());
        self.token = self.token.wrapping_add(1);
        self.token
    }

    pub fn expire(&mut self, token: u64) -> bool {
        if token != self.token || self.message.is_none() {
            return false;
        }
        self.message = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::StatusLine;

    #[test]
    fn expiry_clears_current_message() {
        let mut status = StatusLine::default();
        let token = status.set("Copied SHIP-412");
        assert_eq!(status.message(), Some("Copied SHIP-412"));

        assert!(status.expire(token));
        assert_eq!(status.message(), None);
    }

    #[test]
    fn stale_expiry_keeps_newer_message() {
        let mut status = StatusLine::default();
        let stale = status.set("Focusing SHIP-412...");
        let fresh = status.set("Focused SHIP-412");

        assert!(!status.expire(stale));
        assert_eq!(status.message(), Some("Focused SHIP-412"));
        assert!(status.expire(fresh));
    }

    #[test]
    fn expiring_twice_is_harmless() {
        let mut status = StatusLine::default();
        let token = status.set("x");
        assert!(status.expire(token));
        assert!(!status.expire(token));
    }
}
