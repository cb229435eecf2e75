// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Commission,
    Shipment,
    Task,
    Note,
    Tome,
    Plan,
    Workshop,
    Workbench,
}

/// What an operator may do with an entity of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub expandable: bool,
    pub yank: bool,
    pub open: bool,
    pub focus: bool,
    pub close: bool,
    pub send: bool,
}

impl Capabilities {
    const fn new(expandable: bool, open: bool, focus: bool, close: bool) -> Self {
        Self {
            expandable,
            yank: true,
            open,
            focus,
            close,
            send: true,
        }
    }

    pub const fn allows(self, action: Action) -> bool {
        match action {
            Action::Yank => self.yank,
            Action::Open => self.open,
            Action::Focus => self.focus,
            Action::Close => self.close,
            Action::Send => self.send,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Yank,
    Open,
    Focus,
    Close,
    Send,
}

impl EntityKind {
    pub const ALL: [Self; 8] = [
        Self::Commission,
        Self::Shipment,
        Self::Task,
        Self::Note,
        Self::Tome,
        Self::Plan,
        Self::Workshop,
        Self::Workbench,
    ];

    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Commission => "COMM",
            Self::Shipment => "SHIP",
            Self::Task => "TASK",
            Self::Note => "NOTE",
            Self::Tome => "TOME",
            Self::Plan => "PLAN",
            Self::Workshop => "WORK",
            Self::Workbench => "BENCH",
        }
    }

    /// Subcommand of the data source that owns this kind (`<sub> show <ID>`).
    pub const fn subcommand(self) -> &'static str {
        match self {
            Self::Commission => "commission",
            Self::Shipment => "shipment",
            Self::Task => "task",
            Self::Note => "note",
            Self::Tome => "tome",
            Self::Plan => "plan",
            Self::Workshop => "workshop",
            Self::Workbench => "workbench",
        }
    }

    pub const fn capabilities(self) -> Capabilities {
        match self {
            Self::Commission => Capabilities::new(true, true, true, false),
            Self::Shipment => Capabilities::new(true, true, true, true),
            Self::Task => Capabilities::new(false, true, false, true),
            Self::Note => Capabilities::new(false, true, true, false),
            Self::Tome => Capabilities::new(true, true, true, false),
            Self::Plan => Capabilities::new(false, true, false, false),
            Self::Workshop => Capabilities::new(false, false, false, false),
            Self::Workbench => Capabilities::new(false, false, false, false),
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.prefix() == prefix)
    }
}

/// A `PREFIX-<digits>` identifier recognized in summary output.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    pub fn parse(raw: &str) -> Result<Self> {
        let (prefix, digits) = raw
            .split_once('-')
            .ok_or_else(|| anyhow!("entity id {raw:?} must look like PREFIX-123"))?;
        if EntityKind::from_prefix(prefix).is_none() {
            return Err(anyhow!(
                "entity id {raw:?} has unknown prefix {prefix:?}; expected one of COMM, SHIP, TASK, NOTE, TOME, PLAN, WORK, BENCH"
            ));
        }
        if digits.is_empty() || !digits.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(anyhow!("entity id {raw:?} must end in digits"));
        }
        Ok(Self(raw.to_owned()))
    }

    /// For tokens already matched by the summary parser's identifier pattern.
    pub(crate) fn recognized(raw: &str) -> Self {
        Self(raw.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn prefix(&self) -> &str {
        self.0.split_once('-').map_or("", |(prefix, _)| prefix)
    }

    pub fn kind(&self) -> Option<EntityKind> {
        EntityKind::from_prefix(self.prefix())
    }

    pub fn capabilities(&self) -> Option<Capabilities> {
        self.kind().map(EntityKind::capabilities)
    }

    pub fn allows(&self, action: Action) -> bool {
        self.capabilities()
            .is_some_and(|capabilities| capabilities.allows(action))
    }

    pub fn is_expandable(&self) -> bool {
        self.capabilities()
            .is_some_and(|capabilities| capabilities.expandable)
    }

    /// `None` when the kind has no detail view.
    pub fn show_subcommand(&self) -> Option<&'static str> {
        self.kind()
            .filter(|kind| kind.capabilities().open)
            .map(EntityKind::subcommand)
    }

    /// `None` when the kind cannot be completed from the dashboard.
    pub fn close_subcommand(&self) -> Option<&'static str> {
        self.kind()
            .filter(|kind| kind.capabilities().close)
            .map(EntityKind::subcommand)
    }
}

impl TryFrom<String> for EntityId {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<EntityId> for String {
    fn from(value: EntityId) -> Self {
        value.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, EntityId, EntityKind};
    use anyhow::Result;

    #[test]
    fn containers_are_the_only_expandable_kinds() -> Result<()> {
        for (raw, expected) in [
            ("COMM-001", true),
            ("SHIP-412", true),
            ("TOME-001", true),
            ("TASK-100", false),
            ("NOTE-001", false),
            ("PLAN-001", false),
            ("BENCH-001", false),
            ("WORK-001", false),
        ] {
            assert_eq!(EntityId::parse(raw)?.is_expandable(), expected, "{raw}");
        }
        Ok(())
    }

    #[test]
    fn every_kind_can_be_yanked_and_sent() {
        for kind in EntityKind::ALL {
            let capabilities = kind.capabilities();
            assert!(capabilities.allows(Action::Yank), "{kind:?}");
            assert!(capabilities.allows(Action::Send), "{kind:?}");
        }
    }

    #[test]
    fn focus_and_close_follow_the_capability_table() -> Result<()> {
        let ship = EntityId::parse("SHIP-412")?;
        assert!(ship.allows(Action::Focus));
        assert!(ship.allows(Action::Close));

        let task = EntityId::parse("TASK-100")?;
        assert!(!task.allows(Action::Focus));
        assert!(task.allows(Action::Close));

        let note = EntityId::parse("NOTE-001")?;
        assert!(note.allows(Action::Focus));
        assert!(!note.allows(Action::Close));
        Ok(())
    }

    #[test]
    fn show_subcommand_is_absent_for_workshops_and_benches() -> Result<()> {
        assert_eq!(
            EntityId::parse("SHIP-412")?.show_subcommand(),
            Some("shipment")
        );
        assert_eq!(EntityId::parse("PLAN-003")?.show_subcommand(), Some("plan"));
        assert_eq!(EntityId::parse("WORK-004")?.show_subcommand(), None);
        assert_eq!(EntityId::parse("BENCH-051")?.show_subcommand(), None);
        Ok(())
    }

    #[test]
    fn parse_rejects_unknown_prefixes_and_missing_digits() {
        let error = EntityId::parse("DOG-1").expect_err("unknown prefix should fail");
        assert!(error.to_string().contains("unknown prefix"));

        let error = EntityId::parse("SHIP-").expect_err("missing digits should fail");
        assert!(error.to_string().contains("digits"));

        let error = EntityId::parse("SHIP412").expect_err("missing dash should fail");
        assert!(error.to_string().contains("PREFIX-123"));
    }

    #[test]
    fn prefix_round_trips_through_kind_table() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_prefix(kind.prefix()), Some(kind));
        }
        assert_eq!(EntityKind::from_prefix("DOG"), None);
    }
}
