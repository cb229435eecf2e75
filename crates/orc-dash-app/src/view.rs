// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Action, Dashboard, EntityId};
use time::macros::format_description;

/// Everything the renderer needs for one frame, free of terminal types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub body: Body,
    pub status: StatusBar,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Loading,
    Error(String),
    Lines(Vec<BodyLine>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyLine {
    pub text: String,
    pub selected: bool,
    /// True for animation frames, whose text carries no styling codes.
    pub plain: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusBar {
    Confirm(EntityId),
    Message(String),
    Animating,
    Hints {
        hints: Vec<KeyHint>,
        refreshed_at: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyHint {
    pub key: &'static str,
    pub label: &'static str,
    pub active: bool,
}

impl KeyHint {
    const fn new(key: &'static str, label: &'static str, active: bool) -> Self {
        Self { key, label, active }
    }
}

pub fn screen(dashboard: &Dashboard) -> Screen {
    Screen {
        body: body(dashboard),
        status: status_bar(dashboard),
    }
}

fn body(dashboard: &Dashboard) -> Body {
    if let Some(error) = &dashboard.fetch_error {
        return Body::Error(format!("Error: {error}\n\nPress q to quit."));
    }
    if !dashboard.loaded {
        return Body::Loading;
    }

    let cursor_line = dashboard.view.cursor_line();
    let overlay = dashboard
        .animation
        .animating
        .then(|| dashboard.animation.overlay())
        .flatten();
    let lines = dashboard
        .view
        .window()
        .enumerate()
        .map(|(row, (index, line))| {
            let sparkled = overlay.and_then(|rows| rows.get(row));
            BodyLine {
                text: sparkled.unwrap_or(&line.text).clone(),
                selected: Some(index) == cursor_line,
                plain: sparkled.is_some(),
            }
        })
        .collect();
    Body::Lines(lines)
}

/// Priority: close confirmation, transient message, animation, hints.
pub fn status_bar(dashboard: &Dashboard) -> StatusBar {
    if let Some(entity) = &dashboard.confirming_close {
        return StatusBar::Confirm(entity.clone());
    }
    if let Some(message) = dashboard.status.message() {
        return StatusBar::Message(message.to_owned());
    }
    if dashboard.animation.animating {
        return StatusBar::Animating;
    }
    StatusBar::Hints {
        hints: key_hints(dashboard),
        refreshed_at: dashboard.last_refreshed.and_then(|at| {
            at.format(format_description!("[hour]:[minute]:[second]"))
                .ok()
        }),
    }
}

/// Fixed order; unavailable actions stay in place but inactive.
pub fn key_hints(dashboard: &Dashboard) -> Vec<KeyHint> {
    let entity = dashboard.cursor_entity();
    let allows = |action: Action| entity.is_some_and(|id| id.allows(action));
    let expandable = entity.is_some_and(EntityId::is_expandable);
    let expanded = entity.is_some_and(|id| dashboard.view.expansion().is_expanded(id));
    let focused = entity.is_some() && entity == dashboard.focused.as_ref();

    vec![
        KeyHint::new("j/k", "navigate", true),
        KeyHint::new("y", "yank", allows(Action::Yank)),
        KeyHint::new("o", "open", allows(Action::Open)),
        KeyHint::new(
            "f",
            if focused { "unfocus" } else { "focus" },
            allows(Action::Focus),
        ),
        KeyHint::new("c", "close", allows(Action::Close)),
        KeyHint::new("g", "goblin", dashboard.host_session && allows(Action::Send)),
        KeyHint::new("r", "refresh", true),
        KeyHint::new(
            "l",
            if expandable && expanded { "collapse" } else { "expand" },
            expandable,
        ),
        KeyHint::new("q", "quit", true),
    ]
}
