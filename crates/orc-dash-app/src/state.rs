// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{
    Action, Animation, EntityId, FrameStep, StatusLine, TreeView, parse_lines, strip_ansi,
};
use std::path::PathBuf;
use time::OffsetDateTime;

/// Terminal-independent keys the dashboard reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Up,
    Down,
    Enter,
    Esc,
    Interrupt,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveDown,
    MoveUp,
    ToggleExpansion,
    Yank,
    Focus,
    Open,
    Close,
    Send,
    Refresh,
    Quit,
}

pub fn command_for_key(key: Key) -> Option<Command> {
    match key {
        Key::Char('j') | Key::Down => Some(Command::MoveDown),
        Key::Char('k') | Key::Up => Some(Command::MoveUp),
        Key::Char('l') | Key::Enter => Some(Command::ToggleExpansion),
        Key::Char('y') => Some(Command::Yank),
        Key::Char('f') => Some(Command::Focus),
        Key::Char('o') => Some(Command::Open),
        Key::Char('c') => Some(Command::Close),
        Key::Char('g') => Some(Command::Send),
        Key::Char('r') => Some(Command::Refresh),
        Key::Char('q') | Key::Esc | Key::Interrupt => Some(Command::Quit),
        _ => None,
    }
}

/// Everything that can happen to the dashboard, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Key(Key),
    Resize {
        width: usize,
        height: usize,
    },
    RefreshTimer,
    Fetched {
        result: Result<String, String>,
        target: Option<EntityId>,
        fetched_at: OffsetDateTime,
    },
    Yanked {
        entity: EntityId,
        result: Result<(), String>,
    },
    /// `entity` is `None` when focus was cleared.
    FocusChanged {
        entity: Option<EntityId>,
        result: Result<(), String>,
    },
    Closed {
        entity: EntityId,
        result: Result<(), String>,
    },
    Sent {
        entity: EntityId,
        result: Result<(), String>,
    },
    DetailReady {
        entity: EntityId,
        result: Result<PathBuf, String>,
    },
    EditorExited {
        entity: EntityId,
        result: Result<(), String>,
    },
    StatusExpired {
        token: u64,
    },
    AnimationTick,
}

/// Work the runtime performs on the dashboard's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch { target: Option<EntityId> },
    Yank(EntityId),
    Focus(EntityId),
    ClearFocus,
    Close(EntityId),
    SendToPane(EntityId),
    LoadDetail(EntityId),
    /// Blocks the loop: the editor owns the terminal until it exits.
    LaunchEditor { entity: EntityId, path: PathBuf },
    ExpireStatus { token: u64 },
    AnimationTick,
    DetachHostSession,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardOptions {
    pub focused: Option<EntityId>,
    pub host_session: bool,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dashboard {
    pub view: TreeView,
    pub loaded: bool,
    pub fetch_error: Option<String>,
    pub status: StatusLine,
    pub animation: Animation,
    pub focused: Option<EntityId>,
    pub confirming_close: Option<EntityId>,
    pub host_session: bool,
    pub last_refreshed: Option<OffsetDateTime>,
}

impl Dashboard {
    pub fn new(options: DashboardOptions) -> Self {
        Self {
            view: TreeView::default(),
            loaded: false,
            fetch_error: None,
            status: StatusLine::default(),
            animation: Animation::with_seed(options.seed),
            focused: options.focused,
            confirming_close: None,
            host_session: options.host_session,
            last_refreshed: None,
        }
    }

    /// Effects to run before the first message arrives.
    pub fn start(&self) -> Vec<Effect> {
        vec![Effect::Fetch {
            target: self.focused.clone(),
        }]
    }

    pub fn cursor_entity(&self) -> Option<&EntityId> {
        self.view.cursor_entity()
    }

    /// Consumes one message and yields the next state with its effects.
    pub fn update(mut self, message: Message) -> (Self, Vec<Effect>) {
        let effects = self.apply(message);
        (self, effects)
    }

    fn apply(&mut self, message: Message) -> Vec<Effect> {
        match message {
            Message::Key(key) => self.handle_key(key),
            Message::Resize { width, height } => {
                self.view.resize(width, height.saturating_sub(1).max(1));
                Vec::new()
            }
            Message::RefreshTimer => {
                if self.animation.animating {
                    return Vec::new();
                }
                vec![self.fetch_here()]
            }
            Message::Fetched {
                result,
                target,
                fetched_at,
            } => {
                match result {
                    Ok(content) => {
                        self.fetch_error = None;
                        self.loaded = true;
                        self.last_refreshed = Some(fetched_at);
                        self.view.replace_tree(parse_lines(&content), target.as_ref());
                    }
                    Err(error) => self.fetch_error = Some(error),
                }
                Vec::new()
            }
            Message::Yanked { entity, result } => match result {
                Ok(()) => vec![self.set_status(format!("Copied {entity}"))],
                Err(error) => vec![self.set_status(format!("Copy failed for {entity}: {error}"))],
            },
            Message::FocusChanged { entity, result } => {
                if let Err(error) = result {
                    return vec![self.set_status(format!("Focus error: {error}"))];
                }
                let status = match &entity {
                    Some(id) => format!("Focused {id}"),
                    None => "Focus cleared".to_owned(),
                };
                self.focused = entity.clone();
                let target = entity.or_else(|| self.cursor_entity().cloned());
                vec![self.set_status(status), Effect::Fetch { target }]
            }
            Message::Closed { entity, result } => match result {
                Ok(()) => vec![
                    self.set_status(format!("Closed {entity}")),
                    Effect::Fetch {
                        target: Some(entity),
                    },
                ],
                Err(error) => vec![self.set_status(format!("Close error: {error}"))],
            },
            Message::Sent { entity, result } => match result {
                Ok(()) => vec![self.set_status(format!("Sent {entity} to goblin"))],
                Err(error) => vec![self.set_status(format!("Goblin error: {error}"))],
            },
            Message::DetailReady { entity, result } => match result {
                Ok(path) => vec![Effect::LaunchEditor { entity, path }],
                Err(error) => vec![self.set_status(format!("Open error: {error}"))],
            },
            Message::EditorExited { result, .. } => match result {
                Ok(()) => Vec::new(),
                Err(error) => vec![self.set_status(format!("Editor error: {error}"))],
            },
            Message::StatusExpired { token } => {
                self.status.expire(token);
                Vec::new()
            }
            Message::AnimationTick => self.advance_animation(),
        }
    }

    fn handle_key(&mut self, key: Key) -> Vec<Effect> {
        let command = command_for_key(key);

        if let Some(entity) = self.confirming_close.take() {
            return match key {
                Key::Interrupt => self.quit(),
                Key::Char('y') => vec![
                    self.set_status(format!("Closing {entity}...")),
                    Effect::Close(entity),
                ],
                _ => Vec::new(),
            };
        }

        let Some(command) = command else {
            return Vec::new();
        };
        if command == Command::Quit {
            return self.quit();
        }
        if self.animation.animating || (!self.loaded && self.fetch_error.is_none()) {
            return Vec::new();
        }
        if self.fetch_error.is_some() && command != Command::Refresh {
            return Vec::new();
        }

        match command {
            Command::MoveDown => {
                self.view.move_next();
                Vec::new()
            }
            Command::MoveUp => {
                self.view.move_previous();
                Vec::new()
            }
            Command::ToggleExpansion => {
                self.view.toggle_expansion();
                Vec::new()
            }
            Command::Yank => self
                .actionable(Action::Yank)
                .map(Effect::Yank)
                .into_iter()
                .collect(),
            Command::Focus => self.focus(),
            Command::Open => self
                .actionable(Action::Open)
                .map(Effect::LoadDetail)
                .into_iter()
                .collect(),
            Command::Close => {
                if let Some(entity) = self.actionable(Action::Close) {
                    self.confirming_close = Some(entity);
                }
                Vec::new()
            }
            Command::Send => {
                if !self.host_session {
                    return Vec::new();
                }
                self.actionable(Action::Send)
                    .map(Effect::SendToPane)
                    .into_iter()
                    .collect()
            }
            Command::Refresh => {
                self.animation.start();
                vec![Effect::AnimationTick]
            }
            Command::Quit => self.quit(),
        }
    }

    fn actionable(&self, action: Action) -> Option<EntityId> {
        self.cursor_entity()
            .filter(|entity| entity.allows(action))
            .cloned()
    }

    fn focus(&mut self) -> Vec<Effect> {
        let Some(entity) = self.actionable(Action::Focus) else {
            return Vec::new();
        };
        if self.focused.as_ref() == Some(&entity) {
            return vec![
                self.set_status(format!("Unfocusing {entity}...")),
                Effect::ClearFocus,
            ];
        }
        vec![
            self.set_status(format!("Focusing {entity}...")),
            Effect::Focus(entity),
        ]
    }

    fn quit(&self) -> Vec<Effect> {
        if self.host_session {
            vec![Effect::DetachHostSession, Effect::Quit]
        } else {
            vec![Effect::Quit]
        }
    }

    fn advance_animation(&mut self) -> Vec<Effect> {
        let base = self
            .view
            .window()
            .map(|(_, line)| strip_ansi(&line.text))
            .collect::<Vec<String>>();
        match self.animation.advance(&base, self.view.viewport.width) {
            FrameStep::Idle => Vec::new(),
            FrameStep::Continue => vec![Effect::AnimationTick],
            FrameStep::Finished => vec![self.fetch_here()],
        }
    }

    fn fetch_here(&self) -> Effect {
        Effect::Fetch {
            target: self.cursor_entity().cloned(),
        }
    }

    fn set_status(&mut self, message: String) -> Effect {
        let token = self.status.set(message);
        Effect::ExpireStatus { token }
    }
}
