// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod ansi;
pub mod effects;
pub mod render;
pub mod terminal;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use effects::{Control, Dispatcher, discard_scratch, error_text, spawn_refresh_timer};
use orc_dash_app::{Dashboard, Effect, EntityId, Key, Message, screen};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;
use terminal::{DashTerminal, hand_off};
use time::OffsetDateTime;
use tracing::{info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(120);

/// External collaborators. Every call may run on a background thread.
pub trait AppRuntime: Send + Sync + 'static {
    /// Raw summary text, styling codes included.
    fn fetch_summary(&self) -> Result<String>;
    fn copy_to_clipboard(&self, text: &str) -> Result<()>;
    fn focus(&self, entity: &EntityId) -> Result<()>;
    fn clear_focus(&self) -> Result<()>;
    fn close(&self, entity: &EntityId) -> Result<()>;
    fn send_to_pane(&self, entity: &EntityId) -> Result<()>;
    /// Writes the entity's detail view to a fresh scratch file.
    fn write_detail(&self, entity: &EntityId) -> Result<PathBuf>;
    /// Blocks until the editor exits. The caller owns the terminal state.
    fn launch_editor(&self, path: &Path) -> Result<()>;
    fn detach_host_session(&self) -> Result<()>;

    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TuiOptions {
    /// `None` disables periodic refresh.
    pub refresh_interval: Option<Duration>,
    pub status_duration: Duration,
    pub frame_duration: Duration,
}

impl Default for TuiOptions {
    fn default() -> Self {
        Self {
            refresh_interval: Some(Duration::from_secs(30)),
            status_duration: Duration::from_secs(2),
            frame_duration: Duration::from_millis(125),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Quit,
}

/// The serial message loop, minus the terminal. Messages are applied in
/// arrival order; effects leave through the dispatcher.
pub struct Session<R: AppRuntime> {
    dashboard: Dashboard,
    dispatcher: Dispatcher<R>,
    rx: Receiver<Message>,
    pending: VecDeque<Message>,
}

impl<R: AppRuntime> Session<R> {
    pub fn new(dashboard: Dashboard, runtime: Arc<R>, options: TuiOptions) -> Self {
        let (tx, rx) = mpsc::channel();
        if let Some(interval) = options.refresh_interval {
            spawn_refresh_timer(tx.clone(), interval);
        }
        Self {
            dashboard,
            dispatcher: Dispatcher::new(runtime, tx, options),
            rx,
            pending: VecDeque::new(),
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn start<H>(&mut self, handoff: H) -> Step
    where
        H: FnMut(&R, &Path) -> Result<()>,
    {
        let effects = self.dashboard.start();
        self.run_effects(effects, handoff)
    }

    pub fn push(&mut self, message: Message) {
        self.pending.push_back(message);
    }

    /// Queues everything background work has reported so far.
    pub fn collect(&mut self) {
        while let Ok(message) = self.rx.try_recv() {
            self.pending.push_back(message);
        }
    }

    /// Waits up to `timeout` for one background message.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(message) => {
                self.pending.push_back(message);
                true
            }
            Err(_) => false,
        }
    }

    /// Applies queued messages. `handoff` runs the editor on the loop
    /// thread; its scratch file is removed afterwards whatever the outcome.
    pub fn pump<H>(&mut self, mut handoff: H) -> Step
    where
        H: FnMut(&R, &Path) -> Result<()>,
    {
        while let Some(message) = self.pending.pop_front() {
            let (next, effects) = std::mem::take(&mut self.dashboard).update(message);
            self.dashboard = next;
            if self.run_effects(effects, &mut handoff) == Step::Quit {
                return Step::Quit;
            }
        }
        Step::Continue
    }

    fn run_effects<H>(&mut self, effects: Vec<Effect>, mut handoff: H) -> Step
    where
        H: FnMut(&R, &Path) -> Result<()>,
    {
        for effect in effects {
            match self.dispatcher.dispatch(effect) {
                Control::Continue => {}
                Control::Quit => return Step::Quit,
                Control::Editor { entity, path } => {
                    info!(entity_id = %entity, path = %path.display(), "opening editor");
                    let result = handoff(self.dispatcher.runtime(), &path)
                        .map_err(error_text);
                    if let Err(error) = fs::remove_file(&path) {
                        warn!(path = %path.display(), %error, "removing scratch file failed");
                    }
                    self.pending
                        .push_back(Message::EditorExited { entity, result });
                }
            }
        }
        Step::Continue
    }
}

/// Scratch files of details still queued when the loop ends are removed;
/// later arrivals are removed by the dispatcher once the inbox is gone.
impl<R: AppRuntime> Drop for Session<R> {
    fn drop(&mut self) {
        self.collect();
        for message in self.pending.drain(..) {
            discard_scratch(&message);
        }
    }
}

pub fn translate_key(key: KeyEvent) -> Key {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Key::Interrupt;
    }
    match key.code {
        KeyCode::Char(ch) => Key::Char(ch),
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Esc,
        _ => Key::Other,
    }
}

pub fn run_app<R: AppRuntime>(
    dashboard: Dashboard,
    runtime: Arc<R>,
    options: TuiOptions,
) -> Result<()> {
    let mut tty = terminal::enter()?;
    let result = event_loop(&mut tty, Session::new(dashboard, runtime, options));
    let restored = terminal::leave();
    result.and(restored)
}

fn event_loop<R: AppRuntime>(tty: &mut DashTerminal, mut session: Session<R>) -> Result<()> {
    let size = tty.size().context("read terminal size")?;
    session.push(Message::Resize {
        width: usize::from(size.width),
        height: usize::from(size.height),
    });

    let mut step = session.start(|runtime, path| hand_off(tty, runtime, path));
    while step == Step::Continue {
        session.collect();
        step = session.pump(|runtime, path| hand_off(tty, runtime, path));
        if step == Step::Quit {
            break;
        }

        tty.draw(|frame| render::render(frame, &screen(session.dashboard())))
            .context("draw frame")?;

        if event::poll(POLL_INTERVAL).context("poll event")? {
            match event::read().context("read event")? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    session.push(Message::Key(translate_key(key)));
                }
                Event::Resize(width, height) => session.push(Message::Resize {
                    width: usize::from(width),
                    height: usize::from(height),
                }),
                _ => {}
            }
        }
    }
    info!("dashboard closed");
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{AppRuntime, Session, Step, TuiOptions, translate_key};
    use anyhow::{Result, anyhow};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use orc_dash_app::{Dashboard, DashboardOptions, EntityId, Key, Message};
    use orc_dash_testkit::SCENARIO_TREE;
    use std::cell::RefCell;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use time::OffsetDateTime;

    /// Records every runtime call as `"<action> <id>"`.
    #[derive(Debug, Default)]
    pub(crate) struct TestRuntime {
        summary: String,
        failure: Option<String>,
        scratch_dir: Option<PathBuf>,
        calls: Mutex<Vec<String>>,
    }

    impl TestRuntime {
        pub(crate) fn with_summary(summary: &str) -> Self {
            Self {
                summary: summary.to_owned(),
                ..Self::default()
            }
        }

        pub(crate) fn failing(error: &str) -> Self {
            Self {
                failure: Some(error.to_owned()),
                ..Self::default()
            }
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls lock").clone()
        }

        fn record(&self, call: String) -> Result<()> {
            self.calls.lock().expect("calls lock").push(call);
            match &self.failure {
                Some(error) => Err(anyhow!(error.clone())),
                None => Ok(()),
            }
        }
    }

    impl AppRuntime for TestRuntime {
        fn fetch_summary(&self) -> Result<String> {
            self.record("fetch".to_owned())?;
            Ok(self.summary.clone())
        }

        fn copy_to_clipboard(&self, text: &str) -> Result<()> {
            self.record(format!("copy {text}"))
        }

        fn focus(&self, entity: &EntityId) -> Result<()> {
            self.record(format!("focus {entity}"))
        }

        fn clear_focus(&self) -> Result<()> {
            self.record("unfocus".to_owned())
        }

        fn close(&self, entity: &EntityId) -> Result<()> {
            self.record(format!("close {entity}"))
        }

        fn send_to_pane(&self, entity: &EntityId) -> Result<()> {
            self.record(format!("send {entity}"))
        }

        fn write_detail(&self, entity: &EntityId) -> Result<PathBuf> {
            self.record(format!("show {entity}"))?;
            let dir = self
                .scratch_dir
                .clone()
                .ok_or_else(|| anyhow!("no scratch dir"))?;
            let path = dir.join(format!("{entity}.txt"));
            fs::write(&path, format!("{entity} details\n"))?;
            Ok(path)
        }

        fn launch_editor(&self, path: &Path) -> Result<()> {
            self.record(format!("edit {}", path.display()))
        }

        fn detach_host_session(&self) -> Result<()> {
            self.record("detach".to_owned())
        }

        fn now(&self) -> OffsetDateTime {
            OffsetDateTime::UNIX_EPOCH
        }
    }

    const WAIT: Duration = Duration::from_secs(5);

    fn options() -> TuiOptions {
        TuiOptions {
            refresh_interval: None,
            status_duration: Duration::from_secs(60),
            frame_duration: Duration::from_millis(1),
        }
    }

    fn no_editor(_: &TestRuntime, _: &Path) -> Result<()> {
        Err(anyhow!("editor should not run"))
    }

    fn started(runtime: TestRuntime) -> Session<TestRuntime> {
        let mut session = Session::new(
            Dashboard::new(DashboardOptions::default()),
            Arc::new(runtime),
            options(),
        );
        session.push(Message::Resize {
            width: 80,
            height: 20,
        });
        assert_eq!(session.start(no_editor), Step::Continue);
        assert!(session.wait(WAIT), "initial fetch never arrived");
        assert_eq!(session.pump(no_editor), Step::Continue);
        session
    }

    fn press(session: &mut Session<TestRuntime>, ch: char) -> Step {
        session.push(Message::Key(Key::Char(ch)));
        session.pump(no_editor)
    }

    #[test]
    fn startup_fetch_loads_the_tree() {
        let session = started(TestRuntime::with_summary(SCENARIO_TREE));
        assert!(session.dashboard().loaded);
        assert_eq!(session.dashboard().view.tree().entity_index.len(), 4);
    }

    #[test]
    fn fetch_failure_enters_error_state() {
        let session = started(TestRuntime::failing("orc: not found"));
        assert_eq!(
            session.dashboard().fetch_error.as_deref(),
            Some("orc: not found")
        );
    }

    #[test]
    fn quit_key_stops_the_session() {
        let mut session = started(TestRuntime::with_summary(SCENARIO_TREE));
        assert_eq!(press(&mut session, 'q'), Step::Quit);
    }

    #[test]
    fn yank_round_trips_through_runtime() {
        let mut session = started(TestRuntime::with_summary(SCENARIO_TREE));
        press(&mut session, 'j');
        press(&mut session, 'y');
        assert!(session.wait(WAIT));
        session.pump(no_editor);
        assert_eq!(
            session.dashboard().status.message(),
            Some("Copied SHIP-412")
        );
    }

    #[test]
    fn manual_refresh_animates_then_fetches() {
        let mut session = started(TestRuntime::with_summary(SCENARIO_TREE));
        press(&mut session, 'r');
        assert!(session.dashboard().animation.animating);

        while session.dashboard().animation.animating {
            assert!(session.wait(WAIT), "animation stalled");
            session.pump(no_editor);
        }
        assert!(session.wait(WAIT), "refresh fetch never arrived");
        session.pump(no_editor);
        assert_eq!(session.dispatcher.runtime().calls(), vec!["fetch", "fetch"]);
    }

    #[test]
    fn open_hands_off_to_editor_and_removes_scratch() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let runtime = TestRuntime {
            scratch_dir: Some(dir.path().to_path_buf()),
            ..TestRuntime::with_summary(SCENARIO_TREE)
        };
        let mut session = started(runtime);
        press(&mut session, 'o');
        assert!(session.wait(WAIT));

        let opened = RefCell::new(Vec::new());
        let step = session.pump(|_, path| {
            assert!(path.exists());
            opened.borrow_mut().push(path.to_path_buf());
            Err(anyhow!("exit status 1"))
        });
        assert_eq!(step, Step::Continue);

        let opened = opened.into_inner();
        assert_eq!(opened, vec![dir.path().join("COMM-001.txt")]);
        assert!(!opened[0].exists());
        assert_eq!(
            session.dashboard().status.message(),
            Some("Editor error: exit status 1")
        );
        Ok(())
    }

    #[test]
    fn quitting_before_detail_arrives_removes_scratch() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let runtime = TestRuntime {
            scratch_dir: Some(dir.path().to_path_buf()),
            ..TestRuntime::with_summary(SCENARIO_TREE)
        };
        let mut session = started(runtime);
        session.push(Message::Key(Key::Char('o')));
        session.push(Message::Key(Key::Char('q')));
        assert_eq!(session.pump(no_editor), Step::Quit);

        assert!(session.wait(WAIT), "detail never arrived");
        let scratch = dir.path().join("COMM-001.txt");
        assert!(scratch.exists());

        drop(session);
        assert!(!scratch.exists());
        Ok(())
    }

    #[test]
    fn ctrl_c_is_interrupt_and_arrows_map() {
        assert_eq!(
            translate_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Key::Interrupt
        );
        assert_eq!(
            translate_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)),
            Key::Char('c')
        );
        assert_eq!(
            translate_key(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE)),
            Key::Down
        );
        assert_eq!(
            translate_key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE)),
            Key::Other
        );
    }
}
