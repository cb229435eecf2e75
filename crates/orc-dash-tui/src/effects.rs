// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{AppRuntime, TuiOptions};
use orc_dash_app::{Effect, EntityId, Message};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{SendError, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// What the event loop must do after an effect has been handed off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
    /// Suspend the dashboard and give the terminal to the editor.
    Editor { entity: EntityId, path: PathBuf },
}

/// Runs effects off the loop and reports their outcome as messages.
pub struct Dispatcher<R: AppRuntime> {
    runtime: Arc<R>,
    tx: Sender<Message>,
    options: TuiOptions,
}

impl<R: AppRuntime> Dispatcher<R> {
    pub fn new(runtime: Arc<R>, tx: Sender<Message>, options: TuiOptions) -> Self {
        Self {
            runtime,
            tx,
            options,
        }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn dispatch(&self, effect: Effect) -> Control {
        match effect {
            Effect::Fetch { target } => self.background(move |runtime| {
                debug!(entity_id = ?target.as_ref().map(EntityId::as_str), "fetching summary");
                let result = runtime.fetch_summary().map_err(|error| {
                    warn!(error = %format!("{error:#}"), "summary fetch failed");
                    error_text(error)
                });
                Message::Fetched {
                    result,
                    target,
                    fetched_at: runtime.now(),
                }
            }),
            Effect::Yank(entity) => self.background(move |runtime| Message::Yanked {
                result: logged("copy", &entity, runtime.copy_to_clipboard(entity.as_str())),
                entity,
            }),
            Effect::Focus(entity) => self.background(move |runtime| Message::FocusChanged {
                result: logged("focus", &entity, runtime.focus(&entity)),
                entity: Some(entity),
            }),
            Effect::ClearFocus => self.background(|runtime| {
                let result = runtime.clear_focus().map_err(|error| {
                    warn!(error = %format!("{error:#}"), "clearing focus failed");
                    error_text(error)
                });
                Message::FocusChanged {
                    entity: None,
                    result,
                }
            }),
            Effect::Close(entity) => self.background(move |runtime| Message::Closed {
                result: logged("close", &entity, runtime.close(&entity)),
                entity,
            }),
            Effect::SendToPane(entity) => self.background(move |runtime| Message::Sent {
                result: logged("send", &entity, runtime.send_to_pane(&entity)),
                entity,
            }),
            Effect::LoadDetail(entity) => self.background(move |runtime| Message::DetailReady {
                result: logged("detail", &entity, runtime.write_detail(&entity)),
                entity,
            }),
            Effect::LaunchEditor { entity, path } => Control::Editor { entity, path },
            Effect::ExpireStatus { token } => {
                self.after(self.options.status_duration, Message::StatusExpired { token })
            }
            Effect::AnimationTick => {
                self.after(self.options.frame_duration, Message::AnimationTick)
            }
            Effect::DetachHostSession => {
                if let Err(error) = self.runtime.detach_host_session() {
                    warn!(error = %format!("{error:#}"), "detaching host session failed");
                }
                Control::Continue
            }
            Effect::Quit => Control::Quit,
        }
    }

    fn background<F>(&self, work: F) -> Control
    where
        F: FnOnce(&R) -> Message + Send + 'static,
    {
        let runtime = Arc::clone(&self.runtime);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let message = work(&runtime);
            if let Err(SendError(message)) = tx.send(message) {
                discard_scratch(&message);
            }
        });
        Control::Continue
    }

    fn after(&self, delay: Duration, message: Message) -> Control {
        let tx = self.tx.clone();
        thread::spawn(move || {
            thread::sleep(delay);
            let _ = tx.send(message);
        });
        Control::Continue
    }
}

/// Sends `RefreshTimer` every `interval` until the loop goes away.
pub fn spawn_refresh_timer(tx: Sender<Message>, interval: Duration) {
    thread::spawn(move || {
        loop {
            thread::sleep(interval);
            if tx.send(Message::RefreshTimer).is_err() {
                break;
            }
        }
    });
}

/// Removes the scratch file of a detail that will never reach the editor.
pub fn discard_scratch(message: &Message) {
    let Message::DetailReady {
        entity,
        result: Ok(path),
    } = message
    else {
        return;
    };
    if let Err(error) = fs::remove_file(path) {
        warn!(
            entity_id = %entity,
            path = %path.display(),
            %error,
            "removing scratch file failed"
        );
        return;
    }
    debug!(entity_id = %entity, path = %path.display(), "discarded unopened detail");
}

pub fn error_text(error: anyhow::Error) -> String {
    format!("{error:#}")
}

fn logged<T>(action: &str, entity: &EntityId, result: anyhow::Result<T>) -> Result<T, String> {
    match result {
        Ok(value) => {
            debug!(action, entity_id = %entity, "effect completed");
            Ok(value)
        }
        Err(error) => {
            let text = error_text(error);
            warn!(action, entity_id = %entity, error = %text, "effect failed");
            Err(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Control, Dispatcher, discard_scratch, spawn_refresh_timer};
    use crate::TuiOptions;
    use crate::tests::TestRuntime;
    use anyhow::Result;
    use orc_dash_app::{Effect, EntityId, Message};
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::mpsc;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(5);

    fn options() -> TuiOptions {
        TuiOptions {
            refresh_interval: None,
            status_duration: Duration::from_millis(10),
            frame_duration: Duration::from_millis(5),
        }
    }

    fn id(raw: &str) -> EntityId {
        EntityId::parse(raw).expect("valid test id")
    }

    #[test]
    fn fetch_reports_summary_and_target() -> Result<()> {
        let runtime = Arc::new(TestRuntime::with_summary("COMM-001 - X"));
        let (tx, rx) = mpsc::channel();
        let dispatcher = Dispatcher::new(Arc::clone(&runtime), tx, options());

        let control = dispatcher.dispatch(Effect::Fetch {
            target: Some(id("COMM-001")),
        });
        assert_eq!(control, Control::Continue);

        let Message::Fetched { result, target, .. } = rx.recv_timeout(WAIT)? else {
            panic!("expected fetch result");
        };
        assert_eq!(result, Ok("COMM-001 - X".to_owned()));
        assert_eq!(target, Some(id("COMM-001")));
        Ok(())
    }

    #[test]
    fn failures_arrive_as_error_text() -> Result<()> {
        let runtime = Arc::new(TestRuntime::failing("clipboard unavailable"));
        let (tx, rx) = mpsc::channel();
        let dispatcher = Dispatcher::new(runtime, tx, options());

        dispatcher.dispatch(Effect::Yank(id("SHIP-412")));
        assert_eq!(
            rx.recv_timeout(WAIT)?,
            Message::Yanked {
                entity: id("SHIP-412"),
                result: Err("clipboard unavailable".to_owned()),
            }
        );
        Ok(())
    }

    #[test]
    fn actions_reach_the_runtime() -> Result<()> {
        let runtime = Arc::new(TestRuntime::with_summary(""));
        let (tx, rx) = mpsc::channel();
        let dispatcher = Dispatcher::new(Arc::clone(&runtime), tx, options());

        dispatcher.dispatch(Effect::Focus(id("SHIP-412")));
        dispatcher.dispatch(Effect::Close(id("TASK-100")));
        dispatcher.dispatch(Effect::SendToPane(id("NOTE-007")));
        for _ in 0..3 {
            rx.recv_timeout(WAIT)?;
        }

        let mut calls = runtime.calls();
        calls.sort();
        assert_eq!(
            calls,
            vec![
                "close TASK-100".to_owned(),
                "focus SHIP-412".to_owned(),
                "send NOTE-007".to_owned(),
            ]
        );
        Ok(())
    }

    #[test]
    fn timers_deliver_after_delay() -> Result<()> {
        let runtime = Arc::new(TestRuntime::with_summary(""));
        let (tx, rx) = mpsc::channel();
        let dispatcher = Dispatcher::new(runtime, tx, options());

        dispatcher.dispatch(Effect::ExpireStatus { token: 4 });
        assert_eq!(rx.recv_timeout(WAIT)?, Message::StatusExpired { token: 4 });
        dispatcher.dispatch(Effect::AnimationTick);
        assert_eq!(rx.recv_timeout(WAIT)?, Message::AnimationTick);
        Ok(())
    }

    #[test]
    fn editor_and_quit_are_returned_to_the_loop() {
        let runtime = Arc::new(TestRuntime::with_summary(""));
        let (tx, _rx) = mpsc::channel();
        let dispatcher = Dispatcher::new(Arc::clone(&runtime), tx, options());

        let path = PathBuf::from("/tmp/SHIP-412-x.txt");
        assert_eq!(
            dispatcher.dispatch(Effect::LaunchEditor {
                entity: id("SHIP-412"),
                path: path.clone(),
            }),
            Control::Editor {
                entity: id("SHIP-412"),
                path,
            }
        );
        assert_eq!(dispatcher.dispatch(Effect::DetachHostSession), Control::Continue);
        assert_eq!(dispatcher.dispatch(Effect::Quit), Control::Quit);
        assert_eq!(runtime.calls(), vec!["detach".to_owned()]);
    }

    #[test]
    fn detail_for_a_closed_loop_is_discarded() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("COMM-001.txt");
        std::fs::write(&path, "detail")?;

        discard_scratch(&Message::DetailReady {
            entity: id("COMM-001"),
            result: Ok(path.clone()),
        });
        assert!(!path.exists());

        discard_scratch(&Message::DetailReady {
            entity: id("COMM-001"),
            result: Err("show failed".to_owned()),
        });
        Ok(())
    }

    #[test]
    fn refresh_timer_ticks_until_receiver_drops() -> Result<()> {
        let (tx, rx) = mpsc::channel();
        spawn_refresh_timer(tx, Duration::from_millis(5));
        assert_eq!(rx.recv_timeout(WAIT)?, Message::RefreshTimer);
        assert_eq!(rx.recv_timeout(WAIT)?, Message::RefreshTimer);
        drop(rx);
        Ok(())
    }
}
