// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ansi::styled_line;
use orc_dash_app::{Body, Screen, StatusBar};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::Paragraph;

const REFRESHING: &str = "✨ Refreshing...";

pub fn render(frame: &mut Frame<'_>, screen: &Screen) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(frame.area());

    if let Body::Error(text) = &screen.body {
        frame.render_widget(Paragraph::new(text.as_str()), frame.area());
        return;
    }

    frame.render_widget(Paragraph::new(body_text(&screen.body)), chunks[0]);
    frame.render_widget(
        Paragraph::new(status_line(&screen.status)).style(Style::default().bg(Color::Black)),
        chunks[1],
    );
}

fn body_text(body: &Body) -> Text<'static> {
    match body {
        Body::Loading => Text::raw("Loading..."),
        Body::Error(text) => Text::raw(text.clone()),
        Body::Lines(lines) => lines
            .iter()
            .map(|line| {
                let rendered = if line.plain {
                    Line::raw(line.text.clone())
                } else {
                    styled_line(&line.text)
                };
                if line.selected {
                    rendered.patch_style(Style::default().add_modifier(Modifier::REVERSED))
                } else {
                    rendered
                }
            })
            .collect::<Vec<Line<'static>>>()
            .into(),
    }
}

pub fn status_line(status: &StatusBar) -> Line<'static> {
    let message = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    match status {
        StatusBar::Confirm(entity) => Line::from(Span::styled(
            format!("Close {entity}? [y/n]"),
            message,
        )),
        StatusBar::Message(text) => Line::from(Span::styled(text.clone(), message)),
        StatusBar::Animating => Line::from(Span::styled(REFRESHING, message)),
        StatusBar::Hints {
            hints,
            refreshed_at,
        } => {
            let mut spans = Vec::new();
            for (index, hint) in hints.iter().enumerate() {
                if index > 0 {
                    spans.push(Span::raw("  "));
                }
                if hint.active {
                    spans.push(Span::styled(
                        hint.key,
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    ));
                    spans.push(Span::raw(format!(" {}", hint.label)));
                } else {
                    spans.push(Span::styled(
                        format!("{} {}", hint.key, hint.label),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
            }
            if let Some(at) = refreshed_at {
                spans.push(Span::styled(
                    format!("  @{at}"),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            Line::from(spans)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{render, status_line};
    use anyhow::Result;
    use orc_dash_app::{
        Body, BodyLine, Dashboard, DashboardOptions, EntityId, Message, Screen, StatusBar, screen,
    };
    use orc_dash_testkit::{SCENARIO_TREE, styled};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use ratatui::style::Modifier;
    use time::OffsetDateTime;

    fn rows(buffer: &Buffer) -> Vec<String> {
        buffer
            .content
            .chunks(usize::from(buffer.area.width))
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .map(|row| row.trim_end().to_owned())
            .collect()
    }

    fn draw(screen: &Screen, width: u16, height: u16) -> Result<Buffer> {
        let mut terminal = Terminal::new(TestBackend::new(width, height))?;
        terminal.draw(|frame| render(frame, screen))?;
        Ok(terminal.backend().buffer().clone())
    }

    fn loaded(content: &str) -> Dashboard {
        let dashboard = Dashboard::new(DashboardOptions::default());
        let (dashboard, _) = dashboard.update(Message::Resize {
            width: 60,
            height: 6,
        });
        dashboard
            .update(Message::Fetched {
                result: Ok(content.to_owned()),
                target: None,
                fetched_at: OffsetDateTime::UNIX_EPOCH,
            })
            .0
    }

    #[test]
    fn tree_lines_and_status_bar_are_drawn() -> Result<()> {
        let buffer = draw(&screen(&loaded(SCENARIO_TREE)), 60, 6)?;
        let rows = rows(&buffer);
        assert_eq!(rows[0], "COMM-001 - X");
        assert_eq!(rows[2], "│   └── TASK-100 - Z");
        assert!(rows[5].starts_with("j/k navigate  y yank"), "{:?}", rows[5]);
        Ok(())
    }

    #[test]
    fn cursor_line_is_reverse_video() -> Result<()> {
        let buffer = draw(&screen(&loaded(SCENARIO_TREE)), 60, 6)?;
        assert!(buffer[(0, 0)].modifier.contains(Modifier::REVERSED));
        assert!(!buffer[(0, 1)].modifier.contains(Modifier::REVERSED));
        Ok(())
    }

    #[test]
    fn styling_codes_never_reach_the_screen() -> Result<()> {
        let content = format!("{} - styled", styled("\x1b[1;36m", "COMM-001"));
        let buffer = draw(&screen(&loaded(&content)), 40, 3)?;
        assert_eq!(rows(&buffer)[0], "COMM-001 - styled");
        Ok(())
    }

    #[test]
    fn error_body_fills_the_screen() -> Result<()> {
        let screen = Screen {
            body: Body::Error("Error: boom\n\nPress q to quit.".to_owned()),
            status: StatusBar::Message("ignored".to_owned()),
        };
        let rows = rows(&draw(&screen, 30, 4)?);
        assert_eq!(rows, vec!["Error: boom", "", "Press q to quit.", ""]);
        Ok(())
    }

    #[test]
    fn loading_placeholder() -> Result<()> {
        let screen = Screen {
            body: Body::Loading,
            status: StatusBar::Animating,
        };
        let rows = rows(&draw(&screen, 30, 3)?);
        assert_eq!(rows[0], "Loading...");
        Ok(())
    }

    #[test]
    fn confirm_prompt_names_entity() -> Result<()> {
        let line = status_line(&StatusBar::Confirm(EntityId::parse("SHIP-412")?));
        assert_eq!(line.to_string(), "Close SHIP-412? [y/n]");
        Ok(())
    }

    #[test]
    fn plain_overlay_lines_are_drawn_verbatim() -> Result<()> {
        let screen = Screen {
            body: Body::Lines(vec![BodyLine {
                text: "├── ·ASK-100".to_owned(),
                selected: false,
                plain: true,
            }]),
            status: StatusBar::Animating,
        };
        let rows = rows(&draw(&screen, 30, 3)?);
        assert_eq!(rows[0], "├── ·ASK-100");
        Ok(())
    }
}
