// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

const BASIC: [Color; 8] = [
    Color::Black,
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
    Color::Gray,
];

const BRIGHT: [Color; 8] = [
    Color::DarkGray,
    Color::LightRed,
    Color::LightGreen,
    Color::LightYellow,
    Color::LightBlue,
    Color::LightMagenta,
    Color::LightCyan,
    Color::White,
];

/// Converts a line carrying SGR escape codes into styled spans. Non-SGR
/// escape sequences are dropped.
pub fn styled_line(text: &str) -> Line<'static> {
    let mut spans = Vec::new();
    let mut style = Style::default();
    let mut pending = String::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\x1b' || chars.peek() != Some(&'[') {
            pending.push(ch);
            continue;
        }
        chars.next();

        let mut params = String::new();
        let mut terminator = None;
        for next in chars.by_ref() {
            if next.is_ascii_alphabetic() {
                terminator = Some(next);
                break;
            }
            params.push(next);
        }
        if terminator != Some('m') {
            continue;
        }

        if !pending.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut pending), style));
        }
        style = apply_sgr(style, &params);
    }

    if !pending.is_empty() {
        spans.push(Span::styled(pending, style));
    }
    Line::from(spans)
}

fn apply_sgr(mut style: Style, params: &str) -> Style {
    let codes = params
        .split(';')
        .map(|code| code.parse::<u16>().unwrap_or(0))
        .collect::<Vec<u16>>();
    let mut index = 0;
    while index < codes.len() {
        let code = codes[index];
        index += 1;
        style = match code {
            0 => Style::default(),
            1 => style.add_modifier(Modifier::BOLD),
            2 => style.add_modifier(Modifier::DIM),
            3 => style.add_modifier(Modifier::ITALIC),
            4 => style.add_modifier(Modifier::UNDERLINED),
            7 => style.add_modifier(Modifier::REVERSED),
            9 => style.add_modifier(Modifier::CROSSED_OUT),
            22 => style.remove_modifier(Modifier::BOLD | Modifier::DIM),
            23 => style.remove_modifier(Modifier::ITALIC),
            24 => style.remove_modifier(Modifier::UNDERLINED),
            27 => style.remove_modifier(Modifier::REVERSED),
            29 => style.remove_modifier(Modifier::CROSSED_OUT),
            30..=37 => style.fg(BASIC[usize::from(code - 30)]),
            39 => style.fg(Color::Reset),
            40..=47 => style.bg(BASIC[usize::from(code - 40)]),
            49 => style.bg(Color::Reset),
            90..=97 => style.fg(BRIGHT[usize::from(code - 90)]),
            100..=107 => style.bg(BRIGHT[usize::from(code - 100)]),
            38 | 48 => {
                let Some((color, consumed)) = extended_color(&codes[index..]) else {
                    break;
                };
                index += consumed;
                if code == 38 {
                    style.fg(color)
                } else {
                    style.bg(color)
                }
            }
            _ => style,
        };
    }
    style
}

/// Parses the tail of a `38;5;n` or `38;2;r;g;b` sequence.
fn extended_color(rest: &[u16]) -> Option<(Color, usize)> {
    let channel = |value: u16| u8::try_from(value).ok();
    match rest {
        [5, index, ..] => Some((Color::Indexed(channel(*index)?), 2)),
        [2, red, green, blue, ..] => Some((
            Color::Rgb(channel(*red)?, channel(*green)?, channel(*blue)?),
            4,
        )),
        _ => None,
    }
}
