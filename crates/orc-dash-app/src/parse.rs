// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::EntityId;
use regex::Regex;
use std::sync::OnceLock;

/// Indentation units, each worth one level of depth.
const DEPTH_UNITS: [&str; 4] = ["├── ", "└── ", "│   ", "    "];

fn ansi_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]").expect("ansi regex"))
}

fn entity_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b(?:COMM|SHIP|TASK|NOTE|TOME|PLAN|WORK|BENCH)-[0-9]+\b")
            .expect("entity id regex")
    })
}

/// One line of summary output, tagged with the entity it names (if any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// Original line, styling codes included.
    pub text: String,
    pub entity_id: Option<EntityId>,
    pub depth: usize,
}

impl ParsedLine {
    pub fn is_entity(&self) -> bool {
        self.entity_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedTree {
    pub lines: Vec<ParsedLine>,
    /// Indices into `lines` of every entity line, in line order.
    pub entity_index: Vec<usize>,
}

impl ParsedTree {
    pub fn entity_at(&self, position: usize) -> Option<&EntityId> {
        let line = *self.entity_index.get(position)?;
        self.lines.get(line)?.entity_id.as_ref()
    }

    pub fn position_of(&self, entity_id: &EntityId) -> Option<usize> {
        self.entity_index
            .iter()
            .position(|line| self.lines[*line].entity_id.as_ref() == Some(entity_id))
    }
}

pub fn strip_ansi(line: &str) -> String {
    ansi_pattern().replace_all(line, "").into_owned()
}

/// Splits rendered summary text into tagged lines. Never fails: anything
/// unrecognized becomes a decorative line.
pub fn parse_lines(content: &str) -> ParsedTree {
    let mut raw_lines = content.split('\n').collect::<Vec<&str>>();
    if raw_lines.last() == Some(&"") {
        raw_lines.pop();
    }

    let mut tree = ParsedTree {
        lines: Vec::with_capacity(raw_lines.len()),
        entity_index: Vec::new(),
    };
    for (index, raw) in raw_lines.into_iter().enumerate() {
        let stripped = strip_ansi(raw);
        let entity_id = entity_pattern()
            .find(&stripped)
            .map(|found| EntityId::recognized(found.as_str()));
        if entity_id.is_some() {
            tree.entity_index.push(index);
        }
        tree.lines.push(ParsedLine {
            text: raw.to_owned(),
            entity_id,
            depth: tree_depth(&stripped),
        });
    }
    tree
}

/// Counts leading indentation units of an already-stripped line.
pub fn tree_depth(stripped: &str) -> usize {
    let mut depth = 0;
    let mut rest = stripped;
    while let Some(unit) = DEPTH_UNITS.iter().find(|unit| rest.starts_with(**unit)) {
        depth += 1;
        rest = &rest[unit.len()..];
    }
    depth
}
