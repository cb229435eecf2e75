// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{EntityId, ExpansionState, ParsedLine, ParsedTree, hidden_lines};

/// Window over the visible (non-hidden) lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub offset: usize,
    /// Zero until the first terminal size is known.
    pub height: usize,
    pub width: usize,
}

/// Parsed tree plus everything needed to walk it: expansion flags, the
/// derived hidden set, the cursor, and the viewport.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TreeView {
    tree: ParsedTree,
    expansion: ExpansionState,
    hidden: Vec<bool>,
    /// Position in `tree.entity_index`.
    cursor: usize,
    pub viewport: Viewport,
}

impl TreeView {
    pub fn tree(&self) -> &ParsedTree {
        &self.tree
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    pub fn hidden(&self) -> &[bool] {
        &self.hidden
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Installs a freshly fetched tree, keeping expansion flags of entities
    /// still present and moving the cursor onto `target` when it survived.
    pub fn replace_tree(&mut self, tree: ParsedTree, target: Option<&EntityId>) {
        self.expansion.retain_present(&tree);
        self.tree = tree;
        self.recompute_hidden();
        self.reposition_on(target);
        self.ensure_visible();
    }

    pub fn cursor_entity(&self) -> Option<&EntityId> {
        self.tree.entity_at(self.cursor)
    }

    pub fn cursor_line(&self) -> Option<usize> {
        self.tree.entity_index.get(self.cursor).copied()
    }

    pub fn move_next(&mut self) -> bool {
        self.step(1)
    }

    pub fn move_previous(&mut self) -> bool {
        self.step(-1)
    }

    fn step(&mut self, direction: isize) -> bool {
        match self.next_visible(direction) {
            Some(next) => {
                self.cursor = next;
                self.ensure_visible();
                true
            }
            None => false,
        }
    }

    fn next_visible(&self, direction: isize) -> Option<usize> {
        let mut candidate = self.cursor as isize + direction;
        while candidate >= 0 && (candidate as usize) < self.tree.entity_index.len() {
            let line = self.tree.entity_index[candidate as usize];
            if !self.hidden[line] {
                return Some(candidate as usize);
            }
            candidate += direction;
        }
        None
    }

    /// Moves onto `target` if present, otherwise clamps into range; then
    /// walks off any hidden entity (upward first).
    pub fn reposition_on(&mut self, target: Option<&EntityId>) {
        if let Some(position) = target.and_then(|id| self.tree.position_of(id)) {
            self.cursor = position;
        }
        self.cursor = self
            .cursor
            .min(self.tree.entity_index.len().saturating_sub(1));

        if self.cursor_line().is_some_and(|line| self.hidden[line])
            && let Some(next) = self
                .next_visible(-1)
                .or_else(|| self.next_visible(1))
        {
            self.cursor = next;
        }
    }

    /// Flips the entity under the cursor when it is expandable; no-op otherwise.
    pub fn toggle_expansion(&mut self) -> bool {
        let Some(entity_id) = self.cursor_entity().cloned() else {
            return false;
        };
        if !self.expansion.toggle(&entity_id) {
            return false;
        }
        self.recompute_hidden();
        self.ensure_visible();
        true
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.viewport.width = width;
        self.viewport.height = height;
        self.ensure_visible();
    }

    /// Scrolls so the cursor line is inside `[offset, offset + height)`.
    pub fn ensure_visible(&mut self) {
        let visible_total = self.visible_count();
        let height = self.viewport.height;
        if height == 0 {
            return;
        }

        if let Some(line) = self.cursor_line() {
            let row = self.hidden[..line].iter().filter(|hidden| !**hidden).count();
            if row < self.viewport.offset {
                self.viewport.offset = row;
            } else if row >= self.viewport.offset + height {
                self.viewport.offset = row + 1 - height;
            }
        }
        self.viewport.offset = self
            .viewport
            .offset
            .min(visible_total.saturating_sub(height));
    }

    pub fn visible_count(&self) -> usize {
        self.hidden.iter().filter(|hidden| !**hidden).count()
    }

    /// Visible lines with their indices into the full line sequence.
    pub fn visible_lines(&self) -> impl Iterator<Item = (usize, &ParsedLine)> {
        self.tree
            .lines
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.hidden[*index])
    }

    /// The slice of visible lines that fits in the viewport.
    pub fn window(&self) -> impl Iterator<Item = (usize, &ParsedLine)> {
        let take = if self.viewport.height == 0 {
            usize::MAX
        } else {
            self.viewport.height
        };
        self.visible_lines().skip(self.viewport.offset).take(take)
    }

    fn recompute_hidden(&mut self) {
        self.hidden = hidden_lines(&self.tree, &self.expansion);
    }
}
