// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{EntityId, ParsedTree};
use std::collections::BTreeMap;

/// Per-entity expand/collapse flags. Entities without an entry are expanded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExpansionState {
    flags: BTreeMap<EntityId, bool>,
}

impl ExpansionState {
    pub fn is_expanded(&self, entity_id: &EntityId) -> bool {
        self.flags.get(entity_id).copied().unwrap_or(true)
    }

    /// Flips the flag for expandable entities; returns whether anything changed.
    pub fn toggle(&mut self, entity_id: &EntityId) -> bool {
        if !entity_id.is_expandable() {
            return false;
        }
        let expanded = self.is_expanded(entity_id);
        self.flags.insert(entity_id.clone(), !expanded);
        true
    }

    pub fn set(&mut self, entity_id: EntityId, expanded: bool) {
        self.flags.insert(entity_id, expanded);
    }

    /// Drops flags for entities no longer in `tree`.
    pub fn retain_present(&mut self, tree: &ParsedTree) {
        self.flags
            .retain(|entity_id, _| tree.position_of(entity_id).is_some());
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    fn suppresses_children(&self, entity_id: &EntityId) -> bool {
        entity_id.is_expandable() && !self.is_expanded(entity_id)
    }
}

/// Marks every line that sits beneath a collapsed ancestor.
///
/// Entity lines drive the collapse stack; decorative lines never pop it. A
/// decorative line follows the nearest entity above it: hidden when that
/// entity is hidden, or when that entity is collapsed and the line belongs to
/// its child range (deeper than it, or followed by one of its children).
pub fn hidden_lines(tree: &ParsedTree, expansion: &ExpansionState) -> Vec<bool> {
    let mut hidden = vec![false; tree.lines.len()];
    let mut collapsed_depths: Vec<usize> = Vec::new();
    let next_entity_depths = next_entity_depths(tree);
    // (depth, hidden, collapsed) of the nearest entity line seen so far.
    let mut last_entity: Option<(usize, bool, bool)> = None;

    for (index, line) in tree.lines.iter().enumerate() {
        let Some(entity_id) = &line.entity_id else {
            hidden[index] = last_entity.is_some_and(|(depth, entity_hidden, collapsed)| {
                entity_hidden
                    || (collapsed
                        && (line.depth > depth
                            || next_entity_depths[index].is_some_and(|next| next > depth)))
            });
            continue;
        };

        while collapsed_depths
            .last()
            .is_some_and(|depth| line.depth <= *depth)
        {
            collapsed_depths.pop();
        }
        hidden[index] = !collapsed_depths.is_empty();
        let collapsed = expansion.suppresses_children(entity_id);
        if collapsed {
            collapsed_depths.push(line.depth);
        }
        last_entity = Some((line.depth, hidden[index], collapsed));
    }

    hidden
}

/// Depth of the first entity line after each line, if any.
fn next_entity_depths(tree: &ParsedTree) -> Vec<Option<usize>> {
    let mut next = vec![None; tree.lines.len()];
    let mut upcoming = None;
    for (index, line) in tree.lines.iter().enumerate().rev() {
        next[index] = upcoming;
        if line.is_entity() {
            upcoming = Some(line.depth);
        }
    }
    next
}
