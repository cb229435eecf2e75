// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Frames played before a manual refresh fetches.
pub const FRAME_COUNT: usize = 8;

/// Brightest first; index grows with distance from the wave front.
const SPARKLES: [char; 5] = ['✨', '★', '✦', '✧', '·'];

/// Refresh transition state. Frames are derived from `seed` and a running
/// sequence number so replays with the same seed draw identical sparkles.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Animation {
    pub animating: bool,
    pub frame: usize,
    seed: u64,
    sequence: u64,
    overlay: Option<Vec<String>>,
}

/// Outcome of one frame advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStep {
    Idle,
    Continue,
    Finished,
}

impl Animation {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn start(&mut self) {
        self.animating = true;
        self.frame = 0;
        self.overlay = None;
    }

    /// Advances one frame. `base` is the plain text currently on screen and
    /// is only used while frames remain.
    pub fn advance(&mut self, base: &[String], width: usize) -> FrameStep {
        if !self.animating {
            return FrameStep::Idle;
        }
        self.frame += 1;
        if self.frame >= FRAME_COUNT {
            self.animating = false;
            self.frame = 0;
            self.overlay = None;
            return FrameStep::Finished;
        }

        self.sequence = self.sequence.wrapping_add(1);
        let mut rng = StdRng::seed_from_u64(self.seed ^ self.sequence.rotate_left(32));
        self.overlay = Some(sparkle_frame(base, width, self.frame, &mut rng));
        FrameStep::Continue
    }

    pub fn overlay(&self) -> Option<&[String]> {
        self.overlay.as_deref()
    }
}

/// Scatters sparkles around a wave front that sweeps top to bottom as
/// `frame` grows.
pub fn sparkle_frame(
    base: &[String],
    width: usize,
    frame: usize,
    rng: &mut impl Rng,
) -> Vec<String> {
    let mut rows = base
        .iter()
        .map(|line| line.chars().collect::<Vec<char>>())
        .collect::<Vec<Vec<char>>>();
    let height = rows.len();
    if height == 0 || width == 0 {
        return base.to_vec();
    }

    let wave_front = ((frame + 1) * height / FRAME_COUNT) as isize;
    let stars = (width / 10).max(6) + frame * 2;
    for _ in 0..stars {
        let row = wave_front + rng.gen_range(0..7) - 3;
        if row < 0 || row as usize >= height {
            continue;
        }
        let line = &mut rows[row as usize];
        if line.is_empty() {
            continue;
        }
        let col = rng.gen_range(0..line.len());
        let distance = (row - wave_front).unsigned_abs();
        line[col] = SPARKLES[distance.min(SPARKLES.len() - 1)];
    }

    rows.into_iter()
        .map(|chars| chars.into_iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{Animation, FRAME_COUNT, FrameStep, SPARKLES, sparkle_frame};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn base(lines: usize) -> Vec<String> {
        (0..lines)
            .map(|index| format!("├── TASK-{index:03} - some work item"))
            .collect()
    }

    #[test]
    fn advance_is_idle_when_not_animating() {
        let mut animation = Animation::with_seed(7);
        assert_eq!(animation.advance(&base(4), 80), FrameStep::Idle);
        assert_eq!(animation.frame, 0);
    }

    #[test]
    fn full_sequence_finishes_after_frame_count_ticks() {
        let mut animation = Animation::with_seed(7);
        animation.start();
        for _ in 1..FRAME_COUNT {
            assert_eq!(animation.advance(&base(10), 80), FrameStep::Continue);
            assert!(animation.overlay().is_some());
        }
        assert_eq!(animation.advance(&base(10), 80), FrameStep::Finished);
        assert!(!animation.animating);
        assert_eq!(animation.frame, 0);
        assert!(animation.overlay().is_none());
    }

    #[test]
    fn same_seed_replays_identical_frames() {
        let mut first = Animation::with_seed(42);
        let mut second = Animation::with_seed(42);
        first.start();
        second.start();
        first.advance(&base(12), 60);
        second.advance(&base(12), 60);
        assert_eq!(first.overlay(), second.overlay());
    }

    #[test]
    fn sparkle_frame_keeps_shape_and_only_draws_sparkles() {
        let lines = base(16);
        let mut rng = StdRng::seed_from_u64(3);
        let frame = sparkle_frame(&lines, 80, 3, &mut rng);

        assert_eq!(frame.len(), lines.len());
        let mut changed = 0;
        for (before, after) in lines.iter().zip(&frame) {
            assert_eq!(before.chars().count(), after.chars().count());
            for (old, new) in before.chars().zip(after.chars()) {
                if old != new {
                    changed += 1;
                    assert!(SPARKLES.contains(&new), "unexpected glyph {new:?}");
                }
            }
        }
        assert!(changed > 0, "expected at least one sparkle");
    }

    #[test]
    fn sparkle_frame_passes_through_empty_input() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(sparkle_frame(&[], 80, 0, &mut rng).is_empty());
        let lines = base(2);
        assert_eq!(sparkle_frame(&lines, 0, 0, &mut rng), lines);
    }
}
