//! Home synthesis from a triple-click of Start.
//!
//! Three rising edges within [`TRIPLE_CLICK_WINDOW`] poll cycles of the
//! first one arm Home. Home is then held for as long as the third press
//! is held and cleared on release. At a 5 ms poll the window is about
//! 500 ms.

/// Presses needed to synthesize Home.
pub const TRIPLE_CLICK_COUNT: u8 = 3;

/// Poll cycles, counted from the first press, the remaining presses must
/// land in.
pub const TRIPLE_CLICK_WINDOW: u16 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum ClickState {
    Idle,
    Counting { clicks: u8, elapsed: u16 },
    Firing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TripleClickDetector {
    state: ClickState,
    was_pressed: bool,
}

impl Default for TripleClickDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl TripleClickDetector {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: ClickState::Idle,
            was_pressed: false,
        }
    }

    /// Feed the button level for one cycle. Returns whether Home is held.
    pub fn update(&mut self, pressed: bool) -> bool {
        let rising = pressed && !self.was_pressed;
        self.was_pressed = pressed;

        self.state = match self.state {
            ClickState::Idle if rising => ClickState::Counting {
                clicks: 1,
                elapsed: 0,
            },
            ClickState::Idle => ClickState::Idle,
            ClickState::Counting { clicks, elapsed } => {
                let elapsed = elapsed.saturating_add(1);
                if rising && clicks + 1 >= TRIPLE_CLICK_COUNT {
                    ClickState::Firing
                } else if rising {
                    ClickState::Counting {
                        clicks: clicks + 1,
                        elapsed,
                    }
                } else if elapsed >= TRIPLE_CLICK_WINDOW {
                    ClickState::Idle
                } else {
                    ClickState::Counting { clicks, elapsed }
                }
            }
            ClickState::Firing if pressed => ClickState::Firing,
            ClickState::Firing => ClickState::Idle,
        };

        self.state == ClickState::Firing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Press for `down` cycles then release for `up` cycles, counting the
    /// cycles Home is held.
    fn click(detector: &mut TripleClickDetector, down: usize, up: usize, out: &mut u32) {
        for _ in 0..down {
            if detector.update(true) {
                *out += 1;
            }
        }
        for _ in 0..up {
            if detector.update(false) {
                *out += 1;
            }
        }
    }

    #[test]
    fn test_fast_triple_click_fires() {
        let mut detector = TripleClickDetector::new();
        let mut home_cycles = 0;
        click(&mut detector, 2, 3, &mut home_cycles);
        click(&mut detector, 2, 3, &mut home_cycles);
        assert_eq!(home_cycles, 0);
        click(&mut detector, 4, 1, &mut home_cycles);
        assert_eq!(home_cycles, 4);
    }

    #[test]
    fn test_home_fires_once_per_triple_click() {
        let mut detector = TripleClickDetector::new();
        let mut prev = false;
        let mut edges = 0;
        for _ in 0..6 {
            for level in [true, true, false, false] {
                let home = detector.update(level);
                if home && !prev {
                    edges += 1;
                }
                prev = home;
            }
        }
        // six clicks make two triple-clicks
        assert_eq!(edges, 2);
    }

    #[test]
    fn test_slow_clicks_do_not_fire() {
        let mut detector = TripleClickDetector::new();
        let mut home_cycles = 0;
        let gap = usize::from(TRIPLE_CLICK_WINDOW) / 2;
        click(&mut detector, 1, gap, &mut home_cycles);
        click(&mut detector, 1, gap, &mut home_cycles);
        click(&mut detector, 1, gap, &mut home_cycles);
        assert_eq!(home_cycles, 0);
    }

    #[test]
    fn test_window_expiry_restarts_count() {
        let mut detector = TripleClickDetector::new();
        let mut home_cycles = 0;
        click(&mut detector, 1, 1, &mut home_cycles);
        click(&mut detector, 1, usize::from(TRIPLE_CLICK_WINDOW), &mut home_cycles);
        // the window has lapsed, so this press starts a new count
        click(&mut detector, 1, 1, &mut home_cycles);
        click(&mut detector, 1, 1, &mut home_cycles);
        assert_eq!(home_cycles, 0);
        click(&mut detector, 1, 1, &mut home_cycles);
        assert_eq!(home_cycles, 1);
    }

    #[test]
    fn test_held_button_is_one_click() {
        let mut detector = TripleClickDetector::new();
        let mut home_cycles = 0;
        click(&mut detector, 50, 1, &mut home_cycles);
        click(&mut detector, 1, 1, &mut home_cycles);
        assert_eq!(home_cycles, 0);
        click(&mut detector, 1, 1, &mut home_cycles);
        assert_eq!(home_cycles, 1);
    }
}
