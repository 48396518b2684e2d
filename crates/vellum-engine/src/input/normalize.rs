use crate::coords::CoordinateSpace;

use super::types::{Event, MotionEvent, RawInput};

/// Converts backend-neutral raw input into engine events.
///
/// Holds the last accepted raw pointer position so motion deltas can be
/// computed across calls.
#[derive(Debug, Default, Clone)]
pub struct Normalizer {
    last_raw: Option<(i32, i32)>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets the previous pointer position; the next motion has zero delta.
    pub fn reset(&mut self) {
        self.last_raw = None;
    }

    /// Returns `None` for input the engine does not report: motion outside
    /// the logical screen and keys with neither a special identity nor an
    /// ASCII code.
    pub fn normalize(&mut self, raw: RawInput, space: &CoordinateSpace) -> Option<Event> {
        match raw {
            RawInput::Quit => Some(Event::Quit),

            RawInput::PointerMoved { x, y } => {
                let (px, py) = self.last_raw.unwrap_or((x, y));
                self.last_raw = Some((x, y));

                if !space.logical_bounds().contains(x, y) {
                    log::trace!("input: motion ({x}, {y}) outside logical screen");
                    return None;
                }

                let (lx, ly) = space.detranslate(x, y, true);
                Some(Event::MouseMotion(MotionEvent {
                    x: lx,
                    y: ly,
                    xraw: x,
                    yraw: y,
                    dx: x.saturating_sub(px),
                    dy: y.saturating_sub(py),
                }))
            }

            RawInput::PointerButton { button, edge } => Some(Event::MouseButton { button, edge }),

            RawInput::Key { special: Some(key), edge, .. } => Some(Event::KeySpecial { key, edge }),
            RawInput::Key { ascii: Some(code), edge, .. } if (1..0x80).contains(&code) => {
                Some(Event::KeyAscii { code, edge })
            }
            RawInput::Key { .. } => None,
        }
    }
}
