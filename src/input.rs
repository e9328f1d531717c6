//! Pointer normalization.
//!
//! Mouse and touch events both collapse into a single stream of
//! [`PointerInput`] values. Touch follows the first contact only; extra
//! fingers are ignored until the primary one lifts.

use glam::Vec2;
use winit::event::{ElementState, TouchPhase, WindowEvent};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Down(Vec2),
    Move(Vec2),
    Up,
}

#[derive(Debug, Default)]
pub struct PointerTracker {
    cursor: Vec2,
    primary_touch: Option<u64>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primary_touch(&self) -> Option<u64> {
        self.primary_touch
    }

    /// Translates a window event, returning `None` for anything that is not
    /// pointer input.
    pub fn translate(&mut self, event: &WindowEvent) -> Option<PointerInput> {
        match event {
            WindowEvent::MouseInput { state, .. } => Some(self.mouse_button(*state)),
            WindowEvent::CursorMoved { position, .. } => {
                Some(self.cursor_moved(Vec2::new(position.x as f32, position.y as f32)))
            }
            WindowEvent::Touch(touch) => self.touch(
                touch.id,
                touch.phase,
                Vec2::new(touch.location.x as f32, touch.location.y as f32),
            ),
            _ => None,
        }
    }

    pub fn mouse_button(&mut self, state: ElementState) -> PointerInput {
        match state {
            ElementState::Pressed => PointerInput::Down(self.cursor),
            ElementState::Released => PointerInput::Up,
        }
    }

    pub fn cursor_moved(&mut self, position: Vec2) -> PointerInput {
        self.cursor = position;
        PointerInput::Move(position)
    }

    pub fn touch(&mut self, id: u64, phase: TouchPhase, position: Vec2) -> Option<PointerInput> {
        match phase {
            TouchPhase::Started => {
                if self.primary_touch.is_some() {
                    return None;
                }
                self.primary_touch = Some(id);
                Some(PointerInput::Down(position))
            }
            TouchPhase::Moved => {
                (self.primary_touch == Some(id)).then_some(PointerInput::Move(position))
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                if self.primary_touch != Some(id) {
                    return None;
                }
                self.primary_touch = None;
                Some(PointerInput::Up)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mouse_press_uses_last_cursor_position() {
        let mut tracker = PointerTracker::new();
        assert_eq!(
            tracker.cursor_moved(Vec2::new(12.0, 34.0)),
            PointerInput::Move(Vec2::new(12.0, 34.0))
        );
        assert_eq!(
            tracker.mouse_button(ElementState::Pressed),
            PointerInput::Down(Vec2::new(12.0, 34.0))
        );
        assert_eq!(tracker.mouse_button(ElementState::Released), PointerInput::Up);
    }

    #[test]
    fn only_first_touch_is_followed() {
        let mut tracker = PointerTracker::new();
        let a = Vec2::new(1.0, 1.0);
        let b = Vec2::new(50.0, 50.0);

        assert_eq!(tracker.touch(7, TouchPhase::Started, a), Some(PointerInput::Down(a)));
        assert_eq!(tracker.touch(8, TouchPhase::Started, b), None);
        assert_eq!(tracker.touch(8, TouchPhase::Moved, b), None);
        assert_eq!(tracker.touch(7, TouchPhase::Moved, b), Some(PointerInput::Move(b)));
        assert_eq!(tracker.touch(8, TouchPhase::Ended, b), None);
        assert_eq!(tracker.primary_touch(), Some(7));
        assert_eq!(tracker.touch(7, TouchPhase::Ended, b), Some(PointerInput::Up));
        assert_eq!(tracker.primary_touch(), None);
    }

    #[test]
    fn cancelled_touch_releases_drag() {
        let mut tracker = PointerTracker::new();
        tracker.touch(3, TouchPhase::Started, Vec2::ZERO);
        assert_eq!(
            tracker.touch(3, TouchPhase::Cancelled, Vec2::ZERO),
            Some(PointerInput::Up)
        );
        assert_eq!(
            tracker.touch(4, TouchPhase::Started, Vec2::ONE),
            Some(PointerInput::Down(Vec2::ONE))
        );
    }
}
