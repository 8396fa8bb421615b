/// Buttons the camera reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left button.
    Primary,
    /// Right button.
    Secondary,
    /// Wheel button.
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// A discrete input edge delivered by the windowing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEvent {
    ButtonDown(MouseButton),
    ButtonUp(MouseButton),
    /// One wheel notch.
    Scroll(ScrollDirection),
}

impl InputEvent {
    /// Map a signed wheel delta (positive = away from the user) to notches.
    pub fn scroll_notches(delta: f64) -> impl Iterator<Item = InputEvent> {
        let dir = if delta > 0.0 {
            ScrollDirection::Up
        } else {
            ScrollDirection::Down
        };
        let count = if delta.is_finite() && delta != 0.0 {
            (delta.abs().round() as usize).max(1)
        } else {
            0
        };
        std::iter::repeat_n(InputEvent::Scroll(dir), count)
    }
}
