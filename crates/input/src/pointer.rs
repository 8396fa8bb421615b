use glam::DVec2;

/// Per-tick view of the pointer.
pub trait PointerSource {
    /// Whether the orbit modifier (Alt/Option) is held.
    fn modifier_held(&self) -> bool;

    /// Pointer position in surface pixels, or `None` when outside the surface.
    fn pointer(&self) -> Option<DVec2>;
}

/// Pointer state kept current by the windowing layer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    position: Option<DVec2>,
    modifier: bool,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn moved(&mut self, x: f64, y: f64) {
        self.position = Some(DVec2::new(x, y));
    }

    pub fn left(&mut self) {
        self.position = None;
    }

    pub fn set_modifier(&mut self, held: bool) {
        self.modifier = held;
    }
}

impl PointerSource for PointerState {
    fn modifier_held(&self) -> bool {
        self.modifier
    }

    fn pointer(&self) -> Option<DVec2> {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_outside_without_modifier() {
        let p = PointerState::new();
        assert!(p.pointer().is_none());
        assert!(!p.modifier_held());
    }

    #[test]
    fn leaving_clears_position() {
        let mut p = PointerState::new();
        p.moved(10.0, 20.0);
        assert_eq!(p.pointer(), Some(DVec2::new(10.0, 20.0)));
        p.left();
        assert!(p.pointer().is_none());
    }

    #[test]
    fn modifier_tracks_latest_state() {
        let mut p = PointerState::new();
        p.set_modifier(true);
        assert!(p.modifier_held());
        p.set_modifier(false);
        assert!(!p.modifier_held());
    }
}
