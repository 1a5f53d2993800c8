use super::viewport::ElementRect;

/// Visibility latch behind scroll-in animations
#[derive(Debug, Clone)]
pub struct RevealState {
    threshold: f64,
    trigger_once: bool,
    visible: bool,
}

impl RevealState {
    /// `threshold` is the visible fraction of the element that counts as shown
    pub fn new(threshold: f64, trigger_once: bool) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            trigger_once,
            visible: false,
        }
    }

    pub fn observe(&mut self, rect: ElementRect, viewport_height: f64) {
        if self.trigger_once && self.visible {
            return;
        }
        let fraction = visible_fraction(rect, viewport_height);
        self.visible = fraction > 0.0 && fraction >= self.threshold;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl Default for RevealState {
    fn default() -> Self {
        Self::new(0.1, true)
    }
}

/// Share of the element's height inside the viewport
pub fn visible_fraction(rect: ElementRect, viewport_height: f64) -> f64 {
    if rect.height <= 0.0 {
        return 0.0;
    }
    let top = rect.top.max(0.0);
    let bottom = rect.bottom().min(viewport_height);
    ((bottom - top) / rect.height).clamp(0.0, 1.0)
}
