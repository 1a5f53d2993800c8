use std::cell::Cell;
use std::rc::Rc;

use super::viewport::{ElementRect, Listener, Subscription, Viewport};

/// What the progress bar measures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressTarget {
    /// Whole-page scroll
    Document,
    /// One content element, by id
    Element(String),
}

/// Whole-page progress, 0 when nothing can scroll
pub fn document_progress(scroll_top: f64, document_height: f64, viewport_height: f64) -> f64 {
    let scrollable = document_height - viewport_height;
    if scrollable <= 0.0 {
        return 0.0;
    }
    clamp_percent(scroll_top / scrollable * 100.0)
}

/// Progress through one element.
///
/// 0 while the element's top is at or below the bottom of the screen, 100
/// once its bottom edge has passed the top of the screen, linear between.
pub fn element_progress(rect: ElementRect, viewport_height: f64) -> f64 {
    let travel = rect.height + viewport_height;
    if travel <= 0.0 {
        return 0.0;
    }
    clamp_percent((viewport_height - rect.top) / travel * 100.0)
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Progress for the current viewport state
pub fn compute_progress(viewport: &dyn Viewport, target: &ProgressTarget) -> f64 {
    let extent = viewport.document_extent();
    match target {
        ProgressTarget::Document => document_progress(
            viewport.scroll_position(),
            extent.document_height,
            extent.viewport_height,
        ),
        ProgressTarget::Element(id) => viewport
            .element_rect(id)
            .map(|rect| element_progress(rect, extent.viewport_height))
            .unwrap_or(0.0),
    }
}

/// Reading progress bound to a viewport for the lifetime of one view.
///
/// Computed at mount and after every scroll/resize; dropping the tracker
/// removes its listener.
pub struct ScrollProgressTracker {
    progress: Rc<Cell<f64>>,
    _subscription: Subscription,
}

impl ScrollProgressTracker {
    pub fn mount(viewport: Rc<dyn Viewport>, target: ProgressTarget) -> Self {
        let progress = Rc::new(Cell::new(compute_progress(viewport.as_ref(), &target)));

        // Weak: the viewport owns this listener
        let weak_viewport = Rc::downgrade(&viewport);
        let cell = Rc::clone(&progress);
        let listener: Listener = Rc::new(move |_event| {
            if let Some(viewport) = weak_viewport.upgrade() {
                cell.set(compute_progress(viewport.as_ref(), &target));
            }
        });

        Self {
            progress,
            _subscription: Subscription::new(viewport, listener),
        }
    }

    /// Percentage in [0, 100]
    pub fn progress(&self) -> f64 {
        self.progress.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::testing::SimulatedViewport;

    #[test]
    fn test_document_progress_bounds() {
        assert_eq!(document_progress(0.0, 3000.0, 1000.0), 0.0);
        assert_eq!(document_progress(2000.0, 3000.0, 1000.0), 100.0);
        assert_eq!(document_progress(1000.0, 3000.0, 1000.0), 50.0);
        assert_eq!(document_progress(2500.0, 3000.0, 1000.0), 100.0);
        assert_eq!(document_progress(-40.0, 3000.0, 1000.0), 0.0);
    }

    #[test]
    fn test_document_progress_without_scrollable_content() {
        assert_eq!(document_progress(0.0, 800.0, 800.0), 0.0);
        assert_eq!(document_progress(10.0, 600.0, 800.0), 0.0);
    }

    #[test]
    fn test_element_progress() {
        let vh = 1000.0;
        // Element top at the bottom of the screen
        assert_eq!(element_progress(ElementRect { top: 1000.0, height: 2000.0 }, vh), 0.0);
        // Still below the fold
        assert_eq!(element_progress(ElementRect { top: 1400.0, height: 2000.0 }, vh), 0.0);
        // Halfway through the travel
        assert_eq!(element_progress(ElementRect { top: -500.0, height: 2000.0 }, vh), 50.0);
        // Bottom edge at the top of the screen
        assert_eq!(element_progress(ElementRect { top: -2000.0, height: 2000.0 }, vh), 100.0);
        // Long past
        assert_eq!(element_progress(ElementRect { top: -9000.0, height: 2000.0 }, vh), 100.0);
    }

    #[test]
    fn test_element_progress_degenerate_geometry() {
        assert_eq!(element_progress(ElementRect { top: 0.0, height: 0.0 }, 0.0), 0.0);
    }

    #[test]
    fn test_tracker_updates_on_scroll_and_resize() {
        let viewport = Rc::new(SimulatedViewport::new(3000.0, 1000.0));
        let tracker = ScrollProgressTracker::mount(viewport.clone(), ProgressTarget::Document);
        assert_eq!(tracker.progress(), 0.0);

        viewport.scroll_to(1000.0);
        assert_eq!(tracker.progress(), 50.0);

        viewport.resize(2000.0);
        assert_eq!(tracker.progress(), 100.0);
    }

    #[test]
    fn test_tracker_computes_at_mount() {
        let viewport = Rc::new(SimulatedViewport::new(3000.0, 1000.0));
        viewport.scroll_to(2000.0);
        let tracker = ScrollProgressTracker::mount(viewport.clone(), ProgressTarget::Document);
        assert_eq!(tracker.progress(), 100.0);
    }

    #[test]
    fn test_tracker_bound_to_element() {
        let viewport = Rc::new(SimulatedViewport::new(6000.0, 1000.0));
        viewport.place("article", 1500.0, 3000.0);
        let tracker = ScrollProgressTracker::mount(
            viewport.clone(),
            ProgressTarget::Element("article".to_string()),
        );
        assert_eq!(tracker.progress(), 0.0);

        // top = -500, travel = 4000, scrolled = 1500
        viewport.scroll_to(2000.0);
        assert_eq!(tracker.progress(), 37.5);

        viewport.scroll_to(4500.0);
        assert_eq!(tracker.progress(), 100.0);
    }

    #[test]
    fn test_tracker_missing_element_is_zero() {
        let viewport = Rc::new(SimulatedViewport::new(3000.0, 1000.0));
        let tracker = ScrollProgressTracker::mount(
            viewport.clone(),
            ProgressTarget::Element("nope".to_string()),
        );
        viewport.scroll_to(900.0);
        assert_eq!(tracker.progress(), 0.0);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let viewport = Rc::new(SimulatedViewport::new(5000.0, 1000.0));
        let tracker = ScrollProgressTracker::mount(viewport.clone(), ProgressTarget::Document);
        viewport.scroll_to(1234.0);
        let first = tracker.progress();
        for _ in 0..10 {
            viewport.scroll_to(1234.0);
        }
        assert_eq!(tracker.progress(), first);
    }

    #[test]
    fn test_teardown_removes_listener() {
        let viewport = Rc::new(SimulatedViewport::new(3000.0, 1000.0));
        let tracker = ScrollProgressTracker::mount(viewport.clone(), ProgressTarget::Document);
        assert_eq!(viewport.listener_count(), 1);
        drop(tracker);
        assert_eq!(viewport.listener_count(), 0);
    }
}
