use std::cell::RefCell;
use std::rc::Rc;

use super::viewport::{ElementRect, Listener, Subscription, Viewport};

/// Central part of the viewport that counts as "being read".
///
/// Margins are fractions of the viewport height cut from the top and bottom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportBand {
    pub top_margin: f64,
    pub bottom_margin: f64,
}

impl Default for ViewportBand {
    fn default() -> Self {
        Self {
            top_margin: 0.20,
            bottom_margin: 0.35,
        }
    }
}

impl ViewportBand {
    pub fn intersects(&self, rect: ElementRect, viewport_height: f64) -> bool {
        let band_top = viewport_height * self.top_margin;
        let band_bottom = viewport_height * (1.0 - self.bottom_margin);
        rect.top < band_bottom && rect.bottom() > band_top
    }
}

/// Intersection change for one heading's content region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntersectionEntry {
    pub id: String,
    pub is_intersecting: bool,
}

/// Which heading is currently being read
#[derive(Debug, Clone, Default)]
pub struct ActiveHeading {
    active: Option<String>,
}

impl ActiveHeading {
    /// Apply one batch of intersection changes; the last intersecting entry wins.
    ///
    /// Entries that stop intersecting never clear the active id.
    pub fn observe(&mut self, entries: &[IntersectionEntry]) {
        for entry in entries.iter().filter(|e| e.is_intersecting) {
            self.active = Some(entry.id.clone());
        }
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }
}

struct HeadingObserver {
    ids: Vec<String>,
    band: ViewportBand,
    /// Last reported state per id; `None` until first observed
    previous: Vec<Option<bool>>,
    state: ActiveHeading,
}

impl HeadingObserver {
    /// Entries whose intersection state changed since the last poll
    fn poll(&mut self, viewport: &dyn Viewport) -> Vec<IntersectionEntry> {
        let viewport_height = viewport.document_extent().viewport_height;
        let mut changed = Vec::new();

        for (id, previous) in self.ids.iter().zip(self.previous.iter_mut()) {
            let Some(rect) = viewport.element_rect(id) else {
                continue;
            };
            let now = self.band.intersects(rect, viewport_height);
            if *previous != Some(now) {
                *previous = Some(now);
                changed.push(IntersectionEntry {
                    id: id.clone(),
                    is_intersecting: now,
                });
            }
        }

        changed
    }

    fn update(&mut self, viewport: &dyn Viewport) {
        let entries = self.poll(viewport);
        if !entries.is_empty() {
            self.state.observe(&entries);
        }
    }
}

/// Active TOC entry bound to a viewport for the lifetime of one view.
///
/// Mirrors intersection observation: only state changes are reported, so a
/// heading that stays in the band does not steal focus back.
pub struct ActiveHeadingTracker {
    observer: Rc<RefCell<HeadingObserver>>,
    _subscription: Subscription,
}

impl ActiveHeadingTracker {
    pub fn mount(viewport: Rc<dyn Viewport>, ids: Vec<String>, band: ViewportBand) -> Self {
        let previous = vec![None; ids.len()];
        let observer = Rc::new(RefCell::new(HeadingObserver {
            ids,
            band,
            previous,
            state: ActiveHeading::default(),
        }));
        observer.borrow_mut().update(viewport.as_ref());

        let weak_viewport = Rc::downgrade(&viewport);
        let listener_observer = Rc::clone(&observer);
        let listener: Listener = Rc::new(move |_event| {
            if let Some(viewport) = weak_viewport.upgrade() {
                listener_observer.borrow_mut().update(viewport.as_ref());
            }
        });

        Self {
            observer,
            _subscription: Subscription::new(viewport, listener),
        }
    }

    pub fn active(&self) -> Option<String> {
        self.observer.borrow().state.active().map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::testing::SimulatedViewport;

    fn entry(id: &str, is_intersecting: bool) -> IntersectionEntry {
        IntersectionEntry {
            id: id.to_string(),
            is_intersecting,
        }
    }

    #[test]
    fn test_band_intersection() {
        let band = ViewportBand::default();
        // Band spans 200..650 in a 1000px viewport
        assert!(band.intersects(ElementRect { top: 300.0, height: 10.0 }, 1000.0));
        assert!(!band.intersects(ElementRect { top: 700.0, height: 100.0 }, 1000.0));
        assert!(!band.intersects(ElementRect { top: 0.0, height: 150.0 }, 1000.0));
        assert!(band.intersects(ElementRect { top: 0.0, height: 250.0 }, 1000.0));
    }

    #[test]
    fn test_last_intersecting_entry_wins() {
        let mut state = ActiveHeading::default();
        state.observe(&[entry("a", true), entry("b", true), entry("c", false)]);
        assert_eq!(state.active(), Some("b"));
    }

    #[test]
    fn test_leaving_band_keeps_active() {
        let mut state = ActiveHeading::default();
        state.observe(&[entry("a", true)]);
        state.observe(&[entry("a", false)]);
        assert_eq!(state.active(), Some("a"));
    }

    #[test]
    fn test_tracker_follows_scroll() {
        let viewport = Rc::new(SimulatedViewport::new(5000.0, 1000.0));
        viewport.place("intro", 100.0, 40.0);
        viewport.place("pricing", 1500.0, 40.0);
        viewport.place("faq", 3000.0, 40.0);

        let tracker = ActiveHeadingTracker::mount(
            viewport.clone(),
            vec!["intro".into(), "pricing".into(), "faq".into()],
            ViewportBand::default(),
        );
        // intro at 100..140 sits above the band (200..650)
        assert_eq!(tracker.active(), None);

        viewport.scroll_to(-200.0);
        assert_eq!(tracker.active().as_deref(), Some("intro"));

        viewport.scroll_to(1200.0);
        assert_eq!(tracker.active().as_deref(), Some("pricing"));

        // Between headings: nothing in the band, pricing stays active
        viewport.scroll_to(2000.0);
        assert_eq!(tracker.active().as_deref(), Some("pricing"));

        viewport.scroll_to(2700.0);
        assert_eq!(tracker.active().as_deref(), Some("faq"));
    }

    #[test]
    fn test_tracker_unsubscribes_on_drop() {
        let viewport = Rc::new(SimulatedViewport::new(5000.0, 1000.0));
        let tracker =
            ActiveHeadingTracker::mount(viewport.clone(), vec![], ViewportBand::default());
        assert_eq!(viewport.listener_count(), 1);
        drop(tracker);
        assert_eq!(viewport.listener_count(), 0);
    }
}
