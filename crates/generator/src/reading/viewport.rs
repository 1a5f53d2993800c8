use std::rc::Rc;

/// Scrollable height of the page and the visible window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentExtent {
    pub document_height: f64,
    pub viewport_height: f64,
}

/// Element box relative to the top of the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementRect {
    pub top: f64,
    pub height: f64,
}

impl ElementRect {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportEvent {
    Scroll,
    Resize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

pub type Listener = Rc<dyn Fn(ViewportEvent)>;

/// Scroll and layout state of the hosting page.
///
/// Single-threaded: listeners run on the event loop that owns the page.
pub trait Viewport {
    fn scroll_position(&self) -> f64;

    fn document_extent(&self) -> DocumentExtent;

    /// Current box of the element with this id, `None` when not mounted
    fn element_rect(&self, id: &str) -> Option<ElementRect>;

    fn subscribe(&self, listener: Listener) -> ListenerId;

    fn unsubscribe(&self, id: ListenerId);
}

/// Scroll/resize registration that is released on drop
pub struct Subscription {
    viewport: Rc<dyn Viewport>,
    id: ListenerId,
}

impl Subscription {
    pub fn new(viewport: Rc<dyn Viewport>, listener: Listener) -> Self {
        let id = viewport.subscribe(listener);
        Self { viewport, id }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.viewport.unsubscribe(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::testing::SimulatedViewport;
    use std::cell::Cell;

    #[test]
    fn test_subscription_released_on_drop() {
        let viewport = Rc::new(SimulatedViewport::new(2000.0, 800.0));
        let calls = Rc::new(Cell::new(0));

        let counter = Rc::clone(&calls);
        let subscription = Subscription::new(
            viewport.clone(),
            Rc::new(move |_| counter.set(counter.get() + 1)),
        );
        assert_eq!(viewport.listener_count(), 1);

        viewport.scroll_to(100.0);
        assert_eq!(calls.get(), 1);

        drop(subscription);
        assert_eq!(viewport.listener_count(), 0);

        viewport.scroll_to(200.0);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_element_rect_bottom() {
        let rect = ElementRect {
            top: -50.0,
            height: 300.0,
        };
        assert_eq!(rect.bottom(), 250.0);
    }
}
