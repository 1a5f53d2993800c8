use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use super::viewport::{DocumentExtent, ElementRect, Listener, ListenerId, Viewport, ViewportEvent};

/// In-memory page: elements are placed at fixed document offsets and move
/// with the scroll position.
pub struct SimulatedViewport {
    scroll: Cell<f64>,
    extent: Cell<DocumentExtent>,
    elements: RefCell<BTreeMap<String, (f64, f64)>>,
    listeners: RefCell<Vec<(ListenerId, Listener)>>,
    next_id: Cell<u64>,
}

impl SimulatedViewport {
    pub fn new(document_height: f64, viewport_height: f64) -> Self {
        Self {
            scroll: Cell::new(0.0),
            extent: Cell::new(DocumentExtent {
                document_height,
                viewport_height,
            }),
            elements: RefCell::new(BTreeMap::new()),
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    pub fn place(&self, id: &str, offset_top: f64, height: f64) {
        self.elements
            .borrow_mut()
            .insert(id.to_string(), (offset_top, height));
    }

    pub fn scroll_to(&self, position: f64) {
        self.scroll.set(position);
        self.emit(ViewportEvent::Scroll);
    }

    pub fn resize(&self, viewport_height: f64) {
        let mut extent = self.extent.get();
        extent.viewport_height = viewport_height;
        self.extent.set(extent);
        self.emit(ViewportEvent::Resize);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    fn emit(&self, event: ViewportEvent) {
        // Snapshot so listeners may read geometry or unsubscribe while running
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(event);
        }
    }
}

impl Viewport for SimulatedViewport {
    fn scroll_position(&self) -> f64 {
        self.scroll.get()
    }

    fn document_extent(&self) -> DocumentExtent {
        self.extent.get()
    }

    fn element_rect(&self, id: &str) -> Option<ElementRect> {
        self.elements
            .borrow()
            .get(id)
            .map(|&(offset_top, height)| ElementRect {
                top: offset_top - self.scroll.get(),
                height,
            })
    }

    fn subscribe(&self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
    }
}
