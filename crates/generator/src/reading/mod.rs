//! Scroll-driven reading state: progress bar, active TOC entry, reveal-on-scroll.
//!
//! Everything here reads geometry through the [`Viewport`] capability instead
//! of a browser global, so the state machines run the same under a real
//! renderer and under [`testing::SimulatedViewport`].

pub mod headings;
pub mod progress;
pub mod reveal;
pub mod viewport;

pub use headings::{ActiveHeading, ActiveHeadingTracker, IntersectionEntry, ViewportBand};
pub use progress::{ProgressTarget, ScrollProgressTracker, document_progress, element_progress};
pub use reveal::RevealState;
pub use viewport::{
    DocumentExtent, ElementRect, Listener, ListenerId, Subscription, Viewport, ViewportEvent,
};

#[cfg(test)]
pub(crate) mod testing;
