use std::cell::Cell;

pub const DEFAULT_SCROLL_THRESHOLD_PX: f64 = 300.0;
pub const VISIBLE_CLASS: &str = "visible";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

impl ScrollBehavior {
    /// Smooth unless the reader asked the platform for reduced motion.
    pub fn for_motion_preference(prefers_reduced_motion: bool) -> Self {
        if prefers_reduced_motion {
            Self::Instant
        } else {
            Self::Smooth
        }
    }
}

pub fn back_to_top_visible(offset: f64, threshold: f64) -> bool {
    offset > threshold
}

pub trait VisibilityView {
    fn set_visible(&self, visible: bool);
}

/// Shows the back-to-top control once the page is scrolled past a threshold.
pub struct BackToTop<V> {
    view: V,
    threshold: f64,
    applied: Cell<Option<bool>>,
}

impl<V: VisibilityView> BackToTop<V> {
    pub fn new(view: V, threshold: f64) -> Self {
        Self {
            view,
            threshold,
            applied: Cell::new(None),
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn is_visible(&self) -> bool {
        self.applied.get().unwrap_or(false)
    }

    /// Recomputes visibility for the current vertical offset. Returns the
    /// resulting flag; the view is only written when it changes.
    pub fn on_scroll(&self, offset: f64) -> bool {
        let visible = back_to_top_visible(offset, self.threshold);
        if self.applied.get() != Some(visible) {
            self.view.set_visible(visible);
            self.applied.set(Some(visible));
        }
        visible
    }
}
