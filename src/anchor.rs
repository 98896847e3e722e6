pub const DEFAULT_HEADER_GAP_PX: f64 = 20.0;

/// Returns the element id an in-page link points at. A bare `#` has no
/// target.
pub fn fragment_id(href: &str) -> Option<&str> {
    let id = href.trim().strip_prefix('#')?;
    (!id.is_empty()).then_some(id)
}

/// Offset that puts `element_top` just below a fixed header.
pub fn scroll_target(element_top: f64, header_height: f64, gap: f64) -> f64 {
    element_top - header_height - gap
}

/// Page geometry and scrolling, as seen by in-page navigation.
pub trait ScrollSurface {
    fn element_top(&self, id: &str) -> Option<f64>;

    /// Current height of the fixed header; read on every navigation since
    /// responsive layouts change it.
    fn header_height(&self) -> f64;

    fn scroll_to(&self, top: f64);
}

pub struct AnchorNavigator<S> {
    surface: S,
    gap: f64,
}

impl<S: ScrollSurface> AnchorNavigator<S> {
    pub fn new(surface: S, gap: f64) -> Self {
        Self { surface, gap }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Follows an in-page link. Returns the offset scrolled to, or `None` when
    /// the link has no resolvable target.
    pub fn navigate(&self, href: &str) -> Option<f64> {
        self.scroll_to_section(fragment_id(href)?)
    }

    pub fn scroll_to_section(&self, id: &str) -> Option<f64> {
        let top = self.surface.element_top(id)?;
        let target = scroll_target(top, self.surface.header_height(), self.gap);
        self.surface.scroll_to(target);
        Some(target)
    }

    pub fn scroll_to_top(&self) {
        self.surface.scroll_to(0.0);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    use super::*;

    #[derive(Default)]
    struct FakePage {
        sections: HashMap<&'static str, f64>,
        header: Cell<f64>,
        scrolls: RefCell<Vec<f64>>,
    }

    impl ScrollSurface for FakePage {
        fn element_top(&self, id: &str) -> Option<f64> {
            self.sections.get(id).copied()
        }

        fn header_height(&self) -> f64 {
            self.header.get()
        }

        fn scroll_to(&self, top: f64) {
            self.scrolls.borrow_mut().push(top);
        }
    }

    fn bakery_page() -> FakePage {
        FakePage {
            sections: HashMap::from([("home", 0.0), ("menu", 900.0), ("contact", 2_400.0)]),
            header: Cell::new(80.0),
            ..FakePage::default()
        }
    }

    #[test]
    fn fragment_requires_hash_and_name() {
        assert_eq!(fragment_id("#menu"), Some("menu"));
        assert_eq!(fragment_id("#"), None);
        assert_eq!(fragment_id("menu.html"), None);
        assert_eq!(fragment_id(""), None);
    }

    #[test]
    fn navigation_compensates_for_header_and_gap() {
        let navigator = AnchorNavigator::new(bakery_page(), DEFAULT_HEADER_GAP_PX);

        assert_eq!(navigator.navigate("#menu"), Some(800.0));
        assert_eq!(*navigator.surface().scrolls.borrow(), vec![800.0]);
    }

    #[test]
    fn header_height_is_reread_per_navigation() {
        let navigator = AnchorNavigator::new(bakery_page(), DEFAULT_HEADER_GAP_PX);

        navigator.navigate("#contact");
        navigator.surface().header.set(60.0);
        navigator.navigate("#contact");

        assert_eq!(*navigator.surface().scrolls.borrow(), vec![2_300.0, 2_320.0]);
    }

    #[test]
    fn missing_target_does_not_scroll() {
        let navigator = AnchorNavigator::new(bakery_page(), DEFAULT_HEADER_GAP_PX);

        assert_eq!(navigator.navigate("#catering"), None);
        assert_eq!(navigator.navigate("#"), None);
        assert!(navigator.surface().scrolls.borrow().is_empty());
    }

    #[test]
    fn negative_offsets_are_passed_through() {
        let navigator = AnchorNavigator::new(bakery_page(), DEFAULT_HEADER_GAP_PX);

        assert_eq!(navigator.scroll_to_section("home"), Some(-100.0));
    }

    #[test]
    fn back_to_top_scrolls_to_origin() {
        let navigator = AnchorNavigator::new(bakery_page(), DEFAULT_HEADER_GAP_PX);

        navigator.scroll_to_top();

        assert_eq!(*navigator.surface().scrolls.borrow(), vec![0.0]);
    }
}
