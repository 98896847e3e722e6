pub const FOCUSABLE_SELECTOR: &str =
    r#"a, button, input, textarea, select, [tabindex]:not([tabindex="-1"])"#;
pub const FOCUS_OUTLINE: &str = "2px solid var(--accent)";
pub const FOCUS_OUTLINE_OFFSET: &str = "2px";

pub trait OutlineView {
    fn set_outline(&self, outline: &str, offset: &str);

    fn clear_outline(&self);
}

pub fn on_focus_change<V: OutlineView>(view: &V, focused: bool) {
    if focused {
        view.set_outline(FOCUS_OUTLINE, FOCUS_OUTLINE_OFFSET);
    } else {
        view.clear_outline();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Default)]
    struct FakeLink {
        outline: RefCell<Option<(String, String)>>,
    }

    impl OutlineView for FakeLink {
        fn set_outline(&self, outline: &str, offset: &str) {
            *self.outline.borrow_mut() = Some((outline.to_string(), offset.to_string()));
        }

        fn clear_outline(&self) {
            *self.outline.borrow_mut() = None;
        }
    }

    #[test]
    fn focus_draws_accent_ring_and_blur_clears_it() {
        let link = FakeLink::default();

        on_focus_change(&link, true);
        assert_eq!(
            *link.outline.borrow(),
            Some(("2px solid var(--accent)".to_string(), "2px".to_string()))
        );

        on_focus_change(&link, false);
        assert!(link.outline.borrow().is_none());
    }
}
