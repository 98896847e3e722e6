//! Mobile navigation menu.
//!
//! The controller owns the open/closed state. The toggle button, the panel
//! and the body scroll-lock are mirrors of that state and are only ever
//! written together, in a single transition.

pub const ESCAPE_KEY: &str = "Escape";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MenuState {
    #[default]
    Closed,
    Open,
}

impl MenuState {
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    fn toggled(self) -> Self {
        match self {
            Self::Closed => Self::Open,
            Self::Open => Self::Closed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuSurface {
    Button,
    Panel,
}

/// Rendering side of the menu.
pub trait MenuView {
    fn set_active(&self, surface: MenuSurface, active: bool);

    fn set_scroll_lock(&self, locked: bool);
}

pub struct MenuController<V> {
    view: V,
    state: MenuState,
}

impl<V: MenuView> MenuController<V> {
    pub fn new(view: V) -> Self {
        Self {
            view,
            state: MenuState::Closed,
        }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Menu button activated.
    pub fn toggle(&mut self) {
        self.apply(self.state.toggled());
    }

    /// A link inside the panel was followed.
    pub fn link_activated(&mut self) {
        self.close();
    }

    /// A pointer activation somewhere on the page. `inside_menu` is true when
    /// the target sits within the button or the panel; those activations are
    /// handled by their own triggers.
    pub fn pointer_activated(&mut self, inside_menu: bool) {
        if !inside_menu {
            self.close();
        }
    }

    pub fn key_pressed(&mut self, key: &str) {
        if key == ESCAPE_KEY {
            self.close();
        }
    }

    pub fn close(&mut self) {
        if self.state.is_open() {
            self.apply(MenuState::Closed);
        }
    }

    fn apply(&mut self, next: MenuState) {
        self.state = next;
        let open = next.is_open();
        self.view.set_active(MenuSurface::Button, open);
        self.view.set_active(MenuSurface::Panel, open);
        self.view.set_scroll_lock(open);
    }
}
