//! Page chrome shared by every page: the header, the navigation overlay, the
//! back button and the cart badge.

use askama::Template;

use crate::cart_store::CartStore;
use crate::storage::KeyValueStore;

/// Header styling state driven by the scroll position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderState {
    threshold_px: u32,
    scrolled: bool,
}

impl HeaderState {
    #[must_use]
    pub const fn new(threshold_px: u32) -> Self {
        Self {
            threshold_px,
            scrolled: false,
        }
    }

    /// Update for a new scroll offset. Returns `true` when the `scrolled`
    /// class has to be toggled.
    pub fn on_scroll(&mut self, scroll_y: f64) -> bool {
        let scrolled = scroll_y > f64::from(self.threshold_px);
        let changed = scrolled != self.scrolled;
        self.scrolled = scrolled;
        changed
    }

    /// Whether the header carries the `scrolled` class.
    #[must_use]
    pub const fn is_scrolled(&self) -> bool {
        self.scrolled
    }
}

/// The slide-in navigation overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavOverlay {
    open: bool,
}

impl NavOverlay {
    pub const ARIA_CONTROLS: &'static str = "nav-overlay";
    pub const OPEN_LABEL: &'static str = "Open navigation menu";
    pub const CLOSE_LABEL: &'static str = "Close navigation menu";

    #[must_use]
    pub const fn new() -> Self {
        Self { open: false }
    }

    pub const fn open(&mut self) {
        self.open = true;
    }

    pub const fn close(&mut self) {
        self.open = false;
    }

    /// Handle a key press. Escape closes an open overlay; returns whether the
    /// state changed.
    pub fn on_key(&mut self, key: &str) -> bool {
        if key == "Escape" && self.open {
            self.close();
            return true;
        }
        false
    }

    /// Following a navigation link always closes the overlay.
    pub const fn on_link_click(&mut self) {
        self.close();
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Value for the menu button's `aria-expanded` attribute.
    #[must_use]
    pub const fn aria_expanded(&self) -> &'static str {
        if self.open { "true" } else { "false" }
    }

    /// Overlay width style.
    #[must_use]
    pub const fn width(&self) -> &'static str {
        if self.open { "100%" } else { "0%" }
    }

    /// Whether the page body should stop scrolling behind the overlay.
    #[must_use]
    pub const fn locks_body_scroll(&self) -> bool {
        self.open
    }
}

/// Navigation the page performs in response to a chrome control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Go one step back in the browser history.
    HistoryBack,
}

/// The `#back-button` link.
///
/// A click never follows the link's own target; it goes back in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BackButton;

impl BackButton {
    pub const ELEMENT_ID: &'static str = "back-button";

    /// Handle a click. The default link navigation is always suppressed.
    #[must_use]
    pub const fn on_click() -> Navigation {
        Navigation::HistoryBack
    }
}

/// Cart count badge fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Template)]
#[template(path = "partials/cart_count.html")]
pub struct CartBadge {
    pub count: u64,
}

impl CartBadge {
    /// Read the current count from the persisted cart.
    #[must_use]
    pub fn from_store<S: KeyValueStore>(store: &CartStore<S>) -> Self {
        Self {
            count: store.item_count(),
        }
    }

    /// The badge is hidden while the cart is empty.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.count > 0
    }
}
