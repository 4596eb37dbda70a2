use std::{fmt::Debug, time::Duration};

use serde::Serialize;
use thiserror::Error;

use crate::patch::PatchRequest;

/// Viewport-relative bounding box of an element
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// Document-relative position for the popup or tooltip
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub top: f64,
    pub left: f64,
}

/// Identifies one scheduled callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(pub u64);

/// Detail of the `edit-saved` event dispatched on the edited element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSaved {
    pub edit_id: String,
    pub new_text: String,
    pub original_text: String,
}

/// Why a save request failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    #[error("HTTP error! status: {0}")]
    Status(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
}

/// The page the overlay runs in.
///
/// Implementations wrap the document: element lookup, the popup and tooltip
/// nodes, listener registration, timers and the network. The controller never
/// touches any of these directly.
pub trait OverlayHost {
    /// Handle to one element of the page
    type Element: Clone + PartialEq + Debug;

    /// Attach the capture-phase click, key-down, scroll, resize and hover
    /// listeners that feed events back into the controller
    fn attach_listeners(&mut self);
    fn detach_listeners(&mut self);

    /// Toggle `data-edit-mode-enabled` on the document root
    fn set_edit_mode_marker(&mut self, enabled: bool);

    /// Inject the popup styles and markup, wiring its buttons
    fn create_popup(&mut self, styles: &str, html: &str);
    fn create_tooltip(&mut self);

    /// Nearest ancestor-or-self carrying an edit identifier
    fn closest_tagged(&self, target: &Self::Element) -> Option<Self::Element>;
    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;
    fn text_content(&self, element: &Self::Element) -> String;
    fn set_text_content(&mut self, element: &Self::Element, text: &str);
    fn bounding_rect(&self, element: &Self::Element) -> Rect;
    /// Current `(scroll_x, scroll_y)`
    fn scroll_offset(&self) -> (f64, f64);
    fn set_editing_marker(&mut self, element: &Self::Element, editing: bool);
    fn dispatch_edit_saved(&mut self, element: &Self::Element, detail: &EditSaved);

    /// Whether `target` is the popup or inside it
    fn popup_contains(&self, target: &Self::Element) -> bool;
    /// Show the popup with `text` in its focused textarea
    fn show_popup(&mut self, text: &str, position: Position);
    fn move_popup(&mut self, position: Position);
    fn hide_popup(&mut self);
    fn popup_text(&self) -> String;

    fn show_tooltip(&mut self, text: &str, position: Position);
    fn hide_tooltip(&mut self);

    /// Call back with [`super::OverlayEvent::TimerFired`] after `delay`
    fn schedule(&mut self, delay: Duration, token: TimerToken);

    /// Send a save without blocking, reporting back through
    /// [`super::OverlayEvent::SaveCompleted`]. Hosts should give up after
    /// `timeout` and report [`SaveError::Timeout`].
    fn post_edit(&mut self, url: &str, request: &PatchRequest, timeout: Duration);

    fn alert(&mut self, message: &str);
    fn page_url(&self) -> String;
}

/// Supplies the origin of the frame hosting the page, when it can be
/// determined
pub trait OriginResolver {
    fn parent_origin(&self) -> Option<String>;
}

impl<F> OriginResolver for F
where
    F: Fn() -> Option<String>,
{
    fn parent_origin(&self) -> Option<String> {
        self()
    }
}
