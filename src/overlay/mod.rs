//! Browser-side click-to-edit controller.
//!
//! [`OverlayController`] is a plain state machine: the host page feeds it
//! [`OverlayEvent`]s and it drives the page back through [`OverlayHost`].
//! One controller is constructed per page and registered with whatever the
//! page uses to deliver events.

mod assets;
mod host;
mod messages;
mod translations;

pub use assets::*;
pub use host::{
    EditSaved, OriginResolver, OverlayHost, Position, Rect, SaveError, TimerToken,
};
pub use messages::HostMessage;
pub use translations::{Translations, TranslationsUpdate};

use std::time::Duration;

use crate::{
    config::OverlayConfig,
    edit_id::{EDIT_ENABLED_ATTRIBUTE, EDIT_ID_ATTRIBUTE},
    patch::PatchRequest,
};

/// How long the disabled-element tooltip stays up
pub const TOOLTIP_DURATION: Duration = Duration::from_millis(2000);
/// Recommended timeout for the save request
pub const SAVE_TIMEOUT: Duration = Duration::from_secs(10);

const POPUP_OFFSET: f64 = 10.0;
const TOOLTIP_OFFSET: f64 = 30.0;
const SAVE_FAILED_MESSAGE: &str = "Failed to save changes. Please try again.";

/// Input delivered by the host page
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEvent<E> {
    Message(HostMessage),
    /// Capture-phase click anywhere in the document
    Click { target: E },
    KeyDown { key: String },
    Scroll,
    Resize,
    MouseOver { target: E },
    MouseOut,
    SaveClicked,
    CancelClicked,
    TimerFired(TimerToken),
    SaveCompleted(Result<(), SaveError>),
}

/// Whether the host should stop the event's default action and propagation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Ignored,
    Consumed,
}

/// Coarse controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Inactive,
    Idle,
    Editing,
    /// A save is in flight; input is ignored until it completes
    Saving,
}

/// The element currently being edited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditingSession<E> {
    element: E,
    edit_id: String,
    original_text: String,
}

impl<E> EditingSession<E> {
    pub fn element(&self) -> &E {
        &self.element
    }

    pub fn edit_id(&self) -> &str {
        &self.edit_id
    }

    /// Trimmed text of the element when the session opened
    pub fn original_text(&self) -> &str {
        &self.original_text
    }
}

#[derive(Debug)]
struct PendingSave<E> {
    session: EditingSession<E>,
    new_text: String,
}

pub struct OverlayController<H: OverlayHost, R> {
    host: H,
    origin_resolver: R,
    config: OverlayConfig,
    translations: Translations,
    active: bool,
    popup_created: bool,
    tooltip_created: bool,
    tooltip_visible: bool,
    tooltip_generation: u64,
    session: Option<EditingSession<H::Element>>,
    pending: Option<PendingSave<H::Element>>,
}

impl<H, R> std::fmt::Debug for OverlayController<H, R>
where
    H: OverlayHost,
    R: OriginResolver,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayController")
            .field("state", &self.state())
            .field("session", &self.session)
            .field("translations", &self.translations)
            .finish()
    }
}

impl<H: OverlayHost, R: OriginResolver> OverlayController<H, R> {
    pub fn new(host: H, origin_resolver: R, config: OverlayConfig) -> Self {
        Self {
            host,
            origin_resolver,
            config,
            translations: Translations::default(),
            active: false,
            popup_created: false,
            tooltip_created: false,
            tooltip_visible: false,
            tooltip_generation: 0,
            session: None,
            pending: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn translations(&self) -> &Translations {
        &self.translations
    }

    pub fn session(&self) -> Option<&EditingSession<H::Element>> {
        self.session.as_ref()
    }

    pub fn state(&self) -> OverlayState {
        match (self.active, &self.session, &self.pending) {
            (false, _, _) => OverlayState::Inactive,
            (true, _, Some(_)) => OverlayState::Saving,
            (true, Some(_), None) => OverlayState::Editing,
            (true, None, None) => OverlayState::Idle,
        }
    }

    pub fn handle_event(&mut self, event: OverlayEvent<H::Element>) -> Disposition {
        match event {
            OverlayEvent::Message(message) => {
                self.handle_message(message);
                Disposition::Ignored
            }
            OverlayEvent::TimerFired(token) => {
                self.timer_fired(token);
                Disposition::Ignored
            }
            OverlayEvent::SaveCompleted(result) => {
                self.save_completed(result);
                Disposition::Ignored
            }
            _ if !self.active => Disposition::Ignored,
            OverlayEvent::Click { target } => self.click(&target),
            OverlayEvent::KeyDown { key } => self.key_down(&key),
            OverlayEvent::Scroll | OverlayEvent::Resize => {
                self.reposition_popup();
                Disposition::Ignored
            }
            OverlayEvent::MouseOver { target } => {
                self.mouse_over(&target);
                Disposition::Ignored
            }
            OverlayEvent::MouseOut => {
                self.hide_tooltip();
                Disposition::Ignored
            }
            OverlayEvent::SaveClicked => {
                self.save();
                Disposition::Consumed
            }
            OverlayEvent::CancelClicked => {
                if self.pending.is_none() {
                    self.close_session();
                }
                Disposition::Consumed
            }
        }
    }

    pub fn handle_message(&mut self, message: HostMessage) {
        match message {
            HostMessage::EnableEditMode { translations } => {
                if let Some(update) = translations {
                    self.translations.merge(update);
                }
                self.activate();
            }
            HostMessage::DisableEditMode => self.deactivate(),
        }
    }

    /// Inactive to Idle. Does nothing when already active.
    pub fn activate(&mut self) {
        if self.active {
            return;
        }

        if !self.popup_created {
            let html = popup_html(self.translations.save(), self.translations.cancel());
            self.host.create_popup(POPUP_STYLES, &html);
            self.popup_created = true;
        }
        if !self.tooltip_created {
            self.host.create_tooltip();
            self.tooltip_created = true;
        }

        self.host.attach_listeners();
        self.host.set_edit_mode_marker(true);
        self.active = true;
        log::debug!("[inline-edit] edit mode enabled");
    }

    /// Any active state to Inactive, dropping an open session. A save already
    /// in flight still completes.
    pub fn deactivate(&mut self) {
        if !self.active {
            return;
        }

        self.host.detach_listeners();
        self.active = false;
        self.close_session();
        if let Some(pending) = &self.pending {
            self.host.hide_popup();
            self.host.set_editing_marker(&pending.session.element, false);
        }
        self.hide_tooltip();
        self.host.set_edit_mode_marker(false);
        log::debug!("[inline-edit] edit mode disabled");
    }

    fn click(&mut self, target: &H::Element) -> Disposition {
        if self.pending.is_some() {
            return if self.host.closest_tagged(target).is_some() {
                Disposition::Consumed
            } else {
                Disposition::Ignored
            };
        }

        if self.session.is_some() && self.host.popup_contains(target) {
            return Disposition::Ignored;
        }

        let Some(element) = self.host.closest_tagged(target) else {
            self.close_session();
            return Disposition::Ignored;
        };
        let Some(edit_id) = self.host.attribute(&element, EDIT_ID_ATTRIBUTE) else {
            self.close_session();
            return Disposition::Ignored;
        };

        self.close_session();

        if self.host.attribute(&element, EDIT_ENABLED_ATTRIBUTE).is_none() {
            self.show_tooltip(&element);
            return Disposition::Consumed;
        }

        self.open_session(element, edit_id);
        Disposition::Consumed
    }

    fn key_down(&mut self, key: &str) -> Disposition {
        if key == "Escape" && self.session.is_some() && self.pending.is_none() {
            self.close_session();
            return Disposition::Consumed;
        }
        Disposition::Ignored
    }

    fn mouse_over(&mut self, target: &H::Element) {
        let tagged = self.host.attribute(target, EDIT_ID_ATTRIBUTE).is_some();
        let enabled = self.host.attribute(target, EDIT_ENABLED_ATTRIBUTE).is_some();
        if tagged && !enabled {
            self.show_tooltip(target);
        }
    }

    fn open_session(&mut self, element: H::Element, edit_id: String) {
        let original_text = self.host.text_content(&element).trim().to_string();
        let position = self.popup_position(&element);
        self.host.show_popup(&original_text, position);
        self.host.set_editing_marker(&element, true);
        self.session = Some(EditingSession {
            element,
            edit_id,
            original_text,
        });
    }

    fn close_session(&mut self) {
        if let Some(session) = self.session.take() {
            self.host.hide_popup();
            self.host.set_editing_marker(&session.element, false);
        }
    }

    fn reposition_popup(&mut self) {
        let Some(session) = &self.session else { return };
        let position = self.popup_position(&session.element);
        self.host.move_popup(position);
    }

    fn popup_position(&self, element: &H::Element) -> Position {
        let rect = self.host.bounding_rect(element);
        let (scroll_x, scroll_y) = self.host.scroll_offset();
        Position {
            top: scroll_y + rect.top + rect.height + POPUP_OFFSET,
            left: scroll_x + rect.left,
        }
    }

    fn save(&mut self) {
        if self.pending.is_some() {
            return;
        }
        let Some(session) = &self.session else { return };

        let new_text = self.host.popup_text().trim().to_string();
        if new_text == session.original_text {
            self.close_session();
            return;
        }

        if let Some(origin) = self.origin_resolver.parent_origin() {
            if !self.config.is_allowed_origin(&origin) {
                log::error!("[inline-edit] Invalid parent origin: {origin}");
                self.close_session();
                return;
            }
        }

        let request = PatchRequest {
            edit_id: Some(session.edit_id.clone()),
            new_text: Some(new_text.clone()),
            original_text: Some(session.original_text.clone()),
            url: Some(self.host.page_url()),
        };
        self.host
            .post_edit(self.config.apply_edit_url(), &request, SAVE_TIMEOUT);

        if let Some(session) = self.session.take() {
            self.pending = Some(PendingSave { session, new_text });
        }
    }

    fn save_completed(&mut self, result: Result<(), SaveError>) {
        let Some(PendingSave { session, new_text }) = self.pending.take() else {
            log::warn!("[inline-edit] save completed with nothing in flight");
            return;
        };

        match result {
            Ok(()) => {
                self.host.set_text_content(&session.element, &new_text);
                let detail = EditSaved {
                    edit_id: session.edit_id.clone(),
                    new_text,
                    original_text: session.original_text.clone(),
                };
                self.host.dispatch_edit_saved(&session.element, &detail);
            }
            Err(e) => {
                log::error!("[inline-edit] Error saving edit: {e}");
                self.host.alert(SAVE_FAILED_MESSAGE);
            }
        }

        self.host.hide_popup();
        self.host.set_editing_marker(&session.element, false);
    }

    fn show_tooltip(&mut self, element: &H::Element) {
        let rect = self.host.bounding_rect(element);
        let (scroll_x, scroll_y) = self.host.scroll_offset();
        let position = Position {
            top: scroll_y + rect.top - TOOLTIP_OFFSET,
            left: scroll_x + rect.left,
        };

        self.host
            .show_tooltip(self.translations.disabled_tooltip_text(), position);
        self.tooltip_visible = true;
        self.tooltip_generation += 1;
        self.host
            .schedule(TOOLTIP_DURATION, TimerToken(self.tooltip_generation));
    }

    fn hide_tooltip(&mut self) {
        if self.tooltip_visible {
            self.host.hide_tooltip();
            self.tooltip_visible = false;
        }
    }

    fn timer_fired(&mut self, token: TimerToken) {
        // a newer tooltip has its own timer
        if token == TimerToken(self.tooltip_generation) {
            self.hide_tooltip();
        }
    }
}
