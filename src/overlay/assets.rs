//! Markup and styles the host injects for the overlay.

pub const POPUP_ID: &str = "inline-editor-popup";
pub const TEXTAREA_ID: &str = "inline-editor-textarea";
pub const SAVE_BUTTON_ID: &str = "inline-editor-save";
pub const CANCEL_BUTTON_ID: &str = "inline-editor-cancel";
pub const STYLE_ELEMENT_ID: &str = "inline-editor-styles";
pub const TOOLTIP_CLASS: &str = "disabled-tooltip";

/// Class on the popup while it is shown
pub const ACTIVE_CLASS: &str = "is-active";
/// Class on the element whose text is being edited
pub const EDITING_CLASS: &str = "is-editing";
/// Attribute set on the document root while edit mode is on
pub const EDIT_MODE_ATTRIBUTE: &str = "data-edit-mode-enabled";

pub const POPUP_STYLES: &str = r#"
#inline-editor-popup {
  width: 360px;
  position: fixed;
  z-index: 10000;
  background: #161718;
  color: white;
  border: 1px solid #4a5568;
  border-radius: 16px;
  padding: 8px;
  box-shadow: 0 4px 12px rgba(0,0,0,0.2);
  flex-direction: column;
  gap: 10px;
  display: none;
}

@media (max-width: 768px) {
  #inline-editor-popup {
    width: calc(100% - 20px);
  }
}

#inline-editor-popup.is-active {
  display: flex;
}

#inline-editor-popup textarea {
  height: 100px;
  padding: 4px 8px;
  background: transparent;
  color: white;
  font-family: inherit;
  font-size: 0.875rem;
  line-height: 1.42;
  resize: none;
  outline: none;
}

#inline-editor-popup .button-container {
  display: flex;
  justify-content: flex-end;
  gap: 10px;
}

#inline-editor-popup button {
  padding: 6px 12px;
  border-radius: 4px;
  font-size: 0.875rem;
  cursor: pointer;
  border: none;
  font-weight: 500;
}

#inline-editor-popup .save-button {
  background: #357DF9;
  color: white;
}

#inline-editor-popup .cancel-button {
  background: transparent;
  color: #a0aec0;
}

#inline-editor-popup .cancel-button:hover {
  background: rgba(255, 255, 255, 0.1);
}

.disabled-tooltip {
  display: none;
  position: absolute;
  z-index: 10001;
  background: #161718;
  color: #a0aec0;
  font-size: 0.75rem;
  padding: 4px 8px;
  border-radius: 4px;
  pointer-events: none;
}
"#;

pub const EDIT_MODE_STYLES: &str = r#"
#root[data-edit-mode-enabled="true"] [data-edit-id] {
  cursor: pointer;
  outline: 1px dashed #357DF9;
  outline-offset: 4px;
  border-radius: 2px;
  position: relative;
}

#root[data-edit-mode-enabled="true"] [data-edit-id]:hover::after {
  content: attr(data-edit-id);
  position: absolute;
  top: -24px;
  left: 0;
  background: #357DF9;
  color: white;
  font-size: 11px;
  padding: 2px 6px;
  border-radius: 4px;
  white-space: nowrap;
  pointer-events: none;
  z-index: 1000;
}

#root[data-edit-mode-enabled="true"] [data-edit-id].is-editing {
  outline: 2px solid #357DF9;
  outline-offset: 2px;
}

#root[data-edit-mode-enabled="true"] [data-edit-id].is-editing::after {
  content: 'Editing: ' attr(data-edit-id);
  background: #2c5282;
}
"#;

/// Popup markup with the given button labels
pub fn popup_html(save_label: &str, cancel_label: &str) -> String {
    format!(
        r#"<div id="{POPUP_ID}">
  <textarea id="{TEXTAREA_ID}" spellcheck="false"></textarea>
  <div class="button-container">
    <button id="{CANCEL_BUTTON_ID}" class="cancel-button">{}</button>
    <button id="{SAVE_BUTTON_ID}" class="save-button">{}</button>
  </div>
</div>
"#,
        escape_html(cancel_label),
        escape_html(save_label),
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
