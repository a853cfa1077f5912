//! JavaScript run in the page to emulate classic element commands.
//!
//! BiDi has no "click element" or "is element selected". The bridge calls
//! small functions through `script.callFunction` instead. Each function
//! starts with guards that throw with the classic error text, so that
//! the response validator can recover the precise classic error.
//!
//! | Guard | Throws |
//! |-------|--------|
//! | `stale` | `stale element reference` |
//! | `interactable` | `element not interactable` |
//! | `state` | `invalid element state` |
//! | `selectable` | `element not selectable` |
//! | `intercepted` | `element click intercepted: ...` |

use serde_json::Value;

/// Wraps a function body with the shared guard table.
macro_rules! guarded {
    ($params:literal, $body:literal) => {
        concat!(
            "function(",
            $params,
            ") {\n",
            r#"  const guards = {
    stale: (el) => {
      if (!el.isConnected) throw new Error('stale element reference');
    },
    interactable: (el) => {
      const rects = el.getClientRects();
      const style = window.getComputedStyle(el);
      if (rects.length === 0 || style.visibility === 'hidden' || style.display === 'none') {
        throw new Error('element not interactable');
      }
    },
    state: (el) => {
      if (el.disabled || el.readOnly) throw new Error('invalid element state');
    },
    selectable: (el) => {
      const tag = el.tagName.toLowerCase();
      const type = (el.getAttribute('type') || '').toLowerCase();
      if (!(tag === 'option' || type === 'checkbox' || type === 'radio')) {
        throw new Error('element not selectable');
      }
    },
    intercepted: (el) => {
      const rect = el.getBoundingClientRect();
      const top = document.elementFromPoint(rect.left + rect.width / 2, rect.top + rect.height / 2);
      if (top && top !== el && !el.contains(top)) {
        throw new Error('element click intercepted: Element is obscured by ' + top.tagName);
      }
    }
  };
"#,
            $body,
            "\n}"
        )
    };
}

// ============================================================================
// Page
// ============================================================================

pub const GET_TITLE: &str = "document.title";

pub const GET_PAGE_SOURCE: &str = "document.documentElement.outerHTML";

pub const GET_ORIENTATION: &str = "screen.orientation.type";

/// Expression locking the screen orientation.
///
/// The orientation is embedded as a JSON string literal.
#[must_use]
pub fn set_orientation(orientation: &str) -> String {
    let literal = Value::from(orientation.to_lowercase());
    format!("screen.orientation.lock({literal})")
}

// ============================================================================
// User Scripts
// ============================================================================

/// Wraps a classic synchronous script body as a function declaration.
#[must_use]
pub fn sync_script(body: &str) -> String {
    format!("function() {{\n{body}\n}}")
}

/// Wraps a classic asynchronous script body.
///
/// The body receives a completion callback as its last argument and the
/// wrapper returns a promise settled by that callback.
#[must_use]
pub fn async_script(body: &str) -> String {
    format!(
        "function() {{\n  return new Promise((resolve) => {{\n    \
         const args = Array.from(arguments);\n    \
         args.push((result) => resolve(result));\n    \
         (function() {{\n{body}\n}}).apply(null, args);\n  }});\n}}"
    )
}

// ============================================================================
// Web Element
// ============================================================================

pub const CLICK: &str = guarded!(
    "el",
    r#"  guards.stale(el);
  guards.interactable(el);
  guards.state(el);
  guards.intercepted(el);
  el.click();"#
);

pub const CLEAR: &str = guarded!(
    "el",
    r#"  guards.stale(el);
  guards.interactable(el);
  guards.state(el);
  el.value = '';
  el.dispatchEvent(new InputEvent('input', {bubbles: true}));
  el.dispatchEvent(new Event('change', {bubbles: true}));"#
);

pub const SEND_KEYS: &str = guarded!(
    "el, text",
    r#"  guards.stale(el);
  guards.interactable(el);
  guards.state(el);
  el.focus();
  el.value = (el.value || '') + String(text || '');
  try {
    el.dispatchEvent(new InputEvent('input', {bubbles: true}));
  } catch (e) {
    el.dispatchEvent(new Event('input', {bubbles: true}));
  }
  el.dispatchEvent(new Event('change', {bubbles: true}));"#
);

pub const GET_TAG_NAME: &str = guarded!(
    "el",
    r#"  guards.stale(el);
  return (el.tagName || '').toLowerCase();"#
);

pub const GET_TEXT: &str = guarded!(
    "el",
    r#"  guards.stale(el);
  return el.innerText || '';"#
);

pub const GET_PROPERTY: &str = guarded!(
    "el, name",
    r#"  guards.stale(el);
  try {
    return el[name];
  } catch (e) {
    return null;
  }"#
);

pub const GET_ATTRIBUTE: &str = guarded!(
    "el, name",
    r#"  guards.stale(el);
  return el.getAttribute(name);"#
);

pub const GET_CSS_VALUE: &str = guarded!(
    "el, name",
    r#"  guards.stale(el);
  return window.getComputedStyle(el).getPropertyValue(name);"#
);

pub const IS_SELECTED: &str = guarded!(
    "el",
    r#"  guards.stale(el);
  guards.selectable(el);
  return Boolean(el.selected || el.checked);"#
);

pub const IS_ENABLED: &str = guarded!(
    "el",
    r#"  guards.stale(el);
  return !el.disabled;"#
);

pub const GET_RECT: &str = guarded!(
    "el",
    r#"  guards.stale(el);
  const r = el.getBoundingClientRect();
  return {
    x: Number(r.x || r.left || 0),
    y: Number(r.y || r.top || 0),
    width: Number(r.width || 0),
    height: Number(r.height || 0)
  };"#
);

pub const GET_SHADOW_ROOT: &str = guarded!(
    "el",
    r#"  guards.stale(el);
  const root = el.shadowRoot;
  if (!root) throw new Error('no such shadow root');
  return root;"#
);

pub const GET_ARIA_ROLE: &str = guarded!(
    "el",
    r#"  guards.stale(el);
  return el.getAttribute('role') || '';"#
);

pub const GET_ARIA_LABEL: &str = guarded!(
    "el",
    r#"  guards.stale(el);
  const label = el.getAttribute('aria-label') || el.getAttribute('alt') || (el.textContent || '').trim();
  return label || '';"#
);

// ============================================================================
// Tests
// ============================================================================
