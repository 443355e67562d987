//! Browser DOM binding
//!
//! Implements the document traits over the live DOM and installs the guard
//! on the page: a capture-phase `submit` listener on the document, a
//! delegated `click` listener for the line editor, and the `showLoading` /
//! `hideLoading` exports for scripts that submit on their own.

use std::cell::RefCell;

use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlButtonElement, HtmlElement, HtmlInputElement, NodeList};

use crate::app::guard::SubmissionGuard;
use crate::app::lines;
use crate::config::{GuardConfig, Selectors};
use crate::domain::{ControlId, ControlKind, ControlTagger, InputKind, TagAssignment};
use crate::input::{FormId, SubmitEvent};
use crate::platform::{CosmeticMutationError, Document, LineSurface};

/// Attribute carrying the id handed out to each managed control
const CONTROL_ID_ATTRIBUTE: &str = "data-formguard-id";

/// Forms are not told apart in the browser; the guard treats them alike
const PAGE_FORM: FormId = FormId(0);

/// Live DOM seen through the document traits
pub struct DomDocument {
    document: web_sys::Document,
    selectors: Selectors,
    tagger: RefCell<ControlTagger>,
}

impl DomDocument {
    pub fn new(document: web_sys::Document, selectors: Selectors) -> Self {
        Self {
            document,
            selectors,
            tagger: RefCell::new(ControlTagger::new()),
        }
    }

    /// Control id of `element`, if it is an interactive control
    pub fn control_for(&self, element: &Element) -> Option<ControlId> {
        let is_control = element
            .matches(&self.selectors.control_selector)
            .unwrap_or(false);
        is_control.then(|| self.control_id(element))
    }

    fn overlay(&self) -> Option<HtmlElement> {
        self.document
            .get_element_by_id(&self.selectors.overlay_id)?
            .dyn_into::<HtmlElement>()
            .ok()
    }

    fn container(&self) -> Option<Element> {
        self.document.get_element_by_id(&self.selectors.container_id)
    }

    fn control_elements(&self) -> Vec<Element> {
        match self.document.query_selector_all(&self.selectors.control_selector) {
            Ok(list) => elements(&list),
            Err(err) => {
                warn!(error = ?err, "control selector rejected by the document");
                Vec::new()
            }
        }
    }

    fn control_id(&self, element: &Element) -> ControlId {
        if let Some(id) = existing_tag(element) {
            return ControlId(id);
        }
        let id = self.tagger.borrow_mut().fresh();
        tag_element(element, id);
        id
    }

    fn find_control(&self, id: ControlId) -> Option<Element> {
        let selector = format!("[{CONTROL_ID_ATTRIBUTE}=\"{}\"]", id.0);
        self.document.query_selector(&selector).ok().flatten()
    }
}

fn elements(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|index| list.get(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn existing_tag(element: &Element) -> Option<u32> {
    element
        .get_attribute(CONTROL_ID_ATTRIBUTE)
        .and_then(|raw| raw.parse().ok())
}

fn tag_element(element: &Element, id: ControlId) {
    if element
        .set_attribute(CONTROL_ID_ATTRIBUTE, &id.0.to_string())
        .is_err()
    {
        debug!(control = %id, "could not tag control element");
    }
}

/// Drops control tags copied along with `root` so the copy gets its own ids
fn strip_control_tags(root: &Element) {
    let selector = format!("[{CONTROL_ID_ATTRIBUTE}]");
    let mut tagged = root
        .query_selector_all(&selector)
        .map(|list| elements(&list))
        .unwrap_or_default();
    tagged.push(root.clone());
    for element in tagged {
        if let Err(err) = element.remove_attribute(CONTROL_ID_ATTRIBUTE) {
            debug!(error = ?err, "could not clear copied control tag");
        }
    }
}

fn rejected(what: &'static str, err: JsValue) -> CosmeticMutationError {
    CosmeticMutationError::Rejected {
        what,
        reason: format!("{err:?}"),
    }
}

impl Document for DomDocument {
    fn controls(&self) -> Vec<ControlId> {
        let elements = self.control_elements();
        let tags: Vec<Option<u32>> = elements.iter().map(existing_tag).collect();
        let assignments = self.tagger.borrow_mut().assign(&tags);
        elements
            .iter()
            .zip(assignments)
            .map(|(element, assignment)| {
                if let TagAssignment::Retag(id) = assignment {
                    tag_element(element, id);
                }
                assignment.id()
            })
            .collect()
    }

    fn control_kind(&self, id: ControlId) -> Option<ControlKind> {
        let element = self.find_control(id)?;
        if element.dyn_ref::<HtmlButtonElement>().is_some() {
            Some(ControlKind::PushButton)
        } else {
            Some(ControlKind::SubmitInput)
        }
    }

    fn is_disabled(&self, id: ControlId) -> Option<bool> {
        let element = self.find_control(id)?;
        if let Some(button) = element.dyn_ref::<HtmlButtonElement>() {
            Some(button.disabled())
        } else if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            Some(input.disabled())
        } else {
            Some(element.has_attribute("disabled"))
        }
    }

    fn set_disabled(&mut self, id: ControlId, disabled: bool) -> Result<(), CosmeticMutationError> {
        let element = self
            .find_control(id)
            .ok_or(CosmeticMutationError::ControlNotFound(id))?;
        if let Some(button) = element.dyn_ref::<HtmlButtonElement>() {
            button.set_disabled(disabled);
        } else if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.set_disabled(disabled);
        } else if disabled {
            element
                .set_attribute("disabled", "")
                .map_err(|err| rejected("disabled attribute", err))?;
        } else {
            element
                .remove_attribute("disabled")
                .map_err(|err| rejected("disabled attribute", err))?;
        }
        Ok(())
    }

    fn label(&self, id: ControlId) -> Option<String> {
        let element = self.find_control(id)?;
        match element.dyn_ref::<HtmlInputElement>() {
            Some(input) => Some(input.value()),
            None => Some(element.inner_html()),
        }
    }

    fn set_label(&mut self, id: ControlId, label: &str) -> Result<(), CosmeticMutationError> {
        let element = self
            .find_control(id)
            .ok_or(CosmeticMutationError::ControlNotFound(id))?;
        match element.dyn_ref::<HtmlInputElement>() {
            Some(input) => input.set_value(label),
            None => element.set_inner_html(label),
        }
        Ok(())
    }

    fn attribute(&self, id: ControlId, name: &str) -> Option<String> {
        self.find_control(id)?.get_attribute(name)
    }

    fn focused_control(&self) -> Option<ControlId> {
        let active = self.document.active_element()?;
        self.control_for(&active)
    }

    fn has_overlay(&self) -> bool {
        self.overlay().is_some()
    }

    fn overlay_visible(&self) -> bool {
        self.overlay()
            .and_then(|overlay| overlay.style().get_property_value("display").ok())
            .is_some_and(|display| display != "none")
    }

    fn show_overlay(&mut self, message: &str) -> Result<(), CosmeticMutationError> {
        let overlay = self
            .overlay()
            .ok_or(CosmeticMutationError::OverlayUnavailable)?;
        match overlay.query_selector(&self.selectors.message_selector) {
            Ok(Some(slot)) => slot.set_text_content(Some(message)),
            _ => debug!("overlay has no message element"),
        }
        overlay
            .style()
            .set_property("display", "flex")
            .map_err(|err| rejected("overlay display", err))
    }

    fn hide_overlay(&mut self) -> Result<(), CosmeticMutationError> {
        let overlay = self
            .overlay()
            .ok_or(CosmeticMutationError::OverlayUnavailable)?;
        overlay
            .style()
            .set_property("display", "none")
            .map_err(|err| rejected("overlay display", err))
    }
}

impl LineSurface for DomDocument {
    type Row = Element;
    type RowKey = Element;

    fn row_count(&self) -> Option<usize> {
        let container = self.container()?;
        let rows = container.query_selector_all(&self.selectors.row_selector).ok()?;
        Some(rows.length() as usize)
    }

    fn clone_first_row(&self) -> Option<Element> {
        let first = self
            .container()?
            .query_selector(&self.selectors.row_selector)
            .ok()??;
        let row = first
            .clone_node_with_deep(true)
            .ok()?
            .dyn_into::<Element>()
            .ok()?;
        strip_control_tags(&row);
        Some(row)
    }

    fn reset_inputs(&self, row: &mut Element, value_for: fn(&InputKind) -> &'static str) {
        let Ok(inputs) = row.query_selector_all("input") else {
            return;
        };
        for element in elements(&inputs) {
            if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
                let kind = InputKind::from_type_attr(&input.type_());
                input.set_value(value_for(&kind));
            }
        }
    }

    fn append_row(&mut self, row: Element) -> Option<Element> {
        self.container()?.append_child(&row).ok()?;
        Some(row)
    }

    fn contains_row(&self, key: &Element) -> bool {
        let Some(container) = self.container() else {
            return false;
        };
        container.contains(Some(key.as_ref()))
            && key.matches(&self.selectors.row_selector).unwrap_or(false)
    }

    fn remove_row(&mut self, key: &Element) -> bool {
        key.remove();
        true
    }
}

struct WebRuntime {
    guard: SubmissionGuard,
    dom: DomDocument,
    expiry: Option<BusyExpiry>,
}

impl WebRuntime {
    /// Runs a guard operation and arms the busy timer if it started a cycle
    fn enter<R>(&mut self, f: impl FnOnce(&mut SubmissionGuard, &mut DomDocument) -> R) -> R {
        let was_busy = self.guard.is_busy();
        let result = f(&mut self.guard, &mut self.dom);
        if !was_busy && self.guard.is_busy() {
            if let Some(expiry) = self.expiry.as_mut() {
                expiry.arm();
            }
        }
        result
    }

    fn release(&mut self) {
        if let Some(expiry) = self.expiry.as_mut() {
            expiry.disarm();
        }
        self.guard.exit_busy(&mut self.dom);
    }

    fn expire(&mut self) {
        if let Some(expiry) = self.expiry.as_mut() {
            expiry.handle = None;
        }
        if self.guard.expire(&mut self.dom) {
            warn!("busy cycle was never released; releasing after timeout");
        }
    }
}

/// Browser timer that releases a busy cycle nobody released
struct BusyExpiry {
    window: web_sys::Window,
    delay_ms: i32,
    callback: Closure<dyn FnMut()>,
    handle: Option<i32>,
}

impl BusyExpiry {
    fn new(window: web_sys::Window, delay_ms: i32) -> Self {
        let callback = Closure::<dyn FnMut()>::new(|| {
            with_runtime(WebRuntime::expire);
        });
        Self {
            window,
            delay_ms,
            callback,
            handle: None,
        }
    }

    fn arm(&mut self) {
        self.disarm();
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                self.callback.as_ref().unchecked_ref(),
                self.delay_ms,
            ) {
            Ok(handle) => self.handle = Some(handle),
            Err(err) => warn!(error = ?err, "busy timeout could not be armed"),
        }
    }

    fn disarm(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}

thread_local! {
    static RUNTIME: RefCell<Option<WebRuntime>> = const { RefCell::new(None) };
}

/// Runs `f` against the installed runtime
///
/// None when nothing is installed or the runtime is already in use further
/// up the stack.
fn with_runtime<R>(f: impl FnOnce(&mut WebRuntime) -> R) -> Option<R> {
    RUNTIME.with(|cell| match cell.try_borrow_mut() {
        Ok(mut slot) => slot.as_mut().map(f),
        Err(_) => {
            warn!("formguard runtime re-entered; event ignored");
            None
        }
    })
}

/// Fills an empty slot; an occupied one is left alone
fn claim_slot<T>(slot: &mut Option<T>, value: T) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = Some(value);
    true
}

fn js_error(message: &str) -> JsValue {
    JsValue::from(js_sys::Error::new(message))
}

/// Installs the guard and the line editor on the current document
pub fn install(mut config: GuardConfig) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| js_error("no window"))?;
    let document = window.document().ok_or_else(|| js_error("no document"))?;

    // The guard's clock is unavailable on wasm32; a browser timer keeps time
    let expiry = config
        .busy_timeout_delay_ms()
        .map(|delay_ms| BusyExpiry::new(window.clone(), delay_ms));
    config.busy_timeout_ms = None;

    let selectors = config.selectors.clone();
    let runtime = WebRuntime {
        guard: SubmissionGuard::new(config),
        dom: DomDocument::new(document.clone(), selectors.clone()),
        expiry,
    };
    let installed = RUNTIME.with(|cell| {
        cell.try_borrow_mut()
            .is_ok_and(|mut slot| claim_slot(&mut *slot, runtime))
    });
    if !installed {
        return Err(js_error("formguard is already installed on this page"));
    }

    let on_submit = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
        let submitter: Option<Element> = event
            .dyn_ref::<web_sys::SubmitEvent>()
            .and_then(web_sys::SubmitEvent::submitter)
            .map(|element| element.unchecked_into::<Element>());

        let cancelled = with_runtime(|runtime| {
            runtime.enter(|guard, dom| {
                let submitter = submitter
                    .as_ref()
                    .and_then(|element| dom.control_for(element));
                let mut guarded = SubmitEvent::new(PAGE_FORM, submitter);
                guard.handle_submit(dom, &mut guarded);
                guarded.default_prevented()
            })
        });

        if cancelled.unwrap_or(true) {
            event.prevent_default();
        }
    });
    document.add_event_listener_with_callback_and_bool(
        "submit",
        on_submit.as_ref().unchecked_ref(),
        true,
    )?;
    on_submit.forget();

    let on_click = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
        let Some(target) = event
            .target()
            .and_then(|target| target.dyn_into::<Element>().ok())
        else {
            return;
        };

        if target.id() == selectors.add_trigger_id {
            let edit = with_runtime(|runtime| lines::add_line(&mut runtime.dom));
            debug!(added = edit.is_some_and(|edit| !edit.is_skipped()), "add line");
        }

        if target.class_list().contains(&selectors.remove_trigger_class) {
            if let Ok(Some(row)) = target.closest(&selectors.row_selector) {
                let edit = with_runtime(|runtime| lines::remove_line(&mut runtime.dom, &row));
                debug!(removed = edit.is_some_and(|edit| !edit.is_skipped()), "remove line");
            }
        }
    });
    document.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    on_click.forget();

    Ok(())
}

/// Installs the guard, optionally configured from a TOML document
#[wasm_bindgen(js_name = installFormGuard)]
pub fn install_form_guard(config_toml: Option<String>) -> Result<(), JsValue> {
    let config = match config_toml {
        Some(raw) => GuardConfig::from_toml_str(&raw).map_err(|err| js_error(&err.to_string()))?,
        None => GuardConfig::default(),
    };
    install(config)
}

/// Enters the busy state for a script-driven submission
#[wasm_bindgen(js_name = showLoading)]
pub fn show_loading(message: Option<String>, submitter: Option<Element>) {
    with_runtime(|runtime| {
        runtime.enter(|guard, dom| {
            let submitter = submitter
                .as_ref()
                .and_then(|element| dom.control_for(element));
            guard.enter_busy(dom, message.as_deref(), submitter);
        })
    });
}

/// Releases the busy state once a script-driven submission completes
#[wasm_bindgen(js_name = hideLoading)]
pub fn hide_loading() {
    with_runtime(WebRuntime::release);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_is_claimed_once() {
        let mut slot = None;
        assert!(claim_slot(&mut slot, 1));
        assert!(!claim_slot(&mut slot, 2));
        assert_eq!(slot, Some(1));
    }
}
