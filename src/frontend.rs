use futures_util::future::LocalBoxFuture;
use gloo_timers::callback::Timeout;
use js_sys::{Array, Function, Promise, Reflect};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    window, Document, Element, Event, EventTarget, HtmlElement, HtmlTextAreaElement,
    IntersectionObserver, IntersectionObserverEntry, KeyboardEvent, Node, ScrollToOptions, Window,
};

use crate::anchor::{AnchorNavigator, ScrollSurface};
use crate::clipboard::{
    copy_source_text, copy_with_feedback, ClipboardBackend, CopyButtonView, CopyError,
    CopyFeedback, FeedbackStyle, StagedText,
};
use crate::config::{SiteConfig, CONFIG_ATTRIBUTE};
use crate::focus::{on_focus_change, OutlineView, FOCUSABLE_SELECTOR};
use crate::lazy::{
    handle_intersections, ImageWatcher, IntersectionReport, LazyImage, LAZY_IMAGE_SELECTOR,
    LOADED_CLASS,
};
use crate::log::Logger;
use crate::menu::{MenuController, MenuSurface, MenuView};
use crate::scroll::{BackToTop, ScrollBehavior, VisibilityView, VISIBLE_CLASS};
use crate::throttle::throttle;
use crate::timer::Scheduler;

const MENU_BUTTON_SELECTOR: &str = ".mobile-menu-btn";
const NAV_MENU_SELECTOR: &str = ".nav-menu";
const NAV_LINK_SELECTOR: &str = ".nav-link";
const IN_PAGE_LINK_SELECTOR: &str = r##"a[href^="#"]"##;
const HEADER_SELECTOR: &str = ".header";
const COPY_BUTTON_SELECTOR: &str = ".copy-btn";
const BACK_TO_TOP_ID: &str = "back-to-top";
const EMAIL_TEXT_ID: &str = "email-text";
const ACTIVE_CLASS: &str = "active";
const OFFSCREEN_POSITION: &str = "-999999px";

#[derive(Clone, Copy)]
struct BrowserScheduler;

impl Scheduler for BrowserScheduler {
    type Handle = Timeout;

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Timeout {
        Timeout::new(delay_ms, move || task())
    }

    fn cancel(&self, handle: Timeout) {
        // Clears the browser timer and frees the callback with it.
        drop(handle);
    }
}

fn listen<E, F>(target: &EventTarget, event_name: &str, mut handler: F)
where
    E: JsCast + 'static,
    F: FnMut(E) + 'static,
{
    let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        if let Ok(event) = event.dyn_into::<E>() {
            handler(event);
        }
    });
    let _ = target.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
    closure.forget();
}

fn query(document: &Document, selector: &str) -> Option<Element> {
    document.query_selector(selector).ok().flatten()
}

fn query_all(document: &Document, selector: &str) -> Vec<Element> {
    let Ok(nodes) = document.query_selector_all(selector) else {
        return Vec::new();
    };

    (0..nodes.length())
        .filter_map(|index| nodes.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn prefers_reduced_motion() -> bool {
    window()
        .and_then(|w| {
            w.match_media("(prefers-reduced-motion: reduce)")
                .ok()
                .flatten()
        })
        .map(|mq| mq.matches())
        .unwrap_or(false)
}

fn js_error_message(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn install_global(window: &Window, name: &str, value: &JsValue, logger: &Logger) {
    if Reflect::set(window, &JsValue::from_str(name), value).is_err() {
        logger.error("global.install_failed", json!({ "name": name }));
    }
}

fn skip_component(logger: &Logger, component: &str, reason: &str) {
    logger.error(
        "component.skipped",
        json!({ "component": component, "reason": reason }),
    );
}

struct DomMenuView {
    button: Element,
    panel: Element,
    body: Option<HtmlElement>,
}

impl MenuView for DomMenuView {
    fn set_active(&self, surface: MenuSurface, active: bool) {
        let element = match surface {
            MenuSurface::Button => &self.button,
            MenuSurface::Panel => &self.panel,
        };
        let _ = element.class_list().toggle_with_force(ACTIVE_CLASS, active);
    }

    fn set_scroll_lock(&self, locked: bool) {
        let Some(body) = self.body.as_ref() else {
            return;
        };

        let style = body.style();
        if locked {
            let _ = style.set_property("overflow", "hidden");
        } else {
            let _ = style.remove_property("overflow");
        }
    }
}

fn install_menu(document: &Document, logger: &Logger) {
    let (Some(button), Some(panel)) = (
        query(document, MENU_BUTTON_SELECTOR),
        query(document, NAV_MENU_SELECTOR),
    ) else {
        skip_component(logger, "menu", "missing .mobile-menu-btn or .nav-menu");
        return;
    };

    let menu = Rc::new(RefCell::new(MenuController::new(DomMenuView {
        button: button.clone(),
        panel: panel.clone(),
        body: document.body(),
    })));

    {
        let menu = menu.clone();
        listen(&button, "click", move |_: Event| menu.borrow_mut().toggle());
    }

    for link in query_all(document, NAV_LINK_SELECTOR) {
        let menu = menu.clone();
        listen(&link, "click", move |_: Event| menu.borrow_mut().link_activated());
    }

    {
        let menu = menu.clone();
        listen(document, "click", move |event: Event| {
            let inside_menu = event
                .target()
                .and_then(|target| target.dyn_into::<Node>().ok())
                .map(|node| button.contains(Some(&node)) || panel.contains(Some(&node)))
                .unwrap_or(false);
            menu.borrow_mut().pointer_activated(inside_menu);
        });
    }

    listen(document, "keydown", move |event: KeyboardEvent| {
        menu.borrow_mut().key_pressed(&event.key());
    });
}

struct DomScrollSurface {
    window: Window,
    document: Document,
}

impl ScrollSurface for DomScrollSurface {
    fn element_top(&self, id: &str) -> Option<f64> {
        let element = self.document.get_element_by_id(id)?;
        let element = element.dyn_into::<HtmlElement>().ok()?;
        Some(f64::from(element.offset_top()))
    }

    fn header_height(&self) -> f64 {
        query(&self.document, HEADER_SELECTOR)
            .and_then(|header| header.dyn_into::<HtmlElement>().ok())
            .map(|header| f64::from(header.offset_height()))
            .unwrap_or(0.0)
    }

    fn scroll_to(&self, top: f64) {
        let behavior = match ScrollBehavior::for_motion_preference(prefers_reduced_motion()) {
            ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
            ScrollBehavior::Instant => web_sys::ScrollBehavior::Auto,
        };

        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(behavior);
        self.window.scroll_to_with_scroll_to_options(&options);
    }
}

type Navigator = Rc<AnchorNavigator<DomScrollSurface>>;

fn install_anchor_links(document: &Document, navigator: &Navigator) {
    for link in query_all(document, IN_PAGE_LINK_SELECTOR) {
        let navigator = navigator.clone();
        let href = link.clone();
        listen(&link, "click", move |event: Event| {
            event.prevent_default();
            if let Some(href) = href.get_attribute("href") {
                navigator.navigate(&href);
            }
        });
    }
}

fn install_section_helper(window: &Window, navigator: &Navigator, logger: &Logger) {
    let navigator = navigator.clone();
    let scroll_to_section = Closure::<dyn Fn(JsValue)>::new(move |id: JsValue| {
        if let Some(id) = id.as_string() {
            navigator.scroll_to_section(&id);
        }
    });
    install_global(window, "scrollToSection", scroll_to_section.as_ref(), logger);
    scroll_to_section.forget();
}

struct ClassToggle {
    element: Element,
    class: &'static str,
}

impl VisibilityView for ClassToggle {
    fn set_visible(&self, visible: bool) {
        let _ = self.element.class_list().toggle_with_force(self.class, visible);
    }
}

fn install_back_to_top(
    window: &Window,
    document: &Document,
    navigator: &Navigator,
    config: &SiteConfig,
    logger: &Logger,
) {
    let Some(control) = document.get_element_by_id(BACK_TO_TOP_ID) else {
        skip_component(logger, "back_to_top", "missing #back-to-top");
        return;
    };

    let tracker = BackToTop::new(
        ClassToggle {
            element: control.clone(),
            class: VISIBLE_CLASS,
        },
        config.scroll_threshold_px,
    );
    let on_scroll = {
        let window = window.clone();
        throttle(BrowserScheduler, config.scroll_throttle_ms, move |()| {
            tracker.on_scroll(window.scroll_y().unwrap_or(0.0));
        })
    };

    // Pick up the offset of a page restored mid-scroll.
    on_scroll.call(());
    listen(window, "scroll", move |_: Event| on_scroll.call(()));

    let navigator = navigator.clone();
    listen(&control, "click", move |_: Event| navigator.scroll_to_top());
}

struct BrowserClipboard {
    window: Window,
    document: Document,
}

fn clipboard_write_text(window: &Window) -> Option<(JsValue, Function)> {
    let navigator = Reflect::get(window, &JsValue::from_str("navigator")).ok()?;
    let clipboard = Reflect::get(&navigator, &JsValue::from_str("clipboard")).ok()?;
    if clipboard.is_undefined() || clipboard.is_null() {
        return None;
    }

    let write_text = Reflect::get(&clipboard, &JsValue::from_str("writeText"))
        .ok()?
        .dyn_into::<Function>()
        .ok()?;
    Some((clipboard, write_text))
}

fn start_clipboard_write(window: &Window, text: &str) -> Result<Promise, CopyError> {
    let (clipboard, write_text) = clipboard_write_text(window).ok_or(CopyError::Unavailable)?;
    let result = write_text
        .call1(&clipboard, &JsValue::from_str(text))
        .map_err(|error| CopyError::Rejected(js_error_message(&error)))?;

    result
        .dyn_into::<Promise>()
        .map_err(|_| CopyError::Rejected("writeText did not return a promise".to_string()))
}

impl ClipboardBackend for BrowserClipboard {
    type Staged = StagedTextArea;

    fn async_clipboard_available(&self) -> bool {
        let secure = Reflect::get(&self.window, &JsValue::from_str("isSecureContext"))
            .ok()
            .and_then(|value| value.as_bool())
            .unwrap_or(false);

        secure && clipboard_write_text(&self.window).is_some()
    }

    fn write_text(&self, text: &str) -> LocalBoxFuture<'static, Result<(), CopyError>> {
        let started = start_clipboard_write(&self.window, text);

        Box::pin(async move {
            JsFuture::from(started?)
                .await
                .map(|_| ())
                .map_err(|error| CopyError::Rejected(js_error_message(&error)))
        })
    }

    fn stage(&self, text: &str) -> Result<StagedTextArea, CopyError> {
        let staging_error = |error: JsValue| CopyError::Staging(js_error_message(&error));

        let body = self
            .document
            .body()
            .ok_or_else(|| CopyError::Staging("document has no body".to_string()))?;
        let textarea = self
            .document
            .create_element("textarea")
            .map_err(staging_error)?
            .dyn_into::<HtmlTextAreaElement>()
            .map_err(|_| CopyError::Staging("created element is not a textarea".to_string()))?;

        textarea.set_value(text);
        let _ = textarea.set_attribute("readonly", "");
        let style = textarea.style();
        let _ = style.set_property("position", "fixed");
        let _ = style.set_property("left", OFFSCREEN_POSITION);
        let _ = style.set_property("top", OFFSCREEN_POSITION);

        body.append_child(&textarea).map_err(staging_error)?;

        Ok(StagedTextArea {
            document: self.document.clone(),
            textarea,
        })
    }
}

/// Offscreen `<textarea>` holding the text for `execCommand("copy")`.
/// Removed from the page when dropped.
struct StagedTextArea {
    document: Document,
    textarea: HtmlTextAreaElement,
}

impl StagedText for StagedTextArea {
    fn select(&self) {
        let _ = self.textarea.focus();
        self.textarea.select();
    }

    fn copy(&self) -> Result<(), CopyError> {
        let command_error = |error: JsValue| CopyError::CommandFailed(js_error_message(&error));

        let exec_command = Reflect::get(&self.document, &JsValue::from_str("execCommand"))
            .map_err(command_error)?
            .dyn_into::<Function>()
            .map_err(|_| CopyError::CommandFailed("document.execCommand is missing".to_string()))?;
        let copied = exec_command
            .call1(&self.document, &JsValue::from_str("copy"))
            .map_err(command_error)?;

        if copied.as_bool().unwrap_or(false) {
            Ok(())
        } else {
            Err(CopyError::CommandFailed("copy command was not executed".to_string()))
        }
    }
}

impl Drop for StagedTextArea {
    fn drop(&mut self) {
        self.textarea.remove();
    }
}

struct DomCopyButton {
    button: HtmlElement,
}

impl CopyButtonView for DomCopyButton {
    fn label(&self) -> String {
        self.button.text_content().unwrap_or_default()
    }

    fn background(&self) -> String {
        self.button
            .style()
            .get_property_value("background")
            .unwrap_or_default()
    }

    fn set_label(&self, label: &str) {
        self.button.set_text_content(Some(label));
    }

    fn set_background(&self, color: &str) {
        let style = self.button.style();
        if color.is_empty() {
            let _ = style.remove_property("background");
        } else {
            let _ = style.set_property("background", color);
        }
    }
}

fn install_copy_email(window: &Window, document: &Document, config: &SiteConfig, logger: &Logger) {
    let Some(button) = query(document, COPY_BUTTON_SELECTOR)
        .and_then(|button| button.dyn_into::<HtmlElement>().ok())
    else {
        skip_component(logger, "copy_email", "missing .copy-btn");
        return;
    };

    let feedback = CopyFeedback::new(
        DomCopyButton { button },
        BrowserScheduler,
        FeedbackStyle::from_config(config),
    );
    let backend = Rc::new(BrowserClipboard {
        window: window.clone(),
        document: document.clone(),
    });
    let logger = *logger;
    let email_source = document.clone();

    // `window.copyEmail()` copies the trimmed text of `#email-text`.
    let copy_email = Closure::<dyn Fn()>::new(move || {
        let Some(email) = email_source
            .get_element_by_id(EMAIL_TEXT_ID)
            .and_then(|element| element.text_content())
        else {
            logger.warn("clipboard.source_missing", json!({ "id": EMAIL_TEXT_ID }));
            return;
        };

        let backend = backend.clone();
        let feedback = feedback.clone();
        spawn_local(async move {
            copy_with_feedback(&*backend, copy_source_text(&email), &feedback, &logger).await;
        });
    });
    install_global(window, "copyEmail", copy_email.as_ref(), &logger);
    copy_email.forget();
}

struct InlineOutline {
    element: HtmlElement,
}

impl OutlineView for InlineOutline {
    fn set_outline(&self, outline: &str, offset: &str) {
        let style = self.element.style();
        let _ = style.set_property("outline", outline);
        let _ = style.set_property("outline-offset", offset);
    }

    fn clear_outline(&self) {
        let style = self.element.style();
        let _ = style.remove_property("outline");
        let _ = style.remove_property("outline-offset");
    }
}

fn install_focus_indicators(document: &Document) {
    for element in query_all(document, FOCUSABLE_SELECTOR) {
        let Ok(element) = element.dyn_into::<HtmlElement>() else {
            continue;
        };
        let view = Rc::new(InlineOutline {
            element: element.clone(),
        });

        {
            let view = view.clone();
            listen(&element, "focus", move |_: Event| on_focus_change(&*view, true));
        }
        listen(&element, "blur", move |_: Event| on_focus_change(&*view, false));
    }
}

struct DomLazyImage(Element);

impl LazyImage for DomLazyImage {
    fn is_loaded(&self) -> bool {
        self.0.class_list().contains(LOADED_CLASS)
    }

    fn mark_loaded(&self) {
        let _ = self.0.class_list().add_1(LOADED_CLASS);
    }
}

struct DomWatcher(IntersectionObserver);

impl ImageWatcher<DomLazyImage> for DomWatcher {
    fn unobserve(&self, image: &DomLazyImage) {
        self.0.unobserve(&image.0);
    }
}

fn install_lazy_images(window: &Window, document: &Document, logger: &Logger) {
    if !Reflect::has(window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false) {
        logger.debug("lazy.unsupported", json!({}));
        return;
    }

    let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
        move |entries: Array, observer: IntersectionObserver| {
            let reports = entries
                .iter()
                .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                .map(|entry| IntersectionReport {
                    image: DomLazyImage(entry.target()),
                    is_intersecting: entry.is_intersecting(),
                });
            handle_intersections(reports, &DomWatcher(observer));
        },
    );

    let observer = match IntersectionObserver::new(callback.as_ref().unchecked_ref()) {
        Ok(observer) => observer,
        Err(error) => {
            skip_component(logger, "lazy_images", &js_error_message(&error));
            return;
        }
    };
    callback.forget();

    for image in query_all(document, LAZY_IMAGE_SELECTOR) {
        observer.observe(&image);
    }
}

fn install() {
    let Some(win) = window() else {
        return;
    };
    let Some(document) = win.document() else {
        return;
    };

    let config = SiteConfig::from_json_str(
        document
            .body()
            .and_then(|body| body.get_attribute(CONFIG_ATTRIBUTE))
            .as_deref(),
    );
    let logger = Logger::new(config.log_level);
    let navigator: Navigator = Rc::new(AnchorNavigator::new(
        DomScrollSurface {
            window: win.clone(),
            document: document.clone(),
        },
        config.header_gap_px,
    ));

    install_menu(&document, &logger);
    install_anchor_links(&document, &navigator);
    install_section_helper(&win, &navigator, &logger);
    install_back_to_top(&win, &document, &navigator, &config, &logger);
    install_copy_email(&win, &document, &config, &logger);
    install_focus_indicators(&document);
    install_lazy_images(&win, &document, &logger);

    logger.info(
        "site.ready",
        json!({
            "scrollThresholdPx": config.scroll_threshold_px,
            "scrollThrottleMs": config.scroll_throttle_ms,
        }),
    );
}

/// Wires every component once the document has been parsed.
pub fn run() {
    let Some(document) = window().and_then(|w| w.document()) else {
        return;
    };

    let still_loading = Reflect::get(&document, &JsValue::from_str("readyState"))
        .ok()
        .and_then(|state| state.as_string())
        .map(|state| state == "loading")
        .unwrap_or(false);

    if still_loading {
        listen(&document, "DOMContentLoaded", |_: Event| install());
    } else {
        install();
    }
}
