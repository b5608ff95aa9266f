//! Thin wrappers over `web_sys` plus the DOM side of the player.
//!
//! Everything here touches the page; the decisions live in the pure modules.

use std::rc::Rc;

use js_sys::{Array, Function, Object, Promise, Reflect};
use serde::Serialize;
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    CanvasRenderingContext2d, Document, Element, Event, EventTarget, HtmlAnchorElement,
    HtmlButtonElement, HtmlCanvasElement, HtmlElement, HtmlImageElement, HtmlInputElement,
    HtmlSelectElement, HtmlVideoElement, Window,
};

use crate::error::{AdminError, Result};
use crate::grid::{GridOperation, GridUpdate, CARD_CLASS, EMPTY_GRID_HTML};
use crate::player::{ControlBinder, MediaSurface};
use crate::types::{ControlEvent, ControlId, VideoRecord};

pub const PLAYER_ID: &str = "adminModalVideoPlayer";
pub const PLAYER_MODAL_ID: &str = "adminVideoModal";
pub const GRID_ID: &str = "adminVideoGrid";
pub const LOAD_MORE_ID: &str = "adminLoadMoreBtn";
const CONTROLS_ID: &str = "adminModalVideoControls";
const SEEK_ID: &str = "adminSeekBar";
/// Dispatched on the player when a `play()` promise rejects
const PLAY_REJECTED_EVENT: &str = "playrejected";

const PLAY_LABEL: &str = r#"<i class="fas fa-play"></i> Play"#;
const PAUSE_LABEL: &str = r#"<i class="fas fa-pause"></i> Pause"#;

const CONTROLS_HTML: &str = r#"
  <button id="adminPrevVideoBtn" class="btn btn-sm btn-outline-secondary"><i class="fas fa-backward"></i></button>
  <button id="adminPlayPauseBtn" class="btn btn-sm btn-outline-primary"><i class="fas fa-play"></i> Play</button>
  <button id="adminStopBtn" class="btn btn-sm btn-outline-danger"><i class="fas fa-stop"></i> Stop</button>
  <div class="flex-grow-1 d-flex align-items-center gap-2" style="min-width: 200px;">
    <input id="adminSeekBar" type="range" min="0" max="100" value="0" class="form-range" style="flex:1">
    <small id="adminCurrentTime" style="min-width:48px">00:00</small>
    <small>/</small>
    <small id="adminDuration" style="min-width:48px">00:00</small>
  </div>
  <button id="adminNextVideoBtn" class="btn btn-sm btn-outline-secondary"><i class="fas fa-forward"></i></button>
"#;

pub fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| AdminError::browser("no window"))
}

pub fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| AdminError::browser("no document"))
}

pub fn by_id(id: &str) -> Option<Element> {
    document().ok()?.get_element_by_id(id)
}

/// Element with `id`, cast to `T`
pub fn require<T: JsCast>(id: &str) -> Result<T> {
    by_id(id)
        .ok_or_else(|| AdminError::browser(format!("Missing #{} in DOM", id)))?
        .dyn_into::<T>()
        .map_err(|_| AdminError::browser(format!("#{} has an unexpected element type", id)))
}

/// Current value of an input or select; empty when absent
pub fn field_value(id: &str) -> String {
    let Some(el) = by_id(id) else {
        return String::new();
    };
    if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
        input.value()
    } else if let Some(select) = el.dyn_ref::<HtmlSelectElement>() {
        select.value()
    } else {
        String::new()
    }
}

pub fn set_field_value(id: &str, value: &str) {
    let Some(el) = by_id(id) else { return };
    if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
        input.set_value(value);
    } else if let Some(select) = el.dyn_ref::<HtmlSelectElement>() {
        select.set_value(value);
    }
}

pub fn set_text(id: &str, text: &str) {
    if let Some(el) = by_id(id) {
        el.set_text_content(Some(text));
    }
}

pub fn set_html(id: &str, html: &str) {
    if let Some(el) = by_id(id) {
        el.set_inner_html(html);
    }
}

pub fn set_display(id: &str, display: &str) {
    if let Some(el) = by_id(id).and_then(|el| el.dyn_into::<HtmlElement>().ok()) {
        let _ = el.style().set_property("display", display);
    }
}

pub fn set_visible(id: &str, visible: bool) {
    set_display(id, if visible { "block" } else { "none" });
}

pub fn alert(message: &str) {
    if let Ok(window) = window() {
        let _ = window.alert_with_message(message);
    }
}

pub fn confirm(message: &str) -> bool {
    window()
        .and_then(|w| w.confirm_with_message(message).map_err(AdminError::from))
        .unwrap_or(false)
}

pub fn location_origin() -> Result<String> {
    Ok(window()?.location().origin()?)
}

/// Plain-object conversion; maps become objects rather than `Map`s
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue> {
    Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

/// `data-*` attribute of the nearest ancestor matching `selector`
pub fn closest_attr(event: &Event, selector: &str, attr: &str) -> Option<String> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    target.closest(selector).ok()??.get_attribute(attr)
}

/// Listener that is removed from its target when dropped
pub struct EventListener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl EventListener {
    pub fn new(
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self> {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }

    /// Listen on the element with `id`; `None` when it is not on the page
    pub fn on_id(id: &str, event: &'static str, handler: impl FnMut(Event) + 'static) -> Option<Self> {
        let target = by_id(id)?;
        match Self::new(&target, event, handler) {
            Ok(listener) => Some(listener),
            Err(e) => {
                warn!("Could not listen for {} on #{}: {}", event, id, e);
                None
            }
        }
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

/// Element and DOM event each player control listens on
pub fn control_target(control: ControlId) -> (&'static str, &'static str) {
    match control {
        ControlId::PlayPause => ("adminPlayPauseBtn", "click"),
        ControlId::Stop => ("adminStopBtn", "click"),
        ControlId::SeekInput => (SEEK_ID, "input"),
        ControlId::SeekChange => (SEEK_ID, "change"),
        ControlId::Prev => ("adminPrevVideoBtn", "click"),
        ControlId::Next => ("adminNextVideoBtn", "click"),
        ControlId::TimeUpdate => (PLAYER_ID, "timeupdate"),
        ControlId::LoadedMetadata => (PLAYER_ID, "loadedmetadata"),
        ControlId::Ended => (PLAYER_ID, "ended"),
        ControlId::PlayRejected => (PLAYER_ID, PLAY_REJECTED_EVENT),
        ControlId::Delete => ("adminDeleteVideoBtn", "click"),
        ControlId::Dismiss => (PLAYER_MODAL_ID, "hidden.bs.modal"),
    }
}

/// Binds player controls to DOM listeners that forward to `sink`
pub struct DomControlBinder {
    sink: Rc<dyn Fn(ControlEvent)>,
}

impl DomControlBinder {
    pub fn new(sink: impl Fn(ControlEvent) + 'static) -> Self {
        Self { sink: Rc::new(sink) }
    }
}

impl ControlBinder for DomControlBinder {
    type Binding = EventListener;

    fn bind(&mut self, control: ControlId, record_id: &str) -> Option<EventListener> {
        let (id, event) = control_target(control);
        let sink = Rc::clone(&self.sink);
        let record_id = record_id.to_string();

        let listener = EventListener::on_id(id, event, move |event: Event| {
            let mut control_event = ControlEvent::new(control, record_id.clone());
            if matches!(control, ControlId::SeekInput | ControlId::SeekChange) {
                let percent = event
                    .target()
                    .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                    .and_then(|input| input.value().parse::<f64>().ok())
                    .unwrap_or(0.0);
                control_event = control_event.with_value(percent);
            }
            sink(control_event);
        });

        if listener.is_none() {
            debug!("No #{} on the page, {:?} left unbound", id, control);
        }
        listener
    }
}

/// The modal `<video>` and its labels
pub struct HtmlMedia {
    video: HtmlVideoElement,
}

impl HtmlMedia {
    /// Find the player and insert the controls panel once
    pub fn attach() -> Result<Self> {
        let video: HtmlVideoElement = require(PLAYER_ID)?;

        if by_id(CONTROLS_ID).is_none() {
            let controls = document()?.create_element("div")?;
            controls.set_id(CONTROLS_ID);
            controls.set_class_name("d-flex align-items-center gap-2 mt-2 flex-wrap");
            controls.set_inner_html(CONTROLS_HTML);
            video.insert_adjacent_element("afterend", &controls)?;
        }

        Ok(Self { video })
    }

    fn seek_bar_focused(&self) -> bool {
        let active = document().ok().and_then(|d| d.active_element());
        match (active, by_id(SEEK_ID)) {
            (Some(active), Some(seek)) => JsValue::from(active) == JsValue::from(seek),
            _ => false,
        }
    }
}

impl MediaSurface for HtmlMedia {
    fn set_source(&mut self, url: &str) {
        let source = match self.video.query_selector("source") {
            Ok(Some(source)) => Some(source),
            _ => document()
                .ok()
                .and_then(|d| d.create_element("source").ok())
                .and_then(|source| self.video.append_child(&source).ok().map(|_| source)),
        };
        if let Some(source) = source {
            let _ = source.set_attribute("src", url);
        }
        self.video.load();
    }

    fn play(&mut self) {
        let promise = match self.video.play() {
            Ok(promise) => promise,
            Err(e) => {
                warn!("Video play rejected: {:?}", e);
                notify_play_rejected(&self.video);
                return;
            }
        };

        let video = self.video.clone();
        spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                warn!("Video play rejected: {:?}", e);
                notify_play_rejected(&video);
            }
        });
    }

    fn pause(&mut self) {
        let _ = self.video.pause();
    }

    fn seek_to(&mut self, seconds: f64) {
        self.video.set_current_time(seconds);
    }

    fn current_time(&self) -> f64 {
        self.video.current_time()
    }

    fn duration(&self) -> f64 {
        self.video.duration()
    }

    fn show_info(&mut self, record: &VideoRecord) {
        let or_dash = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };
        set_text("adminVideoSessionInfo", &record.session);
        set_text("adminVideoTermInfo", &format!("Term {}", record.term));
        set_text("adminVideoWeekInfo", &format!("Week {}", record.week));
        set_text("adminVideoClassInfo", record.display_class_name());
        set_text(
            "adminVideoAyatInfo",
            &format!(
                "Ayat Range: {} - {}",
                or_dash(&record.from_ayah),
                or_dash(&record.to_ayah)
            ),
        );
    }

    fn set_playing(&mut self, playing: bool) {
        set_html("adminPlayPauseBtn", if playing { PAUSE_LABEL } else { PLAY_LABEL });
    }

    fn set_clock(&mut self, current: &str, duration: Option<&str>, seek_percent: Option<f64>) {
        set_text("adminCurrentTime", current);
        if let Some(duration) = duration {
            set_text("adminDuration", duration);
        }
        if let Some(percent) = seek_percent {
            // Leave the bar alone while the user drags it
            if !self.seek_bar_focused() {
                set_field_value(SEEK_ID, &percent.to_string());
            }
        }
    }
}

fn notify_play_rejected(video: &HtmlVideoElement) {
    if let Ok(event) = Event::new(PLAY_REJECTED_EVENT) {
        let _ = video.dispatch_event(&event);
    }
}

/// Apply a grid update to `#adminVideoGrid` and the load-more button
pub fn apply_grid_update(update: &GridUpdate) -> Result<()> {
    let Some(grid) = by_id(GRID_ID) else {
        return Ok(());
    };
    let document = document()?;

    for op in &update.operations {
        match op {
            GridOperation::Clear => grid.set_inner_html(""),
            GridOperation::ShowEmpty => grid.set_inner_html(EMPTY_GRID_HTML),
            GridOperation::AppendCard { html, .. } => {
                let card = document.create_element("div")?;
                card.set_class_name(CARD_CLASS);
                card.set_inner_html(html);
                grid.append_child(&card)?;
            }
        }
    }

    set_display(LOAD_MORE_ID, if update.show_load_more { "inline-block" } else { "none" });
    Ok(())
}

/// Disable a submit button and swap its label; returns the old label
pub fn begin_busy(button: &HtmlButtonElement, label: &str) -> String {
    let original = button.inner_html();
    button.set_disabled(true);
    button.set_inner_html(label);
    original
}

pub fn end_busy(button: &HtmlButtonElement, original: &str) {
    button.set_disabled(false);
    button.set_inner_html(original);
}

fn method(target: &JsValue, name: &str) -> Result<Function> {
    Reflect::get(target, &JsValue::from_str(name))?
        .dyn_into::<Function>()
        .map_err(|_| AdminError::browser(format!("{} is not a function", name)))
}

/// Call `target.name(...args)`
pub fn call_method(target: &JsValue, name: &str, args: &[JsValue]) -> Result<JsValue> {
    let args: Array = args.iter().collect();
    Ok(Reflect::apply(&method(target, name)?, target, &args)?)
}

/// Global such as `window.jspdf`; `None` when the page did not load it
pub fn global(name: &str) -> Option<JsValue> {
    let window = window().ok()?;
    Reflect::get(&window, &JsValue::from_str(name))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

fn bootstrap_modal_class() -> Result<JsValue> {
    let bootstrap = global("bootstrap").ok_or_else(|| AdminError::browser("bootstrap is not loaded"))?;
    Ok(Reflect::get(&bootstrap, &JsValue::from_str("Modal"))?)
}

pub fn show_modal(id: &str) -> Result<()> {
    let element: Element = require(id)?;
    let modal_class = bootstrap_modal_class()?;
    let instance = call_method(&modal_class, "getOrCreateInstance", &[element.into()])?;
    call_method(&instance, "show", &[])?;
    Ok(())
}

pub fn hide_modal(id: &str) -> Result<()> {
    let element: Element = require(id)?;
    let modal_class = bootstrap_modal_class()?;
    let instance = call_method(&modal_class, "getInstance", &[element.into()])?;
    if !instance.is_null() && !instance.is_undefined() {
        call_method(&instance, "hide", &[])?;
    }
    Ok(())
}

/// Rasterize `element` through the page's html2canvas into a PNG data URL
pub async fn capture_png(element: &Element) -> Result<String> {
    let html2canvas = global("html2canvas")
        .and_then(|f| f.dyn_into::<Function>().ok())
        .ok_or_else(|| {
            AdminError::browser(
                "html2canvas library not loaded. Please make sure it is included in your HTML.",
            )
        })?;

    let options = Object::new();
    Reflect::set(&options, &"scale".into(), &JsValue::from(5))?;
    Reflect::set(&options, &"useCORS".into(), &JsValue::TRUE)?;
    Reflect::set(&options, &"backgroundColor".into(), &JsValue::NULL)?;
    Reflect::set(&options, &"logging".into(), &JsValue::FALSE)?;

    let promise: Promise = html2canvas.call2(&JsValue::NULL, element, &options)?.dyn_into()?;
    let canvas: HtmlCanvasElement = JsFuture::from(promise).await?.dyn_into()?;
    Ok(canvas.to_data_url_with_type("image/png")?)
}

/// Save `href` under `file_name` via a temporary anchor
pub fn trigger_download(file_name: &str, href: &str) -> Result<()> {
    let link: HtmlAnchorElement = document()?.create_element("a")?.unchecked_into();
    link.set_download(file_name);
    link.set_href(href);
    link.click();
    Ok(())
}

/// Load an image and re-encode it as a JPEG data URL
pub async fn load_image_data_url(url: &str) -> Result<String> {
    let image = HtmlImageElement::new()?;
    image.set_cross_origin(Some("anonymous"));

    let loaded = Promise::new(&mut |resolve, reject| {
        image.set_onload(Some(&resolve));
        image.set_onerror(Some(&reject));
    });
    image.set_src(url);
    JsFuture::from(loaded)
        .await
        .map_err(|_| AdminError::browser(format!("Image failed to load: {}", url)))?;

    let canvas: HtmlCanvasElement = document()?.create_element("canvas")?.unchecked_into();
    canvas.set_width(image.natural_width());
    canvas.set_height(image.natural_height());
    let context: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| AdminError::browser("2d canvas context unavailable"))?
        .unchecked_into();
    context.draw_image_with_html_image_element(&image, 0.0, 0.0)?;

    Ok(canvas.to_data_url_with_type("image/jpeg")?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_control_has_a_distinct_target() {
        let targets: HashSet<_> = ControlId::ALL.iter().map(|&c| control_target(c)).collect();
        assert_eq!(targets.len(), ControlId::ALL.len());
        assert_eq!(control_target(ControlId::Dismiss), ("adminVideoModal", "hidden.bs.modal"));
    }
}
