use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::Promise;
use school_admin_api::{AdminApi, ApiError, FileData, UploadFile};
use serde_wasm_bindgen::from_value;
use tracing::{debug, error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web_sys::{Event, HtmlButtonElement, HtmlFormElement, HtmlInputElement};

use crate::dom::{self, DomControlBinder, EventListener, HtmlMedia, GRID_ID, LOAD_MORE_ID, PLAYER_MODAL_ID};
use crate::error::{AdminError, Result};
use crate::filter::FilterOptions;
use crate::grid::render_next_page;
use crate::html::options_html;
use crate::normalize::normalize_all;
use crate::player::{PlayerController, PlayerRequest};
use crate::state::VideoListState;
use crate::types::{ControlEvent, FilterCriteria};
use crate::upload::{upload_failure_message, AyatLookup, UploadForm, UploadSelection};

type DomPlayer = PlayerController<HtmlMedia, DomControlBinder>;

const UPLOAD_FORM_ID: &str = "adminVideoUploadForm";
const AYAT_SECTION_ID: &str = "adminVideoAyatRangeSection";
const UPLOADING_LABEL: &str = r#"<i class="fas fa-spinner fa-spin me-2"></i>Uploading..."#;

/// Shared state behind the exported handle
struct ConsoleInner {
    api: AdminApi,
    list: RefCell<VideoListState>,
    player: RefCell<Option<DomPlayer>>,
    page_listeners: RefCell<Vec<EventListener>>,
    this: Weak<ConsoleInner>,
}

/// Memorization video admin page: upload form, filtered grid, modal player
#[wasm_bindgen]
pub struct VideoAdminConsole {
    inner: Rc<ConsoleInner>,
}

#[wasm_bindgen]
impl VideoAdminConsole {
    /// Create the console; `config` may be `undefined`
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> std::result::Result<VideoAdminConsole, JsValue> {
        // Set panic hook for better error messages
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        let config = crate::read_config(config)?;
        crate::logging::init(&config.log_level);

        let api = crate::connect(&config)?;
        let inner = Rc::new_cyclic(|this| ConsoleInner {
            api,
            list: RefCell::new(VideoListState::new(config.page_size)),
            player: RefCell::new(None),
            page_listeners: RefCell::new(Vec::new()),
            this: this.clone(),
        });

        info!("Video admin console ready (page size {})", config.page_size);
        Ok(Self { inner })
    }

    /// Load dropdowns, wire the page, then load the grid
    pub fn init(&self) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            inner.load_classes().await;
            inner.load_sessions().await;
            inner.wire_ui();
            let count = inner.load_videos().await;
            Ok(JsValue::from(count))
        })
    }

    /// (Re)attach page listeners; earlier ones are dropped first
    #[wasm_bindgen(js_name = wireUi)]
    pub fn wire_ui(&self) {
        self.inner.wire_ui();
    }

    #[wasm_bindgen(js_name = loadClasses)]
    pub fn load_classes(&self) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move { Ok(JsValue::from(inner.load_classes().await)) })
    }

    #[wasm_bindgen(js_name = loadSessions)]
    pub fn load_sessions(&self) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move { Ok(JsValue::from(inner.load_sessions().await)) })
    }

    /// Reload the collection; resolves to the number of videos
    #[wasm_bindgen(js_name = loadVideos)]
    pub fn load_videos(&self) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move { Ok(JsValue::from(inner.load_videos().await)) })
    }

    /// Apply criteria (or the filter dropdowns when omitted) and return the match count
    #[wasm_bindgen(js_name = applyFilters)]
    pub fn apply_filters(&self, criteria_js: JsValue) -> std::result::Result<usize, JsValue> {
        let criteria: FilterCriteria = if criteria_js.is_undefined() || criteria_js.is_null() {
            criteria_from_page()
        } else {
            from_value(criteria_js)?
        };
        Ok(self.inner.apply_filters(criteria))
    }

    /// Append the next page of cards
    #[wasm_bindgen(js_name = loadMore)]
    pub fn load_more(&self) {
        self.inner.render_page();
    }

    #[wasm_bindgen(js_name = filteredVideos)]
    pub fn filtered_videos(&self) -> std::result::Result<JsValue, JsValue> {
        let list = self.inner.list.borrow();
        Ok(dom::to_js(&list.filtered_videos())?)
    }

    /// Get statistics
    pub fn stats(&self) -> std::result::Result<JsValue, JsValue> {
        let list = self.inner.list.borrow();
        let player = self.inner.player.borrow();

        let stats = serde_json::json!({
            "totalVideos": list.all().len(),
            "filteredVideos": list.filtered_len(),
            "displayedVideos": list.cursor(),
            "hasMore": list.has_more(),
            "criteria": list.criteria(),
            "player": player.as_ref().map(|p| p.snapshot()),
        });

        Ok(dom::to_js(&stats)?)
    }

    /// Open the modal player on `id`; false when the video is unknown
    #[wasm_bindgen(js_name = playVideo)]
    pub fn play_video(&self, id: String) -> bool {
        match self.inner.play_video(&id) {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!("Cannot play video {}: {}", id, e);
                false
            }
        }
    }

    #[wasm_bindgen(js_name = closePlayer)]
    pub fn close_player(&self) {
        self.inner.close_player();
    }

    /// Confirm, delete and reload
    #[wasm_bindgen(js_name = deleteVideo)]
    pub fn delete_video(&self, id: String) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            if !dom::confirm("Are you sure you want to delete this video?") {
                return Ok(JsValue::FALSE);
            }
            Ok(JsValue::from(inner.delete_video(&id).await))
        })
    }

    #[wasm_bindgen(js_name = weekChanged)]
    pub fn week_changed(&self) {
        week_changed();
    }

    #[wasm_bindgen(js_name = refreshAyatRange)]
    pub fn refresh_ayat_range(&self) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            inner.refresh_ayat_range().await;
            Ok(JsValue::UNDEFINED)
        })
    }

    #[wasm_bindgen(js_name = uploadVideo)]
    pub fn upload_video(&self) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move { Ok(JsValue::from(inner.upload_video().await)) })
    }
}

impl ConsoleInner {
    fn wire_ui(&self) {
        let mut listeners = Vec::new();
        let this = self.this.clone();

        // Upload form
        let weak = this.clone();
        listeners.extend(EventListener::on_id(UPLOAD_FORM_ID, "submit", move |event: Event| {
            event.prevent_default();
            spawn_with(&weak, |inner| async move {
                inner.upload_video().await;
            });
        }));

        // Dependent dropdowns
        listeners.extend(EventListener::on_id("adminVideoWeekSelect", "change", |_| week_changed()));
        let weak = this.clone();
        listeners.extend(EventListener::on_id("adminVideoDaySelect", "change", move |_| {
            spawn_with(&weak, |inner| async move { inner.refresh_ayat_range().await });
        }));

        // Filter and paging
        let weak = this.clone();
        listeners.extend(EventListener::on_id("videoApplyFilterBtn", "click", move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.apply_filters(criteria_from_page());
            }
        }));
        let weak = this.clone();
        listeners.extend(EventListener::on_id(LOAD_MORE_ID, "click", move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.render_page();
            }
        }));

        // Card buttons
        let weak = this;
        listeners.extend(EventListener::on_id(GRID_ID, "click", move |event: Event| {
            let Some(inner) = weak.upgrade() else { return };
            if let Some(id) = dom::closest_attr(&event, ".delete-btn", "data-id") {
                spawn_local(async move {
                    if dom::confirm("Are you sure you want to delete this video?") {
                        inner.delete_video(&id).await;
                    }
                });
            } else if let Some(id) = dom::closest_attr(&event, ".play-btn", "data-id")
                .or_else(|| dom::closest_attr(&event, "[data-video-id]", "data-video-id"))
            {
                if let Err(e) = inner.play_video(&id) {
                    warn!("Cannot play video {}: {}", id, e);
                }
            }
        }));

        debug!("Wired {} page listeners", listeners.len());
        *self.page_listeners.borrow_mut() = listeners;
    }

    async fn load_classes(&self) -> usize {
        let classes = match self.api.admin_classes().await {
            Ok(classes) => classes,
            Err(e) => {
                warn!("Class list unavailable: {}", e);
                return 0;
            }
        };

        let options: Vec<(String, String)> = classes.iter().map(|c| (c.key(), c.label())).collect();
        let pairs = || options.iter().map(|(v, l)| (v.as_str(), l.as_str()));
        dom::set_html("adminVideoClassSelect", &options_html("Select Class", pairs()));
        dom::set_html("videoFilterClass", &options_html("All Classes", pairs()));
        classes.len()
    }

    async fn load_sessions(&self) -> usize {
        let sessions = match self.api.sessions().await {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!("Session list unavailable: {}", e);
                return 0;
            }
        };

        let pairs = || sessions.iter().map(|s| (s.as_str(), s.as_str()));
        dom::set_html("adminVideoSessionSelect", &options_html("Select Session", pairs()));
        dom::set_html("videoFilterSession", &options_html("All Sessions", pairs()));
        sessions.len()
    }

    async fn load_videos(&self) -> usize {
        // Malformed or failed loads leave an empty grid
        let videos = match self.api.memorization_videos().await {
            Ok(raw) => normalize_all(&raw),
            Err(e) => {
                warn!("Video list unavailable: {}", e);
                Vec::new()
            }
        };
        info!("Loaded {} videos", videos.len());

        let options = FilterOptions::from_videos(&videos);
        let all = {
            let mut list = self.list.borrow_mut();
            *list = list.with_collection(videos);
            list.all().clone()
        };

        match self.player.try_borrow_mut() {
            Ok(mut player) => {
                if let Some(player) = player.as_mut() {
                    player.set_collection(all.clone());
                }
            }
            Err(_) => warn!("Player busy during reload"),
        }

        let sessions = || options.sessions.iter().map(|s| (s.as_str(), s.as_str()));
        dom::set_html("videoFilterSession", &options_html("All Sessions", sessions()));
        let classes = || options.classes.iter().map(|c| (c.value.as_str(), c.label.as_str()));
        dom::set_html("videoFilterClass", &options_html("All Classes", classes()));

        self.render_page();
        all.len()
    }

    fn apply_filters(&self, criteria: FilterCriteria) -> usize {
        debug!("Filtering for {:?}", criteria);
        let count = {
            let mut list = self.list.borrow_mut();
            *list = list.with_criteria(criteria);
            list.filtered_len()
        };
        info!("Filtered to {} videos", count);
        self.render_page();
        count
    }

    fn render_page(&self) {
        let update = render_next_page(&mut self.list.borrow_mut());
        if let Err(e) = dom::apply_grid_update(&update) {
            error!("Grid render failed: {}", e);
        }
    }

    fn player_sink(&self) -> impl Fn(ControlEvent) + 'static {
        let weak = self.this.clone();
        move |event: ControlEvent| {
            // Handled on the next tick so rebinding never drops a running closure
            spawn_with(&weak, move |inner| async move { inner.handle_control(event).await });
        }
    }

    fn play_video(&self, id: &str) -> Result<bool> {
        let mut slot = self
            .player
            .try_borrow_mut()
            .map_err(|_| AdminError::browser("player is busy"))?;

        if slot.is_none() {
            let media = HtmlMedia::attach()?;
            *slot = Some(PlayerController::new(media, DomControlBinder::new(self.player_sink())));
        }
        let Some(player) = slot.as_mut() else {
            return Ok(false);
        };

        player.set_collection(self.list.borrow().all().clone());
        if !player.load(id) {
            return Ok(false);
        }
        drop(slot);

        dom::show_modal(PLAYER_MODAL_ID)?;
        Ok(true)
    }

    fn close_player(&self) {
        if let Ok(mut player) = self.player.try_borrow_mut() {
            if let Some(player) = player.as_mut() {
                player.teardown();
            }
        }
        if let Err(e) = dom::hide_modal(PLAYER_MODAL_ID) {
            debug!("Player modal not hidden: {}", e);
        }
    }

    async fn handle_control(&self, event: ControlEvent) {
        let request = match self.player.try_borrow_mut() {
            Ok(mut player) => player.as_mut().and_then(|p| p.handle(event)),
            Err(_) => {
                warn!("Player busy, dropped {:?}", event.control);
                None
            }
        };

        match request {
            Some(PlayerRequest::Delete(id)) => {
                if dom::confirm("Are you sure you want to delete this video?") {
                    self.close_player();
                    self.delete_video(&id).await;
                }
            }
            Some(PlayerRequest::Dismissed) => debug!("Player dismissed"),
            None => {}
        }
    }

    /// Delete after the caller confirmed; true on success
    async fn delete_video(&self, id: &str) -> bool {
        match self.api.delete_memorization_video(id).await {
            Ok(_) => {
                dom::alert("Video deleted");
                self.load_videos().await;
                true
            }
            Err(ApiError::Rejected { message }) => {
                dom::alert(&format!("Delete failed: {}", message));
                false
            }
            Err(e) => {
                error!("Delete of video {} failed: {}", id, e);
                dom::alert("Error deleting video");
                false
            }
        }
    }

    async fn refresh_ayat_range(&self) {
        let Some(query) = selection_from_page().scheme_query() else {
            dom::set_visible(AYAT_SECTION_ID, false);
            return;
        };

        let lookup = AyatLookup::from_result(self.api.memorization_schemes(&query).await);
        match &lookup {
            AyatLookup::Found { .. } => debug!("Ayat range: {}", lookup.message()),
            AyatLookup::Error => error!("Error loading ayat range for {:?}", query),
            _ => warn!("{}", lookup.message()),
        }

        let (from_ayah, to_ayah) = lookup.ayat();
        dom::set_text("adminVideoAyatRangeDisplay", lookup.message());
        dom::set_field_value("adminFromAyah", from_ayah);
        dom::set_field_value("adminToAyah", to_ayah);
        dom::set_visible(AYAT_SECTION_ID, true);
    }

    /// Validate, upload, then reload sessions, classes and videos in turn
    async fn upload_video(&self) -> bool {
        let form = UploadForm {
            selection: selection_from_page(),
            from_ayah: dom::field_value("adminFromAyah"),
            to_ayah: dom::field_value("adminToAyah"),
        };

        let upload = match form.into_upload(selected_file("adminVideoFile")) {
            Ok(upload) => upload,
            Err(e) => {
                dom::alert(&e.user_message("Upload failed"));
                return false;
            }
        };

        let button = submit_button();
        let original = button.as_ref().map(|b| dom::begin_busy(b, UPLOADING_LABEL));

        let result = self.api.upload_memorization_video(upload).await;

        if let (Some(button), Some(original)) = (button.as_ref(), original.as_deref()) {
            let label = if original.is_empty() { "Upload Video" } else { original };
            dom::end_busy(button, label);
        }

        match result {
            Ok(_) => {
                dom::alert("Video uploaded successfully");
                if let Ok(form) = dom::require::<HtmlFormElement>(UPLOAD_FORM_ID) {
                    form.reset();
                }
                dom::set_visible(AYAT_SECTION_ID, false);
                self.load_sessions().await;
                self.load_classes().await;
                self.load_videos().await;
                true
            }
            Err(e) => {
                error!("Upload failed: {}", e);
                dom::alert(&upload_failure_message(&e));
                false
            }
        }
    }
}

/// Run `task` on the next tick if the console is still alive
fn spawn_with<F, Fut>(weak: &Weak<ConsoleInner>, task: F)
where
    F: FnOnce(Rc<ConsoleInner>) -> Fut + 'static,
    Fut: std::future::Future<Output = ()> + 'static,
{
    let weak = weak.clone();
    spawn_local(async move {
        if let Some(inner) = weak.upgrade() {
            task(inner).await;
        }
    });
}

fn week_changed() {
    let week = dom::field_value("adminVideoWeekSelect");
    if !week.is_empty() {
        dom::set_visible("adminVideoDaySelect", true);
        dom::set_field_value("adminVideoDaySelect", "");
    } else {
        dom::set_visible("adminVideoDaySelect", false);
    }
    dom::set_visible(AYAT_SECTION_ID, false);
}

fn criteria_from_page() -> FilterCriteria {
    let field = |id: &str| Some(dom::field_value(id)).filter(|v| !v.is_empty());
    FilterCriteria {
        session: field("videoFilterSession"),
        term: field("videoFilterTerm"),
        week: field("videoFilterWeek"),
        class_key: field("videoFilterClass"),
    }
}

fn selection_from_page() -> UploadSelection {
    UploadSelection {
        class_key: dom::field_value("adminVideoClassSelect"),
        session: dom::field_value("adminVideoSessionSelect"),
        term: dom::field_value("adminVideoTermSelect"),
        week: dom::field_value("adminVideoWeekSelect"),
        day: dom::field_value("adminVideoDaySelect"),
    }
}

fn submit_button() -> Option<HtmlButtonElement> {
    dom::document()
        .ok()?
        .query_selector(&format!("#{} button[type=\"submit\"]", UPLOAD_FORM_ID))
        .ok()??
        .dyn_into()
        .ok()
}

/// The chosen file, handed to `fetch` without reading it into memory
fn selected_file(id: &str) -> Option<UploadFile> {
    let input = dom::by_id(id)?.dyn_into::<HtmlInputElement>().ok()?;
    let file = input.files()?.get(0)?;

    Some(UploadFile {
        name: file.name(),
        content_type: file.type_(),
        data: FileData::Blob(file.into()),
    })
}
