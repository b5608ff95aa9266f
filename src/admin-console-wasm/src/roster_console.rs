use std::cell::RefCell;
use std::rc::{Rc, Weak};

use chrono::Local;
use js_sys::Promise;
use school_admin_api::{AdminApi, ApiError, Student};
use serde_wasm_bindgen::from_value;
use tracing::{debug, error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web_sys::{Element, Event};

use crate::config::{SchoolInfo, SchoolInfoPatch};
use crate::dom::{self, EventListener};
use crate::error::{AdminError, Result};
use crate::id_card::{CardHolder, IdCard};
use crate::pdf::{render_pdf, JSPDF_MISSING};
use crate::report::RosterReport;
use crate::roster::{
    error_row_html, filter_students, graduation_year_label, table_rows_html, RosterQuery, SaveStudent, StudentForm,
};

const TABLE_BODY_ID: &str = "studentGeneralTableBody";
const STUDENT_MODAL_ID: &str = "studentGeneralModal";
const ID_CARD_MODAL_ID: &str = "idCardModal";
const ID_CARD_PREVIEW_ID: &str = "idCardPreview";
const ID_CARD_CANVAS_ID: &str = "idCardCanvas";
const EXPORT_BUTTON_IDS: [&str; 3] = [
    "exportStudentGeneralPDFBtn",
    "exportStudentGeneralPdfBtn",
    "exportStudentGeneralListPDFBtn",
];

struct RosterInner {
    api: AdminApi,
    school: RefCell<SchoolInfo>,
    students: RefCell<Vec<Student>>,
    /// Card currently shown in the preview modal
    card: RefCell<Option<IdCard>>,
    page_listeners: RefCell<Vec<EventListener>>,
    this: Weak<RosterInner>,
}

/// General student list page with its add/edit modal, PDF export and ID cards
#[wasm_bindgen]
pub struct StudentRosterConsole {
    inner: Rc<RosterInner>,
}

#[wasm_bindgen]
impl StudentRosterConsole {
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> std::result::Result<StudentRosterConsole, JsValue> {
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        let config = crate::read_config(config)?;
        crate::logging::init(&config.log_level);

        let api = crate::connect(&config)?;
        let inner = Rc::new_cyclic(|this| RosterInner {
            api,
            school: RefCell::new(config.school),
            students: RefCell::new(Vec::new()),
            card: RefCell::new(None),
            page_listeners: RefCell::new(Vec::new()),
            this: this.clone(),
        });

        info!("Student roster console ready");
        Ok(Self { inner })
    }

    /// Wire the page and load the list
    pub fn init(&self) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            inner.wire_ui();
            Ok(JsValue::from(inner.load_students().await))
        })
    }

    #[wasm_bindgen(js_name = wireUi)]
    pub fn wire_ui(&self) {
        self.inner.wire_ui();
    }

    /// Resolves to the number of students loaded
    #[wasm_bindgen(js_name = loadStudents)]
    pub fn load_students(&self) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move { Ok(JsValue::from(inner.load_students().await)) })
    }

    /// Re-render the table for the search box and status filter
    #[wasm_bindgen(js_name = filterStudents)]
    pub fn filter_students(&self) -> usize {
        self.inner.render_table()
    }

    #[wasm_bindgen(js_name = addNewStudent)]
    pub fn add_new_student(&self) {
        open_student_form(&StudentForm::blank(), "Add New Student");
    }

    #[wasm_bindgen(js_name = editStudent)]
    pub fn edit_student(&self, id: i64) {
        self.inner.edit_student(id);
    }

    #[wasm_bindgen(js_name = saveStudent)]
    pub fn save_student(&self) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move { Ok(JsValue::from(inner.save_student().await)) })
    }

    #[wasm_bindgen(js_name = deleteStudent)]
    pub fn delete_student(&self, id: i64) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move { Ok(JsValue::from(inner.delete_student(id).await)) })
    }

    /// Report for the currently filtered rows, without rendering it
    #[wasm_bindgen(js_name = rosterReport)]
    pub fn roster_report(&self) -> std::result::Result<JsValue, JsValue> {
        let report = self.inner.build_report()?;
        Ok(dom::to_js(&report)?)
    }

    #[wasm_bindgen(js_name = exportPdf)]
    pub fn export_pdf(&self) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move { Ok(JsValue::from(inner.export_pdf().await)) })
    }

    /// Show the card for `{ holder, id, name, entity_id, picture }`
    #[wasm_bindgen(js_name = viewIdCard)]
    pub fn view_id_card(&self, card: JsValue) -> std::result::Result<(), JsValue> {
        let card: IdCard = from_value(card)?;
        self.inner.view_id_card(card);
        Ok(())
    }

    #[wasm_bindgen(js_name = downloadIdCard)]
    pub fn download_id_card(&self) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move { Ok(JsValue::from(inner.download_id_card().await)) })
    }

    #[wasm_bindgen(js_name = updateSchoolInfo)]
    pub fn update_school_info(&self, patch: JsValue) -> std::result::Result<(), JsValue> {
        let patch: SchoolInfoPatch = from_value(patch)?;
        self.inner.school.borrow_mut().merge(patch);
        debug!("School info updated");
        Ok(())
    }

    #[wasm_bindgen(js_name = setLogoSrc)]
    pub fn set_logo_src(&self, src: String) {
        self.inner.school.borrow_mut().set_logo_src(src);
    }

    #[wasm_bindgen(js_name = schoolInfo)]
    pub fn school_info(&self) -> std::result::Result<JsValue, JsValue> {
        Ok(dom::to_js(&*self.inner.school.borrow())?)
    }
}

impl RosterInner {
    fn wire_ui(&self) {
        let mut listeners = Vec::new();

        let weak = self.this.clone();
        listeners.extend(EventListener::on_id("studentGeneralSearch", "input", move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.render_table();
            }
        }));
        let weak = self.this.clone();
        listeners.extend(EventListener::on_id("studentGeneralStatusFilter", "change", move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.render_table();
            }
        }));

        listeners.extend(EventListener::on_id("addNewStudentBtn", "click", |_| {
            open_student_form(&StudentForm::blank(), "Add New Student");
        }));
        listeners.extend(EventListener::on_id("studentStatusInput", "change", |_| {
            sync_graduation_field(&dom::field_value("studentStatusInput"));
        }));

        let weak = self.this.clone();
        listeners.extend(EventListener::on_id("saveStudentBtn", "click", move |_| {
            spawn_with(&weak, |inner| async move {
                inner.save_student().await;
            });
        }));

        let weak = self.this.clone();
        listeners.extend(EventListener::on_id(TABLE_BODY_ID, "click", move |event: Event| {
            let Some(inner) = weak.upgrade() else { return };
            let row_id = |selector: &str| {
                dom::closest_attr(&event, selector, "data-id").and_then(|id| id.parse::<i64>().ok())
            };
            if let Some(id) = row_id(".edit-student-btn") {
                inner.edit_student(id);
            } else if let Some(id) = row_id(".delete-student-btn") {
                spawn_local(async move {
                    inner.delete_student(id).await;
                });
            }
        }));

        let export_button = EXPORT_BUTTON_IDS.iter().copied().find(|id| dom::by_id(id).is_some());
        if let Some(id) = export_button {
            let weak = self.this.clone();
            listeners.extend(EventListener::on_id(id, "click", move |_| {
                spawn_with(&weak, |inner| async move {
                    inner.export_pdf().await;
                });
            }));
        } else {
            debug!("No PDF export button on this page");
        }

        // Card buttons can live in any table on the page
        let weak = self.this.clone();
        if let Some(body) = dom::document().ok().and_then(|d| d.body()) {
            match EventListener::new(&body, "click", move |event: Event| {
                let Some(inner) = weak.upgrade() else { return };
                if let Some(card) = card_from_event(&event) {
                    inner.view_id_card(card);
                }
            }) {
                Ok(listener) => listeners.push(listener),
                Err(e) => warn!("Could not listen for ID card clicks: {}", e),
            }
        }

        let weak = self.this.clone();
        listeners.extend(EventListener::on_id("downloadIDCardBtn", "click", move |_| {
            spawn_with(&weak, |inner| async move {
                inner.download_id_card().await;
            });
        }));

        debug!("Wired {} roster listeners", listeners.len());
        *self.page_listeners.borrow_mut() = listeners;
    }

    async fn load_students(&self) -> usize {
        match self.api.students_general_list().await {
            Ok(students) => {
                info!("Loaded {} students", students.len());
                let count = students.len();
                *self.students.borrow_mut() = students;
                self.render_table();
                count
            }
            Err(e) => {
                error!("Error loading students: {}", e);
                let message = match &e {
                    ApiError::Rejected { message } => message.clone(),
                    _ => "Error loading students".to_string(),
                };
                dom::set_html(TABLE_BODY_ID, &error_row_html(&message));
                0
            }
        }
    }

    fn query_from_page() -> RosterQuery {
        RosterQuery::new(
            &dom::field_value("studentGeneralSearch"),
            &dom::field_value("studentGeneralStatusFilter"),
        )
    }

    fn render_table(&self) -> usize {
        let students = self.students.borrow();
        let visible = filter_students(&students, &Self::query_from_page());
        dom::set_html(TABLE_BODY_ID, &table_rows_html(&visible));
        visible.len()
    }

    fn edit_student(&self, id: i64) {
        let form = self
            .students
            .borrow()
            .iter()
            .find(|s| s.id == id)
            .map(StudentForm::from_student);

        match form {
            Some(form) => open_student_form(&form, "Edit Student"),
            None => {
                warn!("Student {} not in the loaded list", id);
                dom::alert("Student not found");
            }
        }
    }

    async fn save_student(&self) -> bool {
        let form = StudentForm {
            id: dom::field_value("studentGeneralId"),
            student_id: dom::field_value("studentIdInput"),
            student_name: dom::field_value("studentNameInput"),
            status: dom::field_value("studentStatusInput"),
            graduation_year: dom::field_value("graduationYearInput"),
        };

        let save = match form.into_save() {
            Ok(save) => save,
            Err(e) => {
                dom::alert(&e.user_message("Error"));
                return false;
            }
        };

        let result = match &save {
            SaveStudent::Add(student) => self.api.add_student(student).await,
            SaveStudent::UpdateStatus { id, update } => self.api.update_student_status(*id, update).await,
        };

        match result {
            Ok(_) => {
                dom::alert(save.success_message());
                if let Err(e) = dom::hide_modal(STUDENT_MODAL_ID) {
                    debug!("Student modal not hidden: {}", e);
                }
                self.load_students().await;
                true
            }
            Err(ApiError::Rejected { message }) => {
                dom::alert(&format!("Error: {}", message));
                false
            }
            Err(e) => {
                error!("Error saving student: {}", e);
                dom::alert("Error saving student");
                false
            }
        }
    }

    async fn delete_student(&self, id: i64) -> bool {
        if !dom::confirm("Are you sure you want to delete this student?") {
            return false;
        }

        match self.api.delete_student(id).await {
            Ok(_) => {
                dom::alert("Deleted");
                self.load_students().await;
                true
            }
            Err(ApiError::Rejected { message }) => {
                dom::alert(&format!("Error: {}", message));
                false
            }
            Err(e) => {
                error!("Error deleting student {}: {}", id, e);
                dom::alert("Error deleting student");
                false
            }
        }
    }

    fn build_report(&self) -> Result<RosterReport> {
        let students = self.students.borrow();
        let visible = filter_students(&students, &Self::query_from_page());
        RosterReport::build(&visible, &self.school.borrow(), Local::now().naive_local())
    }

    async fn export_pdf(&self) -> bool {
        let result = match self.build_report() {
            Ok(report) => render_pdf(&report).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                error!("PDF export failed: {}", e);
                let message = match &e {
                    AdminError::Validation(message) => message.as_str(),
                    AdminError::Browser(message) if message == JSPDF_MISSING => message.as_str(),
                    _ => "Failed to export PDF. Check console for details.",
                };
                dom::alert(message);
                false
            }
        }
    }

    fn view_id_card(&self, card: IdCard) {
        debug!("Showing {} card {}", card.holder.as_str(), card.id);
        let html = card.render_html(&self.school.borrow(), Local::now().date_naive());
        dom::set_html(ID_CARD_PREVIEW_ID, &html);
        *self.card.borrow_mut() = Some(card);

        if let Err(e) = dom::show_modal(ID_CARD_MODAL_ID) {
            error!("ID card modal not shown: {}", e);
        }
    }

    async fn download_id_card(&self) -> bool {
        let Some(canvas) = dom::by_id(ID_CARD_CANVAS_ID) else {
            dom::alert("No ID card preview available to download.");
            return false;
        };
        let Some(file_name) = self.card.borrow().as_ref().map(IdCard::download_file_name) else {
            dom::alert("No ID card data available.");
            return false;
        };

        match capture(&canvas, &file_name).await {
            Ok(()) => {
                info!("Downloaded {}", file_name);
                true
            }
            Err(e) => {
                error!("ID card capture failed: {}", e);
                let message = match &e {
                    AdminError::Browser(message) if message.starts_with("html2canvas") => message.as_str(),
                    _ => "Failed to generate image. See console for details.",
                };
                dom::alert(message);
                false
            }
        }
    }
}

async fn capture(canvas: &Element, file_name: &str) -> Result<()> {
    let data_url = dom::capture_png(canvas).await?;
    dom::trigger_download(file_name, &data_url)
}

fn spawn_with<F, Fut>(weak: &Weak<RosterInner>, task: F)
where
    F: FnOnce(Rc<RosterInner>) -> Fut + 'static,
    Fut: std::future::Future<Output = ()> + 'static,
{
    let weak = weak.clone();
    spawn_local(async move {
        if let Some(inner) = weak.upgrade() {
            task(inner).await;
        }
    });
}

fn open_student_form(form: &StudentForm, title: &str) {
    dom::set_text("studentGeneralModalTitle", title);
    dom::set_field_value("studentGeneralId", &form.id);
    dom::set_field_value("studentIdInput", &form.student_id);
    dom::set_field_value("studentNameInput", &form.student_name);
    dom::set_field_value("studentStatusInput", &form.status);
    dom::set_field_value("graduationYearInput", &form.graduation_year);
    sync_graduation_field(&form.status);

    if let Err(e) = dom::show_modal(STUDENT_MODAL_ID) {
        error!("Student modal not shown: {}", e);
    }
}

fn sync_graduation_field(status: &str) {
    match graduation_year_label(status) {
        Some(label) => {
            dom::set_text("graduationYearLabel", label);
            dom::set_visible("graduationYearGroup", true);
        }
        None => {
            dom::set_visible("graduationYearGroup", false);
            dom::set_field_value("graduationYearInput", "");
        }
    }
}

/// Card data from the `data-*` attributes of a clicked `.view-id-card-btn`
fn card_from_event(event: &Event) -> Option<IdCard> {
    let button = event
        .target()?
        .dyn_into::<Element>()
        .ok()?
        .closest(".view-id-card-btn")
        .ok()??;
    let attr = |name: &str| button.get_attribute(name).unwrap_or_default();

    let Some(holder) = CardHolder::parse(&attr("data-type")) else {
        warn!("ID card button without a known data-type");
        return None;
    };
    let entity_id = button
        .get_attribute("data-studentid")
        .or_else(|| button.get_attribute("data-staffid"))
        .unwrap_or_default();

    Some(IdCard {
        holder,
        id: attr("data-id"),
        name: attr("data-name"),
        entity_id,
        picture: button.get_attribute("data-picture"),
    })
}
