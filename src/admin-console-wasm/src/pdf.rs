use js_sys::{Array, Function, Reflect};
use serde_json::json;
use tracing::{info, warn};
use wasm_bindgen::prelude::*;

use crate::dom::{self, call_method, global, to_js};
use crate::error::{AdminError, Result};
use crate::report::RosterReport;

pub const JSPDF_MISSING: &str = "jspdf library not loaded";
const LOGO_SIZE: f64 = 30.0;

/// jsPDF document handle
struct PdfDoc {
    doc: JsValue,
    page_width: f64,
}

impl PdfDoc {
    fn create() -> Result<Self> {
        let jspdf = global("jspdf").ok_or_else(|| AdminError::browser(JSPDF_MISSING))?;
        let ctor: Function = Reflect::get(&jspdf, &JsValue::from_str("jsPDF"))?
            .dyn_into()
            .map_err(|_| AdminError::browser(JSPDF_MISSING))?;

        let args: Array = ["p", "mm", "a4"].iter().map(|s| JsValue::from_str(s)).collect();
        let doc = Reflect::construct(&ctor, &args)?;
        let page_width = page_size_of(&doc, "getWidth")?;

        Ok(Self { doc, page_width })
    }

    fn call(&self, name: &str, args: &[JsValue]) -> Result<JsValue> {
        call_method(&self.doc, name, args)
    }

    fn font(&self, size: f64, style: &str) -> Result<()> {
        self.call("setFontSize", &[size.into()])?;
        self.call("setFont", &[JsValue::UNDEFINED, style.into()])?;
        Ok(())
    }

    fn centered(&self, text: &JsValue, y: f64) -> Result<()> {
        let options = to_js(&json!({ "align": "center" }))?;
        self.call("text", &[text.clone(), (self.page_width / 2.0).into(), y.into(), options])?;
        Ok(())
    }
}

fn page_size_of(doc: &JsValue, getter: &str) -> Result<f64> {
    let internal = Reflect::get(doc, &JsValue::from_str("internal"))?;
    let page_size = Reflect::get(&internal, &JsValue::from_str("pageSize"))?;
    call_method(&page_size, getter, &[])?
        .as_f64()
        .ok_or_else(|| AdminError::browser(format!("pageSize.{} returned no number", getter)))
}

/// Draw the report through jsPDF/autoTable and save it
pub async fn render_pdf(report: &RosterReport) -> Result<()> {
    let pdf = PdfDoc::create()?;
    let mut y = 15.0;

    if !report.logo_src.is_empty() {
        match dom::load_image_data_url(&report.logo_src).await {
            Ok(data_url) => {
                let x = (pdf.page_width - LOGO_SIZE) / 2.0;
                pdf.call(
                    "addImage",
                    &[
                        data_url.into(),
                        "JPEG".into(),
                        x.into(),
                        y.into(),
                        LOGO_SIZE.into(),
                        LOGO_SIZE.into(),
                    ],
                )?;
                y += LOGO_SIZE + 5.0;
            }
            Err(e) => warn!("School logo failed to load: {}", e),
        }
    }

    pdf.font(14.0, "bold")?;
    if !report.school_name.is_empty() {
        pdf.centered(&report.school_name.as_str().into(), y)?;
        y += 7.0;
    }

    pdf.font(11.0, "normal")?;
    if !report.sub_name.is_empty() {
        pdf.centered(&report.sub_name.as_str().into(), y)?;
        y += 5.0;
    }

    pdf.call("setFontSize", &[9.0.into()])?;
    if !report.address.is_empty() {
        let lines = pdf.call(
            "splitTextToSize",
            &[report.address.as_str().into(), (pdf.page_width - 20.0).into()],
        )?;
        let count = Array::from(&lines).length() as f64;
        pdf.centered(&lines, y)?;
        y += count * 4.0 + 2.0;
    }

    for line in &report.contact_lines {
        pdf.centered(&line.as_str().into(), y)?;
        y += 5.0;
    }
    y += 3.0;

    pdf.font(13.0, "bold")?;
    pdf.centered(&report.title.into(), y)?;
    y += 10.0;

    let options = to_js(&json!({
        "head": [report.head],
        "body": report.body,
        "startY": y,
        "styles": { "fontSize": 9, "cellPadding": 4 },
        "headStyles": {
            "fillColor": report.head_fill,
            "textColor": [255, 255, 255],
            "fontStyle": "bold"
        },
        "bodyStyles": { "textColor": [0, 0, 0] },
        "margin": { "left": 10, "right": 10 }
    }))?;

    // Footer on every page; autoTable calls this synchronously
    let doc = pdf.doc.clone();
    let footer = report.footer.clone();
    let did_draw_page = Closure::wrap(Box::new(move |data: JsValue| {
        let page = Reflect::get(&data, &JsValue::from_str("pageNumber"))
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(1.0);
        if let Err(e) = draw_footer(&doc, &footer, page) {
            warn!("Footer not drawn: {}", e);
        }
    }) as Box<dyn FnMut(JsValue)>);
    Reflect::set(&options, &JsValue::from_str("didDrawPage"), did_draw_page.as_ref())?;

    pdf.call("autoTable", &[options])?;
    drop(did_draw_page);

    pdf.call("save", &[report.file_name.as_str().into()])?;
    info!("Exported {} students to {}", report.body.len(), report.file_name);
    Ok(())
}

fn draw_footer(doc: &JsValue, footer: &str, page: f64) -> Result<()> {
    let footer_y = page_size_of(doc, "getHeight")? - 10.0;
    let width = page_size_of(doc, "getWidth")?;

    call_method(doc, "setFontSize", &[8.0.into()])?;
    call_method(doc, "setTextColor", &[128.into(), 128.into(), 128.into()])?;
    call_method(doc, "text", &[footer.into(), 10.0.into(), footer_y.into()])?;
    call_method(
        doc,
        "text",
        &[format!("Page {}", page).into(), (width - 20.0).into(), footer_y.into()],
    )?;
    Ok(())
}
