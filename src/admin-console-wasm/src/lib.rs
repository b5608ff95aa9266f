pub mod config;
pub mod error;
pub mod filter;
pub mod grid;
pub mod html;
pub mod id_card;
pub mod normalize;
pub mod player;
pub mod registry;
pub mod report;
pub mod roster;
pub mod state;
pub mod types;
pub mod upload;

mod dom;
mod logging;
mod pdf;
mod roster_console;
mod video_console;

pub use config::{AdminConfig, SchoolInfo, SchoolInfoPatch};
pub use error::{AdminError, Result};
pub use filter::{filter, FilterEngine, FilterOptions};
pub use normalize::{normalize_all, normalize_video};
pub use player::{PlayerController, PlayerRequest};
pub use roster_console::StudentRosterConsole;
pub use state::{Paginator, VideoListState};
pub use types::{ControlEvent, ControlId, FilterCriteria, PlayerState, VideoRecord};
pub use video_console::VideoAdminConsole;

use school_admin_api::AdminApi;
use serde_wasm_bindgen::from_value;
use wasm_bindgen::JsValue;

/// Config from the page; `undefined` or `null` means defaults
fn read_config(config: JsValue) -> std::result::Result<AdminConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        return Ok(AdminConfig::default());
    }
    Ok(from_value(config)?)
}

/// Client for `api_base`, or for the page origin
fn connect(config: &AdminConfig) -> Result<AdminApi> {
    let base = match config.api_base.as_deref() {
        Some(base) if !base.trim().is_empty() => base.to_string(),
        _ => dom::location_origin()?,
    };
    tracing::debug!("Backend at {}", base);
    Ok(AdminApi::new(&base)?)
}
