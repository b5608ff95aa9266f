use serde::{Deserialize, Serialize};

use crate::state::DEFAULT_PAGE_SIZE;

/// Engine configuration handed over from the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Backend origin; `window.location.origin` when absent
    pub api_base: Option<String>,
    pub page_size: usize,
    pub log_level: String,    // "error" | "warn" | "info" | "debug" | "trace"
    pub school: SchoolInfo,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            api_base: None,
            page_size: DEFAULT_PAGE_SIZE,
            log_level: "info".to_string(),
            school: SchoolInfo::default(),
        }
    }
}

/// School identity printed on ID cards and reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchoolInfo {
    pub name: String,
    pub sub_name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub logo_src: String,
    pub website: String,
}

impl Default for SchoolInfo {
    fn default() -> Self {
        Self {
            name: "Ibadurrahman College".to_string(),
            sub_name: "(Halqatu Ibadurrahman)".to_string(),
            address: "No. 1968 A, Gwammaja Housing Estate, Audu Wawu Street, Dala L.G.A, Kano State, Nigeria."
                .to_string(),
            phone: "08033459721, 09062171496".to_string(),
            email: "info@ibadurrahman.edu.ng".to_string(),
            logo_src: "/assets/images/logo.jpeg".to_string(),
            website: "www.ibadurrahman.edu.ng".to_string(),
        }
    }
}

/// Partial update for [`SchoolInfo`]; absent fields are kept
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SchoolInfoPatch {
    pub name: Option<String>,
    pub sub_name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub logo_src: Option<String>,
    pub website: Option<String>,
}

impl SchoolInfo {
    pub fn merge(&mut self, patch: SchoolInfoPatch) {
        let fields = [
            (&mut self.name, patch.name),
            (&mut self.sub_name, patch.sub_name),
            (&mut self.address, patch.address),
            (&mut self.phone, patch.phone),
            (&mut self.email, patch.email),
            (&mut self.logo_src, patch.logo_src),
            (&mut self.website, patch.website),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                *field = value;
            }
        }
    }

    pub fn set_logo_src(&mut self, src: impl Into<String>) {
        self.logo_src = src.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: AdminConfig = serde_json::from_str(r#"{"page_size": 8}"#).unwrap();
        assert_eq!(config.page_size, 8);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.api_base, None);
        assert_eq!(config.school.name, "Ibadurrahman College");
    }

    #[test]
    fn test_nested_school_defaults() {
        let config: AdminConfig =
            serde_json::from_str(r#"{"school": {"name": "Other School"}}"#).unwrap();
        assert_eq!(config.school.name, "Other School");
        assert_eq!(config.school.website, "www.ibadurrahman.edu.ng");
    }

    #[test]
    fn test_merge_keeps_absent_fields() {
        let mut info = SchoolInfo::default();
        info.merge(SchoolInfoPatch {
            phone: Some("0800".to_string()),
            ..Default::default()
        });
        assert_eq!(info.phone, "0800");
        assert_eq!(info.email, "info@ibadurrahman.edu.ng");
    }

    #[test]
    fn test_set_logo_src() {
        let mut info = SchoolInfo::default();
        info.set_logo_src("/img/new.png");
        assert_eq!(info.logo_src, "/img/new.png");
        assert_eq!(info.name, SchoolInfo::default().name);
    }
}
