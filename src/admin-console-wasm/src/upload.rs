use school_admin_api::{ApiError, MemorizationScheme, SchemeQuery, UploadFile, VideoUpload};
use serde::{Deserialize, Serialize};

use crate::error::{AdminError, Result};

pub const MISSING_FIELDS_MESSAGE: &str = "Please fill all required fields before uploading.";

/// Alert text for a failed upload
pub fn upload_failure_message(err: &ApiError) -> String {
    match err {
        ApiError::Rejected { message } => format!("Upload failed: {}", message),
        ApiError::Malformed(_) => "Upload failed: Invalid JSON".to_string(),
        other => format!("Error uploading video: {}", other),
    }
}

/// Current values of the upload form's dropdowns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSelection {
    /// `section_id:class_id`
    pub class_key: String,
    pub session: String,
    pub term: String,
    pub week: String,
    pub day: String,
}

impl UploadSelection {
    fn class_parts(&self) -> (String, String) {
        let mut parts = self.class_key.split(':').map(str::trim);
        let section_id = parts.next().unwrap_or_default().to_string();
        let class_id = parts.next().unwrap_or_default().to_string();
        (section_id, class_id)
    }

    fn is_complete(&self) -> bool {
        [&self.class_key, &self.session, &self.term, &self.week, &self.day]
            .iter()
            .all(|v| !v.is_empty())
    }

    /// Scheme lookup for the selection; `None` until every dropdown is set
    pub fn scheme_query(&self) -> Option<SchemeQuery> {
        if !self.is_complete() {
            return None;
        }
        let (_, class_id) = self.class_parts();
        if class_id.is_empty() {
            return None;
        }

        Some(SchemeQuery {
            class_id,
            term: self.term.clone(),
            week: self.week.clone(),
            day: self.day.clone(),
            session: self.session.clone(),
        })
    }
}

/// Upload form contents, minus the file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadForm {
    #[serde(flatten)]
    pub selection: UploadSelection,
    pub from_ayah: String,
    pub to_ayah: String,
}

impl UploadForm {
    /// Multipart payload, or the validation error the user sees
    pub fn into_upload(self, video: Option<UploadFile>) -> Result<VideoUpload> {
        let complete = self.selection.is_complete()
            && !self.from_ayah.is_empty()
            && !self.to_ayah.is_empty();
        let video = match video {
            Some(video) if complete => video,
            _ => return Err(AdminError::validation(MISSING_FIELDS_MESSAGE)),
        };

        let (section_id, class_id) = self.selection.class_parts();
        let UploadSelection {
            session,
            term,
            week,
            day,
            ..
        } = self.selection;

        Ok(VideoUpload {
            class_id,
            section_id,
            session,
            term,
            week,
            day,
            from_ayah: self.from_ayah,
            to_ayah: self.to_ayah,
            video,
        })
    }
}

/// Outcome of the ayat-range lookup shown under the day dropdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AyatLookup {
    Found {
        display: String,
        from_ayah: String,
        to_ayah: String,
    },
    NotFound,
    Failed,
    Error,
}

impl AyatLookup {
    pub fn from_result(result: std::result::Result<Vec<MemorizationScheme>, ApiError>) -> Self {
        match result {
            Ok(schemes) => match schemes.into_iter().next() {
                Some(scheme) => AyatLookup::Found {
                    display: format!(
                        "Week {} – {}: {} → {}",
                        scheme.week, scheme.day, scheme.from_ayah, scheme.to_ayah
                    ),
                    from_ayah: scheme.from_ayah,
                    to_ayah: scheme.to_ayah,
                },
                None => AyatLookup::NotFound,
            },
            Err(ApiError::Status { .. }) => AyatLookup::Failed,
            // Backend answered, just not with a usable scheme
            Err(ApiError::Rejected { .. }) | Err(ApiError::Malformed(_)) => AyatLookup::NotFound,
            Err(ApiError::Network(_)) | Err(ApiError::InvalidRequest(_)) => AyatLookup::Error,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AyatLookup::Found { display, .. } => display,
            AyatLookup::NotFound => "No ayat range found for this selection",
            AyatLookup::Failed => "Failed to load ayat range",
            AyatLookup::Error => "Error loading ayat range",
        }
    }

    /// Values for the hidden from/to inputs; cleared unless found
    pub fn ayat(&self) -> (&str, &str) {
        match self {
            AyatLookup::Found {
                from_ayah, to_ayah, ..
            } => (from_ayah, to_ayah),
            _ => ("", ""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use school_admin_api::FileData;

    fn create_test_selection() -> UploadSelection {
        UploadSelection {
            class_key: "1:5".to_string(),
            session: "2024/2025".to_string(),
            term: "1".to_string(),
            week: "3".to_string(),
            day: "Monday".to_string(),
        }
    }

    fn create_test_file() -> UploadFile {
        UploadFile {
            name: "clip.mp4".to_string(),
            content_type: "video/mp4".to_string(),
            data: FileData::Bytes(vec![0, 1, 2]),
        }
    }

    #[test]
    fn test_scheme_query_requires_every_dropdown() {
        let query = create_test_selection().scheme_query().unwrap();
        assert_eq!(query.class_id, "5");
        assert_eq!(query.day, "Monday");

        let mut selection = create_test_selection();
        selection.day.clear();
        assert_eq!(selection.scheme_query(), None);

        let mut selection = create_test_selection();
        selection.class_key = "1".to_string();
        assert_eq!(selection.scheme_query(), None);
    }

    #[test]
    fn test_into_upload_splits_class_key() {
        let form = UploadForm {
            selection: UploadSelection {
                class_key: "2 : 7".to_string(),
                ..create_test_selection()
            },
            from_ayah: "1".to_string(),
            to_ayah: "10".to_string(),
        };

        let upload = form.into_upload(Some(create_test_file())).unwrap();
        assert_eq!(upload.section_id, "2");
        assert_eq!(upload.class_id, "7");
        assert_eq!(upload.to_ayah, "10");
        assert_eq!(upload.video.name, "clip.mp4");
    }

    #[test]
    fn test_into_upload_validation() {
        let form = UploadForm {
            selection: create_test_selection(),
            from_ayah: "1".to_string(),
            to_ayah: String::new(),
        };
        let err = form.into_upload(Some(create_test_file())).unwrap_err();
        assert_eq!(err, AdminError::validation(MISSING_FIELDS_MESSAGE));

        let form = UploadForm {
            selection: create_test_selection(),
            from_ayah: "1".to_string(),
            to_ayah: "2".to_string(),
        };
        assert!(form.into_upload(None).is_err());
    }

    #[test]
    fn test_ayat_lookup_outcomes() {
        let found = AyatLookup::from_result(Ok(vec![MemorizationScheme {
            week: "3".to_string(),
            day: "Monday".to_string(),
            from_ayah: "An-Naba 1".to_string(),
            to_ayah: "An-Naba 10".to_string(),
        }]));
        assert_eq!(found.message(), "Week 3 – Monday: An-Naba 1 → An-Naba 10");
        assert_eq!(found.ayat(), ("An-Naba 1", "An-Naba 10"));

        let empty = AyatLookup::from_result(Ok(Vec::new()));
        assert_eq!(empty.message(), "No ayat range found for this selection");
        assert_eq!(empty.ayat(), ("", ""));

        let status = AyatLookup::from_result(Err(ApiError::Status {
            status: 500,
            body: String::new(),
        }));
        assert_eq!(status.message(), "Failed to load ayat range");

        let network = AyatLookup::from_result(Err(ApiError::Network("offline".to_string())));
        assert_eq!(network.message(), "Error loading ayat range");
    }

    #[test]
    fn test_form_deserializes_flat() {
        let form: UploadForm = serde_json::from_str(
            r#"{"class_key":"1:5","session":"2024","term":"1","week":"2","day":"Monday","from_ayah":"1"}"#,
        )
        .unwrap();
        assert_eq!(form.selection.week, "2");
        assert_eq!(form.from_ayah, "1");
        assert_eq!(form.to_ayah, "");
    }

    #[test]
    fn test_upload_failure_messages() {
        let rejected = ApiError::Rejected {
            message: "Week already has a video".to_string(),
        };
        assert_eq!(upload_failure_message(&rejected), "Upload failed: Week already has a video");

        let not_json = ApiError::Malformed("body is not JSON: <html>".to_string());
        assert_eq!(upload_failure_message(&not_json), "Upload failed: Invalid JSON");

        let offline = ApiError::Network("connection refused".to_string());
        assert_eq!(
            upload_failure_message(&offline),
            "Error uploading video: Network error: connection refused"
        );
    }
}
