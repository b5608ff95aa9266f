use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::fields::{first_non_empty, first_text, first_value, text, text_or_empty};

/// Class entry from `/api/admin-classes`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassOption {
    pub section_id: String,
    pub class_id: String,
    pub class_name: String,
    pub section_name: String,
}

impl ClassOption {
    /// Parse one raw class; entries without a class id are dropped
    pub fn from_value(raw: &Value) -> Option<Self> {
        let record = raw.as_object()?;
        let class_id = first_text(record, &["class_id", "classId", "value"])?;
        let section_id =
            first_text(record, &["section_id", "sectionId"]).unwrap_or_else(|| "1".to_string());
        let class_name = first_text(record, &["class_name", "className", "name"])
            .unwrap_or_else(|| "Unnamed Class".to_string());
        let section_name = first_text(record, &["section_name"]).unwrap_or_else(|| {
            if section_id == "1" {
                "Tahfiz".to_string()
            } else {
                "Western".to_string()
            }
        });

        Some(Self {
            section_id,
            class_id,
            class_name,
            section_name,
        })
    }

    /// Compound `section:class` key used by selects and filters
    pub fn key(&self) -> String {
        format!("{}:{}", self.section_id, self.class_id)
    }

    pub fn label(&self) -> String {
        format!("{} ({})", self.class_name, self.section_name)
    }
}

/// Session entries are either bare strings or `{ session_year }` objects
pub fn session_from_value(raw: &Value) -> Option<String> {
    let session = match raw {
        Value::String(s) => s.clone(),
        Value::Object(record) => first_text(record, &["session_year", "sessionYear", "session"])?,
        _ => return None,
    };
    (!session.is_empty()).then_some(session)
}

/// Query for `/api/staff-memorization-schemes`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeQuery {
    pub class_id: String,
    pub term: String,
    pub week: String,
    pub day: String,
    pub session: String,
}

impl SchemeQuery {
    pub(crate) fn pairs(&self) -> [(&'static str, &str); 5] {
        [
            ("class_id", self.class_id.as_str()),
            ("term", self.term.as_str()),
            ("week", self.week.as_str()),
            ("day", self.day.as_str()),
            ("session", self.session.as_str()),
        ]
    }
}

/// One scheme row; only the fields the upload form shows are kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorizationScheme {
    pub week: String,
    pub day: String,
    pub from_ayah: String,
    pub to_ayah: String,
}

impl MemorizationScheme {
    pub fn from_value(raw: &Value) -> Option<Self> {
        let record = raw.as_object()?;
        Some(Self {
            week: text_or_empty(record, &["week"]),
            day: text_or_empty(record, &["day"]),
            from_ayah: text_or_empty(
                record,
                &["from_ayah", "from_surah_ayah", "fromAyah", "from_ayah_number"],
            ),
            to_ayah: text_or_empty(
                record,
                &["to_ayah", "to_surah_ayah", "toAyah", "to_ayah_number"],
            ),
        })
    }
}

/// Contents of an uploaded file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileData {
    Bytes(Vec<u8>),
    /// Browser file, streamed by `fetch` straight from disk
    Blob(web_sys::Blob),
}

impl FileData {
    pub fn size(&self) -> u64 {
        match self {
            FileData::Bytes(bytes) => bytes.len() as u64,
            FileData::Blob(blob) => blob.size() as u64,
        }
    }
}

/// Video file attached to an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub data: FileData,
}

/// Multipart body of `/api/admin/upload-memorization-video`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoUpload {
    pub class_id: String,
    pub section_id: String,
    pub session: String,
    pub term: String,
    pub week: String,
    pub day: String,
    pub from_ayah: String,
    pub to_ayah: String,
    pub video: UploadFile,
}

impl VideoUpload {
    pub(crate) fn text_fields(&self) -> [(&'static str, &str); 8] {
        [
            ("class_id", self.class_id.as_str()),
            ("section_id", self.section_id.as_str()),
            ("session", self.session.as_str()),
            ("term", self.term.as_str()),
            ("week", self.week.as_str()),
            ("day", self.day.as_str()),
            ("from_ayah", self.from_ayah.as_str()),
            ("to_ayah", self.to_ayah.as_str()),
        ]
    }
}

/// Enrollment status of a student
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StudentStatus {
    #[default]
    Active,
    Graduated,
    Left,
    Other(String),
}

impl StudentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            StudentStatus::Active => "Active",
            StudentStatus::Graduated => "Graduated",
            StudentStatus::Left => "Left",
            StudentStatus::Other(s) => s,
        }
    }

    /// Graduated or left: the year column applies
    pub fn has_exit_year(&self) -> bool {
        matches!(self, StudentStatus::Graduated | StudentStatus::Left)
    }
}

impl From<&str> for StudentStatus {
    fn from(s: &str) -> Self {
        match s {
            "Active" => StudentStatus::Active,
            "Graduated" => StudentStatus::Graduated,
            "Left" => StudentStatus::Left,
            other => StudentStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for StudentStatus {
    fn from(s: String) -> Self {
        StudentStatus::from(s.as_str())
    }
}

impl From<StudentStatus> for String {
    fn from(status: StudentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row of `/api/students-general-list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub student_id: String,
    pub student_name: String,
    pub status: StudentStatus,
    pub graduation_year: Option<String>,
}

impl Student {
    /// Parse a raw row; rows without an integer `id` are rejected
    pub fn from_value(raw: &Value) -> Option<Self> {
        let record: &Map<String, Value> = raw.as_object()?;
        let id = match first_value(record, &["id"])? {
            Value::Number(n) => n.as_i64()?,
            Value::String(s) => s.trim().parse().ok()?,
            _ => return None,
        };

        Some(Self {
            id,
            student_id: text_or_empty(record, &["student_id"]),
            student_name: text_or_empty(record, &["student_name"]),
            status: match first_value(record, &["status"]) {
                Some(value) => StudentStatus::from(text(value)),
                None => StudentStatus::Other(String::new()),
            },
            graduation_year: first_non_empty(record, &["graduation_year"]),
        })
    }
}

/// Body of `POST /api/student-add`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewStudent {
    pub student_id: String,
    pub student_name: String,
    pub status: String,
    pub graduation_year: String,
}

/// Body of `PUT /api/student-update-status/:id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    pub status: String,
    pub graduation_year: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_class_option_aliases_and_defaults() {
        let class = ClassOption::from_value(&json!({ "classId": 5, "name": "Hifz A" })).unwrap();
        assert_eq!(class.key(), "1:5");
        assert_eq!(class.label(), "Hifz A (Tahfiz)");

        let western = ClassOption::from_value(&json!({ "section_id": 2, "value": "9" })).unwrap();
        assert_eq!(western.key(), "2:9");
        assert_eq!(western.label(), "Unnamed Class (Western)");
    }

    #[test]
    fn test_class_without_id_is_dropped() {
        assert!(ClassOption::from_value(&json!({ "class_name": "Orphan" })).is_none());
    }

    #[test]
    fn test_session_shapes() {
        assert_eq!(session_from_value(&json!("2024/2025")).as_deref(), Some("2024/2025"));
        assert_eq!(
            session_from_value(&json!({ "sessionYear": "2023/2024" })).as_deref(),
            Some("2023/2024")
        );
        assert_eq!(session_from_value(&json!("")), None);
        assert_eq!(session_from_value(&json!(42)), None);
    }

    #[test]
    fn test_scheme_ayah_aliases() {
        let scheme = MemorizationScheme::from_value(&json!({
            "week": 3,
            "day": "Monday",
            "from_surah_ayah": "Al-Mulk 1",
            "toAyah": "Al-Mulk 5"
        }))
        .unwrap();
        assert_eq!(scheme.week, "3");
        assert_eq!(scheme.from_ayah, "Al-Mulk 1");
        assert_eq!(scheme.to_ayah, "Al-Mulk 5");
    }

    #[test]
    fn test_student_parsing() {
        let student = Student::from_value(&json!({
            "id": "12",
            "student_id": "IBC/001",
            "student_name": "Aisha Bello",
            "status": "Graduated",
            "graduation_year": 2024
        }))
        .unwrap();
        assert_eq!(student.id, 12);
        assert_eq!(student.status, StudentStatus::Graduated);
        assert_eq!(student.graduation_year.as_deref(), Some("2024"));

        assert!(Student::from_value(&json!({ "student_name": "No id" })).is_none());
    }

    #[test]
    fn test_status_serializes_as_text() {
        let json = serde_json::to_string(&StudentStatus::Other("Suspended".into())).unwrap();
        assert_eq!(json, "\"Suspended\"");
        let back: StudentStatus = serde_json::from_str("\"Left\"").unwrap();
        assert_eq!(back, StudentStatus::Left);
    }

    #[test]
    fn test_file_data_size() {
        assert_eq!(FileData::Bytes(b"fake-video".to_vec()).size(), 10);
        assert_eq!(FileData::Bytes(Vec::new()).size(), 0);
    }
}
