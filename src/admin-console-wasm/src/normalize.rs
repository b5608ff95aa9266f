use school_admin_api::fields::text_or_empty;
use serde_json::{Map, Value};

use crate::types::VideoRecord;

// Alias keys per canonical field, highest priority first
const ID: &[&str] = &["id", "video_id", "videoId"];
const SESSION: &[&str] = &["session", "session_year", "sessionYear"];
const TERM: &[&str] = &["term"];
const WEEK: &[&str] = &["week"];
const DAY: &[&str] = &["day"];
const SECTION_ID: &[&str] = &["section_id", "sectionId", "section"];
const CLASS_ID: &[&str] = &["class_id", "classId", "class"];
const CLASS_NAME: &[&str] = &["class_name", "className", "class"];
const FROM_AYAH: &[&str] = &["from_ayah", "fromAyah"];
const TO_AYAH: &[&str] = &["to_ayah", "toAyah"];
const VIDEO_URL: &[&str] = &["video_url", "videoUrl"];

/// Convert one backend record into a [`VideoRecord`].
///
/// Total: anything that is not an object, and any field with no matching
/// alias, becomes the empty string.
pub fn normalize_video(raw: &Value) -> VideoRecord {
    let empty = Map::new();
    let record = raw.as_object().unwrap_or(&empty);

    VideoRecord {
        id: text_or_empty(record, ID),
        session: text_or_empty(record, SESSION),
        term: text_or_empty(record, TERM),
        week: text_or_empty(record, WEEK),
        day: text_or_empty(record, DAY),
        section_id: text_or_empty(record, SECTION_ID),
        class_id: text_or_empty(record, CLASS_ID),
        class_name: text_or_empty(record, CLASS_NAME),
        from_ayah: text_or_empty(record, FROM_AYAH),
        to_ayah: text_or_empty(record, TO_AYAH),
        video_url: text_or_empty(record, VIDEO_URL),
    }
}

/// Normalize a whole response, keeping backend order
pub fn normalize_all(raw: &[Value]) -> Vec<VideoRecord> {
    raw.iter().map(normalize_video).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_aliases_and_numeric_fields() {
        let video = normalize_video(&json!({
            "id": 7,
            "sessionYear": "2024/2025",
            "term": 2,
            "week": 11,
            "day": "Tuesday",
            "sectionId": 1,
            "classId": 5,
            "className": "Hifz 2",
            "fromAyah": "Al-Naba 1",
            "to_ayah": "Al-Naba 16",
            "videoUrl": "/uploads/v7.mp4"
        }));

        assert_eq!(video.id, "7");
        assert_eq!(video.session, "2024/2025");
        assert_eq!(video.term, "2");
        assert_eq!(video.week, "11");
        assert_eq!(video.section_id, "1");
        assert_eq!(video.class_id, "5");
        assert_eq!(video.class_name, "Hifz 2");
        assert_eq!(video.from_ayah, "Al-Naba 1");
        assert_eq!(video.video_url, "/uploads/v7.mp4");
    }

    #[test]
    fn test_missing_fields_become_empty() {
        let video = normalize_video(&json!({ "id": "x1" }));
        assert_eq!(video.session, "");
        assert_eq!(video.term, "");
        assert_eq!(video.week, "");
        assert_eq!(video.section_id, "");
        assert_eq!(video.class_id, "");
        assert_eq!(video.class_name, "");
        assert_eq!(video.display_class_name(), "N/A");
    }

    #[test]
    fn test_non_object_record_is_all_empty() {
        assert_eq!(normalize_video(&json!("garbage")), VideoRecord::default());
        assert_eq!(normalize_video(&Value::Null), VideoRecord::default());
    }

    #[test]
    fn test_canonical_key_wins_over_alias() {
        let video = normalize_video(&json!({
            "session": "2025",
            "session_year": "1999",
            "class": "9",
            "class_id": 3
        }));
        assert_eq!(video.session, "2025");
        assert_eq!(video.class_id, "3");
        // bare `class` doubles as a display name when nothing better exists
        assert_eq!(video.class_name, "9");
    }

    #[test]
    fn test_order_is_preserved() {
        let raw = vec![json!({ "id": 3 }), json!({ "id": 1 }), json!({ "id": 2 })];
        let ids: Vec<String> = normalize_all(&raw).into_iter().map(|v| v.id).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
    }
}
