use super::*;
use mockito::{Matcher, Server};
use serde_json::json;

fn create_test_api(server: &Server) -> AdminApi {
    AdminApi::new(&server.url()).unwrap()
}

fn ok_list(data: serde_json::Value) -> String {
    json!({ "success": true, "data": data }).to_string()
}

#[tokio::test]
async fn test_memorization_videos_returns_raw_records() {
    let mut server = Server::new_async().await;
    let api = create_test_api(&server);

    let _m = server
        .mock("GET", "/api/memorization-videos")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ok_list(json!([
            { "id": 1, "session_year": "2024", "term": 2 },
            { "id": 2, "session": "2023", "term": "1" }
        ])))
        .create_async()
        .await;

    let videos = api.memorization_videos().await.unwrap();
    assert_eq!(videos.len(), 2);
    assert_eq!(videos[0]["session_year"], "2024");
}

#[tokio::test]
async fn test_non_json_list_is_malformed() {
    let mut server = Server::new_async().await;
    let api = create_test_api(&server);

    let _m = server
        .mock("GET", "/api/memorization-videos")
        .with_status(200)
        .with_body("<!doctype html><p>login</p>")
        .create_async()
        .await;

    let err = api.memorization_videos().await.unwrap_err();
    assert!(matches!(err, ApiError::Malformed(_)));
}

#[tokio::test]
async fn test_classes_skip_entries_without_id() {
    let mut server = Server::new_async().await;
    let api = create_test_api(&server);

    let _m = server
        .mock("GET", "/api/admin-classes")
        .with_status(200)
        .with_body(ok_list(json!([
            { "section_id": 1, "class_id": 4, "class_name": "Hifz 1" },
            { "class_name": "Broken" },
            { "sectionId": 2, "classId": "7", "className": "JSS 1", "section_name": "Secondary" }
        ])))
        .create_async()
        .await;

    let classes = api.admin_classes().await.unwrap();
    assert_eq!(classes.len(), 2);
    assert_eq!(classes[0].key(), "1:4");
    assert_eq!(classes[1].label(), "JSS 1 (Secondary)");
}

#[tokio::test]
async fn test_sessions_accept_both_shapes() {
    let mut server = Server::new_async().await;
    let api = create_test_api(&server);

    let _m = server
        .mock("GET", "/api/sessions")
        .with_status(200)
        .with_body(ok_list(json!(["2024/2025", { "session_year": "2023/2024" }, { "other": 1 }])))
        .create_async()
        .await;

    let sessions = api.sessions().await.unwrap();
    assert_eq!(sessions, vec!["2024/2025", "2023/2024"]);
}

#[tokio::test]
async fn test_scheme_query_is_encoded() {
    let mut server = Server::new_async().await;
    let api = create_test_api(&server);

    let _m = server
        .mock("GET", "/api/staff-memorization-schemes")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("class_id".into(), "5".into()),
            Matcher::UrlEncoded("term".into(), "2".into()),
            Matcher::UrlEncoded("week".into(), "3".into()),
            Matcher::UrlEncoded("day".into(), "Monday".into()),
            Matcher::UrlEncoded("session".into(), "2024/2025".into()),
        ]))
        .with_status(200)
        .with_body(ok_list(json!([
            { "week": 3, "day": "Monday", "from_ayah": "Al-Mulk 1", "to_ayah": "Al-Mulk 10" }
        ])))
        .create_async()
        .await;

    let query = SchemeQuery {
        class_id: "5".to_string(),
        term: "2".to_string(),
        week: "3".to_string(),
        day: "Monday".to_string(),
        session: "2024/2025".to_string(),
    };
    let schemes = api.memorization_schemes(&query).await.unwrap();
    assert_eq!(schemes.len(), 1);
    assert_eq!(schemes[0].to_ayah, "Al-Mulk 10");
}

#[tokio::test]
async fn test_scheme_error_status_is_reported() {
    let mut server = Server::new_async().await;
    let api = create_test_api(&server);

    let _m = server
        .mock("GET", "/api/staff-memorization-schemes")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body(json!({ "success": false, "message": "db down" }).to_string())
        .create_async()
        .await;

    let query = SchemeQuery {
        class_id: "5".to_string(),
        term: "1".to_string(),
        week: "1".to_string(),
        day: "Sunday".to_string(),
        session: "2024".to_string(),
    };
    let err = api.memorization_schemes(&query).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_upload_sends_multipart_form() {
    let mut server = Server::new_async().await;
    let api = create_test_api(&server);

    let m = server
        .mock("POST", "/api/admin/upload-memorization-video")
        .match_header("content-type", Matcher::Regex("multipart/form-data".into()))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="class_id""#.into()),
            Matcher::Regex(r#"name="section_id""#.into()),
            Matcher::Regex(r#"name="to_ayah""#.into()),
            Matcher::Regex(r#"filename="lesson.mp4""#.into()),
        ]))
        .with_status(200)
        .with_body(json!({ "success": true, "message": "stored" }).to_string())
        .create_async()
        .await;

    let upload = VideoUpload {
        class_id: "5".to_string(),
        section_id: "1".to_string(),
        session: "2024/2025".to_string(),
        term: "2".to_string(),
        week: "3".to_string(),
        day: "Monday".to_string(),
        from_ayah: "1".to_string(),
        to_ayah: "10".to_string(),
        video: UploadFile {
            name: "lesson.mp4".to_string(),
            content_type: "video/mp4".to_string(),
            data: FileData::Bytes(b"fake-video".to_vec()),
        },
    };

    let ack = api.upload_memorization_video(upload).await.unwrap();
    assert_eq!(ack.message.as_deref(), Some("stored"));
    m.assert_async().await;
}

#[tokio::test]
async fn test_delete_video_rejection() {
    let mut server = Server::new_async().await;
    let api = create_test_api(&server);

    let _m = server
        .mock("DELETE", "/api/admin/delete-memorization-video/17")
        .with_status(404)
        .with_body(json!({ "success": false, "message": "Video not found" }).to_string())
        .create_async()
        .await;

    let err = api.delete_memorization_video("17").await.unwrap_err();
    assert_eq!(err.rejection_message(), Some("Video not found"));
}

#[tokio::test]
async fn test_students_list_skips_bad_rows() {
    let mut server = Server::new_async().await;
    let api = create_test_api(&server);

    let _m = server
        .mock("GET", "/api/students-general-list")
        .with_status(200)
        .with_body(ok_list(json!([
            { "id": 1, "student_id": "IBC/001", "student_name": "Aisha", "status": "Active" },
            { "student_id": "IBC/002" },
            { "id": 3, "student_id": "IBC/003", "student_name": "Musa", "status": "Left", "graduation_year": "2022" }
        ])))
        .create_async()
        .await;

    let students = api.students_general_list().await.unwrap();
    assert_eq!(students.len(), 2);
    assert_eq!(students[1].status, StudentStatus::Left);
}

#[tokio::test]
async fn test_students_list_without_data_is_empty() {
    let mut server = Server::new_async().await;
    let api = create_test_api(&server);

    let _m = server
        .mock("GET", "/api/students-general-list")
        .with_status(200)
        .with_body(json!({ "success": true }).to_string())
        .create_async()
        .await;

    assert!(api.students_general_list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_add_and_update_student_bodies() {
    let mut server = Server::new_async().await;
    let api = create_test_api(&server);

    let add = server
        .mock("POST", "/api/student-add")
        .match_body(Matcher::Json(json!({
            "student_id": "IBC/010",
            "student_name": "Zainab Umar",
            "status": "Active",
            "graduation_year": ""
        })))
        .with_status(200)
        .with_body(json!({ "success": true }).to_string())
        .create_async()
        .await;

    let update = server
        .mock("PUT", "/api/student-update-status/10")
        .match_body(Matcher::Json(json!({ "status": "Graduated", "graduation_year": "2025" })))
        .with_status(200)
        .with_body(json!({ "success": true }).to_string())
        .create_async()
        .await;

    api.add_student(&NewStudent {
        student_id: "IBC/010".to_string(),
        student_name: "Zainab Umar".to_string(),
        status: "Active".to_string(),
        graduation_year: String::new(),
    })
    .await
    .unwrap();

    api.update_student_status(
        10,
        &StatusUpdate {
            status: "Graduated".to_string(),
            graduation_year: "2025".to_string(),
        },
    )
    .await
    .unwrap();

    add.assert_async().await;
    update.assert_async().await;
}

#[tokio::test]
async fn test_connection_failure_is_network_error() {
    // Nothing listens on port 9 on a test host
    let api = AdminApi::new("http://127.0.0.1:9").unwrap();
    let err = api.delete_student(1).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
}

#[test]
fn test_relative_base_url_is_rejected() {
    let err = AdminApi::new("/api").unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
}
