use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{multipart, Client, Method, RequestBuilder, Url};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::envelope::{Ack, Envelope};
use crate::error::{ApiError, Result};
use crate::models::{
    session_from_value, ClassOption, MemorizationScheme, NewStudent, SchemeQuery, StatusUpdate,
    FileData, Student, VideoUpload,
};

/// Typed client for the school-management REST backend
#[derive(Clone, Debug)]
pub struct AdminApi {
    client: Client,
    base_url: Url,
}

impl AdminApi {
    /// Create a client rooted at an absolute origin such as `https://school.example`
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidRequest(format!("base url `{}`: {}", base_url, e)))?;

        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidRequest(format!("path `{}`: {}", path, e)))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        // Session cookie travels with every call, same-origin or not
        #[cfg(target_arch = "wasm32")]
        let builder = builder.fetch_credentials_include();
        builder
    }

    /// Send and read the body as text; the envelope is parsed by the caller
    async fn send(&self, builder: RequestBuilder, operation: &str) -> Result<(u16, String)> {
        debug!("[{}] sending request", operation);

        let response = builder.send().await.map_err(|e| {
            warn!("[{}] transport failure: {}", operation, e);
            ApiError::from_reqwest(e)
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(ApiError::from_reqwest)?;
        debug!("[{}] HTTP {} ({} bytes)", operation, status, body.len());

        Ok((status, body))
    }

    async fn envelope(&self, builder: RequestBuilder, operation: &str) -> Result<Envelope> {
        let (status, body) = self.send(builder, operation).await?;
        Envelope::parse(status, &body).map_err(|e| {
            warn!("[{}] {}", operation, e);
            e
        })
    }

    async fn get_list(&self, path: &str, operation: &str) -> Result<Vec<Value>> {
        let url = self.build_url(path)?;
        let items = self
            .envelope(self.request(Method::GET, url), operation)
            .await?
            .into_list()
            .map_err(|e| {
                warn!("[{}] {} returned invalid data: {}", operation, path, e);
                e
            })?;
        Ok(items)
    }

    async fn ack(&self, builder: RequestBuilder, operation: &str) -> Result<Ack> {
        self.envelope(builder, operation).await?.into_ack()
    }

    /// `GET /api/admin-classes`
    pub async fn admin_classes(&self) -> Result<Vec<ClassOption>> {
        let raw = self.get_list("/api/admin-classes", "admin_classes").await?;
        Ok(raw.iter().filter_map(ClassOption::from_value).collect())
    }

    /// `GET /api/sessions`
    pub async fn sessions(&self) -> Result<Vec<String>> {
        let raw = self.get_list("/api/sessions", "sessions").await?;
        Ok(raw.iter().filter_map(session_from_value).collect())
    }

    /// `GET /api/staff-memorization-schemes`; any non-2xx status is an error
    pub async fn memorization_schemes(&self, query: &SchemeQuery) -> Result<Vec<MemorizationScheme>> {
        let mut url = self.build_url("/api/staff-memorization-schemes")?;
        url.query_pairs_mut().extend_pairs(query.pairs());

        let (status, body) = self
            .send(self.request(Method::GET, url), "memorization_schemes")
            .await?;
        if !(200..300).contains(&status) {
            warn!("[memorization_schemes] schemes fetch failed: HTTP {}", status);
            return Err(ApiError::Status { status, body });
        }

        let raw = Envelope::parse(status, &body)?.into_list()?;
        Ok(raw.iter().filter_map(MemorizationScheme::from_value).collect())
    }

    /// `POST /api/admin/upload-memorization-video` (multipart)
    pub async fn upload_memorization_video(&self, upload: VideoUpload) -> Result<Ack> {
        let url = self.build_url("/api/admin/upload-memorization-video")?;

        let fields: Vec<(&'static str, String)> = upload
            .text_fields()
            .iter()
            .map(|(name, value)| (*name, value.to_string()))
            .collect();
        info!("Uploading memorization video ({} bytes)", upload.video.data.size());

        let bytes = match upload.video.data {
            FileData::Bytes(bytes) => bytes,
            #[cfg(target_arch = "wasm32")]
            FileData::Blob(blob) => {
                let (status, body) =
                    crate::browser::post_form(&url, &fields, "video", &blob, &upload.video.name).await?;
                return Envelope::parse(status, &body)?.into_ack();
            }
            #[cfg(not(target_arch = "wasm32"))]
            FileData::Blob(_) => {
                return Err(ApiError::InvalidRequest(
                    "browser files can only be sent from wasm32".to_string(),
                ));
            }
        };

        let mut form = multipart::Form::new();
        for (name, value) in fields {
            form = form.text(name, value);
        }

        let mut part = multipart::Part::bytes(bytes).file_name(upload.video.name);
        if !upload.video.content_type.is_empty() {
            part = part
                .mime_str(&upload.video.content_type)
                .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        }
        form = form.part("video", part);

        self.ack(
            self.request(Method::POST, url).multipart(form),
            "upload_memorization_video",
        )
        .await
    }

    /// `GET /api/memorization-videos`; records are returned raw for normalization
    pub async fn memorization_videos(&self) -> Result<Vec<Value>> {
        self.get_list("/api/memorization-videos", "memorization_videos")
            .await
    }

    /// `DELETE /api/admin/delete-memorization-video/:id`
    pub async fn delete_memorization_video(&self, video_id: &str) -> Result<Ack> {
        let path = format!(
            "/api/admin/delete-memorization-video/{}",
            utf8_percent_encode(video_id, NON_ALPHANUMERIC)
        );
        let url = self.build_url(&path)?;
        self.ack(self.request(Method::DELETE, url), "delete_memorization_video")
            .await
    }

    /// `GET /api/students-general-list`
    pub async fn students_general_list(&self) -> Result<Vec<Student>> {
        let url = self.build_url("/api/students-general-list")?;
        let envelope = self
            .envelope(self.request(Method::GET, url), "students_general_list")
            .await?
            .into_accepted()?;

        let raw = match envelope.data {
            Some(Value::Array(items)) => items,
            None | Some(Value::Null) => Vec::new(),
            Some(_) => return Err(ApiError::Malformed("`data` is not an array".to_string())),
        };

        let students: Vec<Student> = raw
            .iter()
            .filter_map(|item| {
                let parsed = Student::from_value(item);
                if parsed.is_none() {
                    warn!("Skipping unparseable student row: {}", item);
                }
                parsed
            })
            .collect();
        Ok(students)
    }

    /// `POST /api/student-add`
    pub async fn add_student(&self, student: &NewStudent) -> Result<Ack> {
        let url = self.build_url("/api/student-add")?;
        self.ack(self.request(Method::POST, url).json(student), "add_student")
            .await
    }

    /// `PUT /api/student-update-status/:id`
    pub async fn update_student_status(&self, id: i64, update: &StatusUpdate) -> Result<Ack> {
        let url = self.build_url(&format!("/api/student-update-status/{}", id))?;
        self.ack(
            self.request(Method::PUT, url).json(update),
            "update_student_status",
        )
        .await
    }

    /// `DELETE /api/student-delete/:id`
    pub async fn delete_student(&self, id: i64) -> Result<Ack> {
        let url = self.build_url(&format!("/api/student-delete/{}", id))?;
        self.ack(self.request(Method::DELETE, url), "delete_student")
            .await
    }
}
