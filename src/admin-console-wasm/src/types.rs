use serde::{Deserialize, Serialize};

/// Memorization video after normalization
///
/// Comparison fields (`session`, `term`, `week`, `section_id`, `class_id`)
/// are always strings, whatever the backend sent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: String,
    pub session: String,
    pub term: String,
    pub week: String,
    pub day: String,
    pub section_id: String,
    pub class_id: String,
    pub class_name: String,
    pub from_ayah: String,
    pub to_ayah: String,
    pub video_url: String,
}

impl VideoRecord {
    /// Compound `section:class` key
    pub fn class_key(&self) -> String {
        format!("{}:{}", self.section_id, self.class_id)
    }

    pub fn display_class_name(&self) -> &str {
        if self.class_name.is_empty() {
            "N/A"
        } else {
            &self.class_name
        }
    }
}

/// Filter criteria for videos
///
/// `None` and `Some("")` both mean "no constraint on this field".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub session: Option<String>,
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default)]
    pub week: Option<String>,
    /// `section_id:class_id`
    #[serde(default, rename = "class")]
    pub class_key: Option<String>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        [&self.session, &self.term, &self.week, &self.class_key]
            .iter()
            .all(|field| field.as_deref().map_or(true, str::is_empty))
    }
}

/// Parsed `section_id:class_id` criterion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassKey {
    pub section_id: String,
    /// Missing when the key had no `:`; such a key matches nothing
    pub class_id: Option<String>,
}

impl ClassKey {
    pub fn parse(key: &str) -> Self {
        let mut parts = key.split(':');
        Self {
            section_id: parts.next().unwrap_or_default().to_string(),
            class_id: parts.next().map(str::to_string),
        }
    }

    pub fn matches(&self, video: &VideoRecord) -> bool {
        video.section_id == self.section_id
            && self.class_id.as_deref() == Some(video.class_id.as_str())
    }
}

/// Playback state of the modal player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    Idle,
    Loaded,
    Playing,
    Paused,
    Ended,
}

/// Every control the player binds a handler to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlId {
    PlayPause,
    Stop,
    SeekInput,
    SeekChange,
    Prev,
    Next,
    TimeUpdate,
    LoadedMetadata,
    Ended,
    /// `play()` promise rejected, e.g. by an autoplay policy
    PlayRejected,
    Delete,
    Dismiss,
}

pub const CONTROL_COUNT: usize = 12;

impl ControlId {
    pub const ALL: [ControlId; CONTROL_COUNT] = [
        ControlId::PlayPause,
        ControlId::Stop,
        ControlId::SeekInput,
        ControlId::SeekChange,
        ControlId::Prev,
        ControlId::Next,
        ControlId::TimeUpdate,
        ControlId::LoadedMetadata,
        ControlId::Ended,
        ControlId::PlayRejected,
        ControlId::Delete,
        ControlId::Dismiss,
    ];
}

/// Event fired by a bound control, tagged with the record it was bound for
#[derive(Debug, Clone, PartialEq)]
pub struct ControlEvent {
    pub control: ControlId,
    pub record_id: String,
    /// Seek percentage or media time, depending on the control
    pub value: Option<f64>,
}

impl ControlEvent {
    pub fn new(control: ControlId, record_id: impl Into<String>) -> Self {
        Self {
            control,
            record_id: record_id.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }
}
