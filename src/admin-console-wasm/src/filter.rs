use crate::types::{ClassKey, FilterCriteria, VideoRecord};
use ahash::AHashSet;
use serde::Serialize;

/// Conjunctive exact-match filter over normalized videos
pub struct FilterEngine {
    session: Option<String>,
    term: Option<String>,
    week: Option<String>,
    class_key: Option<ClassKey>,
}

impl FilterEngine {
    pub fn new(criteria: &FilterCriteria) -> Self {
        // Blank fields impose no constraint
        let active = |field: &Option<String>| field.clone().filter(|s| !s.is_empty());

        Self {
            session: active(&criteria.session),
            term: active(&criteria.term),
            week: active(&criteria.week),
            class_key: active(&criteria.class_key).map(|key| ClassKey::parse(&key)),
        }
    }

    /// Apply filters to video collection
    /// Returns indices of videos that pass the filter, in collection order
    pub fn apply_filters(&self, videos: &[VideoRecord]) -> Vec<usize> {
        videos
            .iter()
            .enumerate()
            .filter_map(|(idx, video)| {
                if self.matches_criteria(video) {
                    Some(idx)
                } else {
                    None
                }
            })
            .collect()
    }

    /// Fast filter check for a single video
    #[inline]
    pub fn matches_criteria(&self, video: &VideoRecord) -> bool {
        // Case-sensitive, untrimmed comparisons
        if let Some(ref session) = self.session {
            if &video.session != session {
                return false;
            }
        }

        if let Some(ref term) = self.term {
            if &video.term != term {
                return false;
            }
        }

        if let Some(ref week) = self.week {
            if &video.week != week {
                return false;
            }
        }

        if let Some(ref class_key) = self.class_key {
            if !class_key.matches(video) {
                return false;
            }
        }

        true
    }

    /// Get videos that match the filter criteria
    pub fn filter_videos(&self, videos: &[VideoRecord]) -> Vec<VideoRecord> {
        videos
            .iter()
            .filter(|video| self.matches_criteria(video))
            .cloned()
            .collect()
    }
}

/// Filter a collection by criteria; pure and idempotent
pub fn filter(collection: &[VideoRecord], criteria: &FilterCriteria) -> Vec<VideoRecord> {
    FilterEngine::new(criteria).filter_videos(collection)
}

/// `value`/`label` pair for a `<select>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Filter dropdown contents derived from the loaded collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub sessions: Vec<String>,
    pub classes: Vec<SelectOption>,
}

impl FilterOptions {
    pub fn from_videos(videos: &[VideoRecord]) -> Self {
        let mut sessions: Vec<String> = videos
            .iter()
            .map(|v| v.session.clone())
            .filter(|s| !s.is_empty())
            .collect::<AHashSet<_>>()
            .into_iter()
            .collect();
        sessions.sort();

        // First-seen order for classes
        let mut seen = AHashSet::new();
        let classes = videos
            .iter()
            .filter(|v| seen.insert(v.class_key()))
            .map(|v| SelectOption {
                value: v.class_key(),
                label: format!("Section {} - Class {}", v.section_id, v.class_id),
            })
            .collect();

        Self { sessions, classes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_video(id: &str, session: &str, term: &str, week: &str, class_key: &str) -> VideoRecord {
        let key = ClassKey::parse(class_key);
        VideoRecord {
            id: id.to_string(),
            session: session.to_string(),
            term: term.to_string(),
            week: week.to_string(),
            day: "Monday".to_string(),
            section_id: key.section_id,
            class_id: key.class_id.unwrap_or_default(),
            class_name: format!("Class {}", class_key),
            from_ayah: "1".to_string(),
            to_ayah: "5".to_string(),
            video_url: format!("/uploads/{}.mp4", id),
        }
    }

    fn sample() -> Vec<VideoRecord> {
        vec![
            create_test_video("1", "2024", "1", "1", "1:5"),
            create_test_video("2", "2024", "2", "1", "1:5"),
            create_test_video("3", "2023", "2", "3", "2:5"),
            create_test_video("4", "2024", "2", "3", "1:6"),
        ]
    }

    #[test]
    fn test_empty_criteria_returns_input_unchanged() {
        let videos = sample();
        assert_eq!(filter(&videos, &FilterCriteria::default()), videos);

        let blank = FilterCriteria {
            session: Some(String::new()),
            term: Some(String::new()),
            week: Some(String::new()),
            class_key: Some(String::new()),
        };
        assert_eq!(filter(&videos, &blank), videos);
    }

    #[test]
    fn test_session_and_term_filter() {
        let criteria = FilterCriteria {
            session: Some("2024".to_string()),
            term: Some("2".to_string()),
            ..Default::default()
        };

        let filtered = filter(&sample(), &criteria);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].id, "2");
        assert_eq!(filtered[1].id, "4");
    }

    #[test]
    fn test_class_filter_requires_both_parts() {
        let criteria = FilterCriteria {
            class_key: Some("1:5".to_string()),
            ..Default::default()
        };

        let filtered = filter(&sample(), &criteria);
        assert_eq!(filtered.len(), 2);
        assert!(filtered
            .iter()
            .all(|v| v.section_id == "1" && v.class_id == "5"));
    }

    #[test]
    fn test_comparison_is_exact() {
        let criteria = FilterCriteria {
            session: Some(" 2024".to_string()),
            ..Default::default()
        };
        assert!(filter(&sample(), &criteria).is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let criteria = FilterCriteria {
            week: Some("3".to_string()),
            ..Default::default()
        };
        let once = filter(&sample(), &criteria);
        let twice = filter(&once, &criteria);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_apply_filters_returns_indices() {
        let engine = FilterEngine::new(&FilterCriteria {
            term: Some("2".to_string()),
            ..Default::default()
        });
        assert_eq!(engine.apply_filters(&sample()), vec![1, 2, 3]);
        assert!(engine.apply_filters(&[]).is_empty());
    }

    #[test]
    fn test_filter_options() {
        let mut videos = sample();
        videos.push(create_test_video("5", "", "1", "1", "1:5"));

        let options = FilterOptions::from_videos(&videos);
        assert_eq!(options.sessions, vec!["2023", "2024"]);
        let values: Vec<&str> = options.classes.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["1:5", "2:5", "1:6"]);
        assert_eq!(options.classes[1].label, "Section 2 - Class 5");
    }
}
