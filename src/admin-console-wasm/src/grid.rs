use crate::html::escape_html;
use crate::state::VideoListState;
use crate::types::VideoRecord;
use serde::Serialize;

pub const CARD_CLASS: &str = "bg-white rounded-xl shadow-lg overflow-hidden border border-emerald-100";

pub const EMPTY_GRID_HTML: &str =
    r#"<div class="col-12 text-center text-muted py-10">No videos found.</div>"#;

/// DOM operation for the video grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GridOperation {
    Clear,
    ShowEmpty,
    AppendCard { video_id: String, html: String },
}

/// Result of rendering one page into the grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridUpdate {
    pub operations: Vec<GridOperation>,
    pub show_load_more: bool,
    pub displayed: usize,
    pub total: usize,
}

/// Advance the list state by one page and describe the DOM changes.
///
/// A cursor at zero means a fresh render, so the grid is cleared first.
pub fn render_next_page(state: &mut VideoListState) -> GridUpdate {
    let mut operations = Vec::new();

    if state.cursor() == 0 {
        operations.push(GridOperation::Clear);
    }

    if state.filtered_len() == 0 {
        operations.push(GridOperation::ShowEmpty);
        return GridUpdate {
            operations,
            show_load_more: false,
            displayed: 0,
            total: 0,
        };
    }

    operations.extend(state.next_page().into_iter().map(|video| GridOperation::AppendCard {
        video_id: video.id.clone(),
        html: render_card(video),
    }));

    GridUpdate {
        operations,
        show_load_more: state.has_more(),
        displayed: state.cursor(),
        total: state.filtered_len(),
    }
}

/// Card markup for one video; every interpolated value is escaped
pub fn render_card(video: &VideoRecord) -> String {
    let id = escape_html(&video.id);
    format!(
        r#"<div class="relative">
  <video class="w-full h-40 object-cover bg-black" preload="metadata" controls>
    <source src="{url}" type="video/mp4">
  </video>
  <div class="absolute inset-0 flex items-center justify-center bg-black bg-opacity-30 cursor-pointer" data-video-id="{id}">
    <i class="fas fa-play-circle text-white text-5xl opacity-80 hover:opacity-100"></i>
  </div>
</div>
<div class="p-4">
  <p class="text-sm text-gray-600"><strong>Class:</strong> {class}</p>
  <p class="text-sm text-gray-600"><strong>Session:</strong> {session}</p>
  <p class="text-sm text-gray-600"><strong>Term:</strong> {term} | <strong>Week:</strong> {week}</p>
  <p class="text-sm text-gray-600"><strong>Day:</strong> {day}</p>
  <p class="text-emerald-700 font-bold text-sm mt-2">Ayat: {from} - {to}</p>
  <div class="mt-3 flex gap-2">
    <button class="btn btn-sm btn-primary flex-1 play-btn" data-id="{id}"><i class="fas fa-play me-1"></i>Play</button>
    <button class="btn btn-sm btn-danger delete-btn" data-id="{id}"><i class="fas fa-trash"></i></button>
  </div>
</div>"#,
        url = escape_html(&video.video_url),
        id = id,
        class = escape_html(video.display_class_name()),
        session = escape_html(&video.session),
        term = escape_html(&video.term),
        week = escape_html(&video.week),
        day = escape_html(&video.day),
        from = escape_html(&video.from_ayah),
        to = escape_html(&video.to_ayah),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FilterCriteria;

    fn create_test_video(id: &str) -> VideoRecord {
        VideoRecord {
            id: id.to_string(),
            session: "2024".to_string(),
            term: "1".to_string(),
            week: "2".to_string(),
            day: "Monday".to_string(),
            section_id: "1".to_string(),
            class_id: "5".to_string(),
            class_name: "Hifz <A>".to_string(),
            from_ayah: "1".to_string(),
            to_ayah: "7".to_string(),
            video_url: format!("/uploads/{}.mp4", id),
        }
    }

    fn count_cards(update: &GridUpdate) -> usize {
        update
            .operations
            .iter()
            .filter(|op| matches!(op, GridOperation::AppendCard { .. }))
            .count()
    }

    #[test]
    fn test_first_page_clears_grid() {
        let videos = (1..=6).map(|i| create_test_video(&i.to_string())).collect();
        let mut state = VideoListState::new(4).with_collection(videos);

        let update = render_next_page(&mut state);
        assert_eq!(update.operations[0], GridOperation::Clear);
        assert_eq!(count_cards(&update), 4);
        assert!(update.show_load_more);

        let update = render_next_page(&mut state);
        assert!(!update.operations.contains(&GridOperation::Clear));
        assert_eq!(count_cards(&update), 2);
        assert!(!update.show_load_more);
        assert_eq!(update.displayed, 6);
    }

    #[test]
    fn test_empty_filter_shows_message() {
        let state = VideoListState::new(4).with_collection(vec![create_test_video("1")]);
        let mut state = state.with_criteria(FilterCriteria {
            term: Some("9".to_string()),
            ..Default::default()
        });

        let update = render_next_page(&mut state);
        assert_eq!(
            update.operations,
            vec![GridOperation::Clear, GridOperation::ShowEmpty]
        );
        assert!(!update.show_load_more);
    }

    #[test]
    fn test_card_escapes_values() {
        let html = render_card(&create_test_video("7"));
        assert!(html.contains("Hifz &lt;A&gt;"));
        assert!(html.contains(r#"data-id="7""#));
        assert!(html.contains(r#"src="/uploads/7.mp4""#));
    }

    #[test]
    fn test_card_falls_back_to_na_class() {
        let mut video = create_test_video("8");
        video.class_name.clear();
        assert!(render_card(&video).contains("<strong>Class:</strong> N/A"));
    }
}
