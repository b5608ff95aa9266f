use std::rc::Rc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::registry::HandlerRegistry;
use crate::types::{ControlEvent, ControlId, PlayerState, VideoRecord};

/// Media element plus the labels around it
pub trait MediaSurface {
    /// Point the element at a new source and reset it to the start
    fn set_source(&mut self, url: &str);
    fn play(&mut self);
    fn pause(&mut self);
    fn seek_to(&mut self, seconds: f64);
    fn current_time(&self) -> f64;
    /// Seconds; NaN or zero while metadata is still loading
    fn duration(&self) -> f64;

    fn show_info(&mut self, record: &VideoRecord);
    fn set_playing(&mut self, playing: bool);
    /// `seek_percent` is `None` when the seek bar must not move
    fn set_clock(&mut self, current: &str, duration: Option<&str>, seek_percent: Option<f64>);
}

/// Attaches one control's handler for one record
pub trait ControlBinder {
    /// Detaches the handler when dropped
    type Binding;

    fn bind(&mut self, control: ControlId, record_id: &str) -> Option<Self::Binding>;
}

/// Work the player hands back to its owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerRequest {
    Delete(String),
    Dismissed,
}

/// Serializable view of the player for the page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub state: PlayerState,
    pub active_id: Option<String>,
    pub bound_controls: usize,
}

/// Single-record video player driven by bound controls
pub struct PlayerController<M: MediaSurface, B: ControlBinder> {
    media: M,
    binder: B,
    bindings: HandlerRegistry<ControlId, B::Binding>,
    collection: Rc<[VideoRecord]>,
    active: Option<usize>,
    state: PlayerState,
}

impl<M: MediaSurface, B: ControlBinder> PlayerController<M, B> {
    pub fn new(media: M, binder: B) -> Self {
        Self {
            media,
            binder,
            bindings: HandlerRegistry::new(),
            collection: Rc::from(Vec::new()),
            active: None,
            state: PlayerState::Idle,
        }
    }

    /// Swap in a reloaded collection, re-resolving the active record by id
    pub fn set_collection(&mut self, collection: Rc<[VideoRecord]>) {
        let active_id = self.active_id().map(str::to_string);
        self.collection = collection;

        if let Some(id) = active_id {
            match self.collection.iter().position(|v| v.id == id) {
                Some(idx) => self.active = Some(idx),
                None => {
                    info!("Active video {} is gone after reload, closing player", id);
                    self.teardown();
                }
            }
        }
    }

    /// Bind the player to the record with `id`; false if no such record
    pub fn load(&mut self, id: &str) -> bool {
        let Some(idx) = self.collection.iter().position(|v| v.id == id) else {
            warn!("Video {} not found in the current collection", id);
            return false;
        };

        // Previous record's handlers go first
        self.bindings.clear();

        let record = &self.collection[idx];
        self.media.pause();
        self.media.set_source(&record.video_url);
        self.media.show_info(record);
        self.media.set_playing(false);
        self.media.set_clock("00:00", Some("00:00"), Some(0.0));

        for control in ControlId::ALL {
            if let Some(binding) = self.binder.bind(control, &record.id) {
                self.bindings.rebind(control, binding);
            }
        }

        debug!("Loaded video {} with {} bound controls", record.id, self.bindings.len());
        self.active = Some(idx);
        self.state = PlayerState::Loaded;
        true
    }

    pub fn play(&mut self) {
        if matches!(self.state, PlayerState::Loaded | PlayerState::Paused) {
            self.media.play();
            self.media.set_playing(true);
            self.state = PlayerState::Playing;
        }
    }

    pub fn pause(&mut self) {
        if self.state == PlayerState::Playing {
            self.media.pause();
            self.media.set_playing(false);
            self.state = PlayerState::Paused;
        }
    }

    pub fn toggle(&mut self) {
        if self.state == PlayerState::Playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Pause and rewind; nothing to stop while idle
    pub fn stop(&mut self) {
        if self.state == PlayerState::Idle {
            return;
        }
        self.media.pause();
        self.media.seek_to(0.0);
        self.media.set_playing(false);
        self.state = PlayerState::Paused;
    }

    /// Seek to `percent` of the duration, clamped to 0..=100
    pub fn seek(&mut self, percent: f64) {
        if self.state == PlayerState::Idle {
            return;
        }
        self.media.seek_to(position_for(percent, self.media.duration()));
    }

    pub fn prev(&mut self) -> bool {
        match self.active {
            Some(idx) if idx > 0 => {
                let id = self.collection[idx - 1].id.clone();
                self.load(&id)
            }
            _ => false,
        }
    }

    pub fn next(&mut self) -> bool {
        match self.active {
            Some(idx) if idx + 1 < self.collection.len() => {
                let id = self.collection[idx + 1].id.clone();
                self.load(&id)
            }
            _ => false,
        }
    }

    /// Playback finished: advance and keep playing, or rewind at the end
    pub fn on_ended(&mut self) {
        if self.state == PlayerState::Idle {
            return;
        }
        self.state = PlayerState::Ended;

        if self.next() {
            self.play();
        } else {
            self.media.seek_to(0.0);
            self.media.pause();
            self.media.set_playing(false);
            self.state = PlayerState::Paused;
        }
    }

    /// The media refused to start; show it as paused so the next click plays
    pub fn on_play_rejected(&mut self) {
        if self.state == PlayerState::Playing {
            self.media.set_playing(false);
            self.state = PlayerState::Paused;
        }
    }

    /// Dispatch an event from a bound control
    pub fn handle(&mut self, event: ControlEvent) -> Option<PlayerRequest> {
        if self.active_id() != Some(event.record_id.as_str()) {
            debug!("Ignoring {:?} for stale video {}", event.control, event.record_id);
            return None;
        }

        match event.control {
            ControlId::PlayPause => self.toggle(),
            ControlId::Stop => self.stop(),
            ControlId::SeekInput => {
                let seconds = position_for(event.value.unwrap_or(0.0), self.media.duration());
                self.media.set_clock(&format_clock(seconds), None, None);
            }
            ControlId::SeekChange => self.seek(event.value.unwrap_or(0.0)),
            ControlId::Prev => {
                self.prev();
            }
            ControlId::Next => {
                self.next();
            }
            ControlId::TimeUpdate => self.refresh_clock(),
            ControlId::LoadedMetadata => {
                let duration = format_clock(self.media.duration());
                let current = format_clock(self.media.current_time());
                self.media.set_clock(&current, Some(&duration), None);
            }
            ControlId::Ended => self.on_ended(),
            ControlId::PlayRejected => self.on_play_rejected(),
            ControlId::Delete => return Some(PlayerRequest::Delete(event.record_id)),
            ControlId::Dismiss => {
                self.teardown();
                return Some(PlayerRequest::Dismissed);
            }
        }
        None
    }

    fn refresh_clock(&mut self) {
        let current = self.media.current_time();
        let duration = self.media.duration();
        let percent = if duration.is_finite() && duration > 0.0 {
            current / duration * 100.0
        } else {
            0.0
        };
        self.media.set_clock(
            &format_clock(current),
            Some(&format_clock(duration)),
            Some(percent),
        );
    }

    /// Pause and unbind everything; no handler fires afterwards
    pub fn teardown(&mut self) {
        if self.state != PlayerState::Idle {
            self.media.pause();
        }
        self.bindings.clear();
        self.active = None;
        self.state = PlayerState::Idle;
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.map(|idx| self.collection[idx].id.as_str())
    }

    pub fn bound_controls(&self) -> usize {
        self.bindings.len()
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            state: self.state,
            active_id: self.active_id().map(str::to_string),
            bound_controls: self.bindings.len(),
        }
    }

    pub fn media(&self) -> &M {
        &self.media
    }
}

fn position_for(percent: f64, duration: f64) -> f64 {
    let percent = if percent.is_nan() { 0.0 } else { percent.clamp(0.0, 100.0) };
    let duration = if duration.is_finite() && duration > 0.0 { duration } else { 0.0 };
    percent / 100.0 * duration
}

/// `mm:ss`; non-finite or non-positive values show as `00:00`
pub fn format_clock(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "00:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}
