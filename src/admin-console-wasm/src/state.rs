use std::num::NonZeroUsize;
use std::rc::Rc;

use crate::filter::FilterEngine;
use crate::types::{FilterCriteria, VideoRecord};

/// Grid page size when the config does not override it
pub const DEFAULT_PAGE_SIZE: usize = 4;

/// "Load more" cursor over a filtered collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    cursor: usize,
    page_size: NonZeroUsize,
}

impl Paginator {
    /// Page sizes below one are treated as one
    pub fn new(page_size: usize) -> Self {
        Self {
            cursor: 0,
            page_size: NonZeroUsize::new(page_size).unwrap_or(NonZeroUsize::MIN),
        }
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Next window of `filtered`; empty (and cursor untouched) once exhausted
    pub fn next_page<'a, T>(&mut self, filtered: &'a [T]) -> &'a [T] {
        if self.cursor >= filtered.len() {
            return &[];
        }
        let start = self.cursor;
        let end = (start + self.page_size.get()).min(filtered.len());
        self.cursor = end;
        &filtered[start..end]
    }

    pub fn has_more<T>(&self, filtered: &[T]) -> bool {
        self.cursor < filtered.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn page_size(&self) -> usize {
        self.page_size.get()
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// Loaded videos plus everything derived from them
///
/// Derived parts (`filtered`, the cursor) are rebuilt from scratch whenever
/// the collection or the criteria change.
#[derive(Debug, Clone)]
pub struct VideoListState {
    all: Rc<[VideoRecord]>,
    criteria: FilterCriteria,
    filtered: Vec<usize>,
    paginator: Paginator,
}

impl VideoListState {
    pub fn new(page_size: usize) -> Self {
        Self {
            all: Rc::from(Vec::new()),
            criteria: FilterCriteria::default(),
            filtered: Vec::new(),
            paginator: Paginator::new(page_size),
        }
    }

    /// Replace the collection wholesale; criteria are cleared with it
    pub fn with_collection(&self, all: Vec<VideoRecord>) -> Self {
        let all: Rc<[VideoRecord]> = Rc::from(all);
        let filtered = (0..all.len()).collect();
        let mut paginator = self.paginator;
        paginator.reset();

        Self {
            all,
            criteria: FilterCriteria::default(),
            filtered,
            paginator,
        }
    }

    /// Same collection, new criteria, cursor back at zero
    pub fn with_criteria(&self, criteria: FilterCriteria) -> Self {
        let filtered = FilterEngine::new(&criteria).apply_filters(&self.all);
        let mut paginator = self.paginator;
        paginator.reset();

        Self {
            all: Rc::clone(&self.all),
            criteria,
            filtered,
            paginator,
        }
    }

    /// Advance the cursor and return the records of the new page
    pub fn next_page(&mut self) -> Vec<&VideoRecord> {
        let all = &self.all;
        self.paginator
            .next_page(&self.filtered)
            .iter()
            .map(|&idx| &all[idx])
            .collect()
    }

    pub fn has_more(&self) -> bool {
        self.paginator.has_more(&self.filtered)
    }

    pub fn cursor(&self) -> usize {
        self.paginator.cursor()
    }

    pub fn all(&self) -> &Rc<[VideoRecord]> {
        &self.all
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn filtered_videos(&self) -> Vec<&VideoRecord> {
        self.filtered.iter().map(|&idx| &self.all[idx]).collect()
    }
}

impl Default for VideoListState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}
