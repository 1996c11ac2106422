use course_core::model::ItemRef;
use course_core::navigation::wrap_index;

use crate::progress_tracker::ProgressTracker;

/// Display data for the card on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashcardView {
    pub index: usize,
    pub front: String,
    pub back: String,
    /// `"position / count"`, 1-based.
    pub position: String,
    pub flipped: bool,
}

/// Cyclic navigation over the flashcard deck.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlashcardController {
    current: usize,
    flipped: bool,
}

impl FlashcardController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    /// Show card `index`, marking it visited. Returns `None` for an empty deck
    /// or an index past the end.
    pub async fn show(&mut self, index: usize, tracker: &mut ProgressTracker) -> Option<FlashcardView> {
        if index >= tracker.content().flashcards().len() {
            return None;
        }
        self.current = index;
        self.flipped = false;
        tracker.mark(ItemRef::Flashcard(index)).await;
        self.view(tracker)
    }

    /// Move by `direction` with wrap-around at both ends, then show.
    pub async fn advance(
        &mut self,
        direction: i64,
        tracker: &mut ProgressTracker,
    ) -> Option<FlashcardView> {
        let len = tracker.content().flashcards().len();
        let next = wrap_index(self.current, direction, len)?;
        self.show(next, tracker).await
    }

    /// Turn the current card over.
    pub fn flip(&mut self, tracker: &ProgressTracker) -> Option<FlashcardView> {
        if tracker.content().flashcards().is_empty() {
            return None;
        }
        self.flipped = !self.flipped;
        self.view(tracker)
    }

    #[must_use]
    pub fn view(&self, tracker: &ProgressTracker) -> Option<FlashcardView> {
        let cards = tracker.content().flashcards();
        let card = cards.get(self.current)?;
        Some(FlashcardView {
            index: self.current,
            front: card.front().to_string(),
            back: card.back().to_string(),
            position: format!("{} / {}", self.current + 1, cards.len()),
            flipped: self.flipped,
        })
    }
}
