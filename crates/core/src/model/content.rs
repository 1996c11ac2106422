use std::collections::BTreeSet;

use serde::Deserialize;
use thiserror::Error;

use crate::model::ids::{ActivityId, LectureId};
use crate::model::progress::{ItemRef, SectionKind};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Schema violations found while turning a raw content document into a bundle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ContentValidationError {
    #[error("duplicate lecture id {0}")]
    DuplicateLectureId(LectureId),

    #[error("duplicate activity id {0}")]
    DuplicateActivityId(ActivityId),

    #[error("quiz question {question} has no options")]
    NoOptions { question: usize },

    #[error("quiz question {question} marks option {correct} correct but has {options} options")]
    CorrectOptionOutOfRange {
        question: usize,
        correct: usize,
        options: usize,
    },
}

//
// ─── SECTION IDS ───────────────────────────────────────────────────────────────
//

/// Identifier of an item rendered as a collapsible section.
pub trait SectionItemId:
    Copy + Ord + std::fmt::Debug + std::fmt::Display + Send + Sync + 'static
{
    const KIND: SectionKind;

    fn item_ref(self) -> ItemRef;

    /// The numeric id as written in the content document.
    fn raw(self) -> u64;
}

impl SectionItemId for LectureId {
    const KIND: SectionKind = SectionKind::Lecture;

    fn item_ref(self) -> ItemRef {
        ItemRef::Lecture(self)
    }

    fn raw(self) -> u64 {
        self.value()
    }
}

impl SectionItemId for ActivityId {
    const KIND: SectionKind = SectionKind::Activity;

    fn item_ref(self) -> ItemRef {
        ItemRef::Activity(self)
    }

    fn raw(self) -> u64 {
        self.value()
    }
}

//
// ─── CONTENT TYPES ─────────────────────────────────────────────────────────────
//

/// A lecture or activity: a titled pointer to an externally hosted fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem<I> {
    id: I,
    title: String,
    content_ref: String,
}

pub type Lecture = ContentItem<LectureId>;
pub type Activity = ContentItem<ActivityId>;

impl<I: Copy> ContentItem<I> {
    #[must_use]
    pub fn new(id: I, title: impl Into<String>, content_ref: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content_ref: content_ref.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> I {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Locator of the markup fragment, relative to the content base.
    #[must_use]
    pub fn content_ref(&self) -> &str {
        &self.content_ref
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flashcard {
    front: String,
    back: String,
}

impl Flashcard {
    #[must_use]
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
        }
    }

    #[must_use]
    pub fn front(&self) -> &str {
        &self.front
    }

    #[must_use]
    pub fn back(&self) -> &str {
        &self.back
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    prompt: String,
    options: Vec<String>,
    correct_option_index: usize,
    explanation: String,
}

impl QuizQuestion {
    /// Creates a question, checking that the correct option exists.
    ///
    /// # Errors
    ///
    /// Returns `ContentValidationError` if `options` is empty or
    /// `correct_option_index` is out of range. `question` is only used for the
    /// error message.
    pub fn new(
        question: usize,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_option_index: usize,
        explanation: impl Into<String>,
    ) -> Result<Self, ContentValidationError> {
        if options.is_empty() {
            return Err(ContentValidationError::NoOptions { question });
        }
        if correct_option_index >= options.len() {
            return Err(ContentValidationError::CorrectOptionOutOfRange {
                question,
                correct: correct_option_index,
                options: options.len(),
            });
        }
        Ok(Self {
            prompt: prompt.into(),
            options,
            correct_option_index,
            explanation: explanation.into(),
        })
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_option_index(&self) -> usize {
        self.correct_option_index
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }
}

/// Where the closing summary comes from, if anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SummarySource {
    #[default]
    None,
    /// Fragment locator fetched like a lecture body.
    File(String),
    /// Paragraphs shipped inside the content document.
    Inline(Vec<String>),
}

//
// ─── BUNDLE ────────────────────────────────────────────────────────────────────
//

/// Validated, immutable content definition for one session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentBundle {
    lectures: Vec<Lecture>,
    activities: Vec<Activity>,
    flashcards: Vec<Flashcard>,
    quiz: Vec<QuizQuestion>,
    summary: SummarySource,
}

impl ContentBundle {
    /// Assemble a bundle from already-built parts.
    ///
    /// # Errors
    ///
    /// Returns `ContentValidationError` if lecture or activity ids repeat.
    pub fn new(
        lectures: Vec<Lecture>,
        activities: Vec<Activity>,
        flashcards: Vec<Flashcard>,
        quiz: Vec<QuizQuestion>,
        summary: SummarySource,
    ) -> Result<Self, ContentValidationError> {
        let mut seen = BTreeSet::new();
        for lecture in &lectures {
            if !seen.insert(lecture.id()) {
                return Err(ContentValidationError::DuplicateLectureId(lecture.id()));
            }
        }
        let mut seen = BTreeSet::new();
        for activity in &activities {
            if !seen.insert(activity.id()) {
                return Err(ContentValidationError::DuplicateActivityId(activity.id()));
            }
        }

        Ok(Self {
            lectures,
            activities,
            flashcards,
            quiz,
            summary,
        })
    }

    #[must_use]
    pub fn lectures(&self) -> &[Lecture] {
        &self.lectures
    }

    #[must_use]
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    #[must_use]
    pub fn flashcards(&self) -> &[Flashcard] {
        &self.flashcards
    }

    #[must_use]
    pub fn quiz(&self) -> &[QuizQuestion] {
        &self.quiz
    }

    #[must_use]
    pub fn summary(&self) -> &SummarySource {
        &self.summary
    }

    /// Number of trackable milestones across every content kind.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.lectures.len() + self.activities.len() + self.flashcards.len() + self.quiz.len()
    }

    /// Whether `item` names something that exists in this bundle.
    #[must_use]
    pub fn contains(&self, item: ItemRef) -> bool {
        match item {
            ItemRef::Lecture(id) => self.lectures.iter().any(|l| l.id() == id),
            ItemRef::Activity(id) => self.activities.iter().any(|a| a.id() == id),
            ItemRef::Flashcard(index) => index < self.flashcards.len(),
            ItemRef::Question(index) => index < self.quiz.len(),
        }
    }
}

//
// ─── WIRE FORMAT ───────────────────────────────────────────────────────────────
//

/// Raw content document as served by the content source.
///
/// Field names follow the published document (`file`, `f`/`b`, `q`/`o`/`c`/`e`);
/// the long names are accepted as aliases. Call [`ContentDocument::validate`]
/// before handing anything to the rest of the system.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDocument {
    pub lectures: Vec<ItemDraft>,
    #[serde(default)]
    pub activities: Vec<ItemDraft>,
    pub flashcards: Vec<FlashcardDraft>,
    pub quiz: Vec<QuestionDraft>,
    #[serde(default)]
    pub summary_file: Option<String>,
    #[serde(default)]
    pub summary: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemDraft {
    pub id: u64,
    pub title: String,
    #[serde(alias = "contentRef")]
    pub file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlashcardDraft {
    #[serde(rename = "f", alias = "front")]
    pub front: String,
    #[serde(rename = "b", alias = "back")]
    pub back: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionDraft {
    #[serde(rename = "q", alias = "prompt")]
    pub prompt: String,
    #[serde(rename = "o", alias = "options")]
    pub options: Vec<String>,
    #[serde(rename = "c", alias = "correctOptionIndex")]
    pub correct: usize,
    #[serde(rename = "e", alias = "explanation", default)]
    pub explanation: String,
}

impl ContentDocument {
    /// Check the document's shape and build the bundle.
    ///
    /// When both `summaryFile` and an inline `summary` are present the file wins.
    ///
    /// # Errors
    ///
    /// Returns `ContentValidationError` on duplicate ids or malformed quiz questions.
    pub fn validate(self) -> Result<ContentBundle, ContentValidationError> {
        let lectures = self
            .lectures
            .into_iter()
            .map(|item| Lecture::new(LectureId::new(item.id), item.title, item.file))
            .collect();
        let activities = self
            .activities
            .into_iter()
            .map(|item| Activity::new(ActivityId::new(item.id), item.title, item.file))
            .collect();
        let flashcards = self
            .flashcards
            .into_iter()
            .map(|card| Flashcard::new(card.front, card.back))
            .collect();
        let quiz = self
            .quiz
            .into_iter()
            .enumerate()
            .map(|(index, q)| QuizQuestion::new(index, q.prompt, q.options, q.correct, q.explanation))
            .collect::<Result<Vec<_>, _>>()?;

        let summary = match (self.summary_file, self.summary) {
            (Some(file), _) if !file.trim().is_empty() => SummarySource::File(file),
            (_, Some(lines)) if !lines.is_empty() => SummarySource::Inline(lines),
            _ => SummarySource::None,
        };

        ContentBundle::new(lectures, activities, flashcards, quiz, summary)
    }
}
