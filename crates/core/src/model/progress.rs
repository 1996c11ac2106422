use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::model::content::ContentBundle;
use crate::model::ids::{ActivityId, LectureId};

//
// ─── ITEM ADDRESSING ───────────────────────────────────────────────────────────
//

/// Kinds of content rendered as accordion sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Lecture,
    Activity,
}

impl SectionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::Lecture => "lecture",
            SectionKind::Activity => "activity",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown section kind: {0}")]
pub struct ParseSectionKindError(String);

impl FromStr for SectionKind {
    type Err = ParseSectionKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lecture" => Ok(Self::Lecture),
            "activity" => Ok(Self::Activity),
            other => Err(ParseSectionKindError(other.to_string())),
        }
    }
}

/// One trackable milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemRef {
    Lecture(LectureId),
    Activity(ActivityId),
    Flashcard(usize),
    Question(usize),
}

impl ItemRef {
    /// Build a section reference from the raw id used by page-level callers.
    #[must_use]
    pub fn section(kind: SectionKind, id: u64) -> Self {
        match kind {
            SectionKind::Lecture => Self::Lecture(LectureId::new(id)),
            SectionKind::Activity => Self::Activity(ActivityId::new(id)),
        }
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemRef::Lecture(id) => write!(f, "lecture {id}"),
            ItemRef::Activity(id) => write!(f, "activity {id}"),
            ItemRef::Flashcard(index) => write!(f, "flashcard {index}"),
            ItemRef::Question(index) => write!(f, "question {index}"),
        }
    }
}

//
// ─── COMPLETION STATE ──────────────────────────────────────────────────────────
//

/// The four completion sets. Membership only ever grows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressState {
    completed_lectures: BTreeSet<LectureId>,
    completed_activities: BTreeSet<ActivityId>,
    visited_flashcards: BTreeSet<usize>,
    correct_questions: BTreeSet<usize>,
}

impl ProgressState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `item`; returns `true` if it was not already present.
    pub fn insert(&mut self, item: ItemRef) -> bool {
        match item {
            ItemRef::Lecture(id) => self.completed_lectures.insert(id),
            ItemRef::Activity(id) => self.completed_activities.insert(id),
            ItemRef::Flashcard(index) => self.visited_flashcards.insert(index),
            ItemRef::Question(index) => self.correct_questions.insert(index),
        }
    }

    #[must_use]
    pub fn contains(&self, item: ItemRef) -> bool {
        match item {
            ItemRef::Lecture(id) => self.completed_lectures.contains(&id),
            ItemRef::Activity(id) => self.completed_activities.contains(&id),
            ItemRef::Flashcard(index) => self.visited_flashcards.contains(&index),
            ItemRef::Question(index) => self.correct_questions.contains(&index),
        }
    }

    #[must_use]
    pub fn completed_lectures(&self) -> &BTreeSet<LectureId> {
        &self.completed_lectures
    }

    #[must_use]
    pub fn completed_activities(&self) -> &BTreeSet<ActivityId> {
        &self.completed_activities
    }

    #[must_use]
    pub fn visited_flashcards(&self) -> &BTreeSet<usize> {
        &self.visited_flashcards
    }

    #[must_use]
    pub fn correct_questions(&self) -> &BTreeSet<usize> {
        &self.correct_questions
    }

    /// Sum of all set sizes.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed_lectures.len()
            + self.completed_activities.len()
            + self.visited_flashcards.len()
            + self.correct_questions.len()
    }

    /// Drop identifiers that do not exist in `content`; returns how many were dropped.
    pub fn retain_known(&mut self, content: &ContentBundle) -> usize {
        let before = self.completed_count();
        self.completed_lectures
            .retain(|id| content.contains(ItemRef::Lecture(*id)));
        self.completed_activities
            .retain(|id| content.contains(ItemRef::Activity(*id)));
        self.visited_flashcards
            .retain(|index| content.contains(ItemRef::Flashcard(*index)));
        self.correct_questions
            .retain(|index| content.contains(ItemRef::Question(*index)));
        before - self.completed_count()
    }

    #[must_use]
    pub fn to_persisted(&self) -> PersistedProgress {
        PersistedProgress {
            read_lectures: self.completed_lectures.iter().copied().collect(),
            read_activities: self.completed_activities.iter().copied().collect(),
            done_flashcards: self.visited_flashcards.iter().copied().collect(),
            done_questions: self.correct_questions.iter().copied().collect(),
        }
    }
}

impl From<PersistedProgress> for ProgressState {
    fn from(persisted: PersistedProgress) -> Self {
        Self {
            completed_lectures: persisted.read_lectures.into_iter().collect(),
            completed_activities: persisted.read_activities.into_iter().collect(),
            visited_flashcards: persisted.done_flashcards.into_iter().collect(),
            correct_questions: persisted.done_questions.into_iter().collect(),
        }
    }
}

/// Stored shape of [`ProgressState`]; every field is optional on read.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersistedProgress {
    #[serde(rename = "readLectures", default, deserialize_with = "null_as_empty")]
    pub read_lectures: Vec<LectureId>,
    #[serde(rename = "readActivities", default, deserialize_with = "null_as_empty")]
    pub read_activities: Vec<ActivityId>,
    #[serde(rename = "doneFC", default, deserialize_with = "null_as_empty")]
    pub done_flashcards: Vec<usize>,
    #[serde(rename = "doneQ", default, deserialize_with = "null_as_empty")]
    pub done_questions: Vec<usize>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

//
// ─── DERIVED PROGRESS ──────────────────────────────────────────────────────────
//

/// Completion ratio over every content kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
    pub percent: u8,
}

impl Progress {
    /// Compute progress for `state` against `content`.
    ///
    /// Percent rounds half up and is 0 when there is nothing to complete.
    /// It only reaches 100 once every item is done.
    #[must_use]
    pub fn compute(content: &ContentBundle, state: &ProgressState) -> Self {
        let total = content.total_items();
        let current = state.completed_count().min(total);
        Self {
            current,
            total,
            percent: percent_of(current, total),
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.current == self.total
    }

    /// `"current / total"`, as shown on the progress badge.
    #[must_use]
    pub fn ratio_label(&self) -> String {
        format!("{} / {}", self.current, self.total)
    }
}

fn percent_of(current: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let current = current.min(total) as u128;
    let total = total as u128;
    let rounded = (200 * current + total) / (2 * total);
    let rounded = if current < total { rounded.min(99) } else { rounded };
    u8::try_from(rounded).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::content::{ContentBundle, Flashcard, Lecture, QuizQuestion, SummarySource};

    fn bundle(lectures: u64, flashcards: usize, questions: usize) -> ContentBundle {
        let lectures = (1..=lectures)
            .map(|id| Lecture::new(LectureId::new(id), format!("L{id}"), format!("{id}.html")))
            .collect();
        let cards = (0..flashcards)
            .map(|i| Flashcard::new(format!("f{i}"), format!("b{i}")))
            .collect();
        let quiz = (0..questions)
            .map(|i| QuizQuestion::new(i, format!("q{i}"), vec!["a".into(), "b".into()], 0, "").unwrap())
            .collect();
        ContentBundle::new(lectures, Vec::new(), cards, quiz, SummarySource::None).unwrap()
    }

    #[test]
    fn restored_blob_matches_expected_ratio() {
        let persisted: PersistedProgress =
            serde_json::from_str(r#"{"readLectures":[1,3],"doneFC":[0],"doneQ":[]}"#).unwrap();
        let state = ProgressState::from(persisted);
        let progress = Progress::compute(&bundle(5, 2, 2), &state);

        assert_eq!(progress.current, 3);
        assert_eq!(progress.total, 9);
        assert_eq!(progress.percent, 33);
        assert_eq!(progress.ratio_label(), "3 / 9");
    }

    #[test]
    fn null_fields_count_as_absent() {
        let persisted: PersistedProgress = serde_json::from_str(
            r#"{"readLectures":[1],"readActivities":null,"doneFC":null}"#,
        )
        .unwrap();
        assert_eq!(persisted.read_lectures, vec![LectureId::new(1)]);
        assert!(persisted.read_activities.is_empty());
        assert!(persisted.done_flashcards.is_empty());
        assert!(persisted.done_questions.is_empty());
    }

    #[test]
    fn empty_bundle_reports_zero_percent() {
        let progress = Progress::compute(&ContentBundle::default(), &ProgressState::new());
        assert_eq!(progress, Progress { current: 0, total: 0, percent: 0 });
        assert!(!progress.is_complete());
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(percent_of(1, 8), 13);
        assert_eq!(percent_of(1, 3), 33);
        assert_eq!(percent_of(2, 3), 67);
        assert_eq!(percent_of(1, 200), 1);
    }

    #[test]
    fn unfinished_course_stays_below_one_hundred() {
        assert_eq!(percent_of(199, 200), 99);
        assert_eq!(percent_of(999, 1000), 99);
        assert_eq!(percent_of(200, 200), 100);

        let content = bundle(0, 200, 0);
        let mut state = ProgressState::new();
        for index in 0..199 {
            state.insert(ItemRef::Flashcard(index));
        }
        let progress = Progress::compute(&content, &state);
        assert_eq!(progress.percent, 99);
        assert!(!progress.is_complete());
    }

    #[test]
    fn full_completion_is_one_hundred() {
        let content = bundle(1, 1, 1);
        let mut state = ProgressState::new();
        state.insert(ItemRef::Lecture(LectureId::new(1)));
        state.insert(ItemRef::Flashcard(0));
        assert_eq!(Progress::compute(&content, &state).percent, 67);
        state.insert(ItemRef::Question(0));
        let progress = Progress::compute(&content, &state);
        assert_eq!(progress.percent, 100);
        assert!(progress.is_complete());
    }

    #[test]
    fn insert_is_idempotent() {
        let mut state = ProgressState::new();
        assert!(state.insert(ItemRef::Lecture(LectureId::new(2))));
        assert!(!state.insert(ItemRef::Lecture(LectureId::new(2))));
        assert_eq!(state.completed_lectures().len(), 1);
    }

    #[test]
    fn persisted_form_is_sorted_and_uses_published_keys() {
        let mut state = ProgressState::new();
        state.insert(ItemRef::Flashcard(3));
        state.insert(ItemRef::Flashcard(1));
        state.insert(ItemRef::Activity(ActivityId::new(9)));
        let json = serde_json::to_string(&state.to_persisted()).unwrap();
        assert_eq!(
            json,
            r#"{"readLectures":[],"readActivities":[9],"doneFC":[1,3],"doneQ":[]}"#
        );
    }

    #[test]
    fn retain_known_drops_stale_ids() {
        let mut state = ProgressState::new();
        state.insert(ItemRef::Lecture(LectureId::new(1)));
        state.insert(ItemRef::Lecture(LectureId::new(99)));
        state.insert(ItemRef::Flashcard(5));
        let dropped = state.retain_known(&bundle(2, 2, 0));
        assert_eq!(dropped, 2);
        assert_eq!(state.completed_count(), 1);
    }

    #[test]
    fn section_kind_round_trips_through_str() {
        assert_eq!("activity".parse::<SectionKind>().unwrap(), SectionKind::Activity);
        assert!("summary".parse::<SectionKind>().is_err());
        assert_eq!(
            ItemRef::section(SectionKind::Lecture, 4),
            ItemRef::Lecture(LectureId::new(4))
        );
    }
}
