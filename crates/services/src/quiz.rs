use course_core::model::{AnswerOutcome, ItemRef, QuestionState};
use course_core::navigation::wrap_index;

use crate::progress_tracker::ProgressTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    None,
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub text: String,
    pub enabled: bool,
    pub mark: OptionMark,
}

/// Feedback area under the options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Hidden,
    Explanation(String),
    Incorrect,
}

/// Display data for the question on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub index: usize,
    pub prompt: String,
    /// `"position / count"`, 1-based.
    pub position: String,
    pub options: Vec<OptionView>,
    pub feedback: Feedback,
    pub next_enabled: bool,
}

/// Walks the quiz one question at a time and runs each question's answer state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizController {
    current: usize,
    state: QuestionState,
}

impl QuizController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn state(&self) -> QuestionState {
        self.state
    }

    /// Render question `index` from scratch.
    ///
    /// Transient state is cleared; a question already answered correctly comes
    /// back in its solved form.
    pub fn render(&mut self, index: usize, tracker: &ProgressTracker) -> Option<QuestionView> {
        let question = tracker.content().quiz().get(index)?;
        self.current = index;
        self.state = QuestionState::initial(question, tracker.is_done(ItemRef::Question(index)));
        self.view(tracker)
    }

    /// Handle selection of `option` on the current question.
    pub async fn select(&mut self, option: usize, tracker: &mut ProgressTracker) -> AnswerOutcome {
        let Some(question) = tracker.content().quiz().get(self.current) else {
            return AnswerOutcome::Ignored;
        };
        if tracker.is_done(ItemRef::Question(self.current)) && !self.state.is_correct() {
            self.state = QuestionState::initial(question, true);
        }

        let (next, outcome) = self.state.select(question, option);
        self.state = next;
        match outcome {
            AnswerOutcome::Correct => {
                tracker.mark(ItemRef::Question(self.current)).await;
            }
            AnswerOutcome::Incorrect => {
                tracing::debug!(question = self.current, option, "incorrect answer");
            }
            AnswerOutcome::Ignored => {
                tracing::debug!(question = self.current, option, "selection ignored");
            }
        }
        outcome
    }

    /// Move to the next question, wrapping to the first after the last.
    pub fn advance(&mut self, tracker: &ProgressTracker) -> Option<QuestionView> {
        let next = wrap_index(self.current, 1, tracker.content().quiz().len())?;
        self.render(next, tracker)
    }

    #[must_use]
    pub fn view(&self, tracker: &ProgressTracker) -> Option<QuestionView> {
        let quiz = tracker.content().quiz();
        let question = quiz.get(self.current)?;

        let (selected, mark, enabled) = match self.state {
            QuestionState::Unanswered => (None, OptionMark::None, true),
            QuestionState::AnsweredIncorrect { selected } => {
                (Some(selected), OptionMark::Incorrect, true)
            }
            QuestionState::AnsweredCorrect { selected } => {
                (Some(selected), OptionMark::Correct, false)
            }
        };

        let options = question
            .options()
            .iter()
            .enumerate()
            .map(|(index, text)| OptionView {
                text: text.clone(),
                enabled,
                mark: if selected == Some(index) {
                    mark
                } else {
                    OptionMark::None
                },
            })
            .collect();

        let feedback = match self.state {
            QuestionState::Unanswered => Feedback::Hidden,
            QuestionState::AnsweredIncorrect { .. } => Feedback::Incorrect,
            QuestionState::AnsweredCorrect { .. } => {
                Feedback::Explanation(question.explanation().to_string())
            }
        };

        Some(QuestionView {
            index: self.current,
            prompt: question.prompt().to_string(),
            position: format!("{} / {}", self.current + 1, quiz.len()),
            options,
            feedback,
            next_enabled: self.state.is_correct(),
        })
    }
}
