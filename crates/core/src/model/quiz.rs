use crate::model::content::QuizQuestion;

/// Answer state of the question currently on screen.
///
/// `AnsweredCorrect` is terminal; an incorrect answer leaves the question open
/// for another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuestionState {
    #[default]
    Unanswered,
    AnsweredIncorrect { selected: usize },
    AnsweredCorrect { selected: usize },
}

/// What a single option selection did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// The selection had no effect (question already solved, or no such option).
    Ignored,
    Correct,
    Incorrect,
}

impl QuestionState {
    /// Initial state when a question is rendered.
    ///
    /// Questions already answered correctly come back solved, showing the
    /// correct option, without replaying the transition.
    #[must_use]
    pub fn initial(question: &QuizQuestion, already_correct: bool) -> Self {
        if already_correct {
            Self::AnsweredCorrect {
                selected: question.correct_option_index(),
            }
        } else {
            Self::Unanswered
        }
    }

    #[must_use]
    pub fn is_correct(self) -> bool {
        matches!(self, Self::AnsweredCorrect { .. })
    }

    /// Apply the selection of `option` and return the next state.
    #[must_use]
    pub fn select(self, question: &QuizQuestion, option: usize) -> (Self, AnswerOutcome) {
        if self.is_correct() || option >= question.options().len() {
            return (self, AnswerOutcome::Ignored);
        }
        if option == question.correct_option_index() {
            (Self::AnsweredCorrect { selected: option }, AnswerOutcome::Correct)
        } else {
            (
                Self::AnsweredIncorrect { selected: option },
                AnswerOutcome::Incorrect,
            )
        }
    }
}
