use services::{Feedback, OptionMark, QuestionView};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizOptionVm {
    pub index: usize,
    pub text: String,
    pub class: &'static str,
    pub disabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizVm {
    pub prompt: String,
    pub counter: String,
    pub options: Vec<QuizOptionVm>,
    /// `None` hides the feedback box.
    pub feedback: Option<String>,
    pub feedback_class: &'static str,
    pub next_visible: bool,
}

pub const INCORRECT_FEEDBACK: &str = "\u{274c} Incorrect.";

#[must_use]
pub fn map_question(view: &QuestionView) -> QuizVm {
    let options = view
        .options
        .iter()
        .enumerate()
        .map(|(index, option)| QuizOptionVm {
            index,
            text: option.text.clone(),
            class: match option.mark {
                OptionMark::None => "quiz-option",
                OptionMark::Correct => "quiz-option correct",
                OptionMark::Incorrect => "quiz-option incorrect",
            },
            disabled: !option.enabled,
        })
        .collect();

    let (feedback, feedback_class) = match &view.feedback {
        Feedback::Hidden => (None, "explanation-box"),
        Feedback::Explanation(text) => (Some(text.clone()), "explanation-box"),
        Feedback::Incorrect => (
            Some(INCORRECT_FEEDBACK.to_string()),
            "explanation-box incorrect",
        ),
    };

    QuizVm {
        prompt: view.prompt.clone(),
        counter: view.position.clone(),
        options,
        feedback,
        feedback_class,
        next_visible: view.next_enabled,
    }
}
