use services::FlashcardView;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlashcardVm {
    pub front: String,
    pub back: String,
    pub counter: String,
    pub flipped: bool,
    pub card_class: &'static str,
}

#[must_use]
pub fn map_flashcard(view: &FlashcardView) -> FlashcardVm {
    FlashcardVm {
        front: view.front.clone(),
        back: view.back.clone(),
        counter: view.position.clone(),
        flipped: view.flipped,
        card_class: if view.flipped {
            "flashcard flipped"
        } else {
            "flashcard"
        },
    }
}
