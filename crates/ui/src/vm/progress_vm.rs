use course_core::model::Progress;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressVm {
    /// `"current / total milestones completed"`.
    pub label: String,
    /// `"current / total"`.
    pub badge: String,
    pub percent: u8,
    /// Inline style for the bar fill.
    pub bar_style: String,
    pub complete: bool,
}

#[must_use]
pub fn map_progress(progress: Progress) -> ProgressVm {
    let ratio = progress.ratio_label();
    ProgressVm {
        label: format!("{ratio} milestones completed"),
        badge: ratio,
        percent: progress.percent,
        bar_style: format!("width: {}%", progress.percent),
        complete: progress.is_complete(),
    }
}
