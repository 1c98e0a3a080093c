use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::domain::{CourseDraft, CourseId};

/// What the course form is being opened for. The dialog derives its title
/// from the variant instead of guessing from an optional id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormIntent {
    Create,
    Edit { course_id: CourseId },
}

impl FormIntent {
    pub fn title(&self) -> &'static str {
        match self {
            FormIntent::Create => "Add course",
            FormIntent::Edit { .. } => "Edit course",
        }
    }

    pub fn course_id(&self) -> Option<CourseId> {
        match self {
            FormIntent::Create => None,
            FormIntent::Edit { course_id } => Some(*course_id),
        }
    }
}

/// Modal dialog collaborator. Both calls suspend until the user closes the
/// dialog; the thread is never blocked waiting.
#[async_trait]
pub trait DialogSurface: Send + Sync {
    /// Present the course form for `intent`. `None` means the user cancelled.
    async fn course_form(&self, intent: FormIntent) -> Result<Option<CourseDraft>>;

    /// Present a blocking message; resolves once the user acknowledges it.
    async fn alert(&self, message: &str) -> Result<()>;
}

pub struct MissingDialogSurface;

#[async_trait]
impl DialogSurface for MissingDialogSurface {
    async fn course_form(&self, intent: FormIntent) -> Result<Option<CourseDraft>> {
        Err(anyhow!("dialog surface unavailable for {:?}", intent.title()))
    }

    async fn alert(&self, _message: &str) -> Result<()> {
        Err(anyhow!("dialog surface unavailable"))
    }
}
