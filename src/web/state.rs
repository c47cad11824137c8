use crate::model::ModelManager;
use crate::utils::Mailer;

#[derive(Debug, Clone)]
pub struct AppState {
    mm: ModelManager,
    mailer: Mailer,
}

impl AppState {
    pub fn new(mm: ModelManager, mailer: Mailer) -> Self {
        Self { mm, mailer }
    }

    pub fn pool(&self) -> &ModelManager {
        &self.mm
    }

    pub fn mailer(&self) -> &Mailer {
        &self.mailer
    }
}
