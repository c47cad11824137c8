use serde::{Deserialize, Serialize};

/// Activation flag shared by users, students, modules, lessons and
/// questions. Rows are never hard-deleted by the normal flows; this flips.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema,
)]
#[sqlx(type_name = "estado_registro", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    Activo,
    Inactivo,
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Activo => write!(f, "ACTIVO"),
            Self::Inactivo => write!(f, "INACTIVO"),
        }
    }
}
