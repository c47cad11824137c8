use serde::{Deserialize, Serialize};

use crate::model::{DatabaseResult, entity::{ModuleWithLessonsRow, RecordStatus}};

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct LessonShort {
    pub leccion_id: i64,
    pub titulo_leccion: String,
    pub orden: i32,
    pub estado: RecordStatus,
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct ModuleWithLessons {
    pub modulo_id: i64,
    pub nombre: String,
    pub descripcion: String,
    pub estado: RecordStatus,
    pub lecciones: Vec<LessonShort>,
}

impl TryFrom<ModuleWithLessonsRow> for ModuleWithLessons {
    type Error = serde_json::Error;

    fn try_from(value: ModuleWithLessonsRow) -> Result<Self, Self::Error> {
        Ok(Self {
            modulo_id: value.modulo_id,
            nombre: value.nombre,
            descripcion: value.descripcion,
            estado: value.estado,
            lecciones: serde_json::from_value(value.lecciones)?,
        })
    }
}

impl ModuleWithLessons {
    pub fn from_rows(rows: Vec<ModuleWithLessonsRow>) -> DatabaseResult<Vec<Self>> {
        Ok(rows
            .into_iter()
            .map(ModuleWithLessons::try_from)
            .collect::<Result<_, _>>()?)
    }
}
