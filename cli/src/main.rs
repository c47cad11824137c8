use clap::{Parser, Subcommand};
use aula::model::entity::{
    Lesson, LessonCreate, Module, ModuleCreate, Question, QuestionCreate, UserEntity,
    UserEntityCreate,
};
use aula::model::{CrudRepository, DatabaseError, DbConnection, ModelManager};
use aula::web::AuthenticatedUser;

#[derive(Parser, Debug)]
#[command(about = "CLI tool for filling the course DB", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage modules
    Module {
        #[command(subcommand)]
        action: ModuleCommands,
    },

    /// Manage lessons
    Lesson {
        #[command(subcommand)]
        action: LessonCommands,
    },

    /// Manage questions
    Question {
        #[command(subcommand)]
        action: QuestionCommands,
    },
}

/// User management
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    Add {
        #[arg(long)]
        nombre: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "estudiante")]
        rol: String,
    },
}

/// Module management
#[derive(Subcommand, Debug)]
pub enum ModuleCommands {
    Add {
        #[arg(long)]
        nombre: String,
        #[arg(long, default_value = "")]
        descripcion: String,
        #[arg(long, default_value_t = 0)]
        duracion: i32,
    },
}

/// Lesson management
#[derive(Subcommand, Debug)]
pub enum LessonCommands {
    Add {
        /// Module name to attach the lesson to
        #[arg(long)]
        modulo: String,
        #[arg(long)]
        titulo: String,
        /// Path to a file with lesson content
        #[arg(long)]
        file: String,
        #[arg(long, default_value_t = 0)]
        orden: i32,
    },
}

/// Question management
#[derive(Subcommand, Debug)]
pub enum QuestionCommands {
    Add {
        /// Lesson title to attach the question to
        #[arg(long)]
        leccion: String,
        #[arg(long)]
        pregunta: String,
        #[arg(long, default_value = "")]
        contenido_previo: String,
        #[arg(long, default_value_t = 0)]
        orden: i32,
    },
}

#[tokio::main]
async fn main() -> aula::error::AppResult<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    let db_con = DbConnection::connect(&std::env::var("DATABASE_URL").unwrap())?;
    let mm = ModelManager::new(db_con);
    let actor = AuthenticatedUser::admin();

    match args.command {
        Commands::User { action } => match action {
            UserCommands::Add {
                nombre,
                email,
                password,
                rol,
            } => {
                let rol_id: i64 = sqlx::query_scalar("SELECT rol_id FROM roles WHERE nombre_rol = $1")
                    .bind(rol.to_lowercase())
                    .fetch_one(mm.executor())
                    .await
                    .map_err(DatabaseError::SqlxError)?;

                let user = UserEntity::create(
                    &mm,
                    &actor,
                    UserEntityCreate {
                        nombre,
                        email,
                        password_hash: aula::auth::hash_password(&password).unwrap(),
                        rol_id,
                        pais_id: None,
                    },
                )
                .await?;
                println!("User created: {:?}", user);
            }
        },

        Commands::Module { action } => match action {
            ModuleCommands::Add {
                nombre,
                descripcion,
                duracion,
            } => {
                let module = Module::create(
                    &mm,
                    &actor,
                    ModuleCreate {
                        nombre,
                        descripcion,
                        instructor_id: None,
                        duracion,
                        fecha_inicio: None,
                        fecha_fin: None,
                    },
                )
                .await?;
                println!("Module created: {:?}", module);
            }
        },

        Commands::Lesson { action } => match action {
            LessonCommands::Add {
                modulo,
                titulo,
                file,
                orden,
            } => {
                let modulo_id: i64 = sqlx::query_scalar("SELECT modulo_id FROM modulos WHERE nombre = $1")
                    .bind(&modulo)
                    .fetch_one(mm.executor())
                    .await
                    .map_err(DatabaseError::SqlxError)?;

                let contenido = std::fs::read_to_string(file)?;
                let lesson = Lesson::create(
                    &mm,
                    &actor,
                    LessonCreate {
                        modulo_id,
                        titulo_leccion: titulo,
                        contenido,
                        orden,
                    },
                )
                .await?;
                println!("Lesson created: {:?}", lesson);
            }
        },

        Commands::Question { action } => match action {
            QuestionCommands::Add {
                leccion,
                pregunta,
                contenido_previo,
                orden,
            } => {
                let leccion_id: i64 =
                    sqlx::query_scalar("SELECT leccion_id FROM lecciones WHERE titulo_leccion = $1")
                        .bind(&leccion)
                        .fetch_one(mm.executor())
                        .await
                        .map_err(DatabaseError::SqlxError)?;

                let question = Question::create(
                    &mm,
                    &actor,
                    QuestionCreate {
                        leccion_id,
                        contenido_previo,
                        pregunta,
                        orden,
                    },
                )
                .await?;
                println!("Question created: {:?}", question);
            }
        },
    }

    Ok(())
}
