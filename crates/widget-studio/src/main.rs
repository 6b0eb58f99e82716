use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use widget_engine::{parse_document, validate};
use widget_studio::config::default_data_dir;
use widget_studio::export::{write_export, ExportFormat};
use widget_studio::templates;
use widget_studio::{
    FileStore, HttpGenerator, ModelChoice, Result, StudioConfig, StudioError, WidgetGenerator,
    WidgetLibrary,
};

#[derive(Parser)]
#[command(name = "widget-studio", version, about = "Design fitness-app widgets as JSON")]
struct Cli {
    /// Data directory for config and saved widgets
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a payload file and print diagnostics
    Validate { file: PathBuf },
    /// Print the render tree outline of a payload file
    Render {
        file: PathBuf,
        /// Show edit-mode drag affordances
        #[arg(long)]
        edit: bool,
    },
    /// Export a payload file as json, html or component source
    Export {
        file: PathBuf,
        #[arg(long, default_value = "json")]
        format: String,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Generate a widget from a prompt
    Generate {
        prompt: String,
        #[arg(long, default_value = "fast")]
        model: String,
        /// Add the result to the saved widget library
        #[arg(long)]
        save: bool,
    },
    /// List starter templates, or print one
    Templates { name: Option<String> },
    /// Manage saved widgets
    Saved {
        #[command(subcommand)]
        action: SavedAction,
    },
}

#[derive(Subcommand)]
enum SavedAction {
    List,
    Show { id: String },
    Delete { id: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);
    let config = StudioConfig::load(&data_dir).await?;

    match cli.command {
        Command::Validate { file } => {
            let payload = read_payload(&file).await?;
            let result = validate(&payload);
            for error in &result.errors {
                println!("error: {}", error);
            }
            for warning in &result.warnings {
                println!("warning: {}", warning);
            }
            if result.valid {
                println!("valid");
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Render { file, edit } => {
            let payload = read_payload(&file).await?;
            let mut renderer = widget_engine::Renderer::new();
            if edit {
                renderer = renderer.with_edit_mode(widget_engine::DragReorder::new());
            }
            print!("{}", renderer.render(&payload).outline());
            Ok(ExitCode::SUCCESS)
        }
        Command::Export { file, format, out } => {
            let payload = read_payload(&file).await?;
            let format = ExportFormat::from_name(&format)?;
            let path = write_export(&payload, format, &out).await?;
            println!("{}", path.display());
            Ok(ExitCode::SUCCESS)
        }
        Command::Generate {
            prompt,
            model,
            save,
        } => {
            let model = ModelChoice::from_name(&model).unwrap_or_else(|| {
                log::warn!("Unknown model '{}', using fast", model);
                ModelChoice::Fast
            });
            let generator = HttpGenerator::new(config.generation.clone())?;
            let payload = generator.generate(&prompt, model).await;
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).map_err(widget_engine::EngineError::from)?
            );
            if save {
                let saved = library(&data_dir, &config)
                    .save(payload, model.as_str())
                    .await?;
                log::info!("Saved as {}", saved.id);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Templates { name: None } => {
            for template in templates::templates() {
                println!("{:<12} {}", template.name, template.description);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Templates { name: Some(name) } => {
            let template =
                templates::find(&name).ok_or_else(|| StudioError::UnknownTemplate(name.clone()))?;
            println!("{}", template.text());
            Ok(ExitCode::SUCCESS)
        }
        Command::Saved { action } => {
            let library = library(&data_dir, &config);
            match action {
                SavedAction::List => {
                    for saved in library.list().await {
                        println!(
                            "{}  {}  {}  {}",
                            saved.id,
                            saved.updated_at.format("%Y-%m-%d %H:%M"),
                            saved.model,
                            saved.name
                        );
                    }
                }
                SavedAction::Show { id } => {
                    let saved = library
                        .get(&id)
                        .await
                        .ok_or(StudioError::SavedWidgetNotFound(id))?;
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&saved.payload)
                            .map_err(widget_engine::EngineError::from)?
                    );
                }
                SavedAction::Delete { id } => {
                    if !library.delete(&id).await? {
                        return Err(StudioError::SavedWidgetNotFound(id));
                    }
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn library(data_dir: &Path, config: &StudioConfig) -> WidgetLibrary<FileStore> {
    WidgetLibrary::new(
        FileStore::new(data_dir),
        config.storage.namespace.clone(),
        config.storage.max_saved,
    )
}

async fn read_payload(file: &Path) -> Result<serde_json::Value> {
    let text = tokio::fs::read_to_string(file).await?;
    Ok(parse_document(&text).map_err(widget_engine::EngineError::from)?)
}
