use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tartib_core::config::Config;
use tartib_core::content::{
    AssetUpload, Category, CategoryUpdate, ContentService, Diagram, DiagramUpdate, GlossaryTerm,
    GlossaryTermUpdate, NewCategory, NewDiagram, NewGlossaryTerm, NewSubcategory, NewTemplate,
    Subcategory, SubcategoryUpdate, Template, TemplateUpdate, DEFAULT_COLOR_HEX,
};
use tartib_core::objects::FsObjectStorage;
use tartib_core::store::SurrealStore;

#[derive(Parser)]
#[command(name = "tartib")]
#[command(about = "Bilingual content administration console", long_about = None)]
struct Cli {
    /// Override the data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage top-level categories
    #[command(subcommand)]
    Category(CategoryCommand),
    /// Manage subcategories within a category
    #[command(subcommand)]
    Subcategory(SubcategoryCommand),
    /// Manage glossary terms
    #[command(subcommand)]
    Glossary(GlossaryCommand),
    /// Manage diagrams and their images
    #[command(subcommand)]
    Diagram(DiagramCommand),
    /// Manage templates and their PDFs
    #[command(subcommand)]
    Template(TemplateCommand),
}

#[derive(Subcommand)]
enum CategoryCommand {
    /// List categories in display order
    List,
    /// Add a category
    Add {
        title_en: String,
        #[arg(long, default_value = "")]
        title_ar: String,
        #[arg(long, default_value = DEFAULT_COLOR_HEX)]
        color: String,
    },
    /// Edit a category
    Edit {
        id: String,
        #[arg(long)]
        title_en: Option<String>,
        #[arg(long)]
        title_ar: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a category together with all its subcategories
    Rm { id: String },
    /// Move a category one position up
    MoveUp { id: String },
    /// Move a category one position down
    MoveDown { id: String },
}

#[derive(Subcommand)]
enum SubcategoryCommand {
    /// List the subcategories of a category in display order
    List { category_id: String },
    /// Add a subcategory (or sub-subcategory via --parent)
    Add {
        category_id: String,
        title_en: String,
        #[arg(long)]
        title_ar: String,
        #[arg(long)]
        content_en: String,
        #[arg(long)]
        content_ar: String,
        /// Nest under an existing subcategory
        #[arg(long)]
        parent: Option<String>,
    },
    /// Edit a subcategory
    Edit {
        id: String,
        #[arg(long)]
        title_en: Option<String>,
        #[arg(long)]
        title_ar: Option<String>,
        #[arg(long)]
        content_en: Option<String>,
        #[arg(long)]
        content_ar: Option<String>,
    },
    /// Delete a subcategory
    Rm { id: String },
    /// Move a subcategory one position up within its category
    MoveUp { id: String },
    /// Move a subcategory one position down within its category
    MoveDown { id: String },
}

#[derive(Subcommand)]
enum GlossaryCommand {
    /// List glossary terms in display order
    List,
    /// Add a glossary term
    Add {
        term: String,
        definition: String,
        #[arg(long, default_value = "")]
        term_ar: String,
        #[arg(long, default_value = "")]
        definition_ar: String,
        #[arg(long, default_value = "")]
        category: String,
    },
    /// Edit a glossary term
    Edit {
        id: String,
        #[arg(long)]
        term: Option<String>,
        #[arg(long)]
        term_ar: Option<String>,
        #[arg(long)]
        definition: Option<String>,
        #[arg(long)]
        definition_ar: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Delete a glossary term
    Rm { id: String },
    /// Move a term one position up
    MoveUp { id: String },
    /// Move a term one position down
    MoveDown { id: String },
}

#[derive(Subcommand)]
enum DiagramCommand {
    /// List diagrams in display order
    List,
    /// Add a diagram, optionally uploading an image
    Add {
        title: String,
        #[arg(long, default_value = "")]
        title_ar: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        description_ar: String,
        #[arg(long, default_value = "")]
        category: String,
        /// Image file to upload
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Edit a diagram, optionally replacing its image
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        title_ar: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        description_ar: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Delete a diagram and its stored image
    Rm { id: String },
    /// Move a diagram one position up
    MoveUp { id: String },
    /// Move a diagram one position down
    MoveDown { id: String },
}

#[derive(Subcommand)]
enum TemplateCommand {
    /// List templates in display order
    List,
    /// Add a template from a PDF file
    Add {
        title: String,
        /// PDF file to upload
        #[arg(long)]
        pdf: PathBuf,
        #[arg(long, default_value = "")]
        title_ar: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        description_ar: String,
        #[arg(long, default_value = "")]
        category: String,
    },
    /// Edit a template, optionally replacing its PDF
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        title_ar: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        description_ar: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        pdf: Option<PathBuf>,
    },
    /// Delete a template and its stored PDF
    Rm { id: String },
    /// Move a template one position up
    MoveUp { id: String },
    /// Move a template one position down
    MoveDown { id: String },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load()?;
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = dir.display().to_string();
    }

    let db_path = config.storage.database_path();
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let store = Arc::new(SurrealStore::open(&db_path).await?);
    let objects = Arc::new(FsObjectStorage::new(config.storage.assets_path()));
    let service = ContentService::new(store, objects);

    match cli.command {
        Commands::Category(command) => run_category(&service, command).await,
        Commands::Subcategory(command) => run_subcategory(&service, command).await,
        Commands::Glossary(command) => run_glossary(&service, command).await,
        Commands::Diagram(command) => run_diagram(&service, command).await,
        Commands::Template(command) => run_template(&service, command).await,
    }
}

async fn run_category(
    service: &ContentService,
    command: CategoryCommand,
) -> Result<(), Box<dyn Error>> {
    let categories = service.categories();
    match command {
        CategoryCommand::List => {
            print_categories(&categories.list().await?);
        }
        CategoryCommand::Add {
            title_en,
            title_ar,
            color,
        } => {
            let id = categories
                .create(NewCategory {
                    title_en,
                    title_ar,
                    color_hex: color,
                })
                .await?;
            println!("Created category {id}");
        }
        CategoryCommand::Edit {
            id,
            title_en,
            title_ar,
            color,
        } => {
            categories
                .update(
                    &id,
                    CategoryUpdate {
                        title_en,
                        title_ar,
                        color_hex: color,
                    },
                )
                .await?;
            println!("Updated category {id}");
        }
        CategoryCommand::Rm { id } => {
            categories.delete(&id).await?;
            println!("Deleted category {id} and its subcategories");
        }
        CategoryCommand::MoveUp { id } => {
            categories.move_up(&id).await?;
            print_categories(&categories.list().await?);
        }
        CategoryCommand::MoveDown { id } => {
            categories.move_down(&id).await?;
            print_categories(&categories.list().await?);
        }
    }
    Ok(())
}

async fn run_subcategory(
    service: &ContentService,
    command: SubcategoryCommand,
) -> Result<(), Box<dyn Error>> {
    let subcategories = service.subcategories();
    match command {
        SubcategoryCommand::List { category_id } => {
            print_subcategories(&subcategories.list(&category_id).await?);
        }
        SubcategoryCommand::Add {
            category_id,
            title_en,
            title_ar,
            content_en,
            content_ar,
            parent,
        } => {
            let id = subcategories
                .create(NewSubcategory {
                    category_id,
                    parent_subcategory_id: parent,
                    title_en,
                    title_ar,
                    content_en,
                    content_ar,
                })
                .await?;
            println!("Created subcategory {id}");
        }
        SubcategoryCommand::Edit {
            id,
            title_en,
            title_ar,
            content_en,
            content_ar,
        } => {
            subcategories
                .update(
                    &id,
                    SubcategoryUpdate {
                        title_en,
                        title_ar,
                        content_en,
                        content_ar,
                    },
                )
                .await?;
            println!("Updated subcategory {id}");
        }
        SubcategoryCommand::Rm { id } => {
            subcategories.delete(&id).await?;
            println!("Deleted subcategory {id}");
        }
        SubcategoryCommand::MoveUp { id } => {
            subcategories.move_up(&id).await?;
            println!("Moved subcategory {id} up");
        }
        SubcategoryCommand::MoveDown { id } => {
            subcategories.move_down(&id).await?;
            println!("Moved subcategory {id} down");
        }
    }
    Ok(())
}

async fn run_glossary(
    service: &ContentService,
    command: GlossaryCommand,
) -> Result<(), Box<dyn Error>> {
    let glossary = service.glossary();
    match command {
        GlossaryCommand::List => {
            print_terms(&glossary.list().await?);
        }
        GlossaryCommand::Add {
            term,
            definition,
            term_ar,
            definition_ar,
            category,
        } => {
            let id = glossary
                .create(NewGlossaryTerm {
                    term,
                    term_arabic: term_ar,
                    definition,
                    definition_arabic: definition_ar,
                    category,
                })
                .await?;
            println!("Created glossary term {id}");
        }
        GlossaryCommand::Edit {
            id,
            term,
            term_ar,
            definition,
            definition_ar,
            category,
        } => {
            glossary
                .update(
                    &id,
                    GlossaryTermUpdate {
                        term,
                        term_arabic: term_ar,
                        definition,
                        definition_arabic: definition_ar,
                        category,
                    },
                )
                .await?;
            println!("Updated glossary term {id}");
        }
        GlossaryCommand::Rm { id } => {
            glossary.delete(&id).await?;
            println!("Deleted glossary term {id}");
        }
        GlossaryCommand::MoveUp { id } => {
            glossary.move_up(&id).await?;
            print_terms(&glossary.list().await?);
        }
        GlossaryCommand::MoveDown { id } => {
            glossary.move_down(&id).await?;
            print_terms(&glossary.list().await?);
        }
    }
    Ok(())
}

async fn run_diagram(
    service: &ContentService,
    command: DiagramCommand,
) -> Result<(), Box<dyn Error>> {
    let diagrams = service.diagrams();
    match command {
        DiagramCommand::List => {
            print_diagrams(&diagrams.list().await?);
        }
        DiagramCommand::Add {
            title,
            title_ar,
            description,
            description_ar,
            category,
            image,
        } => {
            let upload = match &image {
                Some(path) => Some(read_upload(path).await?),
                None => None,
            };
            let id = diagrams
                .create(
                    NewDiagram {
                        title,
                        title_arabic: title_ar,
                        description,
                        description_arabic: description_ar,
                        category,
                    },
                    upload,
                )
                .await?;
            println!("Created diagram {id}");
        }
        DiagramCommand::Edit {
            id,
            title,
            title_ar,
            description,
            description_ar,
            category,
            image,
        } => {
            let upload = match &image {
                Some(path) => Some(read_upload(path).await?),
                None => None,
            };
            diagrams
                .update(
                    &id,
                    DiagramUpdate {
                        title,
                        title_arabic: title_ar,
                        description,
                        description_arabic: description_ar,
                        category,
                    },
                    upload,
                )
                .await?;
            println!("Updated diagram {id}");
        }
        DiagramCommand::Rm { id } => {
            diagrams.delete(&id).await?;
            println!("Deleted diagram {id}");
        }
        DiagramCommand::MoveUp { id } => {
            diagrams.move_up(&id).await?;
            print_diagrams(&diagrams.list().await?);
        }
        DiagramCommand::MoveDown { id } => {
            diagrams.move_down(&id).await?;
            print_diagrams(&diagrams.list().await?);
        }
    }
    Ok(())
}

async fn run_template(
    service: &ContentService,
    command: TemplateCommand,
) -> Result<(), Box<dyn Error>> {
    let templates = service.templates();
    match command {
        TemplateCommand::List => {
            print_templates(&templates.list().await?);
        }
        TemplateCommand::Add {
            title,
            pdf,
            title_ar,
            description,
            description_ar,
            category,
        } => {
            let upload = read_upload(&pdf).await?;
            let id = templates
                .create(
                    NewTemplate {
                        title,
                        title_arabic: title_ar,
                        description,
                        description_arabic: description_ar,
                        category,
                    },
                    upload,
                )
                .await?;
            println!("Created template {id}");
        }
        TemplateCommand::Edit {
            id,
            title,
            title_ar,
            description,
            description_ar,
            category,
            pdf,
        } => {
            let upload = match &pdf {
                Some(path) => Some(read_upload(path).await?),
                None => None,
            };
            templates
                .update(
                    &id,
                    TemplateUpdate {
                        title,
                        title_arabic: title_ar,
                        description,
                        description_arabic: description_ar,
                        category,
                    },
                    upload,
                )
                .await?;
            println!("Updated template {id}");
        }
        TemplateCommand::Rm { id } => {
            templates.delete(&id).await?;
            println!("Deleted template {id}");
        }
        TemplateCommand::MoveUp { id } => {
            templates.move_up(&id).await?;
            print_templates(&templates.list().await?);
        }
        TemplateCommand::MoveDown { id } => {
            templates.move_down(&id).await?;
            print_templates(&templates.list().await?);
        }
    }
    Ok(())
}

async fn read_upload(path: &Path) -> Result<AssetUpload, Box<dyn Error>> {
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload.bin".to_string());
    Ok(AssetUpload::new(name, bytes))
}

fn print_categories(categories: &[Category]) {
    println!("{:<38} {:>5}  {:<9} {}", "ID", "ORDER", "COLOR", "TITLE");
    for category in categories {
        println!(
            "{:<38} {:>5}  {:<9} {} | {}",
            category.id, category.order, category.color_hex, category.title_en, category.title_ar
        );
    }
}

fn print_subcategories(subcategories: &[Subcategory]) {
    println!("{:<38} {:>5}  {:<7} {}", "ID", "ORDER", "NESTED", "TITLE");
    for subcategory in subcategories {
        let nested = if subcategory.parent_subcategory_id.is_some() {
            "yes"
        } else {
            ""
        };
        println!(
            "{:<38} {:>5}  {:<7} {} | {}",
            subcategory.id, subcategory.order, nested, subcategory.title_en, subcategory.title_ar
        );
    }
}

fn print_terms(terms: &[GlossaryTerm]) {
    println!("{:<38} {:>5}  {}", "ID", "ORDER", "TERM");
    for term in terms {
        println!("{:<38} {:>5}  {} | {}", term.id, term.order, term.term, term.term_arabic);
    }
}

fn print_diagrams(diagrams: &[Diagram]) {
    println!("{:<38} {:>5}  {:<6} {}", "ID", "ORDER", "IMAGE", "TITLE");
    for diagram in diagrams {
        let image = if diagram.image_file_name.is_empty() {
            ""
        } else {
            "yes"
        };
        println!(
            "{:<38} {:>5}  {:<6} {} | {}",
            diagram.id, diagram.order, image, diagram.title, diagram.title_arabic
        );
    }
}

fn print_templates(templates: &[Template]) {
    println!("{:<38} {:>5}  {:>9}  {}", "ID", "ORDER", "PDF SIZE", "TITLE");
    for template in templates {
        println!(
            "{:<38} {:>5}  {:>9}  {} | {}",
            template.id, template.order, template.pdf_size, template.title, template.title_arabic
        );
    }
}
