//! Lesson Planner CLI
//!
//! Main entry point for logging in, generating lesson plans, exporting them,
//! and serving the web planner.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use lesson_export::render::render_terminal;
use lesson_export::{ExportFormat, LessonPlanExporter};
use lesson_planner::{
    build_prompt, create_router, AppState, Config, ContentStore, FileSessionRepository, FormData,
    FormField, GeminiClient, LiteralCredentialVerifier, PlannerError, SessionStore, TextGenerator,
    GENERATION_ERROR_MESSAGE,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Lesson Planner - AI-assisted lesson plans
///
/// Fill in a lesson form, generate a structured plan with Gemini, and export
/// it as a PDF, Markdown or JSON document.
#[derive(Parser, Debug)]
#[command(name = "lesson")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (default: lesson.json in current directory)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in with the demo credentials
    Login {
        /// Email (username)
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },

    /// Clear the stored session
    Logout,

    /// Show the session and configuration
    Status,

    /// Print the prompt a form produces, without calling Gemini
    Prompt {
        #[command(flatten)]
        form: FormArgs,
    },

    /// Generate a lesson plan and export it
    Generate {
        #[command(flatten)]
        form: FormArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Do not print the rendered plan
        #[arg(long)]
        quiet: bool,
    },

    /// Export already written or edited content without regenerating
    Export {
        /// File holding the lesson plan markdown
        #[arg(long, value_name = "FILE")]
        content: PathBuf,

        #[command(flatten)]
        form: FormArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Serve the web planner
    Serve {
        /// Port for the HTTP server (default: from config, 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

/// Lesson form values. Flags override values loaded with `--form`.
#[derive(clap::Args, Debug, Default)]
struct FormArgs {
    /// JSON file with form fields (camelCase keys)
    #[arg(long, value_name = "FILE")]
    form: Option<PathBuf>,

    /// Lesson topic
    #[arg(long)]
    topic: Option<String>,

    /// Target grade level
    #[arg(long)]
    grade_level: Option<String>,

    /// Main concept and subtopics
    #[arg(long)]
    main_concept: Option<String>,

    /// Materials needed
    #[arg(long)]
    materials: Option<String>,

    /// Learning objectives
    #[arg(long)]
    objectives: Option<String>,

    /// Lesson outline
    #[arg(long)]
    lesson_outline: Option<String>,
}

#[derive(clap::Args, Debug, Default)]
struct OutputArgs {
    /// Export format (repeatable; default: pdf)
    #[arg(short, long = "format", value_enum)]
    formats: Vec<FormatArg>,

    /// Output directory for exported documents
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FormatArg {
    Pdf,
    Markdown,
    Json,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Pdf => Self::Pdf,
            FormatArg::Markdown => Self::Markdown,
            FormatArg::Json => Self::Json,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing subscriber with appropriate filter
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(config = ?cli.config, "Config file");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Login { email, password } => {
            let session = open_session(&config)?;
            let verifier = LiteralCredentialVerifier::new(config.credentials.clone());
            session.login(&verifier, &email, &password)?;
            println!("Logged in as {email}");
        }
        Command::Logout => {
            open_session(&config)?.logout()?;
            println!("Logged out");
        }
        Command::Status => {
            let flag = open_session(&config)?.current();
            match flag.email.as_deref() {
                Some(email) if flag.is_authenticated => println!("Logged in as {email}"),
                _ => println!("Not logged in"),
            }
            println!();
            print_config(&config);
        }
        Command::Prompt { form } => {
            println!("{}", build_prompt(&form.load()?));
        }
        Command::Generate {
            form,
            output,
            quiet,
        } => {
            output.apply(&mut config);
            config.validate()?;
            require_login(&config)?;

            let form = form.load()?;
            let content = generate(&config, &form).await;
            if !quiet {
                print_content(&content);
            }
            write_exports(&config, &form, &content.editable, &output.formats())?;
        }
        Command::Export {
            content,
            form,
            output,
        } => {
            output.apply(&mut config);
            config.validate()?;
            require_login(&config)?;

            let form = form.load()?;
            let text = std::fs::read_to_string(&content).map_err(|e| {
                anyhow::anyhow!("Failed to read content file '{}': {e}", content.display())
            })?;
            write_exports(&config, &form, &text, &output.formats())?;
        }
        Command::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            config.validate()?;
            serve(config).await?;
        }
    }

    Ok(())
}

/// Loads configuration from the specified path or default location.
fn load_config(config_path: Option<&str>) -> anyhow::Result<Config> {
    match config_path {
        Some(path_str) => {
            let path = Path::new(path_str);
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: '{}'\n\nSuggestion: Check the path or remove the --config flag to use defaults",
                    path.display()
                );
            }
            Config::load_from_file(path).map_err(|e| anyhow::anyhow!("{e}"))
        }
        None => Config::load().map_err(|e| anyhow::anyhow!("{e}")),
    }
}

fn open_session(config: &Config) -> anyhow::Result<SessionStore> {
    let repository = FileSessionRepository::new(config.session_path());
    Ok(SessionStore::open(Arc::new(repository))?)
}

fn require_login(config: &Config) -> anyhow::Result<()> {
    if open_session(config)?.is_authenticated() {
        Ok(())
    } else {
        Err(PlannerError::NotAuthenticated.into())
    }
}

/// Runs one generation and returns the resulting content store.
///
/// Failures are logged and recorded as the fixed error message.
async fn generate(config: &Config, form: &FormData) -> ContentStore {
    let client = GeminiClient::from_config(config);
    let prompt = build_prompt(form);
    let mut content = ContentStore::new();

    content.begin_generation();
    println!("Generating lesson plan with {}...", client.name());
    match client.generate(&prompt).await {
        Ok(text) => content.complete_generation(text),
        Err(e) => {
            tracing::error!(kind = %e.kind, error = %e.message, "Error generating lesson plan");
            content.fail_generation();
        }
    }
    content
}

fn print_content(content: &ContentStore) {
    println!();
    if content.failed {
        println!("{}", content.generated);
    } else {
        println!("{}", render_terminal(&content.editable));
    }
    println!();
}

fn write_exports(
    config: &Config,
    form: &FormData,
    content: &str,
    formats: &[ExportFormat],
) -> anyhow::Result<()> {
    let document = form.to_document(content);
    let exporter = LessonPlanExporter::new(&document);
    let dir = config.output_path();
    let stem = config.export_file_stem();

    for format in formats {
        let path = exporter
            .write_to_dir(*format, &dir, &stem)
            .map_err(|e| PlannerError::export_write(dir.join(format.file_name(&stem)), e.to_string()))?;
        println!("  {format}: {}", path.display());
    }
    Ok(())
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = ([127, 0, 0, 1], config.port).into();
    let session = open_session(&config)?;
    let generator: Arc<dyn TextGenerator> = Arc::new(GeminiClient::from_config(&config));

    if config.api_key().is_none() {
        tracing::warn!(
            variable = %config.api_key_env,
            "API key not set; generation will fail until it is exported"
        );
    }

    let router = create_router(AppState::new(config, session, generator));

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to bind to {addr}: {e}\n\nSuggestion: Try a different port with --port"
        )
    })?;

    println!("Lesson planner running on http://{addr}");
    println!("Press Ctrl+C to stop");
    tracing::info!(%addr, "HTTP server started");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Received Ctrl+C, shutting down");
        })
        .await?;

    Ok(())
}

/// Prints the loaded configuration.
fn print_config(config: &Config) {
    println!("Configuration loaded:");
    println!("  Model: {}", config.model);
    println!("  API base URL: {}", config.api_base_url);
    println!(
        "  API key: {} ({})",
        config.api_key_env,
        if config.api_key().is_some() {
            "set"
        } else {
            "not set"
        }
    );
    println!("  Session file: {}", config.session_file);
    println!("  Output directory: {}", config.output_dir);
    println!("  Export file: {}", config.export_file_name);
    println!("  Port: {}", config.port);
}

impl FormArgs {
    /// Builds the form: the `--form` file first, then individual flags.
    fn load(&self) -> anyhow::Result<FormData> {
        let mut form = match &self.form {
            Some(path) => {
                let contents = std::fs::read_to_string(path).map_err(|e| {
                    anyhow::anyhow!("Failed to read form file '{}': {e}", path.display())
                })?;
                serde_json::from_str(&contents).map_err(|e| {
                    anyhow::anyhow!("Invalid JSON in form file '{}': {e}", path.display())
                })?
            }
            None => FormData::new(),
        };

        for (field, value) in [
            (FormField::Topic, &self.topic),
            (FormField::GradeLevel, &self.grade_level),
            (FormField::MainConcept, &self.main_concept),
            (FormField::Materials, &self.materials),
            (FormField::Objectives, &self.objectives),
            (FormField::LessonOutline, &self.lesson_outline),
        ] {
            if let Some(value) = value {
                form.set(field, value.as_str());
            }
        }

        Ok(form)
    }
}

impl OutputArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(ref output_dir) = self.output_dir {
            config.output_dir.clone_from(output_dir);
        }
    }

    fn formats(&self) -> Vec<ExportFormat> {
        if self.formats.is_empty() {
            vec![ExportFormat::Pdf]
        } else {
            let mut formats: Vec<ExportFormat> = Vec::new();
            for format in self.formats.iter().copied().map(ExportFormat::from) {
                if !formats.contains(&format) {
                    formats.push(format);
                }
            }
            formats
        }
    }
}
