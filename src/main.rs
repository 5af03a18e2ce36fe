use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use scout::agent::{with_progress, Collaborators, Memory, MemoryStore, Mode, ModeController, SessionState};
use scout::commands::{Command, MemoryCommand, HELP};
use scout::config::Config;
use scout::providers::OllamaProvider;
use scout::InferenceProvider;
use scout::tools::{HttpFetcher, SearxngClient};

#[derive(Parser)]
#[command(name = "scout")]
#[command(about = "Research assistant backed by Ollama and SearxNG")]
struct Args {
    #[arg(long, help = "List saved memories and exit")]
    list_memories: bool,

    #[arg(long, value_name = "ID", help = "Start with a saved memory")]
    load_memory: Option<String>,

    #[arg(long, help = "Start with the most recently updated memory")]
    resume: bool,

    #[arg(short, long, help = "Starting mode: s, r, n, c, f or a")]
    mode: Option<Mode>,

    #[arg(long, help = "Model used for final answers")]
    heavy_model: Option<String>,

    #[arg(long, help = "Model used for planning and extraction")]
    light_model: Option<String>,

    #[arg(long, help = "Ollama base URL")]
    ollama_url: Option<String>,

    #[arg(long, help = "SearxNG base URL")]
    searx_url: Option<String>,

    #[arg(long, help = "Directory holding memories")]
    data_dir: Option<PathBuf>,

    #[arg(short, long, help = "Verbose output")]
    verbose: bool,

    #[arg(long, value_name = "PATH", help = "Write logs to a file instead of stderr")]
    log_file: Option<PathBuf>,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(model) = &self.heavy_model {
            config.settings.heavy_model = model.clone();
        }
        if let Some(model) = &self.light_model {
            config.settings.light_model = model.clone();
        }
        if let Some(url) = &self.ollama_url {
            config.settings.inference_url = url.clone();
        }
        if let Some(url) = &self.searx_url {
            config.settings.search_url = url.clone();
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = Some(dir.clone());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from the data directory .env file
    if let Ok(dir) = scout::utils::paths::get_scout_data_dir() {
        let env_path = dir.join(".env");
        if env_path.exists() {
            dotenv::from_path(env_path).ok();
        }
    }
    dotenv::dotenv().ok();

    let args = Args::parse();
    init_logging(&args)?;

    let mut config = Config::load().context("failed to load configuration")?;
    args.apply(&mut config);

    let data_dir = config.resolve_data_dir().context("failed to prepare data directory")?;
    let store = MemoryStore::open(&data_dir)
        .await
        .with_context(|| format!("failed to open memory store in {:?}", data_dir))?;

    if args.list_memories {
        print_catalog(&store).await?;
        store.close().await;
        return Ok(());
    }

    info!("Starting scout with {} / {}", config.settings.heavy_model, config.settings.light_model);

    let limits = config.limits.clone();
    let provider = Arc::new(OllamaProvider::new(&config.settings, &limits)?);
    let collaborators = Collaborators {
        inference: provider.clone(),
        search: Arc::new(SearxngClient::new(&config.settings.search_url, limits.fetch_timeout())?),
        fetch: Arc::new(HttpFetcher::new(limits.fetch_timeout())?),
    };
    let controller = ModeController::new(collaborators, limits.clone());

    let mut session = SessionState::new(config.settings.clone());
    if let Some(mode) = args.mode {
        session.set_mode(mode);
    }

    if let Some(id) = &args.load_memory {
        let memory = store.load(id).await.with_context(|| format!("failed to load memory {}", id))?;
        show_memory(&memory);
        session.adopt(memory);
    } else if args.resume {
        let memory = store.resume_last().await.context("failed to resume")?;
        show_memory(&memory);
        session.adopt(memory);
    }

    let progress_every = Duration::from_millis(limits.progress_interval_ms);
    run_interactive_mode(&controller, &provider, &store, &mut session, progress_every).await?;

    store.close().await;
    Ok(())
}

fn init_logging(args: &Args) -> Result<()> {
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    match &args.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {:?}", path))?;
            let subscriber = tracing_subscriber::fmt()
                .with_max_level(level)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        None => {
            let subscriber = tracing_subscriber::fmt()
                .with_max_level(level)
                .with_writer(io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

async fn run_interactive_mode(
    controller: &ModeController,
    provider: &OllamaProvider,
    store: &MemoryStore,
    session: &mut SessionState,
    progress_every: Duration,
) -> Result<()> {
    println!("\n🔎 Scout ({} mode)", session.mode);
    println!("════════════════════════");
    println!("💡 Ask a question, or type /help for commands.");

    loop {
        print!("\n💬 You: ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF behaves like /exit
            save_on_exit(store, session).await;
            break;
        }
        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        match Command::parse(line) {
            Some(Command::Exit) => {
                save_on_exit(store, session).await;
                println!("\n👋 Goodbye!");
                break;
            }
            Some(command) => handle_command(command, provider, store, session).await,
            None => ask(controller, session, line, progress_every).await,
        }
    }

    Ok(())
}

async fn ask(controller: &ModeController, session: &mut SessionState, question: &str, every: Duration) {
    let work = controller.execute(question, session);
    let result = with_progress(work, every, |elapsed| {
        eprint!("\r⏳ Thinking... {}s", elapsed.as_secs());
        io::stderr().flush().ok();
    })
    .await;
    eprint!("\r\x1B[2K");

    match result {
        Ok(answer) => {
            println!("\n🤖 Scout ({}):\n{}", answer.mode, answer.text);
            if !answer.sources.is_empty() {
                println!("\nLinks:");
                for link in &answer.sources {
                    println!("  {}", link);
                }
            }
            println!("\n📊 Prompt tokens: {}", answer.prompt_eval_count);
            session.record(question, &answer.text, answer.sources);
        }
        Err(e) => {
            error!("Failed to answer: {}", e);
            println!("\n❌ Error ({}): {}", e.kind(), e);
        }
    }
}

async fn handle_command(
    command: Command,
    provider: &OllamaProvider,
    store: &MemoryStore,
    session: &mut SessionState,
) {
    match command {
        Command::Mode(mode) => {
            session.set_mode(mode);
            println!("✅ Mode: {}", mode);
        }
        Command::Attach(path) => {
            println!("📎 Attached {}", path.display());
            session.attach(path);
        }
        Command::Detach => {
            session.detach();
            println!("📎 File detached");
        }
        Command::Current => match session.memory.title.as_str() {
            "" => println!("No active memory"),
            title => println!("Current memory: {}", title),
        },
        Command::Stats => println!("📊 {}: {}", provider.name(), provider.metrics().await),
        Command::Help => println!("{}", HELP),
        Command::Invalid(message) => println!("❌ {}", message),
        Command::Memory(command) => {
            if let Err(e) = handle_memory(command, store, session).await {
                error!("Memory command failed: {}", e);
                println!("❌ {}", e);
            }
        }
        Command::Exit => {}
    }
}

async fn handle_memory(command: MemoryCommand, store: &MemoryStore, session: &mut SessionState) -> scout::Result<()> {
    match command {
        MemoryCommand::List => {
            for entry in store.list().await? {
                println!("{}  {}  {}", entry.id, entry.updated_local(), entry.display_title());
            }
        }
        MemoryCommand::Use(id) => {
            let memory = store.load(&id).await?;
            show_memory(&memory);
            session.adopt(memory);
        }
        MemoryCommand::Resume => {
            let memory = store.resume_last().await?;
            show_memory(&memory);
            session.adopt(memory);
        }
        MemoryCommand::New => {
            store.persist(&mut session.memory).await?;
            session.forget();
            session.remember();
            println!("🆕 Started a new memory");
        }
        MemoryCommand::NewForget => {
            session.forget();
            session.remember();
            println!("🆕 Started a new memory");
        }
        MemoryCommand::Delete(id) => {
            store.delete(&id).await?;
            if session.memory.id.as_deref() == Some(id.as_str()) {
                session.adopt(Memory::default());
            }
            println!("🗑️  Deleted {}", id);
        }
        MemoryCommand::Forget => {
            session.forget();
            println!("🙈 Not remembering this chat");
        }
        MemoryCommand::Remember => {
            session.remember();
            println!("🧠 Remembering this chat");
        }
    }
    Ok(())
}

async fn save_on_exit(store: &MemoryStore, session: &mut SessionState) {
    if !session.remember {
        return;
    }
    if let Err(e) = store.persist(&mut session.memory).await {
        error!("Failed to save memory on exit: {}", e);
        println!("❌ Failed to save memory: {}", e);
    }
}

async fn print_catalog(store: &MemoryStore) -> Result<()> {
    let entries = store.list().await.context("failed to list memories")?;
    if entries.is_empty() {
        println!("No saved memories");
    }
    for entry in entries {
        println!("{}  {}  {}", entry.id, entry.updated_local(), entry.display_title());
    }
    Ok(())
}

fn show_memory(memory: &Memory) {
    println!("\n📖 {}", memory.title);
    println!("{}", memory.transcript());
}
