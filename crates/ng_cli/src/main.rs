use clap::Parser;
use ng_core::{ArticleStorage, Category, Error, GeneratorConfig, Result};
use ng_generator::{handle_command, init_logging, GeneratorArgs, GeneratorCommands};
use ng_inference::models::{create_model, create_model_or_demo};
use ng_web::AppState;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                match c {
                    's' => total_seconds += num,
                    'm' => total_seconds += num * 60,
                    'h' => total_seconds += num * 3600,
                    'd' => total_seconds += num * 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                }
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // A trailing bare number is seconds
        if !current_number.is_empty() {
            let num = current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total_seconds += num;
            has_unit = true;
        }

        if !has_unit {
            return Err("Duration must include a number".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Backend for an auto-generated news feed", long_about = None)]
pub struct Cli {
    /// Storage backend: sqlite or memory
    #[arg(long, default_value = "sqlite")]
    storage: String,
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Chat model identifier, or "demo" for offline placeholder articles
    #[arg(long, env = "OPENAI_MODEL")]
    model: Option<String>,
    #[arg(long, env = "OPENAI_BASE_URL", default_value = ng_inference::DEFAULT_BASE_URL)]
    base_url: String,
    /// Comma separated category labels (defaults to the five feed categories)
    #[arg(long, value_delimiter = ',')]
    categories: Vec<String>,
    /// Skip a category that got an article within this window
    #[arg(long, default_value = "5m")]
    cooldown: HumanDuration,
    /// Base pause between failed generation attempts
    #[arg(long, default_value = "2s")]
    retry_delay: HumanDuration,
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run batch generation across all categories
    Generate {
        /// Keep running with the given interval between runs (e.g. 1h, 30m, 1h15m30s)
        #[arg(long)]
        interval: Option<HumanDuration>,
    },
    /// Serve the HTTP API
    Serve {
        #[arg(long, default_value = "0.0.0.0:8080")]
        addr: String,
    },
    /// Print stored articles, newest first
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Print the configured categories
    Categories,
    /// Print the most recent generation log entries
    Logs {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

impl Cli {
    fn generator_config(&self) -> Result<GeneratorConfig> {
        let cooldown = chrono::Duration::from_std(self.cooldown.0)
            .map_err(|e| Error::Configuration(format!("Invalid cooldown: {}", e)))?;
        let mut config = GeneratorConfig::default()
            .with_cooldown(cooldown)
            .with_retry_delay(self.retry_delay.0);
        if !self.categories.is_empty() {
            config = config.with_categories(
                self.categories
                    .iter()
                    .map(|c| c.trim())
                    .filter(|c| !c.is_empty())
                    .map(Category::new)
                    .collect(),
            );
        }
        if config.categories.is_empty() {
            return Err(Error::Configuration("No categories configured".to_string()));
        }
        Ok(config)
    }

    fn inference_config(&self) -> ng_inference::Config {
        ng_inference::Config {
            model_name: self.model.clone(),
            ..ng_inference::Config::default()
        }
        .with_api_key(self.api_key.clone())
        .with_base_url(self.base_url.clone())
    }
}

async fn check_storage(storage: &Arc<dyn ArticleStorage>, max_retries: u32, timeout: Duration) -> Result<()> {
    let mut retries = 0;
    loop {
        match tokio::time::timeout(timeout, storage.list_articles(None, 1)).await {
            Ok(result) => return result.map(|_| ()),
            Err(_) => {
                retries += 1;
                if retries >= max_retries {
                    return Err(Error::Storage(format!(
                        "Storage health check timed out after {} attempts",
                        retries
                    )));
                }
                info!("Storage health check timed out, retrying {}/{}...", retries, max_retries);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.generator_config()?;
    let storage = ng_storage::create_storage(&cli.storage, cli.database_url.as_deref()).await?;

    info!("💾 Checking storage connection...");
    check_storage(&storage, 3, Duration::from_secs(10)).await?;
    info!("✨ Storage initialized successfully (using {})", cli.storage);

    let inference_config = cli.inference_config();

    match &cli.command {
        Commands::Generate { interval } => {
            let generator = create_model(&inference_config)?;
            let args = GeneratorArgs {
                command: GeneratorCommands::Run,
            };

            if let Some(interval) = interval {
                info!("Running in periodic mode with {}s interval", interval.0.as_secs());
                loop {
                    info!("Starting generation cycle");
                    if let Err(e) =
                        handle_command(args.clone(), storage.clone(), generator.clone(), config.clone()).await
                    {
                        error!("Error during generation: {}", e);
                    }
                    info!("Waiting {}s before next cycle", interval.0.as_secs());
                    tokio::time::sleep(interval.0).await;
                }
            } else {
                handle_command(args, storage, generator, config).await?;
            }
        }
        Commands::Serve { addr } => {
            let batch_generator = match create_model(&inference_config) {
                Ok(generator) => Some(generator),
                Err(Error::Configuration(reason)) => {
                    info!("Batch generation disabled: {}", reason);
                    None
                }
                Err(e) => return Err(e),
            };
            let state = AppState {
                storage,
                article_generator: create_model_or_demo(&inference_config)?,
                batch_generator,
                config,
            };
            ng_web::serve(state, addr).await?;
        }
        Commands::List { category, limit } => {
            let category = category.as_deref().map(Category::new);
            for article in storage.list_articles(category.as_ref(), *limit).await? {
                println!(
                    "#{:<5} {} [{}] {} ({} words, {} views)",
                    article.id,
                    article.created_at.format("%Y-%m-%d %H:%M"),
                    article.category,
                    article.title,
                    article.word_count,
                    article.view_count
                );
            }
        }
        Commands::Categories => {
            let args = GeneratorArgs {
                command: GeneratorCommands::Categories,
            };
            handle_command(args, storage, create_model_or_demo(&inference_config)?, config).await?;
        }
        Commands::Logs { limit } => {
            let args = GeneratorArgs {
                command: GeneratorCommands::Logs { limit: *limit },
            };
            handle_command(args, storage, create_model_or_demo(&inference_config)?, config).await?;
        }
    }

    Ok(())
}
