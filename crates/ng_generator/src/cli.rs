use clap::{Args, Subcommand};
use ng_core::{ArticleGenerator, ArticleStorage, GeneratorConfig, Result};
use std::sync::Arc;
use crate::orchestrator::{BatchOrchestrator, BatchReport, Outcome};

#[derive(Args, Debug, Clone)]
pub struct GeneratorArgs {
    #[command(subcommand)]
    pub command: GeneratorCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum GeneratorCommands {
    /// Run one batch generation over every configured category
    Run,
    /// List the configured categories
    Categories,
    /// Show the most recent generation log entries
    Logs {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

pub async fn handle_command(
    args: GeneratorArgs,
    storage: Arc<dyn ArticleStorage>,
    generator: Arc<dyn ArticleGenerator>,
    config: GeneratorConfig,
) -> Result<()> {
    match args.command {
        GeneratorCommands::Run => {
            let orchestrator = BatchOrchestrator::new(storage, generator, config)?;
            let report = orchestrator.run().await;
            print_report(&report);
        }
        GeneratorCommands::Categories => {
            println!("Configured categories:");
            for category in &config.categories {
                println!("  {}", category);
            }
        }
        GeneratorCommands::Logs { limit } => {
            for entry in storage.recent_logs(limit).await? {
                println!(
                    "{} {:<14} {:<7} {}",
                    entry.created_at.format("%Y-%m-%d %H:%M:%S"),
                    entry.category.as_str(),
                    entry.status.as_str(),
                    entry.error_message.unwrap_or_default()
                );
            }
        }
    }
    Ok(())
}

pub fn print_report(report: &BatchReport) {
    for result in &report.results {
        let line = match &result.outcome {
            Outcome::Success { article_id, word_count } => {
                format!("🆕 article #{} ({} words)", article_id, word_count)
            }
            Outcome::Skipped { message } => format!("⏭️ {}", message),
            Outcome::Error { message } => format!("❌ {}", message),
            Outcome::Failed { message } => format!("♻️ {}", message),
        };
        println!("{:<14} {}", result.category.as_str(), line);
    }
    println!("Generated {} article(s)", report.generated);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ng_inference::models::DemoModel;
    use ng_storage::InMemoryStorage;

    #[tokio::test]
    async fn test_run_command_stores_demo_articles() {
        let storage = Arc::new(InMemoryStorage::new());
        let args = GeneratorArgs {
            command: GeneratorCommands::Run,
        };

        handle_command(args, storage.clone(), Arc::new(DemoModel::new()), GeneratorConfig::default())
            .await
            .unwrap();

        let articles = storage.list_articles(None, 100).await.unwrap();
        assert_eq!(articles.len(), 5);
        assert_eq!(storage.recent_logs(100).await.unwrap().len(), 5);
    }
}
