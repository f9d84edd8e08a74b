pub mod cli;
pub mod logging;
pub mod orchestrator;
pub mod throttle;

pub use cli::{handle_command, GeneratorArgs, GeneratorCommands};
pub use logging::{init_logging, Logger};
pub use orchestrator::{BatchOrchestrator, BatchReport, CategoryOutcome, Outcome};

pub mod prelude {
    pub use super::orchestrator::{BatchOrchestrator, BatchReport, Outcome};
    pub use ng_core::{ArticleGenerator, ArticleStorage, GeneratorConfig, Result, Error};
}
