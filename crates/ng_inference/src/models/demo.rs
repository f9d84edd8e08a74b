use ng_core::{ArticleGenerator, Category, GeneratedArticle, Result};
use std::fmt;

const DEMO_REPEAT: usize = 100;

/// Offline stand-in used when no API key is configured.
pub struct DemoModel;

impl fmt::Debug for DemoModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DemoModel").finish()
    }
}

impl DemoModel {
    pub fn new() -> Self {
        Self
    }

    fn headline(category: &Category) -> String {
        match category.as_str() {
            "IT" => "Новая версия Python 3.13 выпущена с улучшенной производительностью",
            "Криптовалюта" => "Bitcoin достиг нового исторического максимума",
            "Игры" => "Анонсирована новая часть популярной игровой франшизы",
            "Финансы" => "Центробанк снизил ключевую ставку на 0.5%",
            "Мир" => "Международный саммит по климату завершился подписанием соглашения",
            other => return format!("Демонстрационная новость: {}", other),
        }
        .to_string()
    }
}

impl Default for DemoModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ArticleGenerator for DemoModel {
    fn name(&self) -> &str {
        "Demo"
    }

    async fn generate(&self, category: &Category, _recent_titles: &[String]) -> Result<GeneratedArticle> {
        let sentence = format!("Это демонстрационная новость для категории {}. ", category);
        Ok(GeneratedArticle {
            title: Self::headline(category),
            content: sentence.repeat(DEMO_REPEAT),
        })
    }
}
