//! Prompt construction and response unwrapping for article generation.

use ng_core::{Category, Error, GeneratedArticle, Result};

pub const SYSTEM_PROMPT: &str =
    "Ты профессиональный журналист, пишущий длинные аналитические статьи.";

/// The user message: novelty against `recent_titles`, length target, structure and the JSON contract.
/// Every supplied title is listed; callers choose the window.
pub fn user_prompt(category: &Category, recent_titles: &[String]) -> String {
    let avoided = recent_titles
        .iter()
        .map(|title| format!("- {}", title))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Создай уникальную новостную статью на русском языке для категории "{category}".

ВАЖНО: Не повторяй эти темы:
{avoided}

Требования:
- Статья должна быть на 5000+ слов
- Тема должна быть актуальной и интересной
- Используй реальные технологии/компании/события
- Структура: введение, основная часть с подзаголовками, заключение
- Пиши профессионально, как журналист топового издания

Верни только один JSON-объект без пояснений:
{{
  "title": "Заголовок новости",
  "content": "Полный текст статьи 5000+ слов"
}}"#
    )
}

/// Drop surrounding whitespace and markdown code fences the model likes to add.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

pub fn parse_article_payload(raw: &str) -> Result<GeneratedArticle> {
    let article: GeneratedArticle = serde_json::from_str(strip_code_fences(raw))
        .map_err(|e| Error::Parse(format!("Invalid article payload: {}", e)))?;
    if article.title.trim().is_empty() {
        return Err(Error::Parse("Article payload has an empty title".to_string()));
    }
    Ok(article)
}
