//! Instruction template for title translation.
//!
//! The template is data: register, date and timezone rules live in
//! `config/prompts/title_translation.md` and can be replaced per deployment.

use std::path::Path;

use crate::config::{ConfigResult, ConfigurationError, TranslationConfig};

const BUILTIN_TEMPLATE: &str = include_str!("../../config/prompts/title_translation.md");

const BUILTIN_SYSTEM_MESSAGE: &str = "너는 전문 번역가야. 반드시 반말로 번역해. \
존댓말(~할까요, ~될까요)은 절대 쓰지 말고 반말(~할까, ~될까, ~인가)만 써.";

/// Header between the instructions and the numbered list
const LIST_HEADER: &str = "번역할 제목들:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    instructions: String,
    system_message: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PromptTemplate {
    pub fn builtin() -> Self {
        Self::new(BUILTIN_TEMPLATE, BUILTIN_SYSTEM_MESSAGE)
    }

    pub fn new<I: Into<String>, S: Into<String>>(instructions: I, system_message: S) -> Self {
        Self {
            instructions: instructions.into().trim().to_string(),
            system_message: system_message.into().trim().to_string(),
        }
    }

    /// Built-in template with the configured overrides applied.
    ///
    /// A relative `prompt_file` is resolved against `config_dir`.
    pub fn from_config(config: &TranslationConfig, config_dir: &Path) -> ConfigResult<Self> {
        let instructions = match &config.prompt_file {
            Some(path) => {
                let path = if path.is_absolute() {
                    path.clone()
                } else {
                    config_dir.join(path)
                };
                let content = std::fs::read_to_string(&path)
                    .map_err(|e| ConfigurationError::file_read_error(path.display().to_string(), e))?;
                if content.trim().is_empty() {
                    return Err(ConfigurationError::invalid_value(
                        "translation.prompt_file",
                        path.display().to_string(),
                        "prompt file is empty",
                    ));
                }
                content
            }
            None => BUILTIN_TEMPLATE.to_string(),
        };
        let system_message = config
            .system_prompt
            .clone()
            .unwrap_or_else(|| BUILTIN_SYSTEM_MESSAGE.to_string());

        Ok(Self::new(instructions, system_message))
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn system_message(&self) -> &str {
        &self.system_message
    }

    /// Instructions, a blank line, the list header, then `1. <title>` per line
    pub fn render<S: AsRef<str>>(&self, titles: &[S]) -> String {
        let numbered = numbered_list(titles);
        format!("{}\n\n{LIST_HEADER}\n{numbered}", self.instructions)
    }
}

/// 1-based numbered list; newlines inside a title would break alignment
pub fn numbered_list<S: AsRef<str>>(titles: &[S]) -> String {
    titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            let single_line = title.as_ref().replace(['\r', '\n'], " ");
            format!("{}. {}", i + 1, single_line.trim())
        })
        .collect::<Vec<_>>()
        .join("\n")
}
