//! Text translation trait

use crate::Result;
use async_trait::async_trait;

/// Text-to-text translation interface
///
/// The source language is always auto-detected by the backend; callers
/// only name the target. The target is a plain code rather than
/// [`Language`](crate::Language) so that errors for unsupported targets
/// surface from the backend tagged with the code that was asked for.
#[async_trait]
pub trait TextTranslator: Send + Sync + 'static {
    /// Translate `text` into the language named by `target` (ISO code)
    ///
    /// # Returns
    /// The translated text. Failures carry the target code so callers can
    /// attribute the error without extra bookkeeping.
    async fn translate(&self, text: &str, target: &str) -> Result<String>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    struct MockTranslator;

    #[async_trait]
    impl TextTranslator for MockTranslator {
        async fn translate(&self, text: &str, target: &str) -> Result<String> {
            if target == "fr" {
                return Err(PipelineError::Translation {
                    language: target.to_string(),
                    message: "unsupported target".to_string(),
                });
            }
            Ok(format!("[{}] {}", target, text))
        }

        fn backend_name(&self) -> &'static str {
            "mock-translate"
        }
    }

    #[tokio::test]
    async fn test_failure_carries_target_code() {
        let translator: Box<dyn TextTranslator> = Box::new(MockTranslator);

        let ok = translator.translate("hello", "hi").await.unwrap();
        assert_eq!(ok, "[hi] hello");

        let err = translator.translate("hello", "fr").await.unwrap_err();
        match err {
            PipelineError::Translation { language, .. } => assert_eq!(language, "fr"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
