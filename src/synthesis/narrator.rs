use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::SynthesisConfig;
use crate::survey::{SourceFile, StaticAnalysis};

use super::prompts::{self, Excerpts};
use super::{GenerationRequest, SynthesisError, TextGenerator};

/// Upper bound on files sent for a similarity verdict per analysis.
pub const MAX_PLAGIARISM_FILES: usize = 10;

/// Similarity verdict for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlagiarismResult {
    pub file: String,
    pub result: String,
}

/// Generated text of one analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NarrativeBundle {
    pub summary: String,
    pub plagiarism_results: Vec<PlagiarismResult>,
}

/// Turns survey output into prompts and collects the generated text.
pub struct Narrator {
    generator: Arc<dyn TextGenerator>,
    model: String,
    timeout: Duration,
    concurrency: usize,
}

impl Narrator {
    pub fn new(generator: Arc<dyn TextGenerator>, config: &SynthesisConfig) -> Self {
        Self {
            generator,
            model: config.model.clone(),
            timeout: config.timeout(),
            concurrency: config.similarity_concurrency.max(1),
        }
    }

    async fn call(&self, system_instruction: &str, prompt: String) -> Result<String, SynthesisError> {
        let request = GenerationRequest {
            model: self.model.clone(),
            system_instruction: system_instruction.to_string(),
            parts: vec![prompt],
        };

        tokio::time::timeout(self.timeout, self.generator.generate(request))
            .await
            .map_err(|_| SynthesisError::Timeout {
                seconds: self.timeout.as_secs(),
            })?
    }

    /// Generates the project summary.
    ///
    /// # Errors
    ///
    /// Any backend failure is returned; the summary is the primary deliverable.
    pub async fn summarize(
        &self,
        readme: &str,
        analysis: &StaticAnalysis,
        excerpts: &Excerpts,
    ) -> Result<String, SynthesisError> {
        let prompt = prompts::summary_prompt(readme, analysis, excerpts);
        debug!("Summary prompt is {} bytes", prompt.len());

        self.call(prompts::SUMMARY_SYSTEM_INSTRUCTION, prompt).await
    }

    /// Asks for a similarity verdict on the first `MAX_PLAGIARISM_FILES` files.
    ///
    /// Results keep the order of `files`. Files that cannot be read and
    /// prompts that fail are left out.
    pub async fn check_similarity(&self, files: &[SourceFile]) -> Vec<PlagiarismResult> {
        // Collected up front so the stream holds futures, not a borrowing closure.
        let checks: Vec<_> = files
            .iter()
            .take(MAX_PLAGIARISM_FILES)
            .map(|file| self.check_file(file))
            .collect();

        let results: Vec<PlagiarismResult> = stream::iter(checks)
            .buffered(self.concurrency)
            .filter_map(|result| async move { result })
            .collect()
            .await;

        info!(
            "Collected {} similarity verdicts from {} candidate files",
            results.len(),
            files.len().min(MAX_PLAGIARISM_FILES)
        );

        results
    }

    async fn check_file(&self, file: &SourceFile) -> Option<PlagiarismResult> {
        let code = match tokio::fs::read_to_string(&file.path).await {
            Ok(code) => code,
            Err(e) => {
                debug!("Skipping similarity check for {}: {e}", file.relative);
                return None;
            }
        };

        let prompt = prompts::similarity_prompt(&file.relative, &code);
        match self.call(prompts::SIMILARITY_SYSTEM_INSTRUCTION, prompt).await {
            Ok(result) => Some(PlagiarismResult {
                file: file.relative.clone(),
                result,
            }),
            Err(e) => {
                warn!("Similarity check failed for {}: {e}", file.relative);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Replies with the file name found in the prompt, failing for names in `fail_on`.
    #[derive(Default)]
    struct EchoGenerator {
        fail_on: HashSet<String>,
        delay: Option<Duration>,
        requests: Mutex<Vec<GenerationRequest>>,
    }

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        async fn generate(&self, request: GenerationRequest) -> Result<String, SynthesisError> {
            self.requests.lock().unwrap().push(request.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            let prompt = &request.parts[0];
            let file = prompt
                .lines()
                .find_map(|line| line.strip_prefix("File: "))
                .unwrap_or("summary")
                .to_string();

            if self.fail_on.contains(&file) {
                return Err(SynthesisError::RateLimited("quota".to_string()));
            }
            Ok(format!("verdict for {file}"))
        }
    }

    fn sources(dir: &Path, count: usize) -> Vec<SourceFile> {
        (0..count)
            .map(|i| {
                let relative = format!("src/file{i:02}.js");
                let path = dir.join(format!("file{i:02}.js"));
                std::fs::write(&path, format!("console.log({i});\n")).unwrap();
                SourceFile { path, relative }
            })
            .collect()
    }

    fn narrator(generator: Arc<EchoGenerator>, timeout_secs: u64) -> Narrator {
        let config = SynthesisConfig {
            timeout_secs,
            similarity_concurrency: 4,
            ..SynthesisConfig::default()
        };
        Narrator::new(generator, &config)
    }

    #[tokio::test]
    async fn test_similarity_is_capped_and_ordered() {
        let dir = TempDir::new().unwrap();
        let files = sources(dir.path(), 25);
        let generator = Arc::new(EchoGenerator::default());

        let results = narrator(generator.clone(), 30).check_similarity(&files).await;

        assert_eq!(results.len(), MAX_PLAGIARISM_FILES);
        assert_eq!(generator.requests.lock().unwrap().len(), MAX_PLAGIARISM_FILES);
        let order: Vec<_> = results.iter().map(|r| r.file.clone()).collect();
        let expected: Vec<_> = files
            .iter()
            .take(MAX_PLAGIARISM_FILES)
            .map(|f| f.relative.clone())
            .collect();
        assert_eq!(order, expected);
        assert_eq!(results[0].result, "verdict for src/file00.js");
    }

    #[tokio::test]
    async fn test_failed_checks_are_omitted() {
        let dir = TempDir::new().unwrap();
        let mut files = sources(dir.path(), 3);
        files.push(SourceFile {
            path: dir.path().join("gone.js"),
            relative: "src/gone.js".to_string(),
        });
        let generator = Arc::new(EchoGenerator {
            fail_on: HashSet::from(["src/file01.js".to_string()]),
            ..EchoGenerator::default()
        });

        let results = narrator(generator, 30).check_similarity(&files).await;

        let order: Vec<_> = results.iter().map(|r| r.file.as_str()).collect();
        assert_eq!(order, vec!["src/file00.js", "src/file02.js"]);
    }

    #[tokio::test]
    async fn test_summary_uses_model_and_system_instruction() {
        let generator = Arc::new(EchoGenerator::default());
        let summary = narrator(generator.clone(), 30)
            .summarize("# Readme", &StaticAnalysis::default(), &Excerpts::default())
            .await
            .unwrap();

        assert_eq!(summary, "verdict for summary");
        let requests = generator.requests.lock().unwrap();
        assert_eq!(requests[0].model, "gemini-2.5-flash");
        assert_eq!(requests[0].system_instruction, prompts::SUMMARY_SYSTEM_INSTRUCTION);
        assert!(requests[0].parts[0].contains("# Readme"));
    }

    #[tokio::test]
    async fn test_summary_timeout() {
        let generator = Arc::new(EchoGenerator {
            delay: Some(Duration::from_secs(600)),
            ..EchoGenerator::default()
        });

        let err = narrator(generator, 1)
            .summarize("# Readme", &StaticAnalysis::default(), &Excerpts::default())
            .await
            .unwrap_err();

        assert!(matches!(err, SynthesisError::Timeout { seconds: 1 }));
    }
}
