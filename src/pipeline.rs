//! End-to-end repository analysis.
//!
//! `Pipeline::analyze` resolves the identifier, fetches the README, then
//! fetches metadata while cloning, surveys the clone, asks the text backend
//! for a summary and similarity verdicts, and assembles the report. The clone
//! is removed on every path out of `analyze` once it exists.

use log::{debug, info};
use std::sync::Arc;

use crate::config::{Config, SynthesisConfig};
use crate::error::{RepoLensError, Result};
use crate::github::{GitHubClient, MetadataSource};
use crate::output::PhaseProgress;
use crate::reference::RepositoryRef;
use crate::report::AnalysisReport;
use crate::snapshot::{GitCloner, SnapshotProvider};
use crate::survey;
use crate::synthesis::{Excerpts, GeminiClient, NarrativeBundle, Narrator, TextGenerator};

/// Knobs that are not owned by any single collaborator.
#[derive(Debug, Clone, Default)]
pub struct PipelineSettings {
    pub synthesis: SynthesisConfig,
    /// Draw phase spinners on stderr
    pub show_progress: bool,
}

/// Repository analysis pipeline over injectable collaborators.
pub struct Pipeline {
    metadata: Arc<dyn MetadataSource>,
    snapshots: Arc<dyn SnapshotProvider>,
    narrator: Narrator,
    show_progress: bool,
}

impl Pipeline {
    pub fn new(
        metadata: Arc<dyn MetadataSource>,
        snapshots: Arc<dyn SnapshotProvider>,
        generator: Arc<dyn TextGenerator>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            metadata,
            snapshots,
            narrator: Narrator::new(generator, &settings.synthesis),
            show_progress: settings.show_progress,
        }
    }

    /// Builds a pipeline backed by GitHub, `git` and Gemini.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a client cannot be created, for
    /// example when no Gemini API key is set.
    pub fn from_config(config: &Config, show_progress: bool) -> Result<Self> {
        let github = GitHubClient::new(&config.github)?;
        let cloner = GitCloner::new(&config.snapshot, &config.github.web_url);
        let gemini = GeminiClient::new(&config.synthesis)
            .map_err(|e| RepoLensError::Config(e.to_string()))?;

        Ok(Self::new(
            Arc::new(github),
            Arc::new(cloner),
            Arc::new(gemini),
            PipelineSettings {
                synthesis: config.synthesis.clone(),
                show_progress,
            },
        ))
    }

    /// Analyzes the repository named by `identifier`.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidReference`, `ReadmeNotFound`, `CloneFailed` or a
    /// synthesis error on the summary call. Metadata failures and per-file
    /// similarity failures degrade the report instead.
    pub async fn analyze(&self, identifier: &str) -> Result<AnalysisReport> {
        let repo = RepositoryRef::parse(identifier)?;
        info!("Analyzing repository {repo}");

        let readme = self
            .metadata
            .fetch_readme(&repo)
            .await
            .ok_or_else(|| RepoLensError::ReadmeNotFound(repo.slug()))?;
        debug!("README for {repo} is {} bytes", readme.len());

        let mut progress = PhaseProgress::start(self.show_progress);
        let result = self.run(&repo, &readme, &mut progress).await;
        match &result {
            Ok(_) => progress.finish(),
            Err(e) => progress.fail(&e.to_string()),
        }

        result
    }

    async fn run(
        &self,
        repo: &RepositoryRef,
        readme: &str,
        progress: &mut PhaseProgress,
    ) -> Result<AnalysisReport> {
        let (metadata, snapshot) = tokio::join!(
            self.metadata.fetch_metadata(repo),
            self.snapshots.acquire(repo)
        );
        let snapshot = snapshot?;
        progress.advance();

        let root = snapshot.root().to_path_buf();
        let (survey, excerpts) = tokio::task::spawn_blocking(move || {
            let survey = survey::survey(&root);
            let excerpts = Excerpts::collect(&survey.classification);
            (survey, excerpts)
        })
        .await?;
        progress.advance();

        let summary = self
            .narrator
            .summarize(readme, &survey.analysis, &excerpts)
            .await?;
        progress.advance();

        let plagiarism_results = self
            .narrator
            .check_similarity(&survey.classification.code_files)
            .await;

        snapshot.release_blocking().await;
        info!("Analysis of {repo} complete");

        Ok(AnalysisReport::assemble(
            metadata,
            NarrativeBundle {
                summary,
                plagiarism_results,
            },
        ))
    }
}
