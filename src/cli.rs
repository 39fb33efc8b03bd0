use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::config::{Config, OutputFormat};
use crate::output;
use crate::pipeline::Pipeline;
use crate::server;

#[derive(Parser)]
#[command(name = "repolens")]
#[command(author, version, about = "GitHub Repository Analyzer", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,

    /// Configuration file (defaults to ./repolens.{toml,json,yaml,yml})
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one GitHub repository
    Analyze {
        /// Repository URL or identifier, e.g. https://github.com/owner/name
        repo: String,

        #[arg(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,

        #[arg(short = 'k', long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        #[arg(short, long)]
        model: Option<String>,

        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Serve `POST /api/analyze` over HTTP
    Serve {
        #[arg(short, long, default_value = "127.0.0.1:5000")]
        bind: SocketAddr,

        #[arg(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,

        #[arg(short = 'k', long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        #[arg(short, long)]
        model: Option<String>,
    },
}

/// Applies credentials and model given on the command line over file values.
fn apply_overrides(
    config: &mut Config,
    token: &Option<String>,
    api_key: &Option<String>,
    model: &Option<String>,
) {
    if let Some(token) = token {
        config.github.token = Some(token.clone());
    }
    if let Some(api_key) = api_key {
        config.synthesis.api_key = Some(api_key.clone());
    }
    if let Some(model) = model {
        config.synthesis.model = model.clone();
    }
}

impl Cli {
    async fn execute_analyze(&self, config: &Config, repo: &str, format: OutputFormat) -> Result<()> {
        info!("Analyzing GitHub repository: {repo}");

        let pipeline = Pipeline::from_config(config, true)?;
        let report = pipeline.analyze(repo).await?;

        let pretty = self.pretty || config.output.pretty;

        if let Some(output_path) = &self.output {
            let rendered = output::render_report(&report, format, pretty)?;
            std::fs::write(output_path, rendered)?;
            info!("Report written to: {}", output_path.display());
        } else if format == OutputFormat::Summary {
            output::print_report(&report);
        } else {
            println!("{}", output::render_report(&report, format, pretty)?);
        }

        Ok(())
    }

    async fn execute_serve(&self, config: &Config, bind: SocketAddr) -> Result<()> {
        let pipeline = Pipeline::from_config(config, false)?;
        server::serve(bind, pipeline).await
    }

    pub async fn execute(&self) -> Result<()> {
        let mut config = Config::load(self.config.as_deref())?;

        match &self.command {
            Commands::Analyze {
                repo,
                token,
                api_key,
                model,
                format,
            } => {
                apply_overrides(&mut config, token, api_key, model);
                let format = format.unwrap_or(config.output.format);
                self.execute_analyze(&config, repo, format).await
            }
            Commands::Serve {
                bind,
                token,
                api_key,
                model,
            } => {
                apply_overrides(&mut config, token, api_key, model);
                self.execute_serve(&config, *bind).await
            }
        }
    }
}
