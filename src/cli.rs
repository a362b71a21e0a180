//! Command line interface.
//!
//! Every command reads a page body from stdin and prints one JSON envelope
//! to stdout: `{"ok":true,"data":...}` on success, or
//! `{"ok":false,"error":{"kind":...,"message":...}}` when the page could not
//! be interpreted.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use url::Url;

use crate::embed::{FetchedImage, ImageCache};
use crate::error::{Error, ErrorEnvelope};
use crate::options::Options;
use crate::problem::{assemble, ProblemPage};
use crate::reconcile::Submission;
use crate::status::{parse_status_table, SolutionStatus};
use crate::{dom, form, sanitizer};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// JSON file with `Options` overrides.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract a problem record from a problem page.
    Problem(ProblemArgs),
    /// Sanitize an HTML fragment.
    Sanitize,
    /// Parse a status listing page.
    Status(StatusArgs),
    /// Parse a single-solution status response.
    Verdict(VerdictArgs),
    /// Build the POST fields for a submission from a submit page.
    SubmitForm(SubmitFormArgs),
}

#[derive(Debug, Args)]
pub struct ProblemArgs {
    /// URL the page was fetched from; relative links resolve against it.
    #[arg(long)]
    pub url: String,

    /// Problem id that was requested.
    #[arg(long)]
    pub id: String,
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Maximum rows to return.
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Args)]
pub struct VerdictArgs {
    #[arg(long)]
    pub solution_id: u64,
}

#[derive(Debug, Args)]
pub struct SubmitFormArgs {
    #[arg(long)]
    pub problem_id: String,

    /// Judge language identifier.
    #[arg(long)]
    pub language: String,

    /// File holding the source code.
    #[arg(long)]
    pub source: PathBuf,

    /// Problem index inside a contest.
    #[arg(long)]
    pub contest_problem_id: Option<String>,
}

/// Options from a JSON file, or the defaults.
pub fn load_options(path: Option<&Path>) -> anyhow::Result<Options> {
    let Some(path) = path else {
        return Ok(Options::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse config {}", path.display()))
}

fn data<T: Serialize>(value: &T) -> anyhow::Result<Value> {
    serde_json::to_value(value).context("serialize output")
}

/// Run one command against a page body.
///
/// Errors that are not [`Error`]s (unreadable files, serialization) are
/// returned as is; [`envelope`] turns the rest into output.
pub fn execute(command: &Command, options: &Options, input: &str) -> anyhow::Result<Value> {
    match command {
        Command::Problem(args) => {
            let url = Url::parse(&args.url).map_err(Error::from)?;
            let page = ProblemPage::new(input, url, args.id.as_str());
            // There is no session to fetch protected images with.
            let offline = |_: &str| -> crate::Result<FetchedImage> {
                Err(Error::Transport("no session available".to_string()))
            };
            let options = Options {
                embed_images: false,
                ..options.clone()
            };
            data(&assemble(&page, &offline, &ImageCache::new(), &options))
        }
        Command::Sanitize => data(&sanitizer::sanitize(input)),
        Command::Status(args) => {
            let doc = dom::parse(input);
            data(&parse_status_table(&doc, args.limit)?)
        }
        Command::Verdict(args) => data(&SolutionStatus::parse(args.solution_id, input)?),
        Command::SubmitForm(args) => {
            let source = std::fs::read_to_string(&args.source)
                .with_context(|| format!("read source {}", args.source.display()))?;
            let submission = Submission {
                problem_id: args.problem_id.clone(),
                language: args.language.clone(),
                source,
                contest_problem_id: args.contest_problem_id.clone(),
            };
            let fields = form::prepare_submit_payload(input, &submission)?;
            data(&fields)
        }
    }
}

/// Wrap a command outcome in the output envelope.
///
/// Only library [`Error`]s become `ok: false` envelopes; anything else is
/// handed back for the caller to report.
pub fn envelope(outcome: anyhow::Result<Value>) -> anyhow::Result<Value> {
    match outcome {
        Ok(data) => Ok(json!({ "ok": true, "data": data })),
        Err(err) => match err.downcast_ref::<Error>() {
            Some(error) => Ok(json!({ "ok": false, "error": ErrorEnvelope::from(error) })),
            None => Err(err),
        },
    }
}
