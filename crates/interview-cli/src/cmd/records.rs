use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use interview_session::{InterviewStateRecord, InterviewStateResponse, StepContent};

use super::i18n::tr_key;
use super::{SessionArgs, load_config, open_store};

#[derive(Args, Debug, Clone)]
pub struct RecordsArgs {
    /// Emit the listing as JSON
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Pending,
    Question,
    Exit,
    Complete,
}

impl RecordStatus {
    pub fn of(response: &InterviewStateResponse) -> Self {
        match response {
            InterviewStateResponse::Complete(_) => RecordStatus::Complete,
            InterviewStateResponse::Incomplete(step) => match &step.content {
                None => RecordStatus::Pending,
                Some(StepContent::Question(_)) => RecordStatus::Question,
                Some(StepContent::Exit(_)) => RecordStatus::Exit,
            },
        }
    }

    fn label(self) -> String {
        match self {
            RecordStatus::Pending => tr_key("cli.records.status.pending"),
            RecordStatus::Question => tr_key("cli.records.status.question"),
            RecordStatus::Exit => tr_key("cli.records.status.exit"),
            RecordStatus::Complete => tr_key("cli.records.status.complete"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecordSummary {
    pub id: String,
    pub status: RecordStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

pub fn run(args: RecordsArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path, &args.session)?;
    let store = open_store(&config)?;
    let summaries = store
        .records()
        .map(|record| summarize(store.record_id(record), record))
        .collect::<Vec<_>>();

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summaries).context("failed to encode records")?
        );
        return Ok(());
    }
    if summaries.is_empty() {
        println!("{}", tr_key("cli.records.empty"));
        return Ok(());
    }
    for summary in &summaries {
        println!("{}", summary_line(summary));
    }
    Ok(())
}

pub fn summarize(id: String, record: &InterviewStateRecord) -> RecordSummary {
    RecordSummary {
        id,
        status: RecordStatus::of(&record.response),
        title: record
            .response
            .content()
            .and_then(StepContent::title)
            .map(str::to_string),
    }
}

fn summary_line(summary: &RecordSummary) -> String {
    match &summary.title {
        Some(title) => format!("{}  {}  {title}", summary.id, summary.status.label()),
        None => format!("{}  {}", summary.id, summary.status.label()),
    }
}
