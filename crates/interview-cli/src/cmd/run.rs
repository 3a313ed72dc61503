use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Args;
use serde_json::Value;
use tracing::{debug, info, warn};

use interview_fields::{Button, FieldRegistry, FormState, SubmitError, default_button};
use interview_session::{
    InterviewStateRecord, InterviewStateResponse, InterviewStateStore, Metadata, QuestionContent,
    StepContent,
};

use super::i18n::{tr_key, trf};
use super::{SessionArgs, load_config, open_store, read_json_input};
use crate::render::{RendererRegistry, Terminal, natural_cmp};

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Initial interview state response (JSON file, or - for stdin)
    #[arg(value_name = "RESPONSE_JSON")]
    pub response: String,
    /// Metadata attached to every record (repeatable)
    #[arg(long = "meta", value_name = "KEY=VALUE")]
    pub meta: Vec<String>,
    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ResumeArgs {
    /// Id of a saved record (see `interview records`)
    #[arg(value_name = "RECORD_ID")]
    pub id: String,
    #[command(flatten)]
    pub session: SessionArgs,
}

pub fn run(args: RunArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path, &args.session)?;
    let response: InterviewStateResponse = read_json_input(&args.response)?;
    let metadata = parse_meta(&args.meta)?;
    let mut store = open_store(&config)?;
    let mut terminal = Terminal::stdio();
    let renderers = RendererRegistry::with_defaults();
    let fields = FieldRegistry::with_defaults();

    runtime()?.block_on(async {
        let record = store.start_interview(response, Some(metadata)).await?;
        terminal.say(&trf("cli.run.record", &[&store.record_id(&record)]))?;
        play(&mut store, record, &mut terminal, &renderers, &fields).await?;
        Ok::<_, anyhow::Error>(())
    })
}

pub fn resume(args: ResumeArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path, &args.session)?;
    let mut store = open_store(&config)?;
    let record = store
        .get_record(&args.id)
        .cloned()
        .with_context(|| trf("cli.error.record_not_found", &[&args.id]))?;
    let mut terminal = Terminal::stdio();
    let renderers = RendererRegistry::with_defaults();
    let fields = FieldRegistry::with_defaults();

    info!(id = %args.id, "resuming interview");
    runtime()?.block_on(async {
        play(&mut store, record, &mut terminal, &renderers, &fields).await?;
        Ok::<_, anyhow::Error>(())
    })
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}

/// Parses `KEY=VALUE` pairs. Values are read as JSON, else kept as text.
pub fn parse_meta(pairs: &[String]) -> Result<Metadata> {
    let mut metadata = Metadata::new();
    for pair in pairs {
        let Some((key, raw)) = pair.split_once('=') else {
            bail!("invalid --meta `{pair}`: expected KEY=VALUE");
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("invalid --meta `{pair}`: empty key");
        }
        let value =
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        metadata.insert(key.to_string(), value);
    }
    Ok(metadata)
}

/// Plays steps until an exit step or completion. Returns the last record.
pub async fn play(
    store: &mut InterviewStateStore,
    mut record: InterviewStateRecord,
    terminal: &mut Terminal<'_>,
    renderers: &RendererRegistry,
    fields: &FieldRegistry,
) -> Result<InterviewStateRecord> {
    loop {
        let next = match &record.response {
            InterviewStateResponse::Complete(done) => {
                terminal.say(&trf("cli.run.complete", &[&done.target_url]))?;
                return Ok(record);
            }
            InterviewStateResponse::Incomplete(step) => match &step.content {
                Some(StepContent::Exit(exit)) => {
                    terminal.say(&exit.title)?;
                    if let Some(description) = &exit.description {
                        terminal.say(description)?;
                    }
                    return Ok(record);
                }
                Some(StepContent::Question(question)) => {
                    answer(store, &record, question, terminal, renderers, fields).await?
                }
                None => store.update_interview(&record, None, None).await?,
            },
        };
        record = next;
    }
}

async fn answer(
    store: &mut InterviewStateStore,
    record: &InterviewStateRecord,
    question: &QuestionContent,
    terminal: &mut Terminal<'_>,
    renderers: &RendererRegistry,
    fields: &FieldRegistry,
) -> Result<InterviewStateRecord> {
    let initial = serde_json::to_value(&record.field_values)?;
    let mut form = FormState::create(
        fields,
        &question.fields,
        question.buttons.clone(),
        initial.as_object(),
    )?;
    let mut names = question.fields.keys().cloned().collect::<Vec<_>>();
    names.sort_by(|a, b| natural_cmp(a, b));

    loop {
        if let Some(title) = &question.title {
            terminal.say(title)?;
        }
        if let Some(description) = &question.description {
            terminal.say(description)?;
        }
        for name in &names {
            let Some(state) = form.field_mut(name) else {
                continue;
            };
            renderers.render(terminal, name, state)?;
        }
        if let Some(buttons) = form.buttons().filter(|buttons| !buttons.is_empty()) {
            let choice = choose_button(terminal, buttons)?;
            form.set_button(Some(choice));
        }

        let session = &mut *store;
        let outcome = form
            .submit(|submission| async move {
                let mut answered = record.clone();
                answered.field_values = submission.values.clone();
                session.save_record(answered);
                session
                    .update_interview(record, Some(submission.values), submission.button)
                    .await
            })
            .await;
        match outcome {
            Ok(next) => return Ok(next),
            Err(SubmitError::Refused(reason)) => {
                debug!(%reason, "submission refused");
            }
            Err(SubmitError::Failed(err)) if err.is_recoverable() => {
                warn!(error = %err, "server rejected the answers");
                terminal.say(&trf("cli.run.rejected", &[&err.to_string()]))?;
            }
            Err(SubmitError::Failed(err)) => return Err(err.into()),
        }
    }
}

fn choose_button(terminal: &mut Terminal<'_>, buttons: &[Button]) -> Result<usize> {
    for (idx, button) in buttons.iter().enumerate() {
        terminal.say(&format!("  {}. {}", idx + 1, button.label))?;
    }
    let default = default_button(buttons);
    let prompt = match default {
        Some(idx) => format!("{} [{}]: ", tr_key("cli.run.choose_button"), idx + 1),
        None => format!("{}: ", tr_key("cli.run.choose_button")),
    };
    loop {
        let line = terminal.ask(&prompt)?;
        if line.is_empty()
            && let Some(idx) = default
        {
            return Ok(idx);
        }
        match line.parse::<usize>() {
            Ok(n) if (1..=buttons.len()).contains(&n) => return Ok(n - 1),
            _ => terminal.say(&tr_key("cli.prompt.invalid_choice"))?,
        }
    }
}
