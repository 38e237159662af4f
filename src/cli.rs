use crate::client::HttpBackend;
use crate::fasta;
use crate::model::{Job, SubmitConfig, SubmitEvent};
use crate::normalize::normalize;
use crate::orchestrator::{self, UiCommand};
use crate::ready::ReadyGate;
use crate::store::{FsStore, StateStore};
use crate::view::{sanitize, TableView};
use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::RngCore;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "seqjob",
    version,
    about = "Submit FASTA payloads to an analysis backend and browse the tabular result"
)]
pub struct Cli {
    /// Base URL of the analysis backend
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    pub base_url: String,

    /// Path of the job-creation endpoint
    #[arg(long, default_value = "/api/jobs/create/")]
    pub create_path: String,

    /// Path the form payload is POSTed to
    #[arg(long, default_value = "/mme_form/")]
    pub submit_path: String,

    /// FASTA file to load into the submission payload (.fa / .fasta)
    #[arg(long, short = 'i')]
    pub input: Option<std::path::PathBuf>,

    /// Literal FASTA text to submit instead of a file
    #[arg(long)]
    pub sequence: Option<String>,

    /// k-mer length forwarded to the backend
    #[arg(long, default_value_t = 8)]
    pub k_mer: u32,

    /// Reference species forwarded to the backend
    #[arg(long, default_value = "human")]
    pub species: String,

    /// Print the normalized result as JSON and exit (no TUI)
    #[arg(long)]
    pub json: bool,

    /// Print a plain-text table and exit (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Skip restoring the cached last result on startup
    #[arg(long)]
    pub no_cache: bool,

    /// How long to wait for the renderer before skipping a render
    #[arg(long, default_value = "5s")]
    pub ready_timeout: humantime::Duration,

    /// Initial rows per page (10, 25, 50 or 100)
    #[arg(long, default_value_t = 10)]
    pub page_size: usize,

    /// Export the rendered table as CSV
    #[arg(long)]
    pub export_csv: Option<std::path::PathBuf>,
}

pub async fn run(args: Cli) -> Result<()> {
    if args.json || args.text {
        return run_one_shot(args).await;
    }

    #[cfg(feature = "tui")]
    {
        crate::tui::run(args).await
    }
    #[cfg(not(feature = "tui"))]
    {
        // Fallback when built without TUI support.
        run_one_shot(args).await
    }
}

/// Random reference attached to each submission for log correlation.
fn gen_client_ref() -> String {
    let mut b = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut b);
    u64::from_le_bytes(b).to_string()
}

/// Build a `SubmitConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> SubmitConfig {
    SubmitConfig {
        base_url: args.base_url.clone(),
        create_path: args.create_path.clone(),
        submit_path: args.submit_path.clone(),
        user_agent: format!("seqjob-cli/{}", env!("CARGO_PKG_VERSION")),
        ready_timeout: args.ready_timeout.into(),
        client_ref: gen_client_ref(),
    }
}

/// Assemble the form field set the backend's submission view expects.
pub fn build_fields(args: &Cli, client_ref: &str, sequence: String) -> Vec<(String, String)> {
    vec![
        ("k_mer".into(), args.k_mer.to_string()),
        ("species".into(), args.species.clone()),
        ("query_fasta".into(), sequence),
        ("client_ref".into(), client_ref.to_string()),
    ]
}

/// Resolve the submission payload from `--input` or `--sequence`.
/// A non-FASTA `--input` is an error so the payload stays unchanged.
pub fn load_sequence(args: &Cli) -> Result<Option<String>> {
    if let Some(path) = args.input.as_deref() {
        return fasta::read_fasta_file(path).map(Some);
    }
    Ok(args
        .sequence
        .clone()
        .filter(|s| !s.trim().is_empty()))
}

/// One-shot mode: run one submission cycle (or a cache restore) against a
/// gate that is already open, print, and exit.
async fn run_one_shot(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let store: Arc<dyn StateStore> = Arc::new(FsStore::new()?);
    let backend = Arc::new(HttpBackend::new(&cfg)?);

    let sequence = load_sequence(&args)?;
    let restore_cache = sequence.is_none() && !args.no_cache;
    if sequence.is_none() && (args.no_cache || store.load_last_result().is_none()) {
        bail!("no FASTA payload given (use --input or --sequence) and no cached result to show");
    }

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<SubmitEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();
    let client_ref = cfg.client_ref.clone();
    let controller = tokio::spawn(orchestrator::run_controller(
        cfg,
        backend,
        store,
        ReadyGate::open(),
        restore_cache,
        event_tx,
        cmd_rx,
    ));

    if let Some(sequence) = sequence {
        cmd_tx
            .send(UiCommand::Submit(build_fields(&args, &client_ref, sequence)))
            .ok();
    }

    let mut outcome: Result<()> = Ok(());
    while let Some(ev) = event_rx.recv().await {
        match ev {
            SubmitEvent::ResultReady { payload, job } => {
                print_result(&args, &payload, job.as_ref())?;
                break;
            }
            SubmitEvent::SubmissionFailed { message } => {
                outcome = Err(anyhow::anyhow!("submission failed: {}", sanitize(&message)));
                break;
            }
            SubmitEvent::Info(info) => eprintln!("{}", info.to_message()),
            SubmitEvent::SubmissionStarted | SubmitEvent::SubmissionFinished => {}
        }
    }

    cmd_tx.send(UiCommand::Quit).ok();
    controller.await.context("controller task failed")??;
    outcome
}

fn print_result(
    args: &Cli,
    payload: &crate::model::ResultPayload,
    job: Option<&Job>,
) -> Result<()> {
    let normalized = normalize(payload);
    let mut view = TableView::new(normalized.clone());
    view.set_page_size(args.page_size);

    if let Some(path) = args.export_csv.as_deref() {
        orchestrator::export_csv(path, &view)?;
        eprintln!("Exported CSV: {}", path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&normalized)?);
        // Identity disclosure follows a completed render.
        if let Some(job) = job {
            eprintln!("Job: {}", job.short_id);
        }
    } else {
        let summary = crate::text_summary::build_text_summary(&view, job);
        for line in summary.lines {
            println!("{line}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("seqjob").chain(argv.iter().copied()))
    }

    #[test]
    fn fields_carry_the_form_contract() {
        let args = parse(&["--k-mer", "9", "--species", "human"]);
        let fields = build_fields(&args, "ref123", ">s\nMK".into());
        assert_eq!(
            fields,
            vec![
                ("k_mer".to_string(), "9".to_string()),
                ("species".to_string(), "human".to_string()),
                ("query_fasta".to_string(), ">s\nMK".to_string()),
                ("client_ref".to_string(), "ref123".to_string()),
            ]
        );
    }

    #[test]
    fn blank_sequence_counts_as_no_payload() {
        let args = parse(&["--sequence", "   "]);
        assert!(load_sequence(&args).unwrap().is_none());

        let args = parse(&["--sequence", ">s\nMK"]);
        assert_eq!(load_sequence(&args).unwrap().as_deref(), Some(">s\nMK"));
    }

    #[test]
    fn config_defaults_match_the_backend_layout() {
        let args = parse(&[]);
        let cfg = build_config(&args);
        assert_eq!(cfg.create_path, "/api/jobs/create/");
        assert_eq!(cfg.submit_path, "/mme_form/");
        assert_eq!(cfg.ready_timeout, std::time::Duration::from_secs(5));
        assert!(!cfg.client_ref.is_empty());
    }
}
