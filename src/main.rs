use std::path::PathBuf;
use std::process::ExitCode;

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use toolcall_probe::command::{FormField, ShellInput, HELP};
use toolcall_probe::config_store::{ConfigStore, FileStorage};
use toolcall_probe::render::{render_configs, render_form, TerminalRenderer};
use toolcall_probe::session::Outcome;
use toolcall_probe::{
    Command as Action, DefaultChange, HttpTransport, Orchestrator, RunOutcome, Scenario, Session,
    SystemDefaults, UiEffects,
};

#[derive(Debug, Parser)]
#[command(
    name = "toolcall-probe",
    version,
    about = "Exercise LLM tool calling against OpenAI-compatible, Anthropic and Gemini endpoints"
)]
struct Cli {
    /// Directory holding saved configurations.
    #[arg(long, env = "TOOLCALL_PROBE_CONFIG_DIR", global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Run one scenario and print every request and response.
    Run {
        #[arg(long, short, default_value = "openai_tools")]
        scenario: Scenario,
        /// Base URL; overrides the stored default.
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        key: Option<String>,
        #[arg(long)]
        model: Option<String>,
        /// User message; defaults to the scenario's sample question.
        #[arg(long, short)]
        message: Option<String>,
    },
    /// List saved configurations.
    Configs,
    /// Interactive shell (default).
    Shell,
}

struct TerminalEffects;

#[async_trait]
impl UiEffects for TerminalEffects {
    async fn alert(&self, message: &str) {
        eprintln!("! {message}");
    }
}

type CliSession = Session<FileStorage, HttpTransport>;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    let dir = cli
        .config_dir
        .or_else(FileStorage::default_dir)
        .ok_or_else(|| anyhow::anyhow!("no config directory available; pass --config-dir"))?;
    let defaults = SystemDefaults::from_env();
    let store = ConfigStore::new(FileStorage::new(dir), defaults.model.clone());

    match cli.command.unwrap_or(Cmd::Shell) {
        Cmd::Configs => {
            println!("{}", render_configs(&store.load_all()));
            Ok(ExitCode::SUCCESS)
        }
        Cmd::Run {
            scenario,
            url,
            key,
            model,
            message,
        } => {
            let mut session = new_session(store, defaults);
            session.dispatch(Action::SelectScenario(scenario)).await?;
            let overrides = [(FormField::Url, url), (FormField::Key, key), (FormField::Model, model)];
            for (field, value) in overrides {
                if let Some(value) = value {
                    session.dispatch(Action::SetField(field, value)).await?;
                }
            }
            let outcome = session.dispatch(Action::Submit(message)).await?;
            Ok(match outcome {
                Outcome::Ran(RunOutcome::Failed(_)) | Outcome::Rejected(_) => ExitCode::FAILURE,
                _ => ExitCode::SUCCESS,
            })
        }
        Cmd::Shell => {
            let mut session = new_session(store, defaults);
            shell(&mut session).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn new_session(store: ConfigStore<FileStorage>, defaults: SystemDefaults) -> CliSession {
    let mut session = Session::new(
        store,
        Orchestrator::new(HttpTransport::new()),
        defaults,
        TerminalEffects,
    );
    session
        .transcript
        .add_listener(TerminalRenderer::new(std::io::stdout()));
    session
}

async fn shell(session: &mut CliSession) -> anyhow::Result<()> {
    println!("toolcall-probe shell, type 'help' for commands\n");
    println!(
        "{}\n",
        render_form(&session.form, &session.user_input, session.scenario.id())
    );
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = match ShellInput::parse(&line) {
            Ok(input) => input,
            Err(e) => {
                eprintln!("! {e}");
                continue;
            }
        };
        match input {
            ShellInput::Empty => {}
            ShellInput::Quit => break,
            ShellInput::Help => println!("{HELP}"),
            ShellInput::Show => println!(
                "{}",
                render_form(&session.form, &session.user_input, session.scenario.id())
            ),
            ShellInput::ListConfigs => println!("{}", render_configs(&session.store().load_all())),
            ShellInput::Action(action) => match session.dispatch(action).await {
                Ok(outcome) => report(session, &outcome),
                Err(e) => eprintln!("! {e}"),
            },
        }
    }
    Ok(())
}

fn report(session: &CliSession, outcome: &Outcome) {
    match outcome {
        Outcome::Ran(RunOutcome::Completed { .. }) => println!("run finished"),
        Outcome::Ran(RunOutcome::NoInvocation) => println!("run finished without a tool call"),
        Outcome::Ran(RunOutcome::Failed(_)) => println!("run failed"),
        Outcome::ScenarioSelected(s) => println!("scenario {s}, message: {}", session.user_input),
        Outcome::Cleared => println!("transcript cleared"),
        Outcome::FieldSet(_) | Outcome::Rejected(_) => {}
        Outcome::Editing(cfg) => println!(
            "editing '{}' ({}); 'save ...' to update it, 'cancel' to stop",
            cfg.name, cfg.url
        ),
        Outcome::EditCancelled => println!("edit cancelled"),
        Outcome::Saved(i) => println!("configuration {i} saved"),
        Outcome::DeleteArmed(i) => println!("type 'delete {i}' again within 2.5s to confirm"),
        Outcome::Deleted(cfg) => println!("deleted '{}'", cfg.name),
        Outcome::DefaultChanged(DefaultChange::Set(i)) => println!("configuration {i} is now the default"),
        Outcome::DefaultChanged(DefaultChange::Cleared) => println!("no default configuration"),
        Outcome::Applied(i) => println!(
            "configuration {i} loaded\n{}",
            render_form(&session.form, &session.user_input, session.scenario.id())
        ),
    }
}

fn init_tracing() {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(v) => v,
        Err(_) => EnvFilter::new("warn,toolcall_probe=info"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
