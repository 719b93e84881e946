use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::core::{TestOutcome, Todo, TodoFilter, TodoId, TodoStats};
use crate::engine::{Engine, EngineOptions};
use crate::report::ReportFormat;
use crate::storage::FileStore;
use crate::ui::UiConfig;

const EXIT_CODES_HELP: &str = "\
Exit codes:
  0   success (including requests that changed nothing)
  2   invalid arguments or config
  3   not logged in
  10  any other failure";

#[derive(Debug, Parser)]
#[command(
    name = "todokit",
    version,
    about = "Personal to-do list with username-only login and test run reports",
    after_help = EXIT_CODES_HELP
)]
pub struct Cli {
    #[arg(long, global = true)]
    pub json: bool,
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
    #[arg(long, global = true)]
    pub verbose: bool,
    #[arg(long, global = true)]
    pub quiet: bool,
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Login(LoginArgs),
    Logout,
    Whoami,
    List(ListArgs),
    Add(AddArgs),
    Edit(EditArgs),
    Toggle(IdArgs),
    Rm(IdArgs),
    ClearCompleted,
    Report(ReportArgs),
    Completion(CompletionArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    pub username: String,
    #[arg(long, conflicts_with = "password_stdin")]
    pub password: Option<String>,
    #[arg(long)]
    pub password_stdin: bool,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// all, active or completed
    #[arg(long, default_value_t = TodoFilter::All)]
    pub filter: TodoFilter,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
    pub text: Vec<String>,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    pub id: TodoId,
    #[arg(num_args = 0.., allow_hyphen_values = true)]
    pub text: Vec<String>,
}

#[derive(Debug, Args)]
pub struct IdArgs {
    pub id: TodoId,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[command(subcommand)]
    pub command: ReportCommand,
}

#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    /// Record the built-in sample run.
    Sample,
    /// Append outcome records from a JSON file (`-` for stdin).
    Ingest { input: PathBuf },
    Show,
    /// Write a dated report file.
    Export {
        #[arg(long)]
        format: Option<ReportFormat>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write the `test-report.json` snapshot.
    Save {
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    Clear,
}

#[derive(Debug, Args)]
pub struct CompletionArgs {
    pub shell: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[arg(long)]
    pub show: bool,
}

#[derive(Debug, Serialize)]
struct TodoListJson<'a> {
    username: &'a str,
    filter: TodoFilter,
    stats: TodoStats,
    todos: Vec<&'a Todo>,
}

/// Harness output is either a bare array of records or a previously
/// exported report.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IngestInput {
    Records(Vec<TestOutcome>),
    Report { details: Vec<TestOutcome> },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    crate::logging::init(cli.verbose, cli.quiet);

    let home_dir = home_dir()?;
    let env_config_path = std::env::var_os("TODOKIT_CONFIG").map(PathBuf::from);
    let mut cfg = crate::config::load(
        cli.config.as_deref().or(env_config_path.as_deref()),
        &home_dir,
    )
    .map_err(crate::exit::invalid_args_err)?;
    if let Some(dir) = &cli.data_dir {
        cfg.storage.data_dir = dir.clone();
    }

    let ui_cfg = UiConfig {
        color: io::stdout().is_terminal() && cfg.ui.color && !cli.no_color,
        quiet: cli.quiet,
        verbose: cli.verbose,
    };

    let kv = FileStore::new(cfg.storage.data_dir.clone());
    tracing::debug!(data_dir = %kv.dir().display(), "opening store");
    let mut engine = Engine::restore(
        kv,
        EngineOptions {
            scope_todos_by_user: cfg.storage.scope_todos_by_user,
        },
    );

    match cli.command {
        Commands::Login(args) => {
            let password = if args.password_stdin {
                read_password_line()?
            } else {
                args.password.unwrap_or_default()
            };
            match engine.login(&args.username, &password) {
                Some(session) => {
                    let session = session.clone();
                    if cli.json {
                        write_json(&session)?;
                    } else if !ui_cfg.quiet {
                        println!("Logged in as {}", session.username);
                    }
                }
                None => {
                    crate::ui::print_unchanged("username and password must not be blank", &ui_cfg)
                }
            }
        }
        Commands::Logout => match engine.logout() {
            Some(session) => {
                if !ui_cfg.quiet {
                    println!("Logged out {}", session.username);
                }
            }
            None => crate::ui::print_unchanged("not logged in", &ui_cfg),
        },
        Commands::Whoami => {
            let session = engine.session().ok_or_else(crate::exit::not_logged_in)?;
            if cli.json {
                write_json(session)?;
            } else if !ui_cfg.quiet {
                println!("{}", session.username);
            }
        }
        Commands::List(args) => {
            let username = current_username(&engine)?;
            let todos = engine.todos().ok_or_else(crate::exit::not_logged_in)?;
            if cli.json {
                write_json(&TodoListJson {
                    username: &username,
                    filter: args.filter,
                    stats: todos.stats(),
                    todos: todos.filtered(args.filter).collect(),
                })?;
            } else {
                crate::ui::print_todo_list(&username, todos.todos(), args.filter, &ui_cfg);
            }
        }
        Commands::Add(args) => {
            let todos = engine.todos_mut().ok_or_else(crate::exit::not_logged_in)?;
            let text = args.text.join(" ");
            match todos.add(&text) {
                Some(id) => print_changed(todos.get(id), cli.json, &ui_cfg)?,
                None if text.trim().is_empty() => {
                    crate::ui::print_unchanged("task text must not be blank", &ui_cfg)
                }
                None => crate::ui::print_unchanged("no task ids left", &ui_cfg),
            }
        }
        Commands::Edit(args) => {
            let todos = engine.todos_mut().ok_or_else(crate::exit::not_logged_in)?;
            let text = args.text.join(" ");
            if todos.edit(args.id, &text) {
                print_changed(todos.get(args.id), cli.json, &ui_cfg)?;
            } else if todos.get(args.id).is_none() {
                crate::ui::print_unchanged(&format!("no task with id {}", args.id), &ui_cfg);
            } else {
                crate::ui::print_unchanged("task text must not be blank", &ui_cfg);
            }
        }
        Commands::Toggle(args) => {
            let todos = engine.todos_mut().ok_or_else(crate::exit::not_logged_in)?;
            if todos.toggle(args.id) {
                print_changed(todos.get(args.id), cli.json, &ui_cfg)?;
            } else {
                crate::ui::print_unchanged(&format!("no task with id {}", args.id), &ui_cfg);
            }
        }
        Commands::Rm(args) => {
            let todos = engine.todos_mut().ok_or_else(crate::exit::not_logged_in)?;
            if todos.remove(args.id) {
                if !ui_cfg.quiet && !cli.json {
                    println!("Deleted #{}", args.id);
                }
            } else {
                crate::ui::print_unchanged(&format!("no task with id {}", args.id), &ui_cfg);
            }
        }
        Commands::ClearCompleted => {
            let todos = engine.todos_mut().ok_or_else(crate::exit::not_logged_in)?;
            let removed = todos.clear_completed();
            if !ui_cfg.quiet && !cli.json {
                println!("Removed {removed} completed task(s)");
            }
        }
        Commands::Report(args) => {
            let now = OffsetDateTime::now_utc();
            let mut results = engine.results();
            match args.command {
                ReportCommand::Sample => {
                    for outcome in crate::report::sample_outcomes(now) {
                        results.record(outcome, now);
                    }
                    show_report(&results.report(now), cli.json, &ui_cfg)?;
                }
                ReportCommand::Ingest { input } => {
                    let outcomes = read_ingest_input(&input)?;
                    let added = results.extend(outcomes, now);
                    if !ui_cfg.quiet && !cli.json {
                        println!("Recorded {added} test result(s)");
                    }
                    if cli.json {
                        write_json(&results.report(now))?;
                    }
                }
                ReportCommand::Show => show_report(&results.report(now), cli.json, &ui_cfg)?,
                ReportCommand::Export { format, out } => {
                    let format = format.unwrap_or(cfg.report.default_format);
                    let dir = out.unwrap_or_else(|| cfg.report.output_dir.clone());
                    let path =
                        crate::report::export_report(&dir, &results.report(now), format, now)?;
                    print_written(&path, cli.json, &ui_cfg)?;
                }
                ReportCommand::Save { dir } => {
                    let dir = dir.unwrap_or_else(|| cfg.report.results_dir.clone());
                    let path = crate::report::save_snapshot(&dir, &results.report(now))?;
                    print_written(&path, cli.json, &ui_cfg)?;
                }
                ReportCommand::Clear => {
                    results.clear();
                    if !ui_cfg.quiet && !cli.json {
                        println!("Cleared test results");
                    }
                }
            }
        }
        Commands::Completion(args) => {
            let shell = parse_shell(&args.shell)?;
            let mut cmd = Cli::command();
            let mut out = std::io::stdout().lock();
            clap_complete::generate(shell, &mut cmd, "todokit", &mut out);
        }
        Commands::Config(args) => {
            if args.show {
                if cli.json {
                    write_json(&cfg)?;
                } else {
                    println!("{}", toml::to_string_pretty(&cfg)?);
                }
            } else if !ui_cfg.quiet {
                eprintln!("config: use `todokit config --show`");
            }
        }
    }

    Ok(())
}

fn home_dir() -> Result<PathBuf> {
    std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| anyhow::anyhow!("HOME is not set"))
}

fn current_username<S>(engine: &Engine<S>) -> Result<String>
where
    S: crate::storage::KeyValueStore + Clone,
{
    engine
        .session()
        .map(|s| s.username.clone())
        .ok_or_else(crate::exit::not_logged_in)
}

fn read_password_line() -> Result<String> {
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn read_ingest_input(input: &Path) -> Result<Vec<TestOutcome>> {
    let raw = if input == Path::new("-") {
        let mut s = String::new();
        io::stdin()
            .read_to_string(&mut s)
            .context("failed to read test results from stdin")?;
        s
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("failed to read test results: {}", input.display()))?
    };
    let parsed: IngestInput = serde_json::from_str(&raw)
        .context("test results must be a JSON array of outcome records or a report")
        .map_err(crate::exit::invalid_args_err)?;
    Ok(match parsed {
        IngestInput::Records(records) => records,
        IngestInput::Report { details } => details,
    })
}

fn print_changed(todo: Option<&Todo>, json: bool, ui_cfg: &UiConfig) -> Result<()> {
    let Some(todo) = todo else {
        return Ok(());
    };
    if json {
        write_json(todo)
    } else {
        crate::ui::print_todo(todo, ui_cfg);
        Ok(())
    }
}

fn show_report(report: &crate::core::TestReport, json: bool, ui_cfg: &UiConfig) -> Result<()> {
    if json {
        write_json(report)
    } else {
        crate::ui::print_report(report, ui_cfg);
        Ok(())
    }
}

fn print_written(path: &Path, json: bool, ui_cfg: &UiConfig) -> Result<()> {
    if json {
        write_json(&serde_json::json!({ "path": path.display().to_string() }))
    } else {
        if !ui_cfg.quiet {
            println!("Wrote {}", path.display());
        }
        Ok(())
    }
}

fn write_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    use std::io::Write;

    let buf = serde_json::to_vec_pretty(value)?;

    let mut stdout = std::io::stdout().lock();
    match stdout.write_all(&buf) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => return Ok(()),
        Err(err) => return Err(err.into()),
    }
    match stdout.write_all(b"\n") {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn parse_shell(s: &str) -> Result<clap_complete::Shell> {
    let shell = match s.trim().to_ascii_lowercase().as_str() {
        "bash" => clap_complete::Shell::Bash,
        "zsh" => clap_complete::Shell::Zsh,
        "fish" => clap_complete::Shell::Fish,
        "elvish" => clap_complete::Shell::Elvish,
        "powershell" | "pwsh" => clap_complete::Shell::PowerShell,
        other => {
            return Err(crate::exit::invalid_args(format!(
                "unsupported shell: {other} (bash|zsh|fish|elvish|powershell)"
            )));
        }
    };
    Ok(shell)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn help_lists_exit_codes() {
        let help = Cli::command().render_help().to_string();
        assert!(help.contains("3   not logged in"), "{help}");
        assert!(help.contains("10  any other failure"), "{help}");
    }

    #[test]
    fn list_filter_defaults_to_all() {
        let cli = Cli::try_parse_from(["todokit", "list"]).expect("parse");
        match cli.command {
            Commands::List(args) => assert_eq!(args.filter, TodoFilter::All),
            other => panic!("unexpected command: {other:?}"),
        }
        let cli =
            Cli::try_parse_from(["todokit", "list", "--filter", "completed"]).expect("parse");
        match cli.command {
            Commands::List(args) => assert_eq!(args.filter, TodoFilter::Completed),
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(Cli::try_parse_from(["todokit", "list", "--filter", "open"]).is_err());
    }

    #[test]
    fn add_joins_words_and_accepts_leading_hyphen() {
        let cli = Cli::try_parse_from(["todokit", "add", "-", "buy", "milk"]).expect("parse");
        match cli.command {
            Commands::Add(args) => assert_eq!(args.text.join(" "), "- buy milk"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn edit_parses_id_and_allows_empty_text() {
        let cli = Cli::try_parse_from(["todokit", "edit", "#3"]).expect("parse");
        match cli.command {
            Commands::Edit(args) => {
                assert_eq!(args.id, TodoId(3));
                assert!(args.text.is_empty());
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(Cli::try_parse_from(["todokit", "toggle", "x"]).is_err());
    }

    #[test]
    fn export_format_is_parsed() {
        let cli = Cli::try_parse_from(["todokit", "report", "export", "--format", "JSON"])
            .expect("parse");
        match cli.command {
            Commands::Report(ReportArgs {
                command: ReportCommand::Export { format, out },
            }) => {
                assert_eq!(format, Some(ReportFormat::Json));
                assert!(out.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn ingest_accepts_array_or_report() {
        let records: IngestInput = serde_json::from_str(
            r#"[{"title":"a","status":"passed","duration":1,"timestamp":"t"}]"#,
        )
        .expect("array");
        assert!(matches!(records, IngestInput::Records(ref r) if r.len() == 1));

        let report: IngestInput = serde_json::from_str(
            r#"{"summary":{"total":1,"passed":0,"failed":1,"duration":0,"timestamp":"t"},
                "details":[{"title":"b","status":"failed","timestamp":"t","error":"e"}]}"#,
        )
        .expect("report");
        assert!(matches!(report, IngestInput::Report { ref details } if details[0].title == "b"));
    }

    #[test]
    fn parse_shell_rejects_unknown() {
        assert!(parse_shell("zsh").is_ok());
        let err = parse_shell("nope").expect_err("unknown shell");
        assert_eq!(crate::exit::exit_code(&err), 2);
    }
}
