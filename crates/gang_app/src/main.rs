mod cli;
mod config;
mod driver;
mod render;
mod watch;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use gang_core::{Msg, UploadStatus};
use gang_engine::EngineHandle;
use gang_logging::{gang_error, gang_info};

use cli::{Cli, Command};
use config::{AppConfig, BACKEND_URL_ENV};
use driver::{file_selected, Driver};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            gang_error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = AppConfig::load(cli.config.as_deref())?
        .with_overrides(std::env::var(BACKEND_URL_ENV).ok(), cli.backend_url.clone());
    gang_logging::initialize(&config.log_settings(cli.verbose)?);
    gang_info!(
        "gang {} using backend {}",
        env!("CARGO_PKG_VERSION"),
        config.backend_url
    );

    let engine = match EngineHandle::new(config.engine_config()) {
        Ok(engine) => Some(engine),
        Err(err) => {
            gang_error!("Backend actor unavailable: {err}");
            None
        }
    };
    let mut driver = Driver::new(engine, config.parser());
    driver.connect();

    if cli.command == Command::Watch {
        watch::run(&config, driver)?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut session = Session::default();
    session.settle(&mut driver, &config)?;

    let requests = requests_for(&cli.command)?;
    if !requests.is_empty() {
        for msg in requests {
            driver.dispatch(msg);
        }
        session.settle(&mut driver, &config)?;
    }

    session.failed |= print_result(&cli.command, &driver);
    Ok(if session.failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

#[derive(Default)]
struct Session {
    failed: bool,
    last_progress: Option<u8>,
}

impl Session {
    /// Waits for outstanding work, echoing notices and upload progress as they arrive.
    fn settle(&mut self, driver: &mut Driver, config: &AppConfig) -> anyhow::Result<()> {
        self.flush(driver);
        driver
            .run_until_idle(config.idle_timeout(), |driver| self.flush(driver))
            .context("waiting for the backend")?;
        self.flush(driver);
        Ok(())
    }

    fn flush(&mut self, driver: &mut Driver) {
        for notice in driver.take_notices() {
            if notice.is_error() {
                self.failed = true;
                eprintln!("{}", render::notice_line(&notice));
            } else {
                println!("{}", render::notice_line(&notice));
            }
        }
        let upload = driver.state().view().upload;
        if upload.status == UploadStatus::Uploading && self.last_progress != Some(upload.progress)
        {
            println!("Uploading... {}%", upload.progress);
            self.last_progress = Some(upload.progress);
        }
    }
}

fn requests_for(command: &Command) -> anyhow::Result<Vec<Msg>> {
    let msgs = match command {
        Command::Debate { prompt } => {
            vec![Msg::CommandChanged(prompt.join(" ")), Msg::CommandSubmitted]
        }
        Command::Abort { reason } => vec![Msg::InterruptRequested {
            reason: reason.join(" "),
        }],
        Command::Clear => vec![Msg::ClearRequested],
        Command::Toggle { name } => vec![Msg::ToggleAgentRequested { name: name.clone() }],
        Command::ResetAgents => vec![Msg::ResetAgentsRequested],
        Command::Upload { path } => {
            let selected = file_selected(path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            vec![selected, Msg::UploadRequested]
        }
        Command::Archive => vec![Msg::ArchiveRequested],
        Command::Status
        | Command::Transcript { .. }
        | Command::Agents
        | Command::Diagnose { .. }
        | Command::Roster
        | Command::Watch => Vec::new(),
    };
    Ok(msgs)
}

/// Prints the final view for `command`; returns true if that output is itself a failure.
fn print_result(command: &Command, driver: &Driver) -> bool {
    let view = driver.state().view();
    match command {
        Command::Status | Command::Debate { .. } | Command::Abort { .. } | Command::Clear => {
            print!("{}", render::status(&view));
        }
        Command::Transcript { html: false } => print!("{}", render::transcript(&view)),
        Command::Transcript { html: true } => {
            let raw = driver
                .state()
                .cache()
                .debate()
                .value()
                .map(|debate| debate.transcript.as_str())
                .unwrap_or_default();
            print!("{}", render::transcript_html(raw));
        }
        Command::Agents | Command::Toggle { .. } | Command::ResetAgents => {
            print!(
                "{}",
                render::agents(&view.agents, view.agents_error.as_deref())
            );
        }
        Command::Diagnose { name } => {
            let agent = driver
                .state()
                .cache()
                .agents()
                .value()
                .and_then(|agents| agents.iter().find(|agent| agent.name == *name));
            match agent {
                Some(agent) => println!("{}", agent.diagnostics()),
                None => {
                    eprintln!("[error] Unknown agent {name}");
                    return true;
                }
            }
        }
        Command::Roster => {
            if view.debate.as_ref().is_some_and(|debate| debate.emergency_mode) {
                println!("EMERGENCY MODE ACTIVE");
            }
            print!("{}", render::roster(&view.roster));
        }
        Command::Upload { .. } => print!("{}", render::upload(&view.upload)),
        Command::Archive | Command::Watch => {}
    }
    false
}
