use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::Local;
use gang_core::Msg;
use gang_logging::{gang_info, gang_warn};

use crate::config::AppConfig;
use crate::driver::{file_selected, Driver};
use crate::render;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchCommand {
    Send(String),
    Abort(String),
    Clear,
    Toggle(String),
    Reset,
    Upload(PathBuf),
    Archive,
    Quit,
}

const ENGINE_POLL: Duration = Duration::from_millis(20);

enum Input {
    Tick(Instant),
    Line(String),
    Closed,
}

/// Waits up to `wait` for input, then drains whatever else is queued.
///
/// A disconnected channel reads as [`Input::Closed`].
fn next_inputs(input_rx: &mpsc::Receiver<Input>, wait: Duration) -> Vec<Input> {
    let first = match input_rx.recv_timeout(wait) {
        Ok(input) => input,
        Err(mpsc::RecvTimeoutError::Timeout) => return Vec::new(),
        Err(mpsc::RecvTimeoutError::Disconnected) => return vec![Input::Closed],
    };
    let mut inputs = vec![first];
    inputs.extend(input_rx.try_iter());
    inputs
}

/// Parses one stdin line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<WatchCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    let command = match head {
        "/quit" | "/exit" => WatchCommand::Quit,
        "/abort" => WatchCommand::Abort(rest.to_string()),
        "/clear" => WatchCommand::Clear,
        "/reset" => WatchCommand::Reset,
        "/archive" => WatchCommand::Archive,
        "/toggle" if rest.is_empty() => return Err("usage: /toggle <agent>".to_string()),
        "/toggle" => WatchCommand::Toggle(rest.to_string()),
        "/upload" if rest.is_empty() => return Err("usage: /upload <path>".to_string()),
        "/upload" => WatchCommand::Upload(PathBuf::from(rest)),
        _ => WatchCommand::Send(line.to_string()),
    };
    Ok(Some(command))
}

/// Messages a command turns into; `None` means quit.
fn messages_for(command: WatchCommand) -> Result<Option<Vec<Msg>>, String> {
    let msgs = match command {
        WatchCommand::Quit => return Ok(None),
        WatchCommand::Send(text) => vec![Msg::CommandChanged(text), Msg::CommandSubmitted],
        WatchCommand::Abort(reason) => vec![Msg::InterruptRequested { reason }],
        WatchCommand::Clear => vec![Msg::ClearRequested],
        WatchCommand::Toggle(name) => vec![Msg::ToggleAgentRequested { name }],
        WatchCommand::Reset => vec![Msg::ResetAgentsRequested],
        WatchCommand::Archive => vec![Msg::ArchiveRequested],
        WatchCommand::Upload(path) => {
            let selected = file_selected(&path)
                .map_err(|err| format!("cannot read {}: {err}", path.display()))?;
            vec![selected, Msg::UploadRequested]
        }
    };
    Ok(Some(msgs))
}

pub fn run(config: &AppConfig, mut driver: Driver) -> anyhow::Result<()> {
    let (input_tx, input_rx) = mpsc::channel::<Input>();

    let tick = config.tick();
    let tick_tx = input_tx.clone();
    thread::spawn(move || {
        while tick_tx.send(Input::Tick(Instant::now())).is_ok() {
            thread::sleep(tick);
        }
    });

    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if input_tx.send(Input::Line(line)).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    gang_warn!("stdin read failed: {err}");
                    break;
                }
            }
        }
        let _ = input_tx.send(Input::Closed);
    });

    gang_info!("Watching {} every {:?}", config.backend_url, tick);
    println!("Type a prompt to start a debate, or /abort /clear /toggle <agent> /reset /upload <path> /archive /quit");

    let mut last_screen = String::new();
    'watch: loop {
        // Offline there is nothing to pump, so the input channel is the only wait.
        let input_wait = if driver.is_online() {
            if let Err(err) = driver.pump(ENGINE_POLL) {
                eprintln!("[error] {err}");
            }
            Duration::ZERO
        } else {
            tick
        };

        for input in next_inputs(&input_rx, input_wait) {
            match input {
                Input::Tick(now) => driver.dispatch(Msg::Tick { now }),
                Input::Line(line) => match parse_line(&line).and_then(|cmd| match cmd {
                    Some(cmd) => messages_for(cmd),
                    None => Ok(Some(Vec::new())),
                }) {
                    Ok(Some(msgs)) => msgs.into_iter().for_each(|msg| driver.dispatch(msg)),
                    Ok(None) => break 'watch,
                    Err(message) => eprintln!("[error] {message}"),
                },
                Input::Closed => break 'watch,
            }
        }

        for notice in driver.take_notices() {
            if notice.is_error() {
                eprintln!("{}", render::notice_line(&notice));
            } else {
                println!("{}", render::notice_line(&notice));
            }
        }

        if driver.consume_dirty() {
            let view = driver.state().view();
            let screen = render::dashboard(&view, "");
            if screen != last_screen {
                let clock = Local::now().format("%H:%M:%S").to_string();
                print!("{}", render::dashboard(&view, &clock));
                last_screen = screen;
            }
        }
    }

    gang_info!("Watch stopped");
    Ok(())
}
