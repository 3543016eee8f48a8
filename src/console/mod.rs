//! # Operator console.
//!
//! [`CommandLoop`] reads one command per line, invokes the [`Supervisor`] and
//! prints the outcome. Input and output are generic tokio streams, so the
//! binary wires stdin/stdout and tests wire in-memory buffers.
//!
//! ```text
//! Console::prompt("Command: ") ──► OperatorCommand::parse(line)
//!        │                               ├─ Err(ParseError) ─► printed
//!        │                               └─ Ok(cmd) ─► Supervisor::{start, stop, restart, ...}
//!        │                                                 ├─ Ok  ─► printed
//!        │                                                 └─ Err ─► printed
//!        └─ EOF ─► run() returns
//! ```
//!
//! Nothing a command does ends the loop; only end of input does.

mod command;
mod help;
mod render;

pub use command::{EditTarget, OperatorCommand, ParseError};
pub use render::{format_duration, status_lines};

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::core::{LaunchSpec, StopOutcome, Supervisor};
use crate::store::{ConfigStore, keys};

/// ANSI "erase display" + "cursor home".
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Line-oriented operator I/O.
pub struct Console<R, W> {
    reader: R,
    writer: W,
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Wraps a reader and a writer.
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Returns the underlying reader and writer.
    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }

    /// Reads one line without its terminator. `None` at end of input.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    /// Writes one line.
    pub async fn say(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await
    }

    /// Writes `text` without a newline and reads the answer.
    pub async fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.flush().await?;
        self.read_line().await
    }

    /// Asks for the server executable until an existing file is entered.
    /// Returns the path as typed, ready to be stored.
    pub async fn prompt_executable(&mut self) -> io::Result<Option<String>> {
        loop {
            let Some(answer) = self
                .prompt("Please enter the location of the dedicated server executable: ")
                .await?
            else {
                return Ok(None);
            };
            let path = answer.trim();
            let is_file = tokio::fs::metadata(path)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false);
            if is_file {
                return Ok(Some(path.to_owned()));
            }
            self.say("Uh-oh, it looks like that file does not exist, please try again...")
                .await?;
        }
    }

    /// Asks once for the extra launch parameters (empty allowed).
    pub async fn prompt_params(&mut self) -> io::Result<Option<String>> {
        Ok(self
            .prompt("Please enter the parameters you would like to run the server with: ")
            .await?
            .map(|p| p.trim().to_owned()))
    }

    /// Clears the terminal.
    pub async fn clear(&mut self) -> io::Result<()> {
        self.writer.write_all(CLEAR_SCREEN.as_bytes()).await?;
        self.writer.flush().await
    }
}

/// Interactive command loop bound to one supervisor.
pub struct CommandLoop<R, W> {
    sup: Supervisor,
    store: Arc<dyn ConfigStore>,
    launch: LaunchSpec,
    console: Console<R, W>,
}

impl<R, W> CommandLoop<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a loop. `launch` must match what the supervisor was built with;
    /// `edit` commands update both.
    pub fn new(
        sup: Supervisor,
        store: Arc<dyn ConfigStore>,
        launch: LaunchSpec,
        console: Console<R, W>,
    ) -> Self {
        Self {
            sup,
            store,
            launch,
            console,
        }
    }

    /// Returns the console (tests read the output back from it).
    pub fn into_console(self) -> Console<R, W> {
        self.console
    }

    /// Runs until end of input.
    ///
    /// Only I/O errors on the console itself are returned.
    pub async fn run(&mut self) -> io::Result<()> {
        self.console
            .say("You can enter commands here to interact with the manager, or use \"help\".")
            .await?;
        while let Some(line) = self.console.prompt("Command: ").await? {
            self.execute(&line).await?;
        }
        Ok(())
    }

    /// Parses and runs one line.
    pub async fn execute(&mut self, line: &str) -> io::Result<()> {
        let cmd = match OperatorCommand::parse(line) {
            Ok(cmd) => cmd,
            Err(e) => return self.console.say(&capitalize(&e.to_string())).await,
        };
        tracing::debug!(target: "procvisor::console", command = ?cmd, "operator command");

        match cmd {
            OperatorCommand::Help(None) => {
                for line in help::OVERVIEW {
                    self.console.say(line).await?;
                }
            }
            OperatorCommand::Help(Some(topic)) => match help::topic(&topic) {
                Some(lines) => {
                    for line in lines {
                        self.console.say(line).await?;
                    }
                }
                None => {
                    self.console
                        .say(&format!("There is no help for \"{topic}\"."))
                        .await?
                }
            },
            OperatorCommand::Start => self.start().await?,
            OperatorCommand::Stop => self.stop().await?,
            OperatorCommand::Restart(None) => self.restart().await?,
            OperatorCommand::Restart(Some(hours)) => self.set_restart_hours(hours).await?,
            OperatorCommand::Status => {
                for line in status_lines(&self.sup.status()) {
                    self.console.say(&line).await?;
                }
            }
            OperatorCommand::Clear => self.console.clear().await?,
            OperatorCommand::Edit(EditTarget::ServerPath) => self.edit_server_path().await?,
            OperatorCommand::Edit(EditTarget::ServerParams) => self.edit_server_params().await?,
        }
        Ok(())
    }

    async fn start(&mut self) -> io::Result<()> {
        self.console.say("Starting server...").await?;
        match self.sup.start().await {
            Ok(pid) => self.console.say(&format!("Server started (pid {pid}).")).await,
            Err(e) => self.console.say(&format!("Error: {e}")).await,
        }
    }

    async fn stop(&mut self) -> io::Result<()> {
        let msg = match self.sup.stop().await {
            Ok(StopOutcome::Stopped { pid }) => format!("Server stopped (pid {pid})."),
            Ok(StopOutcome::CancelledRestart) => "Pending crash restart cancelled.".to_owned(),
            Ok(StopOutcome::NotRunning) => "Server is not running.".to_owned(),
            Err(e) => format!("Error: {e}"),
        };
        self.console.say(&msg).await
    }

    async fn restart(&mut self) -> io::Result<()> {
        if !self.sup.status().is_online() {
            return self.console.say("Please start a server first.").await;
        }
        self.console.say("Restarting server...").await?;
        match self.sup.restart().await {
            Ok(pid) => self.console.say(&format!("Server restarted (pid {pid}).")).await,
            Err(e) => self.console.say(&format!("Error: {e}")).await,
        }
    }

    async fn set_restart_hours(&mut self, hours: u64) -> io::Result<()> {
        if let Err(e) = self.sup.set_restart_hours(hours).await {
            return self.console.say(&format!("Error: {e}")).await;
        }
        if hours == 0 {
            self.console.say("Automatic restarts are now disabled.").await?;
        } else {
            self.console
                .say(&format!("Automatic restarts are set to: {hours} hours"))
                .await?;
        }
        if !self.sup.status().is_online() {
            return Ok(());
        }
        let answer = self
            .console
            .prompt("The server must be restarted to apply this change. Press Enter to restart it: ")
            .await?;
        if answer.is_some() {
            self.restart().await?;
        }
        Ok(())
    }

    async fn edit_server_path(&mut self) -> io::Result<()> {
        let Some(path) = self.console.prompt_executable().await? else {
            return Ok(());
        };
        if let Err(e) = self.store.set(keys::SERVER_EXE, &path) {
            return self.console.say(&format!("Error: {e}")).await;
        }
        self.apply_launch(self.launch.with_executable(PathBuf::from(path))).await?;
        self.console.say("Server path updated!").await
    }

    async fn edit_server_params(&mut self) -> io::Result<()> {
        let Some(params) = self.console.prompt_params().await? else {
            return Ok(());
        };
        if let Err(e) = self.store.set(keys::SERVER_PARAMS, &params) {
            return self.console.say(&format!("Error: {e}")).await;
        }
        self.apply_launch(self.launch.with_params(params)).await?;
        self.console.say("Server params updated!").await
    }

    async fn apply_launch(&mut self, launch: LaunchSpec) -> io::Result<()> {
        if let Err(e) = self.sup.set_launch(launch.clone()).await {
            return self.console.say(&format!("Error: {e}")).await;
        }
        self.launch = launch;
        Ok(())
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
