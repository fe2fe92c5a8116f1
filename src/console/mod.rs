//! Line-oriented console front end.
//!
//! Reads one command per line, applies it to the driven session and prints
//! plain text. Interpreter replies and auto-advances are printed as they
//! arrive. When input ends, outstanding requests are allowed to finish so a
//! piped script sees every reply.

mod command;
mod render;

pub use command::{help_text, Command, CommandError};
pub use render::{render_matrix, render_step, render_suggestions, render_transition, render_update};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::decision::{ItemKind, Step};
use crate::driver::SessionDriver;
use crate::error::{AppError, SessionError};

/// Whether the loop should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line.
    Continue,
    /// Stop.
    Quit,
}

/// Console bound to one driven session.
#[derive(Debug)]
pub struct Console {
    driver: SessionDriver,
}

impl Console {
    /// Console over `driver`.
    #[must_use]
    pub const fn new(driver: SessionDriver) -> Self {
        Self { driver }
    }

    /// The driver.
    #[must_use]
    pub const fn driver(&self) -> &SessionDriver {
        &self.driver
    }

    /// Parse and execute one line.
    pub fn handle_line(&mut self, line: &str) -> (String, Flow) {
        match Command::parse(line) {
            Ok(command) => self.execute(command),
            Err(e) => (format!("{e}\n"), Flow::Continue),
        }
    }

    /// Execute a command and start any interpreter calls it queued.
    pub fn execute(&mut self, command: Command) -> (String, Flow) {
        if command == Command::Quit {
            return (String::new(), Flow::Quit);
        }
        let output = match self.apply(command) {
            Ok(text) => text,
            Err(e) => format!("{e}\n"),
        };
        self.driver.dispatch();
        (output, Flow::Continue)
    }

    fn apply(&mut self, command: Command) -> Result<String, SessionError> {
        let session = self.driver.session_mut();
        let list_kind = if session.step() == Step::Criteria {
            ItemKind::Criteria
        } else {
            ItemKind::Options
        };
        Ok(match command {
            Command::Text(text) => match session.step() {
                Step::Input => {
                    session.set_title(&text)?;
                    render_step(session)
                }
                Step::Options | Step::Criteria => {
                    session.add_item(list_kind, &text)?;
                    render_step(session)
                }
                Step::Evaluation => {
                    session.send_evaluation_message(&text)?;
                    "Thinking...\n".to_string()
                }
                Step::Weighing => {
                    session.send_weighing_message(&text)?;
                    "Thinking...\n".to_string()
                }
                Step::Results => "Type 'reset' to start a new decision.\n".to_string(),
            },
            Command::Next => {
                let transition = session.advance();
                render_transition(session, transition)
            }
            Command::Back => {
                let transition = session.back();
                render_transition(session, transition)
            }
            Command::Reset => {
                session.reset();
                render_step(session)
            }
            Command::Show => render_step(session),
            Command::Help => help_text().to_string(),
            Command::Stats => format!("{}\n", self.driver.metrics().summary()),
            Command::Remove(index) => {
                let removed = session.remove_item(list_kind, index)?;
                format!("Removed {removed}.\n{}", render_step(session))
            }
            Command::Pick(index) => {
                session.add_suggestion(list_kind, index)?;
                render_step(session)
            }
            Command::Mode(mode) => {
                if session.set_mode(mode) && session.step() == Step::Evaluation {
                    render_step(session)
                } else {
                    format!("Evaluation mode: {mode}\n")
                }
            }
            Command::Score {
                option,
                criterion,
                value,
            } => {
                let rating = session.set_score(option, criterion, value)?;
                format!("Scored {rating}/5.\n{}", render_matrix(session))
            }
            Command::Weight { criterion, value } => {
                let rating = session.set_weight(criterion, value)?;
                format!("Weighted {rating}/5.\n{}", render_step(session))
            }
            Command::Quit => String::new(),
        })
    }

    /// Run until `quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Io`] if reading input or writing output fails.
    pub async fn run<R, W>(&mut self, input: R, output: &mut W) -> Result<(), AppError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        write_out(output, &render_step(self.driver.session())).await?;
        self.driver.dispatch();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        tracing::debug!(in_flight = self.driver.in_flight(), "Input closed");
                        for update in self.driver.settle().await {
                            if let Some(text) = render_update(self.driver.session(), &update) {
                                write_out(output, &text).await?;
                            }
                        }
                        break;
                    };
                    let (text, flow) = self.handle_line(&line);
                    write_out(output, &text).await?;
                    if flow == Flow::Quit {
                        break;
                    }
                }
                Some(event) = self.driver.next_event() => {
                    let update = self.driver.handle(event);
                    if let Some(text) = render_update(self.driver.session(), &update) {
                        write_out(output, &text).await?;
                    }
                }
            }
        }
        output.flush().await?;
        Ok(())
    }
}

async fn write_out<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> std::io::Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.flush().await
}
