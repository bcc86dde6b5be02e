//// # Sessions
////
//// A session replays a script of input events against a controller, one event
//// per line, the way a user would produce them by typing into the fields,
//// dragging the handle and toggling the mode. Scripts look like this:
////
//// ```text
//// # start from the standard normal
//// x 0
//// less 97.5
//// show
//// mode likelihood
//// mean 2
//// blur mean
//// ```
////
//// Field names are those of [`Field`]; typing into a field that applies on
//// commit (the probabilities and the density) commits it right away.

use anyhow::{anyhow, bail, Context, Result};
use log::{debug, info};
use std::fmt::Display;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use crate::fields::{self, parse_input, EditOutcome, Field, FieldValues};
use crate::observe::observe_event;
use crate::params::Mode;
use crate::renderer::Renderer;
use crate::state::DistributionState;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Text typed into a field.
    Type { field: Field, text: String },
    /// The field loses focus, optionally after typing `text` into it.
    Blur { field: Field, text: Option<String> },
    Drag(f64),
    Click(f64),
    Mode(Mode),
    Show,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut tokens = line.split_whitespace();
        let head = tokens.next().ok_or_else(|| anyhow!("empty command"))?;
        let rest: Vec<&str> = tokens.collect();
        let command = match head {
            "drag" => Command::Drag(number(head, &rest)?),
            "click" => Command::Click(number(head, &rest)?),
            "mode" => Command::Mode(single(head, &rest)?.parse::<Mode>().map_err(|e| anyhow!(e))?),
            "show" if rest.is_empty() => Command::Show,
            "show" => bail!("`show` takes no arguments"),
            "blur" => {
                let (field, text) = match rest.as_slice() {
                    [field] => (*field, None),
                    [field, text] => (*field, Some(text.to_string())),
                    _ => bail!("`blur` takes a field and an optional value"),
                };
                Command::Blur {
                    field: field.parse::<Field>().map_err(|e| anyhow!(e))?,
                    text,
                }
            }
            other => {
                let field: Field = other
                    .parse()
                    .map_err(|_| anyhow!("unknown command `{}`", other))?;
                // the text may be empty while typing, e.g. `x` alone clears the field
                let text = match rest.as_slice() {
                    [] => String::new(),
                    [text] => text.to_string(),
                    _ => bail!("`{}` takes at most one value", other),
                };
                Command::Type { field, text }
            }
        };
        Ok(command)
    }
}

fn single<'a>(head: &str, rest: &[&'a str]) -> Result<&'a str> {
    match rest {
        [arg] => Ok(*arg),
        _ => bail!("`{}` takes exactly one argument", head),
    }
}

fn number(head: &str, rest: &[&str]) -> Result<f64> {
    let text = single(head, rest)?;
    parse_input(text).ok_or_else(|| anyhow!("`{}` is not a number", text))
}

/// Parses a script, skipping blank lines and `#` comments.
pub fn read_script<B: BufRead>(reader: B) -> Result<Vec<Command>> {
    let mut commands = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {}", i + 1))?;
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let command = line
            .parse()
            .with_context(|| format!("line {}: `{}`", i + 1, line))?;
        commands.push(command);
    }
    Ok(commands)
}

pub fn load_script<P: AsRef<Path>>(path: P) -> Result<Vec<Command>> {
    let f = File::open(path.as_ref()).with_context(|| format!("reading {:?}", path.as_ref()))?;
    read_script(BufReader::new(f)).with_context(|| format!("parsing {:?}", path.as_ref()))
}

pub struct Session<R: Renderer> {
    state: DistributionState<R>,
    /// The field being typed into and its raw text, which is what the field
    /// shows until it is blurred.
    pending: Option<(Field, String)>,
    events: usize,
}

impl<R: Renderer> Session<R> {
    pub fn new(state: DistributionState<R>) -> Self {
        Self {
            state,
            pending: None,
            events: 0,
        }
    }

    pub fn state(&self) -> &DistributionState<R> {
        &self.state
    }

    pub fn into_state(self) -> DistributionState<R> {
        self.state
    }

    pub fn events(&self) -> usize {
        self.events
    }

    /// The text of every field as a user would see it right now.
    pub fn field_values(&self) -> FieldValues {
        let mut values = FieldValues::from_state(&self.state);
        if let Some((field, text)) = &self.pending {
            values.set(*field, text.clone());
        }
        values
    }

    /// Applies one command. Returns what `show` prints, if anything.
    pub fn apply(&mut self, command: &Command) -> Option<String>
    where
        R: Display,
    {
        observe_event(self.events);
        self.events += 1;
        match command {
            Command::Type { field, text } => {
                let outcome = if field.applies_on_input() {
                    fields::input(&mut self.state, *field, text)
                } else {
                    fields::commit(&mut self.state, *field, text)
                };
                if let EditOutcome::Rejected(e) = outcome {
                    debug!("{} `{}` rejected: {}", field, text, e);
                }
                self.pending = Some((*field, text.clone()));
            }
            Command::Blur { field, text } => {
                let text = match (text, &self.pending) {
                    (Some(text), _) => {
                        fields::input(&mut self.state, *field, text);
                        text.clone()
                    }
                    (None, Some((pending, text))) if pending == field => text.clone(),
                    (None, _) => FieldValues::from_state(&self.state).get(*field).to_owned(),
                };
                let shown = fields::blur(&mut self.state, *field, &text);
                debug!("{} blurred as {}", field, shown);
                self.pending = None;
            }
            Command::Drag(x) => {
                self.state.on_drag(*x);
                self.pending = None;
            }
            Command::Click(x) => {
                if let Err(e) = self.state.on_curve_click(*x) {
                    debug!("click at {} ignored: {}", x, e);
                }
                self.pending = None;
            }
            Command::Mode(mode) => {
                self.state.set_mode(mode.is_likelihood());
                self.pending = None;
            }
            Command::Show => return Some(self.show()),
        }
        None
    }

    pub fn show(&self) -> String
    where
        R: Display,
    {
        let mode = self.state.mode();
        let mut out = format!("{}", self.state.renderer());
        out.push_str(&format!("mode: {}\n", mode));
        let fields: Vec<String> = self
            .field_values()
            .iter()
            .filter(|(f, _)| f.visible_in(mode))
            .map(|(f, text)| format!("{}={}", f, text))
            .collect();
        out.push_str(&fields.join(" "));
        out.push('\n');
        out
    }

    /// Replays `commands`, writing the output of every `show` to `output`.
    pub fn run<W: Write>(&mut self, commands: &[Command], mut output: W) -> Result<()>
    where
        R: Display,
    {
        info!("replaying {} commands", commands.len());
        for command in commands {
            if let Some(text) = self.apply(command) {
                output.write_all(text.as_bytes()).context("writing output")?;
            }
        }
        output.flush().context("flushing output")?;
        info!(
            "session done after {} events, {} curves generated",
            self.events,
            self.state.curve_generations()
        );
        Ok(())
    }
}
