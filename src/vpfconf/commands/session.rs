//! # Selection Session
//!
//! The picker workflow driven one text command at a time:
//!
//! | Command | Effect |
//! |---------|--------|
//! | `pick <selector>` | make a feature the pending one |
//! | `unpick` | drop the pending feature |
//! | `add` | add the pending feature with the current style |
//! | `clear` | empty the selection |
//! | `list` | show the selection |
//! | `style <key> <value>` | change the style used by later `add`s |
//! | `finalize [name]` | build the layer and hand it to the layer handler |
//! | `help` | list commands |
//! | `quit` | end the session |
//!
//! User mistakes (nothing picked, unknown feature, empty selection) come back
//! as error messages and the session carries on. Anything else ends it.

use crate::catalog::FeatureCatalog;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, VpfError};
use crate::layer::{LayerHandler, LayerRegistry};
use crate::selection::{LayerSettings, SelectionAccumulator};
use crate::style::StyleAttributes;
use std::str::FromStr;
use tracing::warn;

pub const SESSION_HELP: &str = "\
pick <library/coverage/feature>   choose a feature
unpick                            forget the chosen feature
add                               add the chosen feature to the layer
clear                             remove all features from the layer
list                              show the features in the layer
style <key> <value>               set lineColor, fillColor, selectColor, lineWidth or dashPattern
finalize [name]                   create the layer
quit                              leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Pick(String),
    Unpick,
    Add,
    Clear,
    List,
    Style { key: String, value: String },
    Finalize(Option<String>),
    Help,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = VpfError;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (line, ""),
        };
        let cmd = match (word.to_ascii_lowercase().as_str(), rest) {
            ("pick", sel) if !sel.is_empty() => SessionCommand::Pick(sel.to_string()),
            ("pick", _) => return Err(VpfError::InvalidSelector(String::new())),
            ("unpick", "") => SessionCommand::Unpick,
            ("add", "") => SessionCommand::Add,
            ("clear", "") => SessionCommand::Clear,
            ("list" | "ls", "") => SessionCommand::List,
            ("style", args) => match args.split_once(char::is_whitespace) {
                Some((key, value)) => SessionCommand::Style {
                    key: key.to_string(),
                    value: value.trim().to_string(),
                },
                None => return Err(VpfError::Config("usage: style <key> <value>".to_string())),
            },
            ("finalize" | "create", "") => SessionCommand::Finalize(None),
            ("finalize" | "create", name) => SessionCommand::Finalize(Some(name.to_string())),
            ("help" | "?", "") => SessionCommand::Help,
            ("quit" | "exit", "") => SessionCommand::Quit,
            _ => return Err(VpfError::UnknownCommand(line.to_string())),
        };
        Ok(cmd)
    }
}

pub struct Session<H: LayerHandler = LayerRegistry> {
    catalog: FeatureCatalog,
    selection: SelectionAccumulator,
    style: StyleAttributes,
    settings: LayerSettings,
    handler: H,
    layers_created: usize,
    finished: bool,
}

impl<H: LayerHandler> Session<H> {
    pub fn new(
        catalog: FeatureCatalog,
        style: StyleAttributes,
        search_by_feature: bool,
        handler: H,
    ) -> Self {
        let settings = LayerSettings::for_catalog(&catalog, search_by_feature);
        Self {
            catalog,
            selection: SelectionAccumulator::new(),
            style,
            settings,
            handler,
            layers_created: 0,
            finished: false,
        }
    }

    pub fn catalog(&self) -> &FeatureCatalog {
        &self.catalog
    }

    pub fn selection(&self) -> &SelectionAccumulator {
        &self.selection
    }

    pub fn style(&self) -> &StyleAttributes {
        &self.style
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Run one input line. Blank lines and `#` comments do nothing.
    pub fn execute_line(&mut self, line: &str) -> Result<CmdResult> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(CmdResult::default());
        }
        let outcome = trimmed
            .parse::<SessionCommand>()
            .and_then(|cmd| self.apply(cmd));
        recover(outcome)
    }

    pub fn execute(&mut self, command: SessionCommand) -> Result<CmdResult> {
        recover(self.apply(command))
    }

    fn apply(&mut self, command: SessionCommand) -> Result<CmdResult> {
        let result = CmdResult::default();
        match command {
            SessionCommand::Pick(selector) => {
                let feature = self.catalog.find(&selector)?.clone();
                let msg = format!("Picked {}: {}", feature.name, feature);
                self.selection.pick(feature);
                Ok(result.with_message(CmdMessage::info(msg)))
            }
            SessionCommand::Unpick => {
                self.selection.unpick();
                Ok(result)
            }
            SessionCommand::Add => self.add(),
            SessionCommand::Clear => {
                self.selection.clear();
                Ok(result.with_message(CmdMessage::info("Selection cleared")))
            }
            SessionCommand::List => {
                let selected = self.selection.features().to_vec();
                let result = if selected.is_empty() {
                    result.with_message(CmdMessage::info("Selection is empty"))
                } else {
                    result
                };
                Ok(result.with_selection(selected))
            }
            SessionCommand::Style { key, value } => {
                self.style.set(&key, &value)?;
                let shown = self.style.get(&key).unwrap_or(value);
                Ok(result.with_message(CmdMessage::info(format!("{} = {}", key, shown))))
            }
            SessionCommand::Finalize(name) => self.finalize(name),
            SessionCommand::Help => Ok(result.with_message(CmdMessage::info(SESSION_HELP))),
            SessionCommand::Quit => {
                self.finished = true;
                Ok(result)
            }
        }
    }

    fn add(&mut self) -> Result<CmdResult> {
        let pending = self.selection.pending().ok_or(VpfError::NoSelection)?;
        let already = self
            .selection
            .features()
            .iter()
            .any(|s| s.feature == *pending);
        if already {
            let msg = format!("{} is already selected", pending.name);
            self.selection.unpick();
            return Ok(CmdResult::default().with_message(CmdMessage::warning(msg)));
        }

        let added = self.selection.add(&self.style)?;
        let msg = format!("Added {} ({})", added.feature.name, added.feature.coverage);
        Ok(CmdResult::default().with_message(CmdMessage::success(msg)))
    }

    fn finalize(&mut self, name: Option<String>) -> Result<CmdResult> {
        if self.selection.is_empty() {
            return Err(VpfError::EmptySelection);
        }
        let name = name.unwrap_or_else(|| format!("layer-{}", self.layers_created + 1));
        let bag = self.selection.build(&self.settings)?;
        self.handler.add_layer(&name, bag.clone())?;
        self.selection.clear();
        self.layers_created += 1;
        Ok(CmdResult::default()
            .with_message(CmdMessage::success(format!("Created layer {}", name)))
            .with_layer(Some(name), bag))
    }
}

fn recover(outcome: Result<CmdResult>) -> Result<CmdResult> {
    match outcome {
        Err(e) if e.is_recoverable() => {
            warn!(error = %e, "session command rejected");
            Ok(CmdResult::default().with_message(CmdMessage::error(e.to_string())))
        }
        other => other,
    }
}
