//! User actions and the line syntax the interactive shell accepts.

use crate::config_store::ConfigFields;
use crate::scenario::Scenario;
use crate::ProbeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Url,
    Key,
    Model,
    Message,
}

/// Everything a user can do to a [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the active scenario, optionally replacing the user message first.
    Submit(Option<String>),
    SelectScenario(Scenario),
    Clear,
    SetField(FormField, String),
    EditConfig(usize),
    CancelEdit,
    SaveConfig(ConfigFields),
    SaveConfigAsDefault(ConfigFields),
    DeleteConfig(usize),
    StarConfig(usize),
    ApplyConfig(usize),
}

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellInput {
    Action(Command),
    ListConfigs,
    Show,
    Help,
    Quit,
    Empty,
}

pub const HELP: &str = "\
commands:
  send [text]                          run the active scenario
  scenario <id>                        openai_tools | anthropic_tools | gemini_tools | gemini_search | gemini_url_context
  clear                                clear the transcript
  set url|key|model|message <value>    edit the form
  show                                 print the form
  configs                              list saved configurations
  use <i>                              load configuration i into the form
  edit <i> / cancel                    start or abandon editing configuration i
  save <name> <url> <key> [model]      save (or update the one being edited)
  save-default <name> <url> <key> [model]
  delete <i>                           type twice within 2.5s to delete
  star <i>                             toggle the default configuration
  help / quit";

impl ShellInput {
    pub fn parse(line: &str) -> Result<ShellInput, ProbeError> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let action = |cmd: Command| -> Result<ShellInput, ProbeError> { Ok(ShellInput::Action(cmd)) };
        match verb {
            "" => Ok(ShellInput::Empty),
            "help" | "?" => Ok(ShellInput::Help),
            "quit" | "exit" => Ok(ShellInput::Quit),
            "show" => Ok(ShellInput::Show),
            "configs" | "ls" => Ok(ShellInput::ListConfigs),
            "send" | "run" => action(Command::Submit(
                (!rest.is_empty()).then(|| rest.to_string()),
            )),
            "scenario" => action(Command::SelectScenario(rest.parse()?)),
            "clear" => action(Command::Clear),
            "cancel" => action(Command::CancelEdit),
            "set" => {
                let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                let field = match field {
                    "url" => FormField::Url,
                    "key" => FormField::Key,
                    "model" => FormField::Model,
                    "message" | "msg" => FormField::Message,
                    other => {
                        return Err(ProbeError::Validation(format!(
                            "unknown field '{other}', expected url, key, model or message"
                        )))
                    }
                };
                action(Command::SetField(field, value.trim().to_string()))
            }
            "use" => action(Command::ApplyConfig(parse_index(rest)?)),
            "edit" => action(Command::EditConfig(parse_index(rest)?)),
            "delete" | "rm" => action(Command::DeleteConfig(parse_index(rest)?)),
            "star" => action(Command::StarConfig(parse_index(rest)?)),
            "save" => action(Command::SaveConfig(parse_fields(rest)?)),
            "save-default" => action(Command::SaveConfigAsDefault(parse_fields(rest)?)),
            other => Err(ProbeError::Validation(format!(
                "unknown command '{other}', type 'help'"
            ))),
        }
    }
}

fn parse_index(arg: &str) -> Result<usize, ProbeError> {
    arg.parse()
        .map_err(|_| ProbeError::Validation(format!("expected a configuration index, got '{arg}'")))
}

fn parse_fields(args: &str) -> Result<ConfigFields, ProbeError> {
    let parts: Vec<&str> = args.split_whitespace().collect();
    match parts.as_slice() {
        [name, url, key] => Ok(ConfigFields::new(*name, *url, *key, "")),
        [name, url, key, model] => Ok(ConfigFields::new(*name, *url, *key, *model)),
        _ => Err(ProbeError::Validation(
            "usage: save <name> <url> <key> [model]".into(),
        )),
    }
}
