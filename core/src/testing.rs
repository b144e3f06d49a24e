//! Scripted stand-in for the execution engine, shared by unit tests.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::executor::{CodeEngine, EngineRun};

/// A tiny line interpreter with persistent variables, so tests can exercise
/// the shared-interpreter-state contract without a real Python runtime.
///
/// Supported lines: `name = value`, `print(name)` (NameError when unset),
/// `print('literal')`, `fail message`.
pub(crate) struct ScriptedEngine {
    vars: HashMap<String, String>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
        }
    }
}

#[async_trait]
impl CodeEngine for ScriptedEngine {
    async fn run(&mut self, code: &str, _files: &HashMap<String, String>) -> EngineRun {
        let mut stdout = String::new();
        for raw in code.lines() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(message) = line.strip_prefix("fail ") {
                return EngineRun {
                    stdout,
                    error: Some(message.to_string()),
                };
            }
            if let Some(arg) = line
                .strip_prefix("print(")
                .and_then(|rest| rest.strip_suffix(')'))
            {
                let arg = arg.trim();
                let quoted = arg.len() >= 2
                    && ((arg.starts_with('\'') && arg.ends_with('\''))
                        || (arg.starts_with('"') && arg.ends_with('"')));
                if quoted {
                    stdout.push_str(&arg[1..arg.len() - 1]);
                    stdout.push('\n');
                } else if let Some(value) = self.vars.get(arg) {
                    stdout.push_str(value);
                    stdout.push('\n');
                } else {
                    return EngineRun {
                        stdout,
                        error: Some(format!("NameError: name '{}' is not defined", arg)),
                    };
                }
            } else if let Some((name, value)) = line.split_once('=') {
                self.vars
                    .insert(name.trim().to_string(), value.trim().to_string());
            }
        }
        EngineRun {
            stdout,
            error: None,
        }
    }
}
