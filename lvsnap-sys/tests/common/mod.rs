// SPDX-License-Identifier: GPL-3.0-only

use std::collections::HashMap;
use std::sync::Mutex;

use lvsnap_sys::{CommandOutput, CommandRunner, Result, SysError};

/// Replays canned output per program; directory creation hits the real
/// filesystem.
#[derive(Default)]
pub struct ScriptedRunner {
    outputs: Mutex<HashMap<String, Vec<CommandOutput>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(&self, program: &str, stdout: &str) -> &Self {
        self.push(program, 0, stdout, "")
    }

    pub fn fail(&self, program: &str, status: i32, stderr: &str) -> &Self {
        self.push(program, status, "", stderr)
    }

    fn push(&self, program: &str, status: i32, stdout: &str, stderr: &str) -> &Self {
        self.outputs
            .lock()
            .unwrap()
            .entry(program.to_string())
            .or_default()
            .push(CommandOutput {
                status,
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            });
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        self.calls
            .lock()
            .unwrap()
            .push(lvsnap_sys::command::render(program, args));

        let mut outputs = self.outputs.lock().unwrap();
        match outputs.get_mut(program) {
            Some(queue) if !queue.is_empty() => Ok(queue.remove(0)),
            _ => Err(SysError::ToolUnavailable {
                command: program.to_string(),
                reason: "not scripted".to_string(),
            }),
        }
    }
}
