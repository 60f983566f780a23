//! Scripted [`Remote`] for exercising the buffer and context layers without
//! a running Neovim.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{BridgeError, Result};
use crate::remote::Remote;

pub struct ScriptedRemote {
    answers: HashMap<String, String>,
    fail_sends: bool,
    capture_staging: bool,
    sent: Mutex<Vec<String>>,
    evaluated: Mutex<Vec<String>>,
    staging_content: Mutex<Option<String>>,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self {
            answers: HashMap::new(),
            fail_sends: false,
            capture_staging: false,
            sent: Mutex::new(Vec::new()),
            evaluated: Mutex::new(Vec::new()),
            staging_content: Mutex::new(None),
        }
    }

    /// Script the answer for one expression. Unscripted expressions error,
    /// which is how tests simulate a query failing mid-assembly.
    pub fn answer(mut self, expr: &str, value: &str) -> Self {
        self.answers.insert(expr.to_string(), value.to_string());
        self
    }

    /// Every keystroke injection fails with a protocol error.
    pub fn failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    /// Snapshot the staging file named in a write payload at send time,
    /// before the caller cleans it up.
    pub fn capture_staging(mut self) -> Self {
        self.capture_staging = true;
        self
    }

    pub fn sent_keys(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn evaluated_exprs(&self) -> Vec<String> {
        self.evaluated.lock().unwrap().clone()
    }

    pub fn captured_staging(&self) -> Option<String> {
        self.staging_content.lock().unwrap().clone()
    }
}

#[async_trait]
impl Remote for ScriptedRemote {
    async fn send_keys(&self, keys: &str) -> Result<()> {
        self.sent.lock().unwrap().push(keys.to_string());
        if self.capture_staging {
            if let Some(path) = keys
                .split("r ")
                .nth(1)
                .map(|rest| rest.trim_end_matches("<CR>"))
            {
                *self.staging_content.lock().unwrap() = std::fs::read_to_string(path).ok();
            }
        }
        if self.fail_sends {
            return Err(BridgeError::Protocol("injection refused".to_string()));
        }
        Ok(())
    }

    async fn eval_expr(&self, expr: &str) -> Result<String> {
        self.evaluated.lock().unwrap().push(expr.to_string());
        match self.answers.get(expr) {
            Some(value) => Ok(value.clone()),
            None => Err(BridgeError::Protocol(format!(
                "unscripted expression: {expr}"
            ))),
        }
    }
}
