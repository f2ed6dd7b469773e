use super::Scorer;
use crate::{Error, Result, config::ScoringConfig};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, warn};

struct WorkerProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

type WorkerSlot = Arc<Mutex<Option<WorkerProcess>>>;

/// Scorer living in a child process, driven by line-delimited JSON-RPC over stdio.
///
/// Calls are serialized on the single worker. Each request/reply exchange runs
/// in its own task, so a caller that gives up (timeout, dropped connection)
/// never leaves a half-written line on the worker's stdin. Replies whose id
/// does not match the outstanding request are skipped.
pub struct StdioScorer {
    command: String,
    args: Vec<String>,
    env: HashMap<String, String>,
    process: WorkerSlot,
    alive: Arc<AtomicBool>,
    next_id: AtomicU64,
}

impl StdioScorer {
    pub fn new(config: &ScoringConfig) -> Result<Self> {
        let command = config
            .command
            .clone()
            .ok_or_else(|| Error::config("stdio scoring backend requires command field"))?;

        Ok(Self {
            command,
            args: config.args.clone(),
            env: config.env.clone(),
            process: Arc::new(Mutex::new(None)),
            alive: Arc::new(AtomicBool::new(false)),
            next_id: AtomicU64::new(1),
        })
    }

    fn spawn(&self) -> Result<WorkerProcess> {
        debug!("Spawning scoring worker: {} {:?}", self.command, self.args);

        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args);
        cmd.envs(&self.env);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::inherit());
        cmd.kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            Error::model_unavailable(format!(
                "Failed to spawn scoring worker {}: {}",
                self.command, e
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::internal("Failed to get stdin for scoring worker"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::internal("Failed to get stdout for scoring worker"))?;

        Ok(WorkerProcess {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    async fn send_request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params
        });
        let request_line = format!("{}\n", serde_json::to_string(&request)?);

        let process = self.process.clone();
        let alive = self.alive.clone();
        tokio::spawn(exchange(process, alive, id, request_line))
            .await
            .map_err(|e| Error::internal(format!("Scoring worker task failed: {}", e)))?
    }
}

/// Writes one request line and reads until the matching reply.
///
/// Owns everything it touches; dropping the caller's future does not stop it.
async fn exchange(
    process: WorkerSlot,
    alive: Arc<AtomicBool>,
    id: u64,
    request_line: String,
) -> Result<Value> {
    let mut process_guard = process.lock().await;
    let worker = process_guard
        .as_mut()
        .ok_or_else(|| Error::model_unavailable("Scoring worker is not running"))?;

    let written = match worker.stdin.write_all(request_line.as_bytes()).await {
        Ok(()) => worker.stdin.flush().await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        *process_guard = None;
        alive.store(false, Ordering::SeqCst);
        return Err(Error::model_unavailable(format!(
            "Failed to write to scoring worker: {}",
            e
        )));
    }

    loop {
        let mut response_line = String::new();
        let read = worker.stdout.read_line(&mut response_line).await?;
        if read == 0 {
            let status = worker.child.try_wait().ok().flatten();
            *process_guard = None;
            alive.store(false, Ordering::SeqCst);
            return Err(Error::model_unavailable(match status {
                Some(status) => format!("Scoring worker exited with {}", status),
                None => "Scoring worker closed its stdout".to_string(),
            }));
        }

        let response: Value = match serde_json::from_str(response_line.trim()) {
            Ok(value) => value,
            Err(_) => {
                debug!("Ignoring non-JSON worker output: {}", response_line.trim_end());
                continue;
            }
        };

        if response.get("id").and_then(Value::as_u64) != Some(id) {
            warn!("Discarding stale scoring worker reply: {}", response_line.trim_end());
            continue;
        }

        if let Some(error) = response.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(Error::inference(message));
        }

        return response
            .get("result")
            .cloned()
            .ok_or_else(|| Error::invalid_response("scoring worker reply missing result field"));
    }
}

#[async_trait]
impl Scorer for StdioScorer {
    async fn init(&self) -> Result<()> {
        {
            let mut process_guard = self.process.lock().await;
            if process_guard.is_none() {
                *process_guard = Some(self.spawn()?);
                self.alive.store(true, Ordering::SeqCst);
            }
        }

        self.send_request("init", json!({})).await?;
        debug!("Scoring worker {} initialized", self.command);
        Ok(())
    }

    async fn run(&self, raw_data: &str) -> Result<String> {
        let result = self
            .send_request("run", json!({ "raw_data": raw_data }))
            .await?;

        match result {
            Value::String(text) => Ok(text),
            other => Ok(serde_json::to_string(&other)?),
        }
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}
