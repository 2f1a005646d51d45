//! Line-oriented link to a simulation running in a child process.
//!
//! Requests and responses are single lines:
//!
//! ```text
//! command <text>   ->  ok | error <message>
//! report <expr>    ->  value <json> | error <message>
//! quit
//! ```

use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{ReportValue, SimulationLink};
use crate::error::LinkError;

const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 2000;
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

fn default_shutdown_grace_ms() -> u64 {
    DEFAULT_SHUTDOWN_GRACE_MS
}

/// Program and arguments that start one simulation process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StdioLinkConfig {
    pub program: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
    /// How long `close` waits for the process to exit after `quit` before killing it.
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

impl StdioLinkConfig {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            shutdown_grace_ms: DEFAULT_SHUTDOWN_GRACE_MS,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace_ms = u64::try_from(grace.as_millis()).unwrap_or(u64::MAX);
        self
    }
}

pub struct StdioLink {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    shutdown_grace: Duration,
    closed: bool,
}

impl StdioLink {
    pub fn spawn(config: &StdioLinkConfig) -> Result<Self, LinkError> {
        let mut child = Command::new(&config.program)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;

        let stdin = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| LinkError::Protocol("child stdout is not piped".to_string()))?;

        debug!(
            pid = child.id(),
            program = %config.program.display(),
            "Spawned simulation process"
        );

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            shutdown_grace: Duration::from_millis(config.shutdown_grace_ms),
            closed: false,
        })
    }

    /// Wait up to the shutdown grace for the child to exit, then kill it.
    fn wait_or_kill(&mut self) -> Result<ExitStatus, LinkError> {
        let deadline = Instant::now() + self.shutdown_grace;
        loop {
            if let Some(status) = self.child.try_wait()? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                warn!(
                    pid = self.child.id(),
                    grace = ?self.shutdown_grace,
                    "Simulation process did not exit after quit, killing it"
                );
                if let Err(error) = self.child.kill() {
                    debug!(%error, "Simulation process exited before it could be killed");
                }
                return Ok(self.child.wait()?);
            }
            thread::sleep(EXIT_POLL_INTERVAL);
        }
    }

    fn request(&mut self, verb: &str, body: &str) -> Result<Response, LinkError> {
        if body.contains(|c: char| c == '\n' || c == '\r') {
            return Err(LinkError::Protocol(format!(
                "request contains a line break: {body:?}"
            )));
        }

        let stdin = self.stdin.as_mut().ok_or(LinkError::Disconnected)?;
        writeln!(stdin, "{verb} {body}")?;
        stdin.flush()?;

        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(LinkError::Disconnected);
        }
        parse_response(line.trim_end())
    }
}

impl SimulationLink for StdioLink {
    fn command(&mut self, text: &str) -> Result<(), LinkError> {
        match self.request("command", text)? {
            Response::Ok => Ok(()),
            Response::Error(message) => Err(LinkError::Backend(message)),
            Response::Value(value) => Err(LinkError::Protocol(format!(
                "command `{text}` answered with a value: {value}"
            ))),
        }
    }

    fn report(&mut self, expression: &str) -> Result<ReportValue, LinkError> {
        match self.request("report", expression)? {
            Response::Value(value) => Ok(value),
            Response::Error(message) => Err(LinkError::Backend(message)),
            Response::Ok => Err(LinkError::Protocol(format!(
                "report `{expression}` answered without a value"
            ))),
        }
    }

    fn close(&mut self) -> Result<(), LinkError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        // Dropping stdin after `quit` gives the child EOF even if it ignores the request.
        if let Some(mut stdin) = self.stdin.take() {
            if let Err(error) = writeln!(stdin, "quit").and_then(|_| stdin.flush()) {
                debug!(%error, "Simulation process stopped reading before quit");
            }
        }

        let status = self.wait_or_kill()?;
        debug!(pid = self.child.id(), %status, "Simulation process exited");
        Ok(())
    }
}

impl Drop for StdioLink {
    fn drop(&mut self) {
        if !self.closed {
            warn!(pid = self.child.id(), "Killing simulation process that was not closed");
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

#[derive(Debug, PartialEq)]
pub(crate) enum Response {
    Ok,
    Value(ReportValue),
    Error(String),
}

pub(crate) fn parse_response(line: &str) -> Result<Response, LinkError> {
    if line == "ok" {
        return Ok(Response::Ok);
    }
    if line == "error" {
        return Ok(Response::Error(String::new()));
    }
    if let Some(message) = line.strip_prefix("error ") {
        return Ok(Response::Error(message.to_string()));
    }
    if let Some(json) = line.strip_prefix("value ") {
        return serde_json::from_str(json)
            .map(Response::Value)
            .map_err(|error| LinkError::Protocol(format!("bad report value {json:?}: {error}")));
    }
    Err(LinkError::Protocol(format!("unrecognized response {line:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_responses() {
        assert_eq!(parse_response("ok").unwrap(), Response::Ok);
        assert_eq!(
            parse_response("value 42").unwrap(),
            Response::Value(ReportValue::Number(42.0))
        );
        assert_eq!(
            parse_response("value false").unwrap(),
            Response::Value(ReportValue::Bool(false))
        );
        assert_eq!(
            parse_response("error Nothing named NUM-SHEP has been defined").unwrap(),
            Response::Error("Nothing named NUM-SHEP has been defined".to_string())
        );
    }

    #[test]
    fn rejects_malformed_responses() {
        assert!(matches!(parse_response("okay"), Err(LinkError::Protocol(_))));
        assert!(matches!(parse_response("value {"), Err(LinkError::Protocol(_))));
        assert!(matches!(parse_response(""), Err(LinkError::Protocol(_))));
    }

    #[cfg(unix)]
    mod process {
        use super::*;

        const ECHO_MODEL: &str = r#"
while read -r verb rest; do
  case "$verb" in
    command)
      case "$rest" in
        bad*) echo "error unknown command" ;;
        *) echo ok ;;
      esac ;;
    report) echo "value 42" ;;
    quit) exit 0 ;;
  esac
done
"#;

        fn shell(script: &str) -> StdioLink {
            StdioLink::spawn(&StdioLinkConfig::new("sh").arg("-c").arg(script)).unwrap()
        }

        #[test]
        fn speaks_line_protocol() {
            let mut link = shell(ECHO_MODEL);
            link.command("setup").unwrap();
            assert_eq!(link.report("ticks").unwrap(), ReportValue::Number(42.0));
            assert_eq!(link.report_u64("ticks").unwrap(), 42);
            assert!(matches!(
                link.command("bad-command"),
                Err(LinkError::Backend(message)) if message == "unknown command"
            ));
            link.close().unwrap();
            link.close().unwrap();
        }

        #[test]
        fn refuses_multiline_requests() {
            let mut link = shell(ECHO_MODEL);
            assert!(matches!(
                link.command("setup\ngo"),
                Err(LinkError::Protocol(_))
            ));
            link.command("go").unwrap();
            link.close().unwrap();
        }

        #[test]
        fn close_kills_process_that_ignores_quit() {
            let config = StdioLinkConfig::new("sh")
                .arg("-c")
                .arg("exec sleep 30")
                .with_shutdown_grace(Duration::from_millis(100));
            let mut link = StdioLink::spawn(&config).unwrap();

            let started = Instant::now();
            link.close().unwrap();
            assert!(started.elapsed() < Duration::from_secs(10));
            assert!(link.child.try_wait().unwrap().is_some());
        }

        #[test]
        fn shutdown_grace_defaults_when_missing() {
            let config: StdioLinkConfig = serde_json::from_str(r#"{"program": "bridge"}"#).unwrap();
            assert_eq!(config.shutdown_grace_ms, 2000);
            assert!(config.args.is_empty());
        }

        #[test]
        fn reports_disconnect() {
            let mut link = shell("read -r line; exit 0");
            assert!(matches!(link.command("setup"), Err(LinkError::Disconnected)));
            link.close().unwrap();
        }
    }
}
