use std::{
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, trace};
use uuid::Uuid;
use vmb_model::Env;

use crate::{
    ExecError,
    script::{Interpreter, LogConfig, ScriptExecutor},
};

/// Executor that runs every script in a fresh interpreter process.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    interpreter: Interpreter,
    /// Extra environment on top of the inherited one.
    env: Env,
    /// Kill the interpreter if it runs longer than this.
    timeout: Option<Duration>,
    log: LogConfig,
}

impl ShellExecutor {
    pub fn new(interpreter: Interpreter) -> Self {
        Self {
            interpreter,
            env: Env::new(),
            timeout: None,
            log: LogConfig::default(),
        }
    }

    pub fn powershell() -> Self {
        Self::new(Interpreter::powershell())
    }

    pub fn posix() -> Self {
        Self::new(Interpreter::posix())
    }

    pub fn with_env(mut self, env: Env) -> Self {
        self.env = env;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    async fn spawn_and_wait(&self, path: &Path, args: &[String]) -> Result<String, ExecError> {
        trace!(
            program = %self.interpreter.program(),
            script = %path.display(),
            args = ?args,
            env_len = self.env.len(),
            "spawning script interpreter"
        );

        let mut cmd = Command::new(self.interpreter.program());
        cmd.args(self.interpreter.base_args()).arg(path).args(args);
        for kv in self.env.iter() {
            cmd.env(kv.key(), kv.value());
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        // Dropping the wait future on timeout drops the child, which kills it.
        cmd.kill_on_drop(true);

        let child = cmd.spawn()?;
        let wait = child.wait_with_output();
        let out = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, wait)
                .await
                .map_err(|_| ExecError::Timeout {
                    after_ms: limit.as_millis() as u64,
                })??,
            None => wait.await?,
        };

        let stderr = String::from_utf8_lossy(&out.stderr);
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            debug!(target: "vmb::exec::stderr", line = self.log.clip(line), "script stderr");
        }

        if out.status.success() {
            let stdout = String::from_utf8_lossy(&out.stdout);
            return Ok(stdout.trim_end().to_string());
        }

        let stderr = stderr.trim().to_string();
        match out.status.code() {
            Some(code) => Err(ExecError::Script { code, stderr }),
            None => Err(ExecError::Terminated { stderr }),
        }
    }
}

#[async_trait]
impl ScriptExecutor for ShellExecutor {
    async fn output(&self, script: &str, args: &[String]) -> Result<String, ExecError> {
        if script.trim().is_empty() {
            return Ok(String::new());
        }
        self.interpreter.validate()?;

        let file = ScriptFile::create(self.interpreter.extension(), script).await?;
        let res = self.spawn_and_wait(file.path(), args).await;
        file.remove().await;
        res
    }
}

/// Temporary script file, removed after the interpreter exits.
struct ScriptFile {
    path: PathBuf,
}

impl ScriptFile {
    async fn create(extension: &str, body: &str) -> Result<Self, ExecError> {
        let path = std::env::temp_dir().join(format!("vmb-{}.{extension}", Uuid::new_v4()));
        tokio::fs::write(&path, body).await?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    async fn remove(self) {
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            debug!(path = %self.path.display(), error = %e, "failed to remove script file");
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn blank_script_returns_empty_without_spawning() {
        let broken = ShellExecutor::new(Interpreter::new("", Vec::new(), "sh"));
        assert_eq!(broken.output("", &[]).await.unwrap(), "");
        assert_eq!(broken.output("  \n\t", &[]).await.unwrap(), "");
    }

    #[tokio::test]
    async fn positional_args_reach_the_script() {
        let exec = ShellExecutor::posix();
        let out = exec
            .output(
                r#"printf '%s %s %s\n' "$1" "$2" "$(( $3 + $4 ))""#,
                &args(&["a", "b", "5", "10"]),
            )
            .await
            .unwrap();
        assert_eq!(out, "a b 15");
    }

    #[tokio::test]
    async fn non_zero_exit_is_an_error_with_stderr() {
        let exec = ShellExecutor::posix();
        let err = exec.output("echo boom >&2\nexit 3", &[]).await.unwrap_err();
        match err {
            ExecError::Script { code, stderr } => {
                assert_eq!(code, 3);
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn extra_env_is_exported() {
        let mut env = Env::new();
        env.push("VMB_TEST_VALUE", "from-env");
        let exec = ShellExecutor::posix().with_env(env);

        let out = exec.output(r#"printf '%s' "$VMB_TEST_VALUE""#, &[]).await.unwrap();
        assert_eq!(out, "from-env");
    }

    #[tokio::test]
    async fn script_file_is_removed_afterwards() {
        let exec = ShellExecutor::posix();
        let path = exec.output(r#"printf '%s' "$0""#, &[]).await.unwrap();

        assert!(path.ends_with(".sh"), "{path}");
        assert!(!Path::new(&path).exists());
    }

    #[tokio::test]
    async fn timeout_kills_long_scripts() {
        let exec = ShellExecutor::posix().with_timeout(Duration::from_millis(100));
        let err = exec.output("sleep 5", &[]).await.unwrap_err();
        assert!(matches!(err, ExecError::Timeout { after_ms: 100 }));
    }

    #[tokio::test]
    async fn missing_interpreter_is_io_error() {
        let exec = ShellExecutor::new(Interpreter::new("vmb-no-such-interpreter", Vec::new(), "sh"));
        let err = exec.output("echo hi", &[]).await.unwrap_err();
        assert!(matches!(err, ExecError::Io(_)));
    }
}
