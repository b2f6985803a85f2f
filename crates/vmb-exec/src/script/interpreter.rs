use std::fmt;

use crate::ExecError;

/// Program used to run script files, plus the arguments preceding the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    program: String,
    base_args: Vec<String>,
    /// File extension without the leading dot.
    extension: String,
}

impl Interpreter {
    pub fn new(program: impl Into<String>, base_args: Vec<String>, extension: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            base_args,
            extension: extension.into(),
        }
    }

    /// Windows PowerShell running a `.ps1` file non-interactively.
    pub fn powershell() -> Self {
        Self::new(
            "powershell",
            ["-NoProfile", "-NonInteractive", "-ExecutionPolicy", "Bypass", "-File"]
                .into_iter()
                .map(String::from)
                .collect(),
            "ps1",
        )
    }

    /// POSIX shell running a `.sh` file.
    pub fn posix() -> Self {
        Self::new("sh", Vec::new(), "sh")
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn base_args(&self) -> &[String] {
        &self.base_args
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Rules:
    /// - `program` is not empty or whitespace-only;
    /// - `extension` is not empty and carries no leading dot.
    pub fn validate(&self) -> Result<(), ExecError> {
        if self.program.trim().is_empty() {
            return Err(ExecError::InvalidConfig("interpreter program is empty".into()));
        }
        if self.extension.is_empty() || self.extension.starts_with('.') {
            return Err(ExecError::InvalidConfig(format!(
                "script extension '{}' must be non-empty and without a leading dot",
                self.extension
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Interpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Interpreter(program='{}', args={}, ext={})", self.program, self.base_args.len(), self.extension)
    }
}
