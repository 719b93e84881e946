use std::fmt;

/// Process exit status for a failed command; success is always 0.
///
/// | code | meaning |
/// |---|---|
/// | 2 | invalid arguments or config |
/// | 3 | todo or session command without a login |
/// | 10 | anything else (I/O, export, ingest read) |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    InvalidArgs,
    NotLoggedIn,
    Failed,
}

impl ExitCode {
    pub const fn as_i32(self) -> i32 {
        match self {
            ExitCode::InvalidArgs => 2,
            ExitCode::NotLoggedIn => 3,
            ExitCode::Failed => 10,
        }
    }
}

#[derive(Debug)]
pub struct ExitError {
    pub code: ExitCode,
    pub err: anyhow::Error,
}

impl ExitError {
    pub fn new(code: ExitCode, err: anyhow::Error) -> Self {
        Self { code, err }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.err.fmt(f)
    }
}

impl std::error::Error for ExitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.err.as_ref())
    }
}

pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(exit) = err.downcast_ref::<ExitError>() {
        return exit.code.as_i32();
    }
    ExitCode::Failed.as_i32()
}

pub fn invalid_args(message: impl Into<String>) -> anyhow::Error {
    ExitError::new(ExitCode::InvalidArgs, anyhow::anyhow!(message.into())).into()
}

pub fn invalid_args_err(err: anyhow::Error) -> anyhow::Error {
    ExitError::new(ExitCode::InvalidArgs, err).into()
}

pub fn not_logged_in() -> anyhow::Error {
    ExitError::new(
        ExitCode::NotLoggedIn,
        anyhow::anyhow!("not logged in; run `todokit login <username>` first"),
    )
    .into()
}
