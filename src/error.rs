use std::collections::TryReserveError;
use std::io::Write;
use std::{ffi, io};

use log::debug;
use thiserror::Error;

use crate::types::{Slot, Status};

#[derive(Debug, Error)]
pub enum ShellError {
	#[error("read: {0}")]
	Read(#[source] nix::Error),
	#[error("cannot store tokens: {0}")]
	Alloc(#[from] TryReserveError),
	#[error("syntax error: missing redirection target after `{0}`")]
	MissingTarget(String),
	#[error("{path}: {source}")]
	Open { path: String, #[source] source: io::Error },
	#[error("cannot redirect {slot}: {source}")]
	Redirect { slot: Slot, #[source] source: nix::Error },
	#[error("cannot restore {slot}: {source}")]
	Restore { slot: Slot, #[source] source: nix::Error },
	#[error("fork: {0}")]
	Fork(#[source] nix::Error),
	#[error("wait: {0}")]
	Wait(#[source] nix::Error),
	#[error("{0}: command not found")]
	NotFound(String),
	#[error("{command}: {source}")]
	Exec { command: String, #[source] source: nix::Error },
	#[error("argument contains a NUL byte: {0}")]
	Nul(#[from] ffi::NulError),
	#[error("cd: missing operand")]
	CdMissingOperand,
	#[error("cd: {path}: {source}")]
	Cd { path: String, #[source] source: io::Error },
	#[error("sigaction: {0}")]
	Signal(#[source] nix::Error),
}

pub type Result<T> = std::result::Result<T, ShellError>;

impl ShellError {
	/// Status left behind by a command line that failed with this error.
	/// `None` keeps the previous status.
	pub fn status(&self) -> Option<Status> {
		match *self {
			ShellError::Alloc(_) | ShellError::Read(_) | ShellError::Wait(_) => None,
			ShellError::NotFound(_) => Some(Status::NOT_FOUND),
			ShellError::Exec { .. } => Some(Status::NOT_EXECUTABLE),
			ShellError::Fork(_) => Some(Status::LAUNCH_FAILURE),
			_ => Some(Status::FAILURE),
		}
	}
}

/// Prints a diagnostic on the error stream.
pub fn report(e: &ShellError) {
	debug!("{:?}", e);
	let _ = writeln!(&mut io::stderr(), "minish: {}", e);
}

#[cfg(test)]
mod tests {
	use super::*;
	use nix::errno::Errno;

	#[test]
	fn statuses_by_error_kind() {
		assert_eq!(ShellError::NotFound("nope".to_string()).status(), Some(Status::NOT_FOUND));
		assert_eq!(ShellError::Exec { command: "x".to_string(), source: Errno::EACCES }.status(), Some(Status::NOT_EXECUTABLE));
		assert_eq!(ShellError::Fork(Errno::EAGAIN).status(), Some(Status::LAUNCH_FAILURE));
		assert_eq!(ShellError::MissingTarget(">".to_string()).status(), Some(Status::FAILURE));
		assert_eq!(ShellError::CdMissingOperand.status(), Some(Status::FAILURE));
		assert_eq!(ShellError::Wait(Errno::ECHILD).status(), None);
	}

	#[test]
	fn messages_name_the_operation_and_reason() {
		let e = ShellError::Exec { command: "./script".to_string(), source: Errno::EACCES };
		assert_eq!(e.to_string(), "./script: EACCES: Permission denied");
		assert_eq!(ShellError::NotFound("frob".to_string()).to_string(), "frob: command not found");
		assert!(ShellError::Fork(Errno::EAGAIN).to_string().starts_with("fork: EAGAIN"));
	}
}
