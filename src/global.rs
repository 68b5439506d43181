use log::debug;

use crate::error::{self, ShellError};
use crate::eval;
use crate::parser;
use crate::types::Status;

/// Interpreter session: the latest status and whether `exit` was run.
#[derive(Debug, Default)]
pub struct State {
	pub status: Status,
	exit_requested: bool,
}

impl State {
	pub fn new() -> State {
		State { status: Status::SUCCESS, exit_requested: false }
	}

	pub fn request_exit(&mut self) {
		self.exit_requested = true;
	}

	pub fn exit_requested(&self) -> bool {
		self.exit_requested
	}

	fn fail(&mut self, e: ShellError) {
		error::report(&e);
		if let Some(status) = e.status() {
			self.status = status;
		}
	}

	/// Handles one input line and records its status. Blank lines leave the
	/// status untouched.
	pub fn run_line(&mut self, line: &str) {
		let command = match parser::parse(line, self.status) {
			Ok(Some(command)) => command,
			Ok(None) => { return; },
			Err(e) => { return self.fail(e); },
		};
		debug!("command {:?}", command);
		match eval::eval(self, command) {
			Ok(status) => self.status = status,
			Err(e) => self.fail(e),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn blank_line_keeps_status() {
		let mut state = State::new();
		state.status = Status::new(7);
		state.run_line("");
		state.run_line("   \t ");
		assert_eq!(state.status, Status::new(7));
		assert!(!state.exit_requested());
	}

	#[test]
	fn missing_target_fails_the_line() {
		let mut state = State::new();
		state.run_line("echo hi >");
		assert_eq!(state.status, Status::FAILURE);
	}

	#[test]
	fn exit_is_recorded_with_current_status() {
		let mut state = State::new();
		state.status = Status::new(3);
		state.run_line("exit");
		assert!(state.exit_requested());
		assert_eq!(state.status, Status::new(3));
	}

	#[test]
	fn cd_failures_set_status_one() {
		let mut state = State::new();
		state.run_line("cd");
		assert_eq!(state.status, Status::FAILURE);
		state.run_line("cd .");
		assert_eq!(state.status, Status::SUCCESS);
		state.run_line("cd /nonexistent/minish-test-dir");
		assert_eq!(state.status, Status::FAILURE);
	}
}
