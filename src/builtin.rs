use std::env;

use crate::error::{Result, ShellError};
use crate::global;
use crate::types::Status;

const STATUS_TOKEN: &str = "$?";

pub type Builtin = fn(&mut global::State, &[String]) -> Result<Status>;

pub fn builtin_cd(_: &mut global::State, arguments: &[String]) -> Result<Status> {
	let path = arguments.first().ok_or(ShellError::CdMissingOperand)?;
	env::set_current_dir(path).map_err(|e| ShellError::Cd { path: path.clone(), source: e })?;
	Ok(Status::SUCCESS)
}

pub fn builtin_exit(state: &mut global::State, _: &[String]) -> Result<Status> {
	state.request_exit();
	Ok(state.status)
}

pub fn match_builtin(name: &str) -> Option<Builtin> {
	match name {
		"cd" => Some(builtin_cd),
		"exit" => Some(builtin_exit),
		_ => None,
	}
}

/// Replaces every `$?` token with the previous status.
pub fn substitute_status(tokens: &mut [String], status: Status) {
	for token in tokens.iter_mut() {
		if token.as_str() == STATUS_TOKEN {
			*token = status.to_string();
		}
	}
}
