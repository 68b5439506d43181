use std::convert::Infallible;
use std::ffi::{self, CString};
use std::io::{self, Write};
use std::iter;

use log::debug;
use nix::errno::Errno;
use nix::unistd::{self, ForkResult};

use crate::builtin;
use crate::error::{self, Result, ShellError};
use crate::global;
use crate::redirect::ProcessContext;
use crate::signal;
use crate::types::{Command, Status};
use crate::wait;

fn build_argv(ctx: &ProcessContext) -> Result<Vec<CString>> {
	let argv: std::result::Result<Vec<CString>, ffi::NulError> = iter::once(&ctx.command)
		.chain(ctx.arguments.iter())
		.map(|s| CString::new(s.as_str()))
		.collect();
	Ok(argv?)
}

fn do_exec_command(ctx: &mut ProcessContext, argv: &[CString]) -> Result<Infallible> {
	signal::restore_default_interrupt()?;
	ctx.apply()?;
	unistd::execvp(&argv[0], argv).map_err(|e| match e {
		Errno::ENOENT => ShellError::NotFound(ctx.command.clone()),
		e => ShellError::Exec { command: ctx.command.clone(), source: e },
	})
}

/// Runs in the forked child and never returns.
fn exec_command(ctx: &mut ProcessContext, argv: &[CString]) -> ! {
	let e = match do_exec_command(ctx, argv) {
		Ok(never) => match never {},
		Err(e) => e,
	};
	error::report(&e);
	let status = e.status().unwrap_or(Status::FAILURE);
	if let Err(e) = ctx.restore() {
		error::report(&e);
	}
	unsafe { libc::_exit(status.code()) }
}

fn spawn_command(mut ctx: ProcessContext) -> Result<Status> {
	let argv = build_argv(&ctx)?;
	let _ = io::stdout().flush();
	let _ = io::stderr().flush();
	match unsafe { unistd::fork() }.map_err(ShellError::Fork)? {
		ForkResult::Child => exec_command(&mut ctx, &argv),
		ForkResult::Parent { child } => {
			debug!("forked pid {} for {:?}", child, argv);
			// The child holds its own copies of the redirection targets.
			drop(ctx);
			wait::wait_child(child)
		},
	}
}

fn run_builtin(state: &mut global::State, func: builtin::Builtin, mut ctx: ProcessContext) -> Result<Status> {
	ctx.apply()?;
	let status = match func(state, &ctx.arguments) {
		Ok(s) => s,
		Err(e) => {
			error::report(&e);
			e.status().unwrap_or(Status::FAILURE)
		},
	};
	ctx.restore()?;
	Ok(status)
}

/// Opens the command's redirections, then runs it as a builtin in this
/// process or as a forked child, and returns its status.
pub fn eval(state: &mut global::State, command: Command) -> Result<Status> {
	let (mut ctx, redirects) = ProcessContext::new(command);
	ctx.open_redirects(&redirects)?;
	if ctx.command.is_empty() {
		// Only redirections: the targets have been created, nothing to run.
		return Ok(Status::SUCCESS);
	}
	if let Some(func) = builtin::match_builtin(&ctx.command) {
		return run_builtin(state, func, ctx);
	}
	spawn_command(ctx)
}
