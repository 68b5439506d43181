use std::fs;
use std::io::{self, Write};
use std::os::unix::io::{AsRawFd, FromRawFd, OwnedFd, RawFd};

use log::{debug, warn};
use nix::fcntl::{fcntl, FcntlArg};
use nix::unistd;

use crate::error::{Result, ShellError};
use crate::types::{Command, Redirect, RedirectType, Slot};

// Snapshots of the standard streams are kept above the range commands expect.
const SAVED_FD_MIN: RawFd = 10;

fn dup_cloexec(fd: RawFd) -> nix::Result<OwnedFd> {
	let raw = fcntl(fd, FcntlArg::F_DUPFD_CLOEXEC(SAVED_FD_MIN))?;
	Ok(unsafe { OwnedFd::from_raw_fd(raw) })
}

/// Execution environment of one command line.
///
/// `redirections` holds the opened targets waiting to be installed on their
/// stream slot, `saved_streams` the original streams replaced by `apply`.
/// Both are closed when the context is restored or dropped, so nothing
/// survives into the next command line.
#[derive(Debug)]
pub struct ProcessContext {
	pub command: String,
	pub arguments: Vec<String>,
	saved_streams: [Option<OwnedFd>; 3],
	redirections: [Option<OwnedFd>; 3],
}

impl ProcessContext {
	pub fn new(command: Command) -> (ProcessContext, Vec<Redirect>) {
		let ctx = ProcessContext {
			command: command.name,
			arguments: command.arguments,
			saved_streams: Default::default(),
			redirections: Default::default(),
		};
		(ctx, command.redirects)
	}

	/// Opens every target left to right. A later redirection of a slot closes
	/// the earlier one; if any open fails, everything opened so far is closed.
	pub fn open_redirects(&mut self, redirects: &[Redirect]) -> Result<()> {
		for redirect in redirects {
			if let Err(e) = self.open_redirect(redirect) {
				self.redirections = Default::default();
				return Err(e);
			}
		}
		Ok(())
	}

	fn open_redirect(&mut self, redirect: &Redirect) -> Result<()> {
		let mut oopt = fs::OpenOptions::new();
		let _ = match redirect.typ {
			RedirectType::Input => oopt.read(true),
			RedirectType::Output | RedirectType::Error | RedirectType::OutputAndError =>
				oopt.write(true).create(true).truncate(true),
			RedirectType::Append => oopt.append(true).create(true),
		};
		let file = oopt.open(&redirect.target).map_err(|e| ShellError::Open {
			path: redirect.target.clone(),
			source: e,
		})?;
		let fd = OwnedFd::from(file);
		debug!("opened {:?} for {:?} as fd {}", redirect.target, redirect.typ, fd.as_raw_fd());
		let slots = redirect.typ.slots();
		for &slot in &slots[1 ..] {
			let copy = dup_cloexec(fd.as_raw_fd()).map_err(|e| ShellError::Redirect { slot: slot, source: e })?;
			self.set_redirection(slot, copy);
		}
		self.set_redirection(slots[0], fd);
		Ok(())
	}

	fn set_redirection(&mut self, slot: Slot, fd: OwnedFd) {
		if let Some(prev) = self.redirections[slot.index()].replace(fd) {
			debug!("{} redirected again, closing fd {}", slot, prev.as_raw_fd());
		}
	}

	/// Installs the opened targets on the standard streams, keeping a
	/// snapshot of each replaced stream. On failure the streams already
	/// replaced are put back before the error is returned.
	pub fn apply(&mut self) -> Result<()> {
		for &slot in Slot::ALL.iter() {
			if let Err(e) = self.apply_slot(slot) {
				if let Err(restore_err) = self.restore() {
					warn!("unwinding redirections: {}", restore_err);
				}
				return Err(e);
			}
		}
		Ok(())
	}

	fn apply_slot(&mut self, slot: Slot) -> Result<()> {
		let fd = match self.redirections[slot.index()].take() {
			Some(fd) => fd,
			None => { return Ok(()); },
		};
		if self.saved_streams[slot.index()].is_none() {
			let saved = dup_cloexec(slot.fd()).map_err(|e| ShellError::Redirect { slot: slot, source: e })?;
			self.saved_streams[slot.index()] = Some(saved);
		}
		if slot == Slot::Output {
			let _ = io::stdout().flush();
		}
		unistd::dup2(fd.as_raw_fd(), slot.fd()).map_err(|e| ShellError::Redirect { slot: slot, source: e })?;
		Ok(())
	}

	/// Puts every captured stream back. All three slots are attempted even
	/// if one fails; the first failure is returned.
	pub fn restore(&mut self) -> Result<()> {
		let _ = io::stdout().flush();
		self.restore_onto(Slot::ALL.map(Slot::fd))
	}

	fn restore_onto(&mut self, targets: [RawFd; 3]) -> Result<()> {
		let mut first_err: Option<ShellError> = None;
		for &slot in Slot::ALL.iter() {
			if let Some(saved) = self.saved_streams[slot.index()].take() {
				if let Err(e) = unistd::dup2(saved.as_raw_fd(), targets[slot.index()]) {
					if first_err.is_none() {
						first_err = Some(ShellError::Restore { slot: slot, source: e });
					}
				}
			}
		}
		self.redirections = Default::default();
		match first_err {
			Some(e) => Err(e),
			None => Ok(()),
		}
	}
}

impl Drop for ProcessContext {
	fn drop(&mut self) {
		if self.saved_streams.iter().any(Option::is_some) {
			if let Err(e) = self.restore() {
				warn!("{}", e);
			}
		}
	}
}
