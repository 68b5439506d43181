use log::debug;
use nix::errno::Errno;
use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;

use crate::error::{Result, ShellError};
use crate::types::Status;

pub trait WaitStatusExt {
	fn status(self) -> Option<Status>;
}

impl WaitStatusExt for WaitStatus {
	fn status(self) -> Option<Status> {
		match self {
			WaitStatus::Exited(_, code) => Some(Status::new(code)),
			WaitStatus::Signaled(_, signal, _) => Some(Status::signaled(signal as i32)),
			_ => None,
		}
	}
}

/// Turns a raw `waitpid` status into a `Status`. Forms that are neither a
/// normal exit nor a signal termination come back unchanged.
pub fn decode(pid: Pid, raw: libc::c_int) -> Status {
	match WaitStatus::from_raw(pid, raw).ok().and_then(|s| s.status()) {
		Some(status) => status,
		None => {
			debug!("unclassified wait status {:#x} for pid {}", raw, pid);
			Status::new(raw)
		},
	}
}

/// Blocks until `pid` terminates. A wait interrupted by a caught signal is
/// retried.
pub fn wait_child(pid: Pid) -> Result<Status> {
	loop {
		let mut raw: libc::c_int = 0;
		let r = unsafe { libc::waitpid(pid.as_raw(), &mut raw, 0) };
		match Errno::result(r) {
			Ok(_) => {
				let status = decode(pid, raw);
				debug!("pid {} finished with status {}", pid, status);
				return Ok(status);
			},
			Err(Errno::EINTR) => {
				debug!("wait for pid {} interrupted, retrying", pid);
			},
			Err(e) => { return Err(ShellError::Wait(e)); },
		}
	}
}
