use std::sync::atomic::{AtomicI32, Ordering};

use log::debug;
use nix::fcntl::{fcntl, FcntlArg};
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};

use crate::error::{Result, ShellError};

// Where the handler writes its newline; a copy of the interpreter's own stdout
// so a builtin's `> file` never receives it.
static NEWLINE_FD: AtomicI32 = AtomicI32::new(libc::STDOUT_FILENO);

#[cfg(test)]
pub static INTERRUPTS: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);

extern "C" fn handle_interrupt(_: libc::c_int) {
	let newline = b"\n";
	let fd = NEWLINE_FD.load(Ordering::Relaxed);
	// Only async-signal-safe calls here.
	unsafe {
		libc::write(fd, newline.as_ptr() as *const libc::c_void, newline.len());
	}
	#[cfg(test)]
	INTERRUPTS.fetch_add(1, Ordering::SeqCst);
}

fn set_interrupt_handler(handler: SigHandler) -> Result<SigHandler> {
	// No SA_RESTART: a blocked read must return EINTR so the prompt is redrawn.
	let action = SigAction::new(handler, SaFlags::empty(), SigSet::empty());
	let prev = unsafe { signal::sigaction(Signal::SIGINT, &action) }.map_err(ShellError::Signal)?;
	Ok(prev.handler())
}

/// Keeps the interpreter alive on Ctrl-C.
pub fn install_interrupt_handler() -> Result<()> {
	if NEWLINE_FD.load(Ordering::SeqCst) == libc::STDOUT_FILENO {
		match fcntl(libc::STDOUT_FILENO, FcntlArg::F_DUPFD_CLOEXEC(10)) {
			Ok(fd) => NEWLINE_FD.store(fd, Ordering::SeqCst),
			Err(e) => debug!("interrupt newlines stay on fd 1: {}", e),
		}
	}
	set_interrupt_handler(SigHandler::Handler(handle_interrupt))?;
	Ok(())
}

/// Gives a forked child the platform default so Ctrl-C terminates it.
pub fn restore_default_interrupt() -> Result<()> {
	set_interrupt_handler(SigHandler::SigDfl)?;
	Ok(())
}


#[cfg(test)]
mod tests {
	use super::*;
	use nix::sys::stat::fstat;
	use nix::unistd;
	use std::os::unix::io::AsRawFd;

	#[test]
	fn interpreter_survives_interrupt_until_default_is_restored() {
		let _guard = testing::lock();
		install_interrupt_handler().unwrap();
		signal::raise(Signal::SIGINT).unwrap();

		let prev = set_interrupt_handler(SigHandler::SigDfl).unwrap();
		assert!(matches!(prev, SigHandler::Handler(_)));

		install_interrupt_handler().unwrap();
		restore_default_interrupt().unwrap();
		let prev = set_interrupt_handler(SigHandler::SigDfl).unwrap();
		assert!(matches!(prev, SigHandler::SigDfl));
	}

	#[test]
	fn newline_goes_to_a_copy_of_stdout() {
		let _guard = testing::lock();
		install_interrupt_handler().unwrap();
		let fd = NEWLINE_FD.load(Ordering::SeqCst);
		assert_ne!(fd, libc::STDOUT_FILENO);
		let copy = fstat(fd).unwrap();
		let stdout = fstat(libc::STDOUT_FILENO).unwrap();
		assert_eq!((copy.st_dev, copy.st_ino), (stdout.st_dev, stdout.st_ino));
	}

	#[test]
	fn handler_writes_a_newline() {
		let _guard = testing::lock();
		install_interrupt_handler().unwrap();
		let (read_end, write_end) = unistd::pipe().unwrap();
		let prev = NEWLINE_FD.swap(write_end.as_raw_fd(), Ordering::SeqCst);
		signal::raise(Signal::SIGINT).unwrap();
		NEWLINE_FD.store(prev, Ordering::SeqCst);

		let mut buf = [0u8; 4];
		assert_eq!(unistd::read(read_end.as_raw_fd(), &mut buf).unwrap(), 1);
		assert_eq!(buf[0], b'\n');
	}
}
