use std::fmt;
use std::os::unix::io::RawFd;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RedirectType { Input, Output, Append, Error, OutputAndError }

impl RedirectType {
	pub fn from_token(token: &str) -> Option<RedirectType> {
		match token {
			"<" => Some(RedirectType::Input),
			">" | "1>" => Some(RedirectType::Output),
			">>" => Some(RedirectType::Append),
			"2>" => Some(RedirectType::Error),
			"&>" => Some(RedirectType::OutputAndError),
			_ => None,
		}
	}

	pub fn slots(self) -> &'static [Slot] {
		match self {
			RedirectType::Input => &[Slot::Input],
			RedirectType::Output | RedirectType::Append => &[Slot::Output],
			RedirectType::Error => &[Slot::Error],
			RedirectType::OutputAndError => &[Slot::Output, Slot::Error],
		}
	}
}

/// One of the three standard streams.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Slot { Input, Output, Error }

impl Slot {
	pub const ALL: [Slot; 3] = [Slot::Input, Slot::Output, Slot::Error];

	pub fn fd(self) -> RawFd {
		match self {
			Slot::Input => libc::STDIN_FILENO,
			Slot::Output => libc::STDOUT_FILENO,
			Slot::Error => libc::STDERR_FILENO,
		}
	}

	pub fn index(self) -> usize {
		self.fd() as usize
	}
}

impl fmt::Display for Slot {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			Slot::Input => f.write_str("stdin"),
			Slot::Output => f.write_str("stdout"),
			Slot::Error => f.write_str("stderr"),
		}
	}
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Redirect {
	pub target: String,
	pub typ: RedirectType,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Command {
	pub name: String,
	pub arguments: Vec<String>,
	pub redirects: Vec<Redirect>,
}

/// Outcome of the most recent command line.
///
/// Normal termination keeps the exit code (0..=255), termination by a signal
/// is `128 + signo`, anything else the wait status could not classify is
/// carried through raw.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Status(i32);

impl Status {
	pub const SUCCESS: Status = Status(0);
	pub const FAILURE: Status = Status(1);
	pub const NOT_EXECUTABLE: Status = Status(126);
	pub const NOT_FOUND: Status = Status(127);
	pub const LAUNCH_FAILURE: Status = Status(255);

	pub fn new(code: i32) -> Status {
		Status(code)
	}

	pub fn signaled(signo: i32) -> Status {
		Status(128 + signo)
	}

	pub fn code(self) -> i32 {
		self.0
	}
}

impl fmt::Display for Status {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}
