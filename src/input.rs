use std::os::unix::io::RawFd;

use log::debug;
use nix::errno::Errno;
use nix::unistd;

use crate::error::{Result, ShellError};

/// Longest line kept, terminator included.
pub const INPUT_MAX: usize = 1024;

const CHUNK: usize = 512;

#[derive(Debug, PartialEq, Eq)]
pub enum ReadLine {
	Line(String),
	/// A caught signal cut the read short; the partial line is dropped.
	Interrupted,
	Eof,
}

/// Reads lines straight from a descriptor so that `EINTR` reaches the caller
/// instead of being retried.
#[derive(Debug)]
pub struct LineReader {
	fd: RawFd,
	buf: Vec<u8>,
	discarding: bool,
	eof: bool,
}

impl LineReader {
	pub fn new(fd: RawFd) -> LineReader {
		LineReader { fd: fd, buf: Vec::with_capacity(INPUT_MAX), discarding: false, eof: false }
	}

	pub fn stdin() -> LineReader {
		LineReader::new(libc::STDIN_FILENO)
	}

	fn take_line(&mut self, end: usize, skip: usize) -> String {
		let rest = self.buf.split_off(end + skip);
		let mut line = std::mem::replace(&mut self.buf, rest);
		line.truncate(end.min(INPUT_MAX - 1));
		String::from_utf8_lossy(&line).into_owned()
	}

	fn push(&mut self, mut bytes: &[u8]) {
		if self.discarding {
			match bytes.iter().position(|&b| b == b'\n') {
				Some(pos) => {
					self.discarding = false;
					bytes = &bytes[pos ..];
				},
				None => { return; },
			}
		}
		self.buf.extend_from_slice(bytes);
	}

	pub fn read_line(&mut self) -> Result<ReadLine> {
		loop {
			if let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
				return Ok(ReadLine::Line(self.take_line(pos, 1)));
			}
			if self.buf.len() >= INPUT_MAX {
				debug!("line longer than {} bytes, truncating", INPUT_MAX - 1);
				self.buf.truncate(INPUT_MAX - 1);
				self.discarding = true;
			}
			if self.eof {
				if self.buf.is_empty() {
					return Ok(ReadLine::Eof);
				}
				self.discarding = false;
				let len = self.buf.len();
				return Ok(ReadLine::Line(self.take_line(len, 0)));
			}
			let mut chunk = [0u8; CHUNK];
			match unistd::read(self.fd, &mut chunk) {
				Ok(0) => { self.eof = true; },
				Ok(n) => self.push(&chunk[.. n]),
				Err(Errno::EINTR) => {
					self.buf.clear();
					self.discarding = false;
					return Ok(ReadLine::Interrupted);
				},
				Err(e) => { return Err(ShellError::Read(e)); },
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs::File;
	use std::io::{Seek, SeekFrom, Write};
	use std::os::unix::io::AsRawFd;
	use std::time::Duration;

	use crate::signal::{self, testing};

	fn reader_over(contents: &[u8]) -> (File, LineReader) {
		let mut file = tempfile::tempfile().unwrap();
		file.write_all(contents).unwrap();
		file.seek(SeekFrom::Start(0)).unwrap();
		let reader = LineReader::new(file.as_raw_fd());
		(file, reader)
	}

	fn line(s: &str) -> ReadLine {
		ReadLine::Line(s.to_string())
	}

	#[test]
	fn reads_lines_then_eof() {
		let (_file, mut reader) = reader_over(b"echo hi\n\ncd /tmp\n");
		assert_eq!(reader.read_line().unwrap(), line("echo hi"));
		assert_eq!(reader.read_line().unwrap(), line(""));
		assert_eq!(reader.read_line().unwrap(), line("cd /tmp"));
		assert_eq!(reader.read_line().unwrap(), ReadLine::Eof);
		assert_eq!(reader.read_line().unwrap(), ReadLine::Eof);
	}

	#[test]
	fn last_line_without_newline_is_kept() {
		let (_file, mut reader) = reader_over(b"true\nexit");
		assert_eq!(reader.read_line().unwrap(), line("true"));
		assert_eq!(reader.read_line().unwrap(), line("exit"));
		assert_eq!(reader.read_line().unwrap(), ReadLine::Eof);
	}

	#[test]
	fn long_lines_are_truncated() {
		let mut input = vec![b'a'; 3000];
		input.extend_from_slice(b"\nnext\n");
		let (_file, mut reader) = reader_over(&input);
		match reader.read_line().unwrap() {
			ReadLine::Line(l) => {
				assert_eq!(l.len(), INPUT_MAX - 1);
				assert!(l.bytes().all(|b| b == b'a'));
			},
			r => panic!("unexpected {:?}", r),
		}
		assert_eq!(reader.read_line().unwrap(), line("next"));
	}

	#[test]
	fn invalid_utf8_is_replaced() {
		let (_file, mut reader) = reader_over(b"echo \xff\n");
		assert_eq!(reader.read_line().unwrap(), line("echo \u{fffd}"));
	}

	#[test]
	fn read_error_is_reported() {
		let mut reader = LineReader::new(-1);
		match reader.read_line() {
			Err(ShellError::Read(Errno::EBADF)) => {},
			r => panic!("unexpected {:?}", r),
		}
	}

	#[test]
	fn interrupted_read_drops_partial_line() {
		let _guard = testing::lock();
		signal::install_interrupt_handler().unwrap();
		let (read_end, write_end) = unistd::pipe().unwrap();
		let mut reader = LineReader::new(read_end.as_raw_fd());
		unistd::write(&write_end, b"ech").unwrap();
		{
			let _interrupter = testing::Interrupter::start(Duration::from_millis(50));
			assert_eq!(reader.read_line().unwrap(), ReadLine::Interrupted);
		}
		unistd::write(&write_end, b"true\n").unwrap();
		assert_eq!(reader.read_line().unwrap(), line("true"));
	}
}
