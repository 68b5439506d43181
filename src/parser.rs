use crate::builtin;
use crate::error::{Result, ShellError};
use crate::types::*;

struct Parser<'a> {
	line: &'a [u8],
	i: usize,
}

impl<'a> Parser<'a> {
	fn proceed_while<F>(&mut self, f: F) where F: Fn(u8) -> bool {
		while let Some(c) = self.line.get(self.i) {
			if !f(*c) { break; }
			self.i += 1;
		}
	}

	fn is_whitespace(c: u8) -> bool {
		match c {
			b' ' | b'\t' | b'\n' | b'\r' => true,
			_ => false,
		}
	}

	fn is_letter(c: u8) -> bool {
		!Parser::is_whitespace(c)
	}

	fn skip_whitespaces(&mut self) {
		self.proceed_while(Parser::is_whitespace);
	}

	fn read_word(&mut self) -> &'a [u8] {
		let orig = self.i;
		self.proceed_while(Parser::is_letter);
		&self.line[orig .. self.i]
	}

	fn read_words(&mut self) -> Result<Vec<String>> {
		let mut words: Vec<String> = Vec::new();
		loop {
			self.skip_whitespaces();
			let word = self.read_word();
			if word.is_empty() {
				break;
			}
			let mut owned = String::new();
			words.try_reserve(1)?;
			owned.try_reserve_exact(word.len())?;
			// Words are cut at ASCII whitespace only, so they stay valid UTF-8.
			owned.push_str(&String::from_utf8_lossy(word));
			words.push(owned);
		}
		Ok(words)
	}
}

/// Splits `line` on runs of whitespace. Quotes and backslashes are ordinary
/// characters.
pub fn tokenize(line: &str) -> Result<Vec<String>> {
	let mut parser = Parser { line: line.as_bytes(), i: 0 };
	parser.read_words()
}

/// Removes every redirection operator and its target from `tokens`, keeping
/// the other tokens in order, and returns the redirections left to right.
pub fn strip_redirects(tokens: &mut Vec<String>) -> Result<Vec<Redirect>> {
	let mut redirects: Vec<Redirect> = vec![];
	let mut i = 0;
	while i < tokens.len() {
		let typ = match RedirectType::from_token(&tokens[i]) {
			Some(typ) => typ,
			None => {
				i += 1;
				continue;
			},
		};
		if i + 1 == tokens.len() {
			return Err(ShellError::MissingTarget(tokens[i].clone()));
		}
		let target = tokens.remove(i + 1);
		tokens.remove(i);
		redirects.push(Redirect { target: target, typ: typ });
	}
	Ok(redirects)
}

/// Parses one input line. `Ok(None)` means the line was blank.
///
/// A line made only of redirections yields a command with an empty name.
pub fn parse(line: &str, status: Status) -> Result<Option<Command>> {
	let mut tokens = tokenize(line)?;
	if tokens.is_empty() {
		return Ok(None);
	}
	builtin::substitute_status(&mut tokens, status);
	let redirects = strip_redirects(&mut tokens)?;
	let mut words = tokens.into_iter();
	let name = words.next().unwrap_or_default();
	Ok(Some(Command { name: name, arguments: words.collect(), redirects: redirects }))
}
