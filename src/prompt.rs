use std::env;

use nix::unistd::{self, User};

pub const DEFAULT_PROMPT: &str = "\n\\u@\\h : \\b\n\\$ ";

/// Values the prompt escapes expand to.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PromptInfo {
	pub user: Option<String>,
	pub host: Option<String>,
	pub cwd_base: Option<String>,
	pub is_root: bool,
}

impl PromptInfo {
	pub fn current() -> PromptInfo {
		let uid = unistd::getuid();
		PromptInfo {
			user: User::from_uid(uid).ok().and_then(|u| u.map(|u| u.name)),
			host: unistd::gethostname().ok().map(|h| h.to_string_lossy().into_owned()),
			cwd_base: env::current_dir().ok().map(|cwd| match cwd.file_name() {
				Some(base) => base.to_string_lossy().into_owned(),
				None => cwd.to_string_lossy().into_owned(),
			}),
			is_root: uid.is_root(),
		}
	}
}

/// Expands `\u`, `\h`, `\b`, `\$` and `\\` in `template`. Unknown escapes and
/// values that could not be looked up expand to nothing.
pub fn expand(template: &str, info: &PromptInfo) -> String {
	let mut out = String::with_capacity(template.len());
	let mut chars = template.chars();
	while let Some(c) = chars.next() {
		if c != '\\' {
			out.push(c);
			continue;
		}
		match chars.next() {
			Some('u') => out.push_str(info.user.as_deref().unwrap_or("")),
			Some('h') => out.push_str(info.host.as_deref().unwrap_or("")),
			Some('b') => out.push_str(info.cwd_base.as_deref().unwrap_or("")),
			Some('$') => out.push(if info.is_root { '#' } else { '$' }),
			Some('\\') => out.push('\\'),
			_ => {},
		}
	}
	out
}
