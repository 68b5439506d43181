mod app;
mod builtin;
mod error;
mod eval;
mod global;
mod input;
mod parser;
mod prompt;
mod redirect;
mod signal;
mod types;
mod wait;

use std::io::{self, Write};
use std::process;

use clap::Parser;
use log::debug;

use app::App;
use input::{LineReader, ReadLine};

fn show_prompt(template: &str) {
	let mut stdout = io::stdout();
	let _ = stdout.write_all(prompt::expand(template, &prompt::PromptInfo::current()).as_bytes());
	let _ = stdout.flush();
}

fn main() {
	env_logger::builder()
		.parse_env(env_logger::Env::default().default_filter_or("warn"))
		.init();

	let app = App::parse();
	let mut state = global::State::new();

	if let Err(e) = signal::install_interrupt_handler() {
		error::report(&e);
	}

	if let Some(line) = app.command {
		state.run_line(&line);
		process::exit(state.status.code());
	}

	let template = app.prompt.unwrap_or_else(|| prompt::DEFAULT_PROMPT.to_string());
	let mut reader = LineReader::stdin();
	while !state.exit_requested() {
		if !app.no_prompt {
			show_prompt(&template);
		}
		match reader.read_line() {
			Ok(ReadLine::Line(line)) => state.run_line(&line),
			Ok(ReadLine::Interrupted) => { debug!("read interrupted"); },
			Ok(ReadLine::Eof) => { break; },
			Err(e) => error::report(&e),
		}
	}
	debug!("leaving with status {}", state.status);
	process::exit(state.status.code());
}
