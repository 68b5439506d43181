#[derive(clap::Parser, Debug)]
#[command(version, about = "A minimal Unix command interpreter with redirection")]
pub struct App {
	/// Run a single command line and exit with its status
	#[arg(short = 'c', long = "command")]
	pub command: Option<String>,

	/// Never print a prompt
	#[arg(long = "no-prompt", default_value_t = false)]
	pub no_prompt: bool,

	/// Prompt template; understands \u, \h, \b, \$ and \\
	#[arg(long = "prompt", env = "PS1")]
	pub prompt: Option<String>,
}
