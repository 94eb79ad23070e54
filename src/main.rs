#![allow(missing_docs)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "btfdump", about = "BPF event buffer inspection tools")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	Types {
		types: PathBuf,
		#[arg(long = "struct")]
		struct_name: Option<String>,
	},
	Decode {
		buffer: PathBuf,
		#[arg(long)]
		types: PathBuf,
		#[arg(long, default_value = "event")]
		root: String,
		#[arg(long)]
		strict_arrays: bool,
		#[arg(long)]
		compact: bool,
	},
}

fn main() {
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> btfdump::btf::Result<()> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Types { types, struct_name } => cmd::types::run(types, struct_name),
		Commands::Decode {
			buffer,
			types,
			root,
			strict_arrays,
			compact,
		} => cmd::decode::run(buffer, types, root, strict_arrays, compact),
	}
}
