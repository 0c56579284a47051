use clap::Parser;
use codemap::cli::{Cli, Command};
use codemap::{cmd_check, cmd_export, cmd_init, cmd_links, cmd_scan, cmd_serve, cmd_show};

fn main() {
    let cli = Cli::parse();
    let project = cli.project.as_path();

    let exit_code = match cli.command {
        Command::Serve(args) => cmd_serve(project, args),
        Command::Links(args) => cmd_links(project, args),
        Command::Show(args) => cmd_show(project, args),
        Command::Export(args) => cmd_export(project, args),
        Command::Scan(args) => cmd_scan(args),
        Command::Init(args) => cmd_init(args),
        Command::Check(args) => cmd_check(project, args),
    };

    std::process::exit(exit_code);
}
