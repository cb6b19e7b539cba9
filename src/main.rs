use clap::{CommandFactory, Parser};
use salt::{
   cli::{Cli, Command, Ctx},
   commands,
   error::Result,
   style::{self, icons},
};

fn main() {
   env_logger::Builder::from_env(env_logger::Env::default()).init();
   let cli = Cli::parse();

   if cli.version {
      println!("salt {}", env!("CARGO_PKG_VERSION"));
      return;
   }
   let Some(command) = cli.command else {
      Cli::command().print_help().ok();
      // Missing arguments are a configuration error
      std::process::exit(2);
   };

   let ctx = Ctx::new(cli.quiet, cli.verbose);
   if let Err(e) = dispatch(&ctx, command) {
      eprintln!("{} {e}", style::error(icons::ERROR));
      std::process::exit(e.exit_code());
   }
}

fn dispatch(ctx: &Ctx, command: Command) -> Result<()> {
   match command {
      Command::Init => commands::init::run(ctx),
      Command::Add { url, path, branch, name, shallow: _, no_shallow } => {
         commands::add::run(ctx, &commands::add::AddOptions {
            url,
            path,
            branch,
            name,
            shallow: !no_shallow,
         })
      },
      Command::Resolve { name, force } => commands::resolve::run(ctx, name.as_deref(), force),
      Command::Sync { name, force, ci } => commands::sync::run(ctx, name.as_deref(), force, ci),
      Command::Pull { name, ci, parallel } => {
         commands::pull::run(ctx, name.as_deref(), ci, parallel)
      },
      Command::Push { name, force, auto_sync, ci } => {
         commands::push::run(ctx, name.as_deref(), &commands::push::PushOptions {
            force,
            auto_sync,
            ci,
         })
      },
      Command::Remove { name, delete_files, force } => {
         commands::remove::run(ctx, &name, delete_files, force)
      },
      Command::Status { name, json } => commands::status::run(ctx, name.as_deref(), json),
   }
}
