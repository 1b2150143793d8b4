use clap::Parser;
use guardian::cli::{
    check, handle_completions, handle_config_init, handle_config_validate, remote, run, Cli,
    Commands, ConfigCommands,
};

fn print_output(
    result: Result<String, Box<dyn std::error::Error>>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", result?);
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => run::run_guardian(args).await,
        Commands::Check(args) => match check::handle_check(&args).await {
            Ok((output, all_healthy)) => {
                println!("{}", output);
                if !all_healthy {
                    std::process::exit(2);
                }
                Ok(())
            }
            Err(e) => Err(e),
        },
        Commands::Status(args) => print_output(remote::handle_status(&args).await),
        Commands::Pause(args) => print_output(remote::handle_set_active(&args, false).await),
        Commands::Resume(args) => print_output(remote::handle_set_active(&args, true).await),
        Commands::Reset(args) => print_output(remote::handle_reset(&args).await),
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
            ConfigCommands::Validate(args) => print_output(handle_config_validate(&args)),
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
