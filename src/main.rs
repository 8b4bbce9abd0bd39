use clap::Parser;
use reqwatch::cli::{
    dashboard, handle_completions, handle_config_init, monitors, requests, tail, Cli, Commands,
    ConfigCommands, MonitorsCommands,
};

fn print_output(result: Result<String, Box<dyn std::error::Error>>) -> Result<(), Box<dyn std::error::Error>> {
    let output = result?;
    println!("{}", output);
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Requests(args) => print_output(requests::handle_requests(&args).await),
        Commands::Tail(args) => tail::handle_tail(&args).await,
        Commands::Suggest(args) => print_output(requests::handle_suggest(&args).await),
        Commands::Sli(args) => print_output(dashboard::handle_sli(&args).await),
        Commands::Uptime(args) => print_output(dashboard::handle_uptime(&args).await),
        Commands::Stats(args) => print_output(dashboard::handle_stats(&args).await),
        Commands::Monitors(cmd) => match cmd {
            MonitorsCommands::List(args) => {
                print_output(monitors::handle_monitors_list(&args).await)
            }
            MonitorsCommands::Add(args) => print_output(monitors::handle_monitors_add(&args).await),
            MonitorsCommands::Remove(args) => {
                print_output(monitors::handle_monitors_remove(&args).await)
            }
        },
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
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
