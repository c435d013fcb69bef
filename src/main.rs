use clap::Parser;
use vault_util::cli::commands;
use vault_util::cli::machine::emit_error;
use vault_util::cli::{output, Cli, Commands};

fn main() {
    let cli = Cli::parse();

    output::set_colors(cli.colorize);
    vault_util::logging::init(cli.debug, cli.colorize, cli.machine_output);

    let result = match cli.command {
        Commands::AddVault => commands::add_vault::execute(&cli),
        Commands::DeleteVault { force } => commands::delete_vault::execute(&cli, force),
        Commands::ListVaults => commands::list_vaults::execute(&cli),
        Commands::ListMounts { detail } => commands::list_mounts::execute(&cli, detail),
        Commands::ListSecrets { ref secret_mount } => {
            commands::list_secrets::execute(&cli, secret_mount)
        }
        Commands::GetSecret { ref secret_key } => commands::get_secret::execute(&cli, secret_key),
        Commands::BulkLoad { ref secrets_file } => {
            commands::bulk_load::execute(&cli, secrets_file)
        }
        Commands::Completions { shell } => commands::completions::execute(shell),
    };

    if let Err(e) = result {
        emit_error(cli.machine_output, &e);
        std::process::exit(e.exit_code());
    }
}
