use clap::Parser;
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// extra config files merged on top of configs/default.toml
    pub config_names: Vec<String>,

    /// generate a shell completion file and exit
    #[arg(long = "generate", value_enum)]
    pub generator: Option<Shell>,
}
