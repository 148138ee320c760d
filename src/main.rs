use anyhow::Result;

fn main() -> Result<()> {
    dkp_cli::run_cli()
}
