use counts_to_matrix::common::*;
use counts_to_matrix::run_convert::*;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = ConvertArgs::parse();
    run_convert(&args)?;

    Ok(())
}
