use clap::Parser;

mod args;
mod regulation;

pub use args::*;
pub use regulation::*;

fn main() {
    env_logger::Builder::from_default_env()
        .parse_filters("info")
        .init();

    match main_impl() {
        Ok(()) => {
            log::info!("Terminated.");
        }
        Err(err) => {
            log::error!("Failure: {err:?}");
            std::process::exit(1);
        }
    }
}

fn main_impl() -> eyre::Result<()> {
    let args = Args::parse();

    if let Some(json) = execute(&args)? {
        println!("{json}");
    }

    Ok(())
}
