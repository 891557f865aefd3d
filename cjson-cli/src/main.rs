mod args;

use std::process::exit;

use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

use args::Args;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")))
        .init();

    let args = Args::from_args();
    match run(&args) {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        },
        Err(err) => {
            tracing::error!(path = %args.path.display(), error = %err, "round-trip failed");
            eprintln!("{}: {:#}", args.path.display(), err);
            exit(1);
        },
    }
}

fn run(args: &Args) -> anyhow::Result<String> {
    let bytes = std::fs::read(&args.path)?;

    if args.minify {
        let mut buf = bytes;
        cjson_core::minify::minify(&mut buf);
        return Ok(String::from_utf8(buf)?);
    }

    let doc = cjson_core::parser::parse(&bytes)?;
    let printed = if args.pretty {
        cjson_core::printer::print_pretty(&doc)?
    } else {
        cjson_core::printer::print(&doc)?
    };
    Ok(printed)
}
