use std::error::Error;

use clap::Parser;
use nom_jpeg_meta::{MetaParser, ParseOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    files: Vec<String>,

    /// Don't walk MakerNote directories
    #[arg(long)]
    no_maker_note: bool,

    /// Save the embedded thumbnail next to each file, as `<file>.thumb.jpg`
    #[arg(long)]
    thumbnail: bool,

    /// Print extra entries too
    #[arg(short, long)]
    verbose: bool,

    #[cfg(feature = "json_dump")]
    #[arg(short, long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let parser = MetaParser::with_options(
        ParseOptions::default()
            .parse_maker_note(!cli.no_maker_note)
            .load_thumbnail(cli.thumbnail),
    );

    for file in cli.files.iter() {
        let meta = match parser.parse_file(file) {
            Ok(meta) => meta,
            Err(e) => {
                eprintln!("{file}: {e}");
                continue;
            }
        };

        #[cfg(feature = "json_dump")]
        {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&meta)?);
                continue;
            }
        }

        if cli.files.len() > 1 {
            println!("==> {file}");
        }
        println!("{meta}");

        if cli.verbose {
            for entry in meta.extra_entries.iter() {
                let value = entry
                    .value
                    .as_ref()
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| {
                        format!("({} x {:?})", entry.components_num, entry.data_format)
                    });
                println!("{:<10} 0x{:04x}    » {}", entry.ifd, entry.tag, value);
            }
        }

        if let Some(thumbnail) = meta.thumbnail.as_ref() {
            let path = format!("{file}.thumb.jpg");
            std::fs::write(&path, thumbnail)?;
            println!("thumbnail saved to {path}");
        }
    }

    Ok(())
}
