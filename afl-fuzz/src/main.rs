use std::io::Cursor;

use nom_jpeg_meta::{MetaParser, ParseOptions};

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let minimal = MetaParser::with_options(
        ParseOptions::default()
            .parse_maker_note(false)
            .load_thumbnail(false),
    );

    afl::fuzz!(|data: &[u8]| {
        let _ = nom_jpeg_meta::parse_jpeg_meta(Cursor::new(data));
        let _ = minimal.parse(Cursor::new(data));
    });
}
