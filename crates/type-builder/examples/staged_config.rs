//! Assembles a configuration from several independent sources.
//!
//! Usage: `staged_config [host] [port]`

use std::env;

use type_builder::{buildable, Builder, Construct, DecodeError, Decoder, reflect};

#[derive(Debug)]
struct Listen {
    host: String,
    port: u16,
}

#[derive(Debug)]
struct Config {
    name: String,
    workers: u8,
    motd: Option<String>,
    listen: Listen,
}

buildable! {
    Listen => ListenFields {
        leaf host: String,
        leaf port: u16,
    }
}

reflect! {
    Config => ConfigFields {
        leaf name: String,
        leaf workers: u8,
        optional motd: String,
        nested listen: Listen,
    }
}

impl Construct for Config {
    fn construct<D: Decoder>(decoder: &mut D) -> Result<Self, DecodeError> {
        let workers: u8 = decoder.decode_field_if_present("workers")?.unwrap_or(4);
        if workers == 0 {
            return Err(DecodeError::invalid(decoder.coding_path(), "workers must be non-zero"));
        }
        Ok(Config {
            name: decoder.decode_field("name")?,
            workers,
            motd: decoder.decode_field_if_present("motd")?,
            listen: decoder.decode_field("listen")?,
        })
    }
}

fn apply_defaults(builder: &Builder<Config>) {
    builder.at(&Config::FIELDS.name).set("demo".to_string());
    let listen = builder.at(&Config::FIELDS.listen);
    listen.at(&Listen::FIELDS.host).set("127.0.0.1".to_string());
    listen.at(&Listen::FIELDS.port).set(8080);
}

fn apply_args(builder: &Builder<Config>) -> Result<(), String> {
    let mut args = env::args().skip(1);
    if let Some(host) = args.next() {
        builder.at(&Config::FIELDS.listen).at(&Listen::FIELDS.host).set(host);
    }
    if let Some(port) = args.next() {
        let port: u16 = port.parse().map_err(|e| format!("invalid port {port:?}: {e}"))?;
        builder.at(&Config::FIELDS.listen).at(&Listen::FIELDS.port).set(port);
    }
    Ok(())
}

fn main() {
    let builder = Builder::<Config>::new();
    apply_defaults(&builder);
    if let Err(e) = apply_args(&builder) {
        eprintln!("{e}");
        std::process::exit(2);
    }

    match builder.build() {
        Ok(config) => {
            println!("name:    {}", config.name);
            println!("workers: {}", config.workers);
            println!("motd:    {}", config.motd.as_deref().unwrap_or("-"));
            println!("listen:  {}:{}", config.listen.host, config.listen.port);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }

    // Zero workers is rejected by the config's own validation.
    builder.at(&Config::FIELDS.workers).set(0);
    if let Err(e) = builder.build() {
        println!("rejected: {e}");
    }
}
