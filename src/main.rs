//! `trifield [COUNT] [TEXTURE_PATH]`
//!
//! COUNT defaults to 5000; without a texture path a soft dot is generated.

use trifield::{init_logging, LoggingConfig, Simulation};

fn main() {
    init_logging(LoggingConfig::default());

    let mut args = std::env::args().skip(1);
    let mut sim = Simulation::new();

    if let Some(count) = args.next() {
        match count.parse::<u32>() {
            Ok(count) => sim = sim.with_particle_count(count),
            Err(err) => {
                log::error!("invalid particle count {count:?}: {err}");
                eprintln!("usage: trifield [COUNT] [TEXTURE_PATH]");
                std::process::exit(2);
            }
        }
    }
    if let Some(path) = args.next() {
        sim = sim.with_sprite_file(path);
    }

    if let Err(err) = sim.run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}
