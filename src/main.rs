use ripple_field::app::App;
use ripple_field::config::DEFAULT_FRAMES;
use ripple_field::BackendKind;

const USAGE: &str = "usage: ripple-field [sequential|parallel|gpu] [frames]";

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Damped Wave Field Simulator");

    let mut args = std::env::args().skip(1);
    let kind = match args.next().map(|s| s.parse::<BackendKind>()).transpose() {
        Ok(kind) => kind.unwrap_or_default(),
        Err(e) => {
            log::error!("{}", e);
            log::error!("{}", USAGE);
            std::process::exit(2);
        }
    };
    let frames = match args.next().map(|s| s.parse::<u64>()).transpose() {
        Ok(frames) => frames.unwrap_or(DEFAULT_FRAMES),
        Err(e) => {
            log::error!("invalid frame count: {}", e);
            log::error!("{}", USAGE);
            std::process::exit(2);
        }
    };

    let result = App::new(kind).and_then(|mut app| app.run(frames));
    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
