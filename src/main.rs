//! Entry point for the **mpd-notify** daemon.
//!
//! Parses the single optional `daemonize` argument, loads the config,
//! optionally detaches, then runs the poll/reconnect loop on the main thread
//! until SIGINT or SIGTERM.
//!
//! A signal that arrives during a blocked connect or read takes effect once
//! that call returns, at most `mpd.timeout_ms` (1 s by default) later.

use log::error;
use mpd_notify::cli::{parse_args, Mode};
use mpd_notify::client::MpdClient;
use mpd_notify::config::Config;
use mpd_notify::daemon::daemonize;
use mpd_notify::notifier::DesktopNotifier;
use mpd_notify::observer::Observer;
use mpd_notify::shutdown;
use mpd_notify::supervisor::{Backoff, Supervisor};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mode = match parse_args(std::env::args()) {
        Ok(mode) => mode,
        Err(usage) => {
            println!("{}", usage);
            return;
        }
    };

    let config = Config::load_or_default();

    if mode == Mode::Daemonize {
        if let Err(e) = daemonize(config.daemon.log_file.as_deref()) {
            error!("failed to daemonize: {}", e);
            std::process::exit(1);
        }
    }

    // Threads may only be created from here on.
    let (handle, clock) = shutdown::channel();
    if let Err(e) = ctrlc::set_handler(move || handle.trigger()) {
        error!("failed to install signal handler: {}", e);
        std::process::exit(1);
    }

    run(&config, &clock);
    println!("\nLater!");
}

fn run(config: &Config, clock: &shutdown::ShutdownClock) {
    let mut observer = Observer::new(config.poll.interval());
    observer.set_stop_icon(config.notifications.stop_icon.clone());

    let mut supervisor = Supervisor::new(
        || MpdClient::connect(&config.mpd),
        DesktopNotifier::new(&config.notifications),
        observer,
        Backoff::from_config(&config.retry),
    );
    supervisor.run(clock);
}
