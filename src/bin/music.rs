//! `mpd-music <action>`: control MPD from a key binding and show what is
//! now playing.
//!
//! Uses the same config file as `mpd-notify`.  Nothing is shown when the
//! action leaves the player paused or stopped.

use log::error;
use mpd_notify::client::MpdClient;
use mpd_notify::config::Config;
use mpd_notify::notifier::DesktopNotifier;
use mpd_notify::remote::{self, Action};
use mpd_notify::traits::Notifier;

fn usage(program: &str) -> String {
    let actions: Vec<String> = Action::ALL.iter().map(|a| a.to_string()).collect();
    format!("Usage: {} <{}>", program, actions.join("|"))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "mpd-music".into());
    let action = match args.next().map(|a| a.parse::<Action>()) {
        Some(Ok(action)) => action,
        Some(Err(e)) => {
            eprintln!("{}\n{}", e, usage(&program));
            std::process::exit(1);
        }
        None => {
            eprintln!("{}", usage(&program));
            std::process::exit(1);
        }
    };

    let config = Config::load_or_default();

    let mut client = match MpdClient::connect(&config.mpd) {
        Ok(c) => c,
        Err(e) => {
            error!("cannot connect to MPD at {}:{}: {}", config.mpd.host, config.mpd.port, e);
            std::process::exit(1);
        }
    };

    match remote::perform(&mut client, action) {
        Ok(Some(notification)) => DesktopNotifier::new(&config.notifications).notify(&notification),
        Ok(None) => {}
        Err(e) => {
            error!("{} failed: {}", action, e);
            std::process::exit(1);
        }
    }
}
