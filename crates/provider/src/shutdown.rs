use tokio::sync::watch;

/// Listen for CTRL+C: the first press requests a graceful stop through
/// `stop_tx`, a second press exits immediately with code 130.
pub fn spawn_ctrl_c_handler(stop_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let mut presses: u8 = 0;
        loop {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            presses = presses.saturating_add(1);
            if presses == 1 {
                eprintln!(
                    "Stop requested, finishing current job before exiting (press CTRL+C again to exit immediately)."
                );
                let _ = stop_tx.send(true);
            } else {
                eprintln!("Stop requested again, exiting immediately.");
                std::process::exit(130);
            }
        }
    });
}
