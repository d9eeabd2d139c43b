//! Ctrl-C handling for long syncs

use jackup_core::Interrupt;
use tracing::warn;

/// Exit status after a forced quit, as a shell reports death by SIGINT.
pub const FORCED_EXIT_CODE: i32 = 130;

/// Request `interrupt` when the user presses Ctrl-C, and exit at once on a
/// second Ctrl-C.
///
/// The listener runs on its own thread with a single-threaded runtime, so the
/// synchronous sync loop is untouched. After the first signal the current
/// task finishes (or rsync exits on the same signal) and the profile is
/// unlocked before returning. A forced exit skips that cleanup, so the lock
/// of the running profile stays behind.
pub fn forward_ctrl_c(interrupt: Interrupt) -> std::io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    std::thread::Builder::new()
        .name("jackup-signal".into())
        .spawn(move || {
            runtime.block_on(async {
                if tokio::signal::ctrl_c().await.is_err() {
                    return;
                }
                warn!("Interrupt received, stopping after the current task; press Ctrl-C again to quit now");
                interrupt.request();

                if tokio::signal::ctrl_c().await.is_ok() {
                    eprintln!(
                        "Interrupted twice, quitting. Remove a leftover lock with `jackup unlock <profile>`."
                    );
                    std::process::exit(FORCED_EXIT_CODE);
                }
            });
        })?;

    Ok(())
}
