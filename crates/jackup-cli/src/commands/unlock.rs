//! Manual lock removal

use colored::Colorize;

use crate::context::Context;
use crate::error::Result;

/// Run the unlock command
///
/// Locks are not expired automatically; this is how a lock left by a killed
/// sync is cleared. Unlocking a profile that is not locked is not an error.
pub fn run_unlock(ctx: &Context, profile: &str) -> Result<()> {
    jackup_core::validate_name(profile)?;
    let locks = ctx.locks();
    let holder = locks.holder(profile);
    let was_locked = locks.is_locked(profile);
    locks.release(profile)?;

    if was_locked {
        let detail = holder
            .map(|h| format!(" (held by pid {} since {})", h.pid, h.acquired_at.format("%Y-%m-%d %H:%M:%S")))
            .unwrap_or_default();
        println!("{} Unlocked {}{}", "OK".green().bold(), profile.cyan(), detail);
    } else {
        println!("{} is not locked", profile.cyan());
    }
    Ok(())
}
