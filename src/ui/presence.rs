//! Human-readable rendering of session events and account state.

use crate::core::presence::PresenceEvent;
use crate::core::reward::Settlement;
use crate::models::account::Account;
use crate::models::session::SessionOutcome;
use crate::ui::messages::{info, success, warning};
use crate::utils::colors::{GREY, RESET};
use crate::utils::formatting::{secs2clock, short_address};

/// One line per meaningful event. Ticks are only shown every `tick_every`
/// seconds (0 hides them).
pub fn describe_event(ev: &PresenceEvent, tick_every: u32) -> Option<String> {
    match ev {
        PresenceEvent::Started { generation, boost } => Some(format!(
            "▶ Session #{} started{}",
            generation,
            if *boost { " (boost active)" } else { "" }
        )),
        PresenceEvent::Tapped => Some("👋 Presence confirmed".to_string()),
        PresenceEvent::Tick { remaining } => {
            if tick_every > 0 && *remaining > 0 && remaining % tick_every == 0 {
                Some(format!("⏱  {} remaining", secs2clock(*remaining)))
            } else {
                None
            }
        }
        PresenceEvent::Missed { missed, max } => {
            Some(format!("⚠️  Missed presence check ({}/{})", missed, max))
        }
        PresenceEvent::Forgiven => Some("🛡  Boost forgave a missed check".to_string()),
        PresenceEvent::Ended(outcome) => Some(match outcome {
            SessionOutcome::Completed => "🏁 Session completed".to_string(),
            SessionOutcome::Failed => "💥 Session failed: too many missed checks".to_string(),
            SessionOutcome::Quit => "🚪 Session quit".to_string(),
        }),
        PresenceEvent::StaleTimer(_) => None,
    }
}

pub fn print_settlement(s: &Settlement, account: &Account) {
    match s.outcome {
        SessionOutcome::Completed => {
            let bonus = if s.bonus_percent > 0 {
                format!(" (+{}% streak bonus)", s.bonus_percent)
            } else {
                String::new()
            };
            success(format!("Earned {} tokens{}", s.reward, bonus));
            info(format!("🔥 Streak: {} day(s)", s.streak));
        }
        SessionOutcome::Failed | SessionOutcome::Quit => {
            warning("No reward this time. Streak unchanged.");
        }
    }
    info(format!("💛 Balance: {}", account.balance.value));
}

pub fn print_status(account: &Account) {
    let addr = account
        .profile
        .wallet_address
        .as_deref()
        .map(short_address)
        .unwrap_or_else(|| format!("{GREY}not signed in{RESET}"));
    let last = account
        .streak
        .last_session_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| format!("{GREY}--{RESET}"));

    println!("👛 Wallet   : {}", addr);
    println!("🪪 Verified : {}", if account.profile.verified { "yes" } else { "no" });
    println!("💛 Balance  : {}", account.balance.value);
    println!("🔥 Streak   : {} (last: {})", account.streak.count, last);
    println!(
        "🛡  Boost    : {}",
        if account.boost_active() { "active for next session" } else { "off" }
    );
}
