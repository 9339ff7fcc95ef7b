use std::path::Path;
use std::sync::Arc;

use chrono::Utc;

use crate::config::Settings;
use crate::core::{engine, premium};
use crate::models::{
    AdminCommand, InboundEvent, MatchOutcome, PairDetails, ParticipantId, QueueReason,
    RelayOutcome, SharedState,
};
use crate::services::notify::{deliver_best_effort, Notifier};
use crate::services::{moderation, persistence, relay};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub state: SharedState,
    pub notifier: Arc<dyn Notifier>,
    pub settings: Settings,
}

/// Whether the event loop keeps running after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Shutdown,
}

/// Dispatch one inbound event. All state mutation for an event happens
/// under a single lock acquisition; notifications and the persistence
/// write-through run after it is released.
pub async fn handle_event(app: &AppState, event: InboundEvent) -> Flow {
    tracing::debug!("event from {}: {:?}", event.from(), event);
    match event {
        InboundEvent::Start { from } => find_partner(app, from).await,
        InboundEvent::Next { from } => next(app, from).await,
        InboundEvent::Stop { from } => stop(app, from).await,
        InboundEvent::SetGender { from, value } => set_gender(app, from, &value).await,
        InboundEvent::SetInterests { from, raw } => set_interests(app, from, &raw).await,
        InboundEvent::ViewProfile { from } => view_profile(app, from).await,
        InboundEvent::Text { from, body } => text(app, from, &body).await,
        InboundEvent::PremiumPurchased { from } => premium_purchased(app, from).await,
        InboundEvent::Admin { from, command } => return admin(app, from, command).await,
    }
    Flow::Continue
}

async fn reply(app: &AppState, to: ParticipantId, text: &str) {
    deliver_best_effort(app.notifier.as_ref(), to, text).await;
}

async fn persist(app: &AppState) {
    persistence::persist(&app.state, Path::new(&app.settings.storage.data_file)).await;
}

fn pair_message(details: &PairDetails, for_id: ParticipantId) -> String {
    let partner = details.partner_of(for_id);
    let interests_line = if !details.shared.is_empty() {
        format!("You share interests: {}", details.shared.join(", "))
    } else if !partner.interests.is_empty() {
        format!("Their interests: {}", partner.interests.join(", "))
    } else {
        "They did not set any interests.".to_string()
    };
    format!(
        "Connected to a stranger ({}).\n{}\n\nUse /next to skip, /stop to end.",
        partner.gender.label(),
        interests_line
    )
}

async fn announce_pair(app: &AppState, details: &PairDetails) {
    reply(app, details.a.id, &pair_message(details, details.a.id)).await;
    reply(app, details.b.id, &pair_message(details, details.b.id)).await;
}

const PARTNER_LEFT: &str = "The stranger left the chat.\nSend /start to find a new one.";

async fn find_partner(app: &AppState, id: ParticipantId) {
    let outcome = {
        let mut st = app.state.lock().await;
        engine::request_match(&mut st, id, Utc::now())
    };
    match outcome {
        MatchOutcome::Banned => {
            reply(app, id, "You are banned from using this bot.").await;
        }
        MatchOutcome::AlreadyPaired => {
            reply(
                app,
                id,
                "You are already chatting with someone.\nUse /next to find another person.",
            )
            .await;
        }
        MatchOutcome::Queued(QueueReason::EmptyQueue) => {
            persist(app).await;
            reply(
                app,
                id,
                "Waiting for another user...\nTip: set your gender and interests for better matches.",
            )
            .await;
        }
        MatchOutcome::Queued(QueueReason::NoSuitableMatch) => {
            persist(app).await;
            reply(app, id, "Waiting for a suitable user to connect you with...").await;
        }
        MatchOutcome::Paired(details) => {
            persist(app).await;
            announce_pair(app, &details).await;
        }
    }
}

async fn next(app: &AppState, id: ParticipantId) {
    let former = {
        let mut st = app.state.lock().await;
        engine::unpair(&mut st, id)
    };
    if let Some(partner) = former {
        persist(app).await;
        reply(app, partner, PARTNER_LEFT).await;
    }
    reply(app, id, "Searching for a new partner...").await;
    find_partner(app, id).await;
}

async fn stop(app: &AppState, id: ParticipantId) {
    let former = {
        let mut st = app.state.lock().await;
        let former = engine::unpair(&mut st, id);
        st.remove_from_waiting(id);
        former
    };
    persist(app).await;
    if let Some(partner) = former {
        reply(app, partner, PARTNER_LEFT).await;
    }
    reply(
        app,
        id,
        "Chat ended. Use /start to chat again later. Your gender and interests are saved.",
    )
    .await;
}

async fn set_gender(app: &AppState, id: ParticipantId, value: &str) {
    let Some(gender) = crate::models::Gender::parse_command(value) else {
        reply(app, id, "Unknown gender. Use: /gender girl | boy | other").await;
        return;
    };
    {
        let mut st = app.state.lock().await;
        st.profiles.set_gender(id, gender);
    }
    persist(app).await;
    reply(app, id, &format!("Gender set to: {}", gender.as_str())).await;
}

async fn set_interests(app: &AppState, id: ParticipantId, raw: &str) {
    let interests = crate::models::normalize_interests(raw);
    if interests.is_empty() {
        reply(
            app,
            id,
            "Usage: /interests roblox, anime, gaming\nSeparate interests with commas or spaces.",
        )
        .await;
        return;
    }
    let listed = interests.iter().cloned().collect::<Vec<_>>().join(", ");
    {
        let mut st = app.state.lock().await;
        st.profiles.set_interests(id, interests);
    }
    persist(app).await;
    reply(
        app,
        id,
        &format!("Interests updated: {}\nNew matches will try to share some of these.", listed),
    )
    .await;
}

async fn view_profile(app: &AppState, id: ParticipantId) {
    let (profile, now) = {
        let mut st = app.state.lock().await;
        (st.profiles.get_or_create(id).clone(), Utc::now())
    };
    let interests = if profile.interests.is_empty() {
        "none".to_string()
    } else {
        profile.interests.iter().cloned().collect::<Vec<_>>().join(", ")
    };
    let premium_line = if premium::is_active(&profile, now) {
        format!(
            "girl-only active ({}h left)",
            premium::remaining_hours(&profile, now)
        )
    } else {
        format!(
            "no (girl-only matching: {} stars for {} hours)",
            app.settings.premium.price_stars, app.settings.premium.duration_hours
        )
    };
    reply(
        app,
        id,
        &format!(
            "Your profile:\nGender: {}\nInterests: {}\nPremium: {}",
            profile.gender.as_str(),
            interests,
            premium_line
        ),
    )
    .await;
}

async fn text(app: &AppState, id: ParticipantId, body: &str) {
    match relay::relay(&app.state, app.notifier.as_ref(), id, body).await {
        RelayOutcome::Banned => {
            reply(app, id, "You are banned from using this bot.").await;
        }
        RelayOutcome::NoPartner => {
            reply(
                app,
                id,
                "I am still looking for a partner.\nUse /start to find one.",
            )
            .await;
        }
        RelayOutcome::Delivered => {}
        RelayOutcome::DeliveryFailed { .. } => {
            persist(app).await;
            reply(
                app,
                id,
                "Could not deliver the message, your partner might be offline. Searching for a new partner...",
            )
            .await;
            find_partner(app, id).await;
        }
    }
}

async fn premium_purchased(app: &AppState, id: ParticipantId) {
    let hours = app.settings.premium.duration_hours;
    {
        let mut st = app.state.lock().await;
        premium::grant(st.profiles.get_or_create(id), Utc::now(), hours);
    }
    persist(app).await;
    reply(
        app,
        id,
        &format!(
            "Payment successful!\nYou will match only with girls for the next {} hours.\nUse /start to find your premium match.\nNote: gender is self-declared by users and cannot be guaranteed.",
            hours
        ),
    )
    .await;
}

async fn admin(app: &AppState, from: ParticipantId, command: AdminCommand) -> Flow {
    if !app.settings.bot.is_admin(from) {
        reply(app, from, "You are not an admin.").await;
        return Flow::Continue;
    }
    tracing::info!("admin {} issued {:?}", from, command);

    match command {
        AdminCommand::Stats => {
            let stats = app.state.lock().await.stats();
            reply(
                app,
                from,
                &format!(
                    "Stats\nUsers saved: {}\nWaiting: {}\nCurrently paired: {}\nBanned: {}",
                    stats.users, stats.waiting, stats.paired, stats.banned
                ),
            )
            .await;
        }
        AdminCommand::ListWaiting => {
            let waiting = app.state.lock().await.waiting.clone();
            let list = waiting
                .iter()
                .take(200)
                .enumerate()
                .map(|(i, id)| format!("{}. {}", i + 1, id))
                .collect::<Vec<_>>()
                .join("\n");
            let list = if list.is_empty() { "(empty)".to_string() } else { list };
            reply(app, from, &format!("Waiting queue:\n{}", list)).await;
        }
        AdminCommand::ListUsers => {
            let rows = {
                let st = app.state.lock().await;
                st.profiles
                    .iter()
                    .take(50)
                    .map(|(id, p)| {
                        let interests = p
                            .interests
                            .iter()
                            .take(5)
                            .cloned()
                            .collect::<Vec<_>>()
                            .join(",");
                        format!(
                            "{} gender:{} interests:{} partner:{}",
                            id,
                            p.gender.as_str(),
                            if interests.is_empty() { "none".to_string() } else { interests },
                            p.partner_id.map_or("none".to_string(), |x| x.to_string())
                        )
                    })
                    .collect::<Vec<_>>()
            };
            let body = if rows.is_empty() { "(none)".to_string() } else { rows.join("\n") };
            reply(app, from, &format!("Users (first 50):\n{}", body)).await;
        }
        AdminCommand::Ban { id } => {
            let outcome = {
                let mut st = app.state.lock().await;
                moderation::ban(&mut st, id)
            };
            persist(app).await;
            if let Some(partner) = outcome.displaced_partner {
                reply(app, partner, PARTNER_LEFT).await;
            }
            reply(app, from, &format!("Banned user {}", id)).await;
        }
        AdminCommand::Unban { id } => {
            {
                let mut st = app.state.lock().await;
                moderation::unban(&mut st, id);
            }
            persist(app).await;
            reply(app, from, &format!("Unbanned user {}", id)).await;
        }
        AdminCommand::ForcePair { a, b } => {
            if a == b {
                reply(app, from, "Cannot pair a user with themselves.").await;
                return Flow::Continue;
            }
            let (details, displaced) = {
                let mut st = app.state.lock().await;
                moderation::force_pair(&mut st, a, b)
            };
            persist(app).await;
            for partner in displaced {
                reply(app, partner, PARTNER_LEFT).await;
            }
            announce_pair(app, &details).await;
            reply(app, from, &format!("Forced pair {} <-> {}", a, b)).await;
        }
        AdminCommand::Broadcast { text } => {
            let ids: Vec<ParticipantId> = {
                let st = app.state.lock().await;
                st.profiles.ids().collect()
            };
            let message = format!("Admin broadcast:\n\n{}", text);
            let mut sent = 0usize;
            for id in ids {
                if app.notifier.deliver(id, &message).await.is_ok() {
                    sent += 1;
                }
            }
            reply(app, from, &format!("Broadcast sent to {} users.", sent)).await;
        }
        AdminCommand::Export => {
            persist(app).await;
            reply(
                app,
                from,
                &format!("Data exported to {}", app.settings.storage.data_file),
            )
            .await;
        }
        AdminCommand::Shutdown => {
            reply(app, from, "Shutting down bot (admin command).").await;
            persist(app).await;
            return Flow::Shutdown;
        }
    }
    Flow::Continue
}
