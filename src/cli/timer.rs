//! CLI handlers for timer control and agenda display.
//!
//! All commands talk to the running service over HTTP.

use anyhow::{anyhow, bail, Result};
use dialoguer::{theme::ColorfulTheme, Confirm};
use serde_json::json;
use uuid::Uuid;

use super::args::{NewMeetingCliArgs, TimerCliArgs};
use super::client::ServiceClient;
use crate::agenda::{format_clock, AgendaItem, MeetingState};
use crate::controller::TimerCommand;
use crate::timing::Transition;

pub async fn handle_agenda_command() -> Result<()> {
    let client = ServiceClient::from_config();
    let state: MeetingState = client.get("/meeting").await?;
    print!("{}", render_agenda(&state));
    Ok(())
}

pub async fn handle_timer_command(args: TimerCliArgs) -> Result<()> {
    let client = ServiceClient::from_config();
    let state: MeetingState = client.get("/meeting").await?;
    let item = resolve_item(&state, &args.item)?;

    let transition: Transition = if args.action.eq_ignore_ascii_case("adjust") {
        let time = args
            .time
            .ok_or_else(|| anyhow!("adjust needs --time m:ss"))?;
        client
            .post_json(&format!("/timer/{}/adjust", item.id), &json!({ "time": time }))
            .await?
    } else {
        let command: TimerCommand = args.action.parse()?;
        if command.is_destructive() && !args.yes && !confirm_reset(item)? {
            println!("Cancelled.");
            return Ok(());
        }
        client
            .post(&format!("/timer/{}/{}", item.id, command.as_str()))
            .await?
    };

    let item = &transition.item;
    println!(
        "{}: {} {} ({})",
        item.role_name,
        item.phase.as_str(),
        format_clock(item.elapsed_seconds),
        item.status
    );
    if let Some(outcome) = &transition.completed {
        println!(
            "Final time {} - {}",
            format_clock(outcome.elapsed_seconds),
            outcome.status
        );
    }

    Ok(())
}

pub async fn handle_new_meeting_command(args: NewMeetingCliArgs) -> Result<()> {
    if !args.yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Start a new meeting? The current one is archived to history.")
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let client = ServiceClient::from_config();
    let state: MeetingState = client.post("/meeting/new").await?;
    println!(
        "New meeting for {} with {} roles.",
        state.info.club_name,
        state.items.len()
    );
    Ok(())
}

fn confirm_reset(item: &AgendaItem) -> Result<bool> {
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!(
            "Reset the timer for '{}' ({})?",
            item.role_name,
            format_clock(item.elapsed_seconds)
        ))
        .default(false)
        .interact()?)
}

/// Pick an item by 1-based position, id, or a unique part of its role name.
pub fn resolve_item<'a>(state: &'a MeetingState, selector: &str) -> Result<&'a AgendaItem> {
    let selector = selector.trim();

    if let Ok(position) = selector.parse::<usize>() {
        return position
            .checked_sub(1)
            .and_then(|i| state.items.get(i))
            .ok_or_else(|| anyhow!("No agenda item at position {}", position));
    }

    if let Ok(id) = selector.parse::<Uuid>() {
        return Ok(state.item(id)?);
    }

    let needle = selector.to_lowercase();
    let matches: Vec<&AgendaItem> = state
        .items
        .iter()
        .filter(|i| i.role_name.to_lowercase().contains(&needle))
        .collect();

    if let Some(exact) = matches.iter().find(|i| i.role_name.to_lowercase() == needle) {
        return Ok(exact);
    }
    match matches.as_slice() {
        [one] => Ok(one),
        [] => bail!("No agenda item matches '{}'", selector),
        many => bail!(
            "'{}' matches several roles: {}",
            selector,
            many.iter()
                .map(|i| i.role_name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

pub fn render_agenda(state: &MeetingState) -> String {
    let mut out = format!(
        "{} - {}{}\n",
        state.info.club_name,
        state.info.date.format("%Y-%m-%d"),
        if state.info.meeting_number.is_empty() {
            String::new()
        } else {
            format!(" (#{})", state.info.meeting_number)
        }
    );
    for (index, item) in state.items.iter().enumerate() {
        let signal = item.signal_zone();
        out.push_str(&format!(
            "{:>3}. {:<32} {:<16} {:>5} min  {:>6}  {:<15} {:<9} {}\n",
            index + 1,
            item.role_name,
            item.speaker_name,
            item.target_minutes,
            format_clock(item.elapsed_seconds),
            item.phase.as_str(),
            item.status,
            if item.phase.is_live() { signal.instruction() } else { "" }
        ));
    }
    out
}
