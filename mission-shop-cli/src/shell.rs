//! Line-oriented front end: reads commands, drives the controller, renders
//! the screens.
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::io::{BufRead, Write};

use mission_shop::{
    Action, MissionController, MissionError, Outcome, RankingStorage, ResultSummary, Screen,
};

use crate::commands::{Command, parse_line, resolve_item};
use crate::render;

/// Run commands from `input` until EOF or `quit`.
///
/// Returns the summary of every mission that reached the result screen, in
/// the state it was in when the player left it.
pub fn run<S, R, F>(
    controller: &mut MissionController<S>,
    input: R,
    out: &mut dyn Write,
    clock: F,
) -> Result<Vec<ResultSummary>>
where
    S: RankingStorage,
    R: BufRead,
    F: Fn() -> DateTime<Utc>,
{
    let mut finished = Vec::new();
    render::start_screen(out, controller.rules().enforce_budget_tiers)?;

    for line in input.lines() {
        let line = line?;
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                render::error(out, &err.to_string())?;
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }

        let now = clock();
        if controller.poll(now) {
            render::result_screen(out, &controller.result_summary(now))?;
            // The command was typed for the shopping screen, which is gone.
            if !command.is_view() {
                continue;
            }
        }
        if command == Command::Restart && controller.screen() == Screen::Result {
            finished.push(controller.result_summary(now));
        }
        execute(controller, command, out, now)?;
    }

    if controller.screen() == Screen::Result {
        finished.push(controller.result_summary(clock()));
    }
    Ok(finished)
}

fn execute<S: RankingStorage>(
    controller: &mut MissionController<S>,
    command: Command,
    out: &mut dyn Write,
    now: DateTime<Utc>,
) -> Result<()> {
    let action = match command {
        Command::Help => return Ok(render::help(out)?),
        Command::Items => return Ok(render::catalog(out, controller.catalog())?),
        Command::Cart => {
            let remaining = controller.remaining_seconds(now);
            return Ok(render::shopping_screen(out, controller, remaining)?);
        }
        Command::Ranking => {
            match controller.ranking() {
                Ok(entries) => render::ranking(out, &entries)?,
                Err(err) => render::error(out, &err.to_string())?,
            }
            return Ok(());
        }
        Command::Quit => return Ok(()),
        Command::Start {
            difficulty,
            budget,
            name,
        } => Action::StartMission {
            name,
            difficulty,
            budget,
        },
        Command::Add(selector) => match resolve_item(controller.catalog(), &selector) {
            Ok(item) => Action::AddItem(item),
            Err(err) => return Ok(render::error(out, &err.to_string())?),
        },
        Command::Remove(selector) => match resolve_item(controller.catalog(), &selector) {
            Ok(item) => Action::RemoveItem(item),
            Err(err) => return Ok(render::error(out, &err.to_string())?),
        },
        Command::Register { name, price } => Action::RegisterItem { name, price },
        Command::Buy => Action::ConfirmPurchase,
        Command::Reflect(text) => Action::WriteReflection(text),
        Command::Save => Action::SaveRanking,
        Command::Restart => Action::Restart,
    };

    match controller.handle(action, now) {
        Ok(outcome) => render_outcome(controller, outcome, out, now)?,
        Err(err @ MissionError::BudgetExceeded { .. }) => {
            render::warning(out, &format!("You cannot go over the budget: {err}"))?;
        }
        Err(err) => render::error(out, &err.to_string())?,
    }
    Ok(())
}

fn render_outcome<S: RankingStorage>(
    controller: &MissionController<S>,
    outcome: Outcome,
    out: &mut dyn Write,
    now: DateTime<Utc>,
) -> Result<()> {
    match outcome {
        Outcome::MissionStarted => {
            let remaining = controller.remaining_seconds(now);
            render::shopping_screen(out, controller, remaining)?;
        }
        Outcome::ItemAdded { item, quantity } => {
            writeln!(
                out,
                "Added {item} (x{quantity}). Left: {}",
                render::format_won(controller.remaining_budget())
            )?;
        }
        Outcome::ItemRemoved { item, quantity } => {
            if quantity == 0 {
                writeln!(out, "{item} is no longer in the cart.")?;
            } else {
                writeln!(out, "Removed one {item} (x{quantity} left).")?;
            }
        }
        Outcome::ItemRegistered { name } => writeln!(out, "Registered {name}.")?,
        Outcome::TimedOut(summary) | Outcome::Finished(summary) => {
            render::result_screen(out, &summary)?;
        }
        Outcome::ReflectionSaved => writeln!(out, "Reflection saved.")?,
        Outcome::Ranked(entries) => {
            writeln!(out, "Score saved.")?;
            render::ranking(out, &entries)?;
        }
        Outcome::Restarted => {
            render::start_screen(out, controller.rules().enforce_budget_tiers)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use mission_shop::{
        BuiltinCatalog, CatalogSource, Leaderboard, MemoryRanking, MissionRules,
    };
    use std::cell::Cell;
    use std::sync::Arc;

    fn controller(rules: MissionRules) -> MissionController<MemoryRanking> {
        MissionController::new(
            rules,
            BuiltinCatalog.load_catalog().unwrap(),
            Some(Arc::new(Leaderboard::new(MemoryRanking::new()))),
        )
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn play(
        ctl: &mut MissionController<MemoryRanking>,
        script: &str,
        clock: impl Fn() -> DateTime<Utc>,
    ) -> (String, Vec<ResultSummary>) {
        let mut out = Vec::new();
        let finished = run(ctl, script.as_bytes(), &mut out, clock).unwrap();
        (String::from_utf8(out).unwrap(), finished)
    }

    #[test]
    fn scripted_mission_reaches_the_result() {
        let mut ctl = controller(MissionRules::default());
        let script = "start normal 20000 하늘\nadd 1\nadd 공책\nadd 가방\nbuy\nreflect 계획대로 샀다\nsave\n";
        let (text, finished) = play(&mut ctl, script, t0);

        assert!(text.contains("Added 연필"));
        assert!(text.contains("cannot go over the budget"));
        assert!(text.contains("Mission success"));
        assert!(text.contains("Score saved"));
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].total, 4_000);
        assert_eq!(finished[0].reflection, "계획대로 샀다");
    }

    #[test]
    fn restart_records_the_finished_mission() {
        let mut ctl = controller(MissionRules::classic());
        let script = "start easy 10000\nadd 2\nbuy\nrestart\nstart easy 30000\nquit\nbuy\n";
        let (text, finished) = play(&mut ctl, script, t0);
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].budget, 10_000);
        assert_eq!(ctl.screen(), Screen::Shopping);
        assert!(text.contains("Choose your mission"));
    }

    #[test]
    fn bad_input_is_reported_and_the_loop_continues() {
        let mut ctl = controller(MissionRules::default());
        let script = "fly away\nadd 1\nstart hard 50000\nstart hard 10000\nadd 42\n";
        let (text, finished) = play(&mut ctl, script, t0);
        assert!(text.contains("unknown command"));
        assert!(text.contains("requires the shopping screen"));
        assert!(text.contains("not available on Hard"));
        assert!(text.contains("no item #42"));
        assert!(finished.is_empty());
    }

    #[test]
    fn idle_player_times_out_on_next_command() {
        let mut ctl = controller(MissionRules::default());
        let tick = Cell::new(0_i64);
        let clock = || {
            let now = t0() + Duration::seconds(tick.get());
            tick.set(tick.get() + 40);
            now
        };
        let (text, finished) = play(&mut ctl, "start hard 10000\ncart\nadd 1\n", clock);
        assert!(text.contains("Time is up"));
        assert!(!text.contains("Added"));
        assert_eq!(finished.len(), 1);
        assert!(finished[0].timed_out);
        assert!(finished[0].lines.is_empty());
    }

    #[test]
    fn late_reflect_shows_the_result_instead() {
        let mut ctl = controller(MissionRules::default());
        let tick = Cell::new(0_i64);
        let clock = || {
            let now = t0() + Duration::seconds(tick.get());
            tick.set(tick.get() + 70);
            now
        };
        let script = "start hard 10000\nreflect 너무 늦었다\nreflect 다음엔 빨리\n";
        let (text, finished) = play(&mut ctl, script, clock);
        assert_eq!(text.matches("Time is up").count(), 1);
        assert_eq!(text.matches("Reflection saved").count(), 1);
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].reflection, "다음엔 빨리");
    }
}
