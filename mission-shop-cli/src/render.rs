use colored::Colorize;
use std::io::{self, Write};

use mission_shop::constants::CLASSIC_BUDGETS;
use mission_shop::{
    Catalog, Difficulty, MissionController, RankingEntry, RankingStorage, ResultSummary,
};

use crate::commands::HELP;

/// Format an amount as `12,345원`.
pub fn format_won(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}{grouped}원")
}

pub fn start_screen(out: &mut dyn Write, tiers_enforced: bool) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "🎯 Choose your mission".bright_cyan().bold())?;
    if tiers_enforced {
        for difficulty in Difficulty::ALL {
            let budgets: Vec<String> = difficulty
                .allowed_budgets()
                .iter()
                .map(|b| format_won(i64::from(*b)))
                .collect();
            writeln!(
                out,
                "  {:7} budgets: {:24} time: {}s  bonus: x{}",
                difficulty.to_string(),
                budgets.join(", "),
                difficulty.time_limit_secs(),
                difficulty.bonus()
            )?;
        }
    } else {
        let budgets: Vec<String> = CLASSIC_BUDGETS
            .iter()
            .map(|b| format_won(i64::from(*b)))
            .collect();
        writeln!(out, "  budgets: {}", budgets.join(", "))?;
    }
    writeln!(out, "Type `start <difficulty> <budget> [name]` to begin.")
}

pub fn catalog(out: &mut dyn Write, catalog: &Catalog) -> io::Result<()> {
    writeln!(out, "{}", "Items".bold())?;
    for (idx, entry) in catalog.iter().enumerate() {
        write!(
            out,
            "  #{:<2} {:12} {:>10}",
            idx + 1,
            entry.name,
            format_won(i64::from(entry.unit_price))
        )?;
        if let Some(image) = &entry.image_ref {
            write!(out, "  [{image}]")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn shopping_screen<S: RankingStorage>(
    out: &mut dyn Write,
    controller: &MissionController<S>,
    remaining_secs: Option<i64>,
) -> io::Result<()> {
    let session = controller.session();
    writeln!(out)?;
    writeln!(out, "{}", "🛒 Shopping".bright_cyan().bold())?;
    writeln!(
        out,
        "Budget: {}  Spent: {}  Left: {}",
        format_won(i64::from(session.budget)).bold(),
        format_won(controller.cart_total()),
        format_won(controller.remaining_budget())
    )?;
    if let Some(secs) = remaining_secs {
        writeln!(out, "Time left: {}s", secs.max(0))?;
    }
    catalog(out, controller.catalog())?;
    cart(out, controller)
}

pub fn cart<S: RankingStorage>(
    out: &mut dyn Write,
    controller: &MissionController<S>,
) -> io::Result<()> {
    writeln!(out, "{}", "🧺 Cart".bold())?;
    let session = controller.session();
    if session.cart.is_empty() {
        return writeln!(out, "  The cart is empty.");
    }
    for line in session.cart.lines() {
        let price = controller
            .catalog()
            .find(&line.item)
            .map_or(0, |entry| entry.unit_price);
        writeln!(
            out,
            "  - {} x{} ({})",
            line.item,
            line.quantity,
            format_won(i64::from(price) * i64::from(line.quantity))
        )?;
    }
    Ok(())
}

pub fn result_screen(out: &mut dyn Write, summary: &ResultSummary) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "✅ Result".bright_cyan().bold())?;
    if summary.timed_out {
        writeln!(out, "{}", "⏰ Time is up!".yellow())?;
    }
    writeln!(out, "{}", "📦 Purchased".bold())?;
    if summary.lines.is_empty() {
        writeln!(out, "  Nothing was purchased.")?;
    }
    for line in &summary.lines {
        writeln!(
            out,
            "  - {} x{} ({})",
            line.item,
            line.quantity,
            format_won(line.subtotal)
        )?;
    }
    writeln!(out, "Total spent: {}", format_won(summary.total).bold())?;
    writeln!(out, "Left over: {}", format_won(summary.remaining).bold())?;
    if summary.success {
        writeln!(out, "{}", "🎉 Mission success! You stayed within budget.".green())?;
    } else {
        writeln!(out, "{}", "❌ Mission failed! You went over budget.".red())?;
    }
    if let Some(score) = summary.score {
        writeln!(
            out,
            "Score: {} ({} difficulty, {}s left)",
            score.to_string().bright_yellow().bold(),
            summary.difficulty,
            summary.time_left
        )?;
    }
    if !summary.reflection.is_empty() {
        writeln!(out, "📝 {}", summary.reflection)?;
    }
    writeln!(
        out,
        "Write a reflection with `reflect <text>`, `save` your score, or `restart`."
    )
}

pub fn ranking(out: &mut dyn Write, entries: &[RankingEntry]) -> io::Result<()> {
    writeln!(out, "{}", "🏆 Ranking".bright_yellow().bold())?;
    if entries.is_empty() {
        return writeln!(out, "  No scores yet.");
    }
    for (idx, entry) in entries.iter().enumerate() {
        writeln!(
            out,
            "  {:>2}. {:16} {:>7}  {}",
            idx + 1,
            entry.name,
            entry.score,
            entry.difficulty
        )?;
    }
    Ok(())
}

pub fn help(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{}", "Commands".bold())?;
    for (usage, description) in HELP {
        writeln!(out, "  {usage:42} {description}")?;
    }
    Ok(())
}

pub fn warning(out: &mut dyn Write, message: &str) -> io::Result<()> {
    writeln!(out, "{} {}", "❗".yellow(), message.yellow())
}

pub fn error(out: &mut dyn Write, message: &str) -> io::Result<()> {
    writeln!(out, "{} {}", "⚠️ ".red(), message.red())
}
