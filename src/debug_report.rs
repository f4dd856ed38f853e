use scorekeeper::{FinalGame, ReplayError, ReplayResultVerbose};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_run(source: &str, res: &ReplayResultVerbose, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚾ Replaying: {source}"), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Games ━━━", ansi::GRAY));
    if res.games.is_empty() {
        println!("{}", palette.dim("  No games finalized"));
    }
    for game in &res.games {
        print_game(game, &palette);
    }

    if !res.failures.is_empty() {
        println!("\n{}", palette.paint("━━━ Failures ━━━", ansi::GRAY));
        for failure in &res.failures {
            print_failure(failure, &palette);
        }
    }

    if !res.mismatches.is_empty() {
        println!("\n{}", palette.paint("━━━ Mismatches ━━━", ansi::GRAY));
        for m in &res.mismatches {
            println!(
                "  {} {} {}",
                palette.paint(format!("{} #{}", m.game_id, m.record_index), ansi::YELLOW),
                palette.paint(format!("{:?}", m.kind), ansi::BLUE),
                palette.dim(&m.message)
            );
        }
    }

    let metrics = &res.details.metrics;
    println!("\n{}", palette.paint("━━━ Categories ━━━", ansi::GRAY));
    if metrics.categories.is_empty() {
        println!("{}", palette.dim("  No plays"));
    }
    for (label, count) in &metrics.categories {
        println!("  {:<28} {}", palette.paint(*label, ansi::BLUE), palette.paint(count.to_string(), ansi::YELLOW));
    }

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    let slowest = metrics.games.iter().max_by_key(|g| g.duration);
    println!(
        "  Total: {}  │  Records: {}  │  Plays: {}  │  Rule attempts: {}",
        palette.paint(format!("{:?}", metrics.total), ansi::GREEN),
        palette.paint(metrics.records.to_string(), ansi::CYAN),
        palette.paint(metrics.plays.to_string(), ansi::CYAN),
        palette.dim(metrics.rule_attempts.to_string()),
    );
    if let Some(game) = slowest {
        println!("  {} {} {}", palette.dim("Slowest:"), game.game_id, palette.dim(format!("{:?}", game.duration)));
    }
    println!();
}

fn print_game(game: &FinalGame, palette: &ansi::Palette) {
    let date = game.date.map(|d| d.to_string()).unwrap_or_else(|| "????-??-??".to_string());
    println!(
        "  {} {} {} {}",
        palette.bold(&game.id),
        palette.dim(date),
        palette.paint(
            format!("{} {} - {} {}", game.teams[0], game.final_score[0], game.final_score[1], game.teams[1]),
            ansi::GREEN
        ),
        palette.dim(format!("({} inn, {} plays)", game.innings, game.snapshots.len())),
    );
}

fn print_failure(failure: &ReplayError, palette: &ansi::Palette) {
    println!(
        "  {} {}",
        palette.paint(format!("{} #{}", failure.game_id.as_deref().unwrap_or("-"), failure.record_index), ansi::RED),
        palette.paint(&failure.record, ansi::YELLOW),
    );
    println!("      {}", failure.kind);
    for line in failure.diagnosis.lines() {
        println!("      {}", palette.dim(line));
    }
}
