//! User-facing console lines (summary, dry-run notes, startup hints).
//! Colors are enabled only when stdout is a TTY; logs go through tracing instead.

use owo_colors::OwoColorize;

#[derive(Debug, Clone, Copy)]
enum Tone {
    Info,
    Warn,
    Error,
    Ok,
}

fn is_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

fn emit(tone: Tone, msg: &str) {
    let tag = match tone {
        Tone::Info => "info:",
        Tone::Warn => "warn:",
        Tone::Error => "error:",
        Tone::Ok => "ok:",
    };
    let colored = is_tty();
    let line = if colored {
        let painted = match tone {
            Tone::Info => tag.cyan().bold().to_string(),
            Tone::Warn => tag.yellow().bold().to_string(),
            Tone::Error => tag.red().bold().to_string(),
            Tone::Ok => tag.green().bold().to_string(),
        };
        format!("{painted} {msg}")
    } else {
        format!("{tag} {msg}")
    };
    match tone {
        Tone::Warn | Tone::Error => eprintln!("{line}"),
        Tone::Info | Tone::Ok => println!("{line}"),
    }
}

pub fn print_info(msg: &str) {
    emit(Tone::Info, msg);
}

pub fn print_warn(msg: &str) {
    emit(Tone::Warn, msg);
}

pub fn print_error(msg: &str) {
    emit(Tone::Error, msg);
}

pub fn print_success(msg: &str) {
    emit(Tone::Ok, msg);
}

/// One aligned "label: count" row of the run summary. Zero counts are dimmed on a TTY.
pub fn print_count(label: &str, count: usize) {
    if is_tty() && count == 0 {
        println!("  {:<22} {}", label, count.dimmed());
    } else {
        println!("  {:<22} {}", label, count);
    }
}

/// Print a plain line (no prefix). Used for the unresolved-collision listing,
/// which users may script against.
pub fn print_user(msg: &str) {
    println!("{}", msg);
}
