use std::io::Write;

use consistency_core::view::{IssueListView, PaperView, ViewModel};
use consistency_core::{Phase, RunStatus, Severity};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

fn severity_tag(severity: Severity, label: &str, color: ColorMode) -> String {
    if !color.enabled() {
        return label.to_string();
    }
    match severity {
        Severity::High => label.red().bold().to_string(),
        Severity::Medium => label.yellow().to_string(),
        Severity::Low => label.cyan().to_string(),
    }
}

/// Print the status badge and message.
pub fn print_status(w: &mut dyn Write, status: &RunStatus, color: ColorMode) -> std::io::Result<()> {
    let badge = format!("[{}]", status.badge);
    if color.enabled() {
        let badge = match status.phase {
            Phase::Success => badge.green().bold().to_string(),
            Phase::Failure => badge.red().bold().to_string(),
            Phase::CheckingBackend | Phase::Uploading => badge.cyan().to_string(),
            Phase::Idle => badge.dimmed().to_string(),
        };
        writeln!(w, "{} {}", badge, status.message)
    } else {
        writeln!(w, "{} {}", badge, status.message)
    }
}

/// Print the severity counts for the displayed issues.
pub fn print_kpi(w: &mut dyn Write, view: &ViewModel, color: ColorMode) -> std::io::Result<()> {
    let kpi = view.kpi;
    if color.enabled() {
        writeln!(
            w,
            "{} {}   {} {}   {} {}   {} {}",
            "Total".bold(),
            kpi.total,
            "High".red(),
            kpi.high,
            "Medium".yellow(),
            kpi.medium,
            "Low".cyan(),
            kpi.low
        )
    } else {
        writeln!(
            w,
            "Total {}   High {}   Medium {}   Low {}",
            kpi.total, kpi.high, kpi.medium, kpi.low
        )
    }
}

/// Print the filtered issue list. The active issue is marked with `>`.
pub fn print_issues(w: &mut dyn Write, view: &ViewModel, color: ColorMode) -> std::io::Result<()> {
    let heading = format!("Issues ({}, filter: {})", view.issue_count_label, view.filter.code());
    if color.enabled() {
        writeln!(w, "{}", heading.bold())?;
    } else {
        writeln!(w, "{}", heading)?;
    }

    match &view.issues {
        IssueListView::Placeholder(message) => {
            if color.enabled() {
                writeln!(w, "  {}", message.dimmed())?;
            } else {
                writeln!(w, "  {}", message)?;
            }
        }
        IssueListView::Entries(entries) => {
            for entry in entries {
                let marker = if entry.active { ">" } else { " " };
                let title = if entry.active && color.enabled() {
                    entry.title.bold().to_string()
                } else {
                    entry.title.clone()
                };
                writeln!(
                    w,
                    "{} [{}] {} | {} {}",
                    marker,
                    entry.id,
                    entry.type_label,
                    severity_tag(entry.severity, entry.severity_label, color),
                    title
                )?;
                writeln!(w, "      {} (sentence {})", entry.detail, entry.sentence_id)?;
            }
        }
    }
    Ok(())
}

/// Print the extracted sentences with the highlighted one marked.
pub fn print_paper(w: &mut dyn Write, view: &ViewModel, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}", "Paper".bold())?;
    } else {
        writeln!(w, "Paper")?;
    }

    match &view.paper {
        PaperView::Placeholder(message) => {
            if color.enabled() {
                writeln!(w, "  {}", message.dimmed())?;
            } else {
                writeln!(w, "  {}", message)?;
            }
        }
        PaperView::Sentences(blocks) => {
            for block in blocks {
                if block.highlighted {
                    if color.enabled() {
                        writeln!(
                            w,
                            "* {} {}",
                            format!("{}:", block.id).dimmed(),
                            block.text.black().on_yellow()
                        )?;
                    } else {
                        writeln!(w, "* {}: {} <<", block.id, block.text)?;
                    }
                } else if color.enabled() {
                    writeln!(w, "  {} {}", format!("{}:", block.id).dimmed(), block.text)?;
                } else {
                    writeln!(w, "  {}: {}", block.id, block.text)?;
                }
            }
        }
    }
    Ok(())
}

/// Print the whole view: status, engine line, counts, issues, then the paper.
pub fn print_view(w: &mut dyn Write, view: &ViewModel, color: ColorMode) -> std::io::Result<()> {
    print_status(w, &view.status, color)?;
    if color.enabled() {
        writeln!(w, "{}", view.engine_summary.dimmed())?;
    } else {
        writeln!(w, "{}", view.engine_summary)?;
    }
    writeln!(w)?;
    print_kpi(w, view, color)?;
    writeln!(w)?;
    print_issues(w, view, color)?;
    writeln!(w)?;
    print_paper(w, view, color)?;
    Ok(())
}

/// Print the outcome of a health check.
pub fn print_health(
    w: &mut dyn Write,
    url: &str,
    outcome: &Result<(), String>,
    color: ColorMode,
) -> std::io::Result<()> {
    match outcome {
        Ok(()) => {
            if color.enabled() {
                writeln!(w, "{} backend at {} is reachable", "OK".green().bold(), url)
            } else {
                writeln!(w, "OK backend at {} is reachable", url)
            }
        }
        Err(cause) => {
            if color.enabled() {
                writeln!(w, "{} {}", "UNREACHABLE".red().bold(), cause)
            } else {
                writeln!(w, "UNREACHABLE {}", cause)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consistency_core::{IssueFilter, IssueType, RunState, demo, render};

    fn demo_view(key: &str) -> ViewModel {
        let mut state = RunState::new();
        state.replace_results(demo::dataset(key).unwrap());
        render(&state)
    }

    fn plain(f: impl Fn(&mut dyn Write) -> std::io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn view_marks_active_issue_and_highlight() {
        let view = demo_view("pdf");
        let out = plain(|w| print_view(w, &view, ColorMode(false)));
        assert!(out.contains("> [demo-pdf-1] Terminology | Medium Risk Terminology Drift"));
        assert!(out.contains("* s-3: "));
        assert!(out.contains("  s-1: "));
        assert!(out.contains("Total 1   High 0   Medium 1   Low 0"));
        assert!(!out.contains("\u{1b}["));
    }

    #[test]
    fn empty_filter_prints_placeholder() {
        let mut state = RunState::new();
        state.replace_results(demo::dataset("pdf").unwrap());
        state.set_filter(IssueFilter::Only(IssueType::Logic));
        let view = render(&state);
        let out = plain(|w| print_issues(w, &view, ColorMode(false)));
        assert!(out.contains("Issues (0 items, filter: logic)"));
        assert!(out.contains("No issues under the current filter."));
    }

    #[test]
    fn empty_state_prints_paper_placeholder() {
        let view = render(&RunState::new());
        let out = plain(|w| print_paper(w, &view, ColorMode(false)));
        assert!(out.contains("No extracted sentences available."));
    }

    #[test]
    fn color_mode_emits_ansi() {
        let view = demo_view("word");
        let out = plain(|w| print_view(w, &view, ColorMode(true)));
        assert!(out.contains("\u{1b}["));
    }

    #[test]
    fn health_failure_shows_cause() {
        let out = plain(|w| {
            print_health(
                w,
                "http://x",
                &Err("backend at http://x is unreachable: refused".into()),
                ColorMode(false),
            )
        });
        assert_eq!(out, "UNREACHABLE backend at http://x is unreachable: refused\n");
    }
}
