use crate::runner::types::{Comparison, Outcome, RunRecord, RunSummary};
use colored::{ColoredString, Colorize};
use std::fmt::Display;

/// 控制台输出
pub struct Reporter {
    verbose: bool,
}

impl Reporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// 打印运行标题，如 `[2] 03:04 PM`
    pub fn print_header(&self, cycle: usize) {
        let now = chrono::Local::now().format("%I:%M %p");
        println!("{}", format!("[{}] {}", cycle, now).cyan().bold().underline());
    }

    /// 打印单个块的结果
    pub fn print_record(&self, record: &RunRecord) {
        if !record.outcome.is_failure()
            && !record.comparison.is_mismatch()
            && let Some(label) = &record.label
        {
            println!("{}", label.purple());
        }
        println!("{}", render_line(record, true));
        for line in self.detail_lines(record) {
            println!("   {}", line);
        }
    }

    /// verbose 模式下附加的请求文本和响应 body
    fn detail_lines(&self, record: &RunRecord) -> Vec<String> {
        if !self.verbose {
            return Vec::new();
        }

        let mut lines: Vec<String> = record
            .wire
            .iter()
            .flat_map(|wire| wire.trim_end().lines())
            .map(|line| format!("> {}", line))
            .collect();
        if let Outcome::Responded { body, .. } = &record.outcome
            && !body.is_empty()
        {
            lines.extend(format_body(body).lines().map(str::to_string));
        }
        lines
    }

    /// 打印致命错误（解析失败等），监听继续
    pub fn print_error(&self, err: &impl Display) {
        println!("{}", format!("Error reprocessing HTTP files: {}", err).red());
    }

    pub fn print_done(&self, summary: &RunSummary) {
        if self.verbose {
            println!(
                "{}",
                format!(
                    "{} sent, {} failed, {} mismatched in {:.3}s",
                    summary.sent,
                    summary.failed,
                    summary.mismatched,
                    summary.total_duration.as_secs_f64()
                )
                .dimmed()
            );
        }
        println!("{}", "done.".dimmed());
    }
}

/// 单行结果，`paint` 为 false 时不带颜色
fn render_line(record: &RunRecord, paint: bool) -> String {
    match (&record.outcome, &record.comparison) {
        (Outcome::Responded { .. }, Comparison::Mismatch { expected, got }) => style(
            format!(
                "[X][ Response Status mismatch ] Expected: [ {} ] Got: [ {} ]",
                expected, got
            ),
            paint,
            |s| s.red(),
        ),
        (Outcome::Responded { status, .. }, _) => format!(
            "{} {} {} {}",
            style(format!("{:<6}", method_text(record)), paint, |s| s.blue().bold()),
            style(format!("{:<12}", status.status_line()), paint, |s| s.green()),
            style(format!("{:>3}ms", record.elapsed.as_millis()), paint, |s| s.yellow()),
            style(record.url.clone(), paint, |s| s.dimmed())
        ),
        (Outcome::TransportFailed(msg) | Outcome::BuildFailed(msg), _) => {
            format!("{}: {}", file_name(record), style(msg.clone(), paint, |s| s.red()))
        }
    }
}

fn style(text: String, paint: bool, apply: fn(ColoredString) -> ColoredString) -> String {
    if paint {
        apply(text.normal()).to_string()
    } else {
        text
    }
}

fn method_text(record: &RunRecord) -> &'static str {
    record.method.map(|m| m.as_str()).unwrap_or("-")
}

fn file_name(record: &RunRecord) -> String {
    record
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| record.file.display().to_string())
}

/// JSON 格式化，失败则原样返回
fn format_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|_| body.to_string())
}
