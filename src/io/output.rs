use crate::commands::triage::{ReportSource, TriageReport};
use crate::core::Disposition;
use crate::metrics::MetricGrade;
use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use std::io::Write;
use std::path::Path;

#[derive(Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Terminal,
}

pub trait OutputWriter {
    fn write_report(&mut self, report: &TriageReport) -> anyhow::Result<()>;
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_report(&mut self, report: &TriageReport) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        self.writer.write_all(json.as_bytes())?;
        writeln!(self.writer)?;
        Ok(())
    }
}

pub struct TerminalWriter<W: Write> {
    writer: W,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for TerminalWriter<W> {
    fn write_report(&mut self, report: &TriageReport) -> anyhow::Result<()> {
        self.write_header(report)?;
        self.write_metrics(report)?;
        self.write_dispositions(report)?;
        self.write_advice(report)?;
        self.write_uncertain(report)?;
        self.write_explanation(report)?;
        Ok(())
    }
}

impl<W: Write> TerminalWriter<W> {
    fn write_header(&mut self, report: &TriageReport) -> anyhow::Result<()> {
        writeln!(self.writer, "{}", "Exovet Triage Report".bold().blue())?;
        writeln!(self.writer, "{}", "====================".blue())?;

        let source = match &report.source {
            ReportSource::File { path, targets } => {
                format!("Source: {} ({} targets)", path.display(), targets)
            }
            ReportSource::Synthetic { samples, seed } => {
                format!("Source: synthetic demo set ({samples} samples, seed {seed})")
            }
        };
        writeln!(self.writer, "{source}")?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_metrics(&mut self, report: &TriageReport) -> anyhow::Result<()> {
        writeln!(
            self.writer,
            "{} Metrics at threshold {:.0}%:",
            "📊".bold(),
            report.metrics.threshold * 100.0
        )?;

        let counts = &report.metrics.counts;
        let derived = &report.metrics.derived;

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                "TP", "FP", "TN", "FN", "Precision", "Recall", "F1", "MCC",
            ]);
        table.add_row(vec![
            Cell::new(counts.true_positives),
            Cell::new(counts.false_positives),
            Cell::new(counts.true_negatives),
            Cell::new(counts.false_negatives),
            Cell::new(format!("{:.1}%", derived.precision * 100.0)),
            Cell::new(format!("{:.1}%", derived.recall * 100.0)),
            Cell::new(format!("{:.1}%", derived.f1 * 100.0)).fg(grade_color(report.advice.f1_grade)),
            Cell::new(format!("{:.3}", derived.mcc)),
        ]);
        writeln!(self.writer, "{table}")?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_dispositions(&mut self, report: &TriageReport) -> anyhow::Result<()> {
        let counts = &report.dispositions;
        if counts.total() == 0 {
            return Ok(());
        }

        writeln!(
            self.writer,
            "{} Dispositions ({} targets):",
            "🪐",
            counts.total()
        )?;
        writeln!(self.writer, "  {}: {}", "Confirmed".green(), counts.confirmed)?;
        writeln!(self.writer, "  {}: {}", "Candidate".blue(), counts.candidate)?;
        writeln!(
            self.writer,
            "  {}: {}",
            "False Positive".red(),
            counts.false_positive
        )?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_advice(&mut self, report: &TriageReport) -> anyhow::Result<()> {
        let grade = match report.advice.f1_grade {
            MetricGrade::Excellent => "Excellent".green().bold(),
            MetricGrade::Good => "Good".yellow().bold(),
            MetricGrade::Poor => "Poor".red().bold(),
        };
        writeln!(self.writer, "{} F1 grade: {}", "💡", grade)?;
        writeln!(self.writer, "   {}", report.advice.suggestion)?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_uncertain(&mut self, report: &TriageReport) -> anyhow::Result<()> {
        if report.uncertain.is_empty() {
            return Ok(());
        }

        writeln!(self.writer, "{} Most uncertain targets:", "⚠️".yellow())?;

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                "Target",
                "Disposition",
                "P(positive)",
                "Entropy",
                "Confidence",
            ]);
        for row in &report.uncertain {
            table.add_row(vec![
                Cell::new(&row.object_id),
                Cell::new(row.disposition.display_name()).fg(disposition_color(row.disposition)),
                Cell::new(format!("{:.3}", row.positive_probability)),
                Cell::new(format!("{:.3}", row.uncertainty)),
                Cell::new(format!("{:.0}%", row.conf * 100.0)),
            ]);
        }
        writeln!(self.writer, "{table}")?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_explanation(&mut self, report: &TriageReport) -> anyhow::Result<()> {
        let Some(explain) = &report.explain else {
            return Ok(());
        };

        writeln!(
            self.writer,
            "{} Top features for {}:",
            "🔍",
            explain.object_id.bold()
        )?;

        let max = explain
            .top_attributions
            .iter()
            .map(|a| a.magnitude())
            .fold(0.0f64, f64::max);

        // Ranking is ascending by magnitude; print strongest first.
        for attr in explain.top_attributions.iter().rev() {
            let width = if max > 0.0 {
                ((attr.magnitude() / max) * 24.0).round() as usize
            } else {
                0
            };
            let bar = "█".repeat(width.max(1));
            let bar = if attr.value >= 0.0 {
                bar.green()
            } else {
                bar.red()
            };
            writeln!(self.writer, "  {:<16} {} {:+.3}", attr.feature, bar, attr.value)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }
}

fn grade_color(grade: MetricGrade) -> Color {
    match grade {
        MetricGrade::Excellent => Color::Green,
        MetricGrade::Good => Color::Yellow,
        MetricGrade::Poor => Color::Red,
    }
}

fn disposition_color(disposition: Disposition) -> Color {
    match disposition {
        Disposition::Confirmed => Color::Green,
        Disposition::Candidate => Color::Blue,
        Disposition::FalsePositive => Color::Red,
    }
}

pub fn create_writer(
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<Box<dyn OutputWriter>> {
    let sink: Box<dyn Write> = match output {
        Some(path) => Box::new(std::fs::File::create(path)?),
        None => Box::new(std::io::stdout()),
    };
    Ok(match format {
        OutputFormat::Json => Box::new(JsonWriter::new(sink)),
        OutputFormat::Terminal => Box::new(TerminalWriter::new(sink)),
    })
}
