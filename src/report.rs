//! Plain-text report assembled from a finished [`AnalysisResult`].

use std::fmt::Write;

use crate::{
    analysis::{AnalysisOptions, AnalysisResult, KpiKind},
    locale::Texts,
};

const RULE_WIDTH: usize = 80;

struct ReportWriter {
    out: String,
}

impl ReportWriter {
    fn line(&mut self, text: impl AsRef<str>) {
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn banner(&mut self, title: &str) {
        let rule = "=".repeat(RULE_WIDTH);
        self.line(&rule);
        self.line(title);
        self.line(&rule);
    }

    fn section(&mut self, title: &str) {
        let rule = "-".repeat(RULE_WIDTH);
        self.blank();
        self.line(&rule);
        self.line(title);
        self.line(&rule);
        self.blank();
    }

    fn bullet(&mut self, text: impl AsRef<str>) {
        let _ = writeln!(self.out, "• {}", text.as_ref());
    }
}

fn kpi_text<'a>(result: &'a AnalysisResult, kind: KpiKind, texts: &'a Texts) -> &'a str {
    result
        .kpi(kind)
        .map(|kpi| kpi.formatted.as_str())
        .unwrap_or(texts.not_available)
}

/// Renders the report in `options.language`, dated at `options.now`.
pub fn generate_report(result: &AnalysisResult, options: &AnalysisOptions) -> String {
    let language = options.language;
    let texts = language.texts();
    let mut report = ReportWriter { out: String::new() };

    report.banner(texts.report_title);
    report.blank();
    report.line(format!("📅 {}: {}", texts.report_date, options.now.format("%Y-%m-%d")));
    let period = match result.period {
        Some(period) => format!(
            "{} {} {}",
            period.start.format("%Y-%m-%d"),
            texts.period_separator,
            period.end.format("%Y-%m-%d")
        ),
        None => texts.not_available.to_string(),
    };
    report.line(format!("📊 {}: {period}", texts.analysis_period));
    report.line(format!("👥 {}: {}", texts.target_audience, texts.audience));

    report.section(texts.executive_summary);
    report.line(texts.summary_intro);
    report.blank();
    report.bullet(format!(
        "{}: {}",
        texts.total_sales,
        kpi_text(result, KpiKind::TotalSales, texts)
    ));
    report.bullet(format!(
        "{}: {}",
        texts.total_transactions,
        kpi_text(result, KpiKind::TotalTransactions, texts)
    ));
    report.bullet(format!(
        "{}: {}",
        texts.gross_margin,
        kpi_text(result, KpiKind::GrossMargin, texts)
    ));

    report.section(texts.key_findings);
    if result.insights.is_empty() {
        report.line(texts.no_findings);
    }
    for insight in &result.insights {
        report.bullet(&insight.message);
    }

    report.section(texts.margin_analysis);
    match result.kpi(KpiKind::GrossMargin) {
        Some(margin) => {
            for line in language.margin_commentary(margin.value) {
                report.line(line);
            }
            if margin.estimated {
                report.line(format!("   {}", texts.estimated_suffix));
            }
        }
        None => report.line(texts.not_available),
    }

    report.section(texts.recommendations);
    for line in texts.recommendation_block {
        report.line(line);
    }

    report.section(texts.data_quality);
    if result.warnings.is_empty() {
        report.line(texts.quality_ok);
    } else {
        report.line(texts.issues_detected);
        for warning in &result.warnings {
            report.bullet(&warning.message);
        }
    }

    report.blank();
    report.banner(texts.end_of_report);
    report.out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        analysis::analyze_with,
        dataset::Dataset,
        locale::Language,
        mapping::{FieldMapping, SemanticField},
    };

    fn options(language: Language) -> AnalysisOptions {
        AnalysisOptions::at(
            NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
        )
        .with_language(language)
    }

    fn sample() -> (Dataset, FieldMapping) {
        let dataset = Dataset::from_rows(
            ["date", "region", "amount", "cost"],
            vec![
                vec!["2024-01-03", "East", "1000", "700"],
                vec!["2024-02-11", "West", "500", "300"],
            ],
        );
        let mapping = FieldMapping::default()
            .with(SemanticField::OrderDate, "date")
            .with(SemanticField::Region, "region")
            .with(SemanticField::TotalAmount, "amount")
            .with(SemanticField::Cost, "cost");
        (dataset, mapping)
    }

    #[test]
    fn english_report_lists_summary_and_findings() {
        let (dataset, mapping) = sample();
        let options = options(Language::English);
        let result = analyze_with(&dataset, &mapping, &options);
        let report = generate_report(&result, &options);

        assert!(report.starts_with(&"=".repeat(RULE_WIDTH)));
        assert!(report.contains("📅 Report Date: 2024-03-15"));
        assert!(report.contains("📊 Analysis Period: 2024-01-03 to 2024-02-11"));
        assert!(report.contains("• Total Sales: $1,500"));
        assert!(report.contains("• Total Transactions: 2"));
        // (1500 - 1000) / 1500
        assert!(report.contains("• Gross Margin: 33.3%"));
        assert!(report.contains("• 🏆 Top Sales Region: East ($1,000)"));
        assert!(report.contains("✅ Excellent Profit Margin (33.3%)"));
        assert!(report.contains("STRATEGIC RECOMMENDATIONS"));
        assert!(report.contains("✅ Excellent data quality - No major issues found"));
        assert!(report.trim_end().ends_with(&"=".repeat(RULE_WIDTH)));
    }

    #[test]
    fn missing_metrics_render_as_not_available() {
        let dataset = Dataset::from_rows(["x"], vec![vec!["1"], vec!["1"]]);
        let options = options(Language::Arabic);
        let result = analyze_with(&dataset, &FieldMapping::default(), &options);
        let report = generate_report(&result, &options);

        assert!(report.contains("تقرير تحليل المبيعات"));
        assert!(report.contains("• إجمالي المبيعات: غير متوفر"));
        assert!(report.contains("فترة التحليل: غير متوفر"));
        assert!(report.contains("⚠️ يوجد 1 سجل مكرر"));
        assert!(report.contains("نهاية التقرير"));
    }
}
