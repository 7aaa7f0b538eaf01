//! HTML for the upload form and the results page.

use crate::inference::ScoredBatch;
use crate::report::ClassificationReport;
use std::fmt::Write;

const TITLE: &str = "Waze App User Churn Prediction";

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn page(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n<h1>{title}</h1>\n{body}\n</body>\n</html>\n",
        title = TITLE,
        body = body
    )
}

fn upload_form() -> &'static str {
    concat!(
        "<p>Upload a CSV file with user records for churn prediction.</p>\n",
        "<form action=\"/predict\" method=\"post\" enctype=\"multipart/form-data\">\n",
        "<input type=\"file\" name=\"file\" accept=\".csv,text/csv\">\n",
        "<button type=\"submit\">Predict</button>\n",
        "</form>"
    )
}

pub fn index() -> String {
    page(upload_form())
}

pub fn results(scored: &ScoredBatch) -> String {
    let mut body = String::from(upload_form());
    body.push_str("\n<h2>Prediction Results:</h2>\n");
    let _ = writeln!(
        body,
        "<p>{} rows: {} churned, {} retained.</p>",
        scored.predictions.len(),
        scored.churned(),
        scored.retained()
    );
    body.push_str("<table>\n<thead><tr><th></th><th>Predicted</th></tr></thead>\n<tbody>\n");
    for (i, p) in scored.predictions.iter().enumerate() {
        let _ = writeln!(body, "<tr><td>{}</td><td>{}</td></tr>", i, p);
    }
    body.push_str("</tbody>\n</table>\n");
    if let Some(report) = &scored.report {
        body.push_str(&report_table(report));
    }
    page(&body)
}

fn report_table(report: &ClassificationReport) -> String {
    let mut out = String::from(
        "<h2>Classification Report</h2>\n<table>\n<thead><tr><th></th><th>precision</th><th>recall</th><th>f1-score</th><th>support</th></tr></thead>\n<tbody>\n",
    );
    for m in &report.classes {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{}</td></tr>",
            m.label, m.precision, m.recall, m.f1, m.support
        );
    }
    let _ = writeln!(
        out,
        "<tr><td>accuracy</td><td></td><td></td><td>{:.2}</td><td>{}</td></tr>",
        report.accuracy, report.labelled
    );
    for (name, avg) in [("macro avg", &report.macro_avg), ("weighted avg", &report.weighted_avg)] {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{}</td></tr>",
            name, avg.precision, avg.recall, avg.f1, avg.support
        );
    }
    out.push_str("</tbody>\n</table>\n");
    out
}

pub fn error(message: &str) -> String {
    let body = format!(
        "{}\n<p class=\"error\">{}</p>",
        upload_form(),
        escape(message)
    );
    page(&body)
}
