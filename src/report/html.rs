//! HTML report renderer backed by a `minijinja` template.

use minijinja::{Environment, context};
use serde::Serialize;

use crate::consistency::{Finding, Severity};

use super::{ReportContext, ReportError};

/// Page template. Findings are coloured by severity the way the console
/// report tags them.
const PAGE_TEMPLATE: &str = "\
<!DOCTYPE html>
<title>Consistency Check Report</title>

<h1>Main report for repository {{ repository }}</h1>
{% for entry in entries %}
<p>
<a href=\"{{ entry.url }}\">#{{ entry.number }}</a> (Milestone: {{ entry.milestone }})
<ul>
{% for finding in entry.findings %}<li style=\"color:{{ finding.color }};\">{{ finding.message }}</li>
{% endfor %}</ul>
</p>
{% endfor %}
{% for section in backports %}
<h1>Backports to {{ section.branch }}</h1>
{{ section.items | length }} merges in total. These are in merge order:
<pre>
{% for item in section.items %}# Pull request <a href=\"{{ item.url }}\">#{{ item.number }}</a>: {{ item.title }}
{{ item.command }}
{% endfor %}</pre>
{% endfor %}
";

#[derive(Debug, Serialize)]
struct FindingRow {
    message: String,
    color: &'static str,
}

impl From<&Finding> for FindingRow {
    fn from(finding: &Finding) -> Self {
        Self {
            message: finding.message.clone(),
            color: match finding.severity {
                Some(Severity::Valid) => "green",
                Some(Severity::CantFix) => "orange",
                Some(Severity::Invalid) => "red",
                None => "black",
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct PullRequestRow {
    number: String,
    milestone: String,
    url: String,
    findings: Vec<FindingRow>,
}

#[derive(Debug, Serialize)]
struct BackportItem {
    number: String,
    title: String,
    url: String,
    command: String,
}

#[derive(Debug, Serialize)]
struct BackportSection {
    branch: String,
    items: Vec<BackportItem>,
}

/// Renders the report as a self-contained HTML page.
///
/// # Errors
///
/// Returns [`ReportError::Template`] when the template fails to render.
pub fn render_html(report_context: &ReportContext<'_>) -> Result<String, ReportError> {
    let entries: Vec<PullRequestRow> = report_context
        .report
        .entries(report_context.show_all)
        .map(|(id, findings)| PullRequestRow {
            number: id.to_string(),
            milestone: report_context.milestone_label(id),
            url: report_context.issue_url(id),
            findings: findings.iter().map(FindingRow::from).collect(),
        })
        .collect();

    let backports: Vec<BackportSection> = report_context
        .report
        .backports
        .iter()
        .map(|(branch, queue)| BackportSection {
            branch: branch.to_string(),
            items: queue
                .iter()
                .map(|&id| BackportItem {
                    number: id.to_string(),
                    title: report_context
                        .pull_requests
                        .get(&id)
                        .map_or_else(|| "(unknown title)".to_owned(), |pr| pr.title.clone()),
                    url: report_context.issue_url(id),
                    command: report_context.backport_command(id),
                })
                .collect(),
        })
        .collect();

    let mut environment = Environment::new();
    environment
        .add_template("report", PAGE_TEMPLATE)
        .map_err(template_error)?;
    let template = environment.get_template("report").map_err(template_error)?;
    template
        .render(context! {
            repository => report_context.repository.to_string(),
            entries => entries,
            backports => backports,
        })
        .map_err(template_error)
}

fn template_error(error: minijinja::Error) -> ReportError {
    ReportError::Template {
        message: error.to_string(),
    }
}
