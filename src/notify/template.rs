use std::fmt::{self, Display};

use crate::staffing::types::Job;
use crate::sync::ChangeReport;

/// HTML body of the change notification email
pub struct ChangeNotificationTemplate<'a> {
  pub added: &'a [Job],
  pub removed: &'a [Job],
}

impl<'a> ChangeNotificationTemplate<'a> {
  pub fn new(report: &'a ChangeReport) -> Self {
    Self {
      added: report.added_jobs.as_deref().unwrap_or_default(),
      removed: report.removed_jobs.as_deref().unwrap_or_default(),
    }
  }

  pub fn subject(&self) -> String {
    format!(
      "Staffing update: {} new, {} closed",
      self.added.len(),
      self.removed.len()
    )
  }
}

fn write_section(f: &mut fmt::Formatter<'_>, heading: &str, class: &str, jobs: &[Job]) -> fmt::Result {
  if jobs.is_empty() {
    return Ok(());
  }

  writeln!(f, r#"<h2 class="{}">{} ({})</h2>"#, class, heading, jobs.len())?;
  writeln!(f, "<ul>")?;
  for job in jobs {
    writeln!(
      f,
      r#"<li><span class="title">{}</span> <span class="project">{}</span></li>"#,
      escape(&job.activity.title),
      escape(&job.project.name)
    )?;
  }
  writeln!(f, "</ul>")
}

impl<'a> Display for ChangeNotificationTemplate<'a> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Staffing update</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif;
            line-height: 1.6;
            color: #333;
            margin: 0;
            padding: 0;
        }}
        .container {{
            max-width: 600px;
            margin: 0 auto;
            padding: 20px;
        }}
        .added {{ color: #059669; }}
        .removed {{ color: #dc2626; }}
        .project {{ color: #6b7280; font-size: 14px; }}
    </style>
</head>
<body>
<div class="container">
<p>{} new and {} closed staffing requests since the last update.</p>
"#,
      self.added.len(),
      self.removed.len()
    )?;
    write_section(f, "New", "added", self.added)?;
    write_section(f, "Closed", "removed", self.removed)?;
    write!(f, "</div>\n</body>\n</html>\n")
  }
}

/// Escape text for inclusion in HTML element content.
fn escape(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(c),
    }
  }
  out
}
