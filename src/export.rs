//! Rendering content records for download or printing.

use std::fmt::Write;

use crate::{ContentRecord, Result};

pub const CSV_HEADER: [&str; 8] = [
    "Title",
    "Department",
    "District",
    "Block",
    "Content Type",
    "Upload Date",
    "Tags",
    "Source",
];

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// One line per record, every field quoted.
pub fn to_csv(records: &[ContentRecord]) -> String {
    let mut lines = vec![CSV_HEADER.join(",")];
    for record in records {
        let tags = record.tag_types().collect::<Vec<_>>().join("; ");
        let content_type = record.content_type.map(|t| t.to_string()).unwrap_or_default();
        let source = record.source().to_string();
        let row: [&str; 8] = [
            &record.name,
            &record.department,
            &record.district,
            &record.block,
            &content_type,
            &record.upload_date,
            &tags,
            &source,
        ];
        lines.push(row.iter().map(|f| csv_field(f)).collect::<Vec<_>>().join(","));
    }
    lines.join("\n")
}

pub fn to_json(records: &[ContentRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

pub fn escape_html(text: &str) -> String {
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

fn or_na(value: &str) -> &str {
    if value.trim().is_empty() {
        "N/A"
    } else {
        value
    }
}

/// A standalone printable HTML page for one record.
pub fn print_preview(record: &ContentRecord) -> String {
    let title = escape_html(if record.name.trim().is_empty() { "Untitled" } else { record.name.as_str() });
    let content_type = record.content_type.map(|t| t.to_string()).unwrap_or_default();

    let mut html = String::new();
    let _ = writeln!(html, "<html>\n<head>\n<title>{title}</title>");
    html.push_str(
        "<style>\nbody { font-family: Arial, sans-serif; padding: 20px; }\nh1 { color: #333; }\n\
         .detail { margin: 10px 0; }\n.label { font-weight: bold; }\n</style>\n</head>\n<body>\n",
    );
    let _ = writeln!(html, "<h1>{title}</h1>");
    for (label, value) in [
        ("Department", record.department.as_str()),
        ("District", record.district.as_str()),
        ("Block", record.block.as_str()),
        ("Content Type", content_type.as_str()),
        ("Upload Date", record.upload_date.as_str()),
    ] {
        let _ = writeln!(
            html,
            "<div class=\"detail\"><span class=\"label\">{label}:</span> {}</div>",
            escape_html(or_na(value))
        );
    }

    if !record.tags.is_empty() {
        html.push_str("<div class=\"detail\">\n<span class=\"label\">Tags:</span>\n<ul>");
        for tag in &record.tags {
            let _ = write!(
                html,
                "<li>{} ({} - {})</li>",
                escape_html(&tag.tag_type),
                escape_html(&tag.start_time),
                escape_html(&tag.end_time)
            );
        }
        html.push_str("</ul>\n</div>\n");
    }
    if !record.remarks.trim().is_empty() {
        let _ = writeln!(
            html,
            "<div class=\"detail\"><span class=\"label\">Remarks:</span> {}</div>",
            escape_html(&record.remarks)
        );
    }
    html.push_str("</body>\n</html>\n");
    html
}
