//! Database log file tools

use serde_json::{json, Value};

use super::{opt_str, opt_u64, required_str, ServerContext};
use crate::connection::RDS_SERVICE;
use crate::error::{Error, Result};
use crate::pagination::fetch_all;
use crate::records::LogFileEntry;

pub(super) async fn list_log_files(ctx: &ServerContext, args: &Value) -> Result<Value> {
    let identifier = required_str(args, "db_instance_identifier")?;

    let mut params = json!({"DBInstanceIdentifier": identifier});
    if let Some(contains) = opt_str(args, "filename_contains") {
        params["FilenameContains"] = contains.into();
    }

    let client = ctx.connections.get(RDS_SERVICE).await?;
    let files = fetch_all(
        client.as_ref(),
        "DescribeDBLogFiles",
        params,
        "DescribeDBLogFiles",
        LogFileEntry::from_api,
    )
    .await?;
    Ok(json!({"count": files.len(), "log_files": files}))
}

pub(super) async fn read_log_file(ctx: &ServerContext, args: &Value) -> Result<Value> {
    let identifier = required_str(args, "db_instance_identifier")?;
    let log_file_name = required_str(args, "log_file_name")?;
    let marker = opt_str(args, "marker").unwrap_or("0");
    let number_of_lines = opt_u64(args, "number_of_lines").unwrap_or(100);
    if number_of_lines == 0 || number_of_lines >= 10_000 {
        return Err(Error::InvalidParameter(
            "number_of_lines must be between 1 and 9999".to_string(),
        ));
    }

    let params = json!({
        "DBInstanceIdentifier": identifier,
        "LogFileName": log_file_name,
        "Marker": marker,
        "NumberOfLines": number_of_lines,
    });

    let client = ctx.connections.get(RDS_SERVICE).await?;
    let response = client.call("DownloadDBLogFilePortion", &params).await?;

    let content = response
        .get("LogFileData")
        .and_then(Value::as_str)
        .unwrap_or("");
    Ok(json!({
        "log_content": filter_log_content(content, opt_str(args, "pattern")),
        "next_marker": response.get("Marker").and_then(Value::as_str),
        "additional_data_pending": response
            .get("AdditionalDataPending")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }))
}

/// Keep only lines containing the pattern, when one is given
fn filter_log_content(content: &str, pattern: Option<&str>) -> String {
    match pattern {
        Some(pattern) if !pattern.is_empty() && !content.is_empty() => content
            .lines()
            .filter(|line| line.contains(pattern))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pattern_keeps_matching_lines_only() {
        let content = "ERROR: disk full\nLOG: checkpoint\nERROR: timeout";
        assert_eq!(
            filter_log_content(content, Some("ERROR")),
            "ERROR: disk full\nERROR: timeout"
        );
    }

    #[test]
    fn no_pattern_returns_content_unchanged() {
        let content = "LOG: ready\nLOG: listening";
        assert_eq!(filter_log_content(content, None), content);
        assert_eq!(filter_log_content(content, Some("")), content);
    }

    #[test]
    fn empty_content_stays_empty() {
        assert_eq!(filter_log_content("", Some("ERROR")), "");
    }
}
