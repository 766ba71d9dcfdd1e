use std::path::Path;

use colored::Colorize;
use thiserror::Error;
use tracing::debug;

use crate::engine::{ItemResult, LinkResult, ReferenceStatus, ResolvedReference};
use crate::tracker::WorkItem;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    FileWrite(#[from] std::io::Error),
}

/// Render the result forest to the terminal (default) or to a markdown file.
pub fn output(
    results: &[ItemResult],
    tracker_url: &str,
    downstream_org: &str,
    output_path: Option<&Path>,
) -> Result<(), ReportError> {
    match output_path {
        None => {
            debug!("writing report to terminal");
            print_terminal_report(results, tracker_url, downstream_org);
            Ok(())
        }
        Some(path) => {
            debug!(path = %path.display(), "writing report to file");
            write_markdown_report(results, tracker_url, downstream_org, path)
        }
    }
}

fn print_terminal_report(results: &[ItemResult], tracker_url: &str, downstream_org: &str) {
    for result in results {
        print_item_result(result, tracker_url, downstream_org, "");
    }
}

fn print_item_result(
    result: &ItemResult,
    tracker_url: &str,
    downstream_org: &str,
    indent: &str,
) {
    println!();
    println!("{}{}", indent, item_title_line(&result.item, tracker_url));
    if result.links.is_empty() {
        println!("{}  no github links found", indent);
    } else {
        print_link_results(&result.links, downstream_org, &format!("{}  ", indent));
    }
    for child in &result.children {
        print_item_result(child, tracker_url, downstream_org, &format!("{}  ", indent));
    }
}

fn print_link_results(links: &[LinkResult], downstream_org: &str, indent: &str) {
    for link in links {
        if link.reference.link.org == downstream_org {
            println!("{}downstream {}", indent, describe_reference(&link.reference));
            continue;
        }

        println!("{}upstream {}", indent, describe_reference(&link.reference));

        if link.reference.status == ReferenceStatus::Closed {
            // Closed without merging; no downstream search was attempted.
            continue;
        }
        if link.downstream.is_empty() {
            println!(
                "{}  downstream: no matching pull requests found in {}/{}",
                indent, downstream_org, link.reference.link.repo
            );
            continue;
        }
        print_link_results(&link.downstream, downstream_org, &format!("{}  ", indent));
    }
}

/// `on <base> <status>: <url> "<title>"`
fn describe_reference(reference: &ResolvedReference) -> String {
    format!(
        "on {} {}: {} \"{}\"",
        reference.base_branch,
        colorize_status(reference.status),
        reference.link.url,
        reference.title
    )
}

/// `Epic (In Progress) https://tracker/browse/KEY "summary"`
fn item_title_line(item: &WorkItem, tracker_url: &str) -> String {
    format!(
        "{} ({}) {}/browse/{} \"{}\"",
        item.item_type, item.status, tracker_url, item.key, item.summary
    )
}

/// Display label for a status; the open sentinel is upper-cased here and
/// nowhere else.
fn status_label(status: ReferenceStatus) -> &'static str {
    match status {
        ReferenceStatus::Open => "OPEN",
        ReferenceStatus::Merged => "merged",
        ReferenceStatus::Closed => "closed",
    }
}

fn colorize_status(status: ReferenceStatus) -> colored::ColoredString {
    match status {
        ReferenceStatus::Open => status_label(status).green().bold(),
        ReferenceStatus::Merged => status_label(status).magenta().bold(),
        ReferenceStatus::Closed => status_label(status).red().bold(),
    }
}

fn write_markdown_report(
    results: &[ItemResult],
    tracker_url: &str,
    downstream_org: &str,
    path: &Path,
) -> Result<(), ReportError> {
    let mut md = String::new();
    for result in results {
        render_item_markdown(&mut md, result, tracker_url, downstream_org, 0);
        md.push('\n');
    }
    std::fs::write(path, md)?;
    Ok(())
}

fn render_item_markdown(
    md: &mut String,
    result: &ItemResult,
    tracker_url: &str,
    downstream_org: &str,
    depth: usize,
) {
    let indent = "  ".repeat(depth);
    md.push_str(&format!(
        "{}- **{}** ({}) [{}]({}/browse/{}) \"{}\"\n",
        indent,
        result.item.item_type,
        result.item.status,
        result.item.key,
        tracker_url,
        result.item.key,
        result.item.summary
    ));
    if result.links.is_empty() {
        md.push_str(&format!("{}  - no github links found\n", indent));
    } else {
        render_links_markdown(md, &result.links, downstream_org, depth + 1);
    }
    for child in &result.children {
        render_item_markdown(md, child, tracker_url, downstream_org, depth + 1);
    }
}

fn render_links_markdown(
    md: &mut String,
    links: &[LinkResult],
    downstream_org: &str,
    depth: usize,
) {
    let indent = "  ".repeat(depth);
    for link in links {
        let downstream_side = link.reference.link.org == downstream_org;
        let side = if downstream_side { "downstream" } else { "upstream" };
        md.push_str(&format!(
            "{}- {} on {} **{}**: <{}> \"{}\"\n",
            indent,
            side,
            link.reference.base_branch,
            status_label(link.reference.status),
            link.reference.link.url,
            link.reference.title
        ));

        if downstream_side || link.reference.status == ReferenceStatus::Closed {
            continue;
        }
        if link.downstream.is_empty() {
            md.push_str(&format!(
                "{}  - downstream: no matching pull requests found in {}/{}\n",
                indent, downstream_org, link.reference.link.repo
            ));
            continue;
        }
        render_links_markdown(md, &link.downstream, downstream_org, depth + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::ReferenceLink;
    use crate::tracker::ItemType;

    fn sample_reference(org: &str, number: u64, status: ReferenceStatus) -> ResolvedReference {
        let url = format!("https://github.com/{}/repo1/pull/{}", org, number);
        ResolvedReference {
            link: ReferenceLink::parse(&url).unwrap(),
            status,
            title: "Fix the thing".to_string(),
            base_branch: "main".to_string(),
        }
    }

    fn sample_item(key: &str, links: Vec<LinkResult>, children: Vec<ItemResult>) -> ItemResult {
        ItemResult {
            item: WorkItem {
                key: key.to_string(),
                item_type: ItemType::Epic,
                status: "In Progress".to_string(),
                summary: "Rebase work".to_string(),
                description: String::new(),
                comments: vec![],
                subtask_keys: vec![],
            },
            links,
            children,
        }
    }

    #[test]
    fn test_item_title_line() {
        let result = sample_item("EPIC-1", vec![], vec![]);
        assert_eq!(
            item_title_line(&result.item, "https://issues.example.com"),
            "Epic (In Progress) https://issues.example.com/browse/EPIC-1 \"Rebase work\""
        );
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(status_label(ReferenceStatus::Open), "OPEN");
        assert_eq!(status_label(ReferenceStatus::Merged), "merged");
        assert_eq!(status_label(ReferenceStatus::Closed), "closed");
    }

    #[test]
    fn test_describe_reference_contains_url_and_title() {
        let described = describe_reference(&sample_reference("up", 5, ReferenceStatus::Open));
        assert!(described.starts_with("on main "));
        assert!(described.contains("https://github.com/up/repo1/pull/5"));
        assert!(described.contains("\"Fix the thing\""));
    }

    #[test]
    fn test_write_markdown_report() {
        let upstream = LinkResult {
            reference: sample_reference("up", 5, ReferenceStatus::Open),
            downstream: vec![LinkResult {
                reference: sample_reference("down", 9, ReferenceStatus::Merged),
                downstream: vec![],
            }],
        };
        let unported = LinkResult {
            reference: sample_reference("up", 7, ReferenceStatus::Merged),
            downstream: vec![],
        };
        let results = vec![sample_item("EPIC-1", vec![upstream, unported], vec![])];

        let path = std::env::temp_dir().join("backport_tracker_test_report.md");
        write_markdown_report(&results, "https://issues.example.com", "down", &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[EPIC-1](https://issues.example.com/browse/EPIC-1)"));
        assert!(content.contains("upstream on main **OPEN**"));
        assert!(content.contains("downstream on main **merged**"));
        assert!(content.contains("no matching pull requests found in down/repo1"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_markdown_closed_upstream_has_no_downstream_line() {
        let closed = LinkResult {
            reference: sample_reference("up", 5, ReferenceStatus::Closed),
            downstream: vec![],
        };
        let results = vec![sample_item("EPIC-1", vec![closed], vec![])];

        let path = std::env::temp_dir().join("backport_tracker_test_closed.md");
        write_markdown_report(&results, "https://issues.example.com", "down", &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("**closed**"));
        assert!(!content.contains("no matching pull requests"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_markdown_item_without_links() {
        let child = sample_item("TASK-2", vec![], vec![]);
        let results = vec![sample_item("EPIC-1", vec![], vec![child])];

        let path = std::env::temp_dir().join("backport_tracker_test_empty.md");
        write_markdown_report(&results, "https://issues.example.com", "down", &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("no github links found"));
        assert!(content.contains("[TASK-2]"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_terminal_report_does_not_panic() {
        let upstream = LinkResult {
            reference: sample_reference("up", 5, ReferenceStatus::Open),
            downstream: vec![],
        };
        let results = vec![sample_item("EPIC-1", vec![upstream], vec![])];
        print_terminal_report(&results, "https://issues.example.com", "down");
    }

    #[test]
    fn test_output_to_file() {
        let path = std::env::temp_dir().join("backport_tracker_test_output.md");
        output(&[], "https://issues.example.com", "down", Some(&path)).unwrap();
        assert!(path.exists());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_output_to_terminal() {
        output(&[], "https://issues.example.com", "down", None).unwrap();
    }
}
