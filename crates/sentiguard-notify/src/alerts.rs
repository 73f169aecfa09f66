//! Alert message formatting

use crate::mailer::OutboundEmail;
use sentiguard_core::{Comment, LinkedChild, Parent};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Excerpt length for summary listings
const EXCERPT_CHARS: usize = 50;

/// Examples shown per handle in a summary before the overflow count
const EXAMPLES_PER_HANDLE: usize = 3;

/// One toxic detection carried into a summary alert
#[derive(Debug, Clone)]
pub struct ToxicFinding {
    /// Handle of the monitored child account
    pub handle: String,
    pub comment: Comment,
}

/// Single-detection alert: subject, salutation, comment details, dashboard link
pub fn toxic_comment_alert(
    comment: &Comment,
    child: &LinkedChild,
    parent: &Parent,
    dashboard_url: &str,
) -> OutboundEmail {
    let detected_at = comment.stored_at.format("%B %d, %Y at %H:%M UTC");
    let child_link = format!("{}/child/{}", dashboard_url.trim_end_matches('/'), child.id);

    let text_body = format!(
        "TOXIC COMMENT ALERT\n\
         \n\
         Dear {salutation},\n\
         \n\
         We detected a potentially toxic comment on the monitored account @{handle}.\n\
         \n\
         Comment details:\n\
         - Comment by: @{commenter}\n\
         - Detected: {detected_at}\n\
         - Comment: \"{text}\"\n\
         \n\
         Recommended actions:\n\
         - Review the comment with your child\n\
         - Discuss appropriate online behavior\n\
         - Consider reporting the comment to the platform\n\
         \n\
         View the dashboard: {child_link}\n\
         \n\
         This is an automated alert from SentiGuard.\n",
        salutation = parent.salutation(),
        handle = child.handle,
        commenter = comment.username,
        text = comment.text,
    );

    let html_body = format!(
        "<html><body style=\"font-family: sans-serif; color: #333;\">\
         <h2 style=\"color: #dc2626;\">Toxic comment alert</h2>\
         <p>Dear {salutation},</p>\
         <p>We detected a potentially toxic comment on the monitored account \
         <strong>@{handle}</strong>.</p>\
         <div style=\"border: 1px solid #fecaca; border-radius: 8px; padding: 15px;\">\
         <p><strong>Comment by:</strong> @{commenter}</p>\
         <p><strong>Detected:</strong> {detected_at}</p>\
         <blockquote>{text}</blockquote>\
         </div>\
         <p><a href=\"{child_link}\">View the dashboard</a></p>\
         <p style=\"font-size: 12px; color: #6b7280;\">\
         This is an automated alert from SentiGuard.</p>\
         </body></html>",
        salutation = html_escape(parent.salutation()),
        handle = html_escape(&child.handle),
        commenter = html_escape(&comment.username),
        text = html_escape(&comment.text),
    );

    OutboundEmail {
        to: parent.email.clone(),
        subject: format!("Toxic comment alert - @{}", child.handle),
        text_body,
        html_body: Some(html_body),
    }
}

/// Batched summary: groups findings per handle, shows a few excerpts each
pub fn summary_alert(
    parent: &Parent,
    findings: &[ToxicFinding],
    dashboard_url: &str,
) -> OutboundEmail {
    let mut by_handle: BTreeMap<&str, Vec<&ToxicFinding>> = BTreeMap::new();
    for finding in findings {
        by_handle.entry(&finding.handle).or_default().push(finding);
    }

    let mut summary = String::new();
    for (handle, group) in &by_handle {
        let _ = writeln!(
            summary,
            "\nAccount @{handle} ({count} toxic comments)",
            count = group.len()
        );
        for finding in group.iter().take(EXAMPLES_PER_HANDLE) {
            let _ = writeln!(
                summary,
                "  - @{username}: \"{excerpt}\"",
                username = finding.comment.username,
                excerpt = excerpt(&finding.comment.text),
            );
        }
        if group.len() > EXAMPLES_PER_HANDLE {
            let _ = writeln!(
                summary,
                "  ... and {more} more",
                more = group.len() - EXAMPLES_PER_HANDLE
            );
        }
    }

    let text_body = format!(
        "MULTIPLE TOXIC COMMENTS DETECTED\n\
         \n\
         Dear {salutation},\n\
         \n\
         We detected {total} toxic comments across your monitored accounts.\n\
         {summary}\n\
         View the dashboard: {dashboard_url}\n\
         \n\
         This is an automated alert from SentiGuard.\n",
        salutation = parent.salutation(),
        total = findings.len(),
    );

    OutboundEmail {
        to: parent.email.clone(),
        subject: format!("{} toxic comments detected", findings.len()),
        text_body,
        html_body: None,
    }
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= EXCERPT_CHARS {
        text.to_string()
    } else {
        let cut: String = text.chars().take(EXCERPT_CHARS).collect();
        format!("{cut}...")
    }
}

fn html_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
