use std::fs;
use std::path::{Path, PathBuf};

use crate::api::Summary;

/// Write `summary` as a markdown file into the user's download directory.
/// Returns the path written.
pub fn export_summary(summary: &Summary) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let dir = dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    export_to(&dir, summary)
}

fn export_to(dir: &Path, summary: &Summary) -> Result<PathBuf, Box<dyn std::error::Error>> {
    fs::create_dir_all(dir)?;
    let stem = file_stem(&summary.title);
    let mut path = dir.join(format!("{stem}.md"));
    let mut n = 1;
    while path.exists() {
        n += 1;
        path = dir.join(format!("{stem}-{n}.md"));
    }
    fs::write(&path, render(summary))?;
    log::info!("Exported summary to {}", path.display());
    Ok(path)
}

/// Markdown document with a metadata header above the summary body.
fn render(summary: &Summary) -> String {
    let mut doc = format!("# {}\n\n", summary.title);
    let meta = [
        ("Channel", &summary.channel),
        ("Duration", &summary.duration_string),
        ("Released", &summary.release_date),
    ];
    let mut any = false;
    for (label, value) in meta {
        if let Some(value) = value {
            doc.push_str(&format!("- **{label}:** {value}\n"));
            any = true;
        }
    }
    if any {
        doc.push('\n');
    }
    doc.push_str(summary.content.trim_end());
    doc.push('\n');
    doc
}

/// Lower-case, dash-separated file name stem from a title.
fn file_stem(title: &str) -> String {
    let mut stem = String::new();
    for c in title.chars() {
        if c.is_alphanumeric() {
            stem.extend(c.to_lowercase());
        } else if !stem.is_empty() && !stem.ends_with('-') {
            stem.push('-');
        }
    }
    let stem: String = stem.trim_end_matches('-').chars().take(80).collect();
    if stem.is_empty() {
        "podcast-summary".into()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(title: &str) -> Summary {
        Summary {
            title: title.into(),
            content: "## Key points\n\n- one\n".into(),
            thumbnail: None,
            channel: Some("The Show".into()),
            duration_string: Some("1:02:03".into()),
            release_date: None,
        }
    }

    #[test]
    fn stems_are_slugged() {
        assert_eq!(file_stem("Episode 12: The Future of AI!"), "episode-12-the-future-of-ai");
        assert_eq!(file_stem("???"), "podcast-summary");
    }

    #[test]
    fn rendered_document_has_metadata() {
        let doc = render(&summary("Ep"));
        assert!(doc.starts_with("# Ep\n\n- **Channel:** The Show\n- **Duration:** 1:02:03\n\n## Key points"));
        assert!(!doc.contains("Released"));
    }

    #[test]
    fn existing_files_are_not_overwritten() {
        let dir = std::env::temp_dir().join(format!("podcast-summarizer-export-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let first = export_to(&dir, &summary("Same Title")).unwrap();
        let second = export_to(&dir, &summary("Same Title")).unwrap();

        let name = |p: &PathBuf| p.file_name().and_then(|n| n.to_str()).map(str::to_string);
        assert_eq!(name(&first).as_deref(), Some("same-title.md"));
        assert_eq!(name(&second).as_deref(), Some("same-title-2.md"));
        assert!(fs::read_to_string(&second).unwrap().contains("## Key points"));

        let _ = fs::remove_dir_all(&dir);
    }
}
