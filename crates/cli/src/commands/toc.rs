use agentsite_generator::{ArticleView, split_front_matter};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Print the h2/h3 outline of a markdown article, or its rendered HTML
pub fn run(file: &Path, html: bool) -> Result<()> {
    let content =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let body = split_front_matter(&content).map_or(content.as_str(), |(_, body)| body);

    let view = ArticleView::render(body);
    if html {
        print!("{}", view.html);
        return Ok(());
    }

    if view.toc.is_empty() {
        println!("No h2/h3 headings in {}", file.display());
        return Ok(());
    }
    for item in &view.toc {
        let indent = if item.level == 3 { "    " } else { "" };
        println!("{}- [{}](#{})", indent, item.text, item.id);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reads_article_with_front_matter() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("post.md");
        fs::write(&file, "+++\ntitle = \"T\"\n+++\n\n## One\n### Two\n").unwrap();
        assert!(run(&file, false).is_ok());
        assert!(run(&file, true).is_ok());
    }

    #[test]
    fn test_missing_file_errors() {
        let err = run(Path::new("/nonexistent/post.md"), false).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
