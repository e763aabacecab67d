//! Placeholder substitution across a skeleton's template files
//!
//! Template files are recognized by a name suffix (`Plugin.cs.template`).
//! Each one is rendered to its sibling without the suffix (`Plugin.cs`);
//! the template itself stays on disk until cleanup.

use super::variables::TemplateVariables;
use crate::error::ProvisionError;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::WalkDir;

/// Default template file suffix
pub const TEMPLATE_MARKER: &str = ".template";

/// Directories never searched for templates
const SKIPPED_DIRS: &[&str] = &[".git", "bin", "obj", "node_modules"];

/// Result of rendering one template file
#[derive(Debug)]
pub struct FileOutcome {
    pub template: PathBuf,
    pub output: PathBuf,
    pub result: Result<RenderStats, ProvisionError>,
}

impl FileOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Counts for a successfully written file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Number of placeholders replaced
    pub replaced: usize,
    /// Placeholder names left verbatim because the map had no value
    pub unresolved: Vec<String>,
}

/// Output path for a template: the file name with `marker` removed.
///
/// Returns `None` when the name does not end in the marker or nothing would
/// remain after stripping it.
pub fn output_path(template: &Path, marker: &str) -> Option<PathBuf> {
    let name = template.file_name()?.to_str()?;
    let stripped = name.strip_suffix(marker)?;
    if stripped.is_empty() {
        return None;
    }
    Some(template.with_file_name(stripped))
}

/// Find every template file under `root`, sorted by path
pub fn discover(root: &Path, marker: &str) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !(entry.file_type().is_dir()
                    && entry
                        .file_name()
                        .to_str()
                        .is_some_and(|n| SKIPPED_DIRS.contains(&n)))
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| output_path(path, marker).is_some())
        .collect();
    found.sort();
    found
}

/// Build a literal pattern matching any mapped placeholder
fn placeholder_pattern(vars: &TemplateVariables) -> Option<Regex> {
    if vars.is_empty() {
        return None;
    }
    let alternatives: Vec<String> = vars
        .iter()
        .map(|(key, _)| regex::escape(&key.placeholder()))
        .collect();
    Regex::new(&alternatives.join("|")).ok()
}

fn unresolved_pattern() -> &'static Regex {
    static UNRESOLVED: OnceLock<Regex> = OnceLock::new();
    UNRESOLVED.get_or_init(|| Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").expect("static regex is valid"))
}

/// Replace every mapped `{{KEY}}` in `content`.
///
/// Matching is literal and case-sensitive. Replacement runs in a single pass
/// so substituted values are never re-scanned. Placeholders without a value
/// are left untouched.
pub fn substitute(content: &str, vars: &TemplateVariables) -> (String, RenderStats) {
    let mut stats = RenderStats::default();

    let rendered = match placeholder_pattern(vars) {
        Some(pattern) => pattern
            .replace_all(content, |caps: &regex::Captures<'_>| {
                stats.replaced += 1;
                let token = &caps[0];
                let name = &token[2..token.len() - 2];
                vars.get_by_name(name).unwrap_or(token).to_string()
            })
            .into_owned(),
        None => content.to_string(),
    };

    for cap in unresolved_pattern().captures_iter(content) {
        let name = cap[1].to_string();
        if vars.get_by_name(&name).is_none() && !stats.unresolved.contains(&name) {
            stats.unresolved.push(name);
        }
    }

    (rendered, stats)
}

/// Render one template file to its output path
pub fn render_file(
    template: &Path,
    output: &Path,
    vars: &TemplateVariables,
) -> Result<RenderStats, ProvisionError> {
    let failed = |source: std::io::Error| ProvisionError::SubstitutionFailed {
        path: template.to_path_buf(),
        source,
    };

    let content = std::fs::read_to_string(template).map_err(failed)?;
    let (rendered, stats) = substitute(&content, vars);
    std::fs::write(output, rendered).map_err(failed)?;
    Ok(stats)
}

/// Render every template under `root`.
///
/// A failing file is recorded in its outcome and does not stop the batch.
pub fn render_tree(root: &Path, marker: &str, vars: &TemplateVariables) -> Vec<FileOutcome> {
    discover(root, marker)
        .into_iter()
        .filter_map(|template| {
            let output = output_path(&template, marker)?;
            let result = render_file(&template, &output, vars);
            match &result {
                Ok(stats) => tracing::debug!(
                    template = %template.display(),
                    replaced = stats.replaced,
                    unresolved = ?stats.unresolved,
                    "rendered template"
                ),
                Err(e) => tracing::warn!(template = %template.display(), error = %e, "template failed"),
            }
            Some(FileOutcome {
                template,
                output,
                result,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::variables::VariableKey;
    use std::fs;

    fn valheim() -> TemplateVariables {
        TemplateVariables::new()
            .with(VariableKey::GameName, "Valheim")
            .with(VariableKey::UnityVersion, "2020.3.28")
    }

    #[test]
    fn test_substitute_scenario() {
        let (out, stats) = substitute("Game: {{GAME_NAME}}, Ver: {{UNITY_VERSION}}", &valheim());
        assert_eq!(out, "Game: Valheim, Ver: 2020.3.28");
        assert_eq!(stats.replaced, 2);
        assert!(stats.unresolved.is_empty());
    }

    #[test]
    fn test_replaces_every_occurrence_case_sensitively() {
        let (out, _) = substitute(
            "{{GAME_NAME}}/{{GAME_NAME}}/{{game_name}}/{ {GAME_NAME}}",
            &valheim(),
        );
        assert_eq!(out, "Valheim/Valheim/{{game_name}}/{ {GAME_NAME}}");
    }

    #[test]
    fn test_unresolved_placeholders_pass_through() {
        let (out, stats) = substitute("[{{AUTHOR}}] {{GAME_NAME}} {{NOT_A_KEY}}", &valheim());
        assert_eq!(out, "[{{AUTHOR}}] Valheim {{NOT_A_KEY}}");
        assert_eq!(stats.unresolved, vec!["AUTHOR", "NOT_A_KEY"]);
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let vars = TemplateVariables::new()
            .with(VariableKey::Description, "uses {{GAME_NAME}} literally")
            .with(VariableKey::GameName, "Valheim");
        let (out, _) = substitute("{{DESCRIPTION}}", &vars);
        assert_eq!(out, "uses {{GAME_NAME}} literally");
    }

    #[test]
    fn test_values_with_regex_syntax_are_literal() {
        let vars = TemplateVariables::new().with(VariableKey::GamePath, r"C:\Games\$1 (x86)\.*");
        let (out, _) = substitute("path={{GAME_PATH}}", &vars);
        assert_eq!(out, r"path=C:\Games\$1 (x86)\.*");
    }

    #[test]
    fn test_substitution_is_idempotent() {
        let template = "namespace {{NAMESPACE}};\n// {{GAME_NAME}} {{UNITY_VERSION}} {{AUTHOR}}";
        let vars = valheim().with(VariableKey::Namespace, "ValheimPlugin");
        let (once, _) = substitute(template, &vars);
        let (twice, _) = substitute(&once, &vars);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_map_leaves_content() {
        let (out, stats) = substitute("{{GAME_NAME}}", &TemplateVariables::new());
        assert_eq!(out, "{{GAME_NAME}}");
        assert_eq!(stats.replaced, 0);
        assert_eq!(stats.unresolved, vec!["GAME_NAME"]);
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("src/Plugin.cs.template"), TEMPLATE_MARKER),
            Some(PathBuf::from("src/Plugin.cs"))
        );
        assert_eq!(
            output_path(Path::new("a.template.b/README.md"), TEMPLATE_MARKER),
            None
        );
        assert_eq!(output_path(Path::new(".template"), TEMPLATE_MARKER), None);
        assert_eq!(
            output_path(Path::new("Plugin.csproj.tmpl"), ".tmpl"),
            Some(PathBuf::from("Plugin.csproj"))
        );
    }

    #[test]
    fn test_render_tree() {
        let root = tempfile::tempdir().unwrap();
        let src = root.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(root.path().join(".git")).unwrap();
        fs::write(src.join("Plugin.cs.template"), "// {{GAME_NAME}}").unwrap();
        fs::write(root.path().join("README.md.template"), "{{UNITY_VERSION}} {{AUTHOR}}").unwrap();
        fs::write(root.path().join(".git/HEAD.template"), "{{GAME_NAME}}").unwrap();
        fs::write(root.path().join("notes.txt"), "{{GAME_NAME}}").unwrap();

        let outcomes = render_tree(root.path(), TEMPLATE_MARKER, &valheim());
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(FileOutcome::is_ok));

        assert_eq!(fs::read_to_string(src.join("Plugin.cs")).unwrap(), "// Valheim");
        assert_eq!(
            fs::read_to_string(root.path().join("README.md")).unwrap(),
            "2020.3.28 {{AUTHOR}}"
        );
        // Originals stay, untouched files stay untouched
        assert!(src.join("Plugin.cs.template").exists());
        assert_eq!(fs::read_to_string(root.path().join("notes.txt")).unwrap(), "{{GAME_NAME}}");
        assert!(!root.path().join(".git/HEAD").exists());
    }

    #[test]
    fn test_failing_file_does_not_abort_batch() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("a.txt.template"), "{{GAME_NAME}}").unwrap();
        // Invalid UTF-8 cannot be read as text
        fs::write(root.path().join("b.bin.template"), [0xFF, 0xFE, 0x00]).unwrap();
        fs::write(root.path().join("c.txt.template"), "{{UNITY_VERSION}}").unwrap();

        let outcomes = render_tree(root.path(), TEMPLATE_MARKER, &valheim());
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_ok());
        assert!(matches!(
            outcomes[1].result,
            Err(ProvisionError::SubstitutionFailed { .. })
        ));
        assert!(outcomes[2].is_ok());
        assert_eq!(
            fs::read_to_string(root.path().join("c.txt")).unwrap(),
            "2020.3.28"
        );
    }
}
