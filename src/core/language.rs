use std::path::Path;

pub const DEFAULT_LANGUAGE: &str = "text";

const EXTENSION_LANGUAGES: &[(&str, &str)] = &[
    (".py", "python"),
    (".pyw", "python"),
    (".pyi", "python"),
    (".js", "javascript"),
    (".jsx", "javascript"),
    (".mjs", "javascript"),
    (".cjs", "javascript"),
    (".ts", "typescript"),
    (".tsx", "typescript"),
    (".html", "html"),
    (".htm", "html"),
    (".css", "css"),
    (".scss", "scss"),
    (".sass", "sass"),
    (".java", "java"),
    (".c", "c"),
    (".h", "c"),
    (".cpp", "cpp"),
    (".cc", "cpp"),
    (".hpp", "cpp"),
    (".go", "go"),
    (".rs", "rust"),
    (".rb", "ruby"),
    (".php", "php"),
    (".swift", "swift"),
    (".kt", "kotlin"),
    (".sh", "bash"),
    (".md", "markdown"),
    (".json", "json"),
    (".xml", "xml"),
    (".yml", "yaml"),
    (".yaml", "yaml"),
    (".toml", "toml"),
    (".sql", "sql"),
    (".r", "r"),
    (".dart", "dart"),
];

/// Maps a lower-cased, dot-prefixed extension to its language tag.
pub fn language_for_extension(ext: &str) -> &'static str {
    EXTENSION_LANGUAGES
        .iter()
        .find(|(candidate, _)| *candidate == ext)
        .map(|(_, language)| *language)
        .unwrap_or(DEFAULT_LANGUAGE)
}

/// Lower-cased extension of `path` including the leading dot, or an empty
/// string. Dotfiles such as `.gitignore` have no extension.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_known_extensions() {
        assert_eq!(language_for_extension(".py"), "python");
        assert_eq!(language_for_extension(".tsx"), "typescript");
        assert_eq!(language_for_extension(".md"), "markdown");
        assert_eq!(language_for_extension(".h"), "c");
    }

    #[test]
    fn test_unknown_extension_is_text() {
        assert_eq!(language_for_extension(".zzz"), "text");
        assert_eq!(language_for_extension(""), "text");
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(&PathBuf::from("src/Main.JAVA")), ".java");
        assert_eq!(extension_of(&PathBuf::from(".gitignore")), "");
        assert_eq!(extension_of(&PathBuf::from("Makefile")), "");
        assert_eq!(extension_of(&PathBuf::from("archive.tar.gz")), ".gz");
    }
}
