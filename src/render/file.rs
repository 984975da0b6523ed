use std::path::Path;

/// Reserved names template authors use so packaging tools keep these files.
pub const FILENAME_ALIASES: &[(&str, &str)] = &[
    ("_gitignore", ".gitignore"),
    ("_npmrc", ".npmrc"),
    ("_package.json", "package.json"),
];

/// Map an alias base name to the real file name.
pub fn resolve_alias(file_name: &str) -> &str {
    FILENAME_ALIASES
        .iter()
        .find(|(alias, _)| *alias == file_name)
        .map(|(_, real)| *real)
        .unwrap_or(file_name)
}

const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "icns", "webp", "avif", "tif", "tiff", "psd",
    "pdf", "zip", "gz", "tgz", "bz2", "xz", "7z", "rar", "tar", "jar", "war", "class", "exe",
    "dll", "so", "dylib", "o", "a", "wasm", "woff", "woff2", "ttf", "otf", "eot", "mp3", "mp4",
    "wav", "ogg", "webm", "mov", "avi", "flac", "sqlite", "db", "bin",
];

const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "json", "jsonc", "json5", "js", "cjs", "mjs", "jsx", "ts", "cts",
    "mts", "tsx", "vue", "svelte", "astro", "html", "htm", "css", "scss", "sass", "less", "svg",
    "xml", "yml", "yaml", "toml", "ini", "cfg", "conf", "env", "sh", "bash", "zsh", "ps1", "bat",
    "cmd", "py", "rb", "rs", "go", "java", "kt", "swift", "c", "h", "cpp", "hpp", "cs", "php",
    "sql", "graphql", "gql", "lock", "csv", "tsv", "editorconfig", "gitignore", "npmrc",
    "prettierrc", "eslintrc", "babelrc", "nvmrc",
];

/// Bytes sniffed when the extension is not conclusive.
const SNIFF_LEN: usize = 8192;

/// Classify a file as binary from its name first, then from its leading
/// bytes (BOM-aware, NUL-byte scanning).
pub fn is_binary(path: &Path, content: &[u8]) -> bool {
    if let Some(ext) = extension_of(path) {
        if BINARY_EXTENSIONS.contains(&ext.as_str()) {
            return true;
        }
        if TEXT_EXTENSIONS.contains(&ext.as_str()) {
            return false;
        }
    }

    let sniff = &content[..content.len().min(SNIFF_LEN)];
    !content_inspector::inspect(sniff).is_text()
}

/// Lowercased extension; dotfiles like `.gitignore` use the name itself.
fn extension_of(path: &Path) -> Option<String> {
    if let Some(ext) = path.extension() {
        return Some(ext.to_string_lossy().to_ascii_lowercase());
    }
    let name = path.file_name()?.to_string_lossy();
    name.strip_prefix('.').map(str::to_ascii_lowercase)
}
