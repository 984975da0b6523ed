use std::path::{Component, Path, PathBuf};

use console::style;
use walkdir::WalkDir;

use crate::error::{Result, SproutError};
use crate::prompt::Locals;
use crate::render::file::{is_binary, resolve_alias};
use crate::render::placeholder::substitute;

/// Subdirectory of a template package holding the files to instantiate.
pub const PAYLOAD_DIR: &str = "boilerplate";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    /// Devices, sockets, FIFOs and anything else that cannot be copied.
    Other,
}

/// One item of the payload tree, relative to the payload root.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub relative_path: PathBuf,
    pub kind: EntryKind,
}

/// What an instantiation wrote, in walk order.
#[derive(Debug, Default)]
pub struct Instantiated {
    pub output_dir: PathBuf,
    /// Source paths (relative to the payload) that were handled.
    pub processed: Vec<PathBuf>,
    /// Destination paths of files that went through substitution.
    pub files_rendered: Vec<PathBuf>,
    /// Destination paths of files copied byte for byte.
    pub files_copied: Vec<PathBuf>,
    pub links: Vec<PathBuf>,
    pub directories: Vec<PathBuf>,
    /// Source paths of entries with an unsupported kind.
    pub skipped: Vec<PathBuf>,
}

/// List every entry below `payload`, dotfiles included. Symbolic links are
/// leaves and never followed.
pub fn enumerate(payload: &Path) -> Result<Vec<FileEntry>> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(payload)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| SproutError::Io {
            context: format!("walking {}", payload.display()),
            source: e.into(),
        })?;

        let relative_path = entry
            .path()
            .strip_prefix(payload)
            .map(Path::to_path_buf)
            .map_err(|_| SproutError::Io {
                context: format!("{} is outside {}", entry.path().display(), payload.display()),
                source: std::io::Error::from(std::io::ErrorKind::InvalidInput),
            })?;

        let file_type = entry.file_type();
        let kind = if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };

        entries.push(FileEntry {
            relative_path,
            kind,
        });
    }

    Ok(entries)
}

/// Where a payload entry lands in the target, relative to the target root.
///
/// Every component is substituted, and components that render empty
/// collapse into their parent. The base name of a file or link is first
/// resolved through the alias table. A directory that renders to nothing
/// maps to the target root itself.
pub fn destination_path(
    relative_path: &Path,
    kind: EntryKind,
    locals: &Locals,
) -> Result<PathBuf> {
    let mut rendered = PathBuf::new();
    let mut components = relative_path.components().peekable();

    while let Some(component) = components.next() {
        let part = component.as_os_str().to_string_lossy();
        let is_base_name = components.peek().is_none();
        let part = if is_base_name && kind != EntryKind::Directory {
            resolve_alias(&part).to_string()
        } else {
            part.into_owned()
        };
        let part = substitute(&part, locals);
        if !part.is_empty() {
            rendered.push(&*part);
        }
    }

    let escapes = rendered
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(SproutError::UnsafePath {
            path: relative_path.to_path_buf(),
            rendered,
        });
    }

    if rendered.as_os_str().is_empty() && kind != EntryKind::Directory {
        return Err(SproutError::Io {
            context: format!("file name of {} renders empty", relative_path.display()),
            source: std::io::Error::from(std::io::ErrorKind::InvalidInput),
        });
    }

    Ok(rendered)
}

/// Copy the payload tree into `output_dir`, substituting placeholders in
/// text files and file names.
pub fn instantiate(payload: &Path, output_dir: &Path, locals: &Locals) -> Result<Instantiated> {
    if !payload.is_dir() {
        return Err(SproutError::PayloadMissing {
            path: payload.to_path_buf(),
        });
    }

    let mut result = Instantiated {
        output_dir: output_dir.to_path_buf(),
        ..Default::default()
    };

    for entry in enumerate(payload)? {
        let src_path = payload.join(&entry.relative_path);

        match entry.kind {
            EntryKind::Other => {
                eprintln!(
                    "{} skipping unsupported file type: {}",
                    style("notice:").dim(),
                    entry.relative_path.display()
                );
                result.skipped.push(entry.relative_path);
                continue;
            }
            EntryKind::Symlink => {
                let rel_dest = destination_path(&entry.relative_path, entry.kind, locals)?;
                let dest_path = output_dir.join(&rel_dest);
                ensure_parent(&dest_path)?;
                copy_symlink(&src_path, &dest_path)?;
                result.links.push(rel_dest);
            }
            EntryKind::Directory => {
                let rel_dest = destination_path(&entry.relative_path, entry.kind, locals)?;
                create_dir(&output_dir.join(&rel_dest))?;
                if !rel_dest.as_os_str().is_empty() {
                    result.directories.push(rel_dest);
                }
            }
            EntryKind::File => {
                let rel_dest = destination_path(&entry.relative_path, entry.kind, locals)?;
                let dest_path = output_dir.join(&rel_dest);
                ensure_parent(&dest_path)?;
                if write_file(&src_path, &dest_path, locals)? {
                    result.files_rendered.push(rel_dest);
                } else {
                    result.files_copied.push(rel_dest);
                }
            }
        }

        result.processed.push(entry.relative_path);
    }

    Ok(result)
}

fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| SproutError::Io {
        context: format!("creating directory {}", path.display()),
        source: e,
    })
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) => create_dir(parent),
        None => Ok(()),
    }
}

/// Write one regular file, returning whether it was substituted.
fn write_file(src_path: &Path, dest_path: &Path, locals: &Locals) -> Result<bool> {
    let content = std::fs::read(src_path).map_err(|e| SproutError::Io {
        context: format!("reading {}", src_path.display()),
        source: e,
    })?;

    let rendered = if is_binary(src_path, &content) {
        None
    } else {
        std::str::from_utf8(&content)
            .ok()
            .map(|text| substitute(text, locals).into_owned())
    };

    // Never write through a link left behind in the target.
    remove_link(dest_path)?;

    let bytes = rendered.as_deref().map(str::as_bytes).unwrap_or(&content);
    std::fs::write(dest_path, bytes).map_err(|e| SproutError::Io {
        context: format!("writing {}", dest_path.display()),
        source: e,
    })?;

    copy_permissions(src_path, dest_path)?;

    Ok(rendered.is_some())
}

fn copy_permissions(src_path: &Path, dest_path: &Path) -> Result<()> {
    let permissions = std::fs::metadata(src_path)
        .map_err(|e| SproutError::Io {
            context: format!("reading metadata of {}", src_path.display()),
            source: e,
        })?
        .permissions();
    std::fs::set_permissions(dest_path, permissions).map_err(|e| SproutError::Io {
        context: format!("setting permissions on {}", dest_path.display()),
        source: e,
    })
}

fn remove_link(path: &Path) -> Result<()> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            std::fs::remove_file(path).map_err(|e| SproutError::Io {
                context: format!("removing existing link {}", path.display()),
                source: e,
            })
        }
        _ => Ok(()),
    }
}

/// Recreate `src_path`'s link at `dest_path` with the same target.
fn copy_symlink(src_path: &Path, dest_path: &Path) -> Result<()> {
    let link_target = std::fs::read_link(src_path).map_err(|e| SproutError::Io {
        context: format!("reading link {}", src_path.display()),
        source: e,
    })?;

    if let Ok(meta) = std::fs::symlink_metadata(dest_path) {
        if meta.is_dir() {
            return Err(SproutError::Io {
                context: format!("cannot replace directory {} with a link", dest_path.display()),
                source: std::io::Error::from(std::io::ErrorKind::AlreadyExists),
            });
        }
        std::fs::remove_file(dest_path).map_err(|e| SproutError::Io {
            context: format!("removing existing {}", dest_path.display()),
            source: e,
        })?;
    }

    create_symlink(&link_target, src_path, dest_path).map_err(|e| SproutError::Io {
        context: format!("creating link {}", dest_path.display()),
        source: e,
    })
}

#[cfg(unix)]
fn create_symlink(link_target: &Path, _src_path: &Path, dest_path: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(link_target, dest_path)
}

#[cfg(windows)]
fn create_symlink(link_target: &Path, src_path: &Path, dest_path: &Path) -> std::io::Result<()> {
    if std::fs::metadata(src_path).map(|m| m.is_dir()).unwrap_or(false) {
        std::os::windows::fs::symlink_dir(link_target, dest_path)
    } else {
        std::os::windows::fs::symlink_file(link_target, dest_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn locals() -> Locals {
        let mut locals = Locals::new();
        locals.insert("name".into(), json!("World"));
        locals.insert("pkg".into(), json!("my-lib"));
        locals
    }

    #[test]
    fn destination_substitutes_every_component() {
        let dest = destination_path(
            Path::new("{{ pkg }}/src/{{pkg}}.ts"),
            EntryKind::File,
            &locals(),
        )
        .unwrap();
        assert_eq!(dest, PathBuf::from("my-lib/src/my-lib.ts"));
    }

    #[test]
    fn destination_aliases_only_the_base_name() {
        let dest = destination_path(Path::new("_gitignore/_gitignore"), EntryKind::File, &locals())
            .unwrap();
        assert_eq!(dest, PathBuf::from("_gitignore/.gitignore"));

        let dir = destination_path(Path::new("_npmrc"), EntryKind::Directory, &locals()).unwrap();
        assert_eq!(dir, PathBuf::from("_npmrc"));
    }

    #[test]
    fn destination_rejects_escaping_values() {
        let mut locals = locals();
        locals.insert("evil".into(), json!(".."));
        let err =
            destination_path(Path::new("{{ evil }}/x.txt"), EntryKind::File, &locals).unwrap_err();
        assert!(matches!(err, SproutError::UnsafePath { .. }));
    }

    #[test]
    fn enumerate_includes_dotfiles_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join(".env"), "A=1").unwrap();
        fs::write(dir.path().join("src/index.js"), "x").unwrap();

        let entries = enumerate(dir.path()).unwrap();
        let paths: Vec<_> = entries.iter().map(|e| e.relative_path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from(".env"),
                PathBuf::from("src"),
                PathBuf::from("src/index.js")
            ]
        );
        assert_eq!(entries[1].kind, EntryKind::Directory);
    }

    #[test]
    fn missing_payload_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = instantiate(&dir.path().join("nope"), dir.path(), &locals()).unwrap_err();
        assert!(matches!(err, SproutError::PayloadMissing { .. }));
    }

    #[test]
    fn invalid_utf8_text_is_copied_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let payload = dir.path().join("payload");
        let out = dir.path().join("out");
        fs::create_dir_all(&payload).unwrap();
        let bytes = b"caf\xe9 {{ name }}".to_vec();
        fs::write(payload.join("latin1.txt"), &bytes).unwrap();

        let result = instantiate(&payload, &out, &locals()).unwrap();
        assert_eq!(fs::read(out.join("latin1.txt")).unwrap(), bytes);
        assert_eq!(result.files_copied, vec![PathBuf::from("latin1.txt")]);
    }

    #[cfg(unix)]
    #[test]
    fn executable_bit_survives() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let payload = dir.path().join("payload");
        let out = dir.path().join("out");
        fs::create_dir_all(&payload).unwrap();
        let script = payload.join("run.sh");
        fs::write(&script, "#!/bin/sh\necho {{ name }}\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        instantiate(&payload, &out, &locals()).unwrap();

        let mode = fs::metadata(out.join("run.sh")).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
        assert_eq!(
            fs::read_to_string(out.join("run.sh")).unwrap(),
            "#!/bin/sh\necho World\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn sockets_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let payload = dir.path().join("p");
        let out = dir.path().join("o");
        fs::create_dir_all(&payload).unwrap();
        fs::write(payload.join("a.txt"), "{{ name }}").unwrap();
        let _listener = std::os::unix::net::UnixListener::bind(payload.join("sock")).unwrap();

        let result = instantiate(&payload, &out, &locals()).unwrap();

        assert_eq!(result.skipped, vec![PathBuf::from("sock")]);
        assert_eq!(result.processed, vec![PathBuf::from("a.txt")]);
        assert!(!out.join("sock").exists());
        assert_eq!(fs::read_to_string(out.join("a.txt")).unwrap(), "World");
    }

    #[cfg(unix)]
    #[test]
    fn existing_link_in_target_is_not_written_through() {
        let dir = tempfile::tempdir().unwrap();
        let payload = dir.path().join("p");
        let out = dir.path().join("o");
        fs::create_dir_all(&payload).unwrap();
        fs::create_dir_all(&out).unwrap();
        fs::write(payload.join("config.txt"), "new").unwrap();
        let outside = dir.path().join("outside.txt");
        fs::write(&outside, "untouched").unwrap();
        std::os::unix::fs::symlink(&outside, out.join("config.txt")).unwrap();

        instantiate(&payload, &out, &locals()).unwrap();

        assert_eq!(fs::read_to_string(&outside).unwrap(), "untouched");
        let meta = fs::symlink_metadata(out.join("config.txt")).unwrap();
        assert!(meta.file_type().is_file());
        assert_eq!(fs::read_to_string(out.join("config.txt")).unwrap(), "new");
    }

    fn payload_with(files: &[(&str, &str)]) -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let payload = dir.path().join("payload");
        let out = dir.path().join("out");
        fs::create_dir_all(&payload).unwrap();
        for (path, content) in files {
            let path = payload.join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        (dir, payload, out)
    }

    #[test]
    fn text_files_are_substituted() {
        let (_dir, payload, out) = payload_with(&[
            ("greeting.txt", "Hello {{ name }}!"),
            ("escaped.txt", "\\{{ name }} stays"),
            ("missing.txt", "{{ absent }} stays"),
        ]);

        let result = instantiate(&payload, &out, &locals()).unwrap();

        assert_eq!(fs::read_to_string(out.join("greeting.txt")).unwrap(), "Hello World!");
        assert_eq!(fs::read_to_string(out.join("escaped.txt")).unwrap(), "{{ name }} stays");
        assert_eq!(fs::read_to_string(out.join("missing.txt")).unwrap(), "{{ absent }} stays");
        assert_eq!(result.files_rendered.len(), 3);
    }

    #[test]
    fn aliased_names_are_renamed_and_rendered() {
        let (_dir, payload, out) = payload_with(&[
            ("_gitignore", "node_modules\n{{ pkg }}.log\n"),
            ("_package.json", "{ \"name\": \"{{ pkg }}\" }"),
        ]);

        instantiate(&payload, &out, &locals()).unwrap();

        assert!(!out.join("_gitignore").exists());
        assert_eq!(
            fs::read_to_string(out.join(".gitignore")).unwrap(),
            "node_modules\nmy-lib.log\n"
        );
        assert_eq!(
            fs::read_to_string(out.join("package.json")).unwrap(),
            "{ \"name\": \"my-lib\" }"
        );
    }

    #[test]
    fn binary_files_are_byte_identical() {
        let mut png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00];
        png.extend_from_slice(b"{{ name }}");
        png.push(0xFF);
        let (_dir, payload, out) = payload_with(&[]);
        fs::create_dir_all(payload.join("assets")).unwrap();
        fs::write(payload.join("assets/logo.png"), &png).unwrap();

        let result = instantiate(&payload, &out, &locals()).unwrap();

        assert_eq!(fs::read(out.join("assets/logo.png")).unwrap(), png);
        assert_eq!(result.files_copied, vec![PathBuf::from("assets/logo.png")]);
        assert!(result.files_rendered.is_empty());
    }

    #[test]
    fn directory_names_are_substituted() {
        let (_dir, payload, out) = payload_with(&[("{{ pkg }}/index.ts", "export {};")]);

        let result = instantiate(&payload, &out, &locals()).unwrap();

        assert!(out.join("my-lib/index.ts").is_file());
        assert_eq!(result.directories, vec![PathBuf::from("my-lib")]);
    }

    #[test]
    fn colliding_directory_names_merge() {
        let mut locals = locals();
        locals.insert("dir".into(), json!("app"));
        let (_dir, payload, out) =
            payload_with(&[("app/a.txt", "a"), ("{{ dir }}/b.txt", "b")]);

        instantiate(&payload, &out, &locals).unwrap();

        assert!(out.join("app/a.txt").is_file());
        assert!(out.join("app/b.txt").is_file());
    }

    #[test]
    fn existing_unrelated_files_are_left_alone() {
        let (_dir, payload, out) = payload_with(&[("README.md", "# {{ name }}")]);
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("README.md"), "old").unwrap();
        fs::write(out.join("notes.txt"), "mine").unwrap();

        instantiate(&payload, &out, &locals()).unwrap();

        assert_eq!(fs::read_to_string(out.join("README.md")).unwrap(), "# World");
        assert_eq!(fs::read_to_string(out.join("notes.txt")).unwrap(), "mine");
    }

    #[cfg(unix)]
    #[test]
    fn links_keep_their_target() {
        let (_dir, payload, out) = payload_with(&[("real.txt", "{{ name }}")]);
        std::os::unix::fs::symlink("real.txt", payload.join("alias.txt")).unwrap();
        std::os::unix::fs::symlink("../nowhere", payload.join("dangling")).unwrap();

        let result = instantiate(&payload, &out, &locals()).unwrap();

        assert_eq!(fs::read_link(out.join("alias.txt")).unwrap(), PathBuf::from("real.txt"));
        assert_eq!(fs::read_link(out.join("dangling")).unwrap(), PathBuf::from("../nowhere"));
        assert_eq!(fs::read_to_string(out.join("alias.txt")).unwrap(), "World");
        assert_eq!(result.links.len(), 2);
    }

    #[test]
    fn empty_directory_name_collapses_into_parent() {
        let mut locals = locals();
        locals.insert("sub".into(), json!(""));
        let (_dir, payload, out) = payload_with(&[
            ("{{ sub }}/index.js", "// {{ name }}"),
            ("lib/{{ sub }}/util.js", "util"),
        ]);

        let result = instantiate(&payload, &out, &locals).unwrap();

        assert_eq!(fs::read_to_string(out.join("index.js")).unwrap(), "// World");
        assert_eq!(fs::read_to_string(out.join("lib/util.js")).unwrap(), "util");
        assert!(result.directories.iter().all(|d| !d.as_os_str().is_empty()));
    }

    #[test]
    fn empty_file_name_is_an_error() {
        let mut locals = locals();
        locals.insert("sub".into(), json!(""));
        let err = destination_path(Path::new("{{ sub }}"), EntryKind::File, &locals).unwrap_err();
        assert!(matches!(err, SproutError::Io { .. }));
    }

    #[test]
    fn aliased_directory_names_are_kept_whole() {
        let (_dir, payload, out) = payload_with(&[("_npmrc/a", "x"), ("_gitignore", "dist\n")]);

        instantiate(&payload, &out, &locals()).unwrap();

        let mut names: Vec<_> = fs::read_dir(&out)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec![".gitignore", "_npmrc"]);
        assert_eq!(fs::read_to_string(out.join("_npmrc/a")).unwrap(), "x");
    }
}
