//! Component scaffold generation.
//!
//! Lays down the build script, CI config, sample test and support files for one
//! component directory. Every target is create-if-absent: existing files are
//! reported as skipped and never touched, except that the build script always
//! ends up owner-executable.

use serde::Serialize;
use std::env;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::defaults::Defaults;
use crate::error::{Error, Result};
use crate::local_files::FileSystem;
use crate::output::{BatchSummary, ItemStatus};
use crate::paths;
use crate::permissions;
use crate::templates::{self, TemplateContext};

pub const BUILD_SCRIPT: &str = "build.sh";
pub const CI_CONFIG: &str = ".travis.yml";
pub const SAMPLE_TEST: &str = "test_example.py";

/// Inputs for one scaffold run.
#[derive(Debug, Clone, Copy)]
pub struct ScaffoldRequest<'a> {
    /// Target component directory. `None` or blank means the parent of `skeleton_dir`.
    pub component_dir: Option<&'a str>,
    /// Install root holding the support files.
    pub skeleton_dir: &'a Path,
    pub defaults: &'a Defaults,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Generated,
    Copied,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaffoldItem {
    pub path: String,
    pub kind: ItemKind,
    pub status: ItemStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaffoldReport {
    pub component_dir: String,
    pub skeleton_dir: String,
    pub test_dir: String,
    pub test_dir_status: ItemStatus,
    pub items: Vec<ScaffoldItem>,
    pub summary: BatchSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_script_mode: Option<String>,
}

impl ScaffoldReport {
    pub fn skipped(&self) -> impl Iterator<Item = &ScaffoldItem> {
        self.items
            .iter()
            .filter(|item| item.status == ItemStatus::Skipped)
    }

    fn record<N: FnMut(&ScaffoldItem)>(
        &mut self,
        path: &Path,
        kind: ItemKind,
        status: ItemStatus,
        on_item: &mut N,
    ) {
        match status {
            ItemStatus::Created => log_status!("new", "Created {}", path.display()),
            ItemStatus::Skipped => log_status!("new", "{} already exists", path.display()),
        }

        let item = ScaffoldItem {
            path: path.to_string_lossy().to_string(),
            kind,
            status,
        };
        on_item(&item);

        self.summary.record(status);
        self.items.push(item);
    }
}

/// Materialize the scaffold for one component directory.
pub fn scaffold<F: FileSystem>(fs: &F, request: &ScaffoldRequest<'_>) -> Result<ScaffoldReport> {
    scaffold_with(fs, request, |_| {})
}

/// Like [`scaffold`], calling `on_item` as each target is created or skipped.
///
/// Items reported before a failure have already been acted on.
pub fn scaffold_with<F, N>(
    fs: &F,
    request: &ScaffoldRequest<'_>,
    mut on_item: N,
) -> Result<ScaffoldReport>
where
    F: FileSystem,
    N: FnMut(&ScaffoldItem),
{
    let defaults = request.defaults;
    defaults.validate()?;

    let skeleton_dir = absolutize(request.skeleton_dir)?;
    let component_dir = resolve_component_dir(request.component_dir, &skeleton_dir)?;
    let test_dir = component_dir.join(&defaults.test_dir);

    let test_dir_status = fs.ensure_dir(&test_dir)?;

    let mut report = ScaffoldReport {
        component_dir: component_dir.to_string_lossy().to_string(),
        skeleton_dir: skeleton_dir.to_string_lossy().to_string(),
        test_dir: test_dir.to_string_lossy().to_string(),
        test_dir_status,
        items: Vec::new(),
        summary: BatchSummary::default(),
        build_script_mode: None,
    };

    let test_dir_name = test_dir
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| defaults.test_dir.clone());
    let ctx = TemplateContext::new(&test_dir_name, defaults);

    let build_script = component_dir.join(BUILD_SCRIPT);
    let generated = [
        (build_script.clone(), templates::build_sh(&ctx)),
        (component_dir.join(CI_CONFIG), templates::travis_yml(&ctx)),
        (
            test_dir.join(SAMPLE_TEST),
            templates::test_example().to_string(),
        ),
    ];

    for (path, content) in &generated {
        let status = fs.write_if_absent(path, content)?;
        report.record(path, ItemKind::Generated, status, &mut on_item);
    }

    for name in &defaults.support_files {
        let source = skeleton_dir.join(name);
        let target = test_dir.join(name);
        let status = fs.copy_if_absent(&source, &target).map_err(|err| {
            if source.exists() {
                err
            } else {
                err.with_hint(format!(
                    "Support file {} is missing; set {} to the skeleton install directory",
                    source.display(),
                    paths::SKELETON_HOME_ENV
                ))
            }
        })?;
        report.record(&target, ItemKind::Copied, status, &mut on_item);
    }

    // Runs whether build.sh was just written or already there.
    report.build_script_mode =
        permissions::make_owner_executable(&build_script)?.map(permissions::format_mode);

    Ok(report)
}

/// Effective component directory for a run.
///
/// Empty input means the parent of the skeleton directory. Anything else is
/// tilde-expanded, made absolute and canonicalized; a path that does not exist
/// yet keeps its missing tail, normalized lexically, under the canonical form of
/// its deepest existing prefix.
pub fn resolve_component_dir(
    component_dir: Option<&str>,
    skeleton_dir: &Path,
) -> Result<PathBuf> {
    let raw = match component_dir.filter(|dir| !dir.is_empty()) {
        Some(raw) => raw,
        None => {
            let skeleton_dir = absolutize(skeleton_dir)?;
            return Ok(skeleton_dir
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or(skeleton_dir));
        }
    };

    let expanded = shellexpand::tilde(raw);
    let resolved = canonicalize_lenient(&absolutize(Path::new(&*expanded))?)?;

    if resolved.exists() && !resolved.is_dir() {
        return Err(Error::validation_invalid_argument(
            "dir",
            "Component path exists but is not a directory",
            Some(resolved.to_string_lossy().to_string()),
        ));
    }

    Ok(resolved)
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    let cwd = env::current_dir().map_err(|e| {
        Error::internal_io(e.to_string(), Some("read current directory".to_string()))
    })?;
    Ok(cwd.join(path))
}

fn canonicalize_lenient(path: &Path) -> Result<PathBuf> {
    let components: Vec<Component> = path.components().collect();

    // Symlinks and `..` are only resolved by the filesystem while the prefix
    // exists; a missing component cannot be a link.
    for split in (1..=components.len()).rev() {
        let prefix: PathBuf = components[..split].iter().collect();
        match prefix.canonicalize() {
            Ok(mut base) => {
                push_lexically(&mut base, &components[split..]);
                return Ok(base);
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(Error::internal_io(
                    e.to_string(),
                    Some(format!("resolve {}", prefix.display())),
                ))
            }
        }
    }

    Ok(normalize_lexically(path))
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let components: Vec<Component> = path.components().collect();
    let mut out = PathBuf::new();
    push_lexically(&mut out, &components);
    out
}

fn push_lexically(base: &mut PathBuf, components: &[Component<'_>]) {
    for component in components {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                base.pop();
            }
            other => base.push(other.as_os_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_files::{local, LocalFs};
    use std::cell::Cell;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    /// Counts bytes that actually reach disk.
    struct CountingFs {
        inner: LocalFs,
        bytes_written: Cell<usize>,
        files_copied: Cell<usize>,
    }

    impl CountingFs {
        fn new() -> Self {
            Self {
                inner: local(),
                bytes_written: Cell::new(0),
                files_copied: Cell::new(0),
            }
        }
    }

    impl FileSystem for CountingFs {
        fn ensure_dir(&self, dir: &Path) -> Result<ItemStatus> {
            self.inner.ensure_dir(dir)
        }

        fn write_if_absent(&self, path: &Path, content: &str) -> Result<ItemStatus> {
            let status = self.inner.write_if_absent(path, content)?;
            if status == ItemStatus::Created {
                self.bytes_written
                    .set(self.bytes_written.get() + content.len());
            }
            Ok(status)
        }

        fn copy_if_absent(&self, source: &Path, target: &Path) -> Result<ItemStatus> {
            let status = self.inner.copy_if_absent(source, target)?;
            if status == ItemStatus::Created {
                self.files_copied.set(self.files_copied.get() + 1);
            }
            Ok(status)
        }
    }

    struct Fixture {
        _root: TempDir,
        skeleton: PathBuf,
        component: PathBuf,
    }

    fn fixture() -> Fixture {
        let root = tempdir().unwrap();
        let base = root.path().canonicalize().unwrap();
        let skeleton = base.join("skeleton");
        let component = base.join("proj");
        fs::create_dir_all(&skeleton).unwrap();
        fs::create_dir_all(&component).unwrap();
        fs::write(skeleton.join("test_runner.py"), "# runner\n").unwrap();
        fs::write(skeleton.join("requirements.txt"), "qubell-api-python-client\n").unwrap();

        Fixture {
            _root: root,
            skeleton,
            component,
        }
    }

    fn run(fs_: &impl FileSystem, fx: &Fixture, defaults: &Defaults) -> Result<ScaffoldReport> {
        let dir = fx.component.to_string_lossy().to_string();
        scaffold(
            fs_,
            &ScaffoldRequest {
                component_dir: Some(&dir),
                skeleton_dir: &fx.skeleton,
                defaults,
            },
        )
    }

    #[test]
    fn fresh_component_gets_all_five_files() {
        let fx = fixture();
        let defaults = Defaults::default();

        let report = run(&local(), &fx, &defaults).unwrap();

        let test_dir = fx.component.join("test");
        assert!(test_dir.is_dir());
        assert_eq!(report.test_dir_status, ItemStatus::Created);
        for path in [
            fx.component.join("build.sh"),
            fx.component.join(".travis.yml"),
            test_dir.join("test_example.py"),
            test_dir.join("test_runner.py"),
            test_dir.join("requirements.txt"),
        ] {
            assert!(path.is_file(), "missing {}", path.display());
        }
        assert_eq!(report.summary.created, 5);
        assert_eq!(report.summary.skipped, 0);
        assert_eq!(
            fs::read_to_string(test_dir.join("requirements.txt")).unwrap(),
            "qubell-api-python-client\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn build_script_is_owner_executable() {
        use std::os::unix::fs::PermissionsExt;

        let fx = fixture();
        let report = run(&local(), &fx, &Defaults::default()).unwrap();

        let mode = fs::metadata(fx.component.join("build.sh"))
            .unwrap()
            .permissions()
            .mode();
        assert_ne!(mode & permissions::OWNER_EXEC, 0);
        assert_eq!(
            report.build_script_mode,
            Some(permissions::format_mode(mode))
        );
    }

    #[test]
    fn second_run_writes_nothing() {
        let fx = fixture();
        let defaults = Defaults::default();
        run(&local(), &fx, &defaults).unwrap();
        let before = fs::read_to_string(fx.component.join(".travis.yml")).unwrap();

        let counting = CountingFs::new();
        let report = run(&counting, &fx, &defaults).unwrap();

        assert_eq!(counting.bytes_written.get(), 0);
        assert_eq!(counting.files_copied.get(), 0);
        assert_eq!(report.summary.skipped, 5);
        assert_eq!(report.test_dir_status, ItemStatus::Skipped);
        assert_eq!(report.skipped().count(), 5);
        assert_eq!(
            fs::read_to_string(fx.component.join(".travis.yml")).unwrap(),
            before
        );
    }

    #[cfg(unix)]
    #[test]
    fn existing_build_script_keeps_content_but_gains_exec_bit() {
        use std::os::unix::fs::PermissionsExt;

        let fx = fixture();
        let build = fx.component.join("build.sh");
        fs::write(&build, "echo custom\n").unwrap();
        fs::set_permissions(&build, fs::Permissions::from_mode(0o640)).unwrap();

        let report = run(&local(), &fx, &Defaults::default()).unwrap();

        assert_eq!(fs::read_to_string(&build).unwrap(), "echo custom\n");
        assert_eq!(
            fs::metadata(&build).unwrap().permissions().mode() & 0o777,
            0o740
        );
        let item = report
            .items
            .iter()
            .find(|item| item.path.ends_with("build.sh"))
            .unwrap();
        assert_eq!(item.status, ItemStatus::Skipped);
        assert_eq!(item.kind, ItemKind::Generated);
    }

    #[test]
    fn existing_support_file_is_preserved() {
        let fx = fixture();
        let test_dir = fx.component.join("test");
        fs::create_dir_all(&test_dir).unwrap();
        fs::write(test_dir.join("requirements.txt"), "pinned==1.0\n").unwrap();

        let report = run(&local(), &fx, &Defaults::default()).unwrap();

        assert_eq!(
            fs::read_to_string(test_dir.join("requirements.txt")).unwrap(),
            "pinned==1.0\n"
        );
        let skipped: Vec<_> = report.skipped().collect();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].kind, ItemKind::Copied);
    }

    #[test]
    fn custom_test_dir_flows_into_templates() {
        let fx = fixture();
        let defaults = Defaults {
            test_dir: "checks".to_string(),
            ..Defaults::default()
        };

        run(&local(), &fx, &defaults).unwrap();

        let yml = fs::read_to_string(fx.component.join(".travis.yml")).unwrap();
        assert!(yml.contains("pip install -r checks/requirements.txt"));
        assert!(fx.component.join("checks").join("test_runner.py").is_file());
    }

    #[test]
    fn missing_support_file_aborts_with_hint() {
        let fx = fixture();
        fs::remove_file(fx.skeleton.join("requirements.txt")).unwrap();

        let err = run(&local(), &fx, &Defaults::default()).unwrap_err();

        assert_eq!(err.code.as_str(), "internal.io_error");
        assert!(err.hints[0].message.contains("SKELETON_HOME"));
        // files written before the failure stay on disk
        assert!(fx.component.join("build.sh").is_file());
        assert!(fx.component.join("test").join("test_runner.py").is_file());
    }

    #[test]
    fn invalid_defaults_are_rejected_before_touching_disk() {
        let fx = fixture();
        let defaults = Defaults {
            test_dir: "../outside".to_string(),
            ..Defaults::default()
        };

        let err = run(&local(), &fx, &defaults).unwrap_err();

        assert_eq!(err.code.as_str(), "config.invalid_value");
        assert!(!fx.component.join("build.sh").exists());
    }

    #[test]
    fn blank_component_dir_defaults_to_skeleton_parent() {
        let fx = fixture();

        let resolved = resolve_component_dir(None, &fx.skeleton).unwrap();
        assert_eq!(resolved, fx.skeleton.parent().unwrap());

        let resolved = resolve_component_dir(Some(""), &fx.skeleton).unwrap();
        assert_eq!(resolved, fx.skeleton.parent().unwrap());
    }

    #[test]
    fn surrounding_spaces_are_part_of_the_dir_name() {
        let fx = fixture();
        let raw = format!("{}/ padded ", fx.component.display());

        let resolved = resolve_component_dir(Some(&raw), &fx.skeleton).unwrap();
        assert_eq!(resolved, fx.component.join(" padded "));
    }

    #[test]
    fn dot_segments_are_resolved() {
        let fx = fixture();
        let raw = format!("{}/../proj/./", fx.skeleton.display());

        let resolved = resolve_component_dir(Some(&raw), &fx.skeleton).unwrap();
        assert_eq!(resolved, fx.component);
    }

    #[test]
    fn missing_component_dir_resolves_under_existing_ancestor() {
        let fx = fixture();
        let raw = format!("{}/new/../fresh/comp", fx.component.display());

        let resolved = resolve_component_dir(Some(&raw), &fx.skeleton).unwrap();
        assert_eq!(resolved, fx.component.join("fresh").join("comp"));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_component_dir_is_canonicalized() {
        let fx = fixture();
        let link = fx.skeleton.parent().unwrap().join("link");
        std::os::unix::fs::symlink(&fx.component, &link).unwrap();

        let resolved =
            resolve_component_dir(Some(&link.to_string_lossy()), &fx.skeleton).unwrap();
        assert_eq!(resolved, fx.component);
    }

    #[cfg(unix)]
    #[test]
    fn missing_dir_after_symlink_parent_follows_link_target() {
        let fx = fixture();
        let base = fx.skeleton.parent().unwrap();
        let nested = base.join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        let link = base.join("link");
        std::os::unix::fs::symlink(&nested, &link).unwrap();

        let raw = format!("{}/../fresh", link.display());
        let resolved = resolve_component_dir(Some(&raw), &fx.skeleton).unwrap();
        assert_eq!(resolved, base.join("a").join("fresh"));
    }

    #[test]
    fn skipped_items_are_reported_before_a_later_failure() {
        let fx = fixture();
        fs::write(fx.component.join("build.sh"), "echo mine\n").unwrap();
        fs::remove_file(fx.skeleton.join("test_runner.py")).unwrap();

        let mut seen = Vec::new();
        let dir = fx.component.to_string_lossy().to_string();
        let err = scaffold_with(
            &local(),
            &ScaffoldRequest {
                component_dir: Some(&dir),
                skeleton_dir: &fx.skeleton,
                defaults: &Defaults::default(),
            },
            |item| seen.push((item.path.clone(), item.status)),
        )
        .unwrap_err();

        assert_eq!(err.code.as_str(), "internal.io_error");
        assert_eq!(seen.len(), 3);
        assert!(seen[0].0.ends_with("build.sh"));
        assert_eq!(seen[0].1, ItemStatus::Skipped);
    }

    #[test]
    fn file_as_component_dir_is_invalid_argument() {
        let fx = fixture();
        let file = fx.component.join("notes.txt");
        fs::write(&file, "x").unwrap();

        let err = resolve_component_dir(Some(&file.to_string_lossy()), &fx.skeleton).unwrap_err();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");
    }

    #[test]
    fn normalize_lexically_drops_dot_segments() {
        assert_eq!(
            normalize_lexically(Path::new("/a/./b/../c")),
            PathBuf::from("/a/c")
        );
        assert_eq!(normalize_lexically(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(
            normalize_lexically(Path::new("/a/missing/../b")),
            PathBuf::from("/a/b")
        );
    }
}
