//! Run orchestration
//!
//! Drives one packaging run:
//!
//! ```text
//! Init ──► Staged ──► Packaged ──► Cleanup ──► Done
//!            │           ▲            ▲
//!            └─(failure)─┴────────────┘
//! ```
//!
//! Version extraction and template rendering happen in `Init`, before the
//! filesystem is touched. Once the package root exists it is removed on every
//! path out of the run.

use crate::{
    config::Config,
    core::{
        control::{ControlTemplate, PackageOptions},
        packager::Packager,
        stager::Stager,
        version::{PackageVersion, VersionExtractor},
    },
    error::Result,
};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};

/// Stage of a packaging run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    Staged,
    Packaged,
    Cleanup,
    Done,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Staged => "staged",
            Self::Packaged => "packaged",
            Self::Cleanup => "cleanup",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// The .deb written to the output directory
    pub artifact: PathBuf,
    pub version: PackageVersion,
    /// Library files packaged under `usr/lib`
    pub library_count: usize,
}

/// Sequential extract → render → stage → package → clean up pipeline
pub struct Pipeline {
    config: Config,
    state: RunState,
    failed_in: Option<RunState>,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: RunState::Init,
            failed_in: None,
        }
    }

    /// Current run state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// State the run was in when it failed
    pub fn failed_in(&self) -> Option<RunState> {
        self.failed_in
    }

    /// Resolve the package options from the version source
    pub fn package_options(&self) -> Result<PackageOptions> {
        let version = VersionExtractor::new(&self.config.version_prefix)?
            .extract(&self.config.version_source)?;
        Ok(PackageOptions::new(&self.config.package, version))
    }

    /// Render the control manifest for `options`
    pub fn render_control(&self, options: &PackageOptions) -> Result<String> {
        ControlTemplate::from_optional_path(self.config.control_template.as_deref())?
            .render(options)
    }

    /// Execute the whole run
    #[instrument(skip(self))]
    pub fn run(&mut self) -> Result<RunReport> {
        let result = self.execute();
        if result.is_err() && self.failed_in.is_none() {
            self.failed_in = Some(self.state);
        }
        result
    }

    fn execute(&mut self) -> Result<RunReport> {
        let options = self.package_options()?;
        info!("Packaging {} version {}", options.pkg_name, options.version);
        let control = self.render_control(&options)?;
        debug!("Control manifest:\n{}", control);

        let staging = Stager::new(self.config.staging.clone()).stage(&control)?;
        self.advance(RunState::Staged);

        let packaged = Packager::new(self.config.clone()).build(staging.path(), &options);
        match packaged {
            Ok(_) => self.advance(RunState::Packaged),
            Err(_) => self.failed_in = Some(self.state),
        }

        self.advance(RunState::Cleanup);
        let library_count = staging.library_count();
        let cleaned = staging.remove();

        let artifact = settle(packaged, cleaned)?;
        self.advance(RunState::Done);

        Ok(RunReport {
            artifact,
            version: options.version,
            library_count,
        })
    }

    fn advance(&mut self, next: RunState) {
        debug!("Run state: {} -> {}", self.state, next);
        self.state = next;
    }
}

/// Combine the packaging and cleanup outcomes; a packaging error wins, and a
/// cleanup error behind it is logged rather than lost
fn settle(packaged: Result<PathBuf>, cleaned: Result<()>) -> Result<PathBuf> {
    match (packaged, cleaned) {
        (Ok(artifact), Ok(())) => Ok(artifact),
        (Ok(_), Err(cleanup)) => Err(cleanup),
        (Err(packaging), Ok(())) => Err(packaging),
        (Err(packaging), Err(cleanup)) => {
            warn!("Package root cleanup also failed: {}", cleanup);
            Err(packaging)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DebError;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        config: Config,
    }

    impl Fixture {
        fn new(version_line: &str, script: &str) -> Self {
            let dir = TempDir::new().unwrap();
            let root = dir.path();

            fs::create_dir(root.join("pro")).unwrap();
            fs::write(
                root.join("pro/novile.pro"),
                format!("TEMPLATE = lib\n{version_line}\n"),
            )
            .unwrap();

            fs::create_dir(root.join("lib")).unwrap();
            fs::write(root.join("lib/libnovile.so.0.4.12"), "ELF").unwrap();
            fs::write(root.join("lib/libnovile.so"), "ELF").unwrap();

            fs::create_dir(root.join("out")).unwrap();

            let mut config = Config::default();
            config.version_source = root.join("pro/novile.pro");
            config.staging.lib_dir = root.join("lib");
            config.staging.pkg_root = root.join("pkg_root");
            config.packager.program = "sh".to_string();
            config.packager.args = vec!["-c".to_string(), script.to_string(), "sh".to_string()];
            config.packager.output_dir = root.join("out");

            Self { dir, config }
        }

        fn path(&self) -> &Path {
            self.dir.path()
        }

        fn debs(&self) -> Vec<String> {
            fs::read_dir(self.path().join("out"))
                .unwrap()
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .filter(|name| name.ends_with(".deb"))
                .collect()
        }
    }

    const FAKE_DPKG: &str =
        r#"test -f "$1/DEBIAN/control" && test -f "$1/usr/lib/libnovile.so" && touch "$2""#;

    #[test]
    fn test_successful_run() {
        let fixture = Fixture::new("VERSION = 0.4.12+", FAKE_DPKG);
        let mut pipeline = Pipeline::new(fixture.config.clone());

        let report = pipeline.run().unwrap();

        assert_eq!(pipeline.state(), RunState::Done);
        assert_eq!(pipeline.failed_in(), None);
        assert_eq!(report.version.to_string(), "0.4.12-1");
        assert_eq!(report.library_count, 2);
        assert!(!fixture.path().join("pkg_root").exists());
        assert_eq!(fixture.debs(), vec!["libnovile.debian7_0.4.12-1_amd64.deb"]);
        assert_eq!(
            report.artifact,
            fixture.path().join("out/libnovile.debian7_0.4.12-1_amd64.deb")
        );
    }

    #[test]
    fn test_failed_packaging_still_cleans_up() {
        let fixture = Fixture::new("VERSION = 0.4.12", r#"touch "$2"; exit 2"#);
        let mut pipeline = Pipeline::new(fixture.config.clone());

        let err = pipeline.run().unwrap_err();

        assert!(matches!(err, DebError::Process { exit_code: Some(2), .. }));
        assert_eq!(pipeline.state(), RunState::Cleanup);
        assert_eq!(pipeline.failed_in(), Some(RunState::Staged));
        assert!(!fixture.path().join("pkg_root").exists());
        assert!(fixture.debs().is_empty());
    }

    #[test]
    fn test_missing_version_creates_nothing() {
        let fixture = Fixture::new("# no version here", FAKE_DPKG);
        let mut pipeline = Pipeline::new(fixture.config.clone());

        let err = pipeline.run().unwrap_err();

        assert!(matches!(err, DebError::VersionSource { .. }));
        assert_eq!(pipeline.state(), RunState::Init);
        assert_eq!(pipeline.failed_in(), Some(RunState::Init));
        assert!(!fixture.path().join("pkg_root").exists());
        assert!(fixture.debs().is_empty());
    }

    #[test]
    fn test_existing_root_aborts_without_deleting() {
        let fixture = Fixture::new("VERSION = 0.4.12-", FAKE_DPKG);
        let root = fixture.path().join("pkg_root");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("leftover"), "").unwrap();
        let mut pipeline = Pipeline::new(fixture.config.clone());

        let err = pipeline.run().unwrap_err();

        assert!(matches!(err, DebError::StagingExists { .. }));
        assert!(root.join("leftover").exists());
        assert!(fixture.debs().is_empty());
    }

    #[test]
    fn test_bad_template_aborts_before_staging() {
        let mut fixture = Fixture::new("VERSION = 1.0.0", FAKE_DPKG);
        let template = fixture.path().join("control.in");
        fs::write(&template, "Package: $pkg_name\nHomepage: $homepage\n").unwrap();
        fixture.config.control_template = Some(template);
        let mut pipeline = Pipeline::new(fixture.config.clone());

        assert!(matches!(pipeline.run(), Err(DebError::Template { .. })));
        assert!(!fixture.path().join("pkg_root").exists());
    }

    #[test]
    fn test_render_control_is_stable() {
        let fixture = Fixture::new("VERSION = 2.1.0", FAKE_DPKG);
        let pipeline = Pipeline::new(fixture.config.clone());

        let options = pipeline.package_options().unwrap();
        let first = pipeline.render_control(&options).unwrap();
        let second = pipeline.render_control(&options).unwrap();

        assert_eq!(first, second);
        assert!(first.contains("Version: 2.1.0-0\n"));
    }

    fn cleanup_error() -> DebError {
        DebError::file_system(
            "remove directory",
            "pkg_root",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        )
    }

    #[test]
    fn test_settle_prefers_packaging_error() {
        let result = settle(Err(DebError::process("fakeroot", Some(2))), Err(cleanup_error()));
        assert!(matches!(result, Err(DebError::Process { exit_code: Some(2), .. })));
    }

    #[test]
    fn test_settle_reports_cleanup_after_success() {
        let result = settle(Ok(PathBuf::from("x.deb")), Err(cleanup_error()));
        assert!(matches!(result, Err(DebError::FileSystem { .. })));

        let result = settle(Ok(PathBuf::from("x.deb")), Ok(()));
        assert_eq!(result.unwrap(), PathBuf::from("x.deb"));
    }
}
